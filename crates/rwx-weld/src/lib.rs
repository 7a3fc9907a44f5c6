//! rwx-weld: interface extraction and SWIG generation for wxRuby
//!
//! Turns the declarations extracted from the wxWidgets headers into the
//! SWIG interface files, interface headers, runtime constant scripts and
//! documentation stubs the Ruby extension is built from.
//!
//! # Architecture
//!
//! - `extractor`: declaration model loaded from JSON declaration files
//! - `director`: per-module policy and its application to the model
//! - `analyzer`: class flattening and proxy consistency checks
//! - `typemap`: typemap definitions and their SWIG rendering
//! - `codegen`: generators for every output file
//! - `build`: package orchestration and file output
//!
//! # Usage
//!
//! ```rust,ignore
//! use rwx_weld::{Config, Package, SpecBuilder};
//!
//! let mut frame = SpecBuilder::new("wxFrame", "Wx");
//! frame.director("top_level_window");
//! let package = Package::builder("Wx", Config::default())
//!     .module(frame.build())
//!     .build()?;
//! let report = package.generate_all(4);
//! ```

pub mod analyzer;
pub mod build;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod director;
pub mod extractor;
pub mod naming;
pub mod typemap;

// Re-export commonly used types
pub use analyzer::{check_interface_methods, preprocess_module, BaseResolver, ClassRegistry, InterfaceRegistry};
pub use build::{write_if_changed, GenerateReport, ModuleFailure, Package, PackageBuilder};
pub use codegen::{ConstantsGenerator, DepsGenerator, DocGenerator, InterfaceGenerator};
pub use config::Config;
pub use diagnostics::{AnalysisReport, Diagnostic, DiagnosticSeverity, WeldError, WeldResult};
pub use director::{builtin_names, find_builtin, Director, Extraction, ModuleView, PolicyOp, Spec, SpecBuilder};
pub use extractor::{DeclSource, JsonDirSource, MemorySource, ModuleDef, ValidatingSource};
pub use typemap::{Typemap, TypemapRegistry};

// Re-export linkme for built-in director registration
pub use linkme;
