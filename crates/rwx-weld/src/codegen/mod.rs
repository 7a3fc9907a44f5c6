//! Code generation for wxRuby modules
//!
//! This module provides generators for:
//! - SWIG interface files (`<module>.i`)
//! - Interface headers declaring the flattened classes (`<module>.h`)
//! - Runtime constant scripts (`<module>_ext.rb`)
//! - Ruby documentation stubs
//! - Dependency files for incremental builds

pub mod constants;
pub mod deps;
pub mod doc;
pub mod interface;

pub use constants::{classify_define, ConstantsGenerator, DefineEmission};
pub use deps::{collect_includes, scan_includes, DepsGenerator};
pub use doc::DocGenerator;
pub use interface::InterfaceGenerator;
