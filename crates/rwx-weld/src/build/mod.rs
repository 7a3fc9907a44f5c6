//! Package generation
//!
//! - `output`: change-aware writing of generated files
//! - `package`: module orchestration, base class resolution and the
//!   parallel generation driver

pub mod output;
pub mod package;

pub use output::write_if_changed;
pub use package::{GenerateReport, ModuleFailure, Package, PackageBuilder};
