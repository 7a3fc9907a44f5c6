//! Generator configuration
//!
//! Paths and switches shared by every module of a package. Loaded from the
//! `[config]` table of a package manifest or from a standalone TOML file.

use crate::diagnostics::{WeldError, WeldResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory name used inside emitted `%include`/`%import` directives
    pub interface_dir: String,
    /// Output directory for SWIG interface files (`<module>.i`)
    pub swig_dir: PathBuf,
    /// Output directory for interface headers (`<module>.h`)
    pub include_dir: PathBuf,
    /// Output directory for runtime constant scripts
    pub ext_dir: PathBuf,
    /// Output directory for documentation stubs
    pub doc_dir: PathBuf,
    /// Output directory for dependency files
    pub deps_dir: PathBuf,
    /// Directory holding the JSON declaration input
    pub decls_dir: PathBuf,
    /// Active platform id, if generation targets one platform only
    pub platform: Option<String>,
    /// Suppress deprecation shims
    pub no_deprecate: bool,
    /// Shared SWIG files every module depends on
    pub common_includes: Vec<PathBuf>,
    /// Base classes dropped from every hierarchy
    pub ignored_bases: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface_dir: "include".to_string(),
            swig_dir: PathBuf::from("swig"),
            include_dir: PathBuf::from("swig/include"),
            ext_dir: PathBuf::from("lib/wx/ext"),
            doc_dir: PathBuf::from("lib/wx/doc/gen"),
            deps_dir: PathBuf::from(".deps"),
            decls_dir: PathBuf::from("decls"),
            platform: None,
            no_deprecate: false,
            common_includes: vec![PathBuf::from("swig/common.i")],
            ignored_bases: vec!["wxTrackable".to_string()],
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> WeldResult<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> WeldResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WeldError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Make every relative path relative to `root`
    pub fn resolve_paths(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        rebase(&mut self.swig_dir);
        rebase(&mut self.include_dir);
        rebase(&mut self.ext_dir);
        rebase(&mut self.doc_dir);
        rebase(&mut self.deps_dir);
        rebase(&mut self.decls_dir);
        for inc in &mut self.common_includes {
            rebase(inc);
        }
        self
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> WeldResult<()> {
        if self.interface_dir.trim().is_empty() {
            return Err(WeldError::config("interface_dir cannot be empty"));
        }
        if let Some(platform) = &self.platform {
            if platform.trim().is_empty() {
                return Err(WeldError::config("platform cannot be an empty string"));
            }
        }
        Ok(())
    }

    /// Path of the SWIG interface file for a module
    pub fn interface_file(&self, module: &str) -> PathBuf {
        self.swig_dir.join(format!("{}.i", module))
    }

    /// Path of the interface header for a module
    pub fn interface_include_file(&self, module: &str) -> PathBuf {
        self.include_dir.join(format!("{}.h", module))
    }

    /// Include path text for a module header, as written into `%include`
    pub fn interface_include(&self, module: &str) -> String {
        format!("{}/{}.h", self.interface_dir, module)
    }

    /// Path of the runtime constant script for a module
    pub fn ext_file(&self, module: &str) -> PathBuf {
        self.ext_dir.join(format!("{}_ext.rb", module.to_lowercase()))
    }

    /// Path of the documentation stub for a module
    pub fn doc_file(&self, module: &str) -> PathBuf {
        self.doc_dir.join(format!("{}.rb", module.to_lowercase()))
    }

    /// Path of the dependency file for a module
    pub fn deps_file(&self, module: &str) -> PathBuf {
        self.deps_dir.join(format!(".{}.dep", module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_toml_str("no_deprecate = true\nplatform = \"wxmsw\"").unwrap();
        assert!(config.no_deprecate);
        assert_eq!(config.platform.as_deref(), Some("wxmsw"));
        assert_eq!(config.interface_dir, "include");
        assert_eq!(config.ignored_bases, vec!["wxTrackable".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_toml_str("bogus = 1").is_err());
    }

    #[test]
    fn test_empty_platform_rejected() {
        let err = Config::from_toml_str("platform = \" \"").unwrap_err();
        assert!(matches!(err, WeldError::Config(_)));
    }

    #[test]
    fn test_output_paths() {
        let config = Config::default().resolve_paths("/work");
        assert_eq!(config.interface_file("wxFrame"), PathBuf::from("/work/swig/wxFrame.i"));
        assert_eq!(
            config.interface_include_file("wxFrame"),
            PathBuf::from("/work/swig/include/wxFrame.h")
        );
        assert_eq!(config.interface_include("wxFrame"), "include/wxFrame.h");
        assert_eq!(config.deps_file("wxFrame"), PathBuf::from("/work/.deps/.wxFrame.dep"));
        assert_eq!(config.ext_file("Defs"), PathBuf::from("/work/lib/wx/ext/defs_ext.rb"));
    }
}
