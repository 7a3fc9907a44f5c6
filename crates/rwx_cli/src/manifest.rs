//! Package manifest (`rwx.toml`)
//!
//! ```toml
//! [config]
//! decls_dir = "decls"
//!
//! [package]
//! name = "Wx"
//!
//! [[module]]
//! name = "wxComboBox"
//! director = "combobox"
//! policy = [
//!   { op = "ignore", names = ["wxComboBox::Popup"] },
//! ]
//! ```

use anyhow::{Context, Result};
use rwx_weld::{Config, Package, PolicyOp, Spec, SpecBuilder};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub config: Config,
    pub package: PackageSection,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSection {
    pub name: String,
    /// Declaration items; the module name alone when empty
    #[serde(default)]
    pub items: Vec<String>,
    /// Built-in director setup run before `policy`
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub policy: Vec<PolicyOp>,
}

impl Manifest {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a manifest; relative config paths are taken from its directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let mut manifest = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        manifest.config = manifest.config.resolve_paths(root);
        Ok(manifest)
    }

    /// Policy spec of one module section
    pub fn module_spec(&self, module: &ModuleSection) -> Result<Spec> {
        let mut builder = SpecBuilder::new(&module.name, &self.package.name);
        builder.common_ignored_bases(&self.config.ignored_bases);
        if !module.items.is_empty() {
            builder.set_items(&module.items);
        }
        if let Some(director) = &module.director {
            builder
                .builtin(director)
                .with_context(|| format!("module {}", module.name))?;
        }
        builder.apply_all(module.policy.iter().cloned());
        Ok(builder.build())
    }

    /// Build the package described by the manifest
    pub fn into_package(self, path: Option<&Path>) -> Result<Package> {
        let specs = self
            .modules
            .iter()
            .map(|m| self.module_spec(m))
            .collect::<Result<Vec<_>>>()?;
        let mut builder = Package::builder(&self.package.name, self.config).modules(specs);
        if let Some(path) = path {
            builder = builder.manifest(path);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwx_weld::director::Visibility;

    const MANIFEST: &str = r#"
[config]
decls_dir = "decls"
platform = "gtk"

[package]
name = "Wx"

[[module]]
name = "wxComboBox"
director = "combobox"
policy = [
  { op = "ignore", names = ["wxComboBox::Popup"] },
  { op = "rename_for_ruby", to = "popup_now", from = ["wxComboBox::Dismiss"] },
]

[[module]]
name = "wxFrame"
items = ["wxFrame", "wxFrameBase"]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        assert_eq!(manifest.package.name, "Wx");
        assert_eq!(manifest.config.platform.as_deref(), Some("gtk"));
        assert_eq!(manifest.modules.len(), 2);
        assert_eq!(manifest.modules[0].policy.len(), 2);
    }

    #[test]
    fn test_module_spec_runs_director_then_policy() {
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        let combo = manifest.module_spec(&manifest.modules[0]).unwrap();
        assert_eq!(combo.director.as_deref(), Some("combobox"));
        assert_eq!(combo.items, vec!["wxComboBox", "wxTextEntry"]);
        assert_eq!(
            combo.visibility.get("wxComboBox::Popup"),
            Some(&Visibility { ignore: true, ignore_doc: true })
        );
        assert_eq!(combo.common_ignored_bases, vec!["wxTrackable"]);

        let frame = manifest.module_spec(&manifest.modules[1]).unwrap();
        assert_eq!(frame.items, vec!["wxFrame", "wxFrameBase"]);
        assert!(frame.director.is_none());
    }

    #[test]
    fn test_manifest_fold_repeats_builtin_fold() {
        let manifest = Manifest::from_toml_str(
            r#"
[package]
name = "Wx"

[[module]]
name = "wxComboBox"
director = "combobox"
policy = [
  { op = "fold_bases", class = "wxComboBox", bases = ["wxTextEntry"] },
]
"#,
        )
        .unwrap();
        let combo = manifest.module_spec(&manifest.modules[0]).unwrap();
        assert_eq!(combo.folded_bases("wxComboBox"), ["wxTextEntry".to_string()]);
    }

    #[test]
    fn test_unknown_director_is_an_error() {
        let manifest = Manifest::from_toml_str(
            "[package]\nname = \"Wx\"\n\n[[module]]\nname = \"wxFoo\"\ndirector = \"nope\"\n",
        )
        .unwrap();
        let err = manifest.module_spec(&manifest.modules[0]).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown director 'nope'"));
    }

    #[test]
    fn test_load_resolves_paths_against_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rwx.toml");
        fs::write(&path, MANIFEST).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.config.decls_dir, dir.path().join("decls"));

        let package = manifest.into_package(Some(&path)).unwrap();
        assert_eq!(package.module_names().collect::<Vec<_>>(), vec!["wxComboBox", "wxFrame"]);
        assert_eq!(package.manifest(), Some(path.as_path()));
    }
}
