//! Dependency files for incremental builds
//!
//! Each module gets a Makefile style rule naming every input its interface
//! file is generated from: the package manifest, the declaration files and
//! all SWIG files reachable through `%include`.

use crate::config::Config;
use crate::diagnostics::WeldResult;
use crate::director::Spec;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref INCLUDE: Regex = Regex::new(r#"(?m)^%include\s+["'](.*?)["']\s*$"#).unwrap();
}

/// Files included by a SWIG file, resolved against its directory
///
/// `typemaps.i` is provided by SWIG itself and never listed.
pub fn scan_includes(path: &Path) -> WeldResult<Vec<PathBuf>> {
    let text = fs::read_to_string(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(INCLUDE
        .captures_iter(&text)
        .map(|caps| caps[1].to_string())
        .filter(|inc| !inc.ends_with("typemaps.i"))
        .map(|inc| dir.join(inc))
        .collect())
}

/// Every file reachable from `roots` through `%include`, roots first
pub fn collect_includes(roots: &[PathBuf]) -> WeldResult<IndexSet<PathBuf>> {
    let mut seen: IndexSet<PathBuf> = IndexSet::new();
    let mut pending: Vec<PathBuf> = roots.iter().rev().cloned().collect();
    while let Some(path) = pending.pop() {
        if !seen.insert(path.clone()) {
            continue;
        }
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "include not found, listed without scanning");
            continue;
        }
        let mut nested = scan_includes(&path)?;
        nested.reverse();
        pending.extend(nested.into_iter().filter(|p| !seen.contains(p)));
    }
    Ok(seen)
}

/// Generator for `.<module>.dep` files
pub struct DepsGenerator<'a> {
    spec: &'a Spec,
    config: &'a Config,
    manifest: Option<&'a Path>,
}

impl<'a> DepsGenerator<'a> {
    pub fn new(spec: &'a Spec, config: &'a Config) -> Self {
        Self {
            spec,
            config,
            manifest: None,
        }
    }

    /// Also depend on the package manifest
    pub fn manifest(mut self, path: &'a Path) -> Self {
        self.manifest = Some(path);
        self
    }

    /// Inputs of the module's interface file
    pub fn dependencies(&self) -> WeldResult<Vec<PathBuf>> {
        let mut deps: IndexSet<PathBuf> = IndexSet::new();
        if let Some(manifest) = self.manifest {
            deps.insert(manifest.to_path_buf());
        }
        for item in &self.spec.items {
            deps.insert(self.config.decls_dir.join(format!("{}.json", item)));
        }
        let mut roots = self.config.common_includes.clone();
        roots.extend(
            self.spec
                .swig_includes
                .iter()
                .map(|inc| self.config.swig_dir.join(inc)),
        );
        deps.extend(collect_includes(&roots)?);
        Ok(deps.into_iter().collect())
    }

    /// Dependency rule text
    pub fn generate(&self) -> WeldResult<String> {
        let target = self.config.interface_file(&self.spec.module_name);
        let mut output = format!("# dependencies of module {}\n", self.spec.module_name);
        output.push_str(&format!("{}:", target.display()));
        for dep in self.dependencies()? {
            output.push_str(&format!(" \\\n  {}", dep.display()));
        }
        output.push('\n');
        Ok(output)
    }
}
