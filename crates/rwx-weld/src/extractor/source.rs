//! Declaration sources
//!
//! The extractor reads declaration items through the [`DeclSource`] trait.
//! Sources compose: [`ValidatingSource`] wraps any other source and checks
//! every file it hands out.

use crate::diagnostics::{WeldError, WeldResult};
use crate::extractor::decl::{DeclFile, DeclItem, MemberDecl};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Provider of declaration files by item name
pub trait DeclSource: Send + Sync {
    /// Load the declarations of one item
    fn load(&self, item: &str) -> WeldResult<DeclFile>;

    /// File backing an item, if any (used for dependency tracking)
    fn origin(&self, _item: &str) -> Option<PathBuf> {
        None
    }
}

/// Reads `<dir>/<item>.json`
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    /// Create a source over a directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the declaration files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, item: &str) -> PathBuf {
        self.dir.join(format!("{}.json", item))
    }

    /// Item names available in the directory, sorted
    pub fn available(&self) -> Vec<String> {
        let mut items: Vec<String> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.path();
                match path.extension().and_then(|x| x.to_str()) {
                    Some("json") => path.file_stem()?.to_str().map(str::to_string),
                    _ => None,
                }
            })
            .collect();
        items.sort();
        items
    }
}

impl DeclSource for JsonDirSource {
    fn load(&self, item: &str) -> WeldResult<DeclFile> {
        let path = self.path_for(item);
        if !path.is_file() {
            return Err(WeldError::FileNotFound(path));
        }
        tracing::debug!(item = %item, path = %path.display(), "loading declarations");
        let text = fs::read_to_string(&path)?;
        DeclFile::from_json(&text).map_err(|e| WeldError::extract(item, e.to_string()))
    }

    fn origin(&self, item: &str) -> Option<PathBuf> {
        Some(self.path_for(item))
    }
}

/// Declarations held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, DeclFile>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item from JSON text
    pub fn with_json(mut self, item: impl Into<String>, json: &str) -> WeldResult<Self> {
        self.files.insert(item.into(), DeclFile::from_json(json)?);
        Ok(self)
    }

    /// Add an already decoded item
    pub fn insert(&mut self, item: impl Into<String>, file: DeclFile) {
        self.files.insert(item.into(), file);
    }
}

impl DeclSource for MemorySource {
    fn load(&self, item: &str) -> WeldResult<DeclFile> {
        self.files
            .get(item)
            .cloned()
            .ok_or_else(|| WeldError::extract(item, "no declarations available"))
    }
}

/// Decorator rejecting malformed declaration files
#[derive(Debug, Clone)]
pub struct ValidatingSource<S> {
    inner: S,
}

impl<S: DeclSource> ValidatingSource<S> {
    /// Wrap a source
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    fn validate(item: &str, file: &DeclFile) -> WeldResult<()> {
        let mut seen = HashSet::new();
        for decl in &file.items {
            let (kind, name) = match decl {
                DeclItem::Class(c) => {
                    Self::validate_members(item, &c.common.name, &c.members)?;
                    ("class", &c.common.name)
                }
                DeclItem::Function(f) => ("function", &f.common.name),
                DeclItem::Enum(e) => ("enum", &e.common.name),
                DeclItem::Variable(v) => ("variable", &v.common.name),
                DeclItem::Typedef(t) => ("typedef", &t.common.name),
                DeclItem::Define(d) => ("define", &d.common.name),
            };
            if name.trim().is_empty() && kind != "enum" {
                return Err(WeldError::extract(item, format!("unnamed {} declaration", kind)));
            }
            // functions repeat for overloads, anonymous enums repeat freely
            if kind != "function" && !name.is_empty() && !seen.insert((kind, name.as_str())) {
                return Err(WeldError::extract(
                    item,
                    format!("duplicate {} declaration '{}'", kind, name),
                ));
            }
        }
        Ok(())
    }

    fn validate_members(item: &str, class: &str, members: &[MemberDecl]) -> WeldResult<()> {
        for member in members {
            let name = match member {
                MemberDecl::Method(m) => &m.common.name,
                MemberDecl::Variable(v) => &v.common.name,
                MemberDecl::Enum(_) => continue,
                MemberDecl::Class(c) => {
                    Self::validate_members(item, &c.common.name, &c.members)?;
                    &c.common.name
                }
            };
            if name.trim().is_empty() {
                return Err(WeldError::extract(
                    item,
                    format!("unnamed member in class {}", class),
                ));
            }
        }
        Ok(())
    }
}

impl<S: DeclSource> DeclSource for ValidatingSource<S> {
    fn load(&self, item: &str) -> WeldResult<DeclFile> {
        let file = self.inner.load(item)?;
        Self::validate(item, &file)?;
        Ok(file)
    }

    fn origin(&self, item: &str) -> Option<PathBuf> {
        self.inner.origin(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_dir_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("wxButton.json"),
            r#"{ "items": [ { "kind": "class", "name": "wxButton" } ] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = JsonDirSource::new(dir.path());
        assert_eq!(source.available(), vec!["wxButton".to_string()]);
        assert_eq!(source.load("wxButton").unwrap().items.len(), 1);
        assert!(matches!(
            source.load("wxMissing"),
            Err(WeldError::FileNotFound(_))
        ));
        assert!(source.origin("wxButton").unwrap().ends_with("wxButton.json"));
    }

    #[test]
    fn test_validating_source_rejects_duplicates() {
        let inner = MemorySource::new()
            .with_json(
                "dup",
                r#"{ "items": [ { "kind": "class", "name": "wxA" }, { "kind": "class", "name": "wxA" } ] }"#,
            )
            .unwrap()
            .with_json(
                "overloads",
                r#"{ "items": [ { "kind": "function", "name": "wxMin" }, { "kind": "function", "name": "wxMin" } ] }"#,
            )
            .unwrap();
        let source = ValidatingSource::new(inner);
        let err = source.load("dup").unwrap_err();
        assert!(err.to_string().contains("duplicate class declaration 'wxA'"));
        assert_eq!(source.load("overloads").unwrap().items.len(), 2);
        assert!(source.load("absent").is_err());
    }

    #[test]
    fn test_validating_source_rejects_unnamed_members() {
        let inner = MemorySource::new()
            .with_json(
                "bad",
                r#"{ "items": [ { "kind": "class", "name": "wxA", "members": [ { "kind": "method", "name": " " } ] } ] }"#,
            )
            .unwrap();
        let err = ValidatingSource::new(inner).load("bad").unwrap_err();
        assert!(err.to_string().contains("unnamed member in class wxA"));
    }
}
