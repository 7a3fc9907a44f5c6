//! Generated file output

use crate::diagnostics::WeldResult;
use std::fs;
use std::path::Path;

/// Write `content` to `path` unless the file already holds it
///
/// Returns whether the file was written. Parent directories are created.
pub fn write_if_changed(path: &Path, content: &str) -> WeldResult<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            tracing::trace!(path = %path.display(), "unchanged");
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_only_on_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("swig/include/wxFrame.h");
        assert!(write_if_changed(&path, "a").unwrap());
        assert!(!write_if_changed(&path, "a").unwrap());
        assert!(write_if_changed(&path, "b").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }
}
