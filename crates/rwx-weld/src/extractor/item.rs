//! Attributes shared by every extracted declaration

use crate::diagnostics::{WeldError, WeldResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Member protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    /// Public (default)
    #[default]
    Public,
    /// Protected
    Protected,
}

impl Protection {
    /// Normalize a raw protection value; anything but public/protected is rejected
    pub fn parse(item: &str, raw: &str) -> WeldResult<Self> {
        match raw {
            "public" => Ok(Protection::Public),
            "protected" => Ok(Protection::Protected),
            other => Err(WeldError::extract(
                item,
                format!("Invalid protection [{}]", other),
            )),
        }
    }

    /// Keyword used in emitted C++ declarations
    pub fn keyword(&self) -> &'static str {
        match self {
            Protection::Public => "public",
            Protection::Protected => "protected",
        }
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Platform restriction of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformGuard {
    /// Exactly one platform
    Single(String),
    /// Any of several platforms
    Any(Vec<String>),
}

impl PlatformGuard {
    /// Preprocessor macro for a platform id (`msw` -> `__MSW__`)
    pub fn macro_name(id: &str) -> String {
        if id.starts_with("__") {
            id.to_string()
        } else {
            format!("__{}__", id.to_uppercase())
        }
    }

    /// Opening preprocessor line of the guard
    pub fn open(&self) -> String {
        match self {
            PlatformGuard::Single(id) => format!("#ifdef {}", Self::macro_name(id)),
            PlatformGuard::Any(ids) => format!(
                "#if {}",
                ids.iter()
                    .map(|id| format!("defined({})", Self::macro_name(id)))
                    .collect::<Vec<_>>()
                    .join(" || ")
            ),
        }
    }

    /// Closing preprocessor line of the guard
    pub fn close(&self) -> &'static str {
        "#endif"
    }

    /// Whether the guard admits a platform
    pub fn admits(&self, platform: &str) -> bool {
        let wanted = Self::macro_name(platform);
        match self {
            PlatformGuard::Single(id) => Self::macro_name(id) == wanted,
            PlatformGuard::Any(ids) => ids.iter().any(|id| Self::macro_name(id) == wanted),
        }
    }
}

impl From<&str> for PlatformGuard {
    fn from(id: &str) -> Self {
        PlatformGuard::Single(id.to_string())
    }
}

impl From<Vec<String>> for PlatformGuard {
    fn from(ids: Vec<String>) -> Self {
        if ids.len() == 1 {
            PlatformGuard::Single(ids[0].clone())
        } else {
            PlatformGuard::Any(ids)
        }
    }
}

/// Common attributes of every declaration kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Declared name
    pub name: String,
    /// Brief documentation
    pub brief_doc: Option<String>,
    /// Detailed documentation
    pub detailed_doc: Option<String>,
    /// Protection inside the owning class
    pub protection: Protection,
    /// Excluded from the generated interface
    pub ignored: bool,
    /// Excluded from the generated documentation
    pub ignore_doc: bool,
    /// Marked deprecated in the toolkit
    pub deprecated: bool,
    /// Platform restriction
    pub only_for: Option<PlatformGuard>,
}

impl ItemInfo {
    /// Create info for a public item
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set or clear the ignore flags
    pub fn ignore(&mut self, ignore: bool, ignore_doc: bool) {
        self.ignored = ignore;
        self.ignore_doc = ignore_doc;
    }

    /// Whether the item is part of the generated interface
    pub fn is_active(&self) -> bool {
        !self.ignored && !self.deprecated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protection_parse() {
        assert_eq!(Protection::parse("x", "public").unwrap(), Protection::Public);
        assert_eq!(Protection::parse("x", "protected").unwrap(), Protection::Protected);
        let err = Protection::parse("wxFrame::m_x", "private").unwrap_err();
        assert!(err.to_string().contains("Invalid protection [private]"));
    }

    #[test]
    fn test_platform_guard_lines() {
        let single = PlatformGuard::from("wxmsw");
        assert_eq!(single.open(), "#ifdef __WXMSW__");
        let any = PlatformGuard::Any(vec!["msw".into(), "gtk".into()]);
        assert_eq!(any.open(), "#if defined(__MSW__) || defined(__GTK__)");
        assert_eq!(any.close(), "#endif");
        assert!(any.admits("gtk"));
        assert!(!any.admits("osx"));
        assert_eq!(PlatformGuard::from("__WXGTK__").open(), "#ifdef __WXGTK__");
    }
}
