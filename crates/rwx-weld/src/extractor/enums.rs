//! Enumeration declarations

use crate::extractor::item::ItemInfo;
use serde::{Deserialize, Serialize};

/// One enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Explicit initializer
    pub value: Option<String>,
}

impl EnumValueDef {
    /// Create a new enumerator
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: ItemInfo::new(name),
            value: None,
        }
    }
}

/// An enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Anonymous enum (`enum { ... }`)
    pub is_anonymous: bool,
    /// Enumerators
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    /// Create a new named enum
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            is_anonymous: name.is_empty() || name.starts_with('@'),
            info: ItemInfo::new(name),
            values: Vec::new(),
        }
    }

    /// Add an enumerator
    pub fn value(mut self, name: impl Into<String>) -> Self {
        self.values.push(EnumValueDef::new(name));
        self
    }

    /// Whether any enumerator survives ignores
    pub fn has_active_values(&self) -> bool {
        self.values.iter().any(|v| !v.info.ignored)
    }
}
