//! Variable-like declarations
//!
//! Global variables, member variables, typedefs and defines are plain
//! attribute bags.

use crate::extractor::item::ItemInfo;
use serde::{Deserialize, Serialize};

/// A global variable or constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVarDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Native type
    pub ty: String,
    /// Definition text
    pub definition: String,
    /// Trailing declarator text (e.g. `[]`)
    pub args_string: String,
    /// Initializer
    pub value: Option<String>,
}

impl GlobalVarDef {
    /// Create a new global variable
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        Self {
            definition: format!("{} {}", ty, name),
            info: ItemInfo::new(name),
            ty,
            args_string: String::new(),
            value: None,
        }
    }
}

/// A member variable of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberVarDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Native type
    pub ty: String,
    /// Definition text
    pub definition: String,
    /// Declared static
    pub is_static: bool,
}

impl MemberVarDef {
    /// Create a new member variable
    pub fn new(class: &str, name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        Self {
            definition: format!("{} {}::{}", ty, class, name),
            info: ItemInfo::new(name),
            ty,
            is_static: false,
        }
    }
}

/// A typedef
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedefDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Aliased type
    pub ty: String,
    /// Full definition text (`typedef int wxCoord`)
    pub definition: String,
}

impl TypedefDef {
    /// Create a new typedef
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        Self {
            definition: format!("typedef {} {}", ty, name),
            info: ItemInfo::new(name),
            ty,
        }
    }
}

/// A `#define` with a name and a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Replacement value
    pub value: Option<String>,
    /// Function-like macro
    pub is_macro: bool,
}

impl DefineDef {
    /// Create a new define
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            info: ItemInfo::new(name),
            value: Some(value.into()),
            is_macro: false,
        }
    }

    /// Whether the define yields a constant
    pub fn is_constant(&self) -> bool {
        !self.info.ignored
            && !self.is_macro
            && self.value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}
