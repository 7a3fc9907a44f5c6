//! Class and struct declarations

use crate::extractor::enums::EnumDef;
use crate::extractor::function::{normalize_type, MethodDef};
use crate::extractor::item::{ItemInfo, Protection};
use crate::extractor::variable::MemberVarDef;
use serde::{Deserialize, Serialize};

/// Class or struct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// `class` (members default to private)
    #[default]
    Class,
    /// `struct` (members default to public)
    Struct,
}

impl ClassKind {
    /// Keyword used in emitted declarations
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Struct => "struct",
        }
    }
}

/// One node of an inheritance hierarchy: a base class and its own bases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRef {
    /// Base class name
    pub name: String,
    /// Bases of this base, in declaration order
    #[serde(default)]
    pub bases: Vec<BaseRef>,
}

impl BaseRef {
    /// Create a base without further ancestors
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
        }
    }

    /// Add an ancestor of this base
    pub fn base(mut self, base: BaseRef) -> Self {
        self.bases.push(base);
        self
    }

    /// Build a single-inheritance chain from nearest to farthest ancestor
    pub fn chain<S: AsRef<str>>(names: &[S]) -> Option<BaseRef> {
        names.iter().rev().fold(None, |acc, name| {
            let mut node = BaseRef::new(name.as_ref());
            node.bases.extend(acc);
            Some(node)
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.name == name || self.bases.iter().any(|b| b.contains(name))
    }
}

/// Parameter mapping declared for a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMapping {
    /// Parameter declaration to replace
    pub from: String,
    /// Replacement declaration text
    pub to: String,
}

/// A member of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Member {
    /// Method with its overload chain
    Method(MethodDef),
    /// Member variable
    Variable(MemberVarDef),
    /// Nested enum
    Enum(EnumDef),
    /// Inner class
    Class(Box<ClassDef>),
}

impl Member {
    /// Common attributes of the member
    pub fn info(&self) -> &ItemInfo {
        match self {
            Member::Method(m) => &m.info,
            Member::Variable(v) => &v.info,
            Member::Enum(e) => &e.info,
            Member::Class(c) => &c.info,
        }
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.info().name
    }
}

/// A class or struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Class or struct
    pub kind: ClassKind,
    /// Direct bases with their own hierarchies
    pub bases: Vec<BaseRef>,
    /// Members in declaration order
    pub members: Vec<Member>,
    /// Declared abstract
    pub is_abstract: bool,
    /// Class template
    pub is_template: bool,
    /// Extra headers this class needs
    pub includes: Vec<String>,
    /// Parameter mappings applied when emitting member declarations
    pub param_mappings: Vec<ParamMapping>,
}

impl ClassDef {
    /// Create a new class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: ItemInfo::new(name),
            kind: ClassKind::Class,
            bases: Vec::new(),
            members: Vec::new(),
            is_abstract: false,
            is_template: false,
            includes: Vec::new(),
            param_mappings: Vec::new(),
        }
    }

    /// Create a new struct
    pub fn new_struct(name: impl Into<String>) -> Self {
        let mut class = Self::new(name);
        class.kind = ClassKind::Struct;
        class
    }

    /// Add a direct base
    pub fn base(mut self, base: BaseRef) -> Self {
        self.bases.push(base);
        self
    }

    /// Add a method, chaining it to an earlier method of the same name
    pub fn method(mut self, method: MethodDef) -> Self {
        self.add_member(Member::Method(method));
        self
    }

    /// Add a member variable
    pub fn variable(mut self, var: MemberVarDef) -> Self {
        self.add_member(Member::Variable(var));
        self
    }

    /// Mark as abstract
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Add a member; methods sharing a name are chained as overloads
    pub fn add_member(&mut self, member: Member) {
        if let Member::Method(mut method) = member {
            if method.class_name.is_none() {
                method = method.in_class(self.info.name.clone());
            }
            let existing = self.members.iter_mut().find_map(|m| match m {
                Member::Method(first)
                    if first.info.name == method.info.name && first.is_ctor == method.is_ctor =>
                {
                    Some(first)
                }
                _ => None,
            });
            match existing {
                Some(first) => first.add_overload(method),
                None => self.members.push(Member::Method(method)),
            }
        } else {
            self.members.push(member);
        }
    }

    /// Iterate the methods (overload roots)
    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    /// Iterate the inner classes
    pub fn inner_classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Class(c) => Some(c.as_ref()),
            _ => None,
        })
    }

    /// Find a method (overload root) by name
    pub fn find_method(&self, name: &str) -> Option<&MethodDef> {
        self.methods().find(|m| m.info.name == name)
    }

    /// Whether the class derives (directly or indirectly) from `name`
    pub fn is_derived_from(&self, name: &str) -> bool {
        self.bases.iter().any(|b| b.contains(name))
    }

    /// Whether any protected member has been regarded (un-ignored)
    pub fn regards_protected_members(&self) -> bool {
        self.members.iter().any(|m| match m {
            Member::Method(method) => method
                .all()
                .any(|o| o.info.protection == Protection::Protected && !o.info.ignored),
            other => {
                let info = other.info();
                info.protection == Protection::Protected && !info.ignored
            }
        })
    }

    /// Whether any active method is virtual
    pub fn has_virtuals(&self) -> bool {
        self.methods()
            .flat_map(|m| m.all())
            .any(|m| m.is_virtual && !m.is_ctor && !m.is_dtor && !m.info.ignored)
    }

    /// Replace the hierarchy by a single-inheritance chain
    pub fn set_inheritance_chain<S: AsRef<str>>(&mut self, chain: &[S]) {
        self.bases = BaseRef::chain(chain).into_iter().collect();
    }

    /// Apply the parameter mappings to a declaration argument list
    pub fn map_params(&self, method: &MethodDef) -> String {
        if self.param_mappings.is_empty() {
            return method.args_string();
        }
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| {
                let decl = p.declaration();
                let plain = decl.split('=').next().unwrap_or(&decl).trim().to_string();
                match self
                    .param_mappings
                    .iter()
                    .find(|pm| normalize_type(&pm.from) == normalize_type(&plain))
                {
                    Some(pm) => pm.to.clone(),
                    None => decl,
                }
            })
            .collect();
        format!(
            "({}){}",
            params.join(", "),
            if method.is_const { " const" } else { "" }
        )
    }
}
