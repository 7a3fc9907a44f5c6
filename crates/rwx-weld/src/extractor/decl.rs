//! JSON declaration input
//!
//! Every declaration item (usually one toolkit header) is stored as
//! `<decls_dir>/<item>.json`:
//!
//! ```json
//! { "items": [
//!     { "kind": "class", "name": "wxFrame",
//!       "bases": [ { "name": "wxTopLevelWindow", "bases": [] } ],
//!       "members": [
//!         { "kind": "method", "name": "SetTitle", "virtual": true,
//!           "params": [ { "name": "title", "type": "const wxString &" } ] }
//!       ] },
//!     { "kind": "define", "name": "wxDEFAULT_FRAME_STYLE", "value": "0x20000" }
//! ] }
//! ```

use crate::diagnostics::WeldResult;
use crate::extractor::class::{BaseRef, ClassDef, ClassKind, Member};
use crate::extractor::enums::{EnumDef, EnumValueDef};
use crate::extractor::function::{MethodDef, ParamDef};
use crate::extractor::item::{ItemInfo, PlatformGuard, Protection};
use crate::extractor::module::Item;
use crate::extractor::variable::{DefineDef, GlobalVarDef, MemberVarDef, TypedefDef};
use serde::Deserialize;

/// Contents of one declaration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclFile {
    /// Declarations in header order
    #[serde(default)]
    pub items: Vec<DeclItem>,
}

/// Top-level declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeclItem {
    Class(ClassDecl),
    Function(MethodDecl),
    Enum(EnumDecl),
    Variable(VariableDecl),
    Typedef(TypedefDecl),
    Define(DefineDecl),
}

/// Class member declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberDecl {
    Method(MethodDecl),
    Variable(VariableDecl),
    Enum(EnumDecl),
    Class(ClassDecl),
}

/// Fields shared by every declaration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonDecl {
    pub name: String,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub detailed: Option<String>,
    #[serde(default)]
    pub protection: Option<String>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub only_for: Option<PlatformGuard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(default, rename = "struct")]
    pub is_struct: bool,
    #[serde(default)]
    pub bases: Vec<BaseRef>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "template")]
    pub is_template: bool,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamDecl {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub array: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default)]
    pub pure_virtual: bool,
    #[serde(default, rename = "override")]
    pub is_override: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default, rename = "template")]
    pub is_template: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValueDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(default)]
    pub values: Vec<EnumValueDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub args_string: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypedefDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefineDecl {
    #[serde(flatten)]
    pub common: CommonDecl,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "macro")]
    pub is_macro: bool,
}

impl DeclFile {
    /// Decode a declaration file
    pub fn from_json(text: &str) -> WeldResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert into model items
    pub fn into_items(self) -> WeldResult<Vec<Item>> {
        self.items.into_iter().map(DeclItem::into_item).collect()
    }
}

impl CommonDecl {
    fn into_info(self, scope: Option<&str>) -> WeldResult<ItemInfo> {
        let qualified = match scope {
            Some(scope) => format!("{}::{}", scope, self.name),
            None => self.name.clone(),
        };
        let protection = match self.protection.as_deref() {
            Some(raw) => Protection::parse(&qualified, raw)?,
            None => Protection::Public,
        };
        Ok(ItemInfo {
            // protected members stay hidden until regarded
            ignored: self.ignored || protection == Protection::Protected,
            name: self.name,
            brief_doc: self.brief.filter(|d| !d.trim().is_empty()),
            detailed_doc: self.detailed.filter(|d| !d.trim().is_empty()),
            protection,
            ignore_doc: false,
            deprecated: self.deprecated,
            only_for: self.only_for,
        })
    }
}

impl DeclItem {
    fn into_item(self) -> WeldResult<Item> {
        Ok(match self {
            DeclItem::Class(c) => Item::Class(c.into_class(None)?),
            DeclItem::Function(f) => Item::Function(f.into_method(None)?),
            DeclItem::Enum(e) => Item::Enum(e.into_enum(None)?),
            DeclItem::Variable(v) => {
                let info = v.common.into_info(None)?;
                Item::Variable(GlobalVarDef {
                    definition: format!("{} {}", v.ty, info.name),
                    info,
                    ty: v.ty,
                    args_string: v.args_string,
                    value: v.value,
                })
            }
            DeclItem::Typedef(t) => {
                let info = t.common.into_info(None)?;
                Item::Typedef(TypedefDef {
                    definition: format!("typedef {} {}", t.ty, info.name),
                    info,
                    ty: t.ty,
                })
            }
            DeclItem::Define(d) => Item::Define(DefineDef {
                info: d.common.into_info(None)?,
                value: d.value,
                is_macro: d.is_macro,
            }),
        })
    }
}

impl ClassDecl {
    fn into_class(self, scope: Option<&str>) -> WeldResult<ClassDef> {
        let info = self.common.into_info(scope)?;
        let name = info.name.clone();
        let mut class = ClassDef {
            info,
            kind: if self.is_struct {
                ClassKind::Struct
            } else {
                ClassKind::Class
            },
            bases: self.bases,
            members: Vec::new(),
            is_abstract: self.is_abstract,
            is_template: self.is_template,
            includes: self.includes,
            param_mappings: Vec::new(),
        };
        for member in self.members {
            let member = match member {
                MemberDecl::Method(m) => Member::Method(m.into_method(Some(&name))?),
                MemberDecl::Variable(v) => {
                    let is_static = v.is_static;
                    let info = v.common.into_info(Some(&name))?;
                    Member::Variable(MemberVarDef {
                        definition: format!("{} {}::{}", v.ty, name, info.name),
                        info,
                        ty: v.ty,
                        is_static,
                    })
                }
                MemberDecl::Enum(e) => Member::Enum(e.into_enum(Some(&name))?),
                MemberDecl::Class(c) => Member::Class(Box::new(c.into_class(Some(&name))?)),
            };
            class.add_member(member);
        }
        Ok(class)
    }
}

impl MethodDecl {
    fn into_method(self, class: Option<&str>) -> WeldResult<MethodDef> {
        let info = self.common.into_info(class)?;
        let is_ctor = class.is_some_and(|c| info.name == c) && self.ty.is_none();
        let is_dtor = info.name.starts_with('~');
        let params = self
            .params
            .into_iter()
            .map(|p| ParamDef {
                name: p.name,
                ty: p.ty,
                default: p.default,
                array: p.array,
            })
            .collect();

        Ok(MethodDef {
            definition: match class {
                Some(c) => format!("{}::{}", c, info.name),
                None => info.name.clone(),
            },
            is_operator: info.name.starts_with("operator"),
            class_name: class.map(str::to_string),
            return_type: if is_ctor || is_dtor {
                None
            } else {
                Some(self.ty.unwrap_or_else(|| "void".to_string()))
            },
            params,
            is_virtual: self.is_virtual || self.pure_virtual,
            is_pure_virtual: self.pure_virtual,
            is_override: self.is_override,
            is_static: self.is_static,
            is_const: self.is_const,
            is_ctor,
            is_dtor,
            is_template: self.is_template,
            overloads: Vec::new(),
            info,
        })
    }
}

impl EnumDecl {
    fn into_enum(self, scope: Option<&str>) -> WeldResult<EnumDef> {
        let info = self.common.into_info(scope)?;
        let values = self
            .values
            .into_iter()
            .map(|v| {
                Ok(EnumValueDef {
                    info: v.common.into_info(scope)?,
                    value: v.value,
                })
            })
            .collect::<WeldResult<Vec<_>>>()?;
        Ok(EnumDef {
            is_anonymous: info.name.is_empty() || info.name.starts_with('@'),
            info,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_DECLS: &str = r#"{
      "items": [
        { "kind": "class", "name": "wxFrame",
          "bases": [ { "name": "wxTopLevelWindow", "bases": [ { "name": "wxWindow" } ] } ],
          "members": [
            { "kind": "method", "name": "wxFrame" },
            { "kind": "method", "name": "wxFrame",
              "params": [ { "name": "parent", "type": "wxWindow *" },
                          { "name": "id", "type": "wxWindowID", "default": "wxID_ANY" } ] },
            { "kind": "method", "name": "~wxFrame", "virtual": true },
            { "kind": "method", "name": "SetStatusText", "type": "void", "virtual": true,
              "params": [ { "name": "text", "type": "const wxString &" } ] },
            { "kind": "method", "name": "DoGiveHelp", "protection": "protected", "virtual": true },
            { "kind": "variable", "name": "m_frameMenuBar", "type": "wxMenuBar *", "protection": "protected" }
          ] },
        { "kind": "define", "name": "wxDEFAULT_FRAME_STYLE", "value": "0x20000" },
        { "kind": "function", "name": "wxYield", "type": "bool", "deprecated": true },
        { "kind": "enum", "name": "", "values": [ { "name": "wxID_ANY", "value": "-1" } ] }
      ]
    }"#;

    #[test]
    fn test_decode_and_convert() {
        let items = DeclFile::from_json(FRAME_DECLS).unwrap().into_items().unwrap();
        assert_eq!(items.len(), 4);

        let Item::Class(frame) = &items[0] else {
            panic!("expected class");
        };
        assert!(frame.is_derived_from("wxWindow"));
        let ctor = frame.find_method("wxFrame").unwrap();
        assert!(ctor.is_ctor);
        assert_eq!(ctor.overloads.len(), 1);
        assert_eq!(ctor.overloads[0].signature(), "wxFrame(wxWindow*,wxWindowID)");

        let dtor = frame.find_method("~wxFrame").unwrap();
        assert!(dtor.is_dtor && dtor.return_type.is_none());

        let helper = frame.find_method("DoGiveHelp").unwrap();
        assert_eq!(helper.info.protection, Protection::Protected);
        assert!(helper.info.ignored);
        assert!(!frame.regards_protected_members());

        let Item::Enum(ids) = &items[3] else {
            panic!("expected enum");
        };
        assert!(ids.is_anonymous);
    }

    #[test]
    fn test_invalid_protection_is_fatal() {
        let json = r#"{ "items": [ { "kind": "class", "name": "wxFoo", "members": [
            { "kind": "variable", "name": "m_x", "type": "int", "protection": "private" } ] } ] }"#;
        let err = DeclFile::from_json(json).unwrap().into_items().unwrap_err();
        assert!(err.to_string().contains("wxFoo::m_x"));
        assert!(err.to_string().contains("Invalid protection [private]"));
    }
}
