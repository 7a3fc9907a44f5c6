//! Method and function declarations
//!
//! A [`MethodDef`] describes one member function or free function. Methods
//! sharing a name are chained: the first declared method owns the list of
//! its overloads, and [`MethodDef::signature`] is the identity key used by
//! every later stage.

use crate::extractor::item::{ItemInfo, PlatformGuard, Protection};
use serde::{Deserialize, Serialize};

/// Parameter of a method or function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamDef {
    /// Parameter name (may be empty for unnamed parameters)
    pub name: String,
    /// Native type text (e.g. `const wxString &`)
    pub ty: String,
    /// Default value expression
    pub default: Option<String>,
    /// Declared with array brackets
    pub array: bool,
}

impl ParamDef {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
            array: false,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Mark as array parameter
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Normalized type used in signatures
    pub fn signature_type(&self) -> String {
        let ty = normalize_type(&self.ty);
        if self.array {
            format!("{}[]", ty)
        } else {
            ty
        }
    }

    /// Declaration text of the parameter
    pub fn declaration(&self) -> String {
        let mut decl = self.ty.clone();
        if !self.name.is_empty() {
            decl.push(' ');
            decl.push_str(&self.name);
        }
        if self.array {
            decl.push_str("[]");
        }
        if let Some(default) = &self.default {
            decl.push('=');
            decl.push_str(default);
        }
        decl
    }
}

/// A method (or free function when `class_name` is `None`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Common attributes
    pub info: ItemInfo,
    /// Owning class
    pub class_name: Option<String>,
    /// Return type; `None` for constructors and destructors
    pub return_type: Option<String>,
    /// Parameters
    pub params: Vec<ParamDef>,
    /// Fully qualified definition text (`void wxFrame::SetTitle`)
    pub definition: String,
    /// Declared virtual
    pub is_virtual: bool,
    /// Declared pure virtual (`= 0`)
    pub is_pure_virtual: bool,
    /// Declared `override`
    pub is_override: bool,
    /// Declared static
    pub is_static: bool,
    /// Declared const
    pub is_const: bool,
    /// Constructor
    pub is_ctor: bool,
    /// Destructor
    pub is_dtor: bool,
    /// Operator overload
    pub is_operator: bool,
    /// Member template
    pub is_template: bool,
    /// Further overloads (only populated on the first declared method)
    pub overloads: Vec<MethodDef>,
}

impl MethodDef {
    /// Create a new public method returning void
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let is_operator = name.starts_with("operator");
        Self {
            info: ItemInfo::new(name),
            class_name: None,
            return_type: Some("void".to_string()),
            params: Vec::new(),
            definition: String::new(),
            is_virtual: false,
            is_pure_virtual: false,
            is_override: false,
            is_static: false,
            is_const: false,
            is_ctor: false,
            is_dtor: false,
            is_operator,
            is_template: false,
            overloads: Vec::new(),
        }
    }

    /// Create a constructor for a class
    pub fn ctor(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let mut m = Self::new(class_name.clone()).in_class(class_name);
        m.return_type = None;
        m.is_ctor = true;
        m
    }

    /// Create a destructor for a class
    pub fn dtor(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let mut m = Self::new(format!("~{}", class_name)).in_class(class_name);
        m.return_type = None;
        m.is_dtor = true;
        m
    }

    /// Set the owning class
    pub fn in_class(mut self, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        self.definition = format!("{}::{}", class_name, self.info.name);
        self.class_name = Some(class_name);
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Add a parameter
    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    /// Mark as virtual
    pub fn virtual_(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Mark as pure virtual
    pub fn pure_virtual(mut self) -> Self {
        self.is_virtual = true;
        self.is_pure_virtual = true;
        self
    }

    /// Mark as static
    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as const
    pub fn const_(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Mark as override
    pub fn override_(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// Set protection
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.info.protection = protection;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.info.deprecated = true;
        self
    }

    /// Restrict to platforms
    pub fn only_for(mut self, guard: PlatformGuard) -> Self {
        self.info.only_for = Some(guard);
        self
    }

    /// Set the brief documentation
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.info.brief_doc = Some(doc.into());
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Return type text (`void` when unset)
    pub fn type_text(&self) -> &str {
        self.return_type.as_deref().unwrap_or("void")
    }

    /// Whether the method returns nothing
    pub fn is_void(&self) -> bool {
        normalize_type(self.type_text()) == "void"
    }

    /// Identity key: name plus argument types (and constness)
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.params.iter().map(|p| p.signature_type()).collect();
        format!(
            "{}({}){}",
            self.info.name,
            types.join(","),
            if self.is_const { " const" } else { "" }
        )
    }

    /// Argument list text as written in declarations
    pub fn args_string(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.declaration()).collect();
        format!(
            "({}){}",
            params.join(", "),
            if self.is_const { " const" } else { "" }
        )
    }

    /// Iterate this method followed by its overloads
    pub fn all(&self) -> impl Iterator<Item = &MethodDef> {
        std::iter::once(self).chain(self.overloads.iter())
    }

    /// Mutably visit this method and its overloads
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut MethodDef)) {
        f(self);
        for ovl in &mut self.overloads {
            f(ovl);
        }
    }

    /// Find the overload with a given argument type list
    pub fn find_overload(&self, arg_types: &[String]) -> Option<&MethodDef> {
        self.all().find(|m| m.matches_arg_types(arg_types))
    }

    /// Mutable variant of [`MethodDef::find_overload`]
    pub fn find_overload_mut(&mut self, arg_types: &[String]) -> Option<&mut MethodDef> {
        if self.matches_arg_types(arg_types) {
            return Some(self);
        }
        self.overloads
            .iter_mut()
            .find(|m| m.matches_arg_types(arg_types))
    }

    fn matches_arg_types(&self, arg_types: &[String]) -> bool {
        self.params.len() == arg_types.len()
            && self
                .params
                .iter()
                .zip(arg_types)
                .all(|(p, t)| p.signature_type() == normalize_type(t))
    }

    /// Chain a method as overload of this one
    pub fn add_overload(&mut self, mut method: MethodDef) {
        let nested = std::mem::take(&mut method.overloads);
        self.overloads.push(method);
        self.overloads.extend(nested);
    }
}

/// Normalize native type text so equal types compare equal
pub fn normalize_type(ty: &str) -> String {
    let mut out = String::with_capacity(ty.len());
    for word in ty.split_whitespace() {
        let glued = word.starts_with(['*', '&', '>', ',', '[', ']']) || out.ends_with(['<', ',']);
        if !out.is_empty() && !glued {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Chain methods sharing a name into overload lists rooted at the first one
pub fn chain_overloads(methods: Vec<MethodDef>) -> Vec<MethodDef> {
    let mut chained: Vec<MethodDef> = Vec::with_capacity(methods.len());
    for method in methods {
        match chained
            .iter_mut()
            .find(|m| m.info.name == method.info.name && m.is_ctor == method.is_ctor)
        {
            Some(first) => first.add_overload(method),
            None => chained.push(method),
        }
    }
    chained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("const  wxString &"), "const wxString&");
        assert_eq!(normalize_type("wxWindow *"), "wxWindow*");
        assert_eq!(normalize_type("char * *"), "char**");
        assert_eq!(normalize_type("wxWindow * const"), "wxWindow* const");
        assert_eq!(normalize_type("std::vector< wxString >"), "std::vector<wxString>");
    }

    #[test]
    fn test_signature_and_args() {
        let m = MethodDef::new("SetTitle")
            .in_class("wxFrame")
            .param(ParamDef::new("title", "const wxString &"))
            .param(ParamDef::new("flags", "int").with_default("0"))
            .virtual_();

        assert_eq!(m.signature(), "SetTitle(const wxString&,int)");
        assert_eq!(m.args_string(), "(const wxString & title, int flags=0)");
        assert_eq!(m.definition, "wxFrame::SetTitle");

        let c = MethodDef::new("GetTitle").returns("wxString").const_();
        assert_eq!(c.signature(), "GetTitle() const");
        assert!(!c.is_void());
    }

    #[test]
    fn test_chain_overloads() {
        let methods = vec![
            MethodDef::new("Append").param(ParamDef::new("item", "const wxString &")),
            MethodDef::new("Clear"),
            MethodDef::new("Append").param(ParamDef::new("items", "const wxArrayString &")),
        ];
        let chained = chain_overloads(methods);
        assert_eq!(chained.len(), 2);
        assert_eq!(chained[0].overloads.len(), 1);
        assert_eq!(chained[0].all().count(), 2);

        let found = chained[0]
            .find_overload(&["const wxArrayString&".to_string()])
            .unwrap();
        assert_eq!(found.params[0].name, "items");
    }

    #[test]
    fn test_ctor_dtor() {
        let c = MethodDef::ctor("wxFrame");
        assert!(c.is_ctor);
        assert_eq!(c.name(), "wxFrame");
        let d = MethodDef::dtor("wxFrame");
        assert!(d.is_dtor);
        assert_eq!(d.name(), "~wxFrame");
        assert!(MethodDef::new("operator==").is_operator);
    }
}
