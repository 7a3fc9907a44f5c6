//! Immutable per-module director configuration

use crate::extractor::{MethodDef, ParamMapping, PlatformGuard, Protection};
use crate::typemap::{MapApply, Typemap};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Garbage collection strategy of a wrapped class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GcType {
    /// Never tracked
    Never,
    /// Plain object
    Object,
    /// Window
    Window,
    /// Top-level frame
    Frame,
    /// Dialog
    Dialog,
    /// Event
    Event,
    /// Sizer
    Sizer,
    /// Temporary value
    Temp,
}

impl GcType {
    /// Macro emitted in the interface file
    pub fn macro_name(&self) -> &'static str {
        match self {
            GcType::Never => "GC_NEVER",
            GcType::Object => "GC_MANAGE_AS_OBJECT",
            GcType::Window => "GC_MANAGE_AS_WINDOW",
            GcType::Frame => "GC_MANAGE_AS_FRAME",
            GcType::Dialog => "GC_MANAGE_AS_DIALOG",
            GcType::Event => "GC_MANAGE_AS_EVENT",
            GcType::Sizer => "GC_MANAGE_AS_SIZER",
            GcType::Temp => "GC_MANAGE_AS_TEMP",
        }
    }
}

/// Kinds of declarations a module can skip generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenKind {
    Typedefs,
    Classes,
    Variables,
    Enums,
    Defines,
    Functions,
}

/// Verbatim code sections of the interface file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSection {
    /// `%header %{ ... %}`
    Header,
    /// `%begin %{ ... %}`
    Begin,
    /// Plain SWIG directives closing the begin section
    SwigBegin,
    /// `%runtime %{ ... %}`
    Runtime,
    /// Plain SWIG directives after the typemaps
    Swig,
    /// `%wrapper %{ ... %}`
    Wrapper,
    /// `%init %{ ... %}`
    Init,
    /// Replaces the default `%include` of the interface header
    Interface,
}

/// Visibility decision for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    /// Hide from the interface
    pub ignore: bool,
    /// Hide from the documentation
    pub ignore_doc: bool,
}

/// Finished policy of one module
///
/// Built by [`super::SpecBuilder`]; read-only afterwards and shared by the
/// analyzer and the generators.
#[derive(Debug, Clone, Default)]
pub struct Spec {
    pub module_name: String,
    pub package: String,
    pub director: Option<String>,
    pub items: Vec<String>,
    /// Ignore/regard decisions, last write per name
    pub visibility: IndexMap<String, Visibility>,
    pub only_for: Vec<(PlatformGuard, Vec<String>)>,
    pub renames: IndexMap<String, Vec<String>>,
    pub ruby_renames: IndexMap<String, Vec<String>>,
    pub folded_bases: IndexMap<String, Vec<String>>,
    pub ignored_bases: IndexMap<String, Vec<String>>,
    /// Bases dropped from every hierarchy
    pub common_ignored_bases: Vec<String>,
    pub override_bases: IndexMap<String, String>,
    pub inheritance_chains: IndexMap<String, Vec<String>>,
    pub disowns: Vec<(String, bool)>,
    pub new_objects: Vec<String>,
    pub extend_code: IndexMap<String, Vec<String>>,
    pub interface_extensions: IndexMap<String, Vec<(Protection, String)>>,
    pub abstracts: BTreeSet<String>,
    pub mixins: IndexSet<String>,
    pub gc_default: Option<GcType>,
    pub gc_types: IndexMap<String, GcType>,
    pub no_proxies: IndexSet<String>,
    pub forced_proxies: BTreeSet<String>,
    pub disabled_proxies: bool,
    pub typemaps: Vec<Typemap>,
    pub map_applies: Vec<MapApply>,
    pub param_mappings: IndexMap<String, Vec<ParamMapping>>,
    pub includes: IndexSet<String>,
    pub swig_includes: IndexSet<String>,
    pub swig_imports_prepend: IndexSet<String>,
    pub swig_imports_append: IndexSet<String>,
    pub code: BTreeMap<CodeSection, Vec<String>>,
    pub warn_filters: IndexMap<u32, Vec<String>>,
    pub no_gen: BTreeSet<GenKind>,
    pub templates_as_class: IndexMap<String, String>,
}

impl Spec {
    /// Joined code of a section
    pub fn code(&self, section: CodeSection) -> String {
        self.code
            .get(&section)
            .map(|c| c.join("\n"))
            .unwrap_or_default()
    }

    /// Whether a kind of declaration is generated
    pub fn generates(&self, kind: GenKind) -> bool {
        !self.no_gen.contains(&kind)
    }

    /// Name under which a class is generated (templates may be instantiated)
    pub fn class_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.templates_as_class
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Whether a template class is generated as a concrete class
    pub fn template_as_class(&self, name: &str) -> bool {
        self.templates_as_class.contains_key(name)
    }

    /// Folded bases declared for a class
    pub fn folded_bases(&self, class: &str) -> &[String] {
        self.folded_bases
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any class of the module folds `class`
    pub fn is_folded_base(&self, class: &str) -> bool {
        self.folded_bases
            .values()
            .any(|bases| bases.iter().any(|b| b == class))
    }

    /// Bases ignored for a class, including the common ones
    pub fn ignored_bases(&self, class: &str) -> Vec<String> {
        let mut bases = self.ignored_bases.get(class).cloned().unwrap_or_default();
        bases.extend(self.common_ignored_bases.iter().cloned());
        bases
    }

    /// Custom declarations added to a class interface
    pub fn interface_extensions(&self, class: &str, protection: Protection) -> Vec<&str> {
        self.interface_extensions
            .get(class)
            .map(|decls| {
                decls
                    .iter()
                    .filter(|(p, _)| *p == protection)
                    .map(|(_, d)| d.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a method of `class` gets a Ruby override hook
    pub fn has_method_proxy(&self, class: &str, method: &MethodDef) -> bool {
        if self.disabled_proxies || !method.is_virtual {
            return false;
        }
        let name = method.name();
        if self.no_proxies.contains(&format!("{}::{}", class, name)) {
            return false;
        }
        match &method.class_name {
            Some(owner) if owner != class => !self.no_proxies.contains(&format!("{}::{}", owner, name)),
            _ => true,
        }
    }

    /// Extension code for a class
    pub fn extend_code(&self, class: &str) -> &[String] {
        self.extend_code
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_method_proxy() {
        let mut spec = Spec::default();
        let draw = MethodDef::new("Draw").in_class("Shape").virtual_();
        assert!(spec.has_method_proxy("Circle", &draw));
        assert!(!spec.has_method_proxy("Circle", &MethodDef::new("Area").in_class("Shape")));

        spec.no_proxies.insert("Shape::Draw".to_string());
        assert!(!spec.has_method_proxy("Circle", &draw));
        assert!(!spec.has_method_proxy("Shape", &draw));

        let own = MethodDef::new("Draw").in_class("Circle").virtual_();
        assert!(spec.has_method_proxy("Circle", &own));

        spec.disabled_proxies = true;
        assert!(!spec.has_method_proxy("Circle", &own));
    }

    #[test]
    fn test_ignored_bases_include_common() {
        let mut spec = Spec {
            common_ignored_bases: vec!["wxTrackable".into()],
            ..Default::default()
        };
        spec.ignored_bases
            .insert("wxGridSizeEvent".into(), vec!["wxNotifyEvent".into()]);
        assert_eq!(
            spec.ignored_bases("wxGridSizeEvent"),
            vec!["wxNotifyEvent".to_string(), "wxTrackable".to_string()]
        );
        assert_eq!(spec.ignored_bases("wxFrame"), vec!["wxTrackable".to_string()]);
        assert_eq!(GcType::Window.macro_name(), "GC_MANAGE_AS_WINDOW");
    }
}
