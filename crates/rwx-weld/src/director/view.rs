//! Policy-aware queries over an extracted module

use crate::diagnostics::{WeldError, WeldResult};
use crate::director::spec::{GcType, Spec};
use crate::extractor::{BaseRef, ClassDef, MethodDef, ModuleDef};
use indexmap::IndexSet;

/// A module's definitions seen through its policy
#[derive(Debug, Clone, Copy)]
pub struct ModuleView<'a> {
    spec: &'a Spec,
    module: &'a ModuleDef,
}

impl<'a> ModuleView<'a> {
    pub fn new(spec: &'a Spec, module: &'a ModuleDef) -> Self {
        Self { spec, module }
    }

    pub fn spec(&self) -> &'a Spec {
        self.spec
    }

    pub fn module(&self) -> &'a ModuleDef {
        self.module
    }

    pub fn module_name(&self) -> &'a str {
        &self.spec.module_name
    }

    /// Class defined by this module
    pub fn find_class(&self, name: &str) -> Option<&'a ClassDef> {
        self.module.find_class(name)
    }

    /// Whether the module defines a class of that name
    pub fn defines_class(&self, name: &str) -> bool {
        self.module.find_class(name).is_some()
    }

    pub fn is_folded_base(&self, name: &str) -> bool {
        self.spec.is_folded_base(name)
    }

    /// Classes generated as their own interface class
    pub fn generated_classes(&self) -> impl Iterator<Item = &'a ClassDef> + 'a {
        let spec = self.spec;
        self.module.classes().filter(move |c| {
            !c.info.ignored
                && (!c.is_template || spec.template_as_class(c.name()))
                && !spec.is_folded_base(c.name())
        })
    }

    /// Nearest non-folded, non-ignored base class
    ///
    /// Fails when more than one base remains at any level.
    pub fn base_class(&self, class: &ClassDef) -> WeldResult<Option<String>> {
        if let Some(base) = self.spec.override_bases.get(class.name()) {
            return Ok(Some(base.clone()));
        }
        self.select_base(
            class.name(),
            &class.bases,
            self.spec.folded_bases(class.name()),
            &self.spec.ignored_bases(class.name()),
        )
    }

    fn select_base(
        &self,
        class: &str,
        hierarchy: &[BaseRef],
        folded: &[String],
        ignored: &[String],
    ) -> WeldResult<Option<String>> {
        let remaining: Vec<&BaseRef> = hierarchy
            .iter()
            .filter(|b| !ignored.contains(&b.name))
            .collect();
        if remaining.len() > 1 {
            let names: Vec<&str> = remaining.iter().map(|b| b.name.as_str()).collect();
            return Err(WeldError::hierarchy(
                class,
                format!(
                    "Cannot determine base class from multiple inheritance hierarchy: {}",
                    names.join(", ")
                ),
            ));
        }
        let Some(base) = remaining.first() else {
            return Ok(None);
        };
        if !folded.contains(&base.name) {
            return Ok(Some(base.name.clone()));
        }
        self.select_base(
            class,
            &base.bases,
            self.spec.folded_bases(&base.name),
            &self.spec.ignored_bases(&base.name),
        )
    }

    /// Every non-folded, non-ignored ancestor, nearest first
    pub fn base_list(&self, class: &ClassDef) -> Vec<String> {
        let mut list = IndexSet::new();
        self.collect_bases(
            &class.bases,
            self.spec.folded_bases(class.name()),
            &self.spec.ignored_bases(class.name()),
            &mut list,
        );
        list.into_iter().collect()
    }

    fn collect_bases(
        &self,
        hierarchy: &[BaseRef],
        folded: &[String],
        ignored: &[String],
        list: &mut IndexSet<String>,
    ) {
        for base in hierarchy.iter().filter(|b| !ignored.contains(&b.name)) {
            if !folded.contains(&base.name) {
                list.insert(base.name.clone());
            }
            self.collect_bases(
                &base.bases,
                self.spec.folded_bases(&base.name),
                &self.spec.ignored_bases(&base.name),
                list,
            );
        }
    }

    pub fn is_abstract(&self, class: &ClassDef) -> bool {
        self.spec.abstracts.contains(class.name()) || class.is_abstract
    }

    /// GC strategy: explicit policy first, else derived from the hierarchy
    pub fn gc_type(&self, class: &ClassDef) -> GcType {
        if let Some(kind) = self.spec.gc_types.get(class.name()) {
            return *kind;
        }
        if let Some(kind) = self.spec.gc_default {
            return kind;
        }
        let derived = |name: &str| class.is_derived_from(name);
        if derived("wxEvent") {
            GcType::Event
        } else if derived("wxFrame") {
            GcType::Frame
        } else if derived("wxDialog") {
            GcType::Dialog
        } else if derived("wxWindow") {
            GcType::Window
        } else if derived("wxSizer") {
            GcType::Sizer
        } else if derived("wxObject") || class.name() == "wxObject" {
            GcType::Object
        } else {
            GcType::Temp
        }
    }

    /// Whether a class gets a director (Ruby subclass hook)
    pub fn has_proxy(&self, class: &ClassDef) -> bool {
        if self.spec.disabled_proxies {
            return false;
        }
        self.spec.forced_proxies.contains(class.name())
            || class.has_virtuals()
            || self
                .spec
                .folded_bases(class.name())
                .iter()
                .filter_map(|b| self.module.find_class(b))
                .any(ClassDef::has_virtuals)
    }

    pub fn has_method_proxy(&self, class: &str, method: &MethodDef) -> bool {
        self.spec.has_method_proxy(class, method)
    }
}
