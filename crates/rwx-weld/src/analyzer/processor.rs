//! Per-class preprocessing into a [`ClassRegistry`]

use crate::analyzer::registry::{ClassRegistry, MethodEntry, RegisteredMember};
use crate::diagnostics::{WeldError, WeldResult};
use crate::director::ModuleView;
use crate::extractor::{is_method_decl, parse_method_decl, ClassDef, ClassKind, Member, MethodDef, Protection};

/// Builds the generated interface of one class
pub struct ClassProcessor<'a> {
    view: ModuleView<'a>,
    class: &'a ClassDef,
    class_name: String,
    registry: ClassRegistry,
    requires_pure_virtual: bool,
    /// Methods registered so far, for override and shadowing checks
    seen: Vec<MethodDef>,
}

impl<'a> ClassProcessor<'a> {
    pub fn new(view: ModuleView<'a>, class: &'a ClassDef) -> Self {
        Self {
            class_name: view.spec().class_name(class.name()).to_string(),
            requires_pure_virtual: view.has_proxy(class),
            view,
            class,
            registry: ClassRegistry::new(),
            seen: Vec::new(),
        }
    }

    /// Name the class is generated under
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Walk the class and return its registry
    pub fn preprocess(mut self) -> WeldResult<ClassRegistry> {
        tracing::trace!(module = %self.view.module_name(), class = %self.class_name, "preprocessing class");

        for inner in self.class.inner_classes() {
            if inner.info.protection == Protection::Public && inner.info.is_active() {
                self.registry
                    .push_member(true, RegisteredMember::InnerClass(inner.clone()));
            }
        }

        let folded = self.folded_bases()?;

        self.register_members(self.class, Protection::Public);
        for base in &folded {
            self.register_members(base, Protection::Public);
        }
        for decl in self.extensions(Protection::Public) {
            self.register_custom(Protection::Public, &decl)?;
        }

        let need_protected = self.class.regards_protected_members()
            || !self.extensions(Protection::Protected).is_empty()
            || folded.iter().any(|b| b.regards_protected_members());
        if self.class.kind != ClassKind::Struct && need_protected {
            self.register_members(self.class, Protection::Protected);
            for base in &folded {
                self.register_members(base, Protection::Protected);
            }
            for decl in self.extensions(Protection::Protected) {
                self.register_custom(Protection::Protected, &decl)?;
            }
        }

        Ok(self.registry)
    }

    /// Folded base definitions, each walked once
    fn folded_bases(&self) -> WeldResult<Vec<&'a ClassDef>> {
        let mut bases: Vec<&'a ClassDef> = Vec::new();
        for name in self.view.spec().folded_bases(self.class.name()) {
            let base = self.view.find_class(name).ok_or_else(|| {
                WeldError::resolution(
                    self.view.module_name(),
                    name,
                    format!("fold into class {}", self.class.name()),
                )
            })?;
            if !bases.iter().any(|b| b.name() == base.name()) {
                bases.push(base);
            }
        }
        Ok(bases)
    }

    fn extensions(&self, protection: Protection) -> Vec<String> {
        self.view
            .spec()
            .interface_extensions(self.class.name(), protection)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn register_members(&mut self, class: &ClassDef, visibility: Protection) {
        for member in &class.members {
            match member {
                Member::Method(method) if method.is_ctor => {
                    if method.info.protection != visibility || method.name() != self.class_name {
                        continue;
                    }
                    for ctor in method.all() {
                        if ctor.info.protection == visibility && ctor.info.is_active() {
                            self.register_method(ctor);
                        }
                    }
                }
                Member::Method(method) if method.is_dtor => {
                    if method.info.protection == visibility
                        && method.name() == format!("~{}", self.class_name)
                    {
                        self.register_method(method);
                    }
                }
                Member::Method(method) => {
                    for ovl in method.all() {
                        if ovl.info.protection == visibility && ovl.info.is_active() && !ovl.is_template {
                            self.preprocess_method(ovl);
                        }
                    }
                }
                Member::Enum(e) => {
                    if e.info.protection == visibility && e.info.is_active() && e.has_active_values() {
                        self.registry
                            .push_member(visibility == Protection::Public, RegisteredMember::Enum(e.clone()));
                    }
                }
                Member::Variable(v) => {
                    if v.info.protection == visibility && v.info.is_active() {
                        self.registry.push_member(
                            visibility == Protection::Public,
                            RegisteredMember::Variable(v.clone()),
                        );
                    }
                }
                Member::Class(_) => {}
            }
        }
    }

    fn preprocess_method(&mut self, method: &MethodDef) {
        let signature = method.signature();
        // an override of an already registered virtual
        if method.is_virtual && self.seen.iter().any(|m| m.signature() == signature) {
            return;
        }
        // shadowed by a same-named method of another class
        if !method.is_virtual
            && self
                .seen
                .iter()
                .any(|m| m.name() == method.name() && m.class_name != method.class_name)
        {
            return;
        }
        self.register_method(method);
        self.seen.push(method.clone());
    }

    fn register_method(&mut self, method: &MethodDef) {
        self.registry.push_member(
            method.info.protection == Protection::Public,
            RegisteredMember::Method(method.clone()),
        );
        if !method.is_ctor && !method.is_dtor && !method.is_static {
            self.registry.insert_method(MethodEntry {
                method: method.clone(),
                is_virtual: method.is_virtual,
                pure_virtual: self.requires_pure_virtual && method.is_pure_virtual,
                proxy: self.view.has_method_proxy(&self.class_name, method),
                extension: false,
            });
        }
    }

    fn register_custom(&mut self, visibility: Protection, decl: &str) -> WeldResult<()> {
        self.registry.push_member(
            visibility == Protection::Public,
            RegisteredMember::Custom(decl.to_string()),
        );
        let flat = decl.replace('\n', "");
        if !is_method_decl(&flat) {
            return Ok(());
        }
        let method = parse_method_decl(&self.class_name, &flat)?.into_method(&self.class_name);
        self.registry.insert_method(MethodEntry {
            is_virtual: method.is_virtual,
            pure_virtual: self.requires_pure_virtual && method.is_pure_virtual,
            proxy: self.view.has_method_proxy(&self.class_name, &method),
            extension: true,
            method,
        });
        Ok(())
    }
}
