//! Interface analysis
//!
//! Preprocesses every generated class of a module into a [`ClassRegistry`]
//! and checks the registered methods against the registries of all base
//! classes, which may live in other modules of the package.

pub mod processor;
pub mod registry;

pub use processor::ClassProcessor;
pub use registry::{ClassRegistry, InterfaceRegistry, MethodEntry, RegisteredMember};

use crate::diagnostics::{AnalysisReport, Diagnostic, WeldResult};
use crate::director::ModuleView;
use std::collections::HashSet;

/// Access to class interfaces defined anywhere in the package
pub trait BaseResolver {
    /// Make sure `class` has been preprocessed and registered
    fn ensure_class_interface(&self, class: &str) -> WeldResult<()>;
}

/// Register every generated class of a module that is not registered yet
///
/// Callers serialize this per module (see `Director::preprocess_lock`).
pub fn preprocess_module(registry: &InterfaceRegistry, view: ModuleView<'_>) -> WeldResult<()> {
    for class in view.generated_classes() {
        let processor = ClassProcessor::new(view, class);
        if registry.has_class(processor.class_name()) {
            continue;
        }
        let class_name = processor.class_name().to_string();
        let class_registry = processor.preprocess()?;
        registry.add_class_registry(&class_name, class_registry)?;
        tracing::trace!(module = %view.module_name(), class = %class_name, "registered interface");
    }
    Ok(())
}

/// Check the proxy consistency of a module against its base classes
///
/// Redundant overrides of non-proxied base methods are reported as warnings
/// and suppressed from emission; inconsistent proxying fails the module.
pub fn check_interface_methods(
    registry: &InterfaceRegistry,
    view: ModuleView<'_>,
    resolver: &dyn BaseResolver,
) -> WeldResult<AnalysisReport> {
    let spec = view.spec();
    for class in view.generated_classes() {
        resolver.ensure_class_interface(class.name())?;
    }

    let mut report = AnalysisReport::new();
    for class in view.generated_classes() {
        let class_name = spec.class_name(class.name());
        let class_registry = registry.expect_class(class_name)?;
        let mut handled: HashSet<String> = HashSet::new();

        for base in view.base_list(class) {
            resolver.ensure_class_interface(&base)?;
            let base_registry = registry.expect_class(&base)?;

            for (signature, base_entry) in base_registry.methods() {
                if !handled.insert(signature.clone()) || !base_entry.is_virtual {
                    continue;
                }
                let own = class_registry.method(signature);
                if !base_entry.proxy {
                    match own {
                        None if view.has_method_proxy(class_name, &base_entry.method) => {
                            report.add(
                                Diagnostic::error(format!(
                                    "method {} is proxied without wrapper implementation in class {} but not proxied in base class {}!",
                                    signature, class_name, base
                                ))
                                .for_class(class_name),
                            );
                        }
                        Some(entry)
                            if !entry.extension && !view.has_method_proxy(class_name, &entry.method) =>
                        {
                            report.add(
                                Diagnostic::warning(format!(
                                    "Unnecessary override {} in class {} for non-proxied base in {}. Ignoring.",
                                    signature, class_name, base
                                ))
                                .for_class(class_name),
                            );
                            class_registry.mark_ignored(signature);
                        }
                        _ => {}
                    }
                } else if own.is_some() && !view.has_method_proxy(class_name, &base_entry.method) {
                    report.add(
                        Diagnostic::error(format!(
                            "method {} is NOT proxied with an overriden wrapper implementation in class {} but is also implemented and proxied in base class {}!",
                            signature, class_name, base
                        ))
                        .for_class(class_name),
                    );
                }
            }
        }
    }

    report.into_result(view.module_name(), &spec.package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::WeldError;
    use crate::director::{Spec, SpecBuilder};
    use crate::extractor::{BaseRef, ClassDef, Item, MethodDef, ModuleDef};

    /// Resolver over a fixed set of already processed modules
    struct Modules<'a> {
        registry: &'a InterfaceRegistry,
        modules: Vec<(&'a Spec, &'a ModuleDef)>,
    }

    impl BaseResolver for Modules<'_> {
        fn ensure_class_interface(&self, class: &str) -> WeldResult<()> {
            for (spec, module) in &self.modules {
                if module.find_class(class).is_some() {
                    return preprocess_module(self.registry, ModuleView::new(spec, module));
                }
            }
            Err(WeldError::MissingDirector(class.to_string()))
        }
    }

    fn shapes() -> ModuleDef {
        let mut module = ModuleDef::new("Shape");
        module.add_item(Item::Class(
            ClassDef::new("Shape")
                .method(MethodDef::new("Draw").virtual_())
                .method(MethodDef::new("Area").returns("double").virtual_().const_()),
        ));
        module
    }

    fn circles(methods: &[MethodDef]) -> ModuleDef {
        let mut module = ModuleDef::new("Circle");
        let mut circle = ClassDef::new("Circle").base(BaseRef::new("Shape"));
        for m in methods {
            circle = circle.method(m.clone());
        }
        module.add_item(Item::Class(circle));
        module
    }

    #[test]
    fn test_proxied_override_of_unproxied_base_fails() {
        let mut shape_spec = SpecBuilder::new("Shape", "Wx");
        shape_spec.no_proxy(&["Shape::Draw"]);
        let shape_spec = shape_spec.build();
        let shape = shapes();
        let circle_spec = SpecBuilder::new("Circle", "Wx").build();
        let circle = circles(&[]);

        let registry = InterfaceRegistry::new();
        let resolver = Modules {
            registry: &registry,
            modules: vec![(&shape_spec, &shape), (&circle_spec, &circle)],
        };
        let err = check_interface_methods(&registry, ModuleView::new(&circle_spec, &circle), &resolver)
            .unwrap_err();
        match err {
            WeldError::Consistency { module, package, errors } => {
                assert_eq!(module, "Circle");
                assert_eq!(package, "Wx");
                assert_eq!(
                    errors,
                    vec!["* ERROR: method Draw() is proxied without wrapper implementation in class Circle but not proxied in base class Shape!".to_string()]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_redundant_override_is_ignored_with_warning() {
        let mut shape_spec = SpecBuilder::new("Shape", "Wx");
        shape_spec.no_proxy(&["Shape::Draw"]);
        let shape_spec = shape_spec.build();
        let shape = shapes();
        let mut circle_spec = SpecBuilder::new("Circle", "Wx");
        circle_spec.no_proxy(&["Circle::Draw"]);
        let circle_spec = circle_spec.build();
        let circle = circles(&[MethodDef::new("Draw").virtual_()]);

        let registry = InterfaceRegistry::new();
        let resolver = Modules {
            registry: &registry,
            modules: vec![(&shape_spec, &shape), (&circle_spec, &circle)],
        };
        let report =
            check_interface_methods(&registry, ModuleView::new(&circle_spec, &circle), &resolver).unwrap();
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.diagnostics()[0].message,
            "Unnecessary override Draw() in class Circle for non-proxied base in Shape. Ignoring."
        );
        let draw = registry.expect_class("Circle").unwrap();
        assert!(draw.is_method_ignored(&MethodDef::new("Draw").in_class("Circle")));
    }

    #[test]
    fn test_unproxied_override_of_proxied_base_fails() {
        let shape_spec = SpecBuilder::new("Shape", "Wx").build();
        let shape = shapes();
        let mut circle_spec = SpecBuilder::new("Circle", "Wx");
        circle_spec.no_proxy(&["Circle::Area"]);
        let circle_spec = circle_spec.build();
        let circle = circles(&[MethodDef::new("Area").returns("double").virtual_().const_()]);

        let registry = InterfaceRegistry::new();
        let resolver = Modules {
            registry: &registry,
            modules: vec![(&shape_spec, &shape), (&circle_spec, &circle)],
        };
        let err = check_interface_methods(&registry, ModuleView::new(&circle_spec, &circle), &resolver)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Errors found generating for module Circle from package Wx"));
    }

    #[test]
    fn test_consistent_hierarchy_passes_and_registers_once() {
        let shape_spec = SpecBuilder::new("Shape", "Wx").build();
        let shape = shapes();
        let circle_spec = SpecBuilder::new("Circle", "Wx").build();
        let circle = circles(&[MethodDef::new("Draw").virtual_()]);

        let registry = InterfaceRegistry::new();
        let resolver = Modules {
            registry: &registry,
            modules: vec![(&shape_spec, &shape), (&circle_spec, &circle)],
        };
        let view = ModuleView::new(&circle_spec, &circle);
        let report = check_interface_methods(&registry, view, &resolver).unwrap();
        assert_eq!(report.diagnostics().len(), 0);
        check_interface_methods(&registry, view, &resolver).unwrap();
        assert_eq!(registry.len(), 2);
    }
}
