//! Module directors
//!
//! A [`Director`] owns the policy [`Spec`] of one module and turns the raw
//! extracted declarations into the processed model every generator reads:
//!
//! 1. extraction of the module's declaration items
//! 2. inheritance chain overrides
//! 3. ignores, then regards (a missing target is only logged)
//! 4. platform restrictions and parameter mappings (a missing target fails)
//! 5. header includes and deprecation wrappers
//!
//! Extraction runs once per director; later callers share the result.

pub mod builtin;
pub mod deprecation;
pub mod policy;
pub mod spec;
pub mod view;

pub use builtin::{builtin_names, find_builtin, BuiltinDirector, BUILTIN_DIRECTORS};
pub use deprecation::Deprecations;
pub use policy::{PolicyOp, SpecBuilder};
pub use spec::{CodeSection, GcType, GenKind, Spec, Visibility};
pub use view::ModuleView;

use crate::config::Config;
use crate::diagnostics::{WeldError, WeldResult};
use crate::extractor::{extract_module, DeclSource, ModuleDef, PlatformGuard};
use indexmap::IndexSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Processed declarations of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Declarations with the policy applied
    pub module: ModuleDef,
    /// Headers to include: policy includes followed by class includes
    pub includes: IndexSet<String>,
    /// Generated deprecation wrappers
    pub deprecations: Deprecations,
}

impl Extraction {
    /// Extension code for a generated class: policy code, then wrappers
    pub fn extend_code(&self, spec: &Spec, class_name: &str) -> String {
        spec.extend_code(class_name)
            .iter()
            .chain(self.deprecations.for_class(class_name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Swig code section: policy code, then function wrappers
    pub fn swig_code(&self, spec: &Spec) -> String {
        let mut parts: Vec<&str> = spec
            .code
            .get(&CodeSection::Swig)
            .map(|c| c.iter().map(String::as_str).collect())
            .unwrap_or_default();
        parts.extend(self.deprecations.swig_code.iter().map(String::as_str));
        parts.join("\n")
    }
}

/// Owner of one module's policy and processed declarations
#[derive(Debug)]
pub struct Director {
    spec: Spec,
    extraction: Mutex<Option<Arc<Extraction>>>,
    preprocess: Mutex<()>,
}

impl Director {
    pub fn new(spec: Spec) -> Self {
        Self {
            spec,
            extraction: Mutex::new(None),
            preprocess: Mutex::new(()),
        }
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn module_name(&self) -> &str {
        &self.spec.module_name
    }

    /// Processed declarations, if extraction already ran
    pub fn extraction(&self) -> Option<Arc<Extraction>> {
        self.extraction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Extract and process the module once
    ///
    /// `on_extracted` runs inside the lock, only for the call that actually
    /// extracted, so registration happens exactly once.
    pub fn extract_interface(
        &self,
        source: &dyn DeclSource,
        config: &Config,
        on_extracted: impl FnOnce(&Extraction) -> WeldResult<()>,
    ) -> WeldResult<Arc<Extraction>> {
        let mut slot = self
            .extraction
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(extraction) = slot.as_ref() {
            return Ok(Arc::clone(extraction));
        }
        tracing::debug!(module = %self.module_name(), "extracting");
        let extraction = Arc::new(self.process(source, config)?);
        on_extracted(&extraction)?;
        *slot = Some(Arc::clone(&extraction));
        Ok(extraction)
    }

    /// Lock serializing preprocessing of this module's classes
    pub fn preprocess_lock(&self) -> MutexGuard<'_, ()> {
        self.preprocess
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Policy-aware view over an extraction of this module
    pub fn view<'a>(&'a self, extraction: &'a Extraction) -> ModuleView<'a> {
        ModuleView::new(&self.spec, &extraction.module)
    }

    fn process(&self, source: &dyn DeclSource, config: &Config) -> WeldResult<Extraction> {
        let spec = &self.spec;
        let name = spec.module_name.as_str();
        let mut module = extract_module(source, name, &spec.items)?;

        for (class, chain) in &spec.inheritance_chains {
            let class_def = module.find_class_mut(class).ok_or_else(|| {
                WeldError::resolution(name, class, "override the inheritance chain")
            })?;
            class_def.set_inheritance_chain(chain);
        }

        let ignores = spec.visibility.iter().filter(|(_, v)| v.ignore);
        let regards = spec.visibility.iter().filter(|(_, v)| !v.ignore);
        for (fullname, vis) in ignores.chain(regards) {
            if !module.update_item(fullname, |info| info.ignore(vis.ignore, vis.ignore_doc)) {
                let action = if vis.ignore { "ignore" } else { "regard" };
                tracing::info!(module = %name, "Cannot find '{}' (module '{}') to {}.", fullname, name, action);
            }
        }

        for (guard, names) in &spec.only_for {
            for fullname in names {
                let restricted = module.update_item(fullname, |info| {
                    info.only_for = Some(guard.clone());
                });
                if !restricted {
                    return Err(WeldError::resolution(
                        name,
                        fullname,
                        format!("set only_for [{}]", guard_label(guard)),
                    ));
                }
            }
        }
        if let Some(platform) = &config.platform {
            self.drop_foreign_platforms(&mut module, platform);
        }

        for (class, mappings) in &spec.param_mappings {
            let class_def = module.find_class_mut(class).ok_or_else(|| {
                WeldError::resolution(name, class, "apply parameter mappings")
            })?;
            class_def.param_mappings.extend(mappings.iter().cloned());
        }

        let mut includes = spec.includes.clone();
        for class in module.classes().filter(|c| !c.info.ignored) {
            includes.extend(class.includes.iter().cloned());
        }

        let deprecations = if config.no_deprecate {
            Deprecations::default()
        } else {
            Deprecations::collect(spec, &module)
        };

        Ok(Extraction {
            module,
            includes,
            deprecations,
        })
    }

    /// Ignore restricted items whose guard excludes the active platform
    fn drop_foreign_platforms(&self, module: &mut ModuleDef, platform: &str) {
        for (guard, names) in &self.spec.only_for {
            if guard.admits(platform) {
                continue;
            }
            for fullname in names {
                module.update_item(fullname, |info| info.ignore(true, info.ignore_doc));
                tracing::debug!(module = %self.module_name(), item = %fullname, platform = %platform, "not built for platform");
            }
        }
    }
}

fn guard_label(guard: &PlatformGuard) -> String {
    match guard {
        PlatformGuard::Single(id) => id.clone(),
        PlatformGuard::Any(ids) => ids.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ItemRef, MemorySource};

    const FRAME_DECLS: &str = r#"{ "items": [
        { "kind": "class", "name": "wxFrame",
          "bases": [ { "name": "wxTopLevelWindow", "bases": [ { "name": "wxWindow" } ] } ],
          "includes": ["wx/frame.h"],
          "members": [
            { "kind": "method", "name": "wxFrame" },
            { "kind": "method", "name": "SetTitle", "virtual": true,
              "params": [ { "name": "title", "type": "const wxString &" } ] },
            { "kind": "method", "name": "SetTitle", "deprecated": true,
              "params": [ { "name": "title", "type": "const char *" } ] },
            { "kind": "method", "name": "DoLayout", "protection": "protected" },
            { "kind": "method", "name": "MSWGetMenu", "type": "WXHMENU" }
          ] }
    ] }"#;

    fn source() -> MemorySource {
        MemorySource::new().with_json("wxFrame", FRAME_DECLS).unwrap()
    }

    #[test]
    fn test_process_applies_policy() {
        let mut builder = SpecBuilder::new("wxFrame", "Wx");
        builder
            .ignore(&["wxFrame::Missing", "wxFrame::SetTitle(const char *)"])
            .regard(&["wxFrame::DoLayout"])
            .only_for("wxmsw", &["wxFrame::MSWGetMenu"])
            .include("wx/wx.h");
        let director = Director::new(builder.build());
        let extraction = director
            .extract_interface(&source(), &Config::default(), |_| Ok(()))
            .unwrap();

        let class = extraction.module.find_class("wxFrame").unwrap();
        let set_title = class.find_method("SetTitle").unwrap();
        assert!(!set_title.info.ignored);
        assert!(set_title.overloads[0].info.ignored);
        assert!(!class.find_method("DoLayout").unwrap().info.ignored);
        assert_eq!(
            class.find_method("MSWGetMenu").unwrap().info.only_for,
            Some(PlatformGuard::Single("wxmsw".into()))
        );
        let includes: Vec<&str> = extraction.includes.iter().map(String::as_str).collect();
        assert_eq!(includes, vec!["wx/wx.h", "wx/frame.h"]);
        // the deprecated overload is ignored, so no wrapper
        assert!(extraction.deprecations.is_empty());
    }

    #[test]
    fn test_only_for_missing_target_fails() {
        let mut builder = SpecBuilder::new("wxFrame", "Wx");
        builder.only_for("wxgtk", &["wxFrame::Nope"]);
        let director = Director::new(builder.build());
        let err = director
            .extract_interface(&source(), &Config::default(), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, WeldError::Resolution { .. }));
        assert!(err.to_string().contains("set only_for [wxgtk]"));
        assert!(director.extraction().is_none());
    }

    #[test]
    fn test_extraction_runs_once() {
        let mut builder = SpecBuilder::new("wxFrame", "Wx");
        builder.override_inheritance_chain("wxFrame", &["wxWindow", "wxObject"]);
        let director = Director::new(builder.build());
        let mut registered = 0;
        let first = director
            .extract_interface(&source(), &Config::default(), |_| {
                registered += 1;
                Ok(())
            })
            .unwrap();
        let second = director
            .extract_interface(&source(), &Config::default(), |_| {
                registered += 1;
                Ok(())
            })
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registered, 1);
        let class = first.module.find_class("wxFrame").unwrap();
        assert!(class.is_derived_from("wxObject"));
        assert!(!class.is_derived_from("wxTopLevelWindow"));
    }

    #[test]
    fn test_concurrent_requests_extract_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        let director = Director::new(SpecBuilder::new("wxFrame", "Wx").build());
        let source = source();
        let config = Config::default();
        let registered = AtomicUsize::new(0);

        let extractions: Vec<Arc<Extraction>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        director
                            .extract_interface(&source, &config, |_| {
                                registered.fetch_add(1, Ordering::SeqCst);
                                Ok(())
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registered.load(Ordering::SeqCst), 1);
        assert!(extractions.iter().all(|e| Arc::ptr_eq(e, &extractions[0])));
    }

    #[test]
    fn test_platform_filter_and_deprecations() {
        let mut builder = SpecBuilder::new("wxFrame", "Wx");
        builder.only_for("wxmsw", &["wxFrame::MSWGetMenu"]);
        let director = Director::new(builder.build());
        let config = Config {
            platform: Some("wxgtk".into()),
            ..Default::default()
        };
        let extraction = director.extract_interface(&source(), &config, |_| Ok(())).unwrap();
        match extraction.module.find_item("wxFrame::MSWGetMenu") {
            Some(ItemRef::Method(m)) => assert!(m.info.ignored),
            other => panic!("unexpected {:?}", other),
        }
        let shims = extraction.deprecations.for_class("wxFrame");
        assert_eq!(shims.len(), 1);
        assert!(extraction
            .extend_code(director.spec(), "wxFrame")
            .contains("DEPRECATION WARNING: void wxFrame::SetTitle(const char * title)"));
    }
}
