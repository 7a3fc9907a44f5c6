//! Policy operations and the spec builder
//!
//! A module's policy is an ordered list of [`PolicyOp`]s. Ops come from
//! package manifests (TOML, tagged by `op`) or from built-in director
//! setups calling the [`SpecBuilder`] helpers; both end up in
//! [`SpecBuilder::apply`].

use crate::diagnostics::{WeldError, WeldResult};
use crate::director::builtin::find_builtin;
use crate::director::spec::{CodeSection, GcType, GenKind, Spec, Visibility};
use crate::extractor::{ParamMapping, PlatformGuard, Protection};
use crate::typemap::{MapApply, Typemap};
use serde::{Deserialize, Serialize};

fn yes() -> bool {
    true
}

/// One policy edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PolicyOp {
    Ignore {
        names: Vec<String>,
        #[serde(default = "yes")]
        ignore_doc: bool,
    },
    Regard {
        names: Vec<String>,
        #[serde(default = "yes")]
        regard_doc: bool,
    },
    OnlyFor {
        platform: PlatformGuard,
        names: Vec<String>,
    },
    Rename {
        to: String,
        from: Vec<String>,
    },
    RenameForRuby {
        to: String,
        from: Vec<String>,
    },
    FoldBases {
        class: String,
        bases: Vec<String>,
    },
    IgnoreBases {
        class: String,
        bases: Vec<String>,
    },
    OverrideBase {
        class: String,
        base: String,
    },
    OverrideInheritanceChain {
        class: String,
        chain: Vec<String>,
    },
    Disown {
        decl: String,
        #[serde(default = "yes")]
        disown: bool,
    },
    NewObject {
        decl: String,
    },
    ExtendCode {
        class: String,
        code: String,
    },
    ExtendInterface {
        class: String,
        #[serde(default)]
        visibility: Protection,
        decls: Vec<String>,
    },
    MakeAbstract {
        class: String,
    },
    MakeMixin {
        class: String,
    },
    Gc {
        kind: GcType,
        #[serde(default)]
        classes: Vec<String>,
    },
    NoProxy {
        names: Vec<String>,
    },
    ForceProxy {
        class: String,
    },
    DisableProxies,
    Map {
        typemap: Typemap,
    },
    MapApply {
        from: String,
        to: Vec<String>,
    },
    ParamMapping {
        class: String,
        from: String,
        to: String,
    },
    Include {
        header: String,
    },
    SwigInclude {
        file: String,
    },
    SwigImport {
        file: String,
        #[serde(default)]
        append: bool,
    },
    Code {
        section: CodeSection,
        code: String,
    },
    WarnFilter {
        warning: u32,
        decls: Vec<String>,
    },
    DoNotGenerate {
        kinds: Vec<GenKind>,
    },
    TemplateAsClass {
        template: String,
        class: String,
    },
    Items {
        items: Vec<String>,
    },
    AddItems {
        items: Vec<String>,
    },
}

/// Accumulates policy ops into a [`Spec`]
///
/// Later ops win where two ops set the same thing.
#[derive(Debug, Clone)]
pub struct SpecBuilder {
    spec: Spec,
}

fn owned<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|s| s.as_ref().to_string()).collect()
}

impl SpecBuilder {
    /// Start a module spec; the module's only item defaults to its own name
    pub fn new(module_name: impl Into<String>, package: impl Into<String>) -> Self {
        let module_name = module_name.into();
        Self {
            spec: Spec {
                items: vec![module_name.clone()],
                module_name,
                package: package.into(),
                ..Default::default()
            },
        }
    }

    /// Module being configured
    pub fn module_name(&self) -> &str {
        &self.spec.module_name
    }

    /// Items currently configured
    pub fn items(&self) -> &[String] {
        &self.spec.items
    }

    /// Record the built-in director that configured the module
    pub fn director(&mut self, name: impl Into<String>) -> &mut Self {
        self.spec.director = Some(name.into());
        self
    }

    /// Run a built-in director setup and record its name
    pub fn builtin(&mut self, name: &str) -> WeldResult<&mut Self> {
        let builtin = find_builtin(name)
            .ok_or_else(|| WeldError::config(format!("unknown director '{}'", name)))?;
        self.director(name);
        (builtin.setup)(self);
        Ok(self)
    }

    /// Bases ignored by every class
    pub fn common_ignored_bases(&mut self, bases: &[String]) -> &mut Self {
        self.spec.common_ignored_bases = bases.to_vec();
        self
    }

    /// Apply one op
    pub fn apply(&mut self, op: PolicyOp) -> &mut Self {
        let spec = &mut self.spec;
        match op {
            PolicyOp::Ignore { names, ignore_doc } => {
                for name in names {
                    set_visibility(spec, name, true, ignore_doc);
                }
            }
            PolicyOp::Regard { names, regard_doc } => {
                for name in names {
                    set_visibility(spec, name, false, !regard_doc);
                }
            }
            PolicyOp::OnlyFor { platform, names } => spec.only_for.push((platform, names)),
            PolicyOp::Rename { to, from } => spec.renames.entry(to).or_default().extend(from),
            PolicyOp::RenameForRuby { to, from } => {
                spec.ruby_renames.entry(to).or_default().extend(from)
            }
            PolicyOp::FoldBases { class, bases } => {
                add_unique(spec.folded_bases.entry(class).or_default(), bases)
            }
            PolicyOp::IgnoreBases { class, bases } => {
                add_unique(spec.ignored_bases.entry(class).or_default(), bases)
            }
            PolicyOp::OverrideBase { class, base } => {
                spec.override_bases.insert(class, base);
            }
            PolicyOp::OverrideInheritanceChain { class, chain } => {
                spec.inheritance_chains.insert(class, chain);
            }
            PolicyOp::Disown { decl, disown } => spec.disowns.push((decl, disown)),
            PolicyOp::NewObject { decl } => spec.new_objects.push(decl),
            PolicyOp::ExtendCode { class, code } => spec.extend_code.entry(class).or_default().push(code),
            PolicyOp::ExtendInterface {
                class,
                visibility,
                decls,
            } => spec
                .interface_extensions
                .entry(class)
                .or_default()
                .extend(decls.into_iter().map(|d| (visibility, d))),
            PolicyOp::MakeAbstract { class } => {
                spec.abstracts.insert(class);
            }
            PolicyOp::MakeMixin { class } => {
                spec.mixins.insert(class);
            }
            PolicyOp::Gc { kind, classes } => {
                if classes.is_empty() {
                    spec.gc_default = Some(kind);
                } else {
                    for class in classes {
                        spec.gc_types.insert(class, kind);
                    }
                }
            }
            PolicyOp::NoProxy { names } => spec.no_proxies.extend(names),
            PolicyOp::ForceProxy { class } => {
                spec.forced_proxies.insert(class);
            }
            PolicyOp::DisableProxies => spec.disabled_proxies = true,
            PolicyOp::Map { typemap } => spec.typemaps.push(typemap),
            PolicyOp::MapApply { from, to } => spec.map_applies.push(MapApply { from, to }),
            PolicyOp::ParamMapping { class, from, to } => spec
                .param_mappings
                .entry(class)
                .or_default()
                .push(ParamMapping { from, to }),
            PolicyOp::Include { header } => {
                spec.includes.insert(header);
            }
            PolicyOp::SwigInclude { file } => {
                spec.swig_includes.insert(file);
            }
            PolicyOp::SwigImport { file, append } => {
                if append {
                    spec.swig_imports_append.insert(file);
                } else {
                    spec.swig_imports_prepend.insert(file);
                }
            }
            PolicyOp::Code { section, code } => spec.code.entry(section).or_default().push(code),
            PolicyOp::WarnFilter { warning, decls } => {
                spec.warn_filters.entry(warning).or_default().extend(decls)
            }
            PolicyOp::DoNotGenerate { kinds } => spec.no_gen.extend(kinds),
            PolicyOp::TemplateAsClass { template, class } => {
                spec.templates_as_class.insert(template, class);
            }
            PolicyOp::Items { items } => spec.items = items,
            PolicyOp::AddItems { items } => spec.items.extend(items),
        }
        self
    }

    /// Apply a sequence of ops
    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = PolicyOp>) -> &mut Self {
        for op in ops {
            self.apply(op);
        }
        self
    }

    pub fn ignore<S: AsRef<str>>(&mut self, names: &[S]) -> &mut Self {
        self.apply(PolicyOp::Ignore {
            names: owned(names),
            ignore_doc: true,
        })
    }

    /// Ignore for the interface but keep documenting
    pub fn ignore_keep_doc<S: AsRef<str>>(&mut self, names: &[S]) -> &mut Self {
        self.apply(PolicyOp::Ignore {
            names: owned(names),
            ignore_doc: false,
        })
    }

    pub fn regard<S: AsRef<str>>(&mut self, names: &[S]) -> &mut Self {
        self.apply(PolicyOp::Regard {
            names: owned(names),
            regard_doc: true,
        })
    }

    pub fn only_for<S: AsRef<str>>(&mut self, platform: impl Into<PlatformGuard>, names: &[S]) -> &mut Self {
        self.apply(PolicyOp::OnlyFor {
            platform: platform.into(),
            names: owned(names),
        })
    }

    pub fn rename<S: AsRef<str>>(&mut self, to: &str, from: &[S]) -> &mut Self {
        self.apply(PolicyOp::Rename {
            to: to.to_string(),
            from: owned(from),
        })
    }

    pub fn rename_for_ruby<S: AsRef<str>>(&mut self, to: &str, from: &[S]) -> &mut Self {
        self.apply(PolicyOp::RenameForRuby {
            to: to.to_string(),
            from: owned(from),
        })
    }

    pub fn fold_bases<S: AsRef<str>>(&mut self, class: &str, bases: &[S]) -> &mut Self {
        self.apply(PolicyOp::FoldBases {
            class: class.to_string(),
            bases: owned(bases),
        })
    }

    pub fn ignore_bases<S: AsRef<str>>(&mut self, class: &str, bases: &[S]) -> &mut Self {
        self.apply(PolicyOp::IgnoreBases {
            class: class.to_string(),
            bases: owned(bases),
        })
    }

    pub fn override_base(&mut self, class: &str, base: &str) -> &mut Self {
        self.apply(PolicyOp::OverrideBase {
            class: class.to_string(),
            base: base.to_string(),
        })
    }

    pub fn override_inheritance_chain<S: AsRef<str>>(&mut self, class: &str, chain: &[S]) -> &mut Self {
        self.apply(PolicyOp::OverrideInheritanceChain {
            class: class.to_string(),
            chain: owned(chain),
        })
    }

    pub fn disown(&mut self, decl: &str) -> &mut Self {
        self.apply(PolicyOp::Disown {
            decl: decl.to_string(),
            disown: true,
        })
    }

    pub fn new_object(&mut self, decl: &str) -> &mut Self {
        self.apply(PolicyOp::NewObject {
            decl: decl.to_string(),
        })
    }

    pub fn add_extend_code(&mut self, class: &str, code: &str) -> &mut Self {
        self.apply(PolicyOp::ExtendCode {
            class: class.to_string(),
            code: code.to_string(),
        })
    }

    pub fn extend_interface<S: AsRef<str>>(&mut self, class: &str, decls: &[S]) -> &mut Self {
        self.apply(PolicyOp::ExtendInterface {
            class: class.to_string(),
            visibility: Protection::Public,
            decls: owned(decls),
        })
    }

    pub fn make_abstract(&mut self, class: &str) -> &mut Self {
        self.apply(PolicyOp::MakeAbstract {
            class: class.to_string(),
        })
    }

    pub fn make_mixin(&mut self, class: &str) -> &mut Self {
        self.apply(PolicyOp::MakeMixin {
            class: class.to_string(),
        })
    }

    /// GC strategy for the listed classes, or for the whole module when empty
    pub fn gc<S: AsRef<str>>(&mut self, kind: GcType, classes: &[S]) -> &mut Self {
        self.apply(PolicyOp::Gc {
            kind,
            classes: owned(classes),
        })
    }

    pub fn no_proxy<S: AsRef<str>>(&mut self, names: &[S]) -> &mut Self {
        self.apply(PolicyOp::NoProxy { names: owned(names) })
    }

    pub fn force_proxy(&mut self, class: &str) -> &mut Self {
        self.apply(PolicyOp::ForceProxy {
            class: class.to_string(),
        })
    }

    pub fn disable_proxies(&mut self) -> &mut Self {
        self.apply(PolicyOp::DisableProxies)
    }

    pub fn map(&mut self, typemap: Typemap) -> &mut Self {
        self.apply(PolicyOp::Map { typemap })
    }

    pub fn map_apply<S: AsRef<str>>(&mut self, from: &str, to: &[S]) -> &mut Self {
        self.apply(PolicyOp::MapApply {
            from: from.to_string(),
            to: owned(to),
        })
    }

    pub fn param_mapping(&mut self, class: &str, from: &str, to: &str) -> &mut Self {
        self.apply(PolicyOp::ParamMapping {
            class: class.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn include(&mut self, header: &str) -> &mut Self {
        self.apply(PolicyOp::Include {
            header: header.to_string(),
        })
    }

    pub fn swig_include(&mut self, file: &str) -> &mut Self {
        self.apply(PolicyOp::SwigInclude {
            file: file.to_string(),
        })
    }

    pub fn swig_import(&mut self, file: &str) -> &mut Self {
        self.apply(PolicyOp::SwigImport {
            file: file.to_string(),
            append: false,
        })
    }

    pub fn code(&mut self, section: CodeSection, code: &str) -> &mut Self {
        self.apply(PolicyOp::Code {
            section,
            code: code.to_string(),
        })
    }

    pub fn warn_filter<S: AsRef<str>>(&mut self, warning: u32, decls: &[S]) -> &mut Self {
        self.apply(PolicyOp::WarnFilter {
            warning,
            decls: owned(decls),
        })
    }

    pub fn do_not_generate(&mut self, kinds: &[GenKind]) -> &mut Self {
        self.apply(PolicyOp::DoNotGenerate {
            kinds: kinds.to_vec(),
        })
    }

    pub fn template_as_class(&mut self, template: &str, class: &str) -> &mut Self {
        self.apply(PolicyOp::TemplateAsClass {
            template: template.to_string(),
            class: class.to_string(),
        })
    }

    pub fn set_items<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        self.apply(PolicyOp::Items { items: owned(items) })
    }

    pub fn add_items<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        self.apply(PolicyOp::AddItems { items: owned(items) })
    }

    /// Finish the spec
    pub fn build(self) -> Spec {
        self.spec
    }
}

fn add_unique(list: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !list.contains(&name) {
            list.push(name);
        }
    }
}

fn set_visibility(spec: &mut Spec, name: String, ignore: bool, ignore_doc: bool) {
    // re-inserting moves the entry to the end so edits replay in write order
    spec.visibility.shift_remove(&name);
    spec.visibility.insert(name, Visibility { ignore, ignore_doc });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_setup_is_applied() {
        let mut builder = SpecBuilder::new("wxComboBox", "Wx");
        builder.builtin("combobox").unwrap();
        let spec = builder.build();
        assert_eq!(spec.director.as_deref(), Some("combobox"));
        assert_eq!(spec.items, vec!["wxComboBox", "wxTextEntry"]);
        assert_eq!(spec.folded_bases("wxComboBox"), ["wxTextEntry".to_string()]);

        let mut builder = SpecBuilder::new("wxNothing", "Wx");
        assert!(matches!(builder.builtin("no_such_director"), Err(WeldError::Config(_))));
    }

    #[test]
    fn test_repeated_fold_keeps_one_entry() {
        let mut builder = SpecBuilder::new("wxComboBox", "Wx");
        builder
            .builtin("combobox")
            .unwrap()
            .fold_bases("wxComboBox", &["wxTextEntry"])
            .fold_bases("wxComboBox", &["wxTextEntry", "wxItemContainer"])
            .ignore_bases("wxComboBox", &["wxTrackable"])
            .ignore_bases("wxComboBox", &["wxTrackable"]);
        let spec = builder.build();
        assert_eq!(
            spec.folded_bases("wxComboBox"),
            ["wxTextEntry".to_string(), "wxItemContainer".to_string()]
        );
        assert_eq!(spec.ignored_bases["wxComboBox"], vec!["wxTrackable".to_string()]);
    }

    #[test]
    fn test_last_visibility_edit_wins() {
        let mut builder = SpecBuilder::new("wxFrame", "Wx");
        builder
            .ignore(&["wxFrame::SetTitle", "wxFrame::GetTitle"])
            .regard(&["wxFrame::SetTitle"]);
        let spec = builder.build();

        let order: Vec<&str> = spec.visibility.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["wxFrame::GetTitle", "wxFrame::SetTitle"]);
        assert_eq!(
            spec.visibility["wxFrame::SetTitle"],
            Visibility {
                ignore: false,
                ignore_doc: false
            }
        );
        assert!(spec.visibility["wxFrame::GetTitle"].ignore);
    }

    #[test]
    fn test_ops_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            ops: Vec<PolicyOp>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[ops]]
            op = "ignore"
            names = ["wxImage::operator="]

            [[ops]]
            op = "only_for"
            platform = ["wxmsw", "wxgtk"]
            names = ["wxImage::GetHandle"]

            [[ops]]
            op = "gc"
            kind = "never"

            [[ops]]
            op = "do_not_generate"
            kinds = ["functions", "defines"]

            [[ops]]
            op = "disable_proxies"
            "#,
        )
        .unwrap();

        let mut builder = SpecBuilder::new("wxImage", "Wx");
        builder.apply_all(doc.ops);
        let spec = builder.build();
        assert_eq!(spec.items, vec!["wxImage".to_string()]);
        assert!(spec.visibility["wxImage::operator="].ignore_doc);
        assert_eq!(
            spec.only_for[0].0,
            PlatformGuard::Any(vec!["wxmsw".into(), "wxgtk".into()])
        );
        assert_eq!(spec.gc_default, Some(GcType::Never));
        assert!(!spec.generates(GenKind::Functions));
        assert!(spec.generates(GenKind::Classes));
        assert!(spec.disabled_proxies);
    }

    #[test]
    fn test_gc_per_class_and_items() {
        let mut builder = SpecBuilder::new("wxDataObject", "Wx");
        builder
            .gc(GcType::Object, &["wxDataObjectSimple"])
            .add_items(&["wxDataObjectSimple"])
            .swig_import("swig/classes/include/wxObject.h")
            .apply(PolicyOp::SwigImport {
                file: "swig/shared/tail.i".into(),
                append: true,
            });
        let spec = builder.build();
        assert_eq!(spec.gc_default, None);
        assert_eq!(spec.gc_types["wxDataObjectSimple"], GcType::Object);
        assert_eq!(spec.items.len(), 2);
        assert_eq!(spec.swig_imports_prepend.len(), 1);
        assert_eq!(spec.swig_imports_append.len(), 1);
    }
}
