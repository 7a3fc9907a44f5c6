//! SWIG interface file and interface header generator
//!
//! Emission is a pure function of the module policy, the processed
//! declarations and the analyzer registries. Section order is fixed:
//!
//! - `.i`: header, GC types, begin, runtime, typemaps and swig code, init,
//!   `%extend` blocks, imports and includes, wrapper
//! - `.h`: guard, warning filters, typedefs, classes, variables, enums,
//!   defines, functions

use crate::analyzer::{ClassRegistry, InterfaceRegistry, RegisteredMember};
use crate::codegen::constants::{classify_define, module_defines, DefineEmission};
use crate::config::Config;
use crate::diagnostics::WeldResult;
use crate::director::{CodeSection, Extraction, GenKind, ModuleView, Spec};
use crate::extractor::{ClassDef, ClassKind, EnumDef, Item, Member, MethodDef, PlatformGuard, Protection};
use crate::naming::rb_constant_name;
use crate::typemap::TypemapRegistry;
use indexmap::IndexSet;

pub(crate) const GENERATED_NOTICE: &str = "/**
 * This file is automatically generated by the WXRuby3 interface generator.
 * Do not alter this file.
 */
";

/// Write `body` inside the preprocessor guard of a platform restriction
fn guarded(out: &mut String, guard: Option<&PlatformGuard>, body: impl FnOnce(&mut String)) {
    if let Some(guard) = guard {
        out.push_str(&guard.open());
        out.push('\n');
    }
    body(out);
    if let Some(guard) = guard {
        out.push_str(guard.close());
        out.push('\n');
    }
}

/// Generator for `<module>.i` and `<module>.h`
pub struct InterfaceGenerator<'a> {
    spec: &'a Spec,
    extraction: &'a Extraction,
    registry: &'a InterfaceRegistry,
    typemaps: &'a TypemapRegistry,
    config: &'a Config,
}

impl<'a> InterfaceGenerator<'a> {
    pub fn new(
        spec: &'a Spec,
        extraction: &'a Extraction,
        registry: &'a InterfaceRegistry,
        typemaps: &'a TypemapRegistry,
        config: &'a Config,
    ) -> Self {
        Self {
            spec,
            extraction,
            registry,
            typemaps,
            config,
        }
    }

    fn view(&self) -> ModuleView<'a> {
        ModuleView::new(self.spec, &self.extraction.module)
    }

    /// Generate the SWIG interface file
    pub fn generate_interface(&self) -> String {
        let mut output = String::new();
        output.push_str(GENERATED_NOTICE);
        output.push_str(&format!(
            "\n%include \"../common.i\"\n\n%module(directors=\"1\") {}\n",
            self.spec.module_name
        ));

        self.gen_gc_types(&mut output);
        self.gen_begin_code(&mut output);
        self.gen_runtime_code(&mut output);
        self.gen_swig_code(&mut output);
        push_section(&mut output, "%init", &self.spec.code(CodeSection::Init));
        self.gen_extensions(&mut output);
        self.gen_interface_code(&mut output);
        push_section(&mut output, "%wrapper", &self.spec.code(CodeSection::Wrapper));

        output
    }

    fn gen_gc_types(&self, out: &mut String) {
        let view = self.view();
        out.push('\n');
        for class in view.generated_classes() {
            let gc = view.gc_type(class).macro_name();
            out.push_str(&format!("{}({});\n", gc, self.spec.class_name(class.name())));
            for inner in class.inner_classes().filter(|c| !c.info.ignored) {
                out.push_str(&format!("{}({});\n", view.gc_type(inner).macro_name(), inner.name()));
            }
        }
    }

    fn gen_begin_code(&self, out: &mut String) {
        out.push('\n');
        for (decl, disown) in &self.spec.disowns {
            if *disown {
                out.push_str(&format!("%apply SWIGTYPE *DISOWN {{ {} }};\n", decl));
            } else {
                out.push_str(&format!("%apply SWIGTYPE * {{ {} }};\n", decl));
            }
        }
        for decl in &self.spec.new_objects {
            out.push_str(&format!("%newobject {};\n", decl));
        }

        out.push_str("\n%header %{\n");
        for include in self.extraction.includes.iter().filter(|i| !i.contains("wx.h")) {
            out.push_str(&format!("#include \"{}\"\n", include));
        }
        let header = self.spec.code(CodeSection::Header);
        if !header.is_empty() {
            out.push('\n');
            out.push_str(&header);
            out.push('\n');
        }
        out.push_str("%}\n");

        push_section(out, "%begin", &self.spec.code(CodeSection::Begin));
        let swig_begin = self.spec.code(CodeSection::SwigBegin);
        if !swig_begin.is_empty() {
            out.push('\n');
            out.push_str(&swig_begin);
            out.push('\n');
        }
    }

    fn gen_runtime_code(&self, out: &mut String) {
        let view = self.view();
        out.push('\n');
        if self.spec.disabled_proxies {
            for class in self.extraction.module.classes().filter(|c| {
                !c.info.ignored && !c.is_template && !view.is_folded_base(c.name())
            }) {
                out.push_str(&format!("%feature(\"nodirector\") {};\n", self.spec.class_name(class.name())));
            }
        } else {
            for class in view.generated_classes().filter(|c| !view.has_proxy(c)) {
                out.push_str(&format!("%feature(\"nodirector\") {};\n", self.spec.class_name(class.name())));
            }
        }
        for name in &self.spec.no_proxies {
            out.push_str(&format!("%feature(\"nodirector\") {};\n", name));
        }
        for (to, from) in self.spec.renames.iter().chain(self.spec.ruby_renames.iter()) {
            for name in from {
                out.push_str(&format!("%rename({}) {};\n", to, name));
            }
        }
        for mixin in &self.spec.mixins {
            out.push_str(&format!("%feature(\"mixin\") {};\n", mixin));
        }

        out.push_str("\n%runtime %{\n");
        let runtime = self.spec.code(CodeSection::Runtime);
        if !runtime.is_empty() {
            out.push_str(&runtime);
            out.push('\n');
        }
        out.push_str(&format!(
            "extern VALUE m{}; // The global package module\n",
            self.spec.package.replace("::", "")
        ));
        out.push_str("WXRUBY_EXPORT VALUE wxRuby_Core(); // returns the core package module\n");
        out.push_str("%}\n");
    }

    fn gen_swig_code(&self, out: &mut String) {
        let typemaps = self.typemaps.to_swig();
        if !typemaps.is_empty() {
            out.push('\n');
            out.push_str(&typemaps);
        }
        let code = self.extraction.swig_code(self.spec);
        if !code.is_empty() {
            out.push('\n');
            out.push_str(&code);
            out.push('\n');
        }
    }

    fn gen_extensions(&self, out: &mut String) {
        for class in self.view().generated_classes() {
            let class_name = self.spec.class_name(class.name());
            let code = self.extraction.extend_code(self.spec, class_name);
            if !code.is_empty() {
                out.push_str(&format!("\n%extend {} {{\n{}\n}};\n", class_name, code));
            }
        }
    }

    fn gen_interface_code(&self, out: &mut String) {
        let view = self.view();
        let mut imports: IndexSet<String> = IndexSet::new();
        imports.extend(self.spec.swig_imports_prepend.iter().cloned());
        for class in view.generated_classes() {
            for base in view.base_list(class).into_iter().rev() {
                if !view.defines_class(&base) {
                    imports.insert(format!("{}/{}.h", self.config.interface_dir, base));
                }
            }
        }
        imports.extend(self.spec.swig_imports_append.iter().cloned());

        out.push('\n');
        for import in &imports {
            out.push_str(&format!("%import \"{}\"\n", import));
        }
        for include in &self.spec.swig_includes {
            out.push_str(&format!("%include \"{}\"\n", include));
        }
        let code = self.spec.code(CodeSection::Interface);
        if code.is_empty() {
            out.push_str(&format!(
                "\n%include \"{}\"\n",
                self.config.interface_include(&self.spec.module_name)
            ));
        } else {
            out.push('\n');
            out.push_str(&code);
            out.push('\n');
        }
    }

    /// Generate the interface header declaring the flattened classes
    pub fn generate_header(&self) -> WeldResult<String> {
        let guard = format!("__{}_H_INCLUDED__", self.spec.module_name.to_uppercase());
        let mut output = String::new();
        output.push_str(GENERATED_NOTICE);
        output.push_str(&format!("\n#ifndef {}\n#define {}\n", guard, guard));

        if !self.spec.warn_filters.is_empty() {
            output.push('\n');
            for (warning, decls) in &self.spec.warn_filters {
                for decl in decls {
                    output.push_str(&format!("%warnfilter({}) {};\n", warning, decl));
                }
            }
        }

        if self.spec.generates(GenKind::Typedefs) {
            self.gen_typedefs(&mut output);
        }
        if self.spec.generates(GenKind::Classes) {
            for class in self.view().generated_classes() {
                self.gen_class(&mut output, class)?;
            }
        }
        if self.spec.generates(GenKind::Variables) {
            self.gen_variables(&mut output);
        }
        if self.spec.generates(GenKind::Enums) {
            self.gen_enums(&mut output);
        }
        if self.spec.generates(GenKind::Defines) {
            self.gen_defines(&mut output);
        }
        if self.spec.generates(GenKind::Functions) {
            self.gen_functions(&mut output);
        }

        output.push_str(&format!("\n#endif /* {} */\n", guard));
        Ok(output)
    }

    fn gen_typedefs(&self, out: &mut String) {
        for item in &self.extraction.module.items {
            if let Item::Typedef(typedef) = item {
                if typedef.info.is_active() {
                    guarded(out, typedef.info.only_for.as_ref(), |out| {
                        out.push_str(&format!("{};\n", typedef.definition));
                    });
                }
            }
        }
    }

    fn gen_class(&self, out: &mut String, class: &ClassDef) -> WeldResult<()> {
        let view = self.view();
        let class_name = self.spec.class_name(class.name());
        let registry = self.registry.expect_class(class_name)?;
        let base = view.base_class(class)?;
        let is_struct = class.kind == ClassKind::Struct;
        let is_abstract = view.is_abstract(class);

        out.push('\n');
        guarded(out, class.info.only_for.as_ref(), |out| {
            if let Some(base) = &base {
                out.push_str(&format!("class {};\n\n", base));
            }
            out.push_str(&format!("{} {}", class.kind.keyword(), class_name));
            if let Some(base) = &base {
                out.push_str(&format!(" : public {}", base));
            }
            out.push_str("\n{\n");
            if !is_struct {
                out.push_str("public:\n");
            }
            if is_abstract {
                out.push_str(&format!("  virtual ~{}() =0;\n", class_name));
            }
            let members = MemberEmitter {
                typemaps: self.typemaps,
                class,
                class_name,
                registry: &registry,
                is_abstract,
            };
            for member in registry.public_members() {
                members.emit(out, member);
            }
            if !is_struct && !registry.protected_members().is_empty() {
                out.push_str("\n protected:\n");
                for member in registry.protected_members() {
                    members.emit(out, member);
                }
            }
            out.push_str("};\n");
        });
        Ok(())
    }

    fn gen_variables(&self, out: &mut String) {
        for item in &self.extraction.module.items {
            let Item::Variable(var) = item else { continue };
            if !var.info.is_active() {
                continue;
            }
            let name = var.info.name.as_str();
            let ty = if var.ty.contains("char") && var.args_string == "[]" {
                format!("{}*", var.ty)
            } else {
                var.ty.clone()
            };
            let const_name = if name.starts_with("wx") {
                format!("wx{}", rb_constant_name(name))
            } else {
                rb_constant_name(name)
            };
            guarded(out, var.info.only_for.as_ref(), |out| {
                out.push_str(&format!("%constant {} {} = {};\n", ty, const_name, name));
            });
        }
    }

    fn gen_enums(&self, out: &mut String) {
        for item in &self.extraction.module.items {
            let Item::Enum(e) = item else { continue };
            if !e.info.is_active() || !e.has_active_values() {
                continue;
            }
            guarded(out, e.info.only_for.as_ref(), |out| {
                out.push_str(&format!("\n// from enum {}\n", e.info.name));
                if !e.is_anonymous {
                    out.push_str(&format!("enum {};\n", e.info.name));
                }
                for value in e.values.iter().filter(|v| !v.info.ignored) {
                    guarded(out, value.info.only_for.as_ref(), |out| {
                        out.push_str(&format!("%constant int {} = {};\n", value.info.name, value.info.name));
                    });
                }
            });
        }
    }

    fn gen_defines(&self, out: &mut String) {
        let mut first = true;
        for define in module_defines(&self.extraction.module) {
            let Some(DefineEmission::Header(line)) = classify_define(define) else {
                continue;
            };
            if first {
                out.push('\n');
                first = false;
            }
            guarded(out, define.info.only_for.as_ref(), |out| {
                out.push_str(&line);
                out.push('\n');
            });
        }
    }

    fn gen_functions(&self, out: &mut String) {
        for item in &self.extraction.module.items {
            let Item::Function(function) = item else { continue };
            for ovl in function.all().filter(|f| f.info.is_active() && !f.is_template) {
                guarded(out, ovl.info.only_for.as_ref(), |out| {
                    out.push_str(&format!(
                        "{} {}{};\n",
                        self.typemaps.declared_return_type(ovl),
                        ovl.name(),
                        ovl.args_string()
                    ));
                });
            }
        }
    }
}

fn push_section(out: &mut String, directive: &str, code: &str) {
    if code.is_empty() {
        return;
    }
    out.push_str(&format!("\n{} %{{\n{}\n%}}\n", directive, code));
}

/// Emits registered members of one class
struct MemberEmitter<'r> {
    typemaps: &'r TypemapRegistry,
    class: &'r ClassDef,
    class_name: &'r str,
    registry: &'r ClassRegistry,
    is_abstract: bool,
}

impl MemberEmitter<'_> {
    fn emit(&self, out: &mut String, member: &RegisteredMember) {
        match member {
            RegisteredMember::InnerClass(inner) => {
                guarded(out, inner.info.only_for.as_ref(), |out| gen_inner_class(out, inner, "  "));
            }
            RegisteredMember::Method(method) if method.is_ctor => {
                if !self.is_abstract {
                    guarded(out, method.info.only_for.as_ref(), |out| {
                        out.push_str(&format!("  {}{};\n", self.class_name, self.class.map_params(method)));
                    });
                }
            }
            RegisteredMember::Method(method) if method.is_dtor => {
                if !self.is_abstract {
                    let virt = if method.is_virtual { "virtual " } else { "" };
                    out.push_str(&format!("  {}~{}();\n", virt, self.class_name));
                }
            }
            RegisteredMember::Method(method) => {
                if !self.registry.is_method_ignored(method) {
                    guarded(out, method.info.only_for.as_ref(), |out| self.gen_method(out, method));
                }
            }
            RegisteredMember::Enum(e) => gen_member_enum(out, self.class_name, e, "  "),
            RegisteredMember::Variable(var) => {
                guarded(out, var.info.only_for.as_ref(), |out| {
                    out.push_str(&format!("  // from {}\n", var.definition));
                    let stat = if var.is_static { "static " } else { "" };
                    out.push_str(&format!("  {}{} {};\n", stat, var.ty, var.info.name));
                });
            }
            RegisteredMember::Custom(decl) => {
                out.push_str("  // custom wxRuby extension\n");
                let mut lines = decl.lines().peekable();
                while let Some(line) = lines.next() {
                    let end = if lines.peek().is_none() { ";" } else { "" };
                    out.push_str(&format!("  {}{}\n", line, end));
                }
            }
        }
    }

    fn gen_method(&self, out: &mut String, method: &MethodDef) {
        let pure = self
            .registry
            .method(&method.signature())
            .is_some_and(|e| e.pure_virtual);
        out.push_str(&format!("  // from {}\n", method.definition));
        out.push_str(&format!(
            "  {}{}{} {}{}{};\n",
            if method.is_static { "static " } else { "" },
            if method.is_virtual { "virtual " } else { "" },
            self.typemaps.declared_return_type(method),
            method.name(),
            self.class.map_params(method),
            if pure && method.is_pure_virtual { " =0" } else { "" }
        ));
    }
}

fn gen_member_enum(out: &mut String, class_name: &str, e: &EnumDef, indent: &str) {
    guarded(out, e.info.only_for.as_ref(), |out| {
        out.push_str(&format!("{}// from {}::{}\n", indent, class_name, e.info.name));
        let name = if e.is_anonymous { "" } else { e.info.name.as_str() };
        out.push_str(&format!("{}enum {} {{\n", indent, name));
        let values: Vec<_> = e.values.iter().filter(|v| !v.info.ignored).collect();
        for (i, value) in values.iter().enumerate() {
            let comma = if i + 1 < values.len() { "," } else { "" };
            guarded(out, value.info.only_for.as_ref(), |out| {
                out.push_str(&format!("{}  {}{}\n", indent, value.info.name, comma));
            });
        }
        out.push_str(&format!("{}}};\n", indent));
    });
}

fn gen_inner_class(out: &mut String, class: &ClassDef, indent: &str) {
    let name = class.name();
    out.push_str(&format!("{}{} {}\n{}{{\n", indent, class.kind.keyword(), name, indent));
    if class.kind != ClassKind::Struct {
        out.push_str(&format!("{}public:\n", indent));
    }
    let inner = format!("{}  ", indent);
    for member in class.members.iter().filter(|m| {
        let info = m.info();
        info.protection == Protection::Public && info.is_active()
    }) {
        match member {
            Member::Method(method) => {
                for ovl in method.all().filter(|m| m.info.is_active() && !m.is_template) {
                    guarded(out, ovl.info.only_for.as_ref(), |out| {
                        if ovl.is_ctor {
                            out.push_str(&format!("{}{}{};\n", inner, name, ovl.args_string()));
                        } else if ovl.is_dtor {
                            out.push_str(&format!("{}~{}();\n", inner, name));
                        } else {
                            out.push_str(&format!(
                                "{}{}{}{} {}{};\n",
                                inner,
                                if ovl.is_static { "static " } else { "" },
                                if ovl.is_virtual { "virtual " } else { "" },
                                ovl.type_text(),
                                ovl.name(),
                                ovl.args_string()
                            ));
                        }
                    });
                }
            }
            Member::Variable(var) => {
                out.push_str(&format!("{}{} {};\n", inner, var.ty, var.info.name));
            }
            Member::Enum(e) if e.has_active_values() => gen_member_enum(out, name, e, &inner),
            Member::Enum(_) => {}
            Member::Class(nested) => gen_inner_class(out, nested, &inner),
        }
    }
    out.push_str(&format!("{}}};\n", indent));
}
