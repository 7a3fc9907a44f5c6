//! Ruby documentation stubs
//!
//! Produces a YARD-readable Ruby file per module listing the generated
//! classes with their Ruby method names, parameter types and brief docs.

use crate::analyzer::{ClassRegistry, InterfaceRegistry, RegisteredMember};
use crate::diagnostics::WeldResult;
use crate::director::{Extraction, ModuleView, Spec};
use crate::extractor::{normalize_type, ClassDef, EnumDef, Item, ItemInfo, MethodDef, ParamDef};
use crate::naming::{rb_class_name, rb_constant_name, rb_method_name};
use crate::typemap::TypemapRegistry;
use indexmap::IndexMap;

/// Generator for `<module>.rb` documentation stubs
pub struct DocGenerator<'a> {
    spec: &'a Spec,
    extraction: &'a Extraction,
    registry: &'a InterfaceRegistry,
    typemaps: &'a TypemapRegistry,
}

impl<'a> DocGenerator<'a> {
    pub fn new(
        spec: &'a Spec,
        extraction: &'a Extraction,
        registry: &'a InterfaceRegistry,
        typemaps: &'a TypemapRegistry,
    ) -> Self {
        Self {
            spec,
            extraction,
            registry,
            typemaps,
        }
    }

    /// Generate the documentation stub
    pub fn generate(&self) -> WeldResult<String> {
        let view = ModuleView::new(self.spec, &self.extraction.module);
        let modules: Vec<&str> = self.spec.package.split("::").collect();

        let mut output = String::new();
        output.push_str("# ----------------------------------------------------------------------------\n");
        output.push_str("# This file is automatically generated by the WXRuby3 documentation\n");
        output.push_str("# generator. Do not alter this file.\n");
        output.push_str("# ----------------------------------------------------------------------------\n\n");
        for module in &modules {
            output.push_str(&format!("\nmodule {}\n", module));
        }

        self.gen_constants(&mut output);

        for class in view.generated_classes().filter(|c| !c.info.ignore_doc) {
            let class_name = self.spec.class_name(class.name());
            let registry = self.registry.expect_class(class_name)?;
            let base = view.base_class(class)?;
            self.gen_class(&mut output, class, class_name, base.as_deref(), &registry);
        }

        for _ in &modules {
            output.push_str("\nend\n");
        }
        Ok(output)
    }

    fn gen_constants(&self, out: &mut String) {
        for item in &self.extraction.module.items {
            if item.info().ignored || item.info().ignore_doc {
                continue;
            }
            match item {
                Item::Enum(e) if e.has_active_values() => gen_enum(out, e, "  "),
                Item::Variable(v) => {
                    out.push_str(&format!("\n  # @return [{}]\n", self.rb_type(&v.ty)));
                    out.push_str(&format!("  {} = nil\n", rb_constant_name(&v.info.name)));
                }
                Item::Define(d) if d.is_constant() => {
                    out.push_str(&format!("\n  {} = nil\n", rb_constant_name(&d.info.name)));
                }
                _ => {}
            }
        }
    }

    fn gen_class(
        &self,
        out: &mut String,
        class: &ClassDef,
        class_name: &str,
        base: Option<&str>,
        registry: &ClassRegistry,
    ) {
        let rb_name = rb_class_name(class_name);
        out.push('\n');
        push_doc(out, &class.info, "  # ");
        if self.spec.mixins.contains(class.name()) {
            out.push_str(&format!("  module {}\n", rb_name));
        } else {
            match base {
                Some(base) => out.push_str(&format!("  class {} < {}\n", rb_name, rb_class_name(base))),
                None => out.push_str(&format!("  class {}\n", rb_name)),
            }
        }

        let mut methods: IndexMap<String, Vec<&MethodDef>> = IndexMap::new();
        for member in registry.public_members() {
            match member {
                RegisteredMember::Method(m)
                    if !m.is_dtor && !m.info.ignore_doc && !registry.is_method_ignored(m) =>
                {
                    let name = if m.is_ctor {
                        "initialize".to_string()
                    } else {
                        self.rb_method(class.name(), m)
                    };
                    methods.entry(name).or_default().push(m);
                }
                RegisteredMember::Enum(e) if !e.info.ignore_doc => gen_enum(out, e, "    "),
                _ => {}
            }
        }
        for (name, overloads) in &methods {
            self.gen_method(out, name, overloads);
        }

        out.push_str(&format!("\n  end # {}\n", rb_name));
    }

    fn gen_method(&self, out: &mut String, name: &str, overloads: &[&MethodDef]) {
        out.push('\n');
        if let [method] = overloads {
            push_doc(out, &method.info, "    # ");
            self.push_signature_tags(out, method, "    # ");
            let args: Vec<String> = method.params.iter().map(rb_param).collect();
            let prefix = if method.is_static { "self." } else { "" };
            out.push_str(&format!("    def {}{}({}) end\n", prefix, name, args.join(", ")));
            return;
        }
        for method in overloads {
            let args: Vec<String> = method.params.iter().map(rb_param).collect();
            out.push_str(&format!("    # @overload {}({})\n", name, args.join(", ")));
            push_doc(out, &method.info, "    #   ");
            self.push_signature_tags(out, method, "    #   ");
        }
        let prefix = if overloads.iter().all(|m| m.is_static) { "self." } else { "" };
        out.push_str(&format!("    def {}{}(*args) end\n", prefix, name));
    }

    fn push_signature_tags(&self, out: &mut String, method: &MethodDef, prefix: &str) {
        for param in &method.params {
            let ty = self
                .typemaps
                .rb_param_type(param)
                .map(str::to_string)
                .unwrap_or_else(|| self.rb_type(&param.ty));
            out.push_str(&format!("{}@param {} [{}]\n", prefix, rb_param(param), ty));
        }
        if !method.is_ctor {
            let ret = self.typemaps.declared_return_type(method);
            let ty = self
                .typemaps
                .rb_return_type(&ret)
                .map(str::to_string)
                .unwrap_or_else(|| self.rb_type(&ret));
            out.push_str(&format!("{}@return [{}]\n", prefix, ty));
        }
    }

    fn rb_method(&self, class: &str, method: &MethodDef) -> String {
        let fullname = format!("{}::{}", class, method.name());
        self.spec
            .ruby_renames
            .iter()
            .find(|(_, from)| from.iter().any(|f| *f == fullname))
            .map(|(to, _)| to.clone())
            .unwrap_or_else(|| rb_method_name(method.name()))
    }

    fn rb_type(&self, ty: &str) -> String {
        let plain = normalize_type(ty)
            .replace("const ", "")
            .trim_end_matches(['*', '&', ' '])
            .to_string();
        match plain.as_str() {
            "void" => "void".to_string(),
            "bool" => "Boolean".to_string(),
            "int" | "long" | "short" | "unsigned" | "unsigned int" | "unsigned long" | "size_t"
            | "wxCoord" => "Integer".to_string(),
            "float" | "double" => "Float".to_string(),
            "wxString" | "char" => "String".to_string(),
            other if other.starts_with("wx") => format!("Wx::{}", rb_class_name(other)),
            other => other.to_string(),
        }
    }
}

fn rb_param(param: &ParamDef) -> String {
    if param.name.is_empty() {
        "arg".to_string()
    } else {
        rb_method_name(&param.name)
    }
}

/// Write doc text, each line starting with `prefix` (e.g. `"  # "`)
fn push_doc(out: &mut String, info: &ItemInfo, prefix: &str) {
    if let Some(brief) = &info.brief_doc {
        for line in brief.lines() {
            out.push_str(&format!("{}{}\n", prefix, line));
        }
    }
    if let Some(detail) = &info.detailed_doc {
        out.push_str(&format!("{}\n", prefix.trim_end()));
        for line in detail.lines() {
            out.push_str(&format!("{}{}\n", prefix, line));
        }
    }
}

fn gen_enum(out: &mut String, e: &EnumDef, indent: &str) {
    out.push('\n');
    if !e.is_anonymous {
        out.push_str(&format!("{}# {} values\n", indent, rb_class_name(&e.info.name)));
    }
    for value in e.values.iter().filter(|v| !v.info.ignored && !v.info.ignore_doc) {
        out.push_str(&format!("{}{} = nil\n", indent, rb_constant_name(&value.info.name)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::preprocess_module;
    use crate::director::{Deprecations, SpecBuilder};
    use crate::extractor::{BaseRef, ModuleDef};
    use crate::typemap::Typemap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_doc() {
        let mut module = ModuleDef::new("wxFrame");
        module.add_item(Item::Class(
            ClassDef::new("wxFrame")
                .base(BaseRef::new("wxTopLevelWindow"))
                .method(MethodDef::ctor("wxFrame"))
                .method(
                    MethodDef::new("SetStatusText")
                        .param(ParamDef::new("text", "const wxString &"))
                        .param(ParamDef::new("number", "int"))
                        .with_doc("Sets the status bar text."),
                )
                .method(MethodDef::new("Centre").returns("bool"))
                .method(MethodDef::new("Centre").param(ParamDef::new("direction", "int")).returns("bool")),
        ));
        let extraction = Extraction {
            module,
            includes: Default::default(),
            deprecations: Deprecations::default(),
        };
        let mut builder = SpecBuilder::new("wxFrame", "Wx");
        builder.rename_for_ruby("centre_on_screen", &["wxFrame::Centre"]);
        let spec = builder.build();
        let registry = InterfaceRegistry::new();
        preprocess_module(&registry, ModuleView::new(&spec, &extraction.module)).unwrap();
        let mut typemaps = TypemapRegistry::new();
        typemaps
            .register(crate::typemap::Origin::Module, Typemap::new(&["wxString&"]).rb_type("String"))
            .unwrap();

        let doc = DocGenerator::new(&spec, &extraction, &registry, &typemaps)
            .generate()
            .unwrap();
        let expected = r#"# ----------------------------------------------------------------------------
# This file is automatically generated by the WXRuby3 documentation
# generator. Do not alter this file.
# ----------------------------------------------------------------------------


module Wx

  class Frame < TopLevelWindow

    def initialize() end

    # Sets the status bar text.
    # @param text [String]
    # @param number [Integer]
    # @return [void]
    def set_status_text(text, number) end

    # @overload centre_on_screen()
    #   @return [Boolean]
    # @overload centre_on_screen(direction)
    #   @param direction [Integer]
    #   @return [Boolean]
    def centre_on_screen(*args) end

  end # Frame

end
"#;
        assert_eq!(doc, expected);
    }
}
