//! Forwarding wrappers for deprecated declarations

use crate::director::spec::Spec;
use crate::extractor::{Item, Member, MethodDef, ModuleDef};
use indexmap::IndexMap;

/// Deprecation wrappers collected for a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deprecations {
    /// `%extend` code per generated class name
    pub extend_code: IndexMap<String, Vec<String>>,
    /// Free function wrappers for the swig code section
    pub swig_code: Vec<String>,
}

impl Deprecations {
    /// Collect wrappers for every active deprecated method and function
    pub fn collect(spec: &Spec, module: &ModuleDef) -> Self {
        let mut shims = Self::default();
        for item in module.items.iter().filter(|i| !i.info().ignored) {
            match item {
                Item::Class(class) => {
                    let class_name = spec.class_name(class.name());
                    for member in &class.members {
                        let Member::Method(method) = member else {
                            continue;
                        };
                        for ovl in method
                            .all()
                            .filter(|m| !m.info.ignored && m.info.deprecated)
                        {
                            shims.add_method(class_name, ovl);
                        }
                    }
                }
                Item::Function(function) => {
                    for ovl in function
                        .all()
                        .filter(|m| !m.info.ignored && m.info.deprecated)
                    {
                        shims.swig_code.push(function_shim(ovl));
                    }
                }
                _ => {}
            }
        }
        shims
    }

    fn add_method(&mut self, class_name: &str, method: &MethodDef) {
        let code = self.extend_code.entry(class_name.to_string()).or_default();
        let guard = method.info.only_for.as_ref();
        if let Some(guard) = guard {
            code.push(guard.open());
        }
        code.push(method_shim(class_name, method));
        if let Some(guard) = guard {
            code.push(guard.close().to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extend_code.is_empty() && self.swig_code.is_empty()
    }

    /// Wrappers for one class
    pub fn for_class(&self, class_name: &str) -> &[String] {
        self.extend_code
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn call_args(method: &MethodDef) -> String {
    method
        .params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn method_shim(class_name: &str, method: &MethodDef) -> String {
    let storage = if method.is_static { "static " } else { "" };
    let ret = if method.is_void() { "" } else { "return " };
    format!(
        "{storage}{ty} {name}{args} {{\n  std::wcerr << \"DEPRECATION WARNING: {storage}{ty} {class}::{name}{args}\" << std::endl;\n  {ret}$self->{name}({call});\n}}\n",
        storage = storage,
        ty = method.type_text(),
        name = method.name(),
        args = method.args_string(),
        class = class_name,
        ret = ret,
        call = call_args(method),
    )
}

fn function_shim(function: &MethodDef) -> String {
    let ret = if function.is_void() { "" } else { "return " };
    format!(
        "// auto-generated deprecation function wrapper\n{ty} {name}{args} {{\n  std::wcerr << \"DEPRECATION WARNING: {ty} {name}{args}\" << std::endl;\n  {ret}{name}({call});\n}}\n",
        ty = function.type_text(),
        name = function.name(),
        args = function.args_string(),
        ret = ret,
        call = call_args(function),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ClassDef, ParamDef, PlatformGuard};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_shim() {
        let mut module = ModuleDef::new("wxWidget");
        module.add_item(Item::Class(
            ClassDef::new("Widget")
                .method(
                    MethodDef::new("OldCall")
                        .returns("int")
                        .param(ParamDef::new("a", "int"))
                        .param(ParamDef::new("b", "const wxString &"))
                        .deprecated(),
                )
                .method(MethodDef::new("NewCall")),
        ));
        let shims = Deprecations::collect(&Spec::default(), &module);
        assert_eq!(
            shims.for_class("Widget"),
            &["int OldCall(int a, const wxString & b) {\n  std::wcerr << \"DEPRECATION WARNING: int Widget::OldCall(int a, const wxString & b)\" << std::endl;\n  return $self->OldCall(a,b);\n}\n".to_string()]
        );
        assert!(shims.swig_code.is_empty());
    }

    #[test]
    fn test_guarded_shim_and_void_forwarding() {
        let mut module = ModuleDef::new("wxWidget");
        module.add_item(Item::Class(
            ClassDef::new("Widget").method(
                MethodDef::new("OldCall")
                    .deprecated()
                    .only_for(PlatformGuard::Any(vec!["msw".into(), "gtk".into()])),
            ),
        ));
        let shims = Deprecations::collect(&Spec::default(), &module);
        let code = shims.for_class("Widget");
        assert_eq!(code.len(), 3);
        assert_eq!(code[0], "#if defined(__MSW__) || defined(__GTK__)");
        assert!(code[1].contains("  $self->OldCall();"));
        assert!(!code[1].contains("return"));
        assert_eq!(code[2], "#endif");
    }

    #[test]
    fn test_function_shim_and_ignored_items() {
        let mut module = ModuleDef::new("wxUtils");
        module.add_item(Item::Function(
            MethodDef::new("wxOldBell").returns("bool").deprecated(),
        ));
        let mut hidden = ClassDef::new("Hidden").method(MethodDef::new("Gone").deprecated());
        hidden.info.ignored = true;
        module.add_item(Item::Class(hidden));

        let shims = Deprecations::collect(&Spec::default(), &module);
        assert!(shims.extend_code.is_empty());
        assert_eq!(shims.swig_code.len(), 1);
        assert!(shims.swig_code[0].starts_with("// auto-generated deprecation function wrapper\n"));
        assert!(shims.swig_code[0].contains("  return wxOldBell();"));
    }
}
