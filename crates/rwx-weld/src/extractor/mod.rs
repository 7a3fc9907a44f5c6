//! Declaration model
//!
//! The extractor turns declaration input into the class/method/variable
//! graph of a module. It carries no policy: ignores, renames and the like
//! are applied afterwards by the owning director.

pub mod class;
pub mod decl;
pub mod enums;
pub mod function;
pub mod item;
pub mod module;
pub mod parse;
pub mod source;
pub mod variable;

pub use class::{BaseRef, ClassDef, ClassKind, Member, ParamMapping};
pub use decl::DeclFile;
pub use enums::{EnumDef, EnumValueDef};
pub use function::{chain_overloads, normalize_type, MethodDef, ParamDef};
pub use item::{ItemInfo, PlatformGuard, Protection};
pub use module::{Item, ItemMut, ItemQuery, ItemRef, Location, ModuleDef};
pub use parse::{is_method_decl, parse_method_decl, split_type_and_name, CustomDecl};
pub use source::{DeclSource, JsonDirSource, MemorySource, ValidatingSource};
pub use variable::{DefineDef, GlobalVarDef, MemberVarDef, TypedefDef};

use crate::diagnostics::WeldResult;

/// Extract the definitions of a module from its declaration items
pub fn extract_module(
    source: &dyn DeclSource,
    module_name: &str,
    items: &[String],
) -> WeldResult<ModuleDef> {
    let mut module = ModuleDef::new(module_name);
    module.item_names = items.to_vec();
    for item in items {
        let file = source.load(item)?;
        let decls = file.into_items()?;
        tracing::debug!(module = %module_name, item = %item, count = decls.len(), "extracted declarations");
        for decl in decls {
            module.add_item(decl);
        }
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_module_chains_functions_across_items() {
        let source = MemorySource::new()
            .with_json(
                "utils",
                r#"{ "items": [ { "kind": "function", "name": "wxBell" },
                               { "kind": "function", "name": "wxMin", "type": "int",
                                 "params": [ { "name": "a", "type": "int" } ] } ] }"#,
            )
            .unwrap()
            .with_json(
                "more",
                r#"{ "items": [ { "kind": "function", "name": "wxMin", "type": "double",
                                 "params": [ { "name": "a", "type": "double" } ] } ] }"#,
            )
            .unwrap();

        let module =
            extract_module(&source, "wxUtils", &["utils".to_string(), "more".to_string()]).unwrap();
        assert_eq!(module.items.len(), 2);
        let min = module.find_item("wxMin").unwrap().as_method().unwrap();
        assert_eq!(min.overloads.len(), 1);
        assert!(module.find_item("wxMin(double)").is_some());
    }
}
