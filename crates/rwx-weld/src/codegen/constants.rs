//! Define classification and the runtime constants script
//!
//! Most defines become `%constant` directives in the interface header.
//! Values that need a live toolkit object (sizes, points, colours, fonts,
//! system settings) are created at load time by a generated Ruby script
//! instead.

use crate::extractor::{DefineDef, Item, ModuleDef};
use crate::naming::{rb_constant_name, rb_constant_value, underscore};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMERIC: Regex = Regex::new(r"^\d").unwrap();
    static ref WX_STRING: Regex = Regex::new(r#"^wxString\("(.*)"\)$"#).unwrap();
    static ref GEOMETRY: Regex = Regex::new(r"^wx(Size|Point)\((.*)\)$").unwrap();
    static ref RESOURCE: Regex = Regex::new(r"^wx(Colour|Font)\((.*)\)$").unwrap();
    static ref SYS_SETTING: Regex = Regex::new(r"^wxSystemSettings::(\w+)\((.*)\)$").unwrap();
}

/// Where and how a define is emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineEmission {
    /// Line for the interface header
    Header(String),
    /// Line for the runtime constants script
    Script(String),
}

/// Decide how a constant define is emitted
pub fn classify_define(define: &DefineDef) -> Option<DefineEmission> {
    if !define.is_constant() {
        return None;
    }
    let name = define.info.name.as_str();
    let value = define.value.as_deref().unwrap_or_default().trim();

    let emission = if NUMERIC.is_match(value) {
        DefineEmission::Header(format!("#define {} {}", name, value))
    } else if value.starts_with('"') {
        DefineEmission::Header(format!("%constant char*  {} = {};", name, value))
    } else if let Some(caps) = WX_STRING.captures(value) {
        DefineEmission::Header(format!("%constant char*  {} = \"{}\";", name, &caps[1]))
    } else if let Some(caps) = GEOMETRY.captures(value) {
        DefineEmission::Script(format!(
            "  {} = Wx::{}.new({})",
            rb_constant_name(name),
            &caps[1],
            rb_args(&caps[2])
        ))
    } else if let Some(caps) = RESOURCE.captures(value) {
        DefineEmission::Script(format!(
            "  Wx.add_delayed_constant(self, :{}) {{ Wx::{}.new({}) }}",
            rb_constant_name(name),
            &caps[1],
            rb_args(&caps[2])
        ))
    } else if let Some(caps) = SYS_SETTING.captures(value) {
        DefineEmission::Script(format!(
            "  Wx.add_delayed_constant(self, :{}) {{ Wx::SystemSettings.{}({}) }}",
            rb_constant_name(name),
            underscore(&caps[1]),
            rb_args(&caps[2])
        ))
    } else {
        DefineEmission::Header(format!("%constant int  {} = {};", name, value))
    };
    Some(emission)
}

fn rb_args(args: &str) -> String {
    args.split(',')
        .map(rb_constant_value)
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Active constant defines of a module, in declaration order
pub fn module_defines(module: &ModuleDef) -> impl Iterator<Item = &DefineDef> {
    module.items.iter().filter_map(|item| match item {
        Item::Define(d) if !d.info.ignored => Some(d),
        _ => None,
    })
}

/// Generator for `<module>_ext.rb` runtime constant scripts
pub struct ConstantsGenerator<'a> {
    package: &'a str,
    module: &'a ModuleDef,
}

impl<'a> ConstantsGenerator<'a> {
    pub fn new(package: &'a str, module: &'a ModuleDef) -> Self {
        Self { package, module }
    }

    /// Script lines, one per runtime constant
    pub fn lines(&self) -> Vec<String> {
        module_defines(self.module)
            .filter_map(classify_define)
            .filter_map(|e| match e {
                DefineEmission::Script(line) => Some(line),
                DefineEmission::Header(_) => None,
            })
            .collect()
    }

    /// Full script text, or `None` when the module has no runtime constants
    pub fn generate(&self) -> Option<String> {
        let lines = self.lines();
        if lines.is_empty() {
            return None;
        }
        let modules: Vec<&str> = self.package.split("::").collect();

        let mut output = String::new();
        output.push_str("# ----------------------------------------------------------------------------\n");
        output.push_str("# This file is automatically generated by the WXRuby3 code\n");
        output.push_str("# generator. Do not alter this file.\n");
        output.push_str("# ----------------------------------------------------------------------------\n\n");
        for module in &modules {
            output.push_str(&format!("module {}\n", module));
        }
        output.push('\n');
        for line in &lines {
            output.push_str(line);
            output.push('\n');
        }
        output.push('\n');
        for _ in &modules {
            output.push_str("end\n");
        }
        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emission(name: &str, value: &str) -> Option<DefineEmission> {
        classify_define(&DefineDef::new(name, value))
    }

    #[test]
    fn test_classify_header_defines() {
        assert_eq!(
            emission("wxID_LOWEST", "4999"),
            Some(DefineEmission::Header("#define wxID_LOWEST 4999".into()))
        );
        assert_eq!(
            emission("wxFileSelectorPromptStr", "\"Select a file\""),
            Some(DefineEmission::Header(
                "%constant char*  wxFileSelectorPromptStr = \"Select a file\";".into()
            ))
        );
        assert_eq!(
            emission("wxEmptyString", "wxString(\"\")"),
            Some(DefineEmission::Header("%constant char*  wxEmptyString = \"\";".into()))
        );
        assert_eq!(
            emission("wxDEFAULT_FRAME_STYLE", "(wxSYSTEM_MENU | wxCAPTION)"),
            Some(DefineEmission::Header(
                "%constant int  wxDEFAULT_FRAME_STYLE = (wxSYSTEM_MENU | wxCAPTION);".into()
            ))
        );
        let mut macro_def = DefineDef::new("wxCHECK", "x");
        macro_def.is_macro = true;
        assert_eq!(classify_define(&macro_def), None);
    }

    #[test]
    fn test_classify_script_defines() {
        assert_eq!(
            emission("wxDefaultSize", "wxSize(-1, -1)"),
            Some(DefineEmission::Script("  DEFAULT_SIZE = Wx::Size.new(-1, -1)".into()))
        );
        assert_eq!(
            emission("wxRED_PEN_COLOUR", "wxColour(255, 0, 0)"),
            Some(DefineEmission::Script(
                "  Wx.add_delayed_constant(self, :RED_PEN_COLOUR) { Wx::Colour.new(255, 0, 0) }".into()
            ))
        );
        assert_eq!(
            emission("wxNORMAL_FONT_SIZE", "wxSystemSettings::GetMetric(wxSYS_BORDER_X, NULL)"),
            Some(DefineEmission::Script(
                "  Wx.add_delayed_constant(self, :NORMAL_FONT_SIZE) { Wx::SystemSettings.get_metric(Wx::SYS_BORDER_X, nil) }"
                    .into()
            ))
        );
    }

    #[test]
    fn test_script_only_when_needed() {
        let mut module = ModuleDef::new("defs");
        module.add_item(Item::Define(DefineDef::new("wxID_ANY", "-1")));
        assert_eq!(ConstantsGenerator::new("Wx", &module).generate(), None);

        module.add_item(Item::Define(DefineDef::new("wxDefaultPosition", "wxPoint(-1, -1)")));
        let script = ConstantsGenerator::new("Wx", &module).generate().unwrap();
        assert!(script.starts_with("# ---"));
        assert!(script.contains("module Wx\n\n  DEFAULT_POSITION = Wx::Point.new(-1, -1)\n\nend\n"));
    }
}
