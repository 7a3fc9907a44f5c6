//! Type-mapping registry
//!
//! A [`Typemap`] maps one or more native parameter patterns to a Ruby type
//! and carries the conversion code for every direction SWIG knows about.
//! The [`TypemapRegistry`] resolves patterns first-match over its ordered
//! rule list and renders the module's rules as `%typemap`/`%apply`
//! directives.

pub mod common;

use crate::diagnostics::{WeldError, WeldResult};
use crate::extractor::{normalize_type, split_type_and_name, MethodDef, ParamDef};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Conversion direction of a typemap fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    Argout,
    Check,
    Default,
    Freearg,
    DirectorIn,
    DirectorOut,
    DirectorArgout,
    Typecheck,
    Varout,
}

impl Direction {
    /// Every direction in emission order
    pub const ALL: [Direction; 11] = [
        Direction::In,
        Direction::Default,
        Direction::Typecheck,
        Direction::Check,
        Direction::Argout,
        Direction::Freearg,
        Direction::Out,
        Direction::DirectorIn,
        Direction::DirectorOut,
        Direction::DirectorArgout,
        Direction::Varout,
    ];

    /// SWIG typemap method name
    pub fn swig_name(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Argout => "argout",
            Direction::Check => "check",
            Direction::Default => "default",
            Direction::Freearg => "freearg",
            Direction::DirectorIn => "directorin",
            Direction::DirectorOut => "directorout",
            Direction::DirectorArgout => "directorargout",
            Direction::Typecheck => "typecheck",
            Direction::Varout => "varout",
        }
    }
}

/// Code fragment of one direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapCode {
    /// Conversion code (`$1`, `$input`, `$result` placeholders)
    pub code: String,
    /// Temporary variable declaration (`in` only)
    pub temp: Option<String>,
    /// Input consumes no scripting argument (`in` only, `numinputs=0`)
    pub ignore_input: bool,
    /// Overload resolution precedence (`typecheck` only), e.g. `INT32`
    pub precedence: Option<String>,
}

impl MapCode {
    /// Create a fragment
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Declare a temporary
    pub fn temp(mut self, temp: impl Into<String>) -> Self {
        self.temp = Some(temp.into());
        self
    }

    /// Consume no input argument
    pub fn ignore_input(mut self) -> Self {
        self.ignore_input = true;
        self
    }
}

/// A typemap rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typemap {
    /// Native patterns; a pattern may span several parameters (`int n, const wxString* choices`)
    pub patterns: Vec<String>,
    /// Ruby type description used in documentation
    pub rb_type: Option<String>,
    #[serde(rename = "in")]
    pub map_in: Option<MapCode>,
    #[serde(rename = "out")]
    pub map_out: Option<MapCode>,
    pub argout: Option<MapCode>,
    pub check: Option<MapCode>,
    pub default: Option<MapCode>,
    pub freearg: Option<MapCode>,
    pub directorin: Option<MapCode>,
    pub directorout: Option<MapCode>,
    pub directorargout: Option<MapCode>,
    pub typecheck: Option<MapCode>,
    pub varout: Option<MapCode>,
    /// Return types dropped (turned into `void`) for methods this rule matches
    pub ignored_out: Vec<String>,
}

/// One parameter of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParamPattern {
    ty: String,
    name: Option<String>,
}

impl ParamPattern {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        let (text, array) = match text
            .strip_suffix(']')
            .and_then(|t| t.trim_end().strip_suffix('['))
        {
            Some(rest) => (rest, true),
            None => (text, false),
        };
        let (ty, name) = split_type_and_name(text);
        let ty = if array { format!("{}[]", ty) } else { ty };
        Self {
            ty: comparable_type(&ty),
            name,
        }
    }

    fn matches(&self, param: &ParamDef) -> bool {
        self.ty == comparable_type(&param.signature_type())
            && self.name.as_ref().map_or(true, |n| *n == param.name)
    }
}

/// Type text compared without a leading `const`
fn comparable_type(ty: &str) -> String {
    let ty = normalize_type(ty);
    match ty.strip_prefix("const ") {
        Some(rest) => rest.to_string(),
        None => ty,
    }
}

impl Typemap {
    /// Create a rule for the given patterns
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.as_ref().trim().to_string()).collect(),
            ..Default::default()
        }
    }

    /// Set the Ruby type
    pub fn rb_type(mut self, rb_type: impl Into<String>) -> Self {
        self.rb_type = Some(rb_type.into());
        self
    }

    /// Set the fragment of a direction
    pub fn with(mut self, direction: Direction, code: MapCode) -> Self {
        *self.slot_mut(direction) = Some(code);
        self
    }

    /// Set the typecheck fragment with its precedence
    pub fn typecheck_with(self, precedence: &str, code: impl Into<String>) -> Self {
        let mut map = MapCode::new(code);
        map.precedence = Some(precedence.to_string());
        self.with(Direction::Typecheck, map)
    }

    /// Drop these return types for matching methods
    pub fn ignore_out<S: AsRef<str>>(mut self, types: &[S]) -> Self {
        self.ignored_out
            .extend(types.iter().map(|t| normalize_type(t.as_ref())));
        self
    }

    /// Fragment of a direction
    pub fn slot(&self, direction: Direction) -> Option<&MapCode> {
        match direction {
            Direction::In => self.map_in.as_ref(),
            Direction::Out => self.map_out.as_ref(),
            Direction::Argout => self.argout.as_ref(),
            Direction::Check => self.check.as_ref(),
            Direction::Default => self.default.as_ref(),
            Direction::Freearg => self.freearg.as_ref(),
            Direction::DirectorIn => self.directorin.as_ref(),
            Direction::DirectorOut => self.directorout.as_ref(),
            Direction::DirectorArgout => self.directorargout.as_ref(),
            Direction::Typecheck => self.typecheck.as_ref(),
            Direction::Varout => self.varout.as_ref(),
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<MapCode> {
        match direction {
            Direction::In => &mut self.map_in,
            Direction::Out => &mut self.map_out,
            Direction::Argout => &mut self.argout,
            Direction::Check => &mut self.check,
            Direction::Default => &mut self.default,
            Direction::Freearg => &mut self.freearg,
            Direction::DirectorIn => &mut self.directorin,
            Direction::DirectorOut => &mut self.directorout,
            Direction::DirectorArgout => &mut self.directorargout,
            Direction::Typecheck => &mut self.typecheck,
            Direction::Varout => &mut self.varout,
        }
    }

    /// Check the rule is usable
    pub fn validate(&self) -> WeldResult<()> {
        if self.patterns.is_empty() {
            return Err(WeldError::Typemap("typemap without patterns".to_string()));
        }
        if Direction::ALL.iter().all(|d| self.slot(*d).is_none()) && self.rb_type.is_none() {
            return Err(WeldError::Typemap(format!(
                "typemap for {} defines no conversion",
                self.patterns.join(", ")
            )));
        }
        if let Some(tc) = &self.typecheck {
            if tc.precedence.is_none() {
                return Err(WeldError::Typemap(format!(
                    "typecheck for {} requires a precedence",
                    self.patterns.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn parsed_patterns(&self) -> Vec<Vec<ParamPattern>> {
        self.patterns
            .iter()
            .map(|p| p.split(',').map(ParamPattern::parse).collect())
            .collect()
    }

    /// Whether a single parameter matches one of the single-parameter patterns
    pub fn matches_param(&self, param: &ParamDef) -> bool {
        self.parsed_patterns()
            .iter()
            .any(|p| p.len() == 1 && p[0].matches(param))
    }

    /// Whether a (return) type matches one of the unnamed single-parameter patterns
    pub fn matches_type(&self, ty: &str) -> bool {
        let wanted = comparable_type(ty);
        self.parsed_patterns()
            .iter()
            .any(|p| p.len() == 1 && p[0].name.is_none() && p[0].ty == wanted)
    }

    /// Whether any pattern matches a run of the method's parameters
    pub fn matches_method(&self, method: &MethodDef) -> bool {
        self.parsed_patterns().iter().any(|pattern| {
            method.params.windows(pattern.len()).any(|run| {
                run.iter().zip(pattern).all(|(param, pat)| pat.matches(param))
            })
        })
    }

    /// Whether matching methods lose their return value
    pub fn has_ignored_out(&self) -> bool {
        !self.ignored_out.is_empty()
    }

    fn swig_targets(&self, temp: Option<&str>) -> String {
        self.patterns
            .iter()
            .map(|p| {
                let target = if p.contains(',') {
                    format!("({})", p)
                } else {
                    p.clone()
                };
                match temp {
                    Some(temp) => format!("{} ({})", target, temp),
                    None => target,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render as SWIG `%typemap` directives
    pub fn to_swig(&self) -> String {
        let mut out = String::new();
        for direction in Direction::ALL {
            let Some(map) = self.slot(direction) else {
                continue;
            };
            let mut method = direction.swig_name().to_string();
            if direction == Direction::In && map.ignore_input {
                method.push_str(",numinputs=0");
            }
            if let Some(precedence) = &map.precedence {
                let _ = write!(method, ", precedence=SWIG_TYPECHECK_{}", precedence.to_uppercase());
            }
            let temp = if direction == Direction::In { map.temp.as_deref() } else { None };
            let _ = writeln!(out, "%typemap({}) {} {{", method, self.swig_targets(temp));
            for line in map.code.trim_end().lines() {
                if line.trim().is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "  {}", line);
                }
            }
            out.push_str("}\n");
        }
        out
    }
}

/// `%apply` of an existing typemap to further declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapApply {
    /// Pattern whose typemaps are applied
    pub from: String,
    /// Declarations receiving them
    pub to: Vec<String>,
}

impl MapApply {
    /// Render as SWIG `%apply`
    pub fn to_swig(&self) -> String {
        format!("%apply {} {{ {} }};", self.from, self.to.join(", "))
    }
}

/// Where a rule was registered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Module specific rule
    Module,
    /// Shared rule set
    Common,
}

/// Ordered rule list with first-match lookup
#[derive(Debug, Clone, Default)]
pub struct TypemapRegistry {
    maps: Vec<(Origin, Typemap)>,
    applies: Vec<(Origin, MapApply)>,
}

impl TypemapRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the module rules ahead of the common rule set
    pub fn for_module(maps: &[Typemap], applies: &[MapApply]) -> WeldResult<Self> {
        let mut registry = Self::new();
        for map in maps {
            registry.register(Origin::Module, map.clone())?;
        }
        for apply in applies {
            registry.apply(Origin::Module, apply.clone());
        }
        registry.extend_common()?;
        Ok(registry)
    }

    /// Append the common rule set
    pub fn extend_common(&mut self) -> WeldResult<()> {
        for map in common::common_typemaps() {
            self.register(Origin::Common, map)?;
        }
        for apply in common::common_applies() {
            self.apply(Origin::Common, apply);
        }
        Ok(())
    }

    /// Register a rule after validating it
    pub fn register(&mut self, origin: Origin, map: Typemap) -> WeldResult<()> {
        map.validate()?;
        self.maps.push((origin, map));
        Ok(())
    }

    /// Register an `%apply`
    pub fn apply(&mut self, origin: Origin, apply: MapApply) {
        self.applies.push((origin, apply));
    }

    /// Iterate the rules in lookup order
    pub fn maps(&self) -> impl Iterator<Item = &Typemap> {
        self.maps.iter().map(|(_, m)| m)
    }

    /// First rule matching a parameter
    pub fn find_for_param(&self, param: &ParamDef) -> Option<&Typemap> {
        self.maps().find(|m| m.matches_param(param))
    }

    /// First rule matching a type
    pub fn find_for_type(&self, ty: &str) -> Option<&Typemap> {
        self.maps().find(|m| m.matches_type(ty))
    }

    /// Ruby type of a parameter, if a rule describes one
    pub fn rb_param_type(&self, param: &ParamDef) -> Option<&str> {
        self.maps()
            .filter(|m| m.rb_type.is_some())
            .find(|m| m.matches_param(param))
            .and_then(|m| m.rb_type.as_deref())
    }

    /// Ruby type of a return type, if a rule describes one
    pub fn rb_return_type(&self, ty: &str) -> Option<&str> {
        self.maps()
            .filter(|m| m.rb_type.is_some())
            .find(|m| m.matches_type(ty))
            .and_then(|m| m.rb_type.as_deref())
    }

    /// Return type to declare for a method, honoring ignored outputs
    pub fn declared_return_type(&self, method: &MethodDef) -> String {
        let ty = method.type_text();
        let dropped = self
            .maps()
            .filter(|m| m.has_ignored_out())
            .find(|m| m.matches_method(method))
            .is_some_and(|m| m.ignored_out.contains(&normalize_type(ty)));
        if dropped {
            "void".to_string()
        } else {
            ty.to_string()
        }
    }

    fn render(&self, origin: Origin) -> String {
        let mut out = String::new();
        // later SWIG definitions win, so the highest priority rule goes last
        for (_, map) in self.maps.iter().rev().filter(|(o, _)| *o == origin) {
            out.push_str(&map.to_swig());
            out.push('\n');
        }
        for (_, apply) in self.applies.iter().filter(|(o, _)| *o == origin) {
            out.push_str(&apply.to_swig());
            out.push('\n');
        }
        out
    }

    /// SWIG text of the module specific rules
    pub fn to_swig(&self) -> String {
        self.render(Origin::Module)
    }

    /// SWIG text of the common rule set
    pub fn common_to_swig(&self) -> String {
        self.render(Origin::Common)
    }
}
