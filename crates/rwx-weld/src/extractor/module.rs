//! Extracted module definition and item lookup
//!
//! A [`ModuleDef`] holds every declaration extracted for one director
//! module. Items are addressed by their full name:
//!
//! - `Name` for top-level items (and values of top-level enums)
//! - `Class::Member` for members, `Class::Inner::Member` for inner classes
//! - `Class::Member(arg types) [const]` for one overload of a method

use crate::extractor::class::{ClassDef, Member};
use crate::extractor::enums::{EnumDef, EnumValueDef};
use crate::extractor::function::{normalize_type, MethodDef};
use crate::extractor::item::ItemInfo;
use crate::extractor::variable::{DefineDef, GlobalVarDef, MemberVarDef, TypedefDef};
use serde::{Deserialize, Serialize};

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    /// Class or struct
    Class(ClassDef),
    /// Free function with its overload chain
    Function(MethodDef),
    /// Enumeration
    Enum(EnumDef),
    /// Global variable
    Variable(GlobalVarDef),
    /// Typedef
    Typedef(TypedefDef),
    /// Preprocessor define
    Define(DefineDef),
}

impl Item {
    /// Common attributes
    pub fn info(&self) -> &ItemInfo {
        match self {
            Item::Class(c) => &c.info,
            Item::Function(f) => &f.info,
            Item::Enum(e) => &e.info,
            Item::Variable(v) => &v.info,
            Item::Typedef(t) => &t.info,
            Item::Define(d) => &d.info,
        }
    }

    /// Item name
    pub fn name(&self) -> &str {
        &self.info().name
    }

    fn as_ref(&self) -> ItemRef<'_> {
        match self {
            Item::Class(c) => ItemRef::Class(c),
            Item::Function(f) => ItemRef::Method(f),
            Item::Enum(e) => ItemRef::Enum(e),
            Item::Variable(v) => ItemRef::Variable(v),
            Item::Typedef(t) => ItemRef::Typedef(t),
            Item::Define(d) => ItemRef::Define(d),
        }
    }

    fn as_mut(&mut self) -> ItemMut<'_> {
        match self {
            Item::Class(c) => ItemMut::Class(c),
            Item::Function(f) => ItemMut::Method(f),
            Item::Enum(e) => ItemMut::Enum(e),
            Item::Variable(v) => ItemMut::Variable(v),
            Item::Typedef(t) => ItemMut::Typedef(t),
            Item::Define(d) => ItemMut::Define(d),
        }
    }
}

impl Member {
    fn as_ref(&self) -> ItemRef<'_> {
        match self {
            Member::Method(m) => ItemRef::Method(m),
            Member::Variable(v) => ItemRef::MemberVar(v),
            Member::Enum(e) => ItemRef::Enum(e),
            Member::Class(c) => ItemRef::Class(c),
        }
    }

    fn as_mut(&mut self) -> ItemMut<'_> {
        match self {
            Member::Method(m) => ItemMut::Method(m),
            Member::Variable(v) => ItemMut::MemberVar(v),
            Member::Enum(e) => ItemMut::Enum(e),
            Member::Class(c) => ItemMut::Class(c),
        }
    }
}

/// Shared reference to a resolved declaration
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Class(&'a ClassDef),
    Method(&'a MethodDef),
    Enum(&'a EnumDef),
    EnumValue(&'a EnumValueDef),
    Variable(&'a GlobalVarDef),
    MemberVar(&'a MemberVarDef),
    Typedef(&'a TypedefDef),
    Define(&'a DefineDef),
}

impl<'a> ItemRef<'a> {
    /// Common attributes
    pub fn info(&self) -> &'a ItemInfo {
        match *self {
            ItemRef::Class(c) => &c.info,
            ItemRef::Method(m) => &m.info,
            ItemRef::Enum(e) => &e.info,
            ItemRef::EnumValue(v) => &v.info,
            ItemRef::Variable(v) => &v.info,
            ItemRef::MemberVar(v) => &v.info,
            ItemRef::Typedef(t) => &t.info,
            ItemRef::Define(d) => &d.info,
        }
    }

    /// Resolved class, if the item is one
    pub fn as_class(&self) -> Option<&'a ClassDef> {
        match *self {
            ItemRef::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Resolved method, if the item is one
    pub fn as_method(&self) -> Option<&'a MethodDef> {
        match *self {
            ItemRef::Method(m) => Some(m),
            _ => None,
        }
    }
}

/// Mutable reference to a resolved declaration
#[derive(Debug)]
pub enum ItemMut<'a> {
    Class(&'a mut ClassDef),
    Method(&'a mut MethodDef),
    Enum(&'a mut EnumDef),
    EnumValue(&'a mut EnumValueDef),
    Variable(&'a mut GlobalVarDef),
    MemberVar(&'a mut MemberVarDef),
    Typedef(&'a mut TypedefDef),
    Define(&'a mut DefineDef),
}

impl ItemMut<'_> {
    /// Common attributes
    pub fn info_mut(&mut self) -> &mut ItemInfo {
        match self {
            ItemMut::Class(c) => &mut c.info,
            ItemMut::Method(m) => &mut m.info,
            ItemMut::Enum(e) => &mut e.info,
            ItemMut::EnumValue(v) => &mut v.info,
            ItemMut::Variable(v) => &mut v.info,
            ItemMut::MemberVar(v) => &mut v.info,
            ItemMut::Typedef(t) => &mut t.info,
            ItemMut::Define(d) => &mut d.info,
        }
    }
}

/// Parsed item address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Scope path segments
    pub path: Vec<String>,
    /// Argument types selecting one overload
    pub args: Option<Vec<String>>,
    /// Selects the const overload
    pub is_const: bool,
}

impl ItemQuery {
    /// Parse a full item name
    pub fn parse(fullname: &str) -> Self {
        let fullname = fullname.trim();
        let (path, args, is_const) = match fullname.find('(') {
            Some(open) => {
                let close = fullname.rfind(')').unwrap_or(fullname.len());
                let inner = &fullname[open + 1..close.max(open + 1)];
                let tail = fullname.get(close + 1..).unwrap_or("").trim();
                (&fullname[..open], Some(split_args(inner)), tail == "const")
            }
            None => (fullname, None, false),
        };
        Self {
            path: path
                .trim()
                .split("::")
                .map(|s| s.trim().to_string())
                .collect(),
            args,
            is_const,
        }
    }

    fn selects(&self, method: &MethodDef) -> bool {
        let Some(args) = &self.args else {
            return true;
        };
        method.is_const == self.is_const
            && method.params.len() == args.len()
            && method
                .params
                .iter()
                .zip(args)
                .all(|(p, a)| p.signature_type() == normalize_type(a))
    }
}

/// Split an argument type list at top-level commas
fn split_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '<' | '(' => {
                depth += 1;
                current.push(c);
            }
            '>' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => args.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !args.is_empty() {
        args.push(current);
    }
    args.into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty() && a != "void")
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Item(usize),
    Member(usize),
    Value(usize),
}

/// Resolved position of an item inside a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    steps: Vec<Step>,
    /// Selected overload: 0 is the root method, `n` is `overloads[n - 1]`
    overload: Option<usize>,
}

impl Location {
    /// Whether a single overload was selected
    pub fn is_overload(&self) -> bool {
        self.overload.is_some()
    }
}

/// Definitions extracted for one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Module name
    pub name: String,
    /// Declaration items the module was extracted from
    pub item_names: Vec<String>,
    /// Extracted declarations in input order
    pub items: Vec<Item>,
}

impl ModuleDef {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an item; free functions sharing a name are chained as overloads
    pub fn add_item(&mut self, item: Item) {
        if let Item::Function(function) = item {
            let existing = self.items.iter_mut().find_map(|i| match i {
                Item::Function(first) if first.info.name == function.info.name => Some(first),
                _ => None,
            });
            match existing {
                Some(first) => first.add_overload(function),
                None => self.items.push(Item::Function(function)),
            }
        } else {
            self.items.push(item);
        }
    }

    /// Iterate the classes
    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.items.iter().filter_map(|i| match i {
            Item::Class(c) => Some(c),
            _ => None,
        })
    }

    /// Find a top-level class by name
    pub fn find_class(&self, name: &str) -> Option<&ClassDef> {
        self.classes().find(|c| c.info.name == name)
    }

    /// Mutable variant of [`ModuleDef::find_class`]
    pub fn find_class_mut(&mut self, name: &str) -> Option<&mut ClassDef> {
        self.items.iter_mut().find_map(|i| match i {
            Item::Class(c) if c.info.name == name => Some(c),
            _ => None,
        })
    }

    /// Resolve a full item name to its position
    pub fn locate(&self, fullname: &str) -> Option<Location> {
        let query = ItemQuery::parse(fullname);
        let (first, rest) = query.path.split_first()?;

        let mut steps = Vec::new();
        match self.items.iter().position(|i| i.name() == first) {
            Some(idx) => steps.push(Step::Item(idx)),
            None if rest.is_empty() => {
                // values of top-level enums live in the module scope
                let (idx, value) = self.items.iter().enumerate().find_map(|(idx, i)| match i {
                    Item::Enum(e) => e
                        .values
                        .iter()
                        .position(|v| v.info.name == *first)
                        .map(|v| (idx, v)),
                    _ => None,
                })?;
                steps.push(Step::Item(idx));
                steps.push(Step::Value(value));
                return Some(Location {
                    steps,
                    overload: None,
                });
            }
            None => return None,
        }

        let mut current = self.items[match steps[0] {
            Step::Item(idx) => idx,
            _ => return None,
        }]
        .as_ref();
        for (n, segment) in rest.iter().enumerate() {
            let last = n + 1 == rest.len();
            match current {
                ItemRef::Class(class) => {
                    if let Some(idx) = class.members.iter().position(|m| m.name() == segment) {
                        steps.push(Step::Member(idx));
                        current = class.members[idx].as_ref();
                    } else if last {
                        let (idx, value) =
                            class.members.iter().enumerate().find_map(|(idx, m)| match m {
                                Member::Enum(e) => e
                                    .values
                                    .iter()
                                    .position(|v| v.info.name == *segment)
                                    .map(|v| (idx, v)),
                                _ => None,
                            })?;
                        steps.push(Step::Member(idx));
                        steps.push(Step::Value(value));
                        let Member::Enum(e) = &class.members[idx] else {
                            return None;
                        };
                        current = ItemRef::EnumValue(&e.values[value]);
                    } else {
                        return None;
                    }
                }
                ItemRef::Enum(e) => {
                    let idx = e.values.iter().position(|v| v.info.name == *segment)?;
                    steps.push(Step::Value(idx));
                    current = ItemRef::EnumValue(&e.values[idx]);
                }
                _ => return None,
            }
        }

        let overload = match (current, &query.args) {
            (ItemRef::Method(method), Some(_)) => {
                Some(method.all().position(|m| query.selects(m))?)
            }
            (_, Some(_)) => return None,
            _ => None,
        };
        Some(Location { steps, overload })
    }

    /// Resolve a full item name
    pub fn find_item(&self, fullname: &str) -> Option<ItemRef<'_>> {
        let location = self.locate(fullname)?;
        self.get(&location)
    }

    /// Resolve a full item name for mutation
    pub fn find_item_mut(&mut self, fullname: &str) -> Option<ItemMut<'_>> {
        let location = self.locate(fullname)?;
        self.get_mut(&location)
    }

    /// Item at a resolved location
    pub fn get(&self, location: &Location) -> Option<ItemRef<'_>> {
        let mut steps = location.steps.iter();
        let mut current = match steps.next()? {
            Step::Item(idx) => self.items.get(*idx)?.as_ref(),
            _ => return None,
        };
        for step in steps {
            current = match (current, step) {
                (ItemRef::Class(c), Step::Member(idx)) => c.members.get(*idx)?.as_ref(),
                (ItemRef::Enum(e), Step::Value(idx)) => ItemRef::EnumValue(e.values.get(*idx)?),
                _ => return None,
            };
        }
        match (current, location.overload) {
            (ItemRef::Method(m), Some(ovl)) => m.all().nth(ovl).map(ItemRef::Method),
            (current, _) => Some(current),
        }
    }

    /// Mutable item at a resolved location
    pub fn get_mut(&mut self, location: &Location) -> Option<ItemMut<'_>> {
        let mut steps = location.steps.iter();
        let mut current = match steps.next()? {
            Step::Item(idx) => self.items.get_mut(*idx)?.as_mut(),
            _ => return None,
        };
        for step in steps {
            current = match (current, step) {
                (ItemMut::Class(c), Step::Member(idx)) => c.members.get_mut(*idx)?.as_mut(),
                (ItemMut::Enum(e), Step::Value(idx)) => {
                    ItemMut::EnumValue(e.values.get_mut(*idx)?)
                }
                _ => return None,
            };
        }
        match (current, location.overload) {
            (ItemMut::Method(m), Some(0)) => Some(ItemMut::Method(m)),
            (ItemMut::Method(m), Some(ovl)) => m.overloads.get_mut(ovl - 1).map(ItemMut::Method),
            (current, _) => Some(current),
        }
    }

    /// Apply `update` to the named item; a method named without argument
    /// list has all of its overloads updated as well.
    ///
    /// Returns `false` when the name does not resolve.
    pub fn update_item(&mut self, fullname: &str, mut update: impl FnMut(&mut ItemInfo)) -> bool {
        let Some(location) = self.locate(fullname) else {
            return false;
        };
        let whole_chain = !location.is_overload();
        match self.get_mut(&location) {
            Some(ItemMut::Method(method)) if whole_chain => {
                method.for_each_mut(|m| update(&mut m.info));
                true
            }
            Some(mut item) => {
                update(item.info_mut());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::class::BaseRef;
    use crate::extractor::function::ParamDef;

    fn sample_module() -> ModuleDef {
        let mut module = ModuleDef::new("wxComboBox");
        let mut class = ClassDef::new("wxComboBox")
            .base(BaseRef::new("wxControlWithItems"))
            .method(MethodDef::ctor("wxComboBox"))
            .method(
                MethodDef::new("SetSelection")
                    .param(ParamDef::new("n", "int"))
                    .virtual_(),
            )
            .method(
                MethodDef::new("SetSelection")
                    .param(ParamDef::new("from", "long"))
                    .param(ParamDef::new("to", "long")),
            )
            .method(
                MethodDef::new("GetSelection")
                    .param(ParamDef::new("from", "long *"))
                    .param(ParamDef::new("to", "long *"))
                    .const_(),
            );
        class.add_member(Member::Enum(EnumDef::new("Style").value("wxCB_SIMPLE")));
        module.add_item(Item::Class(class));
        module.add_item(Item::Enum(EnumDef::new("wxBorder").value("wxBORDER_NONE")));
        module.add_item(Item::Function(MethodDef::new("wxYield").returns("bool")));
        module
    }

    #[test]
    fn test_parse_query() {
        let q = ItemQuery::parse("wxImage::SaveFile(wxOutputStream &,const wxString &) const");
        assert_eq!(q.path, vec!["wxImage", "SaveFile"]);
        assert_eq!(
            q.args,
            Some(vec!["wxOutputStream &".to_string(), "const wxString &".to_string()])
        );
        assert!(q.is_const);

        let q = ItemQuery::parse("wxFoo::Bar(std::map<int, int>)");
        assert_eq!(q.args.unwrap().len(), 1);

        let q = ItemQuery::parse("wxFoo::Bar()");
        assert_eq!(q.args, Some(vec![]));
    }

    #[test]
    fn test_find_item() {
        let module = sample_module();
        assert!(module.find_item("wxComboBox").unwrap().as_class().is_some());
        assert!(module.find_item("wxYield").unwrap().as_method().is_some());
        assert_eq!(module.find_item("wxBORDER_NONE").unwrap().info().name, "wxBORDER_NONE");
        assert_eq!(
            module.find_item("wxComboBox::wxCB_SIMPLE").unwrap().info().name,
            "wxCB_SIMPLE"
        );
        assert_eq!(module.find_item("wxComboBox::Style::wxCB_SIMPLE").unwrap().info().name, "wxCB_SIMPLE");
        assert!(module.find_item("wxComboBox::Missing").is_none());
        assert!(module.find_item("wxTextEntry").is_none());

        let ovl = module
            .find_item("wxComboBox::SetSelection(long, long)")
            .unwrap()
            .as_method()
            .unwrap();
        assert_eq!(ovl.params.len(), 2);

        let getter = module.find_item("wxComboBox::GetSelection(long *, long *) const");
        assert!(getter.is_some());
        assert!(module.find_item("wxComboBox::GetSelection(long *, long *)").is_none());
    }

    #[test]
    fn test_update_item_chain_and_single_overload() {
        let mut module = sample_module();
        assert!(module.update_item("wxComboBox::SetSelection(long,long)", |i| i.ignored = true));
        let class = module.find_class("wxComboBox").unwrap();
        let m = class.find_method("SetSelection").unwrap();
        assert!(!m.info.ignored);
        assert!(m.overloads[0].info.ignored);

        assert!(module.update_item("wxComboBox::SetSelection", |i| i.ignored = true));
        let m = module.find_class("wxComboBox").unwrap().find_method("SetSelection").unwrap();
        assert!(m.all().all(|o| o.info.ignored));

        assert!(!module.update_item("wxComboBox::Nope", |i| i.ignored = true));
    }
}
