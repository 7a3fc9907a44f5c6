//! Interface registries shared by every module of a package

use crate::diagnostics::{WeldError, WeldResult};
use crate::extractor::{ClassDef, EnumDef, MemberVarDef, MethodDef};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

/// A member as it will be emitted into the interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisteredMember {
    Method(MethodDef),
    Variable(MemberVarDef),
    Enum(EnumDef),
    InnerClass(ClassDef),
    /// Custom declaration text added by policy
    Custom(String),
}

/// Registration of one generated method, keyed by signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub method: MethodDef,
    pub is_virtual: bool,
    /// Emitted as pure virtual (`=0`)
    pub pure_virtual: bool,
    /// Overridable from Ruby
    pub proxy: bool,
    /// Comes from a custom declaration
    pub extension: bool,
}

/// Generated interface of one class
#[derive(Debug, Default)]
pub struct ClassRegistry {
    public: Vec<RegisteredMember>,
    protected: Vec<RegisteredMember>,
    methods: IndexMap<String, MethodEntry>,
    ignored: Mutex<BTreeSet<String>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public_members(&self) -> &[RegisteredMember] {
        &self.public
    }

    pub fn protected_members(&self) -> &[RegisteredMember] {
        &self.protected
    }

    /// Method registrations in registration order
    pub fn methods(&self) -> &IndexMap<String, MethodEntry> {
        &self.methods
    }

    pub fn method(&self, signature: &str) -> Option<&MethodEntry> {
        self.methods.get(signature)
    }

    pub(crate) fn push_member(&mut self, public: bool, member: RegisteredMember) {
        if public {
            self.public.push(member);
        } else {
            self.protected.push(member);
        }
    }

    pub(crate) fn insert_method(&mut self, entry: MethodEntry) {
        self.methods.insert(entry.method.signature(), entry);
    }

    /// Drop a method from emission (redundant override)
    pub fn mark_ignored(&self, signature: &str) {
        self.ignored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(signature.to_string());
    }

    /// Whether emission of a method was suppressed by the analysis
    pub fn is_method_ignored(&self, method: &MethodDef) -> bool {
        self.ignored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&method.signature())
    }
}

/// Class registries of a whole package
///
/// Each class is registered exactly once; registries are shared read-only
/// afterwards.
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    classes: Mutex<HashMap<String, Arc<ClassRegistry>>>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.lock().contains_key(class)
    }

    pub fn class_registry(&self, class: &str) -> Option<Arc<ClassRegistry>> {
        self.lock().get(class).cloned()
    }

    /// Registry of a class that must have been preprocessed
    pub fn expect_class(&self, class: &str) -> WeldResult<Arc<ClassRegistry>> {
        self.class_registry(class)
            .ok_or_else(|| WeldError::MissingRegistry(class.to_string()))
    }

    /// Register a class; registering a class twice is an error
    pub fn add_class_registry(
        &self,
        class: &str,
        registry: ClassRegistry,
    ) -> WeldResult<Arc<ClassRegistry>> {
        let mut classes = self.lock();
        if classes.contains_key(class) {
            return Err(WeldError::DuplicateRegistry(class.to_string()));
        }
        let registry = Arc::new(registry);
        classes.insert(class.to_string(), Arc::clone(&registry));
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<ClassRegistry>>> {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
