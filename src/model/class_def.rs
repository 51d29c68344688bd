// Class and resource records produced by ingestion

use super::{AccessFlags, JarFile};
use crate::classfile::package_name;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

/// Release assigned to entries outside `META-INF/versions/`
pub const BASE_RELEASE: u32 = 8;

/// A field referenced from bytecode (external names)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// A method referenced from bytecode (external names)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    pub interface: bool,
}

/// A field or method declared by a class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberDef {
    pub name: String,
    /// Descriptor in internal form, e.g. `(Ljava/lang/String;)V`
    pub descriptor: String,
    pub access: AccessFlags,
}

impl MemberDef {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access,
        }
    }
}

/// Symbolic references found in one class file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassReferences {
    pub classes: BTreeSet<String>,
    pub fields: BTreeSet<FieldRef>,
    pub methods: BTreeSet<MethodRef>,
}

impl ClassReferences {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }
}

/// Structural model of one class file.
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    permitted_subclasses: Vec<String>,
    access: AccessFlags,
    fields: Vec<MemberDef>,
    methods: Vec<MemberDef>,
    major_version: u16,
    minor_version: u16,
    release: u32,
    checksum: String,
    references: Option<ClassReferences>,
    unknown_ancestry: bool,
    owner: Weak<JarFile>,
}

impl ClassDef {
    /// Create a detached class record. Names are in external (dotted) form.
    pub fn new(name: impl Into<String>, super_name: Option<String>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            super_name,
            interfaces: Vec::new(),
            permitted_subclasses: Vec::new(),
            access,
            fields: Vec::new(),
            methods: Vec::new(),
            major_version: 52,
            minor_version: 0,
            release: BASE_RELEASE,
            checksum: String::new(),
            references: None,
            unknown_ancestry: false,
            owner: Weak::new(),
        }
    }

    pub fn with_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_permitted_subclasses(mut self, permitted: Vec<String>) -> Self {
        self.permitted_subclasses = permitted;
        self
    }

    pub fn with_fields(mut self, fields: Vec<MemberDef>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_methods(mut self, methods: Vec<MemberDef>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    pub fn with_release(mut self, release: u32) -> Self {
        self.release = release;
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = checksum.into();
        self
    }

    pub fn with_references(mut self, references: ClassReferences) -> Self {
        self.references = Some(references);
        self
    }

    /// Mark a record whose super class and interfaces are not known,
    /// like runtime classes assumed from a package prefix
    pub fn with_unknown_ancestry(mut self) -> Self {
        self.unknown_ancestry = true;
        self
    }

    pub(crate) fn with_owner(mut self, owner: Weak<JarFile>) -> Self {
        self.owner = owner;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        package_name(&self.name)
    }

    /// `None` only for `java.lang.Object` and module descriptors
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn permitted_subclasses(&self) -> &[String] {
        &self.permitted_subclasses
    }

    pub fn access(&self) -> AccessFlags {
        self.access
    }

    /// Declared fields in class file order
    pub fn fields(&self) -> &[MemberDef] {
        &self.fields
    }

    /// Declared methods in class file order
    pub fn methods(&self) -> &[MemberDef] {
        &self.methods
    }

    pub fn field(&self, name: &str, descriptor: &str) -> Option<&MemberDef> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MemberDef> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// Java release targeted by the class file format (52 → 8)
    pub fn java_release(&self) -> u32 {
        u32::from(self.major_version).saturating_sub(44)
    }

    /// Multi-release slice this class was taken from
    pub fn release(&self) -> u32 {
        self.release
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Extracted references, present only when reference scanning was on
    pub fn references(&self) -> Option<&ClassReferences> {
        self.references.as_ref()
    }

    pub fn owner(&self) -> Option<Arc<JarFile>> {
        self.owner.upgrade()
    }

    /// `true` if [`ClassDef::parents`] may be incomplete
    pub fn has_unknown_ancestry(&self) -> bool {
        self.unknown_ancestry
    }

    pub fn is_module_info(&self) -> bool {
        self.name == "module-info"
    }

    /// Super class followed by all directly implemented interfaces
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.super_name
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

// The owner is a back-reference and not part of the class's identity.
impl PartialEq for ClassDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.super_name == other.super_name
            && self.interfaces == other.interfaces
            && self.permitted_subclasses == other.permitted_subclasses
            && self.access == other.access
            && self.fields == other.fields
            && self.methods == other.methods
            && self.major_version == other.major_version
            && self.minor_version == other.minor_version
            && self.release == other.release
            && self.checksum == other.checksum
            && self.references == other.references
            && self.unknown_ancestry == other.unknown_ancestry
    }
}

impl Eq for ClassDef {}

/// A non-class archive entry.
#[derive(Debug, Clone)]
pub struct ResourceDef {
    path: String,
    checksum: String,
    release: u32,
    owner: Weak<JarFile>,
}

impl ResourceDef {
    pub fn new(path: impl Into<String>, checksum: impl Into<String>, release: u32) -> Self {
        Self {
            path: path.into(),
            checksum: checksum.into(),
            release,
            owner: Weak::new(),
        }
    }

    pub(crate) fn with_owner(mut self, owner: Weak<JarFile>) -> Self {
        self.owner = owner;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn release(&self) -> u32 {
        self.release
    }

    pub fn owner(&self) -> Option<Arc<JarFile>> {
        self.owner.upgrade()
    }
}

impl PartialEq for ResourceDef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.checksum == other.checksum && self.release == other.release
    }
}

impl Eq for ResourceDef {}
