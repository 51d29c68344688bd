//! Test utilities for building class files and archives in memory.
//!
//! These helpers are shared by unit tests, integration tests and
//! benchmarks. They only produce well-formed structures the tests ask
//! for; they are not a general class file assembler.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed.
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    let mut builder = JarBuilder::new();
    for (path, data) in entries {
        builder = builder.file(path, data);
    }
    builder.build()
}

/// Builder for JAR/WAR/ZIP test archives.
///
/// ```
/// use jarlens::test_utils::{ClassFileBuilder, JarBuilder};
///
/// let jar = JarBuilder::new()
///     .manifest("Manifest-Version: 1.0\r\nMulti-Release: true\r\n")
///     .class(ClassFileBuilder::new("a/A").build())
///     .file("a/config.properties", b"x=1")
///     .build();
/// ```
pub struct JarBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl JarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options() -> zip::write::SimpleFileOptions {
        zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644)
    }

    /// Adds a regular file.
    #[must_use]
    pub fn file(mut self, path: &str, data: &[u8]) -> Self {
        self.zip.start_file(path, Self::options()).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a class file at the path derived from its binary name.
    #[must_use]
    pub fn class(self, data: Vec<u8>) -> Self {
        let name = class_name_of(&data);
        self.file(&format!("{}.class", name), &data)
    }

    /// Adds a class file under `META-INF/versions/<release>/`.
    #[must_use]
    pub fn versioned_class(self, release: u32, data: Vec<u8>) -> Self {
        let name = class_name_of(&data);
        self.file(&format!("META-INF/versions/{}/{}.class", release, name), &data)
    }

    /// Adds `META-INF/MANIFEST.MF`.
    #[must_use]
    pub fn manifest(self, text: &str) -> Self {
        let mut text = text.to_string();
        if !text.ends_with('\n') {
            text.push_str("\r\n");
        }
        self.file("META-INF/MANIFEST.MF", text.as_bytes())
    }

    /// Adds a directory entry.
    #[must_use]
    pub fn directory(mut self, path: &str) -> Self {
        self.zip.add_directory(path, Self::options()).unwrap();
        self
    }

    /// Builds and returns the archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }

    /// Builds the archive and writes it to `path`.
    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

impl Default for JarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Binary name stored in a class file built by [`ClassFileBuilder`].
fn class_name_of(data: &[u8]) -> String {
    crate::classfile::parse_class(data, crate::classfile::ParseOptions { scan_references: false })
        .map(|c| c.name().replace('.', "/"))
        .unwrap()
}

/// Content of a `Module` attribute.
#[derive(Debug, Clone, Default)]
pub struct ModuleDescriptor {
    name: String,
    requires: Vec<String>,
    exports: Vec<String>,
    opens: Vec<String>,
    packages: Vec<String>,
}

impl ModuleDescriptor {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn requires(mut self, module: &str) -> Self {
        self.requires.push(module.to_string());
        self
    }

    /// Package in internal form (`org/example/api`)
    #[must_use]
    pub fn exports(mut self, package: &str) -> Self {
        self.exports.push(package.to_string());
        self
    }

    #[must_use]
    pub fn opens(mut self, package: &str) -> Self {
        self.opens.push(package.to_string());
        self
    }

    #[must_use]
    pub fn package(mut self, package: &str) -> Self {
        self.packages.push(package.to_string());
        self
    }
}

/// Builder for minimal, well-formed class files.
///
/// Names are given in internal form (`a/b/Foo`). Members have no code;
/// member references only populate the constant pool.
pub struct ClassFileBuilder {
    name: String,
    super_class: Option<String>,
    access: u16,
    major: u16,
    minor: u16,
    interfaces: Vec<String>,
    fields: Vec<(String, String, u16)>,
    methods: Vec<(String, String, u16, Vec<String>)>,
    member_refs: Vec<(u8, String, String, String)>,
    class_refs: Vec<String>,
    permitted: Vec<String>,
    annotations: Vec<String>,
    module: Option<ModuleDescriptor>,
}

impl ClassFileBuilder {
    /// Public class extending `java/lang/Object`, Java 8 format.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            access: 0x0021,
            major: 52,
            minor: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            member_refs: Vec::new(),
            class_refs: Vec::new(),
            permitted: Vec::new(),
            annotations: Vec::new(),
            module: None,
        }
    }

    /// `module-info` class carrying the given descriptor.
    #[must_use]
    pub fn module_info(descriptor: ModuleDescriptor) -> Self {
        let mut builder = Self::new("module-info").version(53, 0).access(0x8000);
        builder.super_class = None;
        builder.module = Some(descriptor);
        builder
    }

    #[must_use]
    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = Some(name.to_string());
        self
    }

    /// Removes the super class (only valid for `java/lang/Object`).
    #[must_use]
    pub fn no_super_class(mut self) -> Self {
        self.super_class = None;
        self
    }

    #[must_use]
    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    #[must_use]
    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    /// Private field
    #[must_use]
    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.field_with_access(name, descriptor, 0x0002)
    }

    #[must_use]
    pub fn field_with_access(mut self, name: &str, descriptor: &str, access: u16) -> Self {
        self.fields.push((name.to_string(), descriptor.to_string(), access));
        self
    }

    /// Public method
    #[must_use]
    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with_access(name, descriptor, 0x0001)
    }

    #[must_use]
    pub fn method_with_access(mut self, name: &str, descriptor: &str, access: u16) -> Self {
        self.methods
            .push((name.to_string(), descriptor.to_string(), access, Vec::new()));
        self
    }

    /// Public method with an `Exceptions` attribute
    #[must_use]
    pub fn method_throws(mut self, name: &str, descriptor: &str, exceptions: &[&str]) -> Self {
        let exceptions = exceptions.iter().map(|e| e.to_string()).collect();
        self.methods
            .push((name.to_string(), descriptor.to_string(), 0x0001, exceptions));
        self
    }

    #[must_use]
    pub fn field_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.member_refs
            .push((9, owner.to_string(), name.to_string(), descriptor.to_string()));
        self
    }

    #[must_use]
    pub fn method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.member_refs
            .push((10, owner.to_string(), name.to_string(), descriptor.to_string()));
        self
    }

    #[must_use]
    pub fn interface_method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.member_refs
            .push((11, owner.to_string(), name.to_string(), descriptor.to_string()));
        self
    }

    /// Adds a `CONSTANT_Class` entry (internal name or array descriptor).
    #[must_use]
    pub fn class_ref(mut self, name: &str) -> Self {
        self.class_refs.push(name.to_string());
        self
    }

    #[must_use]
    pub fn permitted_subclass(mut self, name: &str) -> Self {
        self.permitted.push(name.to_string());
        self
    }

    /// Adds a class-level runtime-visible annotation without elements.
    #[must_use]
    pub fn annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let mut body = Vec::new();

        let this_class = pool.class(&self.name);
        let super_class = self.super_class.as_deref().map(|s| pool.class(s)).unwrap_or(0);

        for name in &self.class_refs {
            pool.class(name);
        }
        for (tag, owner, name, descriptor) in &self.member_refs {
            pool.member_ref(*tag, owner, name, descriptor);
        }

        put_u16(&mut body, self.access);
        put_u16(&mut body, this_class);
        put_u16(&mut body, super_class);

        put_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            put_u16(&mut body, index);
        }

        put_u16(&mut body, self.fields.len() as u16);
        for (name, descriptor, access) in &self.fields {
            put_u16(&mut body, *access);
            put_u16(&mut body, pool.utf8(name));
            put_u16(&mut body, pool.utf8(descriptor));
            put_u16(&mut body, 0);
        }

        put_u16(&mut body, self.methods.len() as u16);
        for (name, descriptor, access, exceptions) in &self.methods {
            put_u16(&mut body, *access);
            put_u16(&mut body, pool.utf8(name));
            put_u16(&mut body, pool.utf8(descriptor));
            if exceptions.is_empty() {
                put_u16(&mut body, 0);
            } else {
                put_u16(&mut body, 1);
                let mut data = Vec::new();
                put_u16(&mut data, exceptions.len() as u16);
                for exception in exceptions {
                    put_u16(&mut data, pool.class(exception));
                }
                put_attribute(&mut body, pool.utf8("Exceptions"), &data);
            }
        }

        let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();

        if !self.permitted.is_empty() {
            let mut data = Vec::new();
            put_u16(&mut data, self.permitted.len() as u16);
            for name in &self.permitted {
                put_u16(&mut data, pool.class(name));
            }
            attributes.push((pool.utf8("PermittedSubclasses"), data));
        }

        if !self.annotations.is_empty() {
            let mut data = Vec::new();
            put_u16(&mut data, self.annotations.len() as u16);
            for descriptor in &self.annotations {
                put_u16(&mut data, pool.utf8(descriptor));
                put_u16(&mut data, 0);
            }
            attributes.push((pool.utf8("RuntimeVisibleAnnotations"), data));
        }

        if let Some(module) = &self.module {
            attributes.extend(module_attributes(&mut pool, module));
        }

        put_u16(&mut body, attributes.len() as u16);
        for (name_index, data) in &attributes {
            put_attribute(&mut body, *name_index, data);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        put_u16(&mut out, self.minor);
        put_u16(&mut out, self.major);
        put_u16(&mut out, pool.entries.len() as u16 + 1);
        for entry in &pool.entries {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&body);
        out
    }
}

fn module_attributes(pool: &mut PoolWriter, module: &ModuleDescriptor) -> Vec<(u16, Vec<u8>)> {
    let mut data = Vec::new();
    put_u16(&mut data, pool.named(19, &module.name));
    put_u16(&mut data, 0);
    put_u16(&mut data, 0);

    put_u16(&mut data, module.requires.len() as u16);
    for required in &module.requires {
        put_u16(&mut data, pool.named(19, required));
        put_u16(&mut data, 0);
        put_u16(&mut data, 0);
    }

    for packages in [&module.exports, &module.opens] {
        put_u16(&mut data, packages.len() as u16);
        for package in packages {
            put_u16(&mut data, pool.named(20, package));
            put_u16(&mut data, 0);
            put_u16(&mut data, 0);
        }
    }

    // uses, provides
    put_u16(&mut data, 0);
    put_u16(&mut data, 0);

    let mut attributes = vec![(pool.utf8("Module"), data)];

    if !module.packages.is_empty() {
        let mut data = Vec::new();
        put_u16(&mut data, module.packages.len() as u16);
        for package in &module.packages {
            put_u16(&mut data, pool.named(20, package));
        }
        attributes.push((pool.utf8("ModulePackages"), data));
    }

    attributes
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_attribute(out: &mut Vec<u8>, name_index: u16, data: &[u8]) {
    put_u16(out, name_index);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

/// Constant pool writer with de-duplication
#[derive(Default)]
struct PoolWriter {
    entries: Vec<Vec<u8>>,
    index: HashMap<Vec<u8>, u16>,
}

impl PoolWriter {
    fn add(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(index) = self.index.get(&entry) {
            return *index;
        }
        self.entries.push(entry.clone());
        let index = self.entries.len() as u16;
        self.index.insert(entry, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1];
        put_u16(&mut entry, value.len() as u16);
        entry.extend_from_slice(value.as_bytes());
        self.add(entry)
    }

    /// Class (7), Module (19) or Package (20) entry pointing at a name
    fn named(&mut self, tag: u8, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut entry = vec![tag];
        put_u16(&mut entry, name_index);
        self.add(entry)
    }

    fn class(&mut self, name: &str) -> u16 {
        self.named(7, name)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);

        let mut name_and_type = vec![12];
        put_u16(&mut name_and_type, name_index);
        put_u16(&mut name_and_type, descriptor_index);
        let name_and_type_index = self.add(name_and_type);

        let mut entry = vec![tag];
        put_u16(&mut entry, class_index);
        put_u16(&mut entry, name_and_type_index);
        self.add(entry)
    }
}
