// Class file parser
//
// Decodes the structure of a class file (header, constant pool, members,
// attributes) without interpreting bytecode. Attribute bodies are kept as
// slices and only decoded when needed.

use super::constant_pool::{Constant, ConstantPool};
use super::descriptor::{class_constant_name, descriptor_class_names, to_external_name};
use super::reader::ByteReader;
use crate::error::ClassFormatError;
use crate::model::{AccessFlags, ClassDef, ClassReferences, FieldRef, MemberDef, MethodRef};
use tracing::debug;

pub const MAGIC: u32 = 0xCAFE_BABE;

/// Oldest supported class file major version (Java 1.1)
pub const MIN_MAJOR_VERSION: u16 = 45;

/// Newest class file major version with a known release (Java 26).
/// Newer class files are still parsed.
pub const MAX_MAJOR_VERSION: u16 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Collect class, field and method references
    pub scan_references: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            scan_references: true,
        }
    }
}

pub(crate) struct RawAttribute<'a> {
    pub name_index: u16,
    pub data: &'a [u8],
}

pub(crate) struct RawMember<'a> {
    pub access: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<RawAttribute<'a>>,
}

/// Class file split into its top-level structures. Names stay as
/// constant pool indices; attribute bodies are undecoded slices.
pub(crate) struct RawClass<'a> {
    pub major: u16,
    pub minor: u16,
    pub pool: ConstantPool,
    pub access: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<RawMember<'a>>,
    pub methods: Vec<RawMember<'a>>,
    pub attributes: Vec<RawAttribute<'a>>,
}

impl<'a> RawClass<'a> {
    pub fn read(data: &'a [u8]) -> Result<Self, ClassFormatError> {
        let mut reader = ByteReader::new(data);

        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(ClassFormatError::BadMagic(magic));
        }

        let minor = reader.u16()?;
        let major = reader.u16()?;
        if major < MIN_MAJOR_VERSION {
            return Err(ClassFormatError::UnsupportedVersion { major, minor });
        }
        if major > MAX_MAJOR_VERSION {
            debug!("Parsing class file version {}.{} newer than {}", major, minor, MAX_MAJOR_VERSION);
        }

        let pool = ConstantPool::parse(&mut reader)?;
        let access = AccessFlags(reader.u16()?);
        let this_class = reader.u16()?;
        let super_class = reader.u16()?;

        let interface_count = reader.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(reader.u16()?);
        }

        let fields = read_members(&mut reader)?;
        let methods = read_members(&mut reader)?;
        let attributes = read_attributes(&mut reader)?;

        Ok(Self {
            major,
            minor,
            pool,
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Body of the first class-level attribute with the given name
    pub fn attribute(&self, name: &str) -> Result<Option<&'a [u8]>, ClassFormatError> {
        for attribute in &self.attributes {
            if self.pool.utf8(attribute.name_index)? == name {
                return Ok(Some(attribute.data));
            }
        }
        Ok(None)
    }
}

fn read_members<'a>(reader: &mut ByteReader<'a>) -> Result<Vec<RawMember<'a>>, ClassFormatError> {
    let count = reader.u16()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access = AccessFlags(reader.u16()?);
        let name_index = reader.u16()?;
        let descriptor_index = reader.u16()?;
        let attributes = read_attributes(reader)?;
        members.push(RawMember {
            access,
            name_index,
            descriptor_index,
            attributes,
        });
    }
    Ok(members)
}

fn read_attributes<'a>(reader: &mut ByteReader<'a>) -> Result<Vec<RawAttribute<'a>>, ClassFormatError> {
    let count = reader.u16()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.u16()?;
        let len = reader.u32()? as usize;
        attributes.push(RawAttribute {
            name_index,
            data: reader.bytes(len)?,
        });
    }
    Ok(attributes)
}

/// Parse a class file into a [`ClassDef`]. The result has no owner and
/// the base release; the ingestor fills both in.
pub fn parse_class(data: &[u8], options: ParseOptions) -> Result<ClassDef, ClassFormatError> {
    let raw = RawClass::read(data)?;
    let pool = &raw.pool;

    let name = external_class_name(pool, raw.this_class)?;
    let super_name = pool
        .optional_class_name(raw.super_class)?
        .map(to_external_name);

    let interfaces = raw
        .interfaces
        .iter()
        .map(|i| external_class_name(pool, *i))
        .collect::<Result<Vec<_>, _>>()?;

    let mut permitted = Vec::new();
    if let Some(data) = raw.attribute("PermittedSubclasses")? {
        let mut reader = ByteReader::new(data);
        let count = reader.u16()?;
        for _ in 0..count {
            permitted.push(external_class_name(pool, reader.u16()?)?);
        }
    }

    let fields = member_defs(pool, &raw.fields)?;
    let methods = member_defs(pool, &raw.methods)?;

    let mut class = ClassDef::new(name, super_name, raw.access)
        .with_interfaces(interfaces)
        .with_permitted_subclasses(permitted)
        .with_fields(fields)
        .with_methods(methods)
        .with_version(raw.major, raw.minor)
        .with_checksum(crate::archive::sha1_hex(data));

    if options.scan_references {
        let references = collect_references(&raw, class.name())?;
        class = class.with_references(references);
    }

    Ok(class)
}

fn member_defs(pool: &ConstantPool, members: &[RawMember<'_>]) -> Result<Vec<MemberDef>, ClassFormatError> {
    members
        .iter()
        .map(|m| {
            Ok(MemberDef::new(
                pool.utf8(m.name_index)?,
                pool.utf8(m.descriptor_index)?,
                m.access,
            ))
        })
        .collect()
}

fn external_class_name(pool: &ConstantPool, index: u16) -> Result<String, ClassFormatError> {
    Ok(to_external_name(pool.class_name(index)?))
}

/// Gather every class, field and method named by the class file, except
/// the class itself.
fn collect_references(raw: &RawClass<'_>, self_name: &str) -> Result<ClassReferences, ClassFormatError> {
    let pool = &raw.pool;
    let mut collector = ReferenceCollector::new(self_name);

    for constant in pool.iter() {
        match constant {
            Constant::Class { name_index } => {
                if let Some(name) = class_constant_name(pool.utf8(*name_index)?)? {
                    collector.add_class(name);
                }
            }
            Constant::MethodType { descriptor_index } => {
                collector.add_descriptor(pool.utf8(*descriptor_index)?)?;
            }
            _ => {}
        }
    }

    for (index, constant) in pool.iter().enumerate() {
        let interface = match constant {
            Constant::FieldRef { .. } => None,
            Constant::MethodRef { .. } => Some(false),
            Constant::InterfaceMethodRef { .. } => Some(true),
            _ => continue,
        };

        let member = pool.member_ref(index as u16)?;
        collector.add_descriptor(member.descriptor)?;

        // members of array types (clone() on arrays) have no class owner
        let owner = match class_constant_name(member.owner)? {
            Some(owner) => owner,
            None => continue,
        };
        if owner == self_name {
            continue;
        }

        match interface {
            None => {
                collector.references.fields.insert(FieldRef {
                    owner,
                    name: member.name.to_string(),
                    descriptor: member.descriptor.to_string(),
                });
            }
            Some(interface) => {
                collector.references.methods.insert(MethodRef {
                    owner,
                    name: member.name.to_string(),
                    descriptor: member.descriptor.to_string(),
                    interface,
                });
            }
        }
    }

    for member in raw.fields.iter().chain(raw.methods.iter()) {
        collector.add_descriptor(pool.utf8(member.descriptor_index)?)?;
        for attribute in &member.attributes {
            collector.add_attribute(pool, attribute)?;
        }
    }

    for attribute in &raw.attributes {
        collector.add_attribute(pool, attribute)?;
    }

    Ok(collector.references)
}

struct ReferenceCollector<'s> {
    self_name: &'s str,
    references: ClassReferences,
}

impl<'s> ReferenceCollector<'s> {
    fn new(self_name: &'s str) -> Self {
        Self {
            self_name,
            references: ClassReferences::default(),
        }
    }

    fn add_class(&mut self, name: String) {
        if name != self.self_name {
            self.references.classes.insert(name);
        }
    }

    fn add_descriptor(&mut self, descriptor: &str) -> Result<(), ClassFormatError> {
        for name in descriptor_class_names(descriptor)? {
            self.add_class(name);
        }
        Ok(())
    }

    fn add_attribute(&mut self, pool: &ConstantPool, attribute: &RawAttribute<'_>) -> Result<(), ClassFormatError> {
        match pool.utf8(attribute.name_index)? {
            "Exceptions" => {
                let mut reader = ByteReader::new(attribute.data);
                let count = reader.u16()?;
                for _ in 0..count {
                    if let Some(name) = class_constant_name(pool.class_name(reader.u16()?)?)? {
                        self.add_class(name);
                    }
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                let mut reader = ByteReader::new(attribute.data);
                let count = reader.u16()?;
                for _ in 0..count {
                    self.read_annotation(pool, &mut reader)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn read_annotation(&mut self, pool: &ConstantPool, reader: &mut ByteReader<'_>) -> Result<(), ClassFormatError> {
        let type_index = reader.u16()?;
        self.add_descriptor(pool.utf8(type_index)?)?;

        let pairs = reader.u16()?;
        for _ in 0..pairs {
            let _name_index = reader.u16()?;
            self.read_element_value(pool, reader)?;
        }
        Ok(())
    }

    fn read_element_value(&mut self, pool: &ConstantPool, reader: &mut ByteReader<'_>) -> Result<(), ClassFormatError> {
        let tag = reader.u8()?;
        match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                reader.u16()?;
            }
            b'e' => {
                let type_index = reader.u16()?;
                self.add_descriptor(pool.utf8(type_index)?)?;
                reader.u16()?;
            }
            b'c' => {
                let class_index = reader.u16()?;
                let descriptor = pool.utf8(class_index)?;
                if descriptor != "V" {
                    self.add_descriptor(descriptor)?;
                }
            }
            b'@' => self.read_annotation(pool, reader)?,
            b'[' => {
                let count = reader.u16()?;
                for _ in 0..count {
                    self.read_element_value(pool, reader)?;
                }
            }
            _ => return Err(ClassFormatError::BadAttribute("annotation")),
        }
        Ok(())
    }
}
