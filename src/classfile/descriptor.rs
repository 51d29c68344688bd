//! Field and method type descriptors, and JVM name conventions.

use crate::error::ClassFormatError;
use std::fmt;

/// A decoded field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// One of `B C D F I J S Z`
    Primitive(char),
    /// Class type in external (dotted) form
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Class referenced by this type, looking through arrays.
    /// Primitives (and primitive arrays) reference nothing.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            FieldType::Primitive(_) => None,
            FieldType::Object(name) => Some(name),
            FieldType::Array(element) => element.class_name(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(c) => f.write_str(primitive_name(*c)),
            FieldType::Object(name) => f.write_str(name),
            FieldType::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// A decoded method descriptor. `return_type` is `None` for `void`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    /// All classes named by parameter and return types
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .chain(self.return_type.iter())
            .filter_map(FieldType::class_name)
    }
}

fn primitive_name(c: char) -> &'static str {
    match c {
        'B' => "byte",
        'C' => "char",
        'D' => "double",
        'F' => "float",
        'I' => "int",
        'J' => "long",
        'S' => "short",
        'Z' => "boolean",
        _ => "void",
    }
}

/// Convert an internal name (`java/lang/String`) to its external form.
pub fn to_external_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Package of a dotted class name, or `""` for the default package.
pub fn package_name(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(pos) => &class_name[..pos],
        None => "",
    }
}

/// Simple name of a dotted class name.
pub fn simple_name(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(pos) => &class_name[pos + 1..],
        None => class_name,
    }
}

pub fn parse_field_type(descriptor: &str) -> Result<FieldType, ClassFormatError> {
    let bytes = descriptor.as_bytes();
    let mut pos = 0;
    let field_type = read_field_type(descriptor, bytes, &mut pos)?;
    if pos != bytes.len() {
        return Err(ClassFormatError::Descriptor(descriptor.to_string()));
    }
    Ok(field_type)
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, ClassFormatError> {
    let bytes = descriptor.as_bytes();
    let invalid = || ClassFormatError::Descriptor(descriptor.to_string());

    if bytes.first() != Some(&b'(') {
        return Err(invalid());
    }

    let mut pos = 1;
    let mut parameters = Vec::new();
    loop {
        match bytes.get(pos) {
            Some(b')') => {
                pos += 1;
                break;
            }
            Some(_) => parameters.push(read_field_type(descriptor, bytes, &mut pos)?),
            None => return Err(invalid()),
        }
    }

    let return_type = if bytes.get(pos) == Some(&b'V') {
        pos += 1;
        None
    } else {
        Some(read_field_type(descriptor, bytes, &mut pos)?)
    };

    if pos != bytes.len() {
        return Err(invalid());
    }

    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

/// Class referenced by a `CONSTANT_Class` name, which is either an
/// internal class name or an array descriptor.
pub fn class_constant_name(internal: &str) -> Result<Option<String>, ClassFormatError> {
    if internal.starts_with('[') {
        Ok(parse_field_type(internal)?.class_name().map(str::to_string))
    } else {
        Ok(Some(to_external_name(internal)))
    }
}

/// Classes named by either a field or a method descriptor.
pub fn descriptor_class_names(descriptor: &str) -> Result<Vec<String>, ClassFormatError> {
    if descriptor.starts_with('(') {
        let method = parse_method_descriptor(descriptor)?;
        Ok(method.class_names().map(str::to_string).collect())
    } else {
        let field = parse_field_type(descriptor)?;
        Ok(field.class_name().map(str::to_string).into_iter().collect())
    }
}

fn read_field_type(
    descriptor: &str,
    bytes: &[u8],
    pos: &mut usize,
) -> Result<FieldType, ClassFormatError> {
    let invalid = || ClassFormatError::Descriptor(descriptor.to_string());

    let mut dimensions = 0;
    while bytes.get(*pos) == Some(&b'[') {
        dimensions += 1;
        *pos += 1;
    }

    let base = match bytes.get(*pos) {
        Some(&c) if matches!(c, b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
            *pos += 1;
            FieldType::Primitive(c as char)
        }
        Some(b'L') => {
            let start = *pos + 1;
            let end = descriptor[start..]
                .find(';')
                .map(|offset| start + offset)
                .ok_or_else(invalid)?;
            if end == start {
                return Err(invalid());
            }
            *pos = end + 1;
            FieldType::Object(to_external_name(&descriptor[start..end]))
        }
        _ => return Err(invalid()),
    };

    let mut field_type = base;
    for _ in 0..dimensions {
        field_type = FieldType::Array(Box::new(field_type));
    }
    Ok(field_type)
}
