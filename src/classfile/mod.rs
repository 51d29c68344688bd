//! Binary class file decoding.
//!
//! Only the structure is decoded: names, ancestry, version, member
//! descriptors and the attributes that carry type references. Bytecode
//! is never interpreted.

mod constant_pool;
mod descriptor;
mod module_info;
mod parser;
mod reader;

pub use constant_pool::{decode_modified_utf8, Constant, ConstantPool, MemberRef};
pub use descriptor::{
    class_constant_name, descriptor_class_names, package_name, parse_field_type,
    parse_method_descriptor, simple_name, to_external_name, FieldType, MethodDescriptor,
};
pub use module_info::{parse_module, MODULE_INFO};
pub use parser::{parse_class, ParseOptions, MAGIC, MAX_MAJOR_VERSION, MIN_MAJOR_VERSION};
