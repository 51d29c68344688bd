//! Structural model of a classpath: artifacts, classes, resources and
//! module information.

mod access;
mod class_def;
mod classpath;
mod jar_file;
mod module_info;

pub use access::{AccessFlags, Visibility};
pub use class_def::{ClassDef, ClassReferences, FieldRef, MemberDef, MethodRef, ResourceDef, BASE_RELEASE};
pub use classpath::Classpath;
pub use jar_file::{JarFile, JarFileBuilder, AUTOMATIC_MODULE_RELEASE};
pub use module_info::{ModuleInfo, ModuleKind};
