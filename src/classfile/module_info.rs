// Module descriptor (module-info.class) parser

use super::descriptor::to_external_name;
use super::parser::RawClass;
use super::reader::ByteReader;
use crate::error::ClassFormatError;
use crate::model::ModuleInfo;

/// Binary name of the module descriptor class
pub const MODULE_INFO: &str = "module-info";

/// Decode the `Module` (and `ModulePackages`) attributes of a module
/// descriptor. Package names are returned in dotted form.
pub fn parse_module(data: &[u8]) -> Result<ModuleInfo, ClassFormatError> {
    let raw = RawClass::read(data)?;
    if !raw.access.is_module() {
        return Err(ClassFormatError::NotAModule);
    }

    let pool = &raw.pool;
    let module = raw.attribute("Module")?.ok_or(ClassFormatError::NotAModule)?;
    let mut reader = ByteReader::new(module);

    let name = pool.module_name(reader.u16()?)?.to_string();
    let flags = reader.u16()?;
    let version = optional_utf8(pool, reader.u16()?)?;

    let mut requires = Vec::new();
    for _ in 0..reader.u16()? {
        requires.push(pool.module_name(reader.u16()?)?.to_string());
        let _flags = reader.u16()?;
        let _version = reader.u16()?;
    }

    let exports = read_package_directives(pool, &mut reader)?;
    let opens = read_package_directives(pool, &mut reader)?;

    let mut uses = Vec::new();
    for _ in 0..reader.u16()? {
        uses.push(to_external_name(pool.class_name(reader.u16()?)?));
    }

    let mut provides = Vec::new();
    for _ in 0..reader.u16()? {
        provides.push(to_external_name(pool.class_name(reader.u16()?)?));
        let implementations = reader.u16()?;
        reader.skip(implementations as usize * 2)?;
    }

    let mut packages = Vec::new();
    if let Some(data) = raw.attribute("ModulePackages")? {
        let mut reader = ByteReader::new(data);
        for _ in 0..reader.u16()? {
            packages.push(to_external_name(pool.package_name(reader.u16()?)?));
        }
    }

    Ok(ModuleInfo::explicit(name)
        .with_flags(flags)
        .with_version(version)
        .with_requires(requires)
        .with_exports(exports)
        .with_opens(opens)
        .with_uses(uses)
        .with_provides(provides)
        .with_packages(packages))
}

/// `exports` and `opens` share a layout: package, flags, target modules
fn read_package_directives(
    pool: &super::ConstantPool,
    reader: &mut ByteReader<'_>,
) -> Result<Vec<String>, ClassFormatError> {
    let count = reader.u16()?;
    let mut packages = Vec::with_capacity(count as usize);
    for _ in 0..count {
        packages.push(to_external_name(pool.package_name(reader.u16()?)?));
        let _flags = reader.u16()?;
        let targets = reader.u16()?;
        reader.skip(targets as usize * 2)?;
    }
    Ok(packages)
}

fn optional_utf8(pool: &super::ConstantPool, index: u16) -> Result<Option<String>, ClassFormatError> {
    if index == 0 {
        Ok(None)
    } else {
        Ok(Some(pool.utf8(index)?.to_string()))
    }
}
