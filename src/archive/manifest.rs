//! Minimal reader for the main section of `META-INF/MANIFEST.MF`.

use std::collections::BTreeMap;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Main attributes of a JAR manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    attributes: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse manifest text. Only the main section (up to the first blank
    /// line) is read; continuation lines start with a single space.
    pub fn parse(text: &str) -> Self {
        let mut attributes = BTreeMap::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }

            if let Some(rest) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(rest);
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                attributes.insert(name, value);
            }

            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                current = Some((name.trim().to_string(), value.to_string()));
            }
        }

        if let Some((name, value)) = current {
            attributes.insert(name, value);
        }

        Self { attributes }
    }

    /// Attribute lookup; names are case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    pub fn is_multi_release(&self) -> bool {
        self.get("Multi-Release")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn automatic_module_name(&self) -> Option<&str> {
        self.get("Automatic-Module-Name").filter(|v| !v.is_empty())
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
