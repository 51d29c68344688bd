// Java Platform Module System information of an artifact

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// No descriptor and no `Automatic-Module-Name`
    Unnamed,
    /// Named by the manifest only
    Automatic,
    /// Declared by `module-info.class`
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    name: Option<String>,
    kind: ModuleKind,
    flags: u16,
    version: Option<String>,
    requires: Vec<String>,
    exports: Vec<String>,
    opens: Vec<String>,
    packages: Vec<String>,
    uses: Vec<String>,
    provides: Vec<String>,
}

impl ModuleInfo {
    /// Sentinel for artifacts without any module information
    pub fn unnamed() -> Self {
        Self {
            name: None,
            kind: ModuleKind::Unnamed,
            flags: 0,
            version: None,
            requires: Vec::new(),
            exports: Vec::new(),
            opens: Vec::new(),
            packages: Vec::new(),
            uses: Vec::new(),
            provides: Vec::new(),
        }
    }

    pub fn automatic(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: ModuleKind::Automatic,
            ..Self::unnamed()
        }
    }

    pub fn explicit(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: ModuleKind::Explicit,
            ..Self::unnamed()
        }
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_requires(mut self, requires: Vec<String>) -> Self {
        self.requires = requires;
        self
    }

    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = exports;
        self
    }

    pub fn with_opens(mut self, opens: Vec<String>) -> Self {
        self.opens = opens;
        self
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_uses(mut self, uses: Vec<String>) -> Self {
        self.uses = uses;
        self
    }

    pub fn with_provides(mut self, provides: Vec<String>) -> Self {
        self.provides = provides;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn is_named(&self) -> bool {
        self.kind != ModuleKind::Unnamed
    }

    pub fn is_automatic(&self) -> bool {
        self.kind == ModuleKind::Automatic
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// `ACC_OPEN` module flag
    pub fn is_open(&self) -> bool {
        self.flags & 0x0020 != 0
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    pub fn opens(&self) -> &[String] {
        &self.opens
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn uses(&self) -> &[String] {
        &self.uses
    }

    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    /// Automatic modules export every package
    pub fn exports_package(&self, package: &str) -> bool {
        match self.kind {
            ModuleKind::Unnamed | ModuleKind::Automatic => true,
            ModuleKind::Explicit => self.exports.iter().any(|p| p == package),
        }
    }

    /// Two module records describe the same module if their names match
    pub fn is_same(&self, other: &ModuleInfo) -> bool {
        self.is_named() && self.name == other.name
    }
}

impl Default for ModuleInfo {
    fn default() -> Self {
        Self::unnamed()
    }
}
