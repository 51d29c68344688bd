// Immutable artifact record and the builder used while ingesting it

use super::{ClassDef, ModuleInfo, ResourceDef};
use crate::artifacts::{parse_file_name, Coordinates};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Release of a module descriptor derived from the manifest; any
/// `module-info.class` overrides it.
pub const AUTOMATIC_MODULE_RELEASE: i32 = -1;

/// One loaded artifact. Never mutated after [`JarFileBuilder::build`].
#[derive(Debug)]
pub struct JarFile {
    file_name: String,
    display_name: String,
    size: u64,
    checksum: String,
    coordinates: Option<Coordinates>,
    artifact_name: String,
    artifact_version: Option<String>,
    classes: Vec<Arc<ClassDef>>,
    class_index: HashMap<String, usize>,
    resources: Vec<Arc<ResourceDef>>,
    releases: BTreeSet<u32>,
    module: ModuleInfo,
    manifest: BTreeMap<String, String>,
}

impl JarFile {
    pub fn builder(file_name: impl Into<String>) -> JarFileBuilder {
        JarFileBuilder::new(file_name)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name, or a disambiguated artifact name when several artifacts
    /// on the classpath share one
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.coordinates.as_ref()
    }

    /// Artifact id from the coordinates, or derived from the file name
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    pub fn artifact_version(&self) -> Option<&str> {
        self.artifact_version.as_deref()
    }

    /// Classes sorted by name
    pub fn classes(&self) -> &[Arc<ClassDef>] {
        &self.classes
    }

    pub fn class_def(&self, name: &str) -> Option<&Arc<ClassDef>> {
        self.class_index.get(name).map(|i| &self.classes[*i])
    }

    /// Resources sorted by path
    pub fn resources(&self) -> &[Arc<ResourceDef>] {
        &self.resources
    }

    /// Multi-release slices present in the archive
    pub fn releases(&self) -> &BTreeSet<u32> {
        &self.releases
    }

    pub fn is_multi_release(&self) -> bool {
        !self.releases.is_empty()
    }

    pub fn module(&self) -> &ModuleInfo {
        &self.module
    }

    pub fn manifest(&self) -> &BTreeMap<String, String> {
        &self.manifest
    }

    /// Packages of all classes, excluding `module-info`
    pub fn packages(&self) -> BTreeSet<&str> {
        self.classes
            .iter()
            .filter(|c| !c.is_module_info())
            .map(|c| c.package_name())
            .collect()
    }
}

/// Accumulates the content of one artifact during ingestion.
///
/// Class and resource entries follow the multi-release overlay rule: an
/// entry replaces a previous one at the same relative path only if it
/// comes from a strictly higher release, so the first entry wins ties.
/// Relative paths are entry paths with any `META-INF/versions/<n>/`
/// prefix removed.
#[derive(Debug, Clone)]
pub struct JarFileBuilder {
    file_name: String,
    display_name: Option<String>,
    size: u64,
    checksum: String,
    coordinates: Option<Coordinates>,
    classes: Vec<ClassDef>,
    /// Class position by relative entry path
    class_index: HashMap<String, usize>,
    resources: Vec<ResourceDef>,
    resource_index: HashMap<String, usize>,
    releases: BTreeSet<u32>,
    module: ModuleInfo,
    module_release: i32,
    manifest: BTreeMap<String, String>,
}

impl JarFileBuilder {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            display_name: None,
            size: 0,
            checksum: String::new(),
            coordinates: None,
            classes: Vec::new(),
            class_index: HashMap::new(),
            resources: Vec::new(),
            resource_index: HashMap::new(),
            releases: BTreeSet::new(),
            module: ModuleInfo::unnamed(),
            module_release: AUTOMATIC_MODULE_RELEASE,
            manifest: BTreeMap::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.coordinates.as_ref()
    }

    /// Artifact name and version, from the coordinates if known
    pub fn artifact(&self) -> (String, Option<String>) {
        match &self.coordinates {
            Some(c) => (
                c.artifact.clone(),
                Some(c.version.clone()).filter(|v| !v.is_empty()),
            ),
            None => parse_file_name(&self.file_name),
        }
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = checksum.into();
        self
    }

    pub fn set_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.coordinates = coordinates;
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = Some(display_name.into());
    }

    pub fn set_manifest(&mut self, manifest: BTreeMap<String, String>) {
        self.manifest = manifest;
    }

    pub fn add_release(&mut self, release: u32) {
        self.releases.insert(release);
    }

    /// Add a class at the path its name maps to (`a/b/C.class`).
    pub fn add_class(&mut self, class: ClassDef) -> bool {
        let path = format!("{}.class", class.name().replace('.', "/"));
        self.add_class_entry(&path, class)
    }

    /// Add a class read from the relative entry `path`, applying the
    /// overlay rule. Returns `true` if the class was taken.
    pub fn add_class_entry(&mut self, path: &str, class: ClassDef) -> bool {
        match self.class_index.get(path) {
            Some(&i) if self.classes[i].release() >= class.release() => false,
            Some(&i) => {
                self.classes[i] = class;
                true
            }
            None => {
                self.class_index.insert(path.to_string(), self.classes.len());
                self.classes.push(class);
                true
            }
        }
    }

    /// Add a resource, applying the overlay rule.
    pub fn add_resource(&mut self, resource: ResourceDef) -> bool {
        match self.resource_index.get(resource.path()) {
            Some(&i) if self.resources[i].release() >= resource.release() => false,
            Some(&i) => {
                self.resources[i] = resource;
                true
            }
            None => {
                self.resource_index
                    .insert(resource.path().to_string(), self.resources.len());
                self.resources.push(resource);
                true
            }
        }
    }

    /// Accept a module descriptor unless one from a higher release was
    /// already accepted.
    pub fn set_module(&mut self, module: ModuleInfo, release: i32) -> bool {
        if release < self.module_release {
            return false;
        }
        self.module = module;
        self.module_release = release;
        true
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Freeze into an immutable [`JarFile`], attaching the back-reference
    /// of every class and resource.
    pub fn build(self) -> Arc<JarFile> {
        let (artifact_name, artifact_version) = self.artifact();
        let display_name = self
            .display_name
            .unwrap_or_else(|| self.file_name.clone());

        let mut classes = self.classes;
        classes.sort_by(|a, b| a.name().cmp(b.name()));
        // two entries may declare the same class; lookups see the first
        let mut class_index = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            class_index.entry(class.name().to_string()).or_insert(i);
        }

        let mut resources = self.resources;
        resources.sort_by(|a, b| a.path().cmp(b.path()));

        Arc::new_cyclic(|owner| JarFile {
            classes: classes
                .into_iter()
                .map(|c| Arc::new(c.with_owner(owner.clone())))
                .collect(),
            class_index,
            resources: resources
                .into_iter()
                .map(|r| Arc::new(r.with_owner(owner.clone())))
                .collect(),
            file_name: self.file_name,
            display_name,
            size: self.size,
            checksum: self.checksum,
            coordinates: self.coordinates,
            artifact_name,
            artifact_version,
            releases: self.releases,
            module: self.module,
            manifest: self.manifest,
        })
    }
}
