// Ordered set of artifacts with a class-name index

use super::{ClassDef, JarFile};
use crate::resolve::{ClassProvider, Strategy};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The assembled classpath. Built once from finished [`JarFile`]s.
#[derive(Debug)]
pub struct Classpath {
    name: String,
    jar_files: Vec<Arc<JarFile>>,
    /// Class name to every definition, in classpath order
    class_index: HashMap<String, Vec<Arc<ClassDef>>>,
    packages: HashSet<String>,
    strategy: Strategy,
}

impl Classpath {
    pub fn new(jar_files: Vec<Arc<JarFile>>, strategy: Strategy) -> Self {
        Self::named("classpath", jar_files, strategy)
    }

    pub fn named(name: impl Into<String>, jar_files: Vec<Arc<JarFile>>, strategy: Strategy) -> Self {
        let mut class_index: HashMap<String, Vec<Arc<ClassDef>>> = HashMap::new();
        let mut packages = HashSet::new();

        for jar_file in &jar_files {
            for class in jar_file.classes() {
                if class.is_module_info() {
                    continue;
                }
                packages.insert(class.package_name().to_string());
                class_index
                    .entry(class.name().to_string())
                    .or_default()
                    .push(class.clone());
            }
        }

        Self {
            name: name.into(),
            jar_files,
            class_index,
            packages,
            strategy,
        }
    }

    pub fn jar_files(&self) -> &[Arc<JarFile>] {
        &self.jar_files
    }

    pub fn jar_file(&self, name: &str) -> Option<&Arc<JarFile>> {
        self.jar_files
            .iter()
            .find(|j| j.display_name() == name || j.file_name() == name)
    }

    /// First definition of a class in classpath order
    pub fn class_def(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.class_index.get(name).and_then(|defs| defs.first().cloned())
    }

    /// All definitions of a class in classpath order
    pub fn class_defs(&self, name: &str) -> &[Arc<ClassDef>] {
        self.class_index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Artifacts defining the class, in classpath order
    pub fn jar_files_for(&self, name: &str) -> Vec<Arc<JarFile>> {
        self.class_defs(name).iter().filter_map(|c| c.owner()).collect()
    }

    pub fn contains_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn class_count(&self) -> usize {
        self.jar_files.iter().map(|j| j.classes().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.jar_files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jar_files.len()
    }
}

impl ClassProvider for Classpath {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_def(&self, name: &str) -> Option<Arc<ClassDef>> {
        Classpath::class_def(self, name)
    }

    fn has_package(&self, package: &str) -> bool {
        self.contains_package(package)
    }
}
