// Bootstrap class provider
//
// When JMOD/JAR files of the runtime are loaded, the loaded classes are
// authoritative and the package prefixes are not consulted. Without a
// runtime image the provider answers from package prefixes and explicitly
// listed class names, synthesizing a public class record for every hit.
// Synthesized records have unknown ancestry: no super class, no
// interfaces and no members.

use super::ClassProvider;
use crate::classfile::package_name;
use crate::config::RuntimeConfig;
use crate::model::{AccessFlags, ClassDef, Classpath};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_RUNTIME_PACKAGES: &[&str] = &["java.", "javax.", "jdk.", "sun.", "com.sun."];

pub struct RuntimeProvider {
    packages: Vec<String>,
    classes: HashSet<String>,
    library: Option<Classpath>,
    synthesized: DashMap<String, Arc<ClassDef>>,
    warned: AtomicBool,
}

impl RuntimeProvider {
    pub fn new(packages: Vec<String>, classes: Vec<String>) -> Self {
        Self {
            packages,
            classes: classes.into_iter().collect(),
            library: None,
            synthesized: DashMap::new(),
            warned: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.packages.clone(), config.classes.clone())
    }

    /// Use classes loaded from the runtime image instead of prefixes
    pub fn with_library(mut self, library: Classpath) -> Self {
        self.library = Some(library);
        self
    }

    pub fn library(&self) -> Option<&Classpath> {
        self.library.as_ref()
    }

    fn is_known(&self, name: &str) -> bool {
        if self.classes.contains(name) {
            return true;
        }
        if self.library.is_some() || !self.packages.iter().any(|p| name.starts_with(p.as_str())) {
            return false;
        }

        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!(
                "No runtime image loaded: classes under {} are assumed to exist and their hierarchy is unknown",
                self.packages.join(", ")
            );
        }
        true
    }

    fn synthesize(&self, name: &str) -> Arc<ClassDef> {
        self.synthesized
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(ClassDef::new(name, None, AccessFlags::PUBLIC).with_unknown_ancestry()))
            .clone()
    }
}

impl Default for RuntimeProvider {
    fn default() -> Self {
        Self::new(
            DEFAULT_RUNTIME_PACKAGES.iter().map(|p| p.to_string()).collect(),
            Vec::new(),
        )
    }
}

impl std::fmt::Debug for RuntimeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeProvider")
            .field("packages", &self.packages)
            .field("classes", &self.classes.len())
            .field("library", &self.library.as_ref().map(|l| l.len()))
            .finish()
    }
}

impl ClassProvider for RuntimeProvider {
    fn name(&self) -> &str {
        "runtime"
    }

    fn class_def(&self, name: &str) -> Option<Arc<ClassDef>> {
        if let Some(class) = self.library.as_ref().and_then(|l| l.class_def(name)) {
            return Some(class);
        }
        self.is_known(name).then(|| self.synthesize(name))
    }

    fn has_package(&self, package: &str) -> bool {
        if let Some(library) = &self.library {
            if library.contains_package(package) {
                return true;
            }
        }

        let dotted = format!("{}.", package);
        self.classes.iter().any(|c| package_name(c) == package)
            || (self.library.is_none() && self.packages.iter().any(|p| dotted.starts_with(p.as_str())))
    }
}
