// Class and package indices over a finished classpath
//
// Artifacts are identified by their position in the classpath, so two
// artifacts sharing a display name are still told apart. Names are only
// attached when rows are produced.

use crate::model::Classpath;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct ClasspathIndex {
    artifacts: Vec<String>,
    classes: BTreeMap<String, BTreeSet<usize>>,
    packages: BTreeMap<String, BTreeSet<usize>>,
}

impl ClasspathIndex {
    pub fn build(classpath: &Classpath) -> Self {
        let mut index = Self {
            artifacts: Vec::with_capacity(classpath.len()),
            ..Self::default()
        };

        for (position, jar_file) in classpath.jar_files().iter().enumerate() {
            index.artifacts.push(jar_file.display_name().to_string());

            for class in jar_file.classes().iter().filter(|c| !c.is_module_info()) {
                index
                    .classes
                    .entry(class.name().to_string())
                    .or_default()
                    .insert(position);
                index
                    .packages
                    .entry(class.package_name().to_string())
                    .or_default()
                    .insert(position);
            }
        }

        index
    }

    pub fn artifact_name(&self, position: usize) -> &str {
        &self.artifacts[position]
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Positions of the artifacts defining `name`
    pub fn artifacts_for_class(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.classes.get(name)
    }

    pub fn artifacts_for_package(&self, package: &str) -> Option<&BTreeSet<usize>> {
        self.packages.get(package)
    }

    /// Class names with their artifacts, ordered by class name
    pub fn classes(&self) -> impl Iterator<Item = (&str, &BTreeSet<usize>)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &BTreeSet<usize>)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sorted artifact names for a set of positions
    pub fn names<'a>(&self, positions: impl IntoIterator<Item = &'a usize>) -> Vec<String> {
        let mut names: Vec<String> = positions
            .into_iter()
            .map(|&p| self.artifacts[p].clone())
            .collect();
        names.sort();
        names
    }
}
