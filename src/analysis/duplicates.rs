// Duplicate classes and resources
//
// A class or resource is a duplicate when more than one artifact on the
// classpath contains it. Rows are ordered by class name / resource path
// and list the artifacts sorted by name.

use super::ClasspathIndex;
use crate::model::Classpath;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateClass {
    pub class_name: String,
    pub artifacts: Vec<String>,
    /// All copies have the same checksum
    pub identical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateResource {
    pub path: String,
    pub artifacts: Vec<String>,
    pub identical: bool,
}

pub fn find_duplicate_classes(classpath: &Classpath, index: &ClasspathIndex) -> Vec<DuplicateClass> {
    index
        .classes()
        .filter(|(_, artifacts)| artifacts.len() > 1)
        .map(|(class_name, artifacts)| {
            let checksums: BTreeSet<&str> = classpath
                .class_defs(class_name)
                .iter()
                .map(|c| c.checksum())
                .collect();

            DuplicateClass {
                class_name: class_name.to_string(),
                artifacts: index.names(artifacts),
                identical: checksums.len() == 1,
            }
        })
        .collect()
}

pub fn find_duplicate_resources(classpath: &Classpath, index: &ClasspathIndex) -> Vec<DuplicateResource> {
    let mut by_path: BTreeMap<&str, (BTreeSet<usize>, BTreeSet<&str>)> = BTreeMap::new();

    for (position, jar_file) in classpath.jar_files().iter().enumerate() {
        for resource in jar_file.resources() {
            let (artifacts, checksums) = by_path.entry(resource.path()).or_default();
            artifacts.insert(position);
            checksums.insert(resource.checksum());
        }
    }

    by_path
        .into_iter()
        .filter(|(_, (artifacts, _))| artifacts.len() > 1)
        .map(|(path, (artifacts, checksums))| DuplicateResource {
            path: path.to_string(),
            artifacts: index.names(&artifacts),
            identical: checksums.len() == 1,
        })
        .collect()
}
