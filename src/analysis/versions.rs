// Class file versions per artifact

use crate::model::Classpath;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of classes compiled for one Java version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCount {
    pub major_version: u16,
    pub java_version: String,
    pub classes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassVersions {
    pub artifact: String,
    /// Highest version first; empty if the artifact has no classes
    pub versions: Vec<VersionCount>,
}

/// Human-readable Java version of a class file major version
pub fn java_version(major_version: u16) -> String {
    match major_version {
        0..=45 => "Java 1.1".to_string(),
        46..=48 => format!("Java 1.{}", major_version - 44),
        _ => format!("Java {}", major_version - 44),
    }
}

/// One row per artifact in classpath order, then a `Classpath` total row.
pub fn count_class_versions(classpath: &Classpath) -> Vec<ClassVersions> {
    let mut total: BTreeMap<u16, usize> = BTreeMap::new();
    let mut rows = Vec::with_capacity(classpath.len() + 1);

    for jar_file in classpath.jar_files() {
        let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
        for class in jar_file.classes() {
            *counts.entry(class.major_version()).or_default() += 1;
            *total.entry(class.major_version()).or_default() += 1;
        }
        rows.push(ClassVersions {
            artifact: jar_file.display_name().to_string(),
            versions: to_rows(counts),
        });
    }

    rows.push(ClassVersions {
        artifact: "Classpath".to_string(),
        versions: to_rows(total),
    });
    rows
}

fn to_rows(counts: BTreeMap<u16, usize>) -> Vec<VersionCount> {
    counts
        .into_iter()
        .rev()
        .map(|(major_version, classes)| VersionCount {
            major_version,
            java_version: java_version(major_version),
            classes,
        })
        .collect()
}
