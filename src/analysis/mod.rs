//! Cross-artifact analyses over a finished [`Classpath`].
//!
//! The class and package indices are built once per classpath by
//! [`ClasspathAnalyzer::new`]; every query afterwards is read-only. Query
//! results are plain rows (artifact, class or package names plus sorted
//! artifact lists) that the report writers render.

mod access;
mod artifacts;
mod dependencies;
mod duplicates;
mod index;
mod members;
mod packages;
mod shadowed;
mod unresolved;
mod versions;

pub use access::{find_illegal_access, IllegalAccess};
pub use artifacts::{summarize_artifacts, ArtifactSummary};
pub use dependencies::{DependencyGraph, DependencyReport, JarDependency};
pub use duplicates::{find_duplicate_classes, find_duplicate_resources, DuplicateClass, DuplicateResource};
pub use index::ClasspathIndex;
pub use members::{find_member_issues, MemberIssue, MemberProblem};
pub use packages::{find_split_packages, SplitPackage};
pub use shadowed::{find_shadowed_classes, ShadowedClass};
pub use unresolved::{find_unresolved_classes, UnresolvedClasses};
pub use versions::{count_class_versions, java_version, ClassVersions, VersionCount};

use crate::config::AnalysisConfig;
use crate::model::Classpath;
use crate::resolve::ResolutionChain;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Results of all enabled analyzers. Disabled analyzers stay `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<ArtifactSummary>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_versions: Option<Vec<ClassVersions>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_classes: Option<Vec<DuplicateClass>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_resources: Option<Vec<DuplicateResource>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_packages: Option<Vec<SplitPackage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jar_dependencies: Option<DependencyReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved_classes: Option<Vec<UnresolvedClasses>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub illegal_access: Option<Vec<IllegalAccess>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_issues: Option<Vec<MemberIssue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadowed_classes: Option<Vec<ShadowedClass>>,
}

impl AnalysisReport {
    /// Number of findings that indicate a classpath problem
    pub fn issue_count(&self) -> usize {
        self.duplicate_classes.as_ref().map_or(0, Vec::len)
            + self.split_packages.as_ref().map_or(0, Vec::len)
            + self
                .unresolved_classes
                .as_ref()
                .map_or(0, |r| r.iter().map(|u| u.classes.len()).sum())
            + self.illegal_access.as_ref().map_or(0, Vec::len)
            + self.member_issues.as_ref().map_or(0, Vec::len)
            + self.shadowed_classes.as_ref().map_or(0, Vec::len)
            + self.jar_dependencies.as_ref().map_or(0, |d| d.cycles.len())
    }

    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }
}

pub struct ClasspathAnalyzer<'a> {
    classpath: &'a Classpath,
    chain: &'a ResolutionChain,
    index: ClasspathIndex,
}

impl<'a> ClasspathAnalyzer<'a> {
    /// `chain` answers lookups for classes outside the classpath,
    /// normally the classpath itself in front of the runtime provider.
    pub fn new(classpath: &'a Classpath, chain: &'a ResolutionChain) -> Self {
        let index = ClasspathIndex::build(classpath);
        debug!("Indexed {} artifacts", index.artifact_count());
        Self {
            classpath,
            chain,
            index,
        }
    }

    pub fn index(&self) -> &ClasspathIndex {
        &self.index
    }

    pub fn artifacts(&self) -> Vec<ArtifactSummary> {
        summarize_artifacts(self.classpath)
    }

    pub fn class_versions(&self) -> Vec<ClassVersions> {
        count_class_versions(self.classpath)
    }

    pub fn duplicate_classes(&self) -> Vec<DuplicateClass> {
        find_duplicate_classes(self.classpath, &self.index)
    }

    pub fn duplicate_resources(&self) -> Vec<DuplicateResource> {
        find_duplicate_resources(self.classpath, &self.index)
    }

    pub fn split_packages(&self) -> Vec<SplitPackage> {
        find_split_packages(&self.index)
    }

    pub fn jar_dependencies(&self) -> DependencyReport {
        DependencyGraph::build(self.classpath, &self.index).report(&self.index)
    }

    pub fn unresolved_classes(&self) -> Vec<UnresolvedClasses> {
        find_unresolved_classes(self.classpath, &self.index, self.chain)
    }

    pub fn illegal_access(&self) -> Vec<IllegalAccess> {
        find_illegal_access(self.classpath, self.chain)
    }

    pub fn member_issues(&self) -> Vec<MemberIssue> {
        find_member_issues(self.classpath, self.chain)
    }

    pub fn shadowed_classes(&self) -> Vec<ShadowedClass> {
        find_shadowed_classes(self.classpath, self.chain)
    }

    /// Run every analyzer enabled in `config`
    pub fn run(&self, config: &AnalysisConfig) -> AnalysisReport {
        let start = Instant::now();

        let report = AnalysisReport {
            artifacts: config.artifacts.then(|| self.artifacts()),
            class_versions: config.class_versions.then(|| self.class_versions()),
            duplicate_classes: config.duplicate_classes.then(|| self.duplicate_classes()),
            duplicate_resources: config.duplicate_resources.then(|| self.duplicate_resources()),
            split_packages: config.split_packages.then(|| self.split_packages()),
            jar_dependencies: config.jar_dependencies.then(|| self.jar_dependencies()),
            unresolved_classes: config.unresolved_classes.then(|| self.unresolved_classes()),
            illegal_access: config.illegal_access.then(|| self.illegal_access()),
            member_issues: config.member_references.then(|| self.member_issues()),
            shadowed_classes: config.shadowed_classes.then(|| self.shadowed_classes()),
        };

        info!(
            "Analysis finished in {:?}: {} issues",
            start.elapsed(),
            report.issue_count()
        );

        report
    }
}
