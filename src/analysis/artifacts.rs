// Summary row per artifact

use crate::model::{Classpath, ModuleKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub artifact: String,
    pub file_name: String,
    pub size: u64,
    pub checksum: String,
    pub coordinates: Option<String>,
    pub classes: usize,
    pub resources: usize,
    /// Multi-release slices present in the archive
    pub releases: Vec<u32>,
    pub module: Option<String>,
    pub automatic_module: bool,
}

pub fn summarize_artifacts(classpath: &Classpath) -> Vec<ArtifactSummary> {
    classpath
        .jar_files()
        .iter()
        .map(|jar_file| ArtifactSummary {
            artifact: jar_file.display_name().to_string(),
            file_name: jar_file.file_name().to_string(),
            size: jar_file.size(),
            checksum: jar_file.checksum().to_string(),
            coordinates: jar_file.coordinates().map(|c| c.to_string()),
            classes: jar_file.classes().iter().filter(|c| !c.is_module_info()).count(),
            resources: jar_file.resources().len(),
            releases: jar_file.releases().iter().copied().collect(),
            module: jar_file.module().name().map(str::to_string),
            automatic_module: jar_file.module().kind() == ModuleKind::Automatic,
        })
        .collect()
}
