// Split packages: packages with classes in more than one artifact

use super::ClasspathIndex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitPackage {
    pub package: String,
    pub artifacts: Vec<String>,
}

pub fn find_split_packages(index: &ClasspathIndex) -> Vec<SplitPackage> {
    index
        .packages()
        // the unnamed package is not a package
        .filter(|(package, artifacts)| !package.is_empty() && artifacts.len() > 1)
        .map(|(package, artifacts)| SplitPackage {
            package: package.to_string(),
            artifacts: index.names(artifacts),
        })
        .collect()
}
