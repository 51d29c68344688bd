// Classpath classes that are also defined by the runtime
//
// The runtime is the parent link of the resolution chain. Records the
// runtime only assumes from a package prefix are not counted.

use crate::model::Classpath;
use crate::resolve::ResolutionChain;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowedClass {
    pub artifact: String,
    pub class_name: String,
    /// Runtime archive (or provider) defining the class
    pub runtime_source: String,
    /// Both definitions have the same checksum
    pub identical: bool,
}

/// Rows in classpath order, classes sorted by name within an artifact.
pub fn find_shadowed_classes(classpath: &Classpath, chain: &ResolutionChain) -> Vec<ShadowedClass> {
    let Some(runtime) = chain.parent() else {
        return Vec::new();
    };

    let rows: Vec<Vec<ShadowedClass>> = classpath
        .jar_files()
        .par_iter()
        .map(|jar_file| {
            jar_file
                .classes()
                .iter()
                .filter(|c| !c.is_module_info())
                .filter_map(|class| {
                    let resolved = runtime.locate(class.name())?;
                    if resolved.class.has_unknown_ancestry() {
                        return None;
                    }
                    Some(ShadowedClass {
                        artifact: jar_file.display_name().to_string(),
                        class_name: class.name().to_string(),
                        runtime_source: resolved
                            .class
                            .owner()
                            .map(|owner| owner.display_name().to_string())
                            .unwrap_or_else(|| resolved.provider.to_string()),
                        identical: !class.checksum().is_empty() && class.checksum() == resolved.class.checksum(),
                    })
                })
                .collect()
        })
        .collect();

    rows.into_iter().flatten().collect()
}
