// Referenced classes that no artifact and no runtime provider defines

use super::ClasspathIndex;
use crate::model::Classpath;
use crate::resolve::ResolutionChain;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedClasses {
    pub artifact: String,
    pub classes: Vec<String>,
}

/// One row per artifact with unresolved references, in classpath order.
pub fn find_unresolved_classes(
    classpath: &Classpath,
    index: &ClasspathIndex,
    chain: &ResolutionChain,
) -> Vec<UnresolvedClasses> {
    classpath
        .jar_files()
        .par_iter()
        .map(|jar_file| {
            let mut missing = BTreeSet::new();
            for class in jar_file.classes() {
                let Some(references) = class.references() else {
                    continue;
                };
                for name in &references.classes {
                    if !index.contains_class(name) && chain.resolve(name).is_none() {
                        missing.insert(name.clone());
                    }
                }
            }
            UnresolvedClasses {
                artifact: jar_file.display_name().to_string(),
                classes: missing.into_iter().collect(),
            }
        })
        .filter(|row| !row.classes.is_empty())
        .collect()
}
