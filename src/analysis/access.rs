// References to classes the referencing class may not access
//
// Only class-level access is checked here: a package-private class used
// from another package. Member flags are not part of the class model.

use crate::model::Classpath;
use crate::resolve::{AccessCheck, ResolutionChain};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IllegalAccess {
    pub artifact: String,
    pub class_name: String,
    pub target: String,
    /// Artifact (or provider) defining the target
    pub target_source: String,
}

pub fn find_illegal_access(classpath: &Classpath, chain: &ResolutionChain) -> Vec<IllegalAccess> {
    let check = AccessCheck::new(chain);

    let rows: Vec<Vec<IllegalAccess>> = classpath
        .jar_files()
        .par_iter()
        .map(|jar_file| {
            let mut rows = Vec::new();
            for class in jar_file.classes().iter().filter(|c| !c.is_module_info()) {
                let Some(references) = class.references() else {
                    continue;
                };
                for name in &references.classes {
                    let Some(resolved) = chain.locate(name) else {
                        continue;
                    };
                    match check.class_accessible(class, &resolved.class) {
                        Ok(true) => {}
                        Ok(false) => rows.push(IllegalAccess {
                            artifact: jar_file.display_name().to_string(),
                            class_name: class.name().to_string(),
                            target: name.clone(),
                            target_source: resolved
                                .class
                                .owner()
                                .map(|owner| owner.display_name().to_string())
                                .unwrap_or_else(|| resolved.provider.to_string()),
                        }),
                        Err(e) => debug!("Skipping access check from {}: {}", class.name(), e),
                    }
                }
            }
            rows
        })
        .collect();

    rows.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessFlags, ClassDef, ClassReferences, JarFileBuilder};
    use crate::resolve::Strategy;
    use std::sync::Arc;

    #[test]
    fn test_package_private_class_from_other_package() {
        let references = |names: &[&str]| ClassReferences {
            classes: names.iter().map(|s| s.to_string()).collect(),
            ..ClassReferences::default()
        };

        let mut lib = JarFileBuilder::new("lib.jar");
        lib.add_class(ClassDef::new("lib.Internal", None, AccessFlags::PACKAGE));
        lib.add_class(ClassDef::new("lib.Api", None, AccessFlags::PUBLIC).with_references(references(&["lib.Internal"])));

        let mut app = JarFileBuilder::new("app.jar");
        app.add_class(
            ClassDef::new("app.Main", None, AccessFlags::PUBLIC)
                .with_references(references(&["lib.Api", "lib.Internal"])),
        );

        let classpath = Arc::new(Classpath::new(vec![app.build(), lib.build()], Strategy::ParentLast));
        let chain = ResolutionChain::root(classpath.clone());

        assert_eq!(
            find_illegal_access(&classpath, &chain),
            vec![IllegalAccess {
                artifact: "app.jar".to_string(),
                class_name: "app.Main".to_string(),
                target: "lib.Internal".to_string(),
                target_source: "lib.jar".to_string(),
            }]
        );
    }
}
