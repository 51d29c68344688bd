// Display names for artifacts sharing an artifact name
//
// Artifacts are grouped by artifact name. Within a group of two or more:
// - all in the same Maven group: `name [version]`
// - all in different groups: `name [group]`
// - otherwise an artifact alone in its group gets `name [group]` and the
//   rest `name [group, version]`
// Missing group or version parts render as `unknown`.

use crate::model::JarFileBuilder;
use std::collections::HashMap;

const UNKNOWN: &str = "unknown";

pub fn assign_display_names(drafts: &mut [JarFileBuilder]) {
    let parts: Vec<(String, String, String)> = drafts
        .iter()
        .map(|draft| {
            let (name, version) = draft.artifact();
            let group = draft
                .coordinates()
                .map(|c| c.group.clone())
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string());
            (name, group, version.unwrap_or_else(|| UNKNOWN.to_string()))
        })
        .collect();

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, (name, _, _)) in parts.iter().enumerate() {
        by_name.entry(name.as_str()).or_default().push(i);
    }

    for indices in by_name.values().filter(|indices| indices.len() > 1) {
        let mut group_sizes: HashMap<&str, usize> = HashMap::new();
        for &i in indices {
            *group_sizes.entry(parts[i].1.as_str()).or_default() += 1;
        }

        for &i in indices {
            let (name, group, version) = &parts[i];
            let display_name = if group_sizes.len() == 1 {
                format!("{} [{}]", name, version)
            } else if group_sizes.len() == indices.len() || group_sizes[group.as_str()] == 1 {
                format!("{} [{}]", name, group)
            } else {
                format!("{} [{}, {}]", name, group, version)
            };
            drafts[i].set_display_name(display_name);
        }
    }
}
