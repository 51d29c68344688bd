use crate::analysis::{AnalysisReport, ClassVersions, DependencyReport, MemberProblem};
use colored::Colorize;
use std::fmt::Write;

const NONE: &str = "[none]";

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Print sections that have no rows
    show_empty: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_empty: false }
    }

    pub fn with_show_empty(mut self, show: bool) -> Self {
        self.show_empty = show;
        self
    }

    pub fn render(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();

        if let Some(artifacts) = &report.artifacts {
            let rows = artifacts
                .iter()
                .map(|a| {
                    vec![
                        a.artifact.clone(),
                        format_size(a.size),
                        a.coordinates.clone().unwrap_or_else(|| NONE.to_string()),
                        a.classes.to_string(),
                        a.resources.to_string(),
                        a.module.clone().unwrap_or_else(|| NONE.to_string()),
                    ]
                })
                .collect();
            self.section(
                &mut out,
                "Artifacts",
                "Archives on the classpath.",
                &["Artifact", "Size", "Coordinates", "Classes", "Resources", "Module"],
                rows,
            );
        }

        if let Some(versions) = &report.class_versions {
            self.section(
                &mut out,
                "Class Versions",
                "Java class file format information.",
                &["Artifact", "Java version"],
                version_rows(versions),
            );
        }

        if let Some(duplicates) = &report.duplicate_classes {
            let rows = duplicates
                .iter()
                .map(|d| vec![d.class_name.clone(), d.artifacts.join(", "), similarity(d.identical)])
                .collect();
            self.section(
                &mut out,
                "Duplicate Classes",
                "Classes found in multiple artifacts.",
                &["Class name", "Artifacts", "Similarity"],
                rows,
            );
        }

        if let Some(duplicates) = &report.duplicate_resources {
            let rows = duplicates
                .iter()
                .map(|d| vec![d.path.clone(), d.artifacts.join(", "), similarity(d.identical)])
                .collect();
            self.section(
                &mut out,
                "Duplicate Resources",
                "Resources found in multiple artifacts.",
                &["Resource path", "Artifacts", "Similarity"],
                rows,
            );
        }

        if let Some(packages) = &report.split_packages {
            let rows = packages
                .iter()
                .map(|p| vec![p.package.clone(), p.artifacts.join(", ")])
                .collect();
            self.section(
                &mut out,
                "Split Packages",
                "Packages found in multiple artifacts.",
                &["Package", "Artifacts"],
                rows,
            );
        }

        if let Some(dependencies) = &report.jar_dependencies {
            self.dependencies(&mut out, dependencies);
        }

        if let Some(unresolved) = &report.unresolved_classes {
            let rows = unresolved
                .iter()
                .map(|u| vec![u.artifact.clone(), u.classes.join(", ")])
                .collect();
            self.section(
                &mut out,
                "Unresolved Classes",
                "Referenced classes not found on the classpath or in the runtime.",
                &["Artifact", "Classes"],
                rows,
            );
        }

        if let Some(illegal) = &report.illegal_access {
            let rows = illegal
                .iter()
                .map(|i| {
                    vec![
                        i.artifact.clone(),
                        i.class_name.clone(),
                        format!("{} ({})", i.target, i.target_source),
                    ]
                })
                .collect();
            self.section(
                &mut out,
                "Illegal Access",
                "References to classes that are not accessible.",
                &["Artifact", "Class", "Target"],
                rows,
            );
        }

        if let Some(members) = &report.member_issues {
            let rows = members
                .iter()
                .map(|m| {
                    let problem = match (&m.problem, &m.declared_in) {
                        (MemberProblem::Missing, _) => "missing".to_string(),
                        (MemberProblem::Inaccessible, Some(owner)) => format!("not accessible ({})", owner),
                        (MemberProblem::Inaccessible, None) => "not accessible".to_string(),
                    };
                    vec![
                        m.artifact.clone(),
                        m.class_name.clone(),
                        format!("{}.{}", m.owner, m.member),
                        problem,
                    ]
                })
                .collect();
            self.section(
                &mut out,
                "Member References",
                "Field and method references that do not link.",
                &["Artifact", "Class", "Member", "Problem"],
                rows,
            );
        }

        if let Some(shadowed) = &report.shadowed_classes {
            let rows = shadowed
                .iter()
                .map(|s| {
                    vec![
                        s.class_name.clone(),
                        s.artifact.clone(),
                        s.runtime_source.clone(),
                        similarity(s.identical),
                    ]
                })
                .collect();
            self.section(
                &mut out,
                "Shadowed Classes",
                "Classpath classes also defined by the runtime.",
                &["Class name", "Artifact", "Runtime", "Similarity"],
                rows,
            );
        }

        let issues = report.issue_count();
        if issues == 0 {
            let _ = writeln!(out, "{}", "No classpath issues found!".green().bold());
        } else {
            let _ = writeln!(out, "{}", format!("Found {} classpath issues", issues).yellow().bold());
        }

        out
    }

    fn dependencies(&self, out: &mut String, report: &DependencyReport) {
        let rows = report
            .rows
            .iter()
            .map(|r| vec![r.artifact.clone(), join_or_none(&r.uses), join_or_none(&r.used_by)])
            .collect();
        self.section(
            out,
            "Artifact Dependencies",
            "Dependencies between artifacts.",
            &["Artifact", "Uses", "Used by"],
            rows,
        );

        if !report.cycles.is_empty() {
            let _ = writeln!(out, "{}", "Dependency cycles:".red().bold());
            for cycle in &report.cycles {
                let _ = writeln!(out, "  {}", cycle.join(" <-> "));
            }
            let _ = writeln!(out);
        }
    }

    fn section(&self, out: &mut String, title: &str, description: &str, header: &[&str], rows: Vec<Vec<String>>) {
        if rows.is_empty() && !self.show_empty {
            return;
        }

        let _ = writeln!(out, "{}", title.cyan().bold());
        let _ = writeln!(out, "{}", description.dimmed());
        let _ = writeln!(out);

        if rows.is_empty() {
            let _ = writeln!(out, "  {}", NONE.dimmed());
            let _ = writeln!(out);
            return;
        }

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
        let _ = writeln!(out, "  {}", format_row(&header, &widths).bold());
        for row in &rows {
            let _ = writeln!(out, "  {}", format_row(row, &widths));
        }
        let _ = writeln!(out);
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line
}

fn version_rows(versions: &[ClassVersions]) -> Vec<Vec<String>> {
    versions
        .iter()
        .map(|v| {
            let versions = if v.versions.is_empty() {
                "[no class files]".to_string()
            } else {
                v.versions
                    .iter()
                    .map(|c| format!("{} ({})", c.java_version, c.classes))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            vec![v.artifact.clone(), versions]
        })
        .collect()
}

fn similarity(identical: bool) -> String {
    let similarity = if identical { "exact copy" } else { "different content" };
    similarity.to_string()
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        NONE.to_string()
    } else {
        names.join(", ")
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}
