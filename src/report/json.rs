use crate::analysis::AnalysisReport;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// JSON reporter for programmatic output
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &AnalysisReport) -> Result<String> {
        let document = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            total_issues: report.issue_count(),
            analysis: report,
        };
        let mut json = serde_json::to_string_pretty(&document).into_diagnostic()?;
        json.push('\n');
        Ok(json)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_issues: usize,
    #[serde(flatten)]
    analysis: &'a AnalysisReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SplitPackage;

    #[test]
    fn test_sections_are_flattened() {
        let report = AnalysisReport {
            split_packages: Some(vec![SplitPackage {
                package: "a".to_string(),
                artifacts: vec!["a.jar".to_string(), "b.jar".to_string()],
            }]),
            ..AnalysisReport::default()
        };

        let json = JsonReporter::new().render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_issues"], 1);
        assert_eq!(value["split_packages"][0]["artifacts"][1], "b.jar");
        assert!(value.get("duplicate_classes").is_none());
    }
}
