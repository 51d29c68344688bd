mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::AnalysisReport;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" | "text" => Ok(ReportFormat::Terminal),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("unknown report format: {}", s)),
        }
    }
}

/// Reporter for the analysis results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_empty: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_empty: false,
        }
    }

    /// Also print sections without rows
    pub fn with_show_empty(mut self, show_empty: bool) -> Self {
        self.show_empty = show_empty;
        self
    }

    pub fn render(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            ReportFormat::Terminal => Ok(TerminalReporter::new()
                .with_show_empty(self.show_empty)
                .render(report)),
            ReportFormat::Json => JsonReporter::new().render(report),
        }
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        let output = self.render(report)?;

        match &self.output_path {
            Some(path) => {
                std::fs::write(path, &output)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
                println!("Report written to: {}", path.display());
            }
            None => print!("{}", output),
        }

        Ok(())
    }
}
