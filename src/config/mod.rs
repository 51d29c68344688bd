mod loader;

pub use loader::{AnalysisConfig, ArtifactsConfig, Config, LoaderConfig, ReportConfig, RuntimeConfig};
