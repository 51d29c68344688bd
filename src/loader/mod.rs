// Artifact loading: sources, per-archive ingestion and the parallel
// classpath builder

mod display_names;
mod ingestor;
mod parallel_builder;
mod source;

pub use display_names::assign_display_names;
pub use ingestor::{ArtifactIngestor, IngestOptions};
pub use parallel_builder::ClasspathBuilder;
pub use source::{Source, SourceKind};
