//! jarlens - Fast classpath auditing for JVM archives
//!
//! This library loads JAR, WAR and JMOD files into a structural model of
//! the classpath and runs cross-artifact analyses over it.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **Archive Reading** - Ceiling-checked ZIP access with whole-archive checksums
//! 2. **Class Parsing** - Binary class and module descriptors into `ClassDef` / `ModuleInfo`
//! 3. **Ingestion** - Multi-release overlay, nested archives, coordinate lookup
//! 4. **Classpath Building** - Parallel loading of many sources, in input order
//! 5. **Resolution** - Classpath and runtime providers chained by strategy
//! 6. **Analysis** - Duplicates, split packages, dependencies, unresolved classes and members
//! 7. **Reporting** - Terminal and JSON output

pub mod analysis;
pub mod archive;
pub mod artifacts;
pub mod classfile;
pub mod config;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;
pub mod report;
pub mod resolve;

#[doc(hidden)]
pub mod test_utils;

pub use analysis::{AnalysisReport, ClasspathAnalyzer};
pub use archive::{ArchiveLimits, ArchiveReader};
pub use artifacts::{ArtifactResolver, Coordinates, NoopResolver, StaticResolver};
pub use config::Config;
pub use discovery::ArchiveFinder;
pub use error::{AccessError, ArchiveError, ClassFormatError, LoadError, LookupError};
pub use loader::{ArtifactIngestor, ClasspathBuilder, IngestOptions, Source};
pub use model::{ClassDef, Classpath, JarFile, ModuleInfo, ResourceDef};
pub use report::{ReportFormat, Reporter};
pub use resolve::{AccessCheck, ClassProvider, ResolutionChain, RuntimeProvider, Strategy};
