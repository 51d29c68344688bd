//! Error types for archive decoding, class-file parsing and artifact loading.
//!
//! Errors raised while loading one source never escape the classpath
//! builder: they are logged and the source is dropped. The enums stay
//! distinguishable so callers (and tests) can tell a resource-ceiling
//! violation from a malformed class file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`crate::archive::ArchiveReader`].
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("maximum number of entries exceeded: {max}")]
    TooManyEntries { max: u64 },

    #[error("maximum entry size exceeded: {entry} ({max} bytes)")]
    EntryTooLarge { entry: String, max: u64 },

    #[error("maximum total size exceeded: {max} bytes")]
    TotalSizeExceeded { max: u64 },

    #[error("maximum archive nesting depth exceeded: {entry} (depth {max})")]
    NestingTooDeep { entry: String, max: u32 },
}

impl ArchiveError {
    /// Returns `true` if a resource ceiling was hit (as opposed to a
    /// malformed or unreadable archive).
    pub fn is_ceiling(&self) -> bool {
        matches!(
            self,
            ArchiveError::TooManyEntries { .. }
                | ArchiveError::EntryTooLarge { .. }
                | ArchiveError::TotalSizeExceeded { .. }
                | ArchiveError::NestingTooDeep { .. }
        )
    }
}

/// Errors raised while decoding a binary class or module descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFormatError {
    #[error("not a class file (magic {0:#010x})")]
    BadMagic(u32),

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("unexpected end of class file at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("invalid constant pool reference #{index}")]
    BadConstant { index: u16 },

    #[error("invalid type descriptor: {0}")]
    Descriptor(String),

    #[error("malformed {0} attribute")]
    BadAttribute(&'static str),

    #[error("class file does not contain a module descriptor")]
    NotAModule,
}

/// Errors raised while loading one source into JAR file records.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("unable to parse entry: {entry}")]
    Entry {
        entry: String,
        #[source]
        source: ClassFormatError,
    },

    #[error("unsupported file extension: {name}")]
    UnsupportedSource { name: String },
}

impl LoadError {
    /// Wrap a decoding error with the path of the offending entry.
    pub fn entry(entry: impl Into<String>, source: ClassFormatError) -> Self {
        LoadError::Entry {
            entry: entry.into(),
            source,
        }
    }
}

/// Recoverable failure of the artifact coordinate collaborator.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("artifact lookup failed: {0}")]
    Failed(String),

    #[error("artifact lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("artifact not found: {0}")]
    NotFound(String),
}

/// Caller errors of the access check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("class {0} has illegal class-level access flags (protected or private)")]
    IllegalClassAccessFlags(String),
}
