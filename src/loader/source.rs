// Input sources for the classpath builder

use crate::archive::{ArchiveLimits, ArchiveReader};
use crate::artifacts::Coordinates;
use crate::error::LoadError;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Archive type, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Library archive (`.jar`)
    Jar,
    /// Web application archive (`.war`), only `WEB-INF/lib/*.jar` are loaded
    War,
    /// Module archive (`.jmod`), only `classes/` is loaded
    Jmod,
}

impl SourceKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "jar" => Some(SourceKind::Jar),
            "war" => Some(SourceKind::War),
            "jmod" => Some(SourceKind::Jmod),
            _ => None,
        }
    }

    pub fn extensions() -> &'static [&'static str] {
        &["jar", "war", "jmod"]
    }
}

#[derive(Clone)]
enum Origin {
    File(PathBuf),
    Bytes { name: String, data: Arc<Vec<u8>> },
}

/// One input of a classpath build: a file on disk or an in-memory archive.
#[derive(Clone)]
pub struct Source {
    origin: Origin,
    coordinates: Option<Coordinates>,
}

impl Source {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::File(path.into()),
            coordinates: None,
        }
    }

    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            origin: Origin::Bytes {
                name: name.into(),
                data: Arc::new(data),
            },
            coordinates: None,
        }
    }

    /// Known coordinates; skips the checksum lookup
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.coordinates.as_ref()
    }

    /// File name used for the resulting artifact
    pub fn name(&self) -> String {
        match &self.origin {
            Origin::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Origin::Bytes { name, .. } => name.clone(),
        }
    }

    /// Key used to detect the same source given twice
    pub fn identity(&self) -> String {
        match &self.origin {
            Origin::File(path) => std::fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .display()
                .to_string(),
            Origin::Bytes { name, .. } => format!("bytes:{}", name),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File(path) => Some(path),
            Origin::Bytes { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<SourceKind> {
        SourceKind::from_name(&self.name())
    }

    pub fn open(&self, limits: ArchiveLimits) -> Result<ArchiveReader, LoadError> {
        match &self.origin {
            Origin::File(path) => {
                let file = File::open(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(ArchiveReader::open(self.name(), BufReader::new(file), limits)?)
            }
            Origin::Bytes { name, data } => {
                Ok(ArchiveReader::open(name.clone(), data.as_slice(), limits)?)
            }
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Origin::File(path) => write!(f, "Source({})", path.display()),
            Origin::Bytes { name, data } => write!(f, "Source({}, {} bytes)", name, data.len()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Bytes { name, .. } => f.write_str(name),
        }
    }
}
