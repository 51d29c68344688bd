//! Maven coordinates and the artifact lookup collaborator.
//!
//! Looking up coordinates by checksum (Maven Central search, a local
//! repository index, ...) is delegated to an [`ArtifactResolver`]. The
//! crate ships an in-memory resolver fed from the configuration.

use crate::config::ArtifactsConfig;
use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `group:artifact:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinates {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Location of the JAR in a Maven repository layout
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group.split('.').collect();
        path.push(&self.artifact);
        path.push(&self.version);
        path.push(format!("{}-{}.jar", self.artifact, self.version));
        path
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for Coordinates {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Coordinates::new(*group, *artifact, *version))
            }
            _ => Err(format!("invalid coordinates (expected group:artifact:version): {}", s)),
        }
    }
}

/// One lookup hit: the coordinates plus the file name recorded for them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub coordinates: Coordinates,
    pub file_name: Option<String>,
}

impl Candidate {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Resolves artifact checksums to coordinates and fetches artifacts.
pub trait ArtifactResolver: Send + Sync {
    /// Candidate coordinates for a hex SHA-1 archive checksum
    fn find_candidates(&self, checksum: &str) -> Result<Vec<Candidate>, LookupError>;

    /// Download the artifact identified by `coordinates`
    fn download(&self, coordinates: &Coordinates) -> Result<Vec<u8>, LookupError>;
}

/// Resolver that never knows anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResolver;

impl ArtifactResolver for NoopResolver {
    fn find_candidates(&self, _checksum: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(Vec::new())
    }

    fn download(&self, coordinates: &Coordinates) -> Result<Vec<u8>, LookupError> {
        Err(LookupError::NotFound(coordinates.to_string()))
    }
}

/// In-memory resolver keyed by checksum, optionally backed by a local
/// Maven repository for downloads
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    candidates: HashMap<String, Vec<Candidate>>,
    artifacts: HashMap<Coordinates, Vec<u8>>,
    repository: Option<PathBuf>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver for the coordinates and repository listed in the config.
    /// Each entry gets the conventional `artifact-version.jar` file name.
    pub fn from_config(config: &ArtifactsConfig) -> Result<Self, String> {
        let mut resolver = Self::new();
        for (checksum, coordinates) in &config.coordinates {
            let coordinates: Coordinates = coordinates.parse()?;
            let file_name = format!("{}-{}.jar", coordinates.artifact, coordinates.version);
            resolver.add_candidate(checksum.as_str(), Candidate::new(coordinates).with_file_name(file_name));
        }
        if let Some(root) = &config.repository {
            resolver = resolver.with_repository(root);
        }
        Ok(resolver)
    }

    pub fn with_repository(mut self, root: impl AsRef<Path>) -> Self {
        self.repository = Some(root.as_ref().to_path_buf());
        self
    }

    pub fn add_candidate(&mut self, checksum: impl Into<String>, candidate: Candidate) {
        self.candidates
            .entry(checksum.into().to_ascii_lowercase())
            .or_default()
            .push(candidate);
    }

    pub fn add_artifact(&mut self, coordinates: Coordinates, data: Vec<u8>) {
        self.artifacts.insert(coordinates, data);
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.artifacts.is_empty()
    }
}

impl ArtifactResolver for StaticResolver {
    fn find_candidates(&self, checksum: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(self
            .candidates
            .get(&checksum.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    fn download(&self, coordinates: &Coordinates) -> Result<Vec<u8>, LookupError> {
        if let Some(data) = self.artifacts.get(coordinates) {
            return Ok(data.clone());
        }

        let root = self
            .repository
            .as_ref()
            .ok_or_else(|| LookupError::NotFound(coordinates.to_string()))?;
        let path = root.join(coordinates.repository_path());
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LookupError::NotFound(coordinates.to_string()))
            }
            Err(e) => Err(LookupError::Failed(format!("{}: {}", path.display(), e))),
        }
    }
}

/// Split a JAR file name into artifact name and version, e.g.
/// `commons-io-2.11.0.jar` into `commons-io` and `2.11.0`. The version is
/// the first `-<number>(.<number>)*` group, optionally followed by
/// `-SNAPSHOT`.
pub fn parse_file_name(file_name: &str) -> (String, Option<String>) {
    let file_name = file_name.rsplit('/').next().unwrap_or(file_name);
    let stem = file_name
        .strip_suffix(".jar")
        .or_else(|| file_name.strip_suffix(".jmod"))
        .unwrap_or(file_name);

    let bytes = stem.as_bytes();
    for (start, _) in stem.match_indices('-') {
        let mut end = start + 1;
        let mut groups = 0;
        loop {
            let digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 {
                break;
            }
            end += digits;
            groups += 1;
            // up to ten ".<number>" groups after the first
            if groups > 10 || bytes.get(end) != Some(&b'.') || !bytes.get(end + 1).map_or(false, u8::is_ascii_digit) {
                break;
            }
            end += 1;
        }
        if groups == 0 {
            continue;
        }
        if stem[end..].starts_with("-SNAPSHOT") {
            end += "-SNAPSHOT".len();
        }

        let version = stem[start + 1..end].to_string();
        let name = format!("{}{}", &stem[..start], &stem[end..]);
        return (name, Some(version));
    }

    (stem.to_string(), None)
}

/// Pick the coordinates for an artifact: explicit coordinates win, then a
/// candidate whose recorded file name matches, then the first candidate.
pub fn select_coordinates(
    file_name: &str,
    explicit: Option<&Coordinates>,
    candidates: &[Candidate],
) -> Option<Coordinates> {
    if let Some(coordinates) = explicit {
        return Some(coordinates.clone());
    }

    candidates
        .iter()
        .find(|c| c.file_name.as_deref() == Some(file_name))
        .or_else(|| candidates.first())
        .map(|c| c.coordinates.clone())
}
