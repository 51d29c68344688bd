// Artifact ingestor
//
// Turns one archive into one or more JarFile records. Per entry:
// - JMOD archives only contribute `classes/`, with that prefix removed
// - in multi-release archives `META-INF/versions/<n>/` is removed and <n>
//   becomes the entry's release (base entries have release 8)
// - entries above the maximum release are dropped
// - remaining `META-INF/` entries are skipped (the manifest was already read)
// - nested `.jar` entries are loaded recursively as `outer!/inner`, up to
//   the nesting depth ceiling and within the quota of the outermost archive
// - `.class` entries are parsed, `module-info.class` also yields the module
// - everything else becomes a resource with a SHA-1 checksum
//
// A decoding error in any entry fails the whole source.

use super::source::{Source, SourceKind};
use crate::archive::{sha1_hex, ArchiveLimits, ArchiveReader};
use crate::artifacts::{select_coordinates, ArtifactResolver, Coordinates, NoopResolver};
use crate::classfile::{parse_class, parse_module, ParseOptions};
use crate::config::Config;
use crate::error::LoadError;
use crate::model::{JarFile, JarFileBuilder, ModuleInfo, ResourceDef, AUTOMATIC_MODULE_RELEASE, BASE_RELEASE};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

const VERSIONS_PREFIX: &str = "META-INF/versions/";
const JMOD_CLASSES_PREFIX: &str = "classes/";
const WAR_LIBRARY_PREFIX: &str = "WEB-INF/lib/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Highest release taken from multi-release archives
    pub max_release: u32,
    pub scan_references: bool,
    pub limits: ArchiveLimits,
}

impl IngestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_release: config.loader.max_release,
            scan_references: config.loader.scan_references,
            limits: config.limits,
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct ArtifactIngestor {
    options: IngestOptions,
    resolver: Arc<dyn ArtifactResolver>,
}

impl ArtifactIngestor {
    pub fn new(options: IngestOptions, resolver: Arc<dyn ArtifactResolver>) -> Self {
        Self { options, resolver }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Load an archive into finished artifacts. The archive type follows
    /// from the extension of `name`; unknown extensions load as JAR.
    pub fn ingest(
        &self,
        name: &str,
        coordinates: Option<&Coordinates>,
        reader: ArchiveReader,
    ) -> Result<Vec<Arc<JarFile>>, LoadError> {
        let kind = SourceKind::from_name(name).unwrap_or(SourceKind::Jar);
        let drafts = self.ingest_drafts(name, coordinates, reader, kind)?;
        Ok(drafts.into_iter().map(JarFileBuilder::build).collect())
    }

    /// Open and load a source, leaving the artifacts unfinished so the
    /// classpath builder can still name them.
    pub fn ingest_source(&self, source: &Source) -> Result<Vec<JarFileBuilder>, LoadError> {
        let name = source.name();
        let kind = source
            .kind()
            .ok_or_else(|| LoadError::UnsupportedSource { name: name.clone() })?;
        let reader = source.open(self.options.limits)?;
        self.ingest_drafts(&name, source.coordinates(), reader, kind)
    }

    pub(crate) fn ingest_drafts(
        &self,
        name: &str,
        coordinates: Option<&Coordinates>,
        reader: ArchiveReader,
        kind: SourceKind,
    ) -> Result<Vec<JarFileBuilder>, LoadError> {
        match kind {
            SourceKind::Jar => self.load_archive(name, coordinates, reader, false),
            SourceKind::Jmod => self.load_archive(name, coordinates, reader, true),
            SourceKind::War => self.load_war(name, reader),
        }
    }

    fn load_archive(
        &self,
        name: &str,
        coordinates: Option<&Coordinates>,
        mut reader: ArchiveReader,
        jmod: bool,
    ) -> Result<Vec<JarFileBuilder>, LoadError> {
        let start = Instant::now();
        let multi_release = reader.is_multi_release();
        let parse_options = ParseOptions {
            scan_references: self.options.scan_references,
        };

        let mut draft = JarFileBuilder::new(name)
            .size(reader.archive_size())
            .checksum(reader.archive_checksum());
        draft.set_manifest(reader.manifest().attributes().clone());
        if let Some(module_name) = reader.automatic_module_name() {
            draft.set_module(ModuleInfo::automatic(module_name), AUTOMATIC_MODULE_RELEASE);
        }

        let mut nested = Vec::new();

        while let Some(entry) = reader.next_entry()? {
            let mut path = entry.name.as_str();
            if jmod {
                match path.strip_prefix(JMOD_CLASSES_PREFIX) {
                    Some(stripped) => path = stripped,
                    None => continue,
                }
            }

            let mut release = BASE_RELEASE;
            if multi_release {
                if let Some((versioned, stripped)) = split_versioned_path(name, path) {
                    draft.add_release(versioned);
                    release = versioned;
                    path = stripped;
                }
            }

            if release > self.options.max_release {
                trace!("{}: skipping {} (release {})", name, entry.name, release);
                continue;
            }

            if path.starts_with("META-INF/") {
                continue;
            }

            if path.ends_with(".jar") {
                let data = reader.entry_bytes(&entry)?;
                let nested_name = format!("{}!/{}", name, path);
                let nested_reader = reader.nested(nested_name.clone(), data)?;
                nested.extend(self.load_archive(&nested_name, None, nested_reader, false)?);
                continue;
            }

            let data = reader.entry_bytes(&entry)?;

            if path.ends_with(".class") {
                let class = parse_class(&data, parse_options)
                    .map_err(|e| LoadError::entry(&entry.name, e))?
                    .with_release(release);

                if class.is_module_info() {
                    let module = parse_module(&data).map_err(|e| LoadError::entry(&entry.name, e))?;
                    draft.set_module(module, release as i32);
                }

                draft.add_class_entry(path, class);
            } else {
                draft.add_resource(ResourceDef::new(path, sha1_hex(&data), release));
            }
        }

        let resolved = self.lookup_coordinates(name, coordinates, reader.archive_checksum());
        draft.set_coordinates(resolved);

        debug!(
            "Loaded {} ({} classes, {} nested) in {:?}",
            name,
            draft.class_count(),
            nested.len(),
            start.elapsed()
        );

        let mut drafts = Vec::with_capacity(nested.len() + 1);
        drafts.push(draft);
        drafts.extend(nested);
        Ok(drafts)
    }

    /// Only `WEB-INF/lib/*.jar` of a web archive is loaded, one artifact
    /// per library, sorted by file name.
    fn load_war(&self, name: &str, mut reader: ArchiveReader) -> Result<Vec<JarFileBuilder>, LoadError> {
        let mut libraries = Vec::new();
        while let Some(entry) = reader.next_entry()? {
            let Some(file_name) = entry.name.strip_prefix(WAR_LIBRARY_PREFIX) else {
                continue;
            };
            if file_name.contains('/') || !file_name.ends_with(".jar") {
                continue;
            }
            let data = reader.entry_bytes(&entry)?;
            let library = reader.nested(file_name, data)?;
            libraries.push((file_name.to_string(), library));
        }

        debug!("{}: {} libraries in {}", name, libraries.len(), WAR_LIBRARY_PREFIX);

        let results: Vec<Result<Vec<JarFileBuilder>, LoadError>> = libraries
            .into_par_iter()
            .map(|(file_name, library)| self.load_archive(&file_name, None, library, false))
            .collect();

        let mut drafts = Vec::new();
        for result in results {
            drafts.extend(result?);
        }
        drafts.sort_by_cached_key(|d| d.file_name().to_lowercase());
        Ok(drafts)
    }

    fn lookup_coordinates(
        &self,
        name: &str,
        explicit: Option<&Coordinates>,
        checksum: &str,
    ) -> Option<Coordinates> {
        if explicit.is_some() {
            return select_coordinates(name, explicit, &[]);
        }

        let file_name = name.rsplit(['/', '!']).next().unwrap_or(name);
        match self.resolver.find_candidates(checksum) {
            Ok(candidates) => select_coordinates(file_name, None, &candidates),
            Err(e) => {
                warn!("Artifact lookup failed for {}: {}", name, e);
                None
            }
        }
    }
}

impl Default for ArtifactIngestor {
    fn default() -> Self {
        Self::new(IngestOptions::default(), Arc::new(NoopResolver))
    }
}

/// Split `META-INF/versions/<n>/<path>` into `<n>` and `<path>`.
/// A non-numeric release is logged and the path is left alone.
fn split_versioned_path<'p>(name: &str, path: &'p str) -> Option<(u32, &'p str)> {
    let rest = path.strip_prefix(VERSIONS_PREFIX)?;
    let (release, stripped) = rest.split_once('/')?;
    match release.parse::<u32>() {
        Ok(release) => Some((release, stripped)),
        Err(_) => {
            warn!("{}: unable to parse release number in {}", name, path);
            None
        }
    }
}
