//! Sequential reader over ZIP-family archives (JAR, WAR, JMOD).
//!
//! The whole source is pulled through a [`HashingReader`] first, so the
//! archive checksum and size describe the raw bytes no matter how many
//! entries are read afterwards. Entry iteration then enforces the
//! ceilings of [`ArchiveLimits`]. Archives opened from an entry of
//! another archive share its quota, so nesting never resets the count.

mod checksum;
mod manifest;

pub use checksum::{sha1_hex, HashingReader};
pub use manifest::{Manifest, MANIFEST_PATH};

use crate::error::ArchiveError;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use zip::ZipArchive;

/// Header written by `jmod` in front of the ZIP data.
const JMOD_MAGIC: [u8; 4] = [b'J', b'M', 0x01, 0x00];

/// Resource ceilings applied to a single archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveLimits {
    /// Maximum number of (non-directory) entries
    pub max_entry_count: u64,

    /// Maximum decoded size of a single entry in bytes
    pub max_entry_size: u64,

    /// Maximum cumulative decoded size of all entries in bytes
    pub max_total_size: u64,

    /// Maximum depth of archives nested in archives (0 = no nesting)
    pub max_nesting_depth: u32,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entry_count: 25_000,
            max_entry_size: 100 * 1024 * 1024,
            max_total_size: 1024 * 1024 * 1024,
            max_nesting_depth: 4,
        }
    }
}

/// Running usage against [`ArchiveLimits`], shared by an archive and
/// all archives nested in it.
#[derive(Debug, Default)]
struct QuotaTracker {
    entries: AtomicU64,
    total_bytes: AtomicU64,
}

impl QuotaTracker {
    fn record_entry(&self, limits: &ArchiveLimits) -> Result<(), ArchiveError> {
        let entries = self.entries.fetch_add(1, Ordering::Relaxed) + 1;
        if entries > limits.max_entry_count {
            return Err(ArchiveError::TooManyEntries {
                max: limits.max_entry_count,
            });
        }
        Ok(())
    }

    fn record_bytes(&self, size: u64, limits: &ArchiveLimits) -> Result<(), ArchiveError> {
        let total = self.total_bytes.fetch_add(size, Ordering::Relaxed).saturating_add(size);
        if total > limits.max_total_size {
            return Err(ArchiveError::TotalSizeExceeded {
                max: limits.max_total_size,
            });
        }
        Ok(())
    }
}

/// One file entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path of the entry inside the archive
    pub name: String,
    /// Uncompressed size as declared by the archive
    pub declared_size: u64,
    index: usize,
}

/// Sequential, ceiling-checked access to the entries of one archive.
pub struct ArchiveReader {
    name: String,
    archive: ZipArchive<Cursor<Vec<u8>>>,
    checksum: String,
    size: u64,
    limits: ArchiveLimits,
    manifest: Manifest,
    position: usize,
    depth: u32,
    quota: Arc<QuotaTracker>,
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("name", &self.name)
            .field("checksum", &self.checksum)
            .field("size", &self.size)
            .field("entries", &self.archive.len())
            .field("depth", &self.depth)
            .finish()
    }
}

impl ArchiveReader {
    /// Open an archive from any byte stream.
    pub fn open<R: Read>(
        name: impl Into<String>,
        reader: R,
        limits: ArchiveLimits,
    ) -> Result<Self, ArchiveError> {
        let mut hashing = HashingReader::new(reader);
        let mut data = Vec::new();
        hashing.read_to_end(&mut data)?;
        let (checksum, size) = hashing.finish();

        Self::from_parts(name.into(), data, checksum, size, limits, 0, Arc::default())
    }

    /// Open an archive that is already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        data: Vec<u8>,
        limits: ArchiveLimits,
    ) -> Result<Self, ArchiveError> {
        let checksum = sha1_hex(&data);
        let size = data.len() as u64;
        Self::from_parts(name.into(), data, checksum, size, limits, 0, Arc::default())
    }

    /// Open an archive read from an entry of this one. The nested reader
    /// is one level deeper and draws on the same quota.
    pub fn nested(&self, name: impl Into<String>, data: Vec<u8>) -> Result<Self, ArchiveError> {
        let name = name.into();
        let depth = self.depth + 1;
        if depth > self.limits.max_nesting_depth {
            return Err(ArchiveError::NestingTooDeep {
                entry: name,
                max: self.limits.max_nesting_depth,
            });
        }

        let checksum = sha1_hex(&data);
        let size = data.len() as u64;
        Self::from_parts(name, data, checksum, size, self.limits, depth, self.quota.clone())
    }

    fn from_parts(
        name: String,
        mut data: Vec<u8>,
        checksum: String,
        size: u64,
        limits: ArchiveLimits,
        depth: u32,
        quota: Arc<QuotaTracker>,
    ) -> Result<Self, ArchiveError> {
        if data.starts_with(&JMOD_MAGIC) {
            trace!("{}: skipping JMOD header", name);
            data.drain(..JMOD_MAGIC.len());
        }

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let manifest = read_manifest(&mut archive, &limits)?;

        debug!(
            "Opened {} ({} bytes, {} entries, depth {}, sha1 {})",
            name,
            size,
            archive.len(),
            depth,
            checksum
        );

        Ok(Self {
            name,
            archive,
            checksum,
            size,
            limits,
            manifest,
            position: 0,
            depth,
            quota,
        })
    }

    /// Next file entry, skipping directories. `None` at the end of the archive.
    pub fn next_entry(&mut self) -> Result<Option<Entry>, ArchiveError> {
        while self.position < self.archive.len() {
            let index = self.position;
            self.position += 1;

            let file = self.archive.by_index_raw(index)?;
            if file.is_dir() {
                continue;
            }
            let entry = Entry {
                name: file.name().to_string(),
                declared_size: file.size(),
                index,
            };
            drop(file);

            self.quota.record_entry(&self.limits)?;
            return Ok(Some(entry));
        }
        Ok(None)
    }

    /// Decoded content of an entry returned by [`ArchiveReader::next_entry`].
    pub fn entry_bytes(&mut self, entry: &Entry) -> Result<Vec<u8>, ArchiveError> {
        let max = self.limits.max_entry_size;
        if entry.declared_size > max {
            return Err(ArchiveError::EntryTooLarge {
                entry: entry.name.clone(),
                max,
            });
        }

        let data = {
            let file = self.archive.by_index(entry.index)?;
            let mut data = Vec::with_capacity(entry.declared_size as usize);
            // read one byte past the limit so a lying header is still caught
            file.take(max + 1).read_to_end(&mut data)?;
            data
        };

        if data.len() as u64 > max {
            return Err(ArchiveError::EntryTooLarge {
                entry: entry.name.clone(),
                max,
            });
        }

        self.quota.record_bytes(data.len() as u64, &self.limits)?;
        Ok(data)
    }

    /// Hex SHA-1 of the raw archive bytes
    pub fn archive_checksum(&self) -> &str {
        &self.checksum
    }

    /// Size of the raw archive in bytes
    pub fn archive_size(&self) -> u64 {
        self.size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn is_multi_release(&self) -> bool {
        self.manifest.is_multi_release()
    }

    pub fn automatic_module_name(&self) -> Option<&str> {
        self.manifest.automatic_module_name()
    }

    pub fn limits(&self) -> &ArchiveLimits {
        &self.limits
    }

    /// Number of archives this one is nested in
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// The manifest is looked up directly so its attributes are known before
/// the first entry is read.
fn read_manifest(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    limits: &ArchiveLimits,
) -> Result<Manifest, ArchiveError> {
    let file = match archive.by_name(MANIFEST_PATH) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(Manifest::default()),
        Err(e) => return Err(e.into()),
    };

    if file.size() > limits.max_entry_size {
        return Err(ArchiveError::EntryTooLarge {
            entry: MANIFEST_PATH.to_string(),
            max: limits.max_entry_size,
        });
    }

    let mut data = Vec::new();
    file.take(limits.max_entry_size).read_to_end(&mut data)?;
    Ok(Manifest::parse(&String::from_utf8_lossy(&data)))
}
