// Archive discovery for command-line inputs

use crate::config::Config;
use crate::loader::{Source, SourceKind};
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Finds archive files among the configured inputs.
///
/// Files are taken as given, in the given order. Directories are walked
/// (respecting `.gitignore` and friends), and the archives found in one
/// directory are sorted by path so the classpath order is stable.
pub struct ArchiveFinder<'a> {
    config: &'a Config,
}

impl<'a> ArchiveFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn find_sources(&self, inputs: &[PathBuf]) -> Vec<Source> {
        let mut sources = Vec::new();

        for input in inputs {
            if input.is_dir() {
                let found = self.scan_directory(input);
                debug!("Found {} archives in {}", found.len(), input.display());
                sources.extend(found.into_iter().map(Source::file));
            } else if input.is_file() {
                sources.push(Source::file(input.clone()));
            } else {
                warn!("Input does not exist: {}", input.display());
            }
        }

        sources
    }

    /// Runtime image inputs: the configured archives, else the `jmods`
    /// directory of `$JAVA_HOME` when discovery is on.
    pub fn runtime_inputs(&self) -> Vec<PathBuf> {
        let runtime = &self.config.runtime;
        if !runtime.archives.is_empty() || !runtime.discover {
            return runtime.archives.clone();
        }

        match java_home_jmods(std::env::var_os("JAVA_HOME").as_deref()) {
            Some(jmods) => {
                debug!("Using runtime image {}", jmods.display());
                vec![jmods]
            }
            None => {
                debug!("No runtime image found in JAVA_HOME");
                Vec::new()
            }
        }
    }

    /// Archives of a runtime image: JMOD or JAR files, or directories
    /// holding them directly (like `$JAVA_HOME/jmods`).
    pub fn find_runtime_sources(&self, inputs: &[PathBuf]) -> Vec<Source> {
        let mut sources = Vec::new();

        for input in inputs {
            if !input.is_dir() {
                sources.push(Source::file(input.clone()));
                continue;
            }

            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(input)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| is_archive(path))
                .collect();
            found.sort();
            sources.extend(found.into_iter().map(Source::file));
        }

        sources
    }

    fn scan_directory(&self, dir: &Path) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(dir)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .ignore(true)
            .parents(true)
            .follow_links(false)
            .build();

        let mut found: Vec<PathBuf> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();

                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                is_archive(path).then(|| path.to_path_buf())
            })
            .collect();

        found.sort();
        found
    }
}

/// `<java_home>/jmods` if it is a directory
fn java_home_jmods(java_home: Option<&OsStr>) -> Option<PathBuf> {
    let jmods = Path::new(java_home?).join("jmods");
    jmods.is_dir().then_some(jmods)
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(SourceKind::from_name)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_scan_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        for name in ["b.jar", "a.jar", "a-sources.jar", "notes.txt", "app.war"] {
            std::fs::write(lib.join(name), b"").unwrap();
        }

        let config = Config::default();
        let sources = ArchiveFinder::new(&config).find_sources(&[dir.path().to_path_buf()]);
        let names: Vec<String> = sources.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["a.jar", "app.war", "b.jar"]);
    }

    #[test]
    fn test_files_keep_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("z.jar");
        let a = dir.path().join("a.jar");
        std::fs::write(&z, b"").unwrap();
        std::fs::write(&a, b"").unwrap();

        let config = Config::default();
        let sources = ArchiveFinder::new(&config).find_sources(&[z, a, dir.path().join("missing.jar")]);
        let names: Vec<String> = sources.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["z.jar", "a.jar"]);
    }

    #[test]
    fn test_java_home_jmods() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(java_home_jmods(Some(dir.path().as_os_str())), None);

        std::fs::create_dir(dir.path().join("jmods")).unwrap();
        assert_eq!(java_home_jmods(Some(dir.path().as_os_str())), Some(dir.path().join("jmods")));
        assert_eq!(java_home_jmods(None), None);
    }

    #[test]
    fn test_configured_runtime_archives_win() {
        let mut config = Config::default();
        config.runtime.archives = vec![PathBuf::from("rt.jar")];
        assert_eq!(ArchiveFinder::new(&config).runtime_inputs(), vec![PathBuf::from("rt.jar")]);

        config.runtime.archives.clear();
        config.runtime.discover = false;
        assert!(ArchiveFinder::new(&config).runtime_inputs().is_empty());
    }

    #[test]
    fn test_runtime_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("java.sql.jmod"), b"").unwrap();
        std::fs::write(dir.path().join("java.base.jmod"), b"").unwrap();
        std::fs::write(dir.path().join("README"), b"").unwrap();

        let config = Config::default();
        let sources = ArchiveFinder::new(&config).find_runtime_sources(&[dir.path().to_path_buf()]);
        let names: Vec<String> = sources.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["java.base.jmod", "java.sql.jmod"]);
    }
}
