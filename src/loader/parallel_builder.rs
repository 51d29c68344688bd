// Parallel classpath builder using rayon

use super::display_names::assign_display_names;
use super::ingestor::{ArtifactIngestor, IngestOptions};
use super::source::Source;
use crate::artifacts::ArtifactResolver;
use crate::config::{Config, RuntimeConfig};
use crate::model::{Classpath, JarFileBuilder};
use crate::resolve::{RuntimeProvider, Strategy};
use dashmap::DashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Loads many sources concurrently into one ordered classpath.
///
/// Every source is ingested independently. A source that fails is logged
/// and left out; it never aborts the batch. The result keeps the input
/// order of the sources, whatever order they finish in.
pub struct ClasspathBuilder {
    ingestor: ArtifactIngestor,
    threads: usize,
    strategy: Strategy,
    progress: Option<ProgressBar>,
}

impl ClasspathBuilder {
    pub fn new(ingestor: ArtifactIngestor) -> Self {
        Self {
            ingestor,
            threads: 0,
            strategy: Strategy::default(),
            progress: None,
        }
    }

    pub fn from_config(config: &Config, resolver: Arc<dyn ArtifactResolver>) -> Self {
        Self::new(ArtifactIngestor::new(IngestOptions::from_config(config), resolver))
            .with_threads(config.loader.threads)
            .with_strategy(config.loader.strategy)
    }

    /// Worker count; 0 uses the global rayon pool
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Advance `progress` once per finished source
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn ingestor(&self) -> &ArtifactIngestor {
        &self.ingestor
    }

    pub fn build(&self, sources: &[Source]) -> Classpath {
        self.build_named("classpath", sources)
    }

    pub fn build_named(&self, name: &str, sources: &[Source]) -> Classpath {
        let start = Instant::now();
        let sources = dedupe(sources);
        info!("Loading {} sources in parallel...", sources.len());

        if let Some(progress) = &self.progress {
            progress.set_length(sources.len() as u64);
        }

        let results: DashMap<usize, Vec<JarFileBuilder>> = DashMap::new();
        let ingest_all = || {
            sources.par_iter().enumerate().for_each(|(index, source)| {
                if let Some(drafts) = self.ingest_one(source) {
                    results.insert(index, drafts);
                }
                if let Some(progress) = &self.progress {
                    progress.inc(1);
                }
            });
        };

        match self.thread_pool() {
            Some(pool) => pool.install(ingest_all),
            None => ingest_all(),
        }

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        let mut drafts: Vec<JarFileBuilder> = (0..sources.len())
            .filter_map(|index| results.remove(&index).map(|(_, drafts)| drafts))
            .flatten()
            .collect();

        assign_display_names(&mut drafts);
        let jar_files = drafts.into_iter().map(JarFileBuilder::build).collect();
        let classpath = Classpath::named(name, jar_files, self.strategy);

        info!(
            "Loaded {} artifacts with {} classes in {:?}",
            classpath.len(),
            classpath.class_count(),
            start.elapsed()
        );

        classpath
    }

    /// Bootstrap provider for `config`, backed by the given runtime image
    /// archives if there are any
    pub fn build_runtime(&self, config: &RuntimeConfig, sources: &[Source]) -> RuntimeProvider {
        let runtime = RuntimeProvider::from_config(config);
        if sources.is_empty() {
            return runtime;
        }

        let library = self.build_named("runtime", sources);
        runtime.with_library(library)
    }

    fn ingest_one(&self, source: &Source) -> Option<Vec<JarFileBuilder>> {
        if source.kind().is_none() {
            warn!("Skipping {}: unsupported file type", source);
            return None;
        }

        let start = Instant::now();
        match self.ingestor.ingest_source(source) {
            Ok(drafts) => {
                debug!("Ingested {} in {:?}", source, start.elapsed());
                Some(drafts)
            }
            Err(e) => {
                warn!("Failed to load {}: {}", source, e);
                None
            }
        }
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if self.threads == 0 {
            return None;
        }

        match rayon::ThreadPoolBuilder::new().num_threads(self.threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("Unable to create thread pool ({}), using the global pool", e);
                None
            }
        }
    }
}

impl Default for ClasspathBuilder {
    fn default() -> Self {
        Self::new(ArtifactIngestor::default())
    }
}

fn dedupe(sources: &[Source]) -> Vec<Source> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|source| {
            let fresh = seen.insert(source.identity());
            if !fresh {
                warn!("Ignoring duplicate source {}", source);
            }
            fresh
        })
        .cloned()
        .collect()
}
