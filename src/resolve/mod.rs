//! Class resolution across the classpath and the runtime.
//!
//! A [`ResolutionChain`] links class providers. Each link owns one
//! provider and optionally a parent link; the [`Strategy`] decides whether
//! the parent or the local provider is asked first. Either way the first
//! hit wins and an exhausted chain means "not found".

mod access_check;
mod runtime;

pub use access_check::AccessCheck;
pub use runtime::{RuntimeProvider, DEFAULT_RUNTIME_PACKAGES};

use crate::model::{ClassDef, Classpath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Anything that can answer "is class X defined here".
pub trait ClassProvider: Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    fn class_def(&self, name: &str) -> Option<Arc<ClassDef>>;

    fn has_package(&self, package: &str) -> bool;
}

/// Lookup order between a link and its parent
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Ask the parent link first
    ParentFirst,
    /// Ask the local provider first
    #[default]
    ParentLast,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::ParentFirst => f.write_str("parent-first"),
            Strategy::ParentLast => f.write_str("parent-last"),
        }
    }
}

/// A class found by the chain, together with the provider that had it
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub class: Arc<ClassDef>,
    pub provider: &'a str,
}

pub struct ResolutionChain {
    provider: Arc<dyn ClassProvider>,
    parent: Option<Arc<ResolutionChain>>,
    strategy: Strategy,
}

impl fmt::Debug for ResolutionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionChain")
            .field("provider", &self.provider.name())
            .field("parent", &self.parent)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl ResolutionChain {
    /// Chain with a single link
    pub fn root(provider: Arc<dyn ClassProvider>) -> Self {
        Self {
            provider,
            parent: None,
            strategy: Strategy::ParentLast,
        }
    }

    /// Link `provider` in front of `parent`
    pub fn with_parent(
        provider: Arc<dyn ClassProvider>,
        parent: Arc<ResolutionChain>,
        strategy: Strategy,
    ) -> Self {
        Self {
            provider,
            parent: Some(parent),
            strategy,
        }
    }

    /// The usual two-link chain: the classpath in front of the runtime,
    /// ordered by the classpath's strategy
    pub fn for_classpath(classpath: Arc<Classpath>, runtime: Arc<dyn ClassProvider>) -> Self {
        let strategy = classpath.strategy();
        Self::with_parent(classpath, Arc::new(Self::root(runtime)), strategy)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn parent(&self) -> Option<&Arc<ResolutionChain>> {
        self.parent.as_ref()
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.locate(name).map(|r| r.class)
    }

    /// Resolve a class and report which provider defined it
    pub fn locate(&self, name: &str) -> Option<Resolved<'_>> {
        match self.strategy {
            Strategy::ParentFirst => self.locate_parent_first(name),
            Strategy::ParentLast => self.locate_parent_last(name),
        }
    }

    pub fn has_package(&self, package: &str) -> bool {
        // order does not matter for a yes/no answer
        self.provider.has_package(package)
            || self
                .parent
                .as_ref()
                .map(|p| p.has_package(package))
                .unwrap_or(false)
    }

    fn locate_parent_first(&self, name: &str) -> Option<Resolved<'_>> {
        self.locate_in_parent(name)
            .or_else(|| self.locate_local(name))
    }

    fn locate_parent_last(&self, name: &str) -> Option<Resolved<'_>> {
        self.locate_local(name)
            .or_else(|| self.locate_in_parent(name))
    }

    fn locate_local(&self, name: &str) -> Option<Resolved<'_>> {
        self.provider.class_def(name).map(|class| Resolved {
            class,
            provider: self.provider.name(),
        })
    }

    fn locate_in_parent(&self, name: &str) -> Option<Resolved<'_>> {
        self.parent.as_ref().and_then(|p| p.locate(name))
    }
}
