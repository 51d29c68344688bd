// Dependencies between artifacts
//
// Artifact X depends on Y when a class in X references a class defined
// in Y. References to classes in X itself and to classes that no
// artifact defines are not edges. Every definition counts, so a class
// duplicated in Y and Z yields edges to both.
//
// Cycles between artifacts are the strongly connected components of the
// dependency graph with more than one member.

use super::ClasspathIndex;
use crate::model::Classpath;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// "Uses / used by" row of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JarDependency {
    pub artifact: String,
    pub uses: Vec<String>,
    pub used_by: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    /// One row per artifact, in classpath order
    pub rows: Vec<JarDependency>,
    /// Groups of artifacts depending on each other, largest first
    pub cycles: Vec<Vec<String>>,
}

/// Directed graph of artifact positions
pub struct DependencyGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl DependencyGraph {
    pub fn build(classpath: &Classpath, index: &ClasspathIndex) -> Self {
        let targets: Vec<BTreeSet<usize>> = classpath
            .jar_files()
            .par_iter()
            .enumerate()
            .map(|(position, jar_file)| {
                let mut targets = BTreeSet::new();
                for class in jar_file.classes() {
                    let Some(references) = class.references() else {
                        continue;
                    };
                    for name in &references.classes {
                        if let Some(owners) = index.artifacts_for_class(name) {
                            targets.extend(owners.iter().copied().filter(|&o| o != position));
                        }
                    }
                }
                targets
            })
            .collect();

        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..targets.len()).map(|p| graph.add_node(p)).collect();
        for (source, targets) in targets.iter().enumerate() {
            for &target in targets {
                graph.add_edge(nodes[source], nodes[target], ());
            }
        }

        debug!(
            "Dependency graph: {} artifacts, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, nodes }
    }

    /// Positions of the artifacts used by the artifact at `position`
    pub fn uses(&self, position: usize) -> BTreeSet<usize> {
        self.neighbors(position, Direction::Outgoing)
    }

    pub fn used_by(&self, position: usize) -> BTreeSet<usize> {
        self.neighbors(position, Direction::Incoming)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Strongly connected components with at least two artifacts
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<usize> = scc.iter().map(|&n| self.graph[n]).collect();
                members.sort_unstable();
                members
            })
            .collect();

        cycles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        cycles
    }

    pub fn report(&self, index: &ClasspathIndex) -> DependencyReport {
        let rows = (0..self.nodes.len())
            .map(|position| JarDependency {
                artifact: index.artifact_name(position).to_string(),
                uses: index.names(&self.uses(position)),
                used_by: index.names(&self.used_by(position)),
            })
            .collect();

        let cycles = self
            .cycles()
            .iter()
            .map(|members| index.names(members))
            .collect();

        DependencyReport { rows, cycles }
    }

    fn neighbors(&self, position: usize, direction: Direction) -> BTreeSet<usize> {
        self.graph
            .neighbors_directed(self.nodes[position], direction)
            .map(|n| self.graph[n])
            .collect()
    }
}
