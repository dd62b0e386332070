//! Directed graph built from a parsed diagram, plus breadth-first level
//! assignment.
//!
//! Levels drive the tree layout: a node's level is the minimal hop distance
//! from any actor that reaches it. Relation style is ignored for topology.

use crate::{ast, error::VignetteError};
use log::{debug, trace, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};

/// Graph representation of a single diagram.
#[derive(Debug)]
pub struct UseCaseGraph<'a> {
    graph: DiGraph<&'a ast::Node, &'a ast::Relation>,
    node_indices: HashMap<&'a str, NodeIndex>,
    diagram: &'a ast::Diagram,
}

impl<'a> UseCaseGraph<'a> {
    /// Build the graph from a diagram.
    ///
    /// The parser already guarantees that every relation endpoint is a
    /// registered node; the `UnknownNode` check guards direct construction
    /// of a [`ast::Diagram`] through the library API.
    pub fn from_diagram(diagram: &'a ast::Diagram) -> Result<Self, VignetteError> {
        if diagram.is_empty() {
            return Err(VignetteError::EmptyDiagram);
        }

        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &diagram.nodes {
            let idx = graph.add_node(node);
            node_indices.insert(node.ident.as_str(), idx);
        }

        for relation in &diagram.relations {
            let source = *node_indices
                .get(relation.source.as_str())
                .ok_or_else(|| VignetteError::UnknownNode(relation.source.clone()))?;
            let target = *node_indices
                .get(relation.target.as_str())
                .ok_or_else(|| VignetteError::UnknownNode(relation.target.clone()))?;
            graph.add_edge(source, target, relation);
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Graph built",
        );

        Ok(Self {
            graph,
            node_indices,
            diagram,
        })
    }

    pub fn diagram(&self) -> &'a ast::Diagram {
        self.diagram
    }

    pub fn node_index(&self, ident: &str) -> Option<NodeIndex> {
        self.node_indices.get(ident).copied()
    }

    pub fn node_from_idx(&self, idx: NodeIndex) -> &'a ast::Node {
        self.graph
            .node_weight(idx)
            .expect("node index should exist")
    }

    pub fn nodes_with_indices(&self) -> impl Iterator<Item = (NodeIndex, &'a ast::Node)> + '_ {
        self.graph.node_indices().map(|idx| (idx, self.node_from_idx(idx)))
    }

    /// Actor vertices, sorted by identifier for reproducible iteration.
    pub fn actor_indices(&self) -> Vec<NodeIndex> {
        let mut actors: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| self.node_from_idx(idx).is_actor())
            .collect();
        actors.sort_by_key(|&idx| self.node_from_idx(idx).ident.as_str());
        actors
    }

    /// Direct successors of a vertex.
    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Minimal breadth-first hop distance from any actor, for every vertex
    /// reachable from at least one actor.
    ///
    /// Each actor contributes its own single-source distances; the merge
    /// keeps the minimum, so the result does not depend on actor order. An
    /// actor with no outgoing edges contributes only itself at distance 0.
    /// Vertices unreachable from every actor are absent from the map.
    pub fn levels(&self) -> HashMap<NodeIndex, usize> {
        let mut levels: HashMap<NodeIndex, usize> = HashMap::new();

        for actor in self.actor_indices() {
            let mut queue = VecDeque::new();
            let mut seen: HashMap<NodeIndex, usize> = HashMap::new();
            seen.insert(actor, 0);
            queue.push_back((actor, 0));

            while let Some((idx, dist)) = queue.pop_front() {
                for next in self.successors(idx) {
                    if !seen.contains_key(&next) {
                        seen.insert(next, dist + 1);
                        queue.push_back((next, dist + 1));
                    }
                }
            }

            for (idx, dist) in seen {
                levels
                    .entry(idx)
                    .and_modify(|d| *d = (*d).min(dist))
                    .or_insert(dist);
            }
        }

        let orphans = self
            .graph
            .node_indices()
            .filter(|idx| !levels.contains_key(idx) && !self.node_from_idx(*idx).is_actor())
            .count();
        if orphans > 0 {
            warn!(count = orphans; "nodes unreachable from any actor will not be placed");
        }

        trace!(levels:?; "Assigned levels");

        levels
    }
}
