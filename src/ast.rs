//! Data model for a parsed use-case diagram.
//!
//! The parser constructs every [`Node`] exactly once, classifying it as an
//! actor or a use case at that point. Downstream stages (graph, layout,
//! export) only ever match on [`NodeKind`] instead of re-inspecting the
//! identifier for the marker.

/// Marker prefix that tags a node as an actor, e.g. `<<Actor>> Customer`.
pub const ACTOR_MARKER: &str = "<<Actor>>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Actor,
    UseCase,
}

/// A diagram node.
///
/// Identity is the exact trimmed line text (`ident`), marker included:
/// `<<Actor>> User` and `User` are two distinct nodes. `label` is the
/// display text with the actor marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub ident: String,
    pub kind: NodeKind,
    pub label: String,
}

impl Node {
    /// Classify a trimmed identifier string into a node.
    pub fn from_ident(ident: &str) -> Self {
        match ident.strip_prefix(ACTOR_MARKER) {
            Some(rest) => Self {
                ident: ident.to_string(),
                kind: NodeKind::Actor,
                label: rest.trim().to_string(),
            },
            None => Self {
                ident: ident.to_string(),
                kind: NodeKind::UseCase,
                label: ident.to_string(),
            },
        }
    }

    pub fn is_actor(&self) -> bool {
        self.kind == NodeKind::Actor
    }
}

/// Line style of a relation arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// A directed relation between two nodes, referenced by ident.
///
/// Duplicate relations between the same ordered pair are permitted and
/// stored independently, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub style: LineStyle,
}

/// A parsed diagram: the node set and the ordered relation list.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub relations: Vec<Relation>,
}

impl Diagram {
    /// Register a node by identifier, preserving first-seen order.
    /// Returns the ident as stored.
    pub fn register_node(&mut self, ident: &str) {
        if !self.nodes.iter().any(|n| n.ident == ident) {
            self.nodes.push(Node::from_ident(ident));
        }
    }

    pub fn node(&self, ident: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.ident == ident)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
