//! Tree layout solver for use-case diagrams.
//!
//! Actors sit on a dedicated axis; use cases are grouped by breadth-first
//! level and spaced evenly within each level. The solver is a pure function
//! of the graph and its parameters: identical input yields identical
//! positions.
//!
//! Side classification runs as a second pass, after levels and level rows
//! are known: each actor is placed on the near side of the axis unless the
//! average depth of its already-placed direct use-case successors lies past
//! the midpoint of the level band. With minimum-distance levels every
//! direct successor sits at level 1, so real inputs keep every actor on the
//! near side; the far branch exists for the mirrored-axis contract and is
//! exercised at the classification seam.

use crate::{
    ast,
    graph::UseCaseGraph,
    layout::geometry::{Bounds, Point, Size},
};
use log::{debug, warn};
use petgraph::graph::NodeIndex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Layout orientation: actors on top with levels below, or actors on the
/// left with levels growing rightward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AxisMode {
    #[default]
    TopCenter,
    CenterLeft,
}

/// Which side of the level band an actor is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Near,
    Far,
}

/// Classify an actor by the average primary-axis coordinate of its placed
/// successors. `band_max` is the coordinate of the deepest level row; the
/// fallback average for an actor with no placed successors is 0, which
/// always lands on the near side.
fn classify_side(avg_depth: f32, band_max: f32) -> Side {
    if avg_depth > band_max / 2.0 {
        Side::Far
    } else {
        Side::Near
    }
}

/// A node with its solved position (the ellipse center).
#[derive(Debug, Clone)]
pub struct Placement<'a> {
    pub node: &'a ast::Node,
    pub position: Point,
}

/// A relation with endpoints resolved to placement indices.
#[derive(Debug, Clone)]
pub struct LayoutRelation<'a> {
    relation: &'a ast::Relation,
    source_index: usize,
    target_index: usize,
}

impl<'a> LayoutRelation<'a> {
    pub fn relation(&self) -> &'a ast::Relation {
        self.relation
    }
}

/// Immutable result of a layout pass.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    pub node_size: Size,
    pub placements: Vec<Placement<'a>>,
    pub relations: Vec<LayoutRelation<'a>>,
    /// Non-actor nodes unreachable from every actor, omitted from
    /// placement. Surfaced so callers can warn instead of silently
    /// dropping them from the diagram.
    pub unplaced: Vec<&'a ast::Node>,
}

impl<'a> Layout<'a> {
    pub fn source(&self, lr: &LayoutRelation<'a>) -> &Placement<'a> {
        &self.placements[lr.source_index]
    }

    pub fn target(&self, lr: &LayoutRelation<'a>) -> &Placement<'a> {
        &self.placements[lr.target_index]
    }

    pub fn position_of(&self, ident: &str) -> Option<Point> {
        self.placements
            .iter()
            .find(|p| p.node.ident == ident)
            .map(|p| p.position)
    }

    /// Bounding box of all placed ellipses.
    pub fn bounds(&self) -> Bounds {
        let mut placements = self.placements.iter();
        let Some(first) = placements.next() else {
            return Bounds::default();
        };
        placements.fold(first.position.to_bounds(self.node_size), |acc, p| {
            acc.merge(&p.position.to_bounds(self.node_size))
        })
    }
}

/// Tree layout engine with configurable node size and spacing.
#[derive(Debug, Clone)]
pub struct Engine {
    node_size: Size,
    spacing_factor: f32,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            node_size: Size::new(150.0, 75.0),
            spacing_factor: 2.0,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self
    }

    pub fn with_spacing_factor(mut self, factor: f32) -> Self {
        self.spacing_factor = factor;
        self
    }

    /// Solve positions for every actor and every reachable use case.
    pub fn calculate<'a>(&self, graph: &UseCaseGraph<'a>, mode: AxisMode) -> Layout<'a> {
        let x_spacing = self.node_size.width * self.spacing_factor;
        let y_spacing = self.node_size.height * self.spacing_factor;
        // Spacing along the primary axis (depth) and the perpendicular one.
        let (depth_spacing, lateral_spacing) = match mode {
            AxisMode::TopCenter => (y_spacing, x_spacing),
            AxisMode::CenterLeft => (x_spacing, y_spacing),
        };

        let levels = graph.levels();

        // Group reachable use cases by level, in canonical (lexicographic)
        // order within each level.
        let mut grouped: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for (idx, node) in graph.nodes_with_indices() {
            if node.is_actor() {
                continue;
            }
            if let Some(&level) = levels.get(&idx) {
                grouped.entry(level).or_default().push(idx);
            }
        }
        for group in grouped.values_mut() {
            group.sort_by_key(|&idx| graph.node_from_idx(idx).ident.as_str());
        }
        let deepest = grouped.keys().max().copied().unwrap_or(0);

        // First pass: place the level rows.
        let mut positions: HashMap<NodeIndex, Point> = HashMap::new();
        for (&level, group) in &grouped {
            let count = group.len() as f32;
            let depth = level as f32 * depth_spacing;
            for (i, &idx) in group.iter().enumerate() {
                let lateral = i as f32 * lateral_spacing - (count - 1.0) * lateral_spacing / 2.0;
                let position = match mode {
                    AxisMode::TopCenter => Point::new(lateral, depth),
                    AxisMode::CenterLeft => Point::new(depth, lateral),
                };
                positions.insert(idx, position);
            }
        }

        // Second pass: classify each actor against the level band, now that
        // its successors have real coordinates.
        let band_max = deepest as f32 * depth_spacing;
        let mut near_actors = Vec::new();
        let mut far_actors = Vec::new();
        for actor in graph.actor_indices() {
            let depths: Vec<f32> = graph
                .successors(actor)
                .filter_map(|s| positions.get(&s))
                .map(|p| match mode {
                    AxisMode::TopCenter => p.y,
                    AxisMode::CenterLeft => p.x,
                })
                .collect();
            let avg_depth = if depths.is_empty() {
                0.0
            } else {
                depths.iter().sum::<f32>() / depths.len() as f32
            };
            match classify_side(avg_depth, band_max) {
                Side::Near => near_actors.push(actor),
                Side::Far => far_actors.push(actor),
            }
        }

        let far_depth = (deepest + 1) as f32 * depth_spacing;

        let mut placements = Vec::new();
        self.place_actor_group(graph, &near_actors, 0.0, mode, lateral_spacing, &mut placements);
        self.place_actor_group(graph, &far_actors, far_depth, mode, lateral_spacing, &mut placements);

        for group in grouped.values() {
            for &idx in group {
                placements.push(Placement {
                    node: graph.node_from_idx(idx),
                    position: positions[&idx],
                });
            }
        }

        // Orphans: parsed, registered, but never reached from an actor.
        let unplaced: Vec<&ast::Node> = graph
            .nodes_with_indices()
            .filter(|(idx, node)| !node.is_actor() && !levels.contains_key(idx))
            .map(|(_, node)| node)
            .collect();
        for node in &unplaced {
            warn!(node = node.ident; "node is unreachable from any actor and will not be drawn");
        }

        // Resolve relation endpoints to placement indices; relations that
        // touch an unplaced node cannot be drawn.
        let placement_indices: HashMap<&str, usize> = placements
            .iter()
            .enumerate()
            .map(|(i, p)| (p.node.ident.as_str(), i))
            .collect();
        let relations: Vec<LayoutRelation<'a>> = graph
            .diagram()
            .relations
            .iter()
            .filter_map(|relation| {
                match (
                    placement_indices.get(relation.source.as_str()),
                    placement_indices.get(relation.target.as_str()),
                ) {
                    (Some(&source_index), Some(&target_index)) => Some(LayoutRelation {
                        relation,
                        source_index,
                        target_index,
                    }),
                    _ => {
                        debug!(
                            source = relation.source,
                            target = relation.target;
                            "relation endpoint is unplaced, skipping arrow",
                        );
                        None
                    }
                }
            })
            .collect();

        debug!(
            placements = placements.len(),
            relations = relations.len(),
            unplaced = unplaced.len();
            "Layout calculated",
        );

        Layout {
            node_size: self.node_size,
            placements,
            relations,
            unplaced,
        }
    }

    /// Place one actor group along its axis row (TopCenter: evenly spread
    /// and centered; CenterLeft: stacked downward from the origin).
    fn place_actor_group<'a>(
        &self,
        graph: &UseCaseGraph<'a>,
        actors: &[NodeIndex],
        depth: f32,
        mode: AxisMode,
        lateral_spacing: f32,
        placements: &mut Vec<Placement<'a>>,
    ) {
        let count = actors.len() as f32;
        for (i, &idx) in actors.iter().enumerate() {
            let position = match mode {
                AxisMode::TopCenter => Point::new(
                    i as f32 * lateral_spacing - (count - 1.0) * lateral_spacing / 2.0,
                    depth,
                ),
                AxisMode::CenterLeft => Point::new(depth, i as f32 * lateral_spacing),
            };
            placements.push(Placement {
                node: graph.node_from_idx(idx),
                position,
            });
        }
    }
}
