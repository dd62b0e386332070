//! Line-oriented parser for the use-case grammar.
//!
//! One declaration per line:
//!
//! ```text
//! <<Actor>> Customer -> Browse Products    // solid relation
//! Browse Products --> Add to Cart          // dashed relation
//! Standalone Note                          // bare node, no relation
//! ```
//!
//! The dashed marker is checked before the solid marker because `->` is a
//! substring of `-->`; swapping the alternatives would mis-parse every
//! dashed line as a solid arrow with a leftover `>`.

use crate::{
    ast::{Diagram, LineStyle, Relation},
    error::VignetteError,
};
use log::{debug, warn};
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{take_until, take_while};

const DASHED_MARKER: &str = "-->";
const SOLID_MARKER: &str = "->";

struct RawRelation<'s> {
    source: &'s str,
    target: &'s str,
    style: LineStyle,
}

fn dashed_relation<'s>(input: &mut &'s str) -> winnow::Result<RawRelation<'s>> {
    let source = take_until(1.., DASHED_MARKER).parse_next(input)?;
    DASHED_MARKER.parse_next(input)?;
    let target = take_while(0.., |_| true).parse_next(input)?;
    Ok(RawRelation {
        source,
        target,
        style: LineStyle::Dashed,
    })
}

fn solid_relation<'s>(input: &mut &'s str) -> winnow::Result<RawRelation<'s>> {
    let source = take_until(1.., SOLID_MARKER).parse_next(input)?;
    SOLID_MARKER.parse_next(input)?;
    let target = take_while(0.., |_| true).parse_next(input)?;
    Ok(RawRelation {
        source,
        target,
        style: LineStyle::Solid,
    })
}

fn relation_line<'s>(input: &mut &'s str) -> winnow::Result<RawRelation<'s>> {
    // Order is load-bearing: dashed before solid.
    alt((dashed_relation, solid_relation)).parse_next(input)
}

/// Parse a block of text into a [`Diagram`].
///
/// Both endpoints of every relation are auto-registered as nodes, so the
/// returned node set is closed over the relation list. Malformed lines
/// degrade with a warning instead of failing the request; an input with no
/// nodes at all is rejected before any layout arithmetic can run on it.
pub fn parse(input: &str) -> Result<Diagram, VignetteError> {
    let mut diagram = Diagram::default();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut rest = line;
        match relation_line(&mut rest) {
            Ok(relation) => {
                let source = relation.source.trim();
                let target = relation.target.trim();

                if source.is_empty() || target.is_empty() {
                    warn!(
                        line_number = idx + 1,
                        line;
                        "relation is missing an endpoint, registering the line as a bare node",
                    );
                    diagram.register_node(line);
                    continue;
                }

                // The split takes the first marker occurrence only. A
                // leftover marker on either side means the line was
                // ambiguous; keep the best-effort parse but say so.
                if source.contains(SOLID_MARKER) || target.contains(SOLID_MARKER) {
                    warn!(
                        line_number = idx + 1,
                        line;
                        "line contains more than one arrow marker, splitting at the first occurrence",
                    );
                }

                diagram.register_node(source);
                diagram.register_node(target);
                diagram.relations.push(Relation {
                    source: source.to_string(),
                    target: target.to_string(),
                    style: relation.style,
                });
            }
            Err(_) => diagram.register_node(line),
        }
    }

    if diagram.is_empty() {
        return Err(VignetteError::EmptyDiagram);
    }

    debug!(
        nodes = diagram.nodes.len(),
        relations = diagram.relations.len();
        "Parsed diagram",
    );

    Ok(diagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_solid_relation() {
        let diagram = parse("A -> B").unwrap();
        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.relations.len(), 1);
        assert_eq!(diagram.relations[0].source, "A");
        assert_eq!(diagram.relations[0].target, "B");
        assert_eq!(diagram.relations[0].style, LineStyle::Solid);
    }

    #[test]
    fn dashed_marker_takes_precedence_over_solid() {
        let diagram = parse("A --> B").unwrap();
        assert_eq!(diagram.relations[0].style, LineStyle::Dashed);
        // A naive solid-first split would have produced a "> B" target.
        assert_eq!(diagram.relations[0].target, "B");
    }

    #[test]
    fn every_relation_endpoint_is_registered_as_a_node() {
        let input = "A -> B\nB --> C\nD -> A\n";
        let diagram = parse(input).unwrap();
        for relation in &diagram.relations {
            assert!(diagram.node(&relation.source).is_some());
            assert!(diagram.node(&relation.target).is_some());
        }
    }

    #[test]
    fn bare_line_registers_a_standalone_node() {
        let diagram = parse("Standalone Note").unwrap();
        assert_eq!(diagram.nodes.len(), 1);
        assert!(diagram.relations.is_empty());
        assert_eq!(diagram.nodes[0].ident, "Standalone Note");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let diagram = parse("\nA -> B\n\n\nC\n").unwrap();
        assert_eq!(diagram.nodes.len(), 3);
        assert_eq!(diagram.relations.len(), 1);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(parse(""), Err(VignetteError::EmptyDiagram)));
        assert!(matches!(parse("  \n \n"), Err(VignetteError::EmptyDiagram)));
    }

    #[test]
    fn ambiguous_line_splits_at_first_marker() {
        let diagram = parse("A -> B -> C").unwrap();
        assert_eq!(diagram.relations.len(), 1);
        assert_eq!(diagram.relations[0].source, "A");
        assert_eq!(diagram.relations[0].target, "B -> C");
    }

    #[test]
    fn dashed_wins_even_after_a_solid_marker() {
        let diagram = parse("A -> B --> C").unwrap();
        assert_eq!(diagram.relations[0].style, LineStyle::Dashed);
        assert_eq!(diagram.relations[0].source, "A -> B");
        assert_eq!(diagram.relations[0].target, "C");
    }

    #[test]
    fn relation_missing_an_endpoint_degrades_to_a_node() {
        let diagram = parse("-> B").unwrap();
        assert!(diagram.relations.is_empty());
        assert_eq!(diagram.nodes.len(), 1);
        assert_eq!(diagram.nodes[0].ident, "-> B");
    }

    #[test]
    fn duplicate_relations_are_kept_independently() {
        let diagram = parse("A -> B\nA -> B").unwrap();
        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.relations.len(), 2);
    }

    #[test]
    fn scenario_actor_chain() {
        let diagram = parse("<<Actor>> User -> Click\nClick --> Starts").unwrap();
        assert_eq!(diagram.nodes.len(), 3);
        assert_eq!(diagram.relations.len(), 2);

        let actor = diagram.node("<<Actor>> User").unwrap();
        assert_eq!(actor.kind, NodeKind::Actor);
        assert_eq!(actor.label, "User");

        assert_eq!(diagram.relations[0].style, LineStyle::Solid);
        assert_eq!(diagram.relations[1].style, LineStyle::Dashed);
    }
}
