//! SVG rendering of a solved layout.
//!
//! Every node is drawn as an ellipse with its label fitted inside; every
//! relation is a straight path trimmed to the ellipse boundaries with an
//! arrowhead on the target end. Dashed relations carry a stroke-dasharray.

use crate::{
    ast::{LineStyle, NodeKind},
    export,
    layout::geometry::{Point, Size},
    layout::text,
    layout::tree::{Layout, Placement},
};
use log::{debug, error, info};
use std::{fs::File, io::Write};
use svg::{
    Document,
    node::element::{Definitions, Ellipse, Group, Marker, Path, Text},
};

/// Whitespace around the diagram content.
const MARGIN: f32 = 50.0;

/// Vertical band reserved above the content for the title.
const TITLE_BAND: f32 = 50.0;

const TITLE_FONT_SIZE: f32 = 22.0;

/// Fraction of the ellipse width a label may occupy before the font
/// shrinks. Leaves room for the curved sides of the ellipse.
const LABEL_WIDTH_FRACTION: f32 = 0.8;

fn fill_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Actor => "lightgreen",
        NodeKind::UseCase => "lightblue",
    }
}

/// Point on the ellipse boundary along the ray from `center` toward
/// `toward`. Degenerate rays (coincident centers) return `toward`
/// unchanged so the path stays drawable.
fn ellipse_boundary_point(center: Point, toward: Point, size: Size) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    let length = dx.hypot(dy);
    if length < 0.001 {
        return toward;
    }

    let half_width = size.width / 2.0;
    let half_height = size.height / 2.0;
    let angle = dy.atan2(dx);

    // Polar form of the ellipse: the radius at this angle.
    let radius =
        (half_width * half_height) / (half_height * angle.cos()).hypot(half_width * angle.sin());

    Point::new(
        center.x + (dx / length) * radius,
        center.y + (dy / length) * radius,
    )
}

/// Arrowhead marker shared by every relation path.
fn create_marker_definitions() -> Definitions {
    let arrowhead = Marker::new()
        .set("id", "arrowhead")
        .set("viewBox", "0 0 10 10")
        .set("refX", 9)
        .set("refY", 5)
        .set("markerWidth", 6)
        .set("markerHeight", 6)
        .set("orient", "auto")
        .add(
            Path::new()
                .set("d", "M 0 0 L 10 5 L 0 10 z")
                .set("fill", "black"),
        );

    Definitions::new().add(arrowhead)
}

fn render_node(placement: &Placement, node_size: Size) -> Group {
    let position = placement.position;
    let label = &placement.node.label;

    let ellipse = Ellipse::new()
        .set("cx", position.x)
        .set("cy", position.y)
        .set("rx", node_size.width / 2.0)
        .set("ry", node_size.height / 2.0)
        .set("fill", fill_color(placement.node.kind))
        .set("fill-opacity", 0.8)
        .set("stroke", "black")
        .set("stroke-width", 1);

    let font_size = text::fit_font_size(label, node_size.width * LABEL_WIDTH_FRACTION);
    let text = Text::new(label)
        .set("x", position.x)
        .set("y", position.y)
        .set("text-anchor", "middle")
        .set("dominant-baseline", "middle")
        .set("font-family", "Arial")
        .set("font-weight", "bold")
        .set("font-size", font_size);

    Group::new().add(ellipse).add(text)
}

fn render_relation(source: &Placement, target: &Placement, style: LineStyle, node_size: Size) -> Path {
    // Trim the line to the ellipse boundaries so the arrowhead lands on
    // the rim instead of the center.
    let start = ellipse_boundary_point(source.position, target.position, node_size);
    let end = ellipse_boundary_point(target.position, source.position, node_size);

    let mut path = Path::new()
        .set("d", format!("M {} {} L {} {}", start.x, start.y, end.x, end.y))
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1.5)
        .set("marker-end", "url(#arrowhead)");

    if style == LineStyle::Dashed {
        path = path.set("stroke-dasharray", "8 6");
    }

    path
}

/// Render a layout into a complete SVG document with a centered title.
pub fn render_document(layout: &Layout, title: &str) -> Document {
    let content_bounds = layout.bounds();
    let width = MARGIN.mul_add(2.0, content_bounds.width());
    let height = MARGIN.mul_add(2.0, content_bounds.height()) + TITLE_BAND;
    debug!("Final SVG dimensions: {width}x{height}");

    let mut doc = Document::new()
        .set("viewBox", format!("0 0 {width} {height}"))
        .set("width", width)
        .set("height", height);

    doc = doc.add(create_marker_definitions());

    let title_text = Text::new(title)
        .set("x", width / 2.0)
        .set("y", TITLE_BAND / 2.0 + TITLE_FONT_SIZE / 2.0)
        .set("text-anchor", "middle")
        .set("font-family", "Arial")
        .set("font-weight", "bold")
        .set("font-size", TITLE_FONT_SIZE);
    doc = doc.add(title_text);

    let mut main_group = Group::new();

    // Arrows first so the ellipses paint over any overshoot.
    for relation in &layout.relations {
        main_group = main_group.add(render_relation(
            layout.source(relation),
            layout.target(relation),
            relation.relation().style,
            layout.node_size,
        ));
    }

    for placement in &layout.placements {
        main_group = main_group.add(render_node(placement, layout.node_size));
    }

    // Shift the content so its bounding box starts inside the margins,
    // below the title band.
    let translate_x = MARGIN - content_bounds.min_x;
    let translate_y = MARGIN + TITLE_BAND - content_bounds.min_y;
    let transform_group = Group::new()
        .set("transform", format!("translate({translate_x}, {translate_y})"))
        .add(main_group);

    doc.add(transform_group)
}

/// SVG file exporter.
pub struct Svg {
    pub file_name: String,
}

impl Svg {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    /// Writes an SVG document to the configured file.
    pub fn write_document(&self, doc: Document) -> Result<(), export::Error> {
        info!(file_name = self.file_name; "Creating SVG file");
        let f = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }

    pub fn export(&self, layout: &Layout, title: &str) -> Result<(), export::Error> {
        let doc = render_document(layout, title);
        debug!("SVG document rendered");

        self.write_document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UseCaseGraph;
    use crate::layout::tree::{AxisMode, Engine};
    use crate::parser;
    use float_cmp::assert_approx_eq;

    fn render(input: &str, title: &str) -> String {
        let diagram = parser::parse(input).unwrap();
        let graph = UseCaseGraph::from_diagram(&diagram).unwrap();
        let layout = Engine::new().calculate(&graph, AxisMode::TopCenter);
        render_document(&layout, title).to_string()
    }

    #[test]
    fn boundary_point_lies_on_the_ellipse() {
        let center = Point::new(0.0, 0.0);
        let size = Size::new(150.0, 75.0);
        let point = ellipse_boundary_point(center, Point::new(300.0, 200.0), size);

        // Plug back into the ellipse equation.
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        let value =
            (point.x / half_width).powi(2) + (point.y / half_height).powi(2);
        assert_approx_eq!(f32, value, 1.0, epsilon = 0.001);
    }

    #[test]
    fn boundary_point_on_the_major_axis_is_the_semi_width() {
        let point = ellipse_boundary_point(
            Point::new(10.0, 20.0),
            Point::new(500.0, 20.0),
            Size::new(150.0, 75.0),
        );
        assert_approx_eq!(f32, point.x, 85.0);
        assert_approx_eq!(f32, point.y, 20.0);
    }

    #[test]
    fn coincident_centers_do_not_blow_up() {
        let center = Point::new(5.0, 5.0);
        let point = ellipse_boundary_point(center, center, Size::new(150.0, 75.0));
        assert!(point == center);
    }

    #[test]
    fn document_contains_one_ellipse_per_placed_node() {
        let svg = render("<<Actor>> User -> Click\nClick --> Starts", "Demo");
        assert_eq!(svg.matches("<ellipse").count(), 3);
        assert_eq!(svg.matches("<path").count(), 3); // marker + two arrows
    }

    #[test]
    fn dashed_relations_carry_a_dasharray() {
        let svg = render("<<Actor>> User -> Click\nClick --> Starts", "Demo");
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
    }

    #[test]
    fn title_is_rendered() {
        let svg = render("<<Actor>> User -> Click", "Checkout Flow");
        assert!(svg.contains("Checkout Flow"));
    }

    #[test]
    fn actor_and_use_case_fills_differ() {
        let svg = render("<<Actor>> User -> Click", "Demo");
        assert!(svg.contains("lightgreen"));
        assert!(svg.contains("lightblue"));
    }
}
