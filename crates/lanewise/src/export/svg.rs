//! SVG preview of a routed layout.
//!
//! The preview is meant for a quick look at the result without a BPMN
//! viewer. It draws the same geometry as the BPMN diagram section: lane
//! columns with their headers, one shape per step and one polyline per
//! routed arrow.

use log::debug;
use svg::{Document, node::element as svg_element};

use lanewise_core::{
    geometry::{Bounds, Point},
    step::{FlowKind, ProcessTable, StepKind},
};

use super::Error;
use crate::{
    config::{ExportConfig, LayoutConfig},
    layout::Layout,
    routing::{Arrow, RoutedPaths, connection},
};

const ARROW_MARKER_ID: &str = "arrow-end";
const STROKE_COLOR: &str = "#333333";
const LANE_HEADER_FILL: &str = "#eef2f7";
const FONT_SIZE: f32 = 12.0;

/// Renders SVG previews.
pub struct SvgRenderer<'a> {
    layout_config: &'a LayoutConfig,
    export: &'a ExportConfig,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(layout_config: &'a LayoutConfig, export: &'a ExportConfig) -> Self {
        Self {
            layout_config,
            export,
        }
    }

    /// Renders the preview as an SVG document string.
    pub fn render(
        &self,
        table: &ProcessTable,
        layout: &Layout,
        arrows: &[Arrow],
        paths: &RoutedPaths,
    ) -> Result<String, Error> {
        if layout.is_empty() {
            return Err(Error::Render("cannot render an empty layout".to_string()));
        }

        let bounds = layout.diagram_bounds();
        let width = bounds.max_x() + self.layout_config.margin_left();
        let height = bounds.max_y() + self.layout_config.margin_top();

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height)
            .add(Self::marker_definitions());

        for lane_index in 0..layout.lane_count() {
            doc = doc.add(self.render_lane(layout, lane_index));
        }

        for (id, pos) in layout.positions() {
            let Some(step) = table.step(id) else {
                continue;
            };
            let slot = pos.slot(self.layout_config);
            let shape = connection::shape_bounds(step.kind(), slot, self.layout_config);
            doc = doc.add(Self::render_step(step.kind(), shape, step.label()));
        }

        for arrow in arrows {
            if let Some(path) = paths.get(arrow.id()) {
                doc = doc.add(self.render_arrow(arrow, path));
            }
        }

        debug!(
            width,
            height,
            arrows_count = arrows.len();
            "SVG preview rendered",
        );
        Ok(doc.to_string())
    }

    fn render_lane(&self, layout: &Layout, lane_index: usize) -> svg_element::Group {
        let (left, right) = layout.lane_x_bounds(lane_index);
        let bounds = layout.diagram_bounds();
        let header_height = self.layout_config.lane_label_offset();
        let actor = layout
            .lanes()
            .get(lane_index)
            .map(String::as_str)
            .unwrap_or_default();

        let column = svg_element::Rectangle::new()
            .set("x", left)
            .set("y", bounds.min_y())
            .set("width", right - left)
            .set("height", bounds.height())
            .set("fill", "white")
            .set("stroke", STROKE_COLOR);
        let header = svg_element::Rectangle::new()
            .set("x", left)
            .set("y", bounds.min_y())
            .set("width", right - left)
            .set("height", header_height)
            .set("fill", LANE_HEADER_FILL)
            .set("stroke", STROKE_COLOR);
        let label = Self::text(
            Point::new((left + right) / 2.0, bounds.min_y() + header_height / 2.0),
            actor,
        )
        .set("font-weight", "bold");

        svg_element::Group::new()
            .set("class", "lane")
            .add(column)
            .add(header)
            .add(label)
    }

    fn render_step(kind: StepKind, shape: Bounds, label: &str) -> svg_element::Group {
        let center = shape.center();
        let group = svg_element::Group::new().set("class", "step");

        match kind {
            StepKind::StartEvent | StepKind::EndEvent => {
                // End events get the thick BPMN border.
                let stroke_width = if kind == StepKind::EndEvent { 3 } else { 1 };
                let circle = svg_element::Circle::new()
                    .set("cx", center.x())
                    .set("cy", center.y())
                    .set("r", shape.width() / 2.0)
                    .set("fill", "white")
                    .set("stroke", STROKE_COLOR)
                    .set("stroke-width", stroke_width);
                // Event labels sit below the circle.
                let text = Self::text(center.with_y(shape.max_y() + FONT_SIZE), label);
                group.add(circle).add(text)
            }
            StepKind::ExclusiveGateway => {
                let points = format!(
                    "{},{} {},{} {},{} {},{}",
                    center.x(),
                    shape.min_y(),
                    shape.max_x(),
                    center.y(),
                    center.x(),
                    shape.max_y(),
                    shape.min_x(),
                    center.y(),
                );
                let diamond = svg_element::Polygon::new()
                    .set("points", points)
                    .set("fill", "white")
                    .set("stroke", STROKE_COLOR);
                let text = Self::text(center.with_y(shape.min_y() - FONT_SIZE / 2.0), label);
                group.add(diamond).add(text)
            }
            StepKind::Task => {
                let rect = svg_element::Rectangle::new()
                    .set("x", shape.min_x())
                    .set("y", shape.min_y())
                    .set("width", shape.width())
                    .set("height", shape.height())
                    .set("rx", 10)
                    .set("ry", 10)
                    .set("fill", "white")
                    .set("stroke", STROKE_COLOR);
                group.add(rect).add(Self::text(center, label))
            }
        }
    }

    fn render_arrow(&self, arrow: &Arrow, path: &[Point]) -> svg_element::Group {
        let mut group = svg_element::Group::new()
            .set("class", "flow")
            .set("id", arrow.id());

        if let Some(data) = Self::path_data(path) {
            group = group.add(
                svg_element::Path::new()
                    .set("d", data)
                    .set("fill", "none")
                    .set("stroke", STROKE_COLOR)
                    .set("marker-end", format!("url(#{ARROW_MARKER_ID})")),
            );
        }

        let label = match arrow.kind() {
            FlowKind::Yes => Some(self.export.yes_label()),
            FlowKind::No => Some(self.export.no_label()),
            FlowKind::Next => None,
        };
        // Branch labels go next to the exit stub.
        if let (Some(label), Some(anchor)) = (label, path.get(1).or(path.first())) {
            let anchor = Point::new(anchor.x() + 4.0, anchor.y() - 4.0);
            group = group.add(
                Self::text(anchor, label)
                    .set("text-anchor", "start")
                    .set("font-size", FONT_SIZE - 2.0),
            );
        }
        group
    }

    /// Builds `M x y L x y ...` path data from waypoints.
    fn path_data(path: &[Point]) -> Option<String> {
        let (first, rest) = path.split_first()?;
        let mut data = format!("M {} {}", first.x(), first.y());
        for point in rest {
            data.push_str(&format!(" L {} {}", point.x(), point.y()));
        }
        Some(data)
    }

    fn text(position: Point, content: &str) -> svg_element::Text {
        svg_element::Text::new(content)
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", FONT_SIZE)
    }

    fn marker_definitions() -> svg_element::Definitions {
        svg_element::Definitions::new().add(
            svg_element::Marker::new()
                .set("id", ARROW_MARKER_ID)
                .set("viewBox", "0 0 10 10")
                .set("refX", 9)
                .set("refY", 5)
                .set("markerWidth", 6)
                .set("markerHeight", 6)
                .set("orient", "auto")
                .add(
                    svg_element::Path::new()
                        .set("d", "M 0 0 L 10 5 L 0 10 z")
                        .set("fill", STROKE_COLOR),
                ),
        )
    }
}
