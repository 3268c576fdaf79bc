//! BPMN 2.0 XML writer.
//!
//! Produces a single `bpmn:definitions` document holding one vertical pool
//! (a collaboration participant) whose lanes are the actors of the table,
//! followed by the diagram interchange section. Shapes and waypoints are
//! copied from the layout and the routed paths, rounded to whole units.
//! Waypoints are emitted exactly as routed, collinear points included.

use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    fmt::Write,
};

use log::{debug, warn};

use lanewise_core::{
    diagnostic::{Diagnostic, DiagnosticCode},
    geometry::{Bounds, Point, Side, Size},
    step::{FlowKind, ProcessStep, ProcessTable, StepKind},
};

use super::{Error, coord};
use crate::{
    config::{ExportConfig, LayoutConfig},
    layout::Layout,
    routing::{Arrow, RoutedPaths, connection},
};

const BPMN_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
const BPMNDI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
const DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";
const TARGET_NS: &str = "http://bpmn.io/schema/bpmn";

const COLLABORATION_ID: &str = "Collaboration_1";
const PARTICIPANT_ID: &str = "Participant_1";

const ANNOTATION_WIDTH: f32 = 100.0;
const ANNOTATION_HEIGHT: f32 = 30.0;

/// Writes BPMN documents.
pub struct BpmnWriter<'a> {
    export: &'a ExportConfig,
    layout_config: &'a LayoutConfig,
}

impl<'a> BpmnWriter<'a> {
    pub fn new(export: &'a ExportConfig, layout_config: &'a LayoutConfig) -> Self {
        Self {
            export,
            layout_config,
        }
    }

    /// Serializes a routed layout.
    ///
    /// Returns the XML document and the problems found while writing it. An
    /// arrow without a routed path keeps its `sequenceFlow` but gets no
    /// `BPMNEdge`, and is reported as an `E300` error diagnostic.
    pub fn write(
        &self,
        table: &ProcessTable,
        layout: &Layout,
        arrows: &[Arrow],
        paths: &RoutedPaths,
    ) -> Result<(String, Vec<Diagnostic>), Error> {
        let steps = placed_steps(table, layout);
        let ids = ElementIds::new(&steps);
        let mut diagnostics = Vec::new();
        let mut out = String::with_capacity(1024 + 512 * (steps.len() + arrows.len()));

        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<bpmn:definitions xmlns:bpmn="{BPMN_NS}" xmlns:bpmndi="{BPMNDI_NS}" xmlns:dc="{DC_NS}" xmlns:di="{DI_NS}" id="Definitions_1" targetNamespace="{TARGET_NS}">"#
        )?;
        self.write_collaboration(&mut out)?;
        self.write_process(&mut out, &steps, &ids, layout, arrows)?;
        self.write_diagram(
            &mut out,
            &steps,
            &ids,
            layout,
            arrows,
            paths,
            &mut diagnostics,
        )?;
        writeln!(out, "</bpmn:definitions>")?;

        debug!(
            steps_count = steps.len(),
            flows_count = arrows.len(),
            missing_edges_count = diagnostics.len(),
            bytes = out.len();
            "BPMN document written",
        );
        Ok((out, diagnostics))
    }

    fn write_collaboration(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, r#"  <bpmn:collaboration id="{COLLABORATION_ID}">"#)?;
        writeln!(
            out,
            r#"    <bpmn:participant id="{PARTICIPANT_ID}" name="{}" processRef="{}" />"#,
            escape(self.export.process_name()),
            escape(self.export.process_id()),
        )?;
        writeln!(out, "  </bpmn:collaboration>")
    }

    fn write_process(
        &self,
        out: &mut String,
        steps: &[&ProcessStep],
        ids: &ElementIds<'_>,
        layout: &Layout,
        arrows: &[Arrow],
    ) -> std::fmt::Result {
        writeln!(
            out,
            r#"  <bpmn:process id="{}" name="{}" isExecutable="false">"#,
            escape(self.export.process_id()),
            escape(self.export.process_name()),
        )?;

        writeln!(out, r#"    <bpmn:laneSet id="LaneSet_1">"#)?;
        for (lane_index, actor) in layout.lanes().iter().enumerate() {
            writeln!(
                out,
                r#"      <bpmn:lane id="{}" name="{}">"#,
                lane_id(lane_index),
                escape(actor)
            )?;
            let members = steps.iter().filter(|step| {
                layout
                    .position(step.id())
                    .is_some_and(|pos| pos.lane_index() == lane_index)
            });
            for step in members {
                writeln!(
                    out,
                    "        <bpmn:flowNodeRef>{}</bpmn:flowNodeRef>",
                    ids.get(step.id())
                )?;
            }
            writeln!(out, "      </bpmn:lane>")?;
        }
        writeln!(out, "    </bpmn:laneSet>")?;

        for step in steps {
            self.write_flow_node(out, step, ids, arrows)?;
        }

        for arrow in arrows {
            let name = match arrow.kind() {
                FlowKind::Yes => Some(self.export.yes_label()),
                FlowKind::No => Some(self.export.no_label()),
                FlowKind::Next => None,
            };
            write!(
                out,
                r#"    <bpmn:sequenceFlow id="{}" sourceRef="{}" targetRef="{}""#,
                ids.flow(arrow),
                ids.get(arrow.source()),
                ids.get(arrow.target()),
            )?;
            if let Some(name) = name {
                write!(out, r#" name="{}""#, escape(name))?;
            }
            writeln!(out, " />")?;
        }

        for step in steps {
            if let Some(tool) = step.tool() {
                let annotation = ids.annotation(step.id());
                writeln!(out, r#"    <bpmn:textAnnotation id="{annotation}">"#)?;
                writeln!(out, "      <bpmn:text>{}</bpmn:text>", escape(tool))?;
                writeln!(out, "    </bpmn:textAnnotation>")?;
                writeln!(
                    out,
                    r#"    <bpmn:association id="{}" sourceRef="{}" targetRef="{}" />"#,
                    ids.association(step.id()),
                    ids.get(step.id()),
                    annotation,
                )?;
            }
        }

        writeln!(out, "  </bpmn:process>")
    }

    fn write_flow_node(
        &self,
        out: &mut String,
        step: &ProcessStep,
        ids: &ElementIds<'_>,
        arrows: &[Arrow],
    ) -> std::fmt::Result {
        let tag = element_tag(step.kind());
        // Gateways are named after the question they ask.
        let name = match (step.kind(), step.condition()) {
            (StepKind::ExclusiveGateway, Some(condition)) => condition,
            _ => step.label(),
        };

        writeln!(
            out,
            r#"    <bpmn:{tag} id="{}" name="{}">"#,
            ids.get(step.id()),
            escape(name)
        )?;
        if let Some(department) = step.department() {
            writeln!(
                out,
                "      <bpmn:documentation>{}</bpmn:documentation>",
                escape(department)
            )?;
        }
        for arrow in arrows.iter().filter(|a| a.target() == step.id()) {
            writeln!(
                out,
                "      <bpmn:incoming>{}</bpmn:incoming>",
                ids.flow(arrow)
            )?;
        }
        for arrow in arrows.iter().filter(|a| a.source() == step.id()) {
            writeln!(
                out,
                "      <bpmn:outgoing>{}</bpmn:outgoing>",
                ids.flow(arrow)
            )?;
        }
        writeln!(out, "    </bpmn:{tag}>")
    }

    fn write_diagram(
        &self,
        out: &mut String,
        steps: &[&ProcessStep],
        ids: &ElementIds<'_>,
        layout: &Layout,
        arrows: &[Arrow],
        paths: &RoutedPaths,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> std::fmt::Result {
        writeln!(out, r#"  <bpmndi:BPMNDiagram id="BPMNDiagram_1">"#)?;
        writeln!(
            out,
            r#"    <bpmndi:BPMNPlane id="BPMNPlane_1" bpmnElement="{COLLABORATION_ID}">"#
        )?;

        let diagram = layout.diagram_bounds();
        write_shape(out, PARTICIPANT_ID, r#" isHorizontal="false""#, diagram)?;

        for lane_index in 0..layout.lane_count() {
            let (left, right) = layout.lane_x_bounds(lane_index);
            let bounds = Bounds::new_from_top_left(
                Point::new(left, diagram.min_y()),
                Size::new(right - left, diagram.height()),
            );
            write_shape(out, &lane_id(lane_index), r#" isHorizontal="false""#, bounds)?;
        }

        for step in steps {
            let Some(shape) = self.shape_bounds(step, layout) else {
                continue;
            };
            let extra = if step.kind().is_gateway() {
                r#" isMarkerVisible="true""#
            } else {
                ""
            };
            write_shape(out, ids.get(step.id()), extra, shape)?;

            if step.tool().is_some() {
                let annotation = ids.annotation(step.id());
                write_shape(out, &annotation, "", self.annotation_bounds(shape))?;
            }
        }

        for arrow in arrows {
            let id = ids.flow(arrow);
            match paths.get(arrow.id()).filter(|path| path.len() >= 2) {
                Some(path) => write_edge(out, &id, path)?,
                None => {
                    warn!(arrow = arrow.id(); "No routed path, omitting edge");
                    diagnostics.push(
                        Diagnostic::error(format!(
                            "flow `{id}` has no routed path and is not drawn"
                        ))
                        .with_code(DiagnosticCode::E300)
                        .with_step(arrow.source()),
                    );
                }
            }
        }

        for step in steps.iter().filter(|step| step.tool().is_some()) {
            let Some(shape) = self.shape_bounds(step, layout) else {
                continue;
            };
            let annotation = self.annotation_bounds(shape);
            let path = [
                shape.side_midpoint(Side::Right),
                annotation.side_midpoint(Side::Left),
            ];
            write_edge(out, &ids.association(step.id()), &path)?;
        }

        writeln!(out, "    </bpmndi:BPMNPlane>")?;
        writeln!(out, "  </bpmndi:BPMNDiagram>")
    }

    fn shape_bounds(&self, step: &ProcessStep, layout: &Layout) -> Option<Bounds> {
        let slot = layout.slot(step.id())?;
        Some(connection::shape_bounds(
            step.kind(),
            slot,
            self.layout_config,
        ))
    }

    /// Places a tool annotation to the right of its step, vertically centered.
    fn annotation_bounds(&self, shape: Bounds) -> Bounds {
        let top_left = Point::new(
            shape.max_x() + self.export.annotation_gap(),
            shape.center().y() - ANNOTATION_HEIGHT / 2.0,
        );
        Bounds::new_from_top_left(top_left, Size::new(ANNOTATION_WIDTH, ANNOTATION_HEIGHT))
    }
}

/// Returns the first row of every positioned id, in table order.
fn placed_steps<'t>(table: &'t ProcessTable, layout: &Layout) -> Vec<&'t ProcessStep> {
    let mut seen = HashSet::new();
    table
        .steps()
        .iter()
        .filter(|step| seen.insert(step.id()) && layout.position(step.id()).is_some())
        .collect()
}

fn write_shape(out: &mut String, element: &str, extra: &str, bounds: Bounds) -> std::fmt::Result {
    let element = escape(element);
    writeln!(
        out,
        r#"      <bpmndi:BPMNShape id="{element}_di" bpmnElement="{element}"{extra}>"#
    )?;
    writeln!(
        out,
        r#"        <dc:Bounds x="{}" y="{}" width="{}" height="{}" />"#,
        coord(bounds.min_x()),
        coord(bounds.min_y()),
        coord(bounds.width()),
        coord(bounds.height()),
    )?;
    writeln!(out, "      </bpmndi:BPMNShape>")
}

fn write_edge(out: &mut String, element: &str, path: &[Point]) -> std::fmt::Result {
    let element = escape(element);
    writeln!(
        out,
        r#"      <bpmndi:BPMNEdge id="{element}_di" bpmnElement="{element}">"#
    )?;
    for point in path {
        writeln!(
            out,
            r#"        <di:waypoint x="{}" y="{}" />"#,
            coord(point.x()),
            coord(point.y())
        )?;
    }
    writeln!(out, "      </bpmndi:BPMNEdge>")
}

fn element_tag(kind: StepKind) -> &'static str {
    match kind {
        StepKind::StartEvent => "startEvent",
        StepKind::Task => "task",
        StepKind::ExclusiveGateway => "exclusiveGateway",
        StepKind::EndEvent => "endEvent",
    }
}

fn lane_id(lane_index: usize) -> String {
    format!("Lane_{}", lane_index + 1)
}

/// XML element ids of the placed steps.
///
/// BPMN ids are `xsd:ID` values. Step ids that are already valid names are
/// kept as they are; any other id is rewritten to a `Step_` name made of
/// valid characters, suffixed with a counter if it clashes with another id.
struct ElementIds<'t> {
    ids: HashMap<&'t str, String>,
}

impl<'t> ElementIds<'t> {
    fn new(steps: &[&'t ProcessStep]) -> Self {
        let mut ids = HashMap::with_capacity(steps.len());
        let mut used = HashSet::with_capacity(steps.len());

        for step in steps.iter().filter(|step| is_ncname(step.id())) {
            used.insert(step.id().to_string());
            ids.insert(step.id(), step.id().to_string());
        }

        for step in steps.iter().filter(|step| !is_ncname(step.id())) {
            let base = sanitize(step.id());
            let mut candidate = base.clone();
            let mut suffix = 2;
            while used.contains(&candidate) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            used.insert(candidate.clone());
            ids.insert(step.id(), candidate);
        }

        Self { ids }
    }

    fn get<'s>(&'s self, step_id: &'s str) -> &'s str {
        self.ids.get(step_id).map_or(step_id, String::as_str)
    }

    fn flow(&self, arrow: &Arrow) -> String {
        format!("Flow_{}_{}", self.get(arrow.source()), arrow.kind())
    }

    fn annotation(&self, step_id: &str) -> String {
        format!("Annotation_{}", self.get(step_id))
    }

    fn association(&self, step_id: &str) -> String {
        format!("Association_{}", self.get(step_id))
    }
}

fn is_ncname_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ncname_char(c: char) -> bool {
    matches!(c, '_' | '-' | '.') || c.is_alphanumeric()
}

fn is_ncname(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().is_some_and(is_ncname_start) && chars.all(is_ncname_char)
}

/// Builds a valid name from an arbitrary id.
fn sanitize(id: &str) -> String {
    let body: String = id
        .chars()
        .map(|c| if is_ncname_char(c) { c } else { '_' })
        .collect();
    format!("Step_{body}")
}

/// Escapes the five XML special characters.
fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
