//! Orthogonal edge routing between laid-out steps.
//!
//! The [`Router`] turns every transition of a process table into an
//! [`Arrow`] and every arrow into a polyline of waypoints. The shape of the
//! polyline depends on how far apart the two lanes are:
//!
//! - **Same lane**: a straight vertical line when nothing sits between the
//!   steps, otherwise a detour through a corridor along the lane's margin.
//! - **Adjacent lanes**: a straight horizontal line when both steps are on
//!   the same row, otherwise a Z-shape through the midline between them.
//! - **Distant lanes**: a detour below all content, so the route never
//!   crosses the lanes in between.
//!
//! Routes start and end on the drawn outline of the shapes (see
//! [`connection`]). Every route leaves and enters a shape with a short stub
//! perpendicular to the side it attaches to.

pub mod connection;

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::Serialize;

use lanewise_core::{
    diagnostic::{Diagnostic, DiagnosticCode},
    geometry::{Point, Side},
    step::{FlowKind, ProcessTable, StepKind},
};

use crate::{
    config::LayoutConfig,
    graph::ProcessGraph,
    layout::{Layout, NodePosition},
};

/// Waypoints of every arrow, keyed by arrow id, in arrow order.
pub type RoutedPaths = IndexMap<String, Vec<Point>>;

/// A transition between two positioned steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    id: String,
    source: String,
    target: String,
    kind: FlowKind,
    source_kind: StepKind,
    target_kind: StepKind,
    source_pos: NodePosition,
    target_pos: NodePosition,
}

impl Arrow {
    /// Returns the arrow id, `<source id>_<yes|no|next>`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn source_kind(&self) -> StepKind {
        self.source_kind
    }

    pub fn target_kind(&self) -> StepKind {
        self.target_kind
    }

    pub fn source_pos(&self) -> &NodePosition {
        &self.source_pos
    }

    pub fn target_pos(&self) -> &NodePosition {
        &self.target_pos
    }

    pub fn lane_relation(&self) -> LaneRelation {
        LaneRelation::between(self.source_pos.lane_index(), self.target_pos.lane_index())
    }
}

/// How far apart the lanes of an arrow's endpoints are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneRelation {
    Same,
    Adjacent,
    Distant,
}

impl LaneRelation {
    pub fn between(source_lane: usize, target_lane: usize) -> Self {
        match source_lane.abs_diff(target_lane) {
            0 => Self::Same,
            1 => Self::Adjacent,
            _ => Self::Distant,
        }
    }
}

/// Routes the transitions of one table over one layout.
pub struct Router<'a> {
    layout: &'a Layout,
    config: &'a LayoutConfig,
    arrows: Vec<Arrow>,
}

impl<'a> Router<'a> {
    pub fn new(layout: &'a Layout, config: &'a LayoutConfig) -> Self {
        Self {
            layout,
            config,
            arrows: Vec::new(),
        }
    }

    /// Builds one arrow per transition whose endpoints are both positioned.
    ///
    /// Replaces any previously extracted arrows. Transitions pointing at
    /// unknown steps are skipped and reported as `W100` warnings.
    pub fn extract_arrows(&mut self, table: &ProcessTable) -> Vec<Diagnostic> {
        let graph = ProcessGraph::from_table(table);
        self.arrows.clear();

        let diagnostics: Vec<Diagnostic> = graph
            .dangling()
            .iter()
            .map(|dangling| {
                warn!(
                    source = dangling.source,
                    target_id = dangling.target,
                    kind = dangling.kind.as_str();
                    "Skipping transition to unknown step",
                );
                Diagnostic::warning(format!(
                    "`{}` points to unknown step `{}`; the {} transition is not drawn",
                    dangling.source, dangling.target, dangling.kind
                ))
                .with_code(DiagnosticCode::W100)
                .with_step(dangling.source)
            })
            .collect();

        let mut seen = HashSet::new();
        for step in table.steps() {
            // Only the first row of a duplicated id is positioned.
            if !seen.insert(step.id()) {
                continue;
            }
            let Some(source_pos) = self.layout.position(step.id()) else {
                continue;
            };

            for (kind, target) in step.transitions() {
                let (Some(target_step), Some(target_pos)) =
                    (graph.step(target), self.layout.position(target))
                else {
                    continue;
                };

                self.arrows.push(Arrow {
                    id: format!("{}_{kind}", step.id()),
                    source: step.id().to_string(),
                    target: target.to_string(),
                    kind,
                    source_kind: step.kind(),
                    target_kind: target_step.kind(),
                    source_pos: source_pos.clone(),
                    target_pos: target_pos.clone(),
                });
            }
        }

        debug!(
            arrows_count = self.arrows.len(),
            skipped_count = diagnostics.len();
            "Arrows extracted",
        );
        diagnostics
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn into_arrows(self) -> Vec<Arrow> {
        self.arrows
    }

    /// Routes every extracted arrow.
    pub fn route_all(&self) -> RoutedPaths {
        let paths: RoutedPaths = self
            .arrows
            .iter()
            .map(|arrow| (arrow.id.clone(), self.route(arrow)))
            .collect();

        debug!(paths_count = paths.len(); "Arrows routed");
        paths
    }

    /// Returns the point where a connection attaches to a step's shape.
    pub fn connection_point(
        &self,
        kind: StepKind,
        pos: &NodePosition,
        side: Side,
        exit_flow: Option<FlowKind>,
    ) -> Point {
        connection::connection_point(kind, pos.slot(self.config), side, exit_flow, self.config)
    }

    fn route(&self, arrow: &Arrow) -> Vec<Point> {
        let relation = arrow.lane_relation();
        let points = match relation {
            LaneRelation::Same if arrow.source == arrow.target => self.route_self_loop(arrow),
            LaneRelation::Same => self.route_same_lane(arrow),
            LaneRelation::Adjacent => self.route_adjacent_lane(arrow),
            LaneRelation::Distant => self.route_distant_lane(arrow),
        };

        trace!(
            arrow = arrow.id(),
            relation:? = relation,
            points_count = points.len();
            "Arrow routed",
        );
        points
    }

    fn route_same_lane(&self, arrow: &Arrow) -> Vec<Point> {
        let (source, target) = (&arrow.source_pos, &arrow.target_pos);

        let unobstructed = self.layout.is_immediate_next(&arrow.source, &arrow.target)
            || self
                .layout
                .intermediate_steps(&arrow.source, &arrow.target)
                .is_empty();

        if unobstructed {
            // Leave towards the target, which is usually below.
            let (exit, entry) = if target.y() < source.y() {
                (Side::Top, Side::Bottom)
            } else {
                (Side::Bottom, Side::Top)
            };
            return vec![
                self.exit_point(arrow, exit),
                self.connection_point(arrow.target_kind, target, entry, None),
            ];
        }

        // Detour through the lane margin. A forced right exit uses the
        // right-hand corridor so the route does not cross the source.
        let exit = connection::exit_side(arrow.source_kind, Some(arrow.kind), Side::Left);
        let margin = if exit == Side::Right {
            Side::Right
        } else {
            Side::Left
        };
        let corridor_x = self.corridor_x(source.lane_index(), margin);

        let start = self.exit_point(arrow, Side::Left);
        let stub = start.offset_towards(exit, self.config.stub_length());
        let end = self.connection_point(arrow.target_kind, target, margin, None);
        let entry_stub = end.offset_towards(margin, self.config.stub_length());

        vec![
            start,
            stub,
            Point::new(corridor_x, stub.y()),
            Point::new(corridor_x, end.y()),
            entry_stub,
            end,
        ]
    }

    /// Loops from a step back to itself through the lane corridor, entering
    /// from the top.
    fn route_self_loop(&self, arrow: &Arrow) -> Vec<Point> {
        let exit = connection::exit_side(arrow.source_kind, Some(arrow.kind), Side::Left);
        let margin = if exit == Side::Right {
            Side::Right
        } else {
            Side::Left
        };
        let corridor_x = self.corridor_x(arrow.source_pos.lane_index(), margin);

        let start = self.exit_point(arrow, Side::Left);
        let stub = start.offset_towards(exit, self.config.stub_length());
        let end = self.connection_point(arrow.target_kind, &arrow.target_pos, Side::Top, None);
        let entry_stub = end.offset_towards(Side::Top, self.config.stub_length());

        vec![
            start,
            stub,
            Point::new(corridor_x, stub.y()),
            Point::new(corridor_x, entry_stub.y()),
            entry_stub,
            end,
        ]
    }

    fn route_adjacent_lane(&self, arrow: &Arrow) -> Vec<Point> {
        let (source, target) = (&arrow.source_pos, &arrow.target_pos);
        let towards = Self::direction(source, target);
        let entry = towards.opposite();

        let start = self.exit_point(arrow, towards);
        let end = self.connection_point(arrow.target_kind, target, entry, None);

        if (source.y() - target.y()).abs() <= self.config.same_row_tolerance() {
            return vec![start, end];
        }

        let exit = connection::exit_side(arrow.source_kind, Some(arrow.kind), towards);
        let stub = start.offset_towards(exit, self.config.stub_length());
        let entry_stub = end.offset_towards(entry, self.config.stub_length());
        let mid_x = start.midpoint(end).x();

        vec![
            start,
            stub,
            Point::new(mid_x, stub.y()),
            Point::new(mid_x, end.y()),
            entry_stub,
            end,
        ]
    }

    fn route_distant_lane(&self, arrow: &Arrow) -> Vec<Point> {
        let (source, target) = (&arrow.source_pos, &arrow.target_pos);
        let towards = Self::direction(source, target);
        let entry = towards.opposite();

        let exit = connection::exit_side(arrow.source_kind, Some(arrow.kind), towards);
        let start = self.exit_point(arrow, towards);
        let stub = start.offset_towards(exit, self.config.stub_length());

        // A horizontal exit keeps its side, a bottom exit turns towards the target.
        let source_margin = if exit.is_horizontal() { exit } else { towards };
        let source_corridor = self.corridor_x(source.lane_index(), source_margin);
        let target_corridor = self.corridor_x(target.lane_index(), entry);
        let bypass_y = self.layout.global_max_y() + self.config.bypass_offset();

        let end = self.connection_point(arrow.target_kind, target, entry, None);
        let entry_stub = end.offset_towards(entry, self.config.stub_length());

        vec![
            start,
            stub,
            Point::new(source_corridor, stub.y()),
            Point::new(source_corridor, bypass_y),
            Point::new(target_corridor, bypass_y),
            Point::new(target_corridor, end.y()),
            entry_stub,
            end,
        ]
    }

    fn exit_point(&self, arrow: &Arrow, side: Side) -> Point {
        self.connection_point(arrow.source_kind, &arrow.source_pos, side, Some(arrow.kind))
    }

    /// Returns the x of the corridor along one margin of a lane.
    fn corridor_x(&self, lane: usize, margin: Side) -> f32 {
        let (left, right) = self.layout.lane_x_bounds(lane);
        match margin {
            Side::Right => right - self.config.corridor_offset(),
            _ => left + self.config.corridor_offset(),
        }
    }

    /// Returns the side of `source` that faces the lane of `target`.
    fn direction(source: &NodePosition, target: &NodePosition) -> Side {
        if target.lane_index() > source.lane_index() {
            Side::Right
        } else {
            Side::Left
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use lanewise_core::step::ProcessStep;

    use super::*;
    use crate::layout::LayoutEngine;

    fn route(table: &ProcessTable) -> (Layout, Vec<Arrow>, RoutedPaths, Vec<Diagnostic>) {
        let config = LayoutConfig::default();
        let layout = LayoutEngine::new(&config).calculate_layout(table);
        let mut router = Router::new(&layout, &config);
        let diagnostics = router.extract_arrows(table);
        let paths = router.route_all();
        let arrows = router.into_arrows();
        (layout, arrows, paths, diagnostics)
    }

    fn points(paths: &RoutedPaths, id: &str) -> Vec<(f32, f32)> {
        paths
            .get(id)
            .map(|path| path.iter().map(|p| (p.x(), p.y())).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_same_lane_immediate_next_is_straight() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::Task, "A").with_next("b"),
            ProcessStep::new("b", "", StepKind::Task, "A"),
        ]);
        let (_, arrows, paths, _) = route(&table);

        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].id(), "a_next");
        assert_eq!(points(&paths, "a_next"), vec![(175.0, 170.0), (175.0, 230.0)]);
    }

    #[test]
    fn test_same_lane_with_obstacle_uses_left_corridor() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::Task, "A").with_next("c"),
            ProcessStep::new("b", "", StepKind::Task, "A"),
            ProcessStep::new("c", "", StepKind::Task, "A"),
        ]);
        let (layout, _, paths, _) = route(&table);

        assert_eq!(layout.intermediate_steps("a", "c"), vec!["b"]);
        assert_eq!(
            points(&paths, "a_next"),
            vec![
                (100.0, 130.0),
                (85.0, 130.0),
                (70.0, 130.0),
                (70.0, 410.0),
                (85.0, 410.0),
                (100.0, 410.0),
            ]
        );

        let content_left = layout.slot("b").map(|b| b.min_x()).unwrap_or_default();
        assert!(points(&paths, "a_next").iter().all(|(x, _)| *x <= content_left));
    }

    #[test]
    fn test_same_lane_gateway_yes_uses_right_corridor() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("g", "", StepKind::ExclusiveGateway, "A").with_branches("c", "b"),
            ProcessStep::new("b", "", StepKind::Task, "A").with_next("c"),
            ProcessStep::new("c", "", StepKind::Task, "A"),
        ]);
        let (_, _, paths, _) = route(&table);

        let yes = points(&paths, "g_yes");
        assert_eq!(yes.len(), 6);
        assert_eq!(yes[0], (200.0, 130.0));
        assert_approx_eq!(f32, yes[2].0, 280.0);
        assert_eq!(yes[5], (250.0, 410.0));

        assert_eq!(points(&paths, "g_no"), vec![(175.0, 155.0), (175.0, 230.0)]);
    }

    #[test]
    fn test_adjacent_lane_same_row_is_straight() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::StartEvent, "A").with_next("b"),
            ProcessStep::new("b", "", StepKind::Task, "B"),
        ]);
        let (_, _, paths, _) = route(&table);

        assert_eq!(points(&paths, "a_next"), vec![(193.0, 130.0), (350.0, 130.0)]);
    }

    #[test]
    fn test_adjacent_lane_different_rows_uses_midline() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::Task, "A").with_next("b"),
            ProcessStep::new("b", "", StepKind::Task, "A").with_next("c"),
            ProcessStep::new("c", "", StepKind::Task, "B"),
        ]);
        let (_, _, paths, _) = route(&table);

        let path = points(&paths, "b_next");
        assert_eq!(
            path,
            vec![
                (250.0, 270.0),
                (265.0, 270.0),
                (300.0, 270.0),
                (300.0, 130.0),
                (335.0, 130.0),
                (350.0, 130.0),
            ]
        );
        let midline_segments = path
            .windows(2)
            .filter(|w| w[0].0 == w[1].0 && w[0].0 == 300.0)
            .count();
        assert_eq!(midline_segments, 1);
    }

    #[test]
    fn test_adjacent_lane_leftwards() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("x", "", StepKind::Task, "A"),
            ProcessStep::new("a", "", StepKind::Task, "B").with_next("b"),
            ProcessStep::new("b", "", StepKind::Task, "A"),
        ]);
        let (_, _, paths, _) = route(&table);

        let path = points(&paths, "a_next");
        assert_eq!(path.len(), 6);
        assert_eq!(path[0], (350.0, 130.0));
        assert_eq!(path[1], (335.0, 130.0));
        assert_eq!(path[5], (250.0, 270.0));
    }

    #[test]
    fn test_distant_lane_goes_below_content() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::Task, "A").with_next("b"),
            ProcessStep::new("x", "", StepKind::Task, "B"),
            ProcessStep::new("b", "", StepKind::Task, "C"),
        ]);
        let (layout, _, paths, _) = route(&table);

        let path = points(&paths, "a_next");
        assert_eq!(
            path,
            vec![
                (250.0, 130.0),
                (265.0, 130.0),
                (280.0, 130.0),
                (280.0, 210.0),
                (570.0, 210.0),
                (570.0, 130.0),
                (585.0, 130.0),
                (600.0, 130.0),
            ]
        );
        assert!(path[3].1 >= layout.global_max_y());
        assert!(path[4].1 >= layout.global_max_y());
    }

    #[test]
    fn test_self_loop_goes_around_the_step() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("t", "Retry", StepKind::Task, "A").with_next("t"),
        ]);
        let (layout, arrows, paths, diagnostics) = route(&table);

        assert!(diagnostics.is_empty());
        assert_eq!(arrows.len(), 1);
        let path = points(&paths, "t_next");
        assert_eq!(
            path,
            vec![
                (100.0, 130.0),
                (85.0, 130.0),
                (70.0, 130.0),
                (70.0, 75.0),
                (175.0, 75.0),
                (175.0, 90.0),
            ]
        );

        // Only the end points touch the slot; every bend lies outside it.
        let slot = layout.slot("t").expect("t placed");
        for &(x, y) in &path[1..path.len() - 1] {
            let inside = x > slot.min_x() && x < slot.max_x() && y > slot.min_y() && y < slot.max_y();
            assert!(!inside, "bend ({x}, {y}) inside the step");
        }
    }

    #[test]
    fn test_gateway_no_self_loop_leaves_from_the_bottom() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("g", "Ok?", StepKind::ExclusiveGateway, "A").with_branches("e", "g"),
            ProcessStep::new("e", "", StepKind::EndEvent, "B"),
        ]);
        let (_, _, paths, _) = route(&table);

        assert_eq!(
            points(&paths, "g_no"),
            vec![
                (175.0, 155.0),
                (175.0, 170.0),
                (70.0, 170.0),
                (70.0, 90.0),
                (175.0, 90.0),
                (175.0, 105.0),
            ]
        );
    }

    #[test]
    fn test_distant_lane_uses_configured_bypass_offset() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::Task, "A").with_next("b"),
            ProcessStep::new("x", "", StepKind::Task, "B"),
            ProcessStep::new("b", "", StepKind::Task, "C"),
        ]);
        let config = LayoutConfig::default().with_bypass_offset(100.0);
        let layout = LayoutEngine::new(&config).calculate_layout(&table);
        let mut router = Router::new(&layout, &config);
        router.extract_arrows(&table);
        let paths = router.route_all();

        let path = points(&paths, "a_next");
        assert_eq!(path.len(), 8);
        assert_approx_eq!(f32, path[3].1, 270.0);
        assert_approx_eq!(f32, path[4].1, 270.0);
    }

    #[test]
    fn test_gateway_branches_have_fixed_exits() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("left", "", StepKind::Task, "A"),
            ProcessStep::new("g", "", StepKind::ExclusiveGateway, "B").with_branches("left", "down"),
            ProcessStep::new("down", "", StepKind::Task, "B"),
        ]);
        let (_, arrows, paths, _) = route(&table);

        let ids: Vec<&str> = arrows.iter().map(Arrow::id).collect();
        assert_eq!(ids, vec!["g_yes", "g_no"]);

        // Gateway slot: (350, 90), diamond centered at (425, 130).
        assert_eq!(points(&paths, "g_yes")[0], (450.0, 130.0));
        assert_eq!(points(&paths, "g_no")[0], (425.0, 155.0));
    }

    #[test]
    fn test_dangling_transitions_are_reported() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::Task, "A").with_next("ghost"),
            ProcessStep::new("b", "", StepKind::Task, "A"),
        ]);
        let (_, arrows, paths, diagnostics) = route(&table);

        assert!(arrows.is_empty());
        assert!(paths.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(DiagnosticCode::W100));
        assert_eq!(diagnostics[0].step(), Some("a"));
    }

    #[test]
    fn test_dangling_reports_match_the_process_graph() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("g", "", StepKind::ExclusiveGateway, "A").with_branches("b", "nowhere"),
            ProcessStep::new("b", "", StepKind::Task, "A"),
            // Shadowed duplicate: never positioned, so never reported.
            ProcessStep::new("b", "", StepKind::Task, "A").with_next("ghost"),
        ]);
        let graph = ProcessGraph::from_table(&table);
        let (_, arrows, _, diagnostics) = route(&table);

        assert_eq!(graph.dangling().len(), 1);
        assert_eq!(diagnostics.len(), graph.dangling().len());
        assert_eq!(diagnostics[0].step(), Some("g"));
        assert!(diagnostics[0].message().contains("`nowhere`"));
        assert!(diagnostics[0].message().contains("no transition"));
        let ids: Vec<&str> = arrows.iter().map(Arrow::id).collect();
        assert_eq!(ids, vec!["g_yes"]);
    }

    #[test]
    fn test_lane_relation() {
        assert_eq!(LaneRelation::between(2, 2), LaneRelation::Same);
        assert_eq!(LaneRelation::between(2, 1), LaneRelation::Adjacent);
        assert_eq!(LaneRelation::between(0, 3), LaneRelation::Distant);
    }
}

#[cfg(test)]
mod proptest_tests {
    use lanewise_core::step::ProcessStep;
    use proptest::prelude::*;

    use super::*;
    use crate::layout::LayoutEngine;

    const ACTORS: [&str; 4] = ["A", "B", "C", "D"];

    fn table_strategy() -> impl Strategy<Value = ProcessTable> {
        (2usize..10).prop_flat_map(|n| {
            prop::collection::vec(
                (
                    0usize..4,
                    0usize..ACTORS.len(),
                    prop::option::of(0usize..n),
                    prop::option::of(0usize..n),
                ),
                n,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (kind, actor, yes, no))| {
                        let kind = [
                            StepKind::StartEvent,
                            StepKind::Task,
                            StepKind::ExclusiveGateway,
                            StepKind::EndEvent,
                        ][kind];
                        let mut step = ProcessStep::new(format!("s{i}"), "", kind, ACTORS[actor]);
                        // Self-loops are not meaningful transitions.
                        if let Some(yes) = yes.filter(|&t| t != i) {
                            step = step.with_next(format!("s{yes}"));
                        }
                        if let Some(no) = no.filter(|&t| t != i) {
                            step = step.with_next_on_no(format!("s{no}"));
                        }
                        step
                    })
                    .collect()
            })
        })
    }

    proptest! {
        #[test]
        fn every_arrow_has_a_path(table in table_strategy()) {
            let config = LayoutConfig::default();
            let layout = LayoutEngine::new(&config).calculate_layout(&table);
            let mut router = Router::new(&layout, &config);
            router.extract_arrows(&table);
            let paths = router.route_all();

            prop_assert_eq!(paths.len(), router.arrows().len());
            for arrow in router.arrows() {
                let path = paths.get(arrow.id()).expect("path exists");
                let expected = match arrow.lane_relation() {
                    LaneRelation::Same | LaneRelation::Adjacent => [2, 6],
                    LaneRelation::Distant => [8, 8],
                };
                prop_assert!(expected.contains(&path.len()), "{} has {} points", arrow.id(), path.len());
            }
        }

        #[test]
        fn paths_end_on_the_target_shape(table in table_strategy()) {
            let config = LayoutConfig::default();
            let layout = LayoutEngine::new(&config).calculate_layout(&table);
            let mut router = Router::new(&layout, &config);
            router.extract_arrows(&table);
            let paths = router.route_all();

            for arrow in router.arrows() {
                let path = &paths[arrow.id()];
                let last = path[path.len() - 1];
                let target = connection::shape_bounds(
                    arrow.target_kind(),
                    arrow.target_pos().slot(&config),
                    &config,
                );
                prop_assert!(last.x() >= target.min_x() - 0.01 && last.x() <= target.max_x() + 0.01);
                prop_assert!(last.y() >= target.min_y() - 0.01 && last.y() <= target.max_y() + 0.01);
            }
        }

        #[test]
        fn routing_is_deterministic(table in table_strategy()) {
            let config = LayoutConfig::default();
            let layout = LayoutEngine::new(&config).calculate_layout(&table);
            let mut router = Router::new(&layout, &config);
            router.extract_arrows(&table);
            prop_assert_eq!(router.route_all(), router.route_all());
        }
    }
}
