//! Lane-wise layered layout engine.
//!
//! The layout is computed in five stages:
//!
//! 1. **Initialize**: assign every actor a lane in first-seen order
//! 2. **Layer**: longest-path layering seeded from start events
//! 3. **Order**: group steps by layer and order each group by `(lane, id)`
//! 4. **Position**: pack every lane densely from the top, one row per step
//! 5. **Resolve overlaps**: push down slots that collide across lanes
//!
//! Stage 4 is what keeps lanes compact. A lane's row counter only advances
//! when one of its own steps is placed, so long processes in one lane never
//! leave gaps in another.

use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};

use lanewise_core::step::{ProcessStep, ProcessTable, StepKind};

use super::{Layout, NodePosition};
use crate::{config::LayoutConfig, graph::ProcessGraph};

/// Computes [`Layout`]s from process tables.
pub struct LayoutEngine<'c> {
    config: &'c LayoutConfig,
}

impl<'c> LayoutEngine<'c> {
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self { config }
    }

    /// Computes the position of every step.
    ///
    /// The computation is total: dangling references, cycles and missing
    /// start events still produce a layout. When several rows share an id,
    /// only the first one is placed.
    pub fn calculate_layout(&self, table: &ProcessTable) -> Layout {
        let mut state = LayoutState::new(table);

        state.assign_layers();
        let rows = state.order_layers();
        let mut positions = self.calculate_positions(&state, &rows);
        self.resolve_overlaps(&mut positions);

        // Report positions in table order.
        let positions: IndexMap<String, NodePosition> = state
            .placed_steps()
            .filter_map(|step| {
                positions
                    .remove(step.id())
                    .map(|pos| (step.id().to_string(), pos))
            })
            .collect();

        let lanes: Vec<String> = state.lanes.iter().map(|actor| actor.to_string()).collect();

        debug!(
            steps_count = positions.len(),
            lanes_count = lanes.len(),
            layers_count = rows.len();
            "Layout calculated",
        );

        Layout::new(positions, lanes, self.config.clone())
    }

    fn calculate_positions<'a>(
        &self,
        state: &LayoutState<'a>,
        rows: &BTreeMap<usize, Vec<&'a ProcessStep>>,
    ) -> HashMap<&'a str, NodePosition> {
        let top = self.config.margin_top() + self.config.lane_label_offset();
        let pitch = self.config.row_pitch();

        let mut lane_progress = vec![0usize; state.lanes.len()];
        let mut positions = HashMap::with_capacity(state.layers.len());

        for (&layer, steps) in rows {
            for step in steps {
                let lane = state.lane_of(step);
                let progress = lane_progress[lane];
                lane_progress[lane] += 1;

                let x = self.config.margin_left()
                    + lane as f32 * self.config.lane_width()
                    + self.config.lane_gutter();
                let y = top + progress as f32 * pitch;

                trace!(step = step.id(), layer, lane, progress; "Step placed");
                positions.insert(
                    step.id(),
                    NodePosition::new(x, y, layer, lane, step.actor()),
                );
            }
        }

        positions
    }

    /// Shifts steps down until no two slots of different lanes overlap.
    ///
    /// Slots of distinct lanes only collide when `node_width` exceeds
    /// `lane_width`. The step in the right-hand lane moves, together with
    /// every step below it in that lane, so lane order is kept.
    fn resolve_overlaps(&self, positions: &mut HashMap<&str, NodePosition>) {
        let pitch = self.config.row_pitch();
        let max_rounds = positions.len() * positions.len() + 1;

        for _ in 0..max_rounds {
            let Some((lane, y)) = self.find_overlap(positions) else {
                return;
            };

            for pos in positions.values_mut() {
                if pos.lane_index() == lane && pos.y() >= y {
                    pos.shift_down(pitch);
                }
            }
            debug!(lane, y; "Resolved slot overlap");
        }

        warn!(
            steps_count = positions.len();
            "Slot overlaps remain after the maximum number of resolution rounds",
        );
    }

    /// Returns the lane and top of the lower-priority slot of the first overlapping pair.
    fn find_overlap(&self, positions: &HashMap<&str, NodePosition>) -> Option<(usize, f32)> {
        let mut slots: Vec<&NodePosition> = positions.values().collect();
        slots.sort_by(|a, b| {
            a.lane_index()
                .cmp(&b.lane_index())
                .then_with(|| a.y().total_cmp(&b.y()))
        });

        for (i, a) in slots.iter().enumerate() {
            let a_slot = a.slot(self.config);
            for b in &slots[i + 1..] {
                if b.lane_index() != a.lane_index() && a_slot.intersects(&b.slot(self.config)) {
                    return Some((b.lane_index(), b.y()));
                }
            }
        }
        None
    }
}

/// Scratch state of one layout computation.
struct LayoutState<'a> {
    table: &'a ProcessTable,
    graph: ProcessGraph<'a>,
    lanes: IndexSet<&'a str>,
    layers: HashMap<&'a str, usize>,
    max_layer: usize,
}

impl<'a> LayoutState<'a> {
    fn new(table: &'a ProcessTable) -> Self {
        let graph = ProcessGraph::from_table(table);
        let lanes = table.steps().iter().map(ProcessStep::actor).collect();

        Self {
            table,
            graph,
            lanes,
            layers: HashMap::with_capacity(table.len()),
            max_layer: table.len().saturating_sub(1),
        }
    }

    /// Steps that own their id (the first row of any duplicated id).
    fn placed_steps(&self) -> impl Iterator<Item = &'a ProcessStep> + '_ {
        self.table
            .steps()
            .iter()
            .filter(|step| self.graph.step(step.id()).is_some_and(|s| std::ptr::eq(s, *step)))
    }

    fn lane_of(&self, step: &ProcessStep) -> usize {
        self.lanes.get_index_of(step.actor()).unwrap_or_default()
    }

    /// Assigns every step the length of the longest path reaching it.
    ///
    /// Propagation starts at every start event, then at every step still
    /// unlayered, both in table order. End events are sinks. Transitions that
    /// close a cycle on the current path are skipped, and layers never exceed
    /// `n - 1`.
    fn assign_layers(&mut self) {
        let steps: Vec<&'a ProcessStep> = self.placed_steps().collect();

        for &step in steps.iter().filter(|s| s.kind() == StepKind::StartEvent) {
            self.propagate(step);
        }

        for &step in &steps {
            if !self.layers.contains_key(step.id()) {
                trace!(step = step.id(); "Seeding unlayered step");
                self.propagate(step);
            }
        }
    }

    fn propagate(&mut self, seed: &'a ProcessStep) {
        if self.layers.contains_key(seed.id()) {
            return;
        }
        let mut on_path = HashSet::new();
        self.visit(seed, 0, &mut on_path);
    }

    fn visit(&mut self, step: &'a ProcessStep, layer: usize, on_path: &mut HashSet<&'a str>) {
        let layer = layer.min(self.max_layer);
        if self.layers.get(step.id()).is_some_and(|&existing| existing >= layer) {
            return;
        }
        self.layers.insert(step.id(), layer);

        if step.kind() == StepKind::EndEvent {
            return;
        }

        on_path.insert(step.id());
        let successors: Vec<&'a ProcessStep> = self.graph.successors(step).collect();
        for next in successors {
            if on_path.contains(next.id()) {
                trace!(source = step.id(), back_to = next.id(); "Skipping cycle edge");
                continue;
            }
            self.visit(next, layer + 1, on_path);
        }
        on_path.remove(step.id());
    }

    /// Groups steps by layer, each group ordered by `(lane, id)`.
    fn order_layers(&self) -> BTreeMap<usize, Vec<&'a ProcessStep>> {
        let mut rows: BTreeMap<usize, Vec<&'a ProcessStep>> = BTreeMap::new();
        for step in self.placed_steps() {
            let layer = self.layers.get(step.id()).copied().unwrap_or_default();
            rows.entry(layer).or_default().push(step);
        }

        for steps in rows.values_mut() {
            steps.sort_by(|a, b| {
                self.lane_of(a)
                    .cmp(&self.lane_of(b))
                    .then_with(|| a.id().cmp(b.id()))
            });
        }
        rows
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    const ACTORS: [&str; 3] = ["A", "B", "C"];

    /// Random tables with arbitrary (possibly cyclic or dangling) successors.
    fn table_strategy() -> impl Strategy<Value = ProcessTable> {
        (1usize..12).prop_flat_map(|n| {
            prop::collection::vec(
                (
                    0usize..4,
                    0usize..ACTORS.len(),
                    prop::option::of(0usize..n + 2),
                    prop::option::of(0usize..n + 2),
                ),
                n,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (kind, actor, yes, no))| {
                        let kind = match kind {
                            0 => StepKind::StartEvent,
                            1 => StepKind::Task,
                            2 => StepKind::ExclusiveGateway,
                            _ => StepKind::EndEvent,
                        };
                        let mut step = ProcessStep::new(format!("s{i}"), "", kind, ACTORS[actor]);
                        if let Some(yes) = yes {
                            step = step.with_next(format!("s{yes}"));
                        }
                        if let Some(no) = no {
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
        fn every_step_is_placed_in_its_actor_lane(table in table_strategy()) {
            let config = LayoutConfig::default();
            let layout = LayoutEngine::new(&config).calculate_layout(&table);
            let actors = table.actors();

            prop_assert_eq!(layout.positions().len(), table.len());
            for step in table.steps() {
                let pos = layout.position(step.id()).expect("placed");
                prop_assert_eq!(pos.lane_index(), actors.iter().position(|a| *a == step.actor()).unwrap_or_default());
                prop_assert!(pos.layer() < table.len());
            }
        }

        #[test]
        fn lanes_are_packed_without_gaps(table in table_strategy()) {
            let config = LayoutConfig::default();
            let layout = LayoutEngine::new(&config).calculate_layout(&table);
            let top = config.margin_top() + config.lane_label_offset();

            for lane in 0..layout.lane_count() {
                for (row, id) in layout.steps_in_lane(lane).iter().enumerate() {
                    let y = layout.position(id).map(NodePosition::y).unwrap_or_default();
                    let expected = top + row as f32 * config.row_pitch();
                    prop_assert!((y - expected).abs() < 0.01, "{} at {} expected {}", id, y, expected);
                }
            }
        }

        #[test]
        fn layout_is_deterministic(table in table_strategy()) {
            let config = LayoutConfig::default();
            let engine = LayoutEngine::new(&config);
            let first = engine.calculate_layout(&table);
            let second = engine.calculate_layout(&table);
            prop_assert_eq!(first.positions(), second.positions());
        }

        #[test]
        fn lane_order_follows_layer_then_id(table in table_strategy()) {
            let config = LayoutConfig::default();
            let layout = LayoutEngine::new(&config).calculate_layout(&table);

            for lane in 0..layout.lane_count() {
                let keys: Vec<(usize, &str)> = layout
                    .steps_in_lane(lane)
                    .into_iter()
                    .filter_map(|id| layout.position(id).map(|pos| (pos.layer(), id)))
                    .collect();
                prop_assert!(keys.windows(2).all(|w| w[0] < w[1]), "lane {} out of order: {:?}", lane, keys);
            }
        }
    }
}
