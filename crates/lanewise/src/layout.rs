//! Swim-lane layout.
//!
//! Every actor of a process table owns one vertical lane; lanes are laid out
//! left to right in the order their actors first appear. Inside a lane, steps
//! are stacked top to bottom by topological layer, independently of the other
//! lanes. [`LayoutEngine`] computes the placement and returns a [`Layout`],
//! which also answers the lane-local questions the router asks.

mod engine;

pub use engine::LayoutEngine;

use indexmap::IndexMap;
use serde::Serialize;

use lanewise_core::geometry::{Bounds, Point, Size};

use crate::config::LayoutConfig;

/// The computed placement of a single step.
///
/// `(x, y)` is the top-left corner of the step's slot, a
/// `node_width × node_height` box centered horizontally in its lane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    x: f32,
    y: f32,
    layer: usize,
    lane_index: usize,
    actor: String,
}

impl NodePosition {
    pub(crate) fn new(x: f32, y: f32, layer: usize, lane_index: usize, actor: &str) -> Self {
        Self {
            x,
            y,
            layer,
            lane_index,
            actor: actor.to_string(),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn lane_index(&self) -> usize {
        self.lane_index
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Returns the top-left corner of the slot.
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the slot occupied by the step.
    pub fn slot(&self, config: &LayoutConfig) -> Bounds {
        Bounds::new_from_top_left(
            self.top_left(),
            Size::new(config.node_width(), config.node_height()),
        )
    }

    pub(crate) fn shift_down(&mut self, distance: f32) {
        self.y += distance;
    }
}

/// The result of [`LayoutEngine::calculate_layout`].
///
/// Positions are keyed by step id and iterate in table order.
#[derive(Debug, Clone)]
pub struct Layout {
    positions: IndexMap<String, NodePosition>,
    lanes: Vec<String>,
    config: LayoutConfig,
}

impl Layout {
    pub(crate) fn new(
        positions: IndexMap<String, NodePosition>,
        lanes: Vec<String>,
        config: LayoutConfig,
    ) -> Self {
        Self {
            positions,
            lanes,
            config,
        }
    }

    pub fn positions(&self) -> &IndexMap<String, NodePosition> {
        &self.positions
    }

    pub fn position(&self, id: &str) -> Option<&NodePosition> {
        self.positions.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the actor names in lane order.
    pub fn lanes(&self) -> &[String] {
        &self.lanes
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Returns the slot occupied by a step.
    pub fn slot(&self, id: &str) -> Option<Bounds> {
        self.position(id).map(|pos| pos.slot(&self.config))
    }

    /// Returns the ids of the steps in a lane, top to bottom.
    pub fn steps_in_lane(&self, lane_index: usize) -> Vec<&str> {
        let mut steps: Vec<(&str, &NodePosition)> = self
            .positions
            .iter()
            .filter(|(_, pos)| pos.lane_index == lane_index)
            .map(|(id, pos)| (id.as_str(), pos))
            .collect();

        steps.sort_by(|(a_id, a), (b_id, b)| a.y.total_cmp(&b.y).then_with(|| a_id.cmp(b_id)));
        steps.into_iter().map(|(id, _)| id).collect()
    }

    /// Returns true if both steps share a lane and `target` is directly below `source`.
    pub fn is_immediate_next(&self, source: &str, target: &str) -> bool {
        self.lane_indices(source, target)
            .is_some_and(|(_, source_idx, target_idx)| target_idx == source_idx + 1)
    }

    /// Returns the ids of the steps strictly between `source` and `target` in their lane.
    ///
    /// Empty when the steps are in different lanes or next to each other.
    /// Works in both directions; the result is ordered top to bottom.
    pub fn intermediate_steps(&self, source: &str, target: &str) -> Vec<&str> {
        let Some((lane, source_idx, target_idx)) = self.lane_indices(source, target) else {
            return Vec::new();
        };

        let (low, high) = if source_idx < target_idx {
            (source_idx, target_idx)
        } else {
            (target_idx, source_idx)
        };
        if high - low <= 1 {
            return Vec::new();
        }

        self.steps_in_lane(lane)[low + 1..high].to_vec()
    }

    /// Returns the top of the first slot and the bottom of the last slot of a lane.
    pub fn lane_y_bounds(&self, lane_index: usize) -> Option<(f32, f32)> {
        let node_height = self.config.node_height();
        self.positions
            .values()
            .filter(|pos| pos.lane_index == lane_index)
            .fold(None, |acc, pos| {
                let (top, bottom) = (pos.y, pos.y + node_height);
                Some(match acc {
                    None => (top, bottom),
                    Some((min, max)) => (f32::min(min, top), f32::max(max, bottom)),
                })
            })
    }

    /// Returns the lowest slot bottom over all lanes.
    ///
    /// For an empty layout this is the top margin.
    pub fn global_max_y(&self) -> f32 {
        (0..self.lane_count())
            .filter_map(|lane| self.lane_y_bounds(lane))
            .map(|(_, bottom)| bottom)
            .fold(self.config.margin_top(), f32::max)
    }

    /// Returns the left and right edges of a lane.
    pub fn lane_x_bounds(&self, lane_index: usize) -> (f32, f32) {
        let left = self.config.margin_left() + lane_index as f32 * self.config.lane_width();
        (left, left + self.config.lane_width())
    }

    /// Returns the area covered by all lanes and slots, from the top margin down to
    /// below the distant-lane routing corridor.
    pub fn diagram_bounds(&self) -> Bounds {
        let (left, _) = self.lane_x_bounds(0);
        let width = self.lane_count() as f32 * self.config.lane_width();
        let bottom = self.global_max_y() + 2.0 * self.config.bypass_offset();
        let top = self.config.margin_top();

        let lanes = Bounds::new_from_top_left(Point::new(left, top), Size::new(width, bottom - top));
        // Slots wider than their lane spill past the lane columns.
        self.positions
            .values()
            .map(|pos| pos.slot(&self.config))
            .fold(lanes, |acc, slot| acc.merge(&slot))
    }

    /// Resolves both steps to `(lane, index in lane, index in lane)` if they share a lane.
    fn lane_indices(&self, source: &str, target: &str) -> Option<(usize, usize, usize)> {
        let source_lane = self.position(source)?.lane_index;
        let target_lane = self.position(target)?.lane_index;
        if source_lane != target_lane {
            return None;
        }

        let steps = self.steps_in_lane(source_lane);
        let source_idx = steps.iter().position(|id| *id == source)?;
        let target_idx = steps.iter().position(|id| *id == target)?;
        Some((source_lane, source_idx, target_idx))
    }
}
