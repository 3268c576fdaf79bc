//! Configuration types for Lanewise diagram generation.
//!
//! This module provides configuration structures that control how process
//! tables are laid out and exported. All types implement
//! [`serde::Deserialize`] with per-field defaults, so a configuration file
//! only needs to name the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and export settings.
//! - [`LayoutConfig`] - Geometry of lanes, step slots, shapes and routing corridors.
//! - [`ExportConfig`] - Naming used in the generated BPMN document.
//!
//! # Example
//!
//! ```
//! # use lanewise::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().lane_width(), 250.0);
//! assert_eq!(config.export().yes_label(), "Yes");
//! ```

use serde::Deserialize;

/// Top-level configuration combining layout and export settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and export configurations.
    pub fn new(layout: LayoutConfig, export: ExportConfig) -> Self {
        Self { layout, export }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Geometry used by the layout engine and the router.
///
/// Every value is in diagram units (pixels).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of one actor lane column.
    lane_width: f32,
    /// Width of the slot a step occupies inside its lane.
    node_width: f32,
    /// Height of the slot a step occupies inside its lane.
    node_height: f32,
    /// Base vertical gap between consecutive slots of a lane.
    vertical_spacing: f32,
    /// Factor applied to `vertical_spacing`.
    spacing_multiplier: f32,
    /// Side of the square a gateway diamond is inscribed in.
    gateway_size: f32,
    /// Diameter of start and end event circles.
    event_size: f32,
    /// Distance of a lane's routing corridor from the lane edge.
    corridor_offset: f32,
    /// Distance of the distant-lane corridor below all content.
    bypass_offset: f32,
    /// Left margin before the first lane.
    margin_left: f32,
    /// Top margin above the lane headers.
    margin_top: f32,
    /// Height reserved for the lane header.
    lane_label_offset: f32,
    /// Length of the straight segment leaving or entering a shape.
    stub_length: f32,
    /// Vertical distance under which two steps count as the same row.
    same_row_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_width: 250.0,
            node_width: 150.0,
            node_height: 80.0,
            vertical_spacing: 60.0,
            spacing_multiplier: 1.0,
            gateway_size: 50.0,
            event_size: 36.0,
            corridor_offset: 20.0,
            bypass_offset: 40.0,
            margin_left: 50.0,
            margin_top: 50.0,
            lane_label_offset: 40.0,
            stub_length: 15.0,
            same_row_tolerance: 50.0,
        }
    }
}

impl LayoutConfig {
    pub fn lane_width(&self) -> f32 {
        self.lane_width
    }

    pub fn node_width(&self) -> f32 {
        self.node_width
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn spacing_multiplier(&self) -> f32 {
        self.spacing_multiplier
    }

    pub fn gateway_size(&self) -> f32 {
        self.gateway_size
    }

    pub fn event_size(&self) -> f32 {
        self.event_size
    }

    pub fn corridor_offset(&self) -> f32 {
        self.corridor_offset
    }

    pub fn bypass_offset(&self) -> f32 {
        self.bypass_offset
    }

    pub fn margin_left(&self) -> f32 {
        self.margin_left
    }

    pub fn margin_top(&self) -> f32 {
        self.margin_top
    }

    pub fn lane_label_offset(&self) -> f32 {
        self.lane_label_offset
    }

    pub fn stub_length(&self) -> f32 {
        self.stub_length
    }

    pub fn same_row_tolerance(&self) -> f32 {
        self.same_row_tolerance
    }

    /// Vertical distance between the tops of two consecutive slots in a lane.
    pub fn row_pitch(&self) -> f32 {
        self.node_height + self.vertical_spacing * self.spacing_multiplier
    }

    /// Free horizontal space between a lane edge and the slots inside it.
    pub fn lane_gutter(&self) -> f32 {
        (self.lane_width - self.node_width) / 2.0
    }

    /// Describes settings that make routes run through shapes.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.node_width > self.lane_width {
            issues.push(format!(
                "node_width ({}) exceeds lane_width ({}); slots of adjacent lanes overlap",
                self.node_width, self.lane_width
            ));
        }
        if self.corridor_offset >= self.lane_gutter() {
            issues.push(format!(
                "corridor_offset ({}) is not inside the lane gutter ({}); bypass routes touch steps",
                self.corridor_offset,
                self.lane_gutter()
            ));
        }
        issues
    }

    pub fn with_lane_width(mut self, lane_width: f32) -> Self {
        self.lane_width = lane_width;
        self
    }

    pub fn with_node_size(mut self, width: f32, height: f32) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    pub fn with_vertical_spacing(mut self, spacing: f32, multiplier: f32) -> Self {
        self.vertical_spacing = spacing;
        self.spacing_multiplier = multiplier;
        self
    }

    pub fn with_corridor_offset(mut self, offset: f32) -> Self {
        self.corridor_offset = offset;
        self
    }

    pub fn with_bypass_offset(mut self, offset: f32) -> Self {
        self.bypass_offset = offset;
        self
    }
}

/// Naming used in the generated BPMN document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Id of the generated `bpmn:process`.
    process_id: String,
    /// Name of the process and of its pool.
    process_name: String,
    /// Name given to the "yes" flow of a gateway.
    yes_label: String,
    /// Name given to the "no" flow of a gateway.
    no_label: String,
    /// Horizontal gap between a step and its tool annotation.
    annotation_gap: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            process_id: "Process_1".to_string(),
            process_name: "Process".to_string(),
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
            annotation_gap: 30.0,
        }
    }
}

impl ExportConfig {
    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn yes_label(&self) -> &str {
        &self.yes_label
    }

    pub fn no_label(&self) -> &str {
        &self.no_label
    }

    pub fn annotation_gap(&self) -> f32 {
        self.annotation_gap
    }

    pub fn with_process(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.process_id = id.into();
        self.process_name = name.into();
        self
    }

    pub fn with_branch_labels(mut self, yes: impl Into<String>, no: impl Into<String>) -> Self {
        self.yes_label = yes.into();
        self.no_label = no.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_layout_is_consistent() {
        let config = LayoutConfig::default();
        assert!(config.inconsistencies().is_empty());
        assert_approx_eq!(f32, config.row_pitch(), 140.0);
        assert_approx_eq!(f32, config.lane_gutter(), 50.0);
    }

    #[test]
    fn test_inconsistencies_reported() {
        let config = LayoutConfig::default()
            .with_lane_width(120.0)
            .with_corridor_offset(40.0);

        let issues = config.inconsistencies();
        assert_eq!(issues.len(), 2, "Unexpected issues: {issues:?}");
    }

    #[test]
    fn test_row_pitch_uses_multiplier() {
        let config = LayoutConfig::default().with_vertical_spacing(40.0, 1.5);
        assert_approx_eq!(f32, config.row_pitch(), 80.0 + 60.0);
    }

    #[test]
    fn test_export_builders() {
        let config = ExportConfig::default()
            .with_process("P", "Onboarding")
            .with_branch_labels("Oui", "Non");

        assert_eq!(config.process_id(), "P");
        assert_eq!(config.process_name(), "Onboarding");
        assert_eq!(config.yes_label(), "Oui");
        assert_eq!(config.no_label(), "Non");
    }
}
