//! Shape-aware connection points.
//!
//! Every step occupies a slot, but only part of the slot is drawn: events are
//! circles of `event_size` and gateways are diamonds inscribed in a
//! `gateway_size` square, both centered in the slot. Tasks fill the slot.
//! Connections attach to the midpoint of a side of the drawn shape, which for
//! a circle or diamond is the extreme point in that direction.

use lanewise_core::{
    geometry::{Bounds, Point, Side, Size},
    step::{FlowKind, StepKind},
};

use crate::config::LayoutConfig;

/// Returns the bounding box of the shape drawn for a step of `kind` in `slot`.
pub fn shape_bounds(kind: StepKind, slot: Bounds, config: &LayoutConfig) -> Bounds {
    match kind {
        StepKind::StartEvent | StepKind::EndEvent => {
            Bounds::new_from_center(slot.center(), Size::square(config.event_size()))
        }
        StepKind::ExclusiveGateway => {
            Bounds::new_from_center(slot.center(), Size::square(config.gateway_size()))
        }
        StepKind::Task => slot,
    }
}

/// Returns the side a flow actually leaves a step from.
///
/// Gateway branches have fixed exits: "yes" leaves right and "no" leaves
/// from the bottom, whatever side the route would otherwise use.
pub fn exit_side(kind: StepKind, flow: Option<FlowKind>, preferred: Side) -> Side {
    match (kind, flow) {
        (StepKind::ExclusiveGateway, Some(FlowKind::Yes)) => Side::Right,
        (StepKind::ExclusiveGateway, Some(FlowKind::No)) => Side::Bottom,
        _ => preferred,
    }
}

/// Returns the point where a connection attaches to a step.
///
/// `exit_flow` is set when the step is the source of the connection, so
/// gateway exit overrides apply to the source end only.
pub fn connection_point(
    kind: StepKind,
    slot: Bounds,
    side: Side,
    exit_flow: Option<FlowKind>,
    config: &LayoutConfig,
) -> Point {
    let side = exit_side(kind, exit_flow, side);
    shape_bounds(kind, slot, config).side_midpoint(side)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn slot() -> Bounds {
        Bounds::new_from_top_left(Point::new(100.0, 90.0), Size::new(150.0, 80.0))
    }

    #[test]
    fn test_task_uses_full_slot() {
        let config = LayoutConfig::default();
        let p = connection_point(StepKind::Task, slot(), Side::Left, None, &config);
        assert_eq!(p, Point::new(100.0, 130.0));
    }

    #[test]
    fn test_event_uses_centered_circle() {
        let config = LayoutConfig::default();
        let top = connection_point(StepKind::StartEvent, slot(), Side::Top, None, &config);
        let right = connection_point(StepKind::EndEvent, slot(), Side::Right, None, &config);

        assert_approx_eq!(f32, top.x(), 175.0);
        assert_approx_eq!(f32, top.y(), 112.0);
        assert_approx_eq!(f32, right.x(), 193.0);
        assert_approx_eq!(f32, right.y(), 130.0);
    }

    #[test]
    fn test_gateway_exit_overrides() {
        let config = LayoutConfig::default();
        let gateway = StepKind::ExclusiveGateway;

        let yes = connection_point(gateway, slot(), Side::Left, Some(FlowKind::Yes), &config);
        let no = connection_point(gateway, slot(), Side::Right, Some(FlowKind::No), &config);
        // Entering a gateway is not overridden.
        let entry = connection_point(gateway, slot(), Side::Left, None, &config);

        assert_eq!(yes, Point::new(200.0, 130.0));
        assert_eq!(no, Point::new(175.0, 155.0));
        assert_eq!(entry, Point::new(150.0, 130.0));
    }

    #[test]
    fn test_exit_side_ignores_non_gateways() {
        assert_eq!(
            exit_side(StepKind::Task, Some(FlowKind::Next), Side::Left),
            Side::Left
        );
        assert_eq!(
            exit_side(StepKind::ExclusiveGateway, Some(FlowKind::No), Side::Left),
            Side::Bottom
        );
    }
}
