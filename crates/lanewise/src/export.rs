//! Output formats for laid-out and routed process tables.
//!
//! - [`bpmn`] writes BPMN 2.0 XML with diagram interchange coordinates.
//! - [`svg`] renders a standalone preview image.

pub mod bpmn;
pub mod svg;

use std::{fmt, io};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] fmt::Error),
}

/// Rounds a coordinate to whole diagram units.
///
/// Diagram interchange coordinates are emitted as integers.
pub(crate) fn coord(value: f32) -> i64 {
    value.round() as i64
}
