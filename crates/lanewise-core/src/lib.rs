//! Lanewise Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Lanewise layout
//! pipeline. It includes:
//!
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Process table**: Steps, step kinds and transitions ([`step`] module)
//! - **Diagnostics**: Warnings and errors about a table ([`diagnostic`] module)

pub mod diagnostic;
pub mod geometry;
pub mod step;
