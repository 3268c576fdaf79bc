//! Error types for Lanewise operations.
//!
//! This module provides the main error type [`LanewiseError`] which wraps
//! the conditions that stop diagram generation. Problems that do not stop
//! generation are reported as warnings through
//! [`Diagnostic`](lanewise_core::diagnostic::Diagnostic) values instead.

use std::io;

use thiserror::Error;

use lanewise_core::diagnostic::Diagnostic;

/// The main error type for Lanewise operations.
#[derive(Debug, Error)]
pub enum LanewiseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid process table: {0}")]
    Table(#[from] serde_json::Error),

    #[error("Nothing to lay out: the process table is empty")]
    EmptyTable,

    #[error("{}", summarize(.0))]
    InvalidTable(Vec<Diagnostic>),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for LanewiseError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl LanewiseError {
    /// Returns the diagnostics carried by an [`LanewiseError::InvalidTable`] error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::InvalidTable(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "invalid process table".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}
