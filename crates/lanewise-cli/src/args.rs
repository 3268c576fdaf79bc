//! Command-line argument definitions for the Lanewise CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input table, the BPMN output path,
//! the optional SVG and JSON side outputs, configuration file selection and
//! logging verbosity.

use clap::Parser;

/// Command-line arguments for the Lanewise layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input process table (JSON)
    #[arg(help = "Path to the input process table")]
    pub input: String,

    /// Path to the output BPMN file
    #[arg(short, long, default_value = "out.bpmn")]
    pub output: String,

    /// Also write an SVG preview to this path
    #[arg(long)]
    pub svg: Option<String>,

    /// Also write the computed positions and paths as JSON to this path
    #[arg(long)]
    pub json: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
