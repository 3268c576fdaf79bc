//! CLI logic for the Lanewise layout tool.
//!
//! Reads a JSON process table, runs the [`Generator`] pipeline and writes
//! the BPMN document, plus an optional SVG preview and JSON layout dump.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use lanewise::{Generator, LanewiseError};

/// Run the Lanewise CLI application
///
/// # Errors
///
/// Returns `LanewiseError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Table decoding and validation errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), LanewiseError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing process table"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let generator = Generator::new(app_config);
    let table = generator.parse_table(&source)?;
    let generated = generator.generate(&table)?;

    for diagnostic in generated.diagnostics() {
        warn!(
            code:? = diagnostic.code(),
            step = diagnostic.step().unwrap_or_default();
            "{}", diagnostic.message()
        );
    }

    fs::write(&args.output, generated.xml())?;
    info!(output_file = args.output; "BPMN exported successfully");

    if let Some(svg_path) = &args.svg {
        let svg = generator.render_svg(&generated)?;
        fs::write(svg_path, svg)?;
        info!(output_file = svg_path; "SVG preview exported successfully");
    }

    if let Some(json_path) = &args.json {
        fs::write(json_path, generated.to_json()?)?;
        info!(output_file = json_path; "Layout JSON exported successfully");
    }

    Ok(())
}
