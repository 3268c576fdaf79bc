//! Lanewise - swim-lane auto-layout and edge routing for process tables.
//!
//! A process table lists the steps of a business process, who performs each
//! one and which step follows. Lanewise places every step in its actor's
//! lane, routes every transition around the steps in its way and writes the
//! result as a BPMN 2.0 document that BPMN viewers open without re-layout.
//!
//! The pipeline is `validate → layout → route → serialize`; [`Generator`]
//! runs all of it.

pub mod config;
pub mod export;
pub mod layout;
pub mod routing;
pub mod validate;

mod error;
mod graph;

pub use lanewise_core::{diagnostic, geometry, step};

pub use error::LanewiseError;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use config::AppConfig;
use diagnostic::Diagnostic;
use export::{bpmn::BpmnWriter, svg::SvgRenderer};
use layout::{Layout, LayoutEngine, NodePosition};
use routing::{Arrow, RoutedPaths, Router};
use step::ProcessTable;

/// Runs the layout pipeline on process tables.
///
/// A generator only holds configuration, so one instance can process any
/// number of tables.
///
/// # Examples
///
/// ```rust
/// use lanewise::Generator;
///
/// let source = r#"[
///     {"id": "start", "label": "Start", "kind": "StartEvent", "actor": "Clerk", "next_on_yes": "file"},
///     {"id": "file", "label": "File the request", "kind": "Task", "actor": "Clerk", "next_on_yes": "end"},
///     {"id": "end", "label": "Done", "kind": "EndEvent", "actor": "Clerk"}
/// ]"#;
///
/// let generator = Generator::default();
/// let table = generator.parse_table(source).expect("Failed to parse");
/// let generated = generator.generate(&table).expect("Failed to generate");
///
/// assert!(generated.xml().contains("bpmn:definitions"));
/// assert_eq!(generated.paths().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Generator {
    config: AppConfig,
}

impl Generator {
    /// Create a new generator with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON process table.
    ///
    /// Accepts either a bare array of rows or an object with a `rows` array.
    ///
    /// # Errors
    ///
    /// Returns [`LanewiseError::Table`] when the JSON does not describe a table.
    pub fn parse_table(&self, source: &str) -> Result<ProcessTable, LanewiseError> {
        let table: ProcessTable = serde_json::from_str(source)?;
        debug!(steps_count = table.len(); "Process table parsed");
        Ok(table)
    }

    /// Lay out, route and serialize a process table.
    ///
    /// # Errors
    ///
    /// - [`LanewiseError::EmptyTable`] when the table has no rows.
    /// - [`LanewiseError::InvalidTable`] when validation finds errors.
    /// - [`LanewiseError::Export`] when the BPMN document cannot be written.
    pub fn generate(&self, table: &ProcessTable) -> Result<Generated, LanewiseError> {
        info!(steps_count = table.len(); "Generating diagram");
        if table.is_empty() {
            return Err(LanewiseError::EmptyTable);
        }

        let mut diagnostics = validate::validate_table(table);
        if validate::has_errors(&diagnostics) {
            return Err(LanewiseError::InvalidTable(diagnostics));
        }

        let layout_config = self.config.layout();
        for issue in layout_config.inconsistencies() {
            warn!(issue; "Layout configuration may produce overlapping routes");
        }

        let layout = LayoutEngine::new(layout_config).calculate_layout(table);
        info!(
            steps_count = layout.positions().len(),
            lanes_count = layout.lane_count();
            "Layout calculated",
        );

        let mut router = Router::new(&layout, layout_config);
        diagnostics.extend(router.extract_arrows(table));
        let paths = router.route_all();
        let arrows = router.into_arrows();
        info!(arrows_count = arrows.len(); "Transitions routed");

        let (xml, export_diagnostics) = BpmnWriter::new(self.config.export(), layout_config)
            .write(table, &layout, &arrows, &paths)?;
        diagnostics.extend(export_diagnostics);

        info!(
            bytes = xml.len(),
            diagnostics_count = diagnostics.len();
            "BPMN document generated",
        );

        Ok(Generated {
            table: table.clone(),
            layout,
            arrows,
            paths,
            xml,
            diagnostics,
        })
    }

    /// Render an SVG preview of a generated diagram.
    ///
    /// # Errors
    ///
    /// Returns [`LanewiseError::Export`] if rendering fails.
    pub fn render_svg(&self, generated: &Generated) -> Result<String, LanewiseError> {
        let svg = SvgRenderer::new(generated.layout.config(), self.config.export()).render(
            &generated.table,
            &generated.layout,
            &generated.arrows,
            &generated.paths,
        )?;
        info!(bytes = svg.len(); "SVG preview rendered");
        Ok(svg)
    }
}

/// The output of [`Generator::generate`].
#[derive(Debug, Clone)]
pub struct Generated {
    table: ProcessTable,
    layout: Layout,
    arrows: Vec<Arrow>,
    paths: RoutedPaths,
    xml: String,
    diagnostics: Vec<Diagnostic>,
}

/// Serialized form of the layout and routing result.
#[derive(Serialize)]
struct LayoutContract<'a> {
    lanes: &'a [String],
    positions: &'a IndexMap<String, NodePosition>,
    paths: &'a RoutedPaths,
}

impl Generated {
    /// The BPMN 2.0 XML document.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn paths(&self) -> &RoutedPaths {
        &self.paths
    }

    /// Every diagnostic collected while generating, validation first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity().is_warning())
    }

    /// Serializes lanes, positions and paths as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LanewiseError::Export`] if serialization fails.
    pub fn to_json(&self) -> Result<String, LanewiseError> {
        let contract = LayoutContract {
            lanes: self.layout.lanes(),
            positions: self.layout.positions(),
            paths: &self.paths,
        };
        serde_json::to_string_pretty(&contract).map_err(|err| LanewiseError::Export(Box::new(err)))
    }
}
