//! Table validation.
//!
//! Checks a [`ProcessTable`] before layout and reports problems as
//! [`Diagnostic`]s. Errors make the table unusable (ambiguous ids); warnings
//! describe rows that still produce a diagram, though possibly not the one the
//! author intended.
//!
//! ## Checks
//!
//! - **Ids**: every id is non-empty and unique (errors)
//! - **Branches**: only gateways have a "no" branch, gateways have a condition
//!   and two branches, end events have no successor (warnings)
//! - **Events**: the table has at least one start and one end event (warnings)
//! - **Reachability**: every step is reachable from a start event (warnings)
//!
//! Dangling successor references are reported by the router, which is where
//! the affected transitions are dropped.

use std::collections::HashSet;

use log::debug;

use lanewise_core::{
    diagnostic::{Diagnostic, DiagnosticCode},
    step::{ProcessTable, StepKind},
};

use crate::graph::ProcessGraph;

/// Runs every check and returns the diagnostics in table order, errors first.
pub fn validate_table(table: &ProcessTable) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_ids(table, &mut errors);
    check_branches(table, &mut warnings);
    check_events(table, &mut warnings);
    check_reachability(table, &mut warnings);

    debug!(
        errors_count = errors.len(),
        warnings_count = warnings.len();
        "Table validated",
    );

    errors.extend(warnings);
    errors
}

/// Returns true if any diagnostic is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity().is_error())
}

fn check_ids(table: &ProcessTable, errors: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();

    for (row, step) in table.steps().iter().enumerate() {
        if step.id().trim().is_empty() {
            errors.push(
                Diagnostic::error(format!("row {} has an empty id", row + 1))
                    .with_code(DiagnosticCode::E001)
                    .with_help("give every step a unique identifier"),
            );
            continue;
        }

        if !seen.insert(step.id()) {
            errors.push(
                Diagnostic::error(format!("id `{}` is used by more than one step", step.id()))
                    .with_code(DiagnosticCode::E002)
                    .with_step(step.id())
                    .with_help("rename one of the steps; references to this id are ambiguous"),
            );
        }
    }
}

fn check_branches(table: &ProcessTable, warnings: &mut Vec<Diagnostic>) {
    for step in table.steps() {
        match step.kind() {
            StepKind::ExclusiveGateway => {
                if step.condition().is_none() {
                    warnings.push(
                        Diagnostic::warning(format!(
                            "gateway `{}` has no condition",
                            step.id()
                        ))
                        .with_code(DiagnosticCode::W102)
                        .with_step(step.id()),
                    );
                }
                if step.next_on_yes().is_none() || step.next_on_no().is_none() {
                    warnings.push(
                        Diagnostic::warning(format!(
                            "gateway `{}` does not have both a \"yes\" and a \"no\" branch",
                            step.id()
                        ))
                        .with_code(DiagnosticCode::W103)
                        .with_step(step.id()),
                    );
                }
            }
            kind => {
                if let Some(target) = step.next_on_no() {
                    warnings.push(
                        Diagnostic::warning(format!(
                            "{kind} `{}` has a \"no\" branch to `{target}`; only gateways branch",
                            step.id()
                        ))
                        .with_code(DiagnosticCode::W101)
                        .with_step(step.id())
                        .with_help("turn the step into an ExclusiveGateway or clear the branch"),
                    );
                }
                if let (StepKind::EndEvent, Some(target)) = (kind, step.next_on_yes()) {
                    warnings.push(
                        Diagnostic::warning(format!(
                            "end event `{}` continues to `{target}`",
                            step.id()
                        ))
                        .with_code(DiagnosticCode::W107)
                        .with_step(step.id()),
                    );
                }
            }
        }
    }
}

fn check_events(table: &ProcessTable, warnings: &mut Vec<Diagnostic>) {
    let stats = table.statistics();

    if stats.start_events == 0 {
        warnings.push(
            Diagnostic::warning("the table has no start event")
                .with_code(DiagnosticCode::W104)
                .with_help("layers are seeded from the first rows instead"),
        );
    }
    if stats.end_events == 0 {
        warnings.push(
            Diagnostic::warning("the table has no end event").with_code(DiagnosticCode::W105),
        );
    }
}

fn check_reachability(table: &ProcessTable, warnings: &mut Vec<Diagnostic>) {
    let graph = ProcessGraph::from_table(table);
    let has_start = table
        .steps()
        .iter()
        .any(|step| step.kind() == StepKind::StartEvent);
    if !has_start {
        return;
    }

    let reached = graph.reachable_from_starts();
    let mut reported = HashSet::new();
    for step in table.steps() {
        if !reached.contains(step.id()) && reported.insert(step.id()) {
            warnings.push(
                Diagnostic::warning(format!(
                    "step `{}` cannot be reached from any start event",
                    step.id()
                ))
                .with_code(DiagnosticCode::W106)
                .with_step(step.id()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use lanewise_core::step::ProcessStep;

    use super::*;

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().filter_map(Diagnostic::code).collect()
    }

    #[test]
    fn test_clean_table_has_no_diagnostics() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("s", "Start", StepKind::StartEvent, "A").with_next("g"),
            ProcessStep::new("g", "Ok?", StepKind::ExclusiveGateway, "A")
                .with_condition("Is it ok?")
                .with_branches("e", "t"),
            ProcessStep::new("t", "Fix", StepKind::Task, "B").with_next("e"),
            ProcessStep::new("e", "End", StepKind::EndEvent, "A"),
        ]);

        let diagnostics = validate_table(&table);
        assert!(diagnostics.is_empty(), "Unexpected: {diagnostics:?}");
        assert!(!has_errors(&diagnostics));
    }

    #[test]
    fn test_duplicate_and_empty_ids_are_errors() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "", StepKind::StartEvent, "A").with_next("a"),
            ProcessStep::new("a", "", StepKind::EndEvent, "A"),
            ProcessStep::new(" ", "", StepKind::Task, "A"),
        ]);

        let diagnostics = validate_table(&table);
        assert!(has_errors(&diagnostics));
        assert_eq!(
            &codes(&diagnostics)[..2],
            &[DiagnosticCode::E002, DiagnosticCode::E001]
        );
    }

    #[test]
    fn test_branch_warnings() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("s", "", StepKind::StartEvent, "A")
                .with_next("g")
                .with_next_on_no("e"),
            ProcessStep::new("g", "", StepKind::ExclusiveGateway, "A").with_next("e"),
            ProcessStep::new("e", "", StepKind::EndEvent, "A").with_next("s"),
        ]);

        let found = codes(&validate_table(&table));
        assert!(found.contains(&DiagnosticCode::W101));
        assert!(found.contains(&DiagnosticCode::W102));
        assert!(found.contains(&DiagnosticCode::W103));
        assert!(found.contains(&DiagnosticCode::W107));
    }

    #[test]
    fn test_missing_events_and_unreachable_steps() {
        let no_events = ProcessTable::new(vec![ProcessStep::new("t", "", StepKind::Task, "A")]);
        let found = codes(&validate_table(&no_events));
        assert_eq!(found, vec![DiagnosticCode::W104, DiagnosticCode::W105]);

        let island = ProcessTable::new(vec![
            ProcessStep::new("s", "", StepKind::StartEvent, "A").with_next("e"),
            ProcessStep::new("e", "", StepKind::EndEvent, "A"),
            ProcessStep::new("island", "", StepKind::Task, "B"),
        ]);
        let diagnostics = validate_table(&island);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::W106]);
        assert_eq!(diagnostics[0].step(), Some("island"));
    }
}
