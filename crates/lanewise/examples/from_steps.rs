//! Example: Building a process table in code
//!
//! This example builds a small approval process with the step builders,
//! generates the BPMN document and prints the routed paths.

use lanewise::{
    Generator,
    step::{ProcessStep, ProcessTable, StepKind},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = ProcessTable::new(vec![
        ProcessStep::new("request", "Submit request", StepKind::StartEvent, "Employee")
            .with_next("review"),
        ProcessStep::new("review", "Review request", StepKind::Task, "Manager")
            .with_next("decision")
            .with_tool("Intranet"),
        ProcessStep::new("decision", "Approve", StepKind::ExclusiveGateway, "Manager")
            .with_condition("Approved?")
            .with_branches("book", "notify"),
        ProcessStep::new("book", "Book expense", StepKind::Task, "Accounting").with_next("done"),
        ProcessStep::new("notify", "Notify refusal", StepKind::Task, "Manager").with_next("done"),
        ProcessStep::new("done", "Done", StepKind::EndEvent, "Employee"),
    ]);

    let generator = Generator::default();
    let generated = generator.generate(&table)?;

    for warning in generated.warnings() {
        println!("{warning}");
    }

    for (id, path) in generated.paths() {
        let points: Vec<String> = path
            .iter()
            .map(|p| format!("({}, {})", p.x(), p.y()))
            .collect();
        println!("{id}: {}", points.join(" -> "));
    }

    println!("\n{}", generated.xml());
    Ok(())
}
