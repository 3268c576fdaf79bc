//! The process table: the input contract of the layout pipeline.
//!
//! A [`ProcessTable`] is an ordered list of [`ProcessStep`] rows. Each row
//! names its owner (the actor, which becomes a lane) and up to two successor
//! steps. Tables are usually produced by upstream tooling as JSON, so the
//! serde representation accepts both the English field names and the field
//! names those producers emit (`étape`, `typeBpmn`, `acteur`, `outputOui`, ...).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The BPMN element kind of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    #[serde(alias = "startEvent", alias = "start")]
    StartEvent,
    #[default]
    #[serde(alias = "task")]
    Task,
    #[serde(alias = "exclusiveGateway", alias = "Gateway", alias = "gateway")]
    ExclusiveGateway,
    #[serde(alias = "endEvent", alias = "end")]
    EndEvent,
}

impl StepKind {
    /// Returns true for start and end events, which are drawn as circles.
    pub fn is_event(self) -> bool {
        matches!(self, StepKind::StartEvent | StepKind::EndEvent)
    }

    /// Returns true for exclusive gateways.
    pub fn is_gateway(self) -> bool {
        matches!(self, StepKind::ExclusiveGateway)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::StartEvent => "StartEvent",
            StepKind::Task => "Task",
            StepKind::ExclusiveGateway => "ExclusiveGateway",
            StepKind::EndEvent => "EndEvent",
        };
        f.write_str(name)
    }
}

/// The meaning of a transition between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// The "yes" branch of a gateway.
    Yes,
    /// The "no" branch of a gateway.
    No,
    /// The single successor of a non-gateway step.
    Next,
}

impl FlowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Yes => "yes",
            FlowKind::No => "no",
            FlowKind::Next => "next",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of the process table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    id: String,

    #[serde(default, alias = "étape", alias = "etape", alias = "name")]
    label: String,

    #[serde(default, alias = "typeBpmn", alias = "type")]
    kind: StepKind,

    #[serde(default, alias = "acteur")]
    actor: String,

    #[serde(
        default,
        alias = "département",
        alias = "departement",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    department: Option<String>,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    condition: Option<String>,

    #[serde(
        default,
        alias = "nextOnYes",
        alias = "outputOui",
        alias = "next",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    next_on_yes: Option<String>,

    #[serde(
        default,
        alias = "nextOnNo",
        alias = "outputNon",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    next_on_no: Option<String>,

    #[serde(
        default,
        alias = "outil",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    tool: Option<String>,
}

/// Treats missing, blank and whitespace-only strings as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

impl ProcessStep {
    /// Creates a step without successors.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: StepKind,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            actor: actor.into(),
            ..Default::default()
        }
    }

    /// Sets the sole successor (or the "yes" branch of a gateway).
    pub fn with_next(mut self, target: impl Into<String>) -> Self {
        self.next_on_yes = Some(target.into());
        self
    }

    /// Sets both gateway branches.
    pub fn with_branches(mut self, yes: impl Into<String>, no: impl Into<String>) -> Self {
        self.next_on_yes = Some(yes.into());
        self.next_on_no = Some(no.into());
        self
    }

    /// Sets only the "no" branch.
    pub fn with_next_on_no(mut self, target: impl Into<String>) -> Self {
        self.next_on_no = Some(target.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn next_on_yes(&self) -> Option<&str> {
        self.next_on_yes.as_deref()
    }

    pub fn next_on_no(&self) -> Option<&str> {
        self.next_on_no.as_deref()
    }

    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }

    /// Returns the outgoing transitions of this step as `(kind, target id)` pairs.
    ///
    /// Non-gateway steps yield at most one [`FlowKind::Next`] transition; their
    /// `next_on_no` value is ignored. Gateways yield [`FlowKind::Yes`] before
    /// [`FlowKind::No`]. Targets are not checked for existence.
    pub fn transitions(&self) -> impl Iterator<Item = (FlowKind, &str)> {
        let is_gateway = self.kind.is_gateway();
        let primary = self.next_on_yes.as_deref().map(|target| {
            let kind = if is_gateway {
                FlowKind::Yes
            } else {
                FlowKind::Next
            };
            (kind, target)
        });
        let secondary = self
            .next_on_no
            .as_deref()
            .filter(|_| is_gateway)
            .map(|target| (FlowKind::No, target));

        primary.into_iter().chain(secondary)
    }
}

/// Counts of the element kinds in a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStatistics {
    pub steps: usize,
    pub start_events: usize,
    pub end_events: usize,
    pub gateways: usize,
    pub tasks: usize,
    pub lanes: usize,
}

/// An ordered list of process steps.
///
/// Deserializes from either a bare JSON array of rows or an object with a
/// `rows` array. Serializes to the `rows` form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessTable {
    rows: Vec<ProcessStep>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableRepr {
    Wrapped { rows: Vec<ProcessStep> },
    Bare(Vec<ProcessStep>),
}

impl<'de> Deserialize<'de> for ProcessTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = match TableRepr::deserialize(deserializer)? {
            TableRepr::Wrapped { rows } | TableRepr::Bare(rows) => rows,
        };
        Ok(Self { rows })
    }
}

impl ProcessTable {
    pub fn new(rows: Vec<ProcessStep>) -> Self {
        Self { rows }
    }

    /// Returns the steps in table order.
    pub fn steps(&self) -> &[ProcessStep] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the first step with the given id.
    pub fn step(&self, id: &str) -> Option<&ProcessStep> {
        self.rows.iter().find(|step| step.id == id)
    }

    /// Returns the distinct actors in first-seen order.
    pub fn actors(&self) -> Vec<&str> {
        let mut actors: Vec<&str> = Vec::new();
        for step in &self.rows {
            if !actors.contains(&step.actor()) {
                actors.push(step.actor());
            }
        }
        actors
    }

    pub fn statistics(&self) -> TableStatistics {
        let count = |kind: StepKind| self.rows.iter().filter(|s| s.kind == kind).count();

        TableStatistics {
            steps: self.rows.len(),
            start_events: count(StepKind::StartEvent),
            end_events: count(StepKind::EndEvent),
            gateways: count(StepKind::ExclusiveGateway),
            tasks: count(StepKind::Task),
            lanes: self.actors().len(),
        }
    }
}

impl FromIterator<ProcessStep> for ProcessTable {
    fn from_iter<I: IntoIterator<Item = ProcessStep>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
