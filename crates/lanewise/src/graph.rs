//! Directed graph view of a process table.
//!
//! [`ProcessGraph`] indexes the steps of a [`ProcessTable`] by id and records
//! every transition whose target exists as a petgraph edge. Transitions
//! pointing at unknown ids are kept aside as [`DanglingTransition`]s so that
//! callers can report them.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::{Bfs, EdgeFiltered, EdgeRef},
};

use lanewise_core::step::{FlowKind, ProcessStep, ProcessTable, StepKind};

/// A transition whose target id does not name any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingTransition<'a> {
    pub source: &'a str,
    pub kind: FlowKind,
    pub target: &'a str,
}

/// Graph of steps (nodes) and transitions (edges) borrowed from a table.
#[derive(Debug)]
pub struct ProcessGraph<'a> {
    graph: DiGraph<&'a ProcessStep, FlowKind>,
    node_id_map: HashMap<&'a str, NodeIndex>,
    dangling: Vec<DanglingTransition<'a>>,
}

impl<'a> ProcessGraph<'a> {
    /// Builds the graph. When ids are duplicated, the first row wins.
    pub fn from_table(table: &'a ProcessTable) -> Self {
        let mut graph = DiGraph::with_capacity(table.len(), table.len());
        let mut node_id_map = HashMap::with_capacity(table.len());

        for step in table.steps() {
            node_id_map
                .entry(step.id())
                .or_insert_with(|| graph.add_node(step));
        }

        let mut dangling = Vec::new();
        for step in table.steps() {
            let source_idx = node_id_map[step.id()];
            if !std::ptr::eq(graph[source_idx], step) {
                // Shadowed duplicate row.
                continue;
            }

            for (kind, target) in step.transitions() {
                match node_id_map.get(target) {
                    Some(&target_idx) => {
                        graph.add_edge(source_idx, target_idx, kind);
                    }
                    None => {
                        trace!(source = step.id(), target_id = target; "Dangling transition");
                        dangling.push(DanglingTransition {
                            source: step.id(),
                            kind,
                            target,
                        });
                    }
                }
            }
        }

        debug!(
            nodes_count = graph.node_count(),
            edges_count = graph.edge_count(),
            dangling_count = dangling.len();
            "Process graph built",
        );

        Self {
            graph,
            node_id_map,
            dangling,
        }
    }

    /// Returns the step with the given id.
    pub fn step(&self, id: &str) -> Option<&'a ProcessStep> {
        self.node_id_map.get(id).map(|&idx| self.graph[idx])
    }

    /// Returns the existing successors of `step` in transition order ("yes" before "no").
    pub fn successors(&self, step: &'a ProcessStep) -> impl Iterator<Item = &'a ProcessStep> + '_ {
        step.transitions()
            .filter_map(move |(_, target)| self.step(target))
    }

    /// Returns the transitions that point at unknown ids.
    pub fn dangling(&self) -> &[DanglingTransition<'a>] {
        &self.dangling
    }

    /// Returns the ids of every step reachable from at least one start event.
    ///
    /// End events are included when reached but are never traversed.
    pub fn reachable_from_starts(&self) -> HashSet<&'a str> {
        let forwarding = EdgeFiltered::from_fn(&self.graph, |edge| {
            self.graph[edge.source()].kind() != StepKind::EndEvent
        });

        let mut reached = HashSet::new();
        let starts = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph[idx].kind() == StepKind::StartEvent);

        for start in starts {
            let mut bfs = Bfs::new(&forwarding, start);
            while let Some(idx) = bfs.next(&forwarding) {
                reached.insert(self.graph[idx].id());
            }
        }

        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ProcessTable {
        ProcessTable::new(vec![
            ProcessStep::new("start", "Start", StepKind::StartEvent, "Clerk").with_next("check"),
            ProcessStep::new("check", "Complete?", StepKind::ExclusiveGateway, "Clerk")
                .with_branches("end", "fix"),
            ProcessStep::new("fix", "Fix", StepKind::Task, "Manager").with_next("ghost"),
            ProcessStep::new("end", "End", StepKind::EndEvent, "Clerk").with_next("orphan"),
            ProcessStep::new("orphan", "Orphan", StepKind::Task, "Manager"),
        ])
    }

    #[test]
    fn test_dangling_transitions_are_kept_aside() {
        let table = sample_table();
        let graph = ProcessGraph::from_table(&table);

        assert!(graph.step("ghost").is_none());
        let fix = graph.step("fix").expect("fix exists");
        assert_eq!(graph.successors(fix).count(), 0);
        assert_eq!(
            graph.dangling(),
            &[DanglingTransition {
                source: "fix",
                kind: FlowKind::Next,
                target: "ghost",
            }]
        );
    }

    #[test]
    fn test_successors_in_branch_order() {
        let table = sample_table();
        let graph = ProcessGraph::from_table(&table);
        let check = graph.step("check").expect("check exists");

        let successors: Vec<&str> = graph.successors(check).map(ProcessStep::id).collect();
        assert_eq!(successors, vec!["end", "fix"]);
    }

    #[test]
    fn test_reachability_stops_at_end_events() {
        let table = sample_table();
        let graph = ProcessGraph::from_table(&table);
        let reached = graph.reachable_from_starts();

        assert!(reached.contains("start"));
        assert!(reached.contains("fix"));
        assert!(reached.contains("end"));
        assert!(
            !reached.contains("orphan"),
            "End events must not forward reachability"
        );
    }

    #[test]
    fn test_duplicate_ids_keep_first_row() {
        let table = ProcessTable::new(vec![
            ProcessStep::new("a", "First", StepKind::Task, "X").with_next("b"),
            ProcessStep::new("a", "Second", StepKind::Task, "Y").with_next("missing"),
            ProcessStep::new("b", "B", StepKind::Task, "X"),
        ]);
        let graph = ProcessGraph::from_table(&table);

        assert_eq!(graph.step("a").map(ProcessStep::label), Some("First"));
        assert!(graph.dangling().is_empty());
    }
}
