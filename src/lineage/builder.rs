use crate::lineage::graph::{FamilyGraph, Relation};
use crate::types::AncestorRecord;
use std::collections::HashMap;
use tracing::{debug, info};

/// Builds the shared family graph for one query from two ancestor lists
#[derive(Debug, Default)]
pub struct DagBuilder {
    graph: FamilyGraph,
    dropped_parents: usize,
}

impl DagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for `first` and `second` from their ancestor lists.
    ///
    /// Both individuals are always present as nodes. Each list is resolved
    /// against its own id -> name table only.
    pub fn build(
        first_records: &[AncestorRecord],
        second_records: &[AncestorRecord],
        first: &str,
        second: &str,
    ) -> FamilyGraph {
        let mut builder = Self::new();
        builder.graph.add_person(first);
        builder.graph.add_person(second);

        info!("Building family graph - adding ancestors of {}", first);
        builder.add_ancestor_list(first_records, first);

        info!("Building family graph - adding ancestors of {}", second);
        builder.add_ancestor_list(second_records, second);

        info!(
            "Family graph built with {} people and {} edges ({} unresolved parent references dropped)",
            builder.graph.node_count(),
            builder.graph.edge_count(),
            builder.dropped_parents
        );

        builder.graph
    }

    fn add_ancestor_list(&mut self, records: &[AncestorRecord], owner: &str) {
        let id_to_name = Self::resolution_table(records);

        for record in records {
            self.graph.add_person(&record.name);
            self.graph.add_relation(&record.name, owner, Relation::Lineage);

            for parent_id in record.parent_ids() {
                match id_to_name.get(parent_id) {
                    Some(parent_name) => {
                        self.graph.add_relation(parent_name, &record.name, Relation::Parent);
                    }
                    None => {
                        // Parent lies outside the fetched depth window
                        debug!("Parent id {} of {} not in ancestor list of {}", parent_id, record.name, owner);
                        self.dropped_parents += 1;
                    }
                }
            }
        }
    }

    /// id -> canonical name for one ancestor list
    fn resolution_table(records: &[AncestorRecord]) -> HashMap<&str, &str> {
        records
            .iter()
            .map(|record| (record.id.as_str(), record.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, father: Option<&str>, mother: Option<&str>) -> AncestorRecord {
        AncestorRecord {
            id: id.to_string(),
            name: name.to_string(),
            father: father.map(str::to_string),
            mother: mother.map(str::to_string),
        }
    }

    #[test]
    fn test_individuals_added_without_records() {
        let graph = DagBuilder::build(&[], &[], "A", "B");

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.contains("A"));
        assert!(graph.contains("B"));
    }

    #[test]
    fn test_parent_edges_use_names() {
        let first = vec![
            record("1", "A", Some("2"), Some("3")),
            record("2", "F1", None, None),
            record("3", "M1", None, None),
        ];
        let graph = DagBuilder::build(&first, &[], "A", "B");

        assert_eq!(graph.relation("F1", "A"), Some(Relation::Parent));
        assert_eq!(graph.relation("M1", "A"), Some(Relation::Parent));
        assert!(!graph.contains("2"));
        assert!(!graph.contains("3"));
    }

    #[test]
    fn test_every_record_links_to_owner() {
        let first = vec![
            record("1", "A", Some("2"), None),
            record("2", "F1", Some("4"), None),
            record("4", "G1", None, None),
        ];
        let graph = DagBuilder::build(&first, &[], "A", "B");

        assert_eq!(graph.relation("G1", "A"), Some(Relation::Lineage));
        assert_eq!(graph.relation("G1", "F1"), Some(Relation::Parent));
        assert_eq!(graph.relation("F1", "A"), Some(Relation::Parent));
    }

    #[test]
    fn test_unresolved_parent_is_dropped() {
        let first = vec![record("1", "A", Some("99"), None)];
        let graph = DagBuilder::build(&first, &[], "A", "B");

        assert!(graph.parents("A").unwrap().is_empty());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_tables_are_not_merged() {
        // Id "2" means F1 in the first list and F2 in the second
        let first = vec![record("1", "A", Some("2"), None), record("2", "F1", None, None)];
        let second = vec![record("5", "B", Some("2"), None), record("2", "F2", None, None)];
        let graph = DagBuilder::build(&first, &second, "A", "B");

        assert_eq!(graph.relation("F1", "A"), Some(Relation::Parent));
        assert_eq!(graph.relation("F2", "B"), Some(Relation::Parent));
        assert_eq!(graph.relation("F1", "B"), None);
        assert_eq!(graph.relation("F2", "A"), None);
    }

    #[test]
    fn test_self_reference_adds_no_edge() {
        let first = vec![record("1", "X", Some("1"), None)];
        let graph = DagBuilder::build(&first, &[], "X", "B");

        assert_eq!(graph.in_degree("X").unwrap(), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
