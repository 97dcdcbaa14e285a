use crate::error::{LcaError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// Why an edge exists between two people
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Father or mother reference of a record
    Parent,
    /// A record listed in the ancestor list of the owning individual
    Lineage,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Parent => write!(f, "parent"),
            Relation::Lineage => write!(f, "lineage"),
        }
    }
}

/// Parent -> child graph for a single query, wrapping a petgraph DiGraph.
///
/// Only the builder mutates it; after construction every accessor is read-only.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    graph: DiGraph<String, Relation>,
    node_map: HashMap<String, NodeIndex>,
}

impl FamilyGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a person if not already present
    pub(crate) fn add_person(&mut self, key: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(key) {
            return index;
        }
        let index = self.graph.add_node(key.to_string());
        self.node_map.insert(key.to_string(), index);
        index
    }

    /// Add a `parent -> child` edge. Repeated edges collapse into one, and a
    /// `Parent` relation overrides a `Lineage` one. Self edges are refused.
    pub(crate) fn add_relation(&mut self, parent: &str, child: &str, relation: Relation) -> bool {
        if parent == child {
            debug!("Skipping self edge on {}", parent);
            return false;
        }

        let from = self.add_person(parent);
        let to = self.add_person(child);

        match self.graph.find_edge(from, to) {
            Some(edge) => {
                if relation == Relation::Parent {
                    self.graph[edge] = Relation::Parent;
                }
                false
            }
            None => {
                self.graph.add_edge(from, to, relation);
                true
            }
        }
    }

    /// Get the number of people in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.node_map.contains_key(key)
    }

    /// All person keys, sorted
    pub fn persons(&self) -> Vec<&str> {
        let mut persons: Vec<&str> = self.node_map.keys().map(String::as_str).collect();
        persons.sort_unstable();
        persons
    }

    fn index(&self, key: &str) -> Result<NodeIndex> {
        self.node_map
            .get(key)
            .copied()
            .ok_or_else(|| LcaError::UnknownPerson(key.to_string()))
    }

    fn neighbors(&self, key: &str, direction: Direction) -> Result<BTreeSet<String>> {
        let index = self.index(key)?;
        Ok(self
            .graph
            .neighbors_directed(index, direction)
            .filter_map(|neighbor| self.graph.node_weight(neighbor).cloned())
            .collect())
    }

    /// Immediate predecessors (parents) of a person, in key order
    pub fn parents(&self, key: &str) -> Result<BTreeSet<String>> {
        self.neighbors(key, Direction::Incoming)
    }

    /// Immediate successors (children) of a person, in key order
    pub fn children(&self, key: &str) -> Result<BTreeSet<String>> {
        self.neighbors(key, Direction::Outgoing)
    }

    pub fn in_degree(&self, key: &str) -> Result<usize> {
        let index = self.index(key)?;
        Ok(self.graph.neighbors_directed(index, Direction::Incoming).count())
    }

    /// A root has no recorded parents
    pub fn is_root(&self, key: &str) -> Result<bool> {
        Ok(self.in_degree(key)? == 0)
    }

    /// All zero in-degree people, sorted
    pub fn root_nodes(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .node_map
            .iter()
            .filter(|(_, &index)| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|(key, _)| key.clone())
            .collect();
        roots.sort();
        roots
    }

    /// Relation recorded on the `parent -> child` edge, if any
    pub fn relation(&self, parent: &str, child: &str) -> Option<Relation> {
        let from = self.node_map.get(parent)?;
        let to = self.node_map.get(child)?;
        self.graph
            .find_edge(*from, *to)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Breadth-first shortest edge count from `from` to `to` following only
    /// edges whose relation passes `follow`.
    pub fn shortest_distance<F>(&self, from: &str, to: &str, follow: F) -> Result<Option<usize>>
    where
        F: Fn(Relation) -> bool,
    {
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        queue.push_back((from_index, 0));
        visited.insert(from_index);

        while let Some((current_index, distance)) = queue.pop_front() {
            if current_index == to_index {
                return Ok(Some(distance));
            }

            for edge in self.graph.edges_directed(current_index, Direction::Outgoing) {
                if !follow(*edge.weight()) {
                    continue;
                }
                let neighbor_index = edge.target();
                if visited.insert(neighbor_index) {
                    queue.push_back((neighbor_index, distance + 1));
                }
            }
        }

        Ok(None)
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, Relation> {
        &self.graph
    }

    /// Get graph statistics
    pub fn get_statistics(&self) -> GraphStatistics {
        let parent_edges = self
            .graph
            .edge_weights()
            .filter(|relation| **relation == Relation::Parent)
            .count();

        GraphStatistics {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            parent_edges,
            root_nodes: self.root_nodes().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub parent_edges: usize,
    pub root_nodes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> FamilyGraph {
        // G -> F -> A
        // G -> M -> A
        let mut graph = FamilyGraph::new();
        graph.add_relation("G", "F", Relation::Parent);
        graph.add_relation("G", "M", Relation::Parent);
        graph.add_relation("F", "A", Relation::Parent);
        graph.add_relation("M", "A", Relation::Parent);
        graph.add_relation("G", "A", Relation::Lineage);
        graph
    }

    #[test]
    fn test_parents_are_ordered() {
        let graph = create_test_graph();
        let parents: Vec<String> = graph.parents("A").unwrap().into_iter().collect();

        assert_eq!(parents, vec!["F", "G", "M"]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = create_test_graph();
        let edges = graph.edge_count();

        assert!(!graph.add_relation("F", "A", Relation::Parent));
        assert!(!graph.add_relation("F", "A", Relation::Lineage));
        assert_eq!(graph.edge_count(), edges);
        assert_eq!(graph.relation("F", "A"), Some(Relation::Parent));
    }

    #[test]
    fn test_parent_upgrades_lineage_edge() {
        let mut graph = create_test_graph();
        assert_eq!(graph.relation("G", "A"), Some(Relation::Lineage));

        graph.add_relation("G", "A", Relation::Parent);
        assert_eq!(graph.relation("G", "A"), Some(Relation::Parent));
    }

    #[test]
    fn test_self_edge_refused() {
        let mut graph = create_test_graph();
        assert!(!graph.add_relation("A", "A", Relation::Parent));
        assert_eq!(graph.in_degree("A").unwrap(), 3);
    }

    #[test]
    fn test_root_nodes() {
        let graph = create_test_graph();

        assert_eq!(graph.root_nodes(), vec!["G".to_string()]);
        assert!(graph.is_root("G").unwrap());
        assert!(!graph.is_root("F").unwrap());
    }

    #[test]
    fn test_unknown_person() {
        let graph = create_test_graph();
        assert!(matches!(graph.parents("Z"), Err(LcaError::UnknownPerson(_))));
    }

    #[test]
    fn test_shortest_distance() {
        let graph = create_test_graph();

        assert_eq!(graph.shortest_distance("G", "A", |_| true).unwrap(), Some(1));
        assert_eq!(
            graph.shortest_distance("G", "A", |r| r == Relation::Parent).unwrap(),
            Some(2)
        );
        assert_eq!(graph.shortest_distance("A", "G", |_| true).unwrap(), None);
        assert_eq!(graph.shortest_distance("F", "F", |_| true).unwrap(), Some(0));
    }

    #[test]
    fn test_statistics() {
        let stats = create_test_graph().get_statistics();

        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.total_edges, 5);
        assert_eq!(stats.parent_edges, 4);
        assert_eq!(stats.root_nodes, 1);
    }
}
