use crate::error::{LcaError, Result};
use crate::lineage::builder::DagBuilder;
use crate::lineage::graph::FamilyGraph;
use crate::lineage::lca::LcaSelector;
use crate::lineage::traversal::GraphTraversal;
use crate::types::*;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Graph and outcome of one resolved query. Dropped when the query is done.
#[derive(Debug)]
pub struct ResolvedQuery {
    pub graph: FamilyGraph,
    pub outcome: LcaOutcome,
}

/// Runs one ancestor-pair query from fetched lists to an outcome
#[derive(Debug, Default)]
pub struct AncestryAnalyzer;

impl AncestryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Build the family graph and select the lowest common ancestor.
    ///
    /// Stops with `MissingInputData` before any graph work when either list
    /// is unavailable.
    #[instrument(skip(self, lists), fields(first = %lists.first, second = %lists.second))]
    pub fn resolve(&self, lists: AncestorLists) -> Result<ResolvedQuery> {
        let AncestorLists {
            first,
            second,
            first_records,
            second_records,
        } = lists;

        let Some(first_records) = first_records else {
            warn!("Ancestor list for {} is unavailable", first);
            return Err(LcaError::MissingInputData(first));
        };
        let Some(second_records) = second_records else {
            warn!("Ancestor list for {} is unavailable", second);
            return Err(LcaError::MissingInputData(second));
        };

        info!(
            "Resolving common ancestor from {} + {} records",
            first_records.len(),
            second_records.len()
        );

        let graph = DagBuilder::build(&first_records, &second_records, &first, &second);
        let outcome = self.analyze(&graph, &first, &second)?;

        Ok(ResolvedQuery { graph, outcome })
    }

    /// Roots, LCA and generation distances for two people already in `graph`
    pub fn analyze(&self, graph: &FamilyGraph, first: &str, second: &str) -> Result<LcaOutcome> {
        let mut selector = LcaSelector::new(graph);

        let first_root = GraphTraversal::find_root(selector.resolver(), first)?;
        let second_root = GraphTraversal::find_root(selector.resolver(), second)?;

        let lca = selector.select(first, second)?;

        let (generations_first, generations_second) = match &lca {
            Some(lca) => (
                GraphTraversal::generations(selector.resolver(), &lca.ancestor, first)?,
                GraphTraversal::generations(selector.resolver(), &lca.ancestor, second)?,
            ),
            None => (None, None),
        };

        Ok(LcaOutcome {
            id: Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            first: first.to_string(),
            second: second.to_string(),
            first_root,
            second_root,
            lca,
            generations_first,
            generations_second,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        })
    }
}
