use crate::error::Result;
use crate::lineage::ancestry::AncestorResolver;
use crate::lineage::graph::FamilyGraph;
use crate::lineage::traversal::GraphTraversal;
use crate::types::LcaMatch;
use tracing::{debug, info};

/// Picks the lowest common ancestor of two people in one family graph
#[derive(Debug)]
pub struct LcaSelector<'g> {
    resolver: AncestorResolver<'g>,
}

impl<'g> LcaSelector<'g> {
    pub fn new(graph: &'g FamilyGraph) -> Self {
        Self {
            resolver: AncestorResolver::new(graph),
        }
    }

    pub fn resolver(&mut self) -> &mut AncestorResolver<'g> {
        &mut self.resolver
    }

    /// Common ancestor with the smallest depth from its root.
    ///
    /// Candidates without a computable depth are skipped. Equal depths are
    /// broken by the smallest key. When every candidate is itself a root,
    /// the smallest-key root is taken at depth 0. `None` when nothing is
    /// shared.
    pub fn select(&mut self, first: &str, second: &str) -> Result<Option<LcaMatch>> {
        let common = self.resolver.common_ancestors(first, second)?;
        debug!("Common ancestors of {} and {}: {:?}", first, second, common);

        if common.is_empty() {
            info!("No common ancestor of {} and {} in the fetched records", first, second);
            return Ok(None);
        }

        let graph = self.resolver.graph();
        let mut best: Option<(usize, &String)> = None;
        let mut first_root: Option<&String> = None;

        for candidate in &common {
            let Some(depth) = GraphTraversal::depth(&mut self.resolver, candidate)? else {
                if first_root.is_none() && graph.is_root(candidate)? {
                    first_root = Some(candidate);
                }
                debug!("Skipping {}: depth cannot be computed", candidate);
                continue;
            };

            // Candidates arrive in key order, so a strict comparison keeps the smallest key on ties
            if best.map_or(true, |(best_depth, _)| depth < best_depth) {
                best = Some((depth, candidate));
            }
        }

        // Top of the fetched window: only roots are shared
        let best = best.or_else(|| first_root.map(|root| (0, root)));

        let lca = best.map(|(depth, ancestor)| LcaMatch {
            ancestor: ancestor.clone(),
            depth,
            candidates: common.len(),
        });

        if let Some(lca) = &lca {
            info!("Lowest common ancestor: {} (depth {})", lca.ancestor, lca.depth);
        }
        Ok(lca)
    }
}
