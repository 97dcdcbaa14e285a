use crate::error::Result;
use crate::lineage::ancestry::AncestorResolver;
use crate::lineage::graph::Relation;
use tracing::debug;

/// Root discovery and depth measurement over a family graph
pub struct GraphTraversal;

impl GraphTraversal {
    /// Some ancestor of `node` with no recorded parents.
    ///
    /// When several ancestral lines end at different roots, the smallest key
    /// is returned. `None` when `node` has no ancestors at all.
    pub fn find_root(resolver: &mut AncestorResolver<'_>, node: &str) -> Result<Option<String>> {
        let graph = resolver.graph();
        let ancestors = resolver.ancestors_of(node)?;

        for ancestor in ancestors {
            if graph.is_root(&ancestor)? {
                return Ok(Some(ancestor));
            }
        }

        debug!("No root found for {}", node);
        Ok(None)
    }

    /// Shortest edge count from the root of `node` down to `node`.
    ///
    /// `None` when no root is found (`node` is itself a root) or `node` is
    /// unreachable from the chosen root. Recomputed on every call.
    pub fn depth(resolver: &mut AncestorResolver<'_>, node: &str) -> Result<Option<usize>> {
        let graph = resolver.graph();
        let Some(root) = Self::find_root(resolver, node)? else {
            return Ok(None);
        };

        let depth = graph.shortest_distance(&root, node, |_| true)?;
        match depth {
            Some(depth) => debug!("Depth from root {} to {}: {}", root, node, depth),
            None => debug!("No path from root {} to {}", root, node),
        }
        Ok(depth)
    }

    /// Generations between `ancestor` and `person`: shortest path over parent
    /// edges, falling back to lineage edges when the parent chain is broken.
    pub fn generations(resolver: &AncestorResolver<'_>, ancestor: &str, person: &str) -> Result<Option<usize>> {
        let graph = resolver.graph();

        let by_parents = graph.shortest_distance(ancestor, person, |relation| relation == Relation::Parent)?;
        if by_parents.is_some() {
            return Ok(by_parents);
        }
        graph.shortest_distance(ancestor, person, |_| true)
    }
}
