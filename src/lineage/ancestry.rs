use crate::error::{LcaError, Result};
use crate::lineage::graph::FamilyGraph;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Memoized ancestor-set lookups over one immutable family graph.
///
/// The cache lives exactly as long as the resolver, which borrows the graph
/// for a single query.
#[derive(Debug)]
pub struct AncestorResolver<'g> {
    graph: &'g FamilyGraph,
    cache: HashMap<String, BTreeSet<String>>,
}

/// One pending node of the explicit post-order walk
struct Frame {
    node: String,
    parents: Vec<String>,
    next: usize,
}

impl<'g> AncestorResolver<'g> {
    pub fn new(graph: &'g FamilyGraph) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &'g FamilyGraph {
        self.graph
    }

    /// Number of people whose ancestor set has been computed
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Every person reachable from `node` by following parent edges.
    ///
    /// `ancestors(n) = parents(n) ∪ ⋃ ancestors(p)`, evaluated with an explicit
    /// stack. A parent that is still being expanded is counted but not
    /// descended into, so cycles in malformed input terminate with a smaller
    /// set. The result never contains `node` itself.
    pub fn ancestors_of(&mut self, node: &str) -> Result<BTreeSet<String>> {
        if !self.graph.contains(node) {
            return Err(LcaError::UnknownPerson(node.to_string()));
        }
        if let Some(cached) = self.cache.get(node) {
            return Ok(cached.clone());
        }

        let mut visiting: HashSet<String> = HashSet::new();
        visiting.insert(node.to_string());
        let mut stack = vec![self.frame(node)?];

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.parents.len() {
                let parent = frame.parents[frame.next].clone();
                frame.next += 1;

                if self.cache.contains_key(&parent) {
                    continue;
                }
                if visiting.contains(&parent) {
                    warn!("Cycle detected through {}, not descending again", parent);
                    continue;
                }

                visiting.insert(parent.clone());
                let next_frame = self.frame(&parent)?;
                stack.push(next_frame);
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let mut ancestors = BTreeSet::new();
            for parent in &frame.parents {
                ancestors.insert(parent.clone());
                if let Some(inherited) = self.cache.get(parent) {
                    ancestors.extend(inherited.iter().cloned());
                }
            }
            ancestors.remove(&frame.node);

            visiting.remove(&frame.node);
            self.cache.insert(frame.node, ancestors);
        }

        let ancestors = self.cache.get(node).cloned().unwrap_or_default();
        debug!("Found {} ancestors for {}", ancestors.len(), node);
        Ok(ancestors)
    }

    /// Ancestors shared by both people
    pub fn common_ancestors(&mut self, first: &str, second: &str) -> Result<BTreeSet<String>> {
        let first_ancestors = self.ancestors_of(first)?;
        let second_ancestors = self.ancestors_of(second)?;

        Ok(first_ancestors
            .intersection(&second_ancestors)
            .cloned()
            .collect())
    }

    fn frame(&self, node: &str) -> Result<Frame> {
        Ok(Frame {
            node: node.to_string(),
            parents: self.graph.parents(node)?.into_iter().collect(),
            next: 0,
        })
    }
}
