use crate::lineage::graph::{FamilyGraph, Relation};
use anyhow::{Context, Result};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use std::path::{Path, PathBuf};
use tracing::info;

const ROOT_STYLE: &str = "style=filled, fillcolor=lightblue";
const LINEAGE_STYLE: &str = "style=dashed, color=gray";

/// Graphviz output for a family graph
pub struct GraphRenderer;

impl GraphRenderer {
    /// DOT text for the whole graph, top-down, with `root` highlighted
    pub fn to_dot(graph: &FamilyGraph, root: Option<&str>) -> String {
        let edge_attrs = |_: &DiGraph<String, Relation>, edge: EdgeReference<'_, Relation>| match edge.weight() {
            Relation::Parent => String::new(),
            Relation::Lineage => LINEAGE_STYLE.to_string(),
        };
        let node_attrs = |_: &DiGraph<String, Relation>, (_, name): (NodeIndex, &String)| {
            if Some(name.as_str()) == root {
                ROOT_STYLE.to_string()
            } else {
                String::new()
            }
        };

        let dot = Dot::with_attr_getters(graph.inner(), &[Config::EdgeNoLabel], &edge_attrs, &node_attrs);

        format!("{}", dot).replacen("digraph {", "digraph {\n    rankdir=TB", 1)
    }

    /// Write `tree_<key>.dot` into `directory`
    pub async fn render_tree<P: AsRef<Path>>(
        graph: &FamilyGraph,
        root: &str,
        key: &str,
        directory: P,
    ) -> Result<PathBuf> {
        let directory = directory.as_ref();
        tokio::fs::create_dir_all(directory)
            .await
            .with_context(|| format!("Failed to create render directory {:?}", directory))?;

        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let path = directory.join(format!("tree_{}.dot", file_name));

        tokio::fs::write(&path, Self::to_dot(graph, Some(root)))
            .await
            .with_context(|| format!("Failed to write graph to {:?}", path))?;

        info!("Visualized tree for {} rooted at {} in {:?}", key, root, path);
        Ok(path)
    }
}
