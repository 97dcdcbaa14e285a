pub mod analyzer;
pub mod ancestry;
pub mod builder;
pub mod graph;
pub mod lca;
pub mod traversal;

pub use analyzer::{AncestryAnalyzer, ResolvedQuery};
pub use ancestry::AncestorResolver;
pub use builder::DagBuilder;
pub use graph::{FamilyGraph, Relation};
pub use lca::LcaSelector;
pub use traversal::GraphTraversal;
