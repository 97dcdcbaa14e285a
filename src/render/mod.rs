pub mod dot;

pub use dot::GraphRenderer;
