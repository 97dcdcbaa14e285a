pub mod config;
pub mod error;
pub mod lineage;
pub mod render;
pub mod reports;
pub mod source;
pub mod types;

pub use error::{LcaError, Result};
