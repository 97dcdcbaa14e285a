pub mod cache;
pub mod wikitree;

pub use cache::{FileSource, ResponseCache};
pub use wikitree::WikiTreeClient;

use crate::types::{AncestorLists, AncestorRecord, AncestorsResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// Where ancestor lists come from.
///
/// `Ok(None)` means the list could not be retrieved; implementations never
/// return partial data. `Err` is reserved for caller mistakes such as an
/// invalid key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AncestorSource: Send + Sync {
    async fn fetch_ancestors(&self, key: &str) -> Result<Option<Vec<AncestorRecord>>>;
}

/// Fetch both individuals concurrently
pub async fn fetch_family_tree_data(
    source: &dyn AncestorSource,
    first: &str,
    second: &str,
) -> Result<AncestorLists> {
    info!("Fetching ancestors of {} and {}", first, second);

    let (first_records, second_records) = tokio::join!(
        source.fetch_ancestors(first),
        source.fetch_ancestors(second)
    );

    let lists = AncestorLists {
        first: first.to_string(),
        second: second.to_string(),
        first_records: first_records.with_context(|| format!("Failed to fetch ancestors of {}", first))?,
        second_records: second_records.with_context(|| format!("Failed to fetch ancestors of {}", second))?,
    };

    if lists.first_records.is_none() || lists.second_records.is_none() {
        warn!("Could not fetch family tree data for one or both individuals");
    }

    Ok(lists)
}

/// Extract the ancestor list from a raw `getAncestors` body
pub fn parse_ancestors_response(body: &str) -> Result<Option<Vec<AncestorRecord>>> {
    let envelopes: Vec<AncestorsResponse> =
        serde_json::from_str(body).context("Failed to parse getAncestors response")?;

    Ok(envelopes.into_iter().next().and_then(|envelope| envelope.ancestors))
}
