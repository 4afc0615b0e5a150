use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info};

pub mod literal;
pub mod sql;

pub use literal::LiteralIdentifierSource;
pub use sql::SqlIdentifierSource;

pub type IdentifierSourceBox = Box<dyn IdentifierSource + Send + Sync>;

/// Produces the ordered identifiers whose objects are migrated.
#[async_trait]
pub trait IdentifierSource {
    async fn fetch_ids(&self) -> Result<Vec<String>>;
    fn describe(&self) -> String;
}

/// A source that fails yields no identifiers. The failure is logged, not propagated.
pub async fn fetch_identifiers_or_empty(source: &(dyn IdentifierSource + Send + Sync)) -> Vec<String> {
    match source.fetch_ids().await {
        Ok(ids) => {
            info!(
                source = source.describe(),
                identifier_count = ids.len(),
                "identifiers fetched."
            );
            ids
        }
        Err(e) => {
            error!(
                source = source.describe(),
                error = format!("{e:?}"),
                "failed to fetch identifiers."
            );
            vec![]
        }
    }
}
