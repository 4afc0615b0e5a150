use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::identifier::IdentifierSource;

pub struct LiteralIdentifierSource {
    ids: String,
}

impl LiteralIdentifierSource {
    pub fn new(ids: &str) -> Self {
        Self {
            ids: ids.to_string(),
        }
    }
}

#[async_trait]
impl IdentifierSource for LiteralIdentifierSource {
    async fn fetch_ids(&self) -> Result<Vec<String>> {
        Ok(parse_identifiers(&self.ids))
    }

    fn describe(&self) -> String {
        "list".to_string()
    }
}

/// Splits on `,` and keeps the trimmed tokens that are ASCII digits only, in order.
pub fn parse_identifiers(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(str::trim)
        .filter(|token| {
            let is_identifier = !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit());
            if !is_identifier && !token.is_empty() {
                debug!(token = token, "non numeric identifier ignored.");
            }
            is_identifier
        })
        .map(str::to_string)
        .collect()
}
