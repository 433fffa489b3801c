use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Upper bound for the startup fetch of the emoji list.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of the remote emoji list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub name: String,
    /// Absolute image URL.
    pub file: String,
    pub description: String,
}

/// Emoji lookup table. Built once at startup and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmojiCatalog {
    entries: Vec<Emoji>,
}

impl EmojiCatalog {
    pub fn new(entries: Vec<Emoji>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of `{name, file, description}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Fetch the list from `url`, falling back to an empty catalog.
    ///
    /// Never fails: any error is logged as a warning.
    pub async fn fetch(url: &str) -> Self {
        match Self::try_fetch(url).await {
            Ok(catalog) => {
                tracing::info!(count = catalog.len(), "loaded emojis");
                catalog
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "failed to load emoji list");
                Self::default()
            }
        }
    }

    /// Fetch the list from `url`, reporting failures.
    pub async fn try_fetch(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }
        let body = response.text().await?;
        Self::from_json(&body)
    }

    /// Look up an emoji by exact name.
    pub fn get(&self, name: &str) -> Option<&Emoji> {
        self.entries.iter().find(|emoji| emoji.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emoji> {
        self.entries.iter()
    }
}
