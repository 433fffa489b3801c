/// Errors that can occur while loading the emoji list.
///
/// [`EmojiCatalog::fetch`](crate::EmojiCatalog::fetch) degrades all of these
/// to an empty catalog; they surface only through logs and `try_fetch`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Request could not be built or sent, or the body could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// Body is not a JSON array of emoji entries.
    #[error("invalid emoji list: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
