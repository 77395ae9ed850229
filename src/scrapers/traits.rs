use crate::error::Result;
use async_trait::async_trait;

/// How the scraper talks to the portal.
/// Lets tests serve canned bodies instead of hitting the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body, failing on a non-success status.
    async fn get_text(&self, url: &str) -> Result<String>;
}
