use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::scrapers::traits::Transport;

/// [`Transport`] over a reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Portal returned status: {}", status);
            return Err(Error::RemoteStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Downloaded {} bytes", body.len());
        Ok(body)
    }
}
