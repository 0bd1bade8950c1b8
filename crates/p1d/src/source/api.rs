//! HTTP API source.
//!
//! Some meters sit behind a network bridge that serves the most recent
//! raw telegram over plain HTTP. One GET per read cycle; the body is
//! the telegram text verbatim.

use std::time::Duration;

use reqwest::Client;

use super::SourceError;

pub struct ApiSource {
    endpoint: String,
    client: Client,
}

impl ApiSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch one telegram body and split it into lines, terminators kept.
    pub async fn read_lines(&mut self) -> Result<Vec<String>, SourceError> {
        let response = self.client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status()));
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(body.split_inclusive('\n').map(str::to_string).collect())
    }
}
