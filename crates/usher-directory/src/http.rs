//! REST directory client.
//!
//! Expects a conventional read-only API:
//! `GET /businesses`, `GET /businesses/{id}`,
//! `GET /businesses?phone={phone}`.

use async_trait::async_trait;
use tracing::debug;
use usher_core::{business::Business, config::DirectoryConfig, error::UsherError, traits::Directory};

/// Directory backed by a remote HTTP service.
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpDirectory {
    /// Create from config values.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        req
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn list(&self) -> Result<Vec<Business>, UsherError> {
        let url = format!("{}/businesses", self.base_url.trim_end_matches('/'));
        debug!("directory: GET {url}");

        let resp = self
            .request(&url)
            .send()
            .await
            .map_err(|e| UsherError::Directory(format!("list request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(UsherError::Directory(format!("list returned {status}")));
        }

        resp.json()
            .await
            .map_err(|e| UsherError::Directory(format!("failed to parse business list: {e}")))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Business>, UsherError> {
        let url = format!("{}/businesses/{id}", self.base_url.trim_end_matches('/'));
        debug!("directory: GET {url}");

        let resp = self
            .request(&url)
            .send()
            .await
            .map_err(|e| UsherError::Directory(format!("lookup request failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(UsherError::Directory(format!("lookup returned {status}")));
        }

        let business = resp
            .json()
            .await
            .map_err(|e| UsherError::Directory(format!("failed to parse business: {e}")))?;
        Ok(Some(business))
    }

    async fn get_by_phone(&self, phone: &str) -> Result<Option<Business>, UsherError> {
        let url = format!("{}/businesses", self.base_url.trim_end_matches('/'));
        debug!("directory: GET {url}?phone=…");

        let resp = self
            .request(&url)
            .query(&[("phone", phone)])
            .send()
            .await
            .map_err(|e| UsherError::Directory(format!("phone lookup failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(UsherError::Directory(format!(
                "phone lookup returned {status}"
            )));
        }

        let mut matches: Vec<Business> = resp
            .json()
            .await
            .map_err(|e| UsherError::Directory(format!("failed to parse phone lookup: {e}")))?;

        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.remove(0)))
        }
    }
}
