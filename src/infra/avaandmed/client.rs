use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, info};

use accident_harm::fetch::auth::ApiKey;
use accident_harm::fetch::{BasicClient, fetch_json, post_bytes, post_json};

use crate::services::dataset_api::{DatasetApi, DatasetInfo};

pub const DEFAULT_API_URL: &str = "https://avaandmed.eesti.ee/api";

/// Client for the Estonian open-data portal.
///
/// An API key pair is exchanged once for an access token; every later request
/// carries that token as a bearer header.
pub struct AvaandmedClient {
    base_url: String,
    http: ApiKey<BasicClient>,
}

impl AvaandmedClient {
    pub async fn new(base_url: &str, key_id: &str, key: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let access_token = Self::exchange_token(&base_url, key_id, key).await?;

        Ok(Self {
            http: ApiKey::bearer(BasicClient::new()?, &access_token)?,
            base_url,
        })
    }

    /// Reads `AVAANDMED_API_KEY_ID`, `AVAANDMED_API_KEY` and optionally
    /// `AVAANDMED_API_URL` from the environment.
    pub async fn from_env() -> Result<Self> {
        let key_id = std::env::var("AVAANDMED_API_KEY_ID")
            .context("AVAANDMED_API_KEY_ID must be set (.env)")?;
        let key =
            std::env::var("AVAANDMED_API_KEY").context("AVAANDMED_API_KEY must be set (.env)")?;
        let base_url =
            std::env::var("AVAANDMED_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&base_url, &key_id, &key).await
    }

    async fn exchange_token(base_url: &str, key_id: &str, key: &str) -> Result<String> {
        let client = ApiKey::key_pair(BasicClient::new()?, key_id, key)?;
        let response = post_json(&client, &format!("{base_url}/auth/key-login"))
            .await
            .context("Key exchange failed")?;

        let token = response["data"]["accessToken"]
            .as_str()
            .ok_or_else(|| anyhow!("Key exchange response has no data.accessToken"))?;
        debug!("Access token received");
        Ok(token.to_string())
    }
}

#[async_trait]
impl DatasetApi for AvaandmedClient {
    async fn dataset_info(&self, dataset_id: &str) -> Result<DatasetInfo> {
        let url = format!("{}/datasets/{}", self.base_url, dataset_id);
        let json = fetch_json(&self.http, &url).await?;
        DatasetInfo::from_json(&json)
    }

    async fn fetch_dataset_file(&self, dataset_id: &str, file_id: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/datasets/{}/files/{}/download",
            self.base_url, dataset_id, file_id
        );
        let bytes = post_bytes(&self.http, &url).await?;
        info!(dataset_id, file_id, bytes = bytes.len(), "Dataset file downloaded");
        Ok(bytes)
    }
}
