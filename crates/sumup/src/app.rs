use anyhow::{Context, Result};
use sumup_api::ApiClient;

/// Settings shared by every command, taken from the global flags
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub json: bool,
}

impl AppContext {
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(self.api_key.clone(), self.base_url.clone())
            .context("Failed to create API client")
    }
}
