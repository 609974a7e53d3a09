use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

mod http_client;
pub use self::http_client::normalize_response;

mod types;
pub use self::types::*;
mod operations;
pub mod stream;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Async client for the instance manager's `/api` surface.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("mc-console")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build reqwest client")?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}
