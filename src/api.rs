use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;

const SEARCH_PATH: &str = "/api/SuperSearch/";
const REPROCESSING_PATH: &str = "/api/Reprocessing/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hit {
    pub uuid: String,
}

/// One page of SuperSearch results. Fields other than `total` and `hits` are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchPage {
    pub total: usize,
    pub hits: Vec<Hit>,
}

/// The two crash-stats endpoints a run talks to.
#[async_trait]
pub trait CrashStatsApi: Send + Sync {
    /// Runs one SuperSearch request with the given query pairs.
    async fn search(&self, params: &[(String, String)]) -> Result<SearchPage>;

    /// Submits crash ids for reprocessing and returns the response status.
    async fn reprocess(&self, crash_ids: &[String], auth_token: &str) -> Result<u16>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CrashStatsApi for HttpApi {
    async fn search(&self, params: &[(String, String)]) -> Result<SearchPage> {
        let url = self.url(SEARCH_PATH);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn reprocess(&self, crash_ids: &[String], auth_token: &str) -> Result<u16> {
        let url = self.url(REPROCESSING_PATH);
        debug!("POST {} ({} crash ids)", url, crash_ids.len());

        let form: Vec<(&str, &str)> = crash_ids
            .iter()
            .map(|id| ("crash_ids", id.as_str()))
            .collect();
        let response = self
            .client
            .post(&url)
            .header("Auth-Token", auth_token)
            .form(&form)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}
