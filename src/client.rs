//! Detail endpoint client
//!
//! `GET {base}/targetdetailsjson/{channel}/{target}` returns
//! `{ "reasons": [...], "graph": "<url>" }`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DetailError;
use crate::model::{Board, DetailResponse, TargetKey};

/// Anything that can produce the detail payload for a target
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_detail(&self, key: &TargetKey) -> Result<DetailResponse, DetailError>;
}

#[async_trait]
impl<T: DetailSource + ?Sized> DetailSource for Arc<T> {
    async fn fetch_detail(&self, key: &TargetKey) -> Result<DetailResponse, DetailError> {
        (**self).fetch_detail(key).await
    }
}

/// Build the detail URL; both path segments are percent-encoded.
pub fn detail_url(base_url: &str, key: &TargetKey) -> String {
    format!(
        "{}/targetdetailsjson/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&key.channel),
        urlencoding::encode(&key.target)
    )
}

/// Fetches details over HTTP
#[derive(Debug, Clone)]
pub struct HttpDetailSource {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpDetailSource {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, DetailError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            timeout: Duration::from_millis(timeout_ms),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DetailSource for HttpDetailSource {
    async fn fetch_detail(&self, key: &TargetKey) -> Result<DetailResponse, DetailError> {
        let url = detail_url(&self.base_url, key);
        log::debug!("GET {}", url);

        let res = self.http.get(&url).timeout(self.timeout).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(DetailError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = res.text().await?;
        DetailResponse::from_json(&body)
    }
}

/// Serves details straight from a board file's fixture map
#[derive(Debug, Clone)]
pub struct BoardDetailSource {
    board: Board,
}

impl BoardDetailSource {
    pub fn new(board: Board) -> Self {
        Self { board }
    }
}

#[async_trait]
impl DetailSource for BoardDetailSource {
    async fn fetch_detail(&self, key: &TargetKey) -> Result<DetailResponse, DetailError> {
        if key.channel != self.board.channel {
            return Err(DetailError::Status {
                status: 404,
                url: key.to_string(),
            });
        }
        match self.board.detail_for(&key.target) {
            Some(value) => DetailResponse::from_value(value.clone()),
            None => Err(DetailError::Status {
                status: 404,
                url: key.to_string(),
            }),
        }
    }
}
