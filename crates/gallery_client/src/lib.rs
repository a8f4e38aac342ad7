use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{CategoryKey, GalleryItem},
    error::ProtocolError,
    protocol::{count_route, items_from_records, items_route, ArtRecord, CountResponse, ItemsQuery},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure of a single gallery query. Both kinds are treated as transient by callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Server {
                status: Some(status.as_u16()),
                message: format!("unexpected status {status}"),
            }
        } else if err.is_decode() {
            Self::Server {
                status: None,
                message: format!("malformed response body: {err}"),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        Self::Server {
            status: None,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("invalid gallery server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported gallery server url scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Read-only queries against the remote gallery service.
#[async_trait]
pub trait GalleryClient: Send + Sync {
    /// Global number of art items, not filtered by category.
    async fn total_count(&self) -> Result<u64, ClientError>;
    async fn items(&self, category: &CategoryKey) -> Result<Vec<GalleryItem>, ClientError>;
}

pub struct HttpGalleryClient {
    http: Client,
    count_url: Url,
    items_url: Url,
}

impl HttpGalleryClient {
    pub fn new(server_url: &str, request_timeout: Duration) -> Result<Self, ClientConfigError> {
        let base = parse_base_url(server_url)?;
        let count_url = join_route(&base, server_url, count_route())?;
        let items_url = join_route(&base, server_url, items_route())?;
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            count_url,
            items_url,
        })
    }

    pub fn count_url(&self) -> &Url {
        &self.count_url
    }

    pub fn items_url(&self) -> &Url {
        &self.items_url
    }
}

#[async_trait]
impl GalleryClient for HttpGalleryClient {
    async fn total_count(&self) -> Result<u64, ClientError> {
        let response: CountResponse = self
            .http
            .get(self.count_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = response.count, "gallery: total count received");
        Ok(response.count)
    }

    async fn items(&self, category: &CategoryKey) -> Result<Vec<GalleryItem>, ClientError> {
        let records: Vec<ArtRecord> = self
            .http
            .get(self.items_url.clone())
            .query(&ItemsQuery {
                category: category.clone(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let items = items_from_records(records)?;
        debug!(category = %category, items = items.len(), "gallery: item list received");
        Ok(items)
    }
}

fn parse_base_url(server_url: &str) -> Result<Url, ClientConfigError> {
    let mut base = Url::parse(server_url.trim()).map_err(|source| ClientConfigError::InvalidUrl {
        url: server_url.to_string(),
        source,
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ClientConfigError::UnsupportedScheme(base.scheme().to_string()));
    }
    // Url::join replaces the last path segment unless the base ends in '/'.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    Ok(base)
}

fn join_route(base: &Url, server_url: &str, route: &str) -> Result<Url, ClientConfigError> {
    base.join(route)
        .map_err(|source| ClientConfigError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
