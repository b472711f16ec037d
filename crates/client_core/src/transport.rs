//! Listing endpoint client.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::ListingResource,
    error::ApiError,
    filter::FilterState,
    protocol::{ListingPayload, ListingResponse},
};
use tracing::debug;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait ListingTransport<T>: Send + Sync {
    async fn fetch(&self, filter: &FilterState) -> Result<ListingResponse<T>>;
}

/// GETs `endpoint?search=..&role=..&company_id=..&page=..` and validates the JSON body.
#[derive(Debug, Clone)]
pub struct HttpListingTransport {
    http: Client,
    endpoint: Url,
}

impl HttpListingTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build listing http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn for_resource(server_url: &str, resource: ListingResource, timeout: Duration) -> Result<Self> {
        let endpoint = resource_endpoint(server_url, resource)?;
        Self::new(endpoint, timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn request_url(&self, filter: &FilterState) -> Url {
        filter.to_query().apply_to(&self.endpoint)
    }
}

pub fn resource_endpoint(server_url: &str, resource: ListingResource) -> Result<Url> {
    let base = Url::parse(server_url.trim_end_matches('/'))
        .with_context(|| format!("invalid server url '{server_url}'"))?;
    let mut endpoint = base.clone();
    endpoint.set_path(&format!(
        "{}{}",
        base.path().trim_end_matches('/'),
        resource.path()
    ));
    endpoint.set_query(None);
    Ok(endpoint)
}

#[async_trait]
impl<T> ListingTransport<T> for HttpListingTransport
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, filter: &FilterState) -> Result<ListingResponse<T>> {
        let url = self.request_url(filter);
        debug!(%url, "fetching listing");

        let res = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("listing request to {url} failed"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let payload: ListingPayload<T> = res
            .json()
            .await
            .with_context(|| format!("failed to decode listing payload from {url}"))?;
        payload
            .into_response()
            .with_context(|| format!("invalid listing payload from {url}"))
    }
}

fn status_error(status: StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => anyhow!(api_error)
            .context(format!("listing endpoint returned {status}")),
        Err(_) => anyhow!("listing endpoint returned {status}"),
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
