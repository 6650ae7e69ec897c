//! HTTP client for the Wolt restaurant API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::names::{lenient_names, LocalizedName};
use super::{DirectoryClient, VenueStatus, VenueSummary};
use crate::errors::DirectoryError;
use crate::utils::validation::validate_slug;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    value: SearchVenue,
}

#[derive(Debug, Deserialize)]
struct SearchVenue {
    slug: String,
    #[serde(default, deserialize_with = "lenient_names")]
    name: Vec<LocalizedName>,
}

#[derive(Debug, Deserialize)]
struct VenueResponse {
    #[serde(default)]
    results: Vec<VenueDetail>,
}

#[derive(Debug, Deserialize)]
struct VenueDetail {
    online: bool,
    #[serde(default, deserialize_with = "lenient_names")]
    name: Vec<LocalizedName>,
    public_url: String,
}

/// [`DirectoryClient`] backed by the public Wolt API.
#[derive(Clone)]
pub struct WoltDirectory {
    client: Client,
    base_url: String,
}

impl WoltDirectory {
    /// `base_url` without a trailing slash, e.g. `https://restaurant-api.wolt.com`.
    /// Every request is bounded by `timeout`; nothing is retried.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wolt-checker-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_body(&self, request: reqwest::RequestBuilder) -> Result<String, DirectoryError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl DirectoryClient for WoltDirectory {
    async fn search(&self, query: &str) -> Result<Vec<VenueSummary>, DirectoryError> {
        let url = format!("{}/v1/search", self.base_url);
        debug!("Directory search for '{}'", query);

        let body = self
            .get_body(
                self.client
                    .get(&url)
                    .query(&[("sort", "relevancy"), ("q", query)]),
            )
            .await?;

        parse_search(&body)
    }

    async fn get_status(&self, slug: &str) -> Result<VenueStatus, DirectoryError> {
        // Anything else could step out of the venue path
        if validate_slug(slug).is_err() {
            return Err(DirectoryError::NotFound(slug.to_string()));
        }

        let url = format!("{}/v3/venues/slug/{}", self.base_url, slug);
        debug!("Directory status lookup for '{}'", slug);

        let body = self.get_body(self.client.get(&url)).await?;
        parse_status(slug, &body)
    }
}

/// Hits that are not venues (no `value.slug`) are skipped; source order is kept.
pub(crate) fn parse_search(body: &str) -> Result<Vec<VenueSummary>, DirectoryError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| DirectoryError::Parse(e.to_string()))?;

    Ok(response
        .results
        .into_iter()
        .filter_map(|hit| serde_json::from_value::<SearchHit>(hit).ok())
        .map(|hit| VenueSummary {
            slug: hit.value.slug,
            names: hit.value.name,
        })
        .collect())
}

pub(crate) fn parse_status(slug: &str, body: &str) -> Result<VenueStatus, DirectoryError> {
    let response: VenueResponse =
        serde_json::from_str(body).map_err(|e| DirectoryError::Parse(e.to_string()))?;

    let venue = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| DirectoryError::NotFound(slug.to_string()))?;

    Ok(VenueStatus {
        online: venue.online,
        names: venue.name,
        public_url: venue.public_url,
    })
}
