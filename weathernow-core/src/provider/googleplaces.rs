use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    model::PhotoReference,
    provider::{normalize_base_url, truncate_body},
};

use super::PlacePhotoProvider;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Place photos from the Google Places text-search and photo endpoints.
#[derive(Debug, Clone)]
pub struct GooglePlacesProvider {
    api_key: String,
    base_url: String,
    max_width: u32,
    http: Client,
}

impl GooglePlacesProvider {
    pub fn new(api_key: String, max_width: u32) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), max_width, http: Client::new() }
    }

    pub fn with_base_url(api_key: String, base_url: &str, max_width: u32) -> Result<Self> {
        Ok(Self { api_key, base_url: normalize_base_url(base_url)?, max_width, http: Client::new() })
    }

    async fn text_search(&self, city: &str) -> Result<PlacesSearchResponse> {
        let url = format!("{}/textsearch/json", self.base_url);
        tracing::debug!(city, "Searching places");

        let res = self
            .http
            .get(&url)
            .query(&[("query", city), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to send request to Google Places (text search)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Places text search response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Places text search failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: PlacesSearchResponse =
            serde_json::from_str(&body).context("Failed to parse Places text search JSON")?;

        match parsed.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => Ok(parsed),
            Some(other) => Err(anyhow::anyhow!(
                "Places text search returned {}: {}",
                other,
                parsed.error_message.as_deref().unwrap_or("no details"),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlacePhotoEntry {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    photos: Vec<PlacePhotoEntry>,
}

#[derive(Debug, Deserialize)]
struct PlacesSearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    status: Option<String>,
    error_message: Option<String>,
}

impl PlacesSearchResponse {
    /// First photo of the first result. Later results are never consulted.
    fn first_photo(self) -> Option<PhotoReference> {
        let first = self.results.into_iter().next()?;
        let photo = first.photos.into_iter().next()?;
        Some(PhotoReference::new(photo.photo_reference))
    }
}

#[async_trait]
impl PlacePhotoProvider for GooglePlacesProvider {
    async fn find_photo_reference(&self, city: &str) -> Result<Option<PhotoReference>> {
        Ok(self.text_search(city).await?.first_photo())
    }

    fn photo_url(&self, reference: &PhotoReference) -> Result<Url> {
        let max_width = self.max_width.to_string();
        Url::parse_with_params(
            &format!("{}/photo", self.base_url),
            &[
                ("maxwidth", max_width.as_str()),
                ("photo_reference", reference.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .context("Failed to build Places photo URL")
    }
}
