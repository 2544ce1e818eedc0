use crate::{
    Config,
    model::{PhotoReference, WeatherLookup},
    provider::{googleplaces::GooglePlacesProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use reqwest::Url;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod googleplaces;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherApi,
    GooglePlaces,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::GooglePlaces => "googleplaces",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherApi, ProviderId::GooglePlaces]
    }

    /// Environment variable that overrides this provider's API key.
    pub fn env_var(&self) -> String {
        format!("WEATHERNOW_{}_KEY", self.as_str().to_uppercase())
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "googleplaces" => Ok(ProviderId::GooglePlaces),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherapi, googleplaces."
            )),
        }
    }
}

/// Source of current conditions for a city.
///
/// `Ok(WeatherLookup::NotFound)` means the provider answered and rejected the
/// city; any `Err` is a transient failure.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(&self, city: &str) -> anyhow::Result<WeatherLookup>;
}

/// Source of background photos for a city.
#[async_trait]
pub trait PlacePhotoProvider: Send + Sync + Debug {
    /// First photo of the first text-search match, if there is one.
    async fn find_photo_reference(&self, city: &str) -> anyhow::Result<Option<PhotoReference>>;

    /// Display URL for a photo. Builds the URL only, no request is made.
    fn photo_url(&self, reference: &PhotoReference) -> anyhow::Result<Url>;
}

/// Construct the weather provider from config.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = ProviderId::WeatherApi;
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `weathernow configure {id}` or set {}.",
            id.env_var()
        )
    })?;

    let provider = match config.provider_base_url(id) {
        Some(base) => WeatherApiProvider::with_base_url(api_key.to_owned(), base)?,
        None => WeatherApiProvider::new(api_key.to_owned()),
    };

    Ok(Arc::new(provider))
}

/// Construct the photo provider from config.
///
/// Returns `None` when no places key is configured; searches then show
/// weather without a background image.
pub fn photo_provider_from_config(
    config: &Config,
) -> anyhow::Result<Option<Arc<dyn PlacePhotoProvider>>> {
    let id = ProviderId::GooglePlaces;
    let Some(api_key) = config.provider_api_key(id) else {
        tracing::info!("No API key for '{id}', background photos disabled");
        return Ok(None);
    };

    let max_width = config.photo.max_width;
    let provider = match config.provider_base_url(id) {
        Some(base) => GooglePlacesProvider::with_base_url(api_key.to_owned(), base, max_width)?,
        None => GooglePlacesProvider::new(api_key.to_owned(), max_width),
    };

    Ok(Some(Arc::new(provider)))
}

/// Validate a configured endpoint and strip any trailing slash.
pub(crate) fn normalize_base_url(base: &str) -> anyhow::Result<String> {
    Url::parse(base).map_err(|e| anyhow::anyhow!("Invalid base URL '{base}': {e}"))?;
    Ok(base.trim_end_matches('/').to_string())
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
