use std::fmt;

use reqwest::Url;

/// Current conditions for a city, copied unmodified from the weather provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherRecord {
    pub temperature_c: f64,
    pub wind_speed_kph: f64,
}

impl fmt::Display for WeatherRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Temperature: {}°C", self.temperature_c)?;
        write!(f, "Windspeed: {} km/h", self.wind_speed_kph)
    }
}

/// Opaque photo token issued by the places provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoReference(String);

impl PhotoReference {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved photo: the reference plus the display URL built from it.
///
/// The URL is never fetched here; loading the image is up to whoever renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacePhoto {
    pub reference: PhotoReference,
    pub url: Url,
}

/// What the weather provider said about a city.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeatherLookup {
    Found(WeatherRecord),
    NotFound,
}

/// Outcome of one complete lookup cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Success {
        weather: WeatherRecord,
        photo: Option<PlacePhoto>,
    },
    CityNotFound,
    TransientFailure(String),
}

impl LookupResult {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupResult::Success { .. })
    }
}
