//! What the user currently sees: the last completed lookup plus transient notifications.

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;

use crate::{
    config::{DEFAULT_AUTO_DISMISS_MS, NotificationConfig},
    error::LookupError,
    model::{LookupResult, WeatherRecord},
};

/// A top-of-screen message that disappears after a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub cause: LookupError,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn message(&self) -> &'static str {
        self.cause.user_message()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// How the current state should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    /// Weather text laid over the city photo.
    Overlay { weather: WeatherRecord, image_url: &'a Url },
    /// Weather text on its own, no photo available.
    TextOnly { weather: WeatherRecord },
    Empty,
}

#[derive(Debug, Clone)]
pub struct PresentationState {
    weather: Option<WeatherRecord>,
    image_url: Option<Url>,
    notifications: Vec<Notification>,
    auto_dismiss: Duration,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_AUTO_DISMISS_MS as i64))
    }
}

impl PresentationState {
    pub fn new(auto_dismiss: Duration) -> Self {
        Self { weather: None, image_url: None, notifications: Vec::new(), auto_dismiss }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        // Capped at a day; anything longer is effectively "never".
        let ms = config.auto_dismiss_ms.min(86_400_000) as i64;
        Self::new(Duration::milliseconds(ms))
    }

    pub fn weather(&self) -> Option<&WeatherRecord> {
        self.weather.as_ref()
    }

    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    /// Every notification issued so far that has not been dismissed.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn update(&mut self, result: LookupResult) {
        self.update_at(result, Utc::now());
    }

    /// Apply a completed lookup. Weather and image are always replaced together.
    ///
    /// Failed lookups clear both fields, so nothing on screen ever belongs to
    /// an older search than the last one that finished.
    pub fn update_at(&mut self, result: LookupResult, now: DateTime<Utc>) {
        match result {
            LookupResult::Success { weather, photo } => {
                self.weather = Some(weather);
                self.image_url = photo.map(|p| p.url);
            }
            LookupResult::CityNotFound => {
                self.clear();
                self.notify_at(LookupError::CityNotFound, now);
            }
            LookupResult::TransientFailure(detail) => {
                self.clear();
                self.notify_at(LookupError::Transient(detail), now);
            }
        }
    }

    pub fn notify_validation_error(&mut self) {
        self.notify_at(LookupError::Validation, Utc::now());
    }

    pub fn notify_at(&mut self, cause: LookupError, now: DateTime<Utc>) {
        self.notifications.push(Notification {
            cause,
            issued_at: now,
            expires_at: now + self.auto_dismiss,
        });
    }

    pub fn active_notifications(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(move |n| n.is_active(now))
    }

    /// Drop every notification whose display time has passed.
    pub fn dismiss_expired(&mut self, now: DateTime<Utc>) {
        self.notifications.retain(|n| n.is_active(now));
    }

    pub fn view(&self) -> View<'_> {
        match (self.weather, self.image_url.as_ref()) {
            (Some(weather), Some(image_url)) => View::Overlay { weather, image_url },
            (Some(weather), None) => View::TextOnly { weather },
            (None, _) => View::Empty,
        }
    }

    fn clear(&mut self) {
        self.weather = None;
        self.image_url = None;
    }
}
