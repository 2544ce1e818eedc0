//! Core library for the `weathernow` city weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the weather and place-photo providers
//! - The search widget: input handling, the two-stage lookup pipeline and
//!   the presentation state it feeds
//!
//! It is used by `weathernow-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod presentation;
pub mod provider;
pub mod search;

pub use config::{Config, NotificationConfig, PhotoConfig, ProviderConfig};
pub use error::{Busy, LookupError};
pub use input::InputController;
pub use model::{LookupResult, PhotoReference, PlacePhoto, WeatherLookup, WeatherRecord};
pub use pipeline::LookupPipeline;
pub use presentation::{Notification, PresentationState, View};
pub use provider::{PlacePhotoProvider, ProviderId, WeatherProvider};
pub use search::{SubmitOutcome, WeatherSearch};
