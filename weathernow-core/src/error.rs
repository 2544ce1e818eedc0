use thiserror::Error;

use crate::model::LookupResult;

/// Every way a search can fail from the user's point of view.
///
/// None of these are fatal: after any of them the user can edit the query and
/// submit again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("empty city name")]
    Validation,

    #[error("city not found")]
    CityNotFound,

    #[error("lookup failed: {0}")]
    Transient(String),
}

impl LookupError {
    /// Text shown in the notification for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::Validation => "Please enter a city name",
            LookupError::CityNotFound => "City not found. Please enter a valid city name.",
            LookupError::Transient(_) => "Something went wrong. Please try again later.",
        }
    }
}

impl LookupResult {
    /// The error carried by a failed lookup, if any.
    pub fn error(&self) -> Option<LookupError> {
        match self {
            LookupResult::Success { .. } => None,
            LookupResult::CityNotFound => Some(LookupError::CityNotFound),
            LookupResult::TransientFailure(detail) => Some(LookupError::Transient(detail.clone())),
        }
    }
}

/// Returned by the pipeline when a lookup is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a lookup is already in progress")]
pub struct Busy;
