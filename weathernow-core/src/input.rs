use crate::error::LookupError;

/// Holds the text the user is typing.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    query: String,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the raw text exactly as typed.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Trimmed city name to look up, or a validation error if there is none.
    ///
    /// The stored query is left untouched either way.
    pub fn submit(&self) -> Result<String, LookupError> {
        let city = self.query.trim();
        if city.is_empty() {
            return Err(LookupError::Validation);
        }
        Ok(city.to_string())
    }
}
