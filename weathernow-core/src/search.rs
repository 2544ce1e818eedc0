use crate::{
    Config,
    input::InputController,
    model::LookupResult,
    pipeline::LookupPipeline,
    presentation::PresentationState,
};

/// What happened to one press of "search".
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Input was blank; a validation notification was shown and nothing was sent.
    Rejected,
    Completed(LookupResult),
    /// Another lookup was still running, so this one was dropped.
    Ignored,
}

/// The search widget: text input, lookup pipeline and what is on screen.
#[derive(Debug, Clone)]
pub struct WeatherSearch {
    input: InputController,
    pipeline: LookupPipeline,
    state: PresentationState,
}

impl WeatherSearch {
    pub fn new(pipeline: LookupPipeline, state: PresentationState) -> Self {
        Self { input: InputController::new(), pipeline, state }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            LookupPipeline::from_config(config)?,
            PresentationState::from_config(&config.notifications),
        ))
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.input.set_query(text);
    }

    pub fn query(&self) -> &str {
        self.input.query()
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PresentationState {
        &mut self.state
    }

    pub fn pipeline(&self) -> &LookupPipeline {
        &self.pipeline
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let city = match self.input.submit() {
            Ok(city) => city,
            Err(_) => {
                self.state.notify_validation_error();
                return SubmitOutcome::Rejected;
            }
        };

        match self.pipeline.lookup(&city).await {
            Ok(result) => {
                self.state.update(result.clone());
                SubmitOutcome::Completed(result)
            }
            Err(busy) => {
                tracing::debug!(city = %city, "{busy}, ignoring submit");
                SubmitOutcome::Ignored
            }
        }
    }
}
