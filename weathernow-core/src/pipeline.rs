//! The two-stage lookup: weather first, then (only on success) a background photo.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    Config,
    error::Busy,
    model::{LookupResult, PlacePhoto, WeatherLookup},
    provider::{
        PlacePhotoProvider, WeatherProvider, photo_provider_from_config,
        weather_provider_from_config,
    },
};

/// Runs lookups against the configured providers.
///
/// Clones share one in-flight token, so at most one lookup runs at a time
/// across all of them.
#[derive(Debug, Clone)]
pub struct LookupPipeline {
    weather: Arc<dyn WeatherProvider>,
    photos: Option<Arc<dyn PlacePhotoProvider>>,
    in_flight: Arc<AtomicBool>,
}

impl LookupPipeline {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        photos: Option<Arc<dyn PlacePhotoProvider>>,
    ) -> Self {
        Self { weather, photos, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(weather_provider_from_config(config)?, photo_provider_from_config(config)?))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Look up `city`, or return `Busy` without touching the network if
    /// another lookup has not finished yet.
    pub async fn lookup(&self, city: &str) -> Result<LookupResult, Busy> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(Busy)?;
        Ok(self.run(city).await)
    }

    async fn run(&self, city: &str) -> LookupResult {
        let weather = match self.weather.current_conditions(city).await {
            Ok(WeatherLookup::Found(record)) => record,
            Ok(WeatherLookup::NotFound) => {
                tracing::info!(city, "City not found");
                return LookupResult::CityNotFound;
            }
            Err(e) => {
                tracing::error!(city, error = ?e, "Weather lookup failed");
                return LookupResult::TransientFailure(format!("{e:#}"));
            }
        };

        let photo = self.try_resolve_photo(city).await.unwrap_or_else(|e| {
            tracing::warn!(city, error = %format!("{e:#}"), "Photo lookup failed, showing weather only");
            None
        });

        LookupResult::Success { weather, photo }
    }

    async fn try_resolve_photo(&self, city: &str) -> anyhow::Result<Option<PlacePhoto>> {
        let Some(photos) = &self.photos else {
            return Ok(None);
        };

        let Some(reference) = photos.find_photo_reference(city).await? else {
            tracing::debug!(city, "No photo for city");
            return Ok(None);
        };

        let url = photos.photo_url(&reference)?;
        Ok(Some(PlacePhoto { reference, url }))
    }
}

/// Holds the in-flight flag; releasing happens on drop, so a cancelled or
/// panicking lookup still frees the pipeline.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{PhotoReference, WeatherRecord};
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Debug)]
    pub(crate) struct FakeWeather {
        pub outcome: fn() -> anyhow::Result<WeatherLookup>,
        pub calls: AtomicUsize,
        pub gate: Option<Arc<Notify>>,
    }

    impl FakeWeather {
        pub fn returning(outcome: fn() -> anyhow::Result<WeatherLookup>) -> Self {
            Self { outcome, calls: AtomicUsize::new(0), gate: None }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn current_conditions(&self, _city: &str) -> anyhow::Result<WeatherLookup> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            (self.outcome)()
        }
    }

    #[derive(Debug)]
    pub(crate) struct FakePhotos {
        pub outcome: fn() -> anyhow::Result<Option<PhotoReference>>,
        pub calls: AtomicUsize,
    }

    impl FakePhotos {
        pub fn returning(outcome: fn() -> anyhow::Result<Option<PhotoReference>>) -> Self {
            Self { outcome, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl PlacePhotoProvider for FakePhotos {
        async fn find_photo_reference(
            &self,
            _city: &str,
        ) -> anyhow::Result<Option<PhotoReference>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }

        fn photo_url(&self, reference: &PhotoReference) -> anyhow::Result<Url> {
            Ok(Url::parse_with_params(
                "https://photos.test/photo",
                &[("photo_reference", reference.as_str())],
            )?)
        }
    }

    pub(crate) fn paris() -> anyhow::Result<WeatherLookup> {
        Ok(WeatherLookup::Found(WeatherRecord { temperature_c: 18.0, wind_speed_kph: 12.0 }))
    }

    pub(crate) fn abc123() -> anyhow::Result<Option<PhotoReference>> {
        Ok(Some(PhotoReference::new("abc123")))
    }

    fn pipeline(weather: &Arc<FakeWeather>, photos: &Arc<FakePhotos>) -> LookupPipeline {
        LookupPipeline::new(weather.clone(), Some(photos.clone()))
    }

    #[tokio::test]
    async fn success_with_photo() {
        let weather = Arc::new(FakeWeather::returning(paris));
        let photos = Arc::new(FakePhotos::returning(abc123));

        let result = pipeline(&weather, &photos).lookup("Paris").await.unwrap();

        let LookupResult::Success { weather: record, photo } = result else {
            panic!("expected success, got {result:?}");
        };
        assert_eq!(record, WeatherRecord { temperature_c: 18.0, wind_speed_kph: 12.0 });
        let photo = photo.expect("photo resolved");
        assert_eq!(photo.reference.as_str(), "abc123");
        assert!(photo.url.as_str().contains("photo_reference=abc123"));
    }

    #[tokio::test]
    async fn city_not_found_skips_photo_lookup() {
        let weather = Arc::new(FakeWeather::returning(|| Ok(WeatherLookup::NotFound)));
        let photos = Arc::new(FakePhotos::returning(abc123));

        let result = pipeline(&weather, &photos).lookup("Zzzzqx").await.unwrap();

        assert_eq!(result, LookupResult::CityNotFound);
        assert_eq!(photos.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn weather_failure_is_transient_and_skips_photo_lookup() {
        let weather = Arc::new(FakeWeather::returning(|| Err(anyhow::anyhow!("connection reset"))));
        let photos = Arc::new(FakePhotos::returning(abc123));

        let result = pipeline(&weather, &photos).lookup("Paris").await.unwrap();

        assert!(matches!(result, LookupResult::TransientFailure(ref d) if d.contains("connection reset")));
        assert_eq!(photos.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn photo_failure_degrades_to_weather_only() {
        let weather = Arc::new(FakeWeather::returning(paris));
        let photos = Arc::new(FakePhotos::returning(|| Err(anyhow::anyhow!("places down"))));

        let result = pipeline(&weather, &photos).lookup("Paris").await.unwrap();

        assert!(matches!(result, LookupResult::Success { photo: None, .. }));
        assert_eq!(photos.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_photo_is_success_without_image() {
        let weather = Arc::new(FakeWeather::returning(paris));
        let photos = Arc::new(FakePhotos::returning(|| Ok(None)));

        let result = pipeline(&weather, &photos).lookup("Paris").await.unwrap();

        assert!(matches!(result, LookupResult::Success { photo: None, .. }));
    }

    #[tokio::test]
    async fn no_photo_provider_means_weather_only() {
        let weather = Arc::new(FakeWeather::returning(paris));
        let pipeline = LookupPipeline::new(weather, None);

        let result = pipeline.lookup("Paris").await.unwrap();

        assert!(matches!(result, LookupResult::Success { photo: None, .. }));
    }

    #[tokio::test]
    async fn second_lookup_while_busy_is_rejected() {
        let gate = Arc::new(Notify::new());
        let weather = Arc::new(FakeWeather {
            gate: Some(gate.clone()),
            ..FakeWeather::returning(paris)
        });
        let photos = Arc::new(FakePhotos::returning(abc123));
        let pipeline = pipeline(&weather, &photos);

        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.lookup("Paris").await })
        };
        while !pipeline.is_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(pipeline.lookup("London").await, Err(Busy));
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let first = first.await.expect("task completes").expect("first lookup ran");
        assert!(first.is_success());
        assert!(!pipeline.is_busy());
    }

    #[tokio::test]
    async fn guard_is_released_after_each_lookup() {
        let weather = Arc::new(FakeWeather::returning(|| Err(anyhow::anyhow!("timeout"))));
        let photos = Arc::new(FakePhotos::returning(abc123));
        let pipeline = pipeline(&weather, &photos);

        assert!(pipeline.lookup("A").await.is_ok());
        assert!(pipeline.lookup("B").await.is_ok());
        assert_eq!(weather.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_lookup_releases_guard() {
        let gate = Arc::new(Notify::new());
        let weather = Arc::new(FakeWeather {
            gate: Some(gate),
            ..FakeWeather::returning(paris)
        });
        let photos = Arc::new(FakePhotos::returning(abc123));
        let pipeline = pipeline(&weather, &photos);

        {
            let lookup = pipeline.lookup("Paris");
            tokio::pin!(lookup);
            assert!(poll_once(lookup.as_mut()).await.is_none());
            assert!(pipeline.is_busy());
        }

        assert!(!pipeline.is_busy());
    }

    /// Polls a future once and reports whether it finished.
    async fn poll_once<F: std::future::Future + Unpin>(fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            out = fut => Some(out),
            _ = std::future::ready(()) => None,
        }
    }
}
