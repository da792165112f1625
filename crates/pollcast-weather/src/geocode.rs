//! Location name to coordinates, memoized per exact query string.

use std::sync::Arc;

use pollcast_core::GeocodeError;

use crate::cache::{GeocodeCache, MemoryGeocodeCache};
use crate::provider::GeocodeProvider;
use crate::retry::{with_retry, RetryPolicy};
use crate::types::Coordinates;

/// Resolves free-text locations with an unbounded memo cache.
///
/// Queries are used verbatim as cache keys: "Paris" and "paris" are looked
/// up separately. Callers reject blank input before calling `resolve`.
pub struct GeocodeResolver {
    provider: Arc<dyn GeocodeProvider>,
    cache: Arc<dyn GeocodeCache>,
    retry: RetryPolicy,
}

impl GeocodeResolver {
    pub fn new(provider: Arc<dyn GeocodeProvider>, retry: RetryPolicy) -> Self {
        Self::with_cache(provider, Arc::new(MemoryGeocodeCache::new()), retry)
    }

    pub fn with_cache(
        provider: Arc<dyn GeocodeProvider>,
        cache: Arc<dyn GeocodeCache>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            cache,
            retry,
        }
    }

    pub fn cache(&self) -> &dyn GeocodeCache {
        self.cache.as_ref()
    }

    /// Resolve `location` to coordinates.
    ///
    /// Only the request is retried. A successful response with no match
    /// fails straight away and leaves the cache untouched.
    pub async fn resolve(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        if let Some(coords) = self.cache.get(location) {
            tracing::debug!("Geocode cache hit for '{}'", location);
            return Ok(coords);
        }

        tracing::debug!("Geocode cache miss for '{}'", location);
        let matches = with_retry(&self.retry, "Geocode request", || {
            self.provider.geocode(location)
        })
        .await
        .map_err(|cause| {
            tracing::error!("Geocoding '{}' failed: {}", location, cause);
            GeocodeError::Unavailable { cause }
        })?;

        let Some(best) = matches.into_iter().next() else {
            tracing::warn!("No geocoding match for '{}'", location);
            return Err(GeocodeError::NotFound(location.to_string()));
        };

        let coords = Coordinates::new(best.lat, best.lon);
        self.cache.insert(location.to_string(), coords);
        tracing::info!(
            "Resolved '{}' to {},{} ({})",
            location,
            coords.lat,
            coords.lon,
            best.display_name()
        );
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeocodeMatch;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pollcast_core::NetworkError;
    use std::collections::VecDeque;

    /// Replays scripted responses and records every query
    #[derive(Default)]
    struct ScriptedGeocoder {
        responses: Mutex<VecDeque<Result<Vec<GeocodeMatch>, NetworkError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedGeocoder {
        fn push_ok(&self, lat: f64, lon: f64) {
            self.responses.lock().push_back(Ok(vec![GeocodeMatch {
                lat,
                lon,
                name: "Paris".to_string(),
                country: Some("FR".to_string()),
            }]));
        }

        fn push_err(&self, error: NetworkError) {
            self.responses.lock().push_back(Err(error));
        }

        fn push_empty(&self) {
            self.responses.lock().push_back(Ok(Vec::new()));
        }

        fn calls(&self) -> usize {
            self.queries.lock().len()
        }
    }

    #[async_trait]
    impl GeocodeProvider for ScriptedGeocoder {
        async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, NetworkError> {
            self.queries.lock().push(query.to_string());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(NetworkError::ConnectionFailed("no script".to_string())))
        }
    }

    fn resolver(provider: &Arc<ScriptedGeocoder>) -> GeocodeResolver {
        GeocodeResolver::new(provider.clone(), RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_second_resolve_served_from_cache() {
        let provider = Arc::new(ScriptedGeocoder::default());
        provider.push_ok(48.8566, 2.3522);
        let resolver = resolver(&provider);

        let first = resolver.resolve("Paris").await.unwrap();
        let second = resolver.resolve("Paris").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, Coordinates::new(48.8566, 2.3522));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_differently_cased_queries_are_distinct() {
        let provider = Arc::new(ScriptedGeocoder::default());
        provider.push_ok(48.8566, 2.3522);
        provider.push_ok(48.8566, 2.3522);
        let resolver = resolver(&provider);

        resolver.resolve("Paris").await.unwrap();
        resolver.resolve("paris").await.unwrap();

        assert_eq!(provider.calls(), 2);
        assert_eq!(*provider.queries.lock(), vec!["Paris", "paris"]);
        assert_eq!(resolver.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_no_match_is_not_cached() {
        let provider = Arc::new(ScriptedGeocoder::default());
        provider.push_empty();
        let resolver = resolver(&provider);

        let err = resolver.resolve("Atlantis").await.unwrap_err();

        assert!(matches!(err, GeocodeError::NotFound(ref q) if q == "Atlantis"));
        assert!(err.to_string().contains("Unable to resolve location"));
        assert!(resolver.cache().is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_one_failure() {
        let provider = Arc::new(ScriptedGeocoder::default());
        provider.push_err(NetworkError::Timeout);
        provider.push_ok(45.764, 4.8357);
        let resolver = resolver(&provider);

        let coords = resolver.resolve("Lyon").await.unwrap();

        assert_eq!(coords, Coordinates::new(45.764, 4.8357));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_attempts() {
        let provider = Arc::new(ScriptedGeocoder::default());
        for _ in 0..3 {
            provider.push_err(NetworkError::ServerError {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        provider.push_ok(1.0, 2.0);
        let resolver = resolver(&provider);

        let err = resolver.resolve("Lyon").await.unwrap_err();

        assert!(matches!(err, GeocodeError::Unavailable { .. }));
        assert!(!err.to_string().contains("503"));
        assert_eq!(err.user_message(), GeocodeError::USER_MESSAGE);
        assert_eq!(provider.calls(), 3);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn test_shared_cache_is_consulted() {
        let provider = Arc::new(ScriptedGeocoder::default());
        let cache = Arc::new(MemoryGeocodeCache::new());
        cache.insert("Nice".to_string(), Coordinates::new(43.7, 7.27));
        let resolver = GeocodeResolver::with_cache(provider.clone(), cache, RetryPolicy::default());

        let coords = resolver.resolve("Nice").await.unwrap();

        assert_eq!(coords, Coordinates::new(43.7, 7.27));
        assert_eq!(provider.calls(), 0);
    }
}
