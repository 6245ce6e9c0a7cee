//! Session lookups backed by the resilient cache
//!
//! Each operation builds its own cache key from its filters and hands the remote call
//! and the mapping step to [`ResilientFetch`].

use chrono::Utc;

use crate::cache::CacheKey;
use crate::data::{map_sessions, ApiError, ApiSession, Session, SessionSource};
use crate::fetch::{FetchError, FetchResult, ResilientFetch};

/// Cache key for the latest-session lookup
const LATEST_KEY: &str = "latest";

/// Namespace for single-session lookups
const GET_SESSION_KEY: &str = "getsession";

/// Namespace for weekend lookups
const WEEKEND_KEY: &str = "weekend";

/// Looks up sessions from a remote source through the cache
#[derive(Debug)]
pub struct SessionService<S> {
    source: S,
    fetcher: ResilientFetch,
}

impl<S: SessionSource> SessionService<S> {
    pub fn new(source: S, fetcher: ResilientFetch) -> Self {
        Self { source, fetcher }
    }

    /// The latest (current or next) session
    pub async fn next(&self) -> Result<FetchResult<Session>, FetchError> {
        let key = CacheKey::new(LATEST_KEY);
        let now = Utc::now();
        self.fetcher
            .fetch(&key, || self.source.next(), |raw: &ApiSession| Session::from_api(raw, now))
            .await
    }

    /// The first session matching country, session type and year
    pub async fn get_session(
        &self,
        country: &str,
        session_type: &str,
        year: i32,
    ) -> Result<FetchResult<Session>, FetchError> {
        let key = Self::get_session_key(country, session_type, year);
        let now = Utc::now();
        self.fetcher
            .fetch(
                &key,
                || self.source.get_session(country, session_type, year),
                |raw: &ApiSession| Session::from_api(raw, now),
            )
            .await
    }

    /// All sessions of a country's race weekend in a year, in start order
    ///
    /// An empty answer from the API yields no value and is not cached.
    pub async fn weekend(&self, country: &str, year: i32) -> Result<FetchResult<Vec<Session>>, FetchError> {
        let key = Self::weekend_key(country, year);
        let now = Utc::now();
        self.fetcher
            .fetch(
                &key,
                || async {
                    let sessions = self.source.get_sessions(country, year).await?;
                    Ok::<_, ApiError>(sessions.filter(|s| !s.is_empty()))
                },
                |raw: &Vec<ApiSession>| {
                    let mut sessions = map_sessions(raw, now)?;
                    sessions.sort_by_key(|s| s.date_start);
                    Ok(sessions)
                },
            )
            .await
    }

    fn get_session_key(country: &str, session_type: &str, year: i32) -> CacheKey {
        CacheKey::new(GET_SESSION_KEY)
            .with(country)
            .with(&year.to_string())
            .with(session_type)
    }

    fn weekend_key(country: &str, year: i32) -> CacheKey {
        CacheKey::new(WEEKEND_KEY).with(country).with(&year.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::data::SessionState;
    use crate::fetch::STALE_CACHE_WARNING;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// A source that replays a fixed answer and counts calls
    #[derive(Default)]
    struct MockSource {
        sessions: Option<Vec<ApiSession>>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn returning(sessions: Vec<ApiSession>) -> Self {
            Self {
                sessions: Some(sessions),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn respond(&self) -> Result<Option<Vec<ApiSession>>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Status {
                    path: "/sessions".to_string(),
                    status: 500,
                });
            }
            Ok(self.sessions.clone())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionSource for MockSource {
        async fn next(&self) -> Result<Option<ApiSession>, ApiError> {
            Ok(self.respond()?.and_then(|s| s.into_iter().next()))
        }

        async fn get_session(&self, _: &str, _: &str, _: i32) -> Result<Option<ApiSession>, ApiError> {
            Ok(self.respond()?.and_then(|s| s.into_iter().next()))
        }

        async fn get_sessions(&self, _: &str, _: i32) -> Result<Option<Vec<ApiSession>>, ApiError> {
            self.respond()
        }
    }

    fn rfc3339(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }

    fn api_session(name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> ApiSession {
        ApiSession {
            session_key: 9000,
            session_name: name.to_string(),
            date_start: rfc3339(start),
            date_end: Some(rfc3339(end)),
            location: "Sakhir".to_string(),
            country_name: "Bahrain".to_string(),
            circuit_short_name: "Sakhir".to_string(),
            meeting_key: 1229,
            year: 2024,
        }
    }

    fn upcoming(name: &str) -> ApiSession {
        let start = Utc::now() + Duration::days(2);
        api_session(name, start, start + Duration::hours(2))
    }

    fn service(source: MockSource) -> (SessionService<MockSource>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fetcher = ResilientFetch::new(CacheManager::new(temp_dir.path()), Duration::hours(24));
        (SessionService::new(source, fetcher), temp_dir)
    }

    fn cache_of(service: &SessionService<MockSource>) -> &CacheManager {
        service.fetcher.cache()
    }

    #[tokio::test]
    async fn test_next_fresh_cache_skips_remote() {
        let (service, _dir) = service(MockSource::returning(vec![upcoming("Race")]));
        cache_of(&service)
            .write(LATEST_KEY, &upcoming("Cached Race"), Duration::hours(1))
            .unwrap();

        let result = service.next().await.expect("fetch should succeed");

        assert_eq!(service.source.calls(), 0);
        assert_eq!(result.value.unwrap().session_name, "Cached Race");
        assert!(result.warning.is_none());
    }

    #[tokio::test]
    async fn test_next_cache_miss_fetches_and_caches() {
        let (service, _dir) = service(MockSource::returning(vec![upcoming("Race")]));

        let result = service.next().await.expect("fetch should succeed");

        assert_eq!(service.source.calls(), 1);
        let session = result.value.expect("session expected");
        assert_eq!(session.session_name, "Race");
        assert_eq!(session.state, SessionState::Future);
        assert!(result.warning.is_none());

        let cached = cache_of(&service).read::<ApiSession>(LATEST_KEY).expect("raw payload cached");
        assert_eq!(cached.data.session_name, "Race");
    }

    #[tokio::test]
    async fn test_next_stale_cache_with_failing_remote_warns() {
        let (service, _dir) = service(MockSource::failing());
        cache_of(&service)
            .write(LATEST_KEY, &upcoming("Cached Race"), Duration::hours(-1))
            .unwrap();

        let result = service.next().await.expect("stale fallback should succeed");

        assert_eq!(service.source.calls(), 1);
        assert_eq!(result.value.unwrap().session_name, "Cached Race");
        assert_eq!(result.warning.as_deref(), Some(STALE_CACHE_WARNING));
    }

    #[tokio::test]
    async fn test_next_without_cache_and_failing_remote_errors() {
        let (service, _dir) = service(MockSource::failing());

        let err = service.next().await.unwrap_err();

        assert_eq!(service.source.calls(), 1);
        assert!(matches!(err, FetchError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_next_nothing_found_is_not_an_error() {
        let (service, _dir) = service(MockSource::returning(vec![]));

        let result = service.next().await.expect("empty answer is not an error");

        assert!(result.value.is_none());
        assert!(cache_of(&service).read::<ApiSession>(LATEST_KEY).is_none());
    }

    #[tokio::test]
    async fn test_cached_state_is_derived_at_read_time() {
        let (service, _dir) = service(MockSource::failing());
        let now = Utc::now();
        let running = api_session("Race", now - Duration::minutes(30), now + Duration::minutes(90));
        cache_of(&service).write(LATEST_KEY, &running, Duration::hours(1)).unwrap();

        let result = service.next().await.unwrap();

        assert_eq!(result.value.unwrap().state, SessionState::Live);
    }

    #[tokio::test]
    async fn test_get_session_invalid_date_errors_without_caching() {
        let mut bad = upcoming("Race");
        bad.date_start = "02-03-2024".to_string();
        let (service, _dir) = service(MockSource::returning(vec![bad]));

        let err = service.get_session("Bahrain", "Race", 2024).await.unwrap_err();

        assert!(matches!(err, FetchError::MappingFailed(_)));
        let key = SessionService::<MockSource>::get_session_key("Bahrain", "Race", 2024);
        assert!(cache_of(&service).read::<ApiSession>(key.as_str()).is_none());
    }

    #[tokio::test]
    async fn test_get_session_uses_filter_specific_key() {
        let (service, _dir) = service(MockSource::returning(vec![upcoming("Race")]));

        service.get_session("Bahrain", "Race", 2024).await.unwrap();

        let key = SessionService::<MockSource>::get_session_key("Bahrain", "Race", 2024);
        assert_eq!(key.as_str(), "getsession_Bahrain_2024_Race");
        assert!(cache_of(&service).read::<ApiSession>(key.as_str()).is_some());
        let other = SessionService::<MockSource>::get_session_key("Bahrain", "Sprint", 2024);
        assert!(cache_of(&service).read::<ApiSession>(other.as_str()).is_none());
    }

    #[tokio::test]
    async fn test_get_session_stale_fallback() {
        let (service, _dir) = service(MockSource::failing());
        let key = SessionService::<MockSource>::get_session_key("Bahrain", "Race", 2024);
        cache_of(&service)
            .write(key.as_str(), &upcoming("Cached Race"), Duration::hours(-2))
            .unwrap();

        let result = service.get_session("Bahrain", "Race", 2024).await.unwrap();

        assert_eq!(result.value.as_ref().unwrap().session_name, "Cached Race");
        assert!(result.is_stale());
    }

    #[tokio::test]
    async fn test_weekend_sorts_and_caches_sessions() {
        let base = Utc::now() + Duration::days(3);
        let sessions = vec![
            api_session("Race", base + Duration::days(2), base + Duration::days(2) + Duration::hours(2)),
            api_session("Practice 1", base, base + Duration::hours(1)),
            api_session("Qualifying", base + Duration::days(1), base + Duration::days(1) + Duration::hours(1)),
        ];
        let (service, _dir) = service(MockSource::returning(sessions));

        let result = service.weekend("Bahrain", 2024).await.unwrap();

        let names: Vec<_> = result.value.unwrap().into_iter().map(|s| s.session_name).collect();
        assert_eq!(names, ["Practice 1", "Qualifying", "Race"]);
        let key = SessionService::<MockSource>::weekend_key("Bahrain", 2024);
        let cached = cache_of(&service).read::<Vec<ApiSession>>(key.as_str()).unwrap();
        assert_eq!(cached.data.len(), 3);
    }

    #[tokio::test]
    async fn test_weekend_empty_result_is_not_cached() {
        let (service, _dir) = service(MockSource::returning(vec![]));

        let result = service.weekend("Atlantis", 2024).await.expect("empty is not an error");

        assert_eq!(service.source.calls(), 1);
        assert!(result.value.is_none());
        let key = SessionService::<MockSource>::weekend_key("Atlantis", 2024);
        assert!(cache_of(&service).read::<Vec<ApiSession>>(key.as_str()).is_none());
    }

    #[tokio::test]
    async fn test_weekend_stale_fallback() {
        let (service, _dir) = service(MockSource::failing());
        let key = SessionService::<MockSource>::weekend_key("Bahrain", 2024);
        cache_of(&service)
            .write(key.as_str(), &vec![upcoming("Race"), upcoming("Sprint")], Duration::hours(-1))
            .unwrap();

        let result = service.weekend("Bahrain", 2024).await.unwrap();

        assert_eq!(result.value.unwrap().len(), 2);
        assert_eq!(result.warning.as_deref(), Some(STALE_CACHE_WARNING));
    }

    #[tokio::test]
    async fn test_weekend_malformed_record_errors() {
        let mut bad = upcoming("Sprint");
        bad.date_end = Some("broken".to_string());
        let (service, _dir) = service(MockSource::returning(vec![upcoming("Race"), bad]));

        let err = service.weekend("Bahrain", 2024).await.unwrap_err();

        assert!(matches!(err, FetchError::MappingFailed(_)));
    }
}
