use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use models::sample_query::SampleQueriesList;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::{debug, info, instrument};

use super::clock::Clock;
use crate::errors::ServiceError;
use crate::observability::{CACHE_HITS_TOTAL, CACHE_POPULATIONS_TOTAL};
use crate::samples::{ordering::is_ordered_locale, records};
use crate::storage::{localized_path, BlobStore};

/// Upper bound on the refresh interval, in hours (100 years).
const MAX_REFRESH_HOURS: i64 = 24 * 365 * 100;

/// Where localized documents live and how long a loaded list stays fresh.
#[derive(Clone, Debug)]
pub struct SamplesCacheConfig {
    pub container: String,
    pub blob: String,
    pub refresh_hours: u64,
    pub max_locales: u64,
}

#[derive(Clone)]
struct CachedList {
    list: Arc<SampleQueriesList>,
    expires_at: DateTime<Utc>,
}

/// Read-through cache from locale to its deserialized sample query list.
///
/// A miss reads `{container}/{locale}/{blob}` from the [`BlobStore`]; an empty
/// document caches as an empty list. Entries expire `refresh_hours` after they
/// were populated, measured by the injected [`Clock`]. Population for a locale
/// runs under a per-key lock, so a burst of misses loads the document once and
/// every caller sees the same value. A storage or parse failure is returned to
/// the caller and nothing is cached.
pub struct SampleQueriesCache {
    entries: Cache<String, CachedList>,
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    container: String,
    blob: String,
    refresh: Duration,
}

impl SampleQueriesCache {
    pub fn new(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>, cfg: SamplesCacheConfig) -> Self {
        let hours = i64::try_from(cfg.refresh_hours).unwrap_or(i64::MAX).clamp(1, MAX_REFRESH_HOURS);
        Self {
            entries: Cache::builder().max_capacity(cfg.max_locales.max(1)).build(),
            store,
            clock,
            container: cfg.container,
            blob: cfg.blob,
            refresh: Duration::hours(hours),
        }
    }

    pub fn refresh_interval(&self) -> Duration { self.refresh }

    /// The sample query list for `locale`, from cache when fresh.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::cache::{SampleQueriesCache, SamplesCacheConfig, SystemClock};
    /// use service::storage::MemoryBlobStore;
    ///
    /// let store = Arc::new(MemoryBlobStore::new().with_blob(
    ///     "sample-queries/en-us/sample-queries.json",
    ///     r#"{"sampleQueries":[{"id":"3482cc10-f2be-40fc-bcdb-d3ac35f3e4c3","category":"Mail","humanName":"Get messages"}]}"#,
    /// ));
    /// let cache = SampleQueriesCache::new(store.clone(), Arc::new(SystemClock), SamplesCacheConfig {
    ///     container: "sample-queries".into(),
    ///     blob: "sample-queries.json".into(),
    ///     refresh_hours: 24,
    ///     max_locales: 8,
    /// });
    /// let list = tokio_test::block_on(cache.get_list("en-US")).unwrap();
    /// assert_eq!(list.count(), 1);
    /// let _ = tokio_test::block_on(cache.get_list("en-us")).unwrap();
    /// assert_eq!(store.read_count(), 1);
    /// ```
    #[instrument(skip(self))]
    pub async fn get_list(&self, locale: &str) -> Result<Arc<SampleQueriesList>, ServiceError> {
        let key = locale.trim().to_ascii_lowercase();

        if let Some(hit) = self.entries.get(&key).await {
            if hit.expires_at > self.clock.now() {
                CACHE_HITS_TOTAL.inc();
                debug!(locale = %key, "sample queries cache hit");
                return Ok(hit.list);
            }
        }

        let key_ref = &key;
        let result = self
            .entries
            .entry(key.clone())
            .and_try_compute_with(|existing| async move {
                // another caller may have populated while we waited for the key lock
                if let Some(entry) = existing {
                    if entry.value().expires_at > self.clock.now() {
                        return Ok(Op::Nop);
                    }
                }
                self.populate(key_ref).await.map(Op::Put)
            })
            .await?;

        match result {
            CompResult::Inserted(entry)
            | CompResult::ReplacedWith(entry)
            | CompResult::Unchanged(entry) => Ok(entry.into_value().list),
            CompResult::Removed(_) | CompResult::StillNone(_) => Err(ServiceError::Storage(format!(
                "sample queries for locale '{key}' were not cached"
            ))),
        }
    }

    async fn populate(&self, locale: &str) -> Result<CachedList, ServiceError> {
        let path = localized_path(&self.container, &self.blob, locale);
        let content = self.store.read(&path).await?;
        let list = if content.trim().is_empty() {
            SampleQueriesList::default()
        } else {
            records::deserialize(&content, is_ordered_locale(locale))?
        };
        let expires_at = self.clock.now() + self.refresh;
        CACHE_POPULATIONS_TOTAL.inc();
        info!(locale = %locale, %path, count = list.count(), %expires_at, "sample queries cached");
        Ok(CachedList { list: Arc::new(list), expires_at })
    }
}
