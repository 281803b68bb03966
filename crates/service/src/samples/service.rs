use std::sync::Arc;

use models::errors::ModelError;
use models::policy::PolicyAction;
use models::sample_query::{SampleQueriesList, SampleQuery};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::ordering::ORDERED_LOCALE;
use super::records;
use crate::cache::SampleQueriesCache;
use crate::errors::ServiceError;
use crate::policy::{authorize, PolicyLoader};

/// Result of a list request.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// No search term: the whole document.
    All(Arc<SampleQueriesList>),
    /// Records matching the search term.
    Filtered(Vec<SampleQuery>),
}

/// Application service behind the sample query endpoints.
///
/// Reads come from the locale cache. Mutations check the record's category
/// policy, apply the change to a copy of the en-us list, and serialize it.
/// The serialized document is not written back to storage: the cached list and
/// the stored document stay as they were, so concurrent mutations never see
/// each other.
#[derive(Clone)]
pub struct SamplesService {
    cache: Arc<SampleQueriesCache>,
    policies: PolicyLoader,
}

pub fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::MalformedInput(format!("'{raw}' is not a valid sample query id")))
}

impl SamplesService {
    pub fn new(cache: Arc<SampleQueriesCache>, policies: PolicyLoader) -> Self {
        Self { cache, policies }
    }

    /// List all sample queries for `locale`, or those matching `search`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::cache::{SampleQueriesCache, SamplesCacheConfig, SystemClock};
    /// use service::policy::PolicyLoader;
    /// use service::samples::{ListOutcome, SamplesService};
    /// use service::storage::MemoryBlobStore;
    ///
    /// let store = Arc::new(MemoryBlobStore::new().with_blob(
    ///     "sample-queries/en-us/sample-queries.json",
    ///     r#"{"sampleQueries":[{"id":"3482cc10-f2be-40fc-bcdb-d3ac35f3e4c3","category":"Mail","humanName":"Get messages"}]}"#,
    /// ));
    /// let cache = Arc::new(SampleQueriesCache::new(store.clone(), Arc::new(SystemClock), SamplesCacheConfig {
    ///     container: "sample-queries".into(),
    ///     blob: "sample-queries.json".into(),
    ///     refresh_hours: 24,
    ///     max_locales: 8,
    /// }));
    /// let svc = SamplesService::new(cache, PolicyLoader::new(store, "policies.json"));
    /// match tokio_test::block_on(svc.list("en-us", Some("mail"))).unwrap() {
    ///     ListOutcome::Filtered(found) => assert_eq!(found.len(), 1),
    ///     other => panic!("unexpected {other:?}"),
    /// }
    /// ```
    #[instrument(skip(self))]
    pub async fn list(&self, locale: &str, search: Option<&str>) -> Result<ListOutcome, ServiceError> {
        let list = self.cache.get_list(locale).await?;
        if list.is_empty() {
            return Err(ServiceError::EmptyCollection);
        }
        let term = match search {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(ListOutcome::All(list)),
        };
        let found = records::search(&list, term);
        if found.is_empty() {
            return Err(ServiceError::NotFound(format!("no sample queries match '{term}'")));
        }
        Ok(ListOutcome::Filtered(found))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, locale: &str, id: &str) -> Result<SampleQuery, ServiceError> {
        let list = self.cache.get_list(locale).await?;
        if list.is_empty() {
            return Err(ServiceError::EmptyCollection);
        }
        let id = parse_id(id)?;
        records::find_by_id(&list, id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("sample query"))
    }

    /// Replace the record `id` with `record` on behalf of `user`.
    #[instrument(skip(self, record), fields(category = %record.category_name()))]
    pub async fn update(
        &self,
        user: Option<&str>,
        id: &str,
        mut record: SampleQuery,
    ) -> Result<SampleQuery, ServiceError> {
        prepare(&mut record)?;
        let id = parse_id(id)?;

        let policies = self.policies.load().await?;
        authorize(&policies, user, record.category_name(), PolicyAction::Update)?;

        let list = self.cache.get_list(ORDERED_LOCALE).await?;
        if !records::exists(&list, id) {
            return Err(ServiceError::NotFound(format!("No sample query found with id: {id}")));
        }

        record.id = id;
        let updated = records::replace((*list).clone(), record.clone(), id)?;
        self.discard(PolicyAction::Update, &updated)?;
        info!(%id, user = user.unwrap_or_default(), "sample query updated");
        Ok(record)
    }

    /// Add `record` under a freshly generated id on behalf of `user`.
    #[instrument(skip(self, record), fields(category = %record.category_name()))]
    pub async fn create(&self, user: Option<&str>, mut record: SampleQuery) -> Result<SampleQuery, ServiceError> {
        prepare(&mut record)?;

        let policies = self.policies.load().await?;
        authorize(&policies, user, record.category_name(), PolicyAction::Create)?;

        let list = self.cache.get_list(ORDERED_LOCALE).await?;
        record.id = Uuid::new_v4();
        let created = records::insert((*list).clone(), record.clone());
        self.discard(PolicyAction::Create, &created)?;
        info!(id = %record.id, user = user.unwrap_or_default(), "sample query created");
        Ok(record)
    }

    /// Remove the record `id` on behalf of `user`. Authorization uses the
    /// stored record's category.
    #[instrument(skip(self))]
    pub async fn delete(&self, user: Option<&str>, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        let list = self.cache.get_list(ORDERED_LOCALE).await?;
        let policies = self.policies.load().await?;

        let category = records::find_by_id(&list, id)
            .map(|q| q.category_name().to_string())
            .ok_or_else(|| ServiceError::NotFound(format!("No sample query found with id: {id}")))?;
        authorize(&policies, user, &category, PolicyAction::Delete)?;

        let remaining = records::remove((*list).clone(), id);
        self.discard(PolicyAction::Delete, &remaining)?;
        info!(%id, user = user.unwrap_or_default(), "sample query deleted");
        Ok(())
    }

    // Write-back is disabled: serialize so malformed results still surface, then drop.
    fn discard(&self, action: PolicyAction, list: &SampleQueriesList) -> Result<(), ServiceError> {
        let json = records::serialize(list)?;
        debug!(%action, count = list.count(), bytes = json.len(), "persistence disabled; mutated list discarded");
        Ok(())
    }
}

fn prepare(record: &mut SampleQuery) -> Result<(), ServiceError> {
    record.validate().map_err(|e| match e {
        ModelError::Validation(msg) => ServiceError::Validation(msg),
        other => ServiceError::Model(other),
    })?;
    if let Some(method) = record.method.as_mut() {
        *method = method.to_ascii_uppercase();
    }
    Ok(())
}
