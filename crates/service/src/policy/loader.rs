use std::sync::Arc;

use models::policy::SampleQueriesPolicies;
use tracing::{debug, instrument, warn};

use crate::errors::ServiceError;
use crate::observability::POLICY_BOOTSTRAPS_TOTAL;
use crate::storage::BlobStore;

/// Policy set written when no policy document exists yet: no entries, so
/// every category is denied until an operator adds policies.
pub fn default_policies_template() -> SampleQueriesPolicies {
    SampleQueriesPolicies::default()
}

pub fn serialize_policies(policies: &SampleQueriesPolicies) -> Result<String, ServiceError> {
    Ok(serde_json::to_string_pretty(policies)?)
}

pub fn deserialize_policies(text: &str) -> Result<SampleQueriesPolicies, ServiceError> {
    let policies: SampleQueriesPolicies = serde_json::from_str(text)?;
    policies.ensure_unique_categories()?;
    Ok(policies)
}

/// Uncached, read-through access to the policy document.
#[derive(Clone)]
pub struct PolicyLoader {
    store: Arc<dyn BlobStore>,
    path: String,
}

impl PolicyLoader {
    pub fn new(store: Arc<dyn BlobStore>, path: impl Into<String>) -> Self {
        Self { store, path: path.into() }
    }

    pub fn path(&self) -> &str { &self.path }

    /// Read the policy document. An empty or missing document is replaced by
    /// [`default_policies_template`], persisted, and returned.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn load(&self) -> Result<SampleQueriesPolicies, ServiceError> {
        let content = self.store.read(&self.path).await?;
        if content.trim().is_empty() {
            let policies = default_policies_template();
            let json = serialize_policies(&policies)?;
            self.store.write(&self.path, &json).await?;
            POLICY_BOOTSTRAPS_TOTAL.inc();
            warn!("policy document missing; wrote default template");
            return Ok(policies);
        }
        let policies = deserialize_policies(&content)?;
        debug!(entries = policies.category_policies.len(), "policies loaded");
        Ok(policies)
    }
}
