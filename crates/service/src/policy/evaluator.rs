use models::policy::{AccessRule, PolicyAction, SampleQueriesPolicies};
use tracing::warn;

use crate::errors::ServiceError;
use crate::observability::AUTHORIZATION_DENIALS_TOTAL;

/// Decide whether `user` may perform `action` on records in `category`.
///
/// - a missing or blank user is never authorized
/// - a category without a policy entry is denied
/// - `Open` admits any authenticated user; `Restricted` admits listed users,
///   compared case-insensitively
pub fn is_authorized(
    policies: &SampleQueriesPolicies,
    user: Option<&str>,
    category: &str,
    action: PolicyAction,
) -> bool {
    let user = match user.map(str::trim) {
        Some(u) if !u.is_empty() => u,
        _ => return false,
    };
    let Some(policy) = policies.find(category) else {
        return false;
    };
    match policy.rule(action) {
        AccessRule::Open => true,
        AccessRule::Restricted { users } => users.iter().any(|u| u.trim().eq_ignore_ascii_case(user)),
    }
}

/// [`is_authorized`] as a result carrying the audit details on denial.
pub fn authorize(
    policies: &SampleQueriesPolicies,
    user: Option<&str>,
    category: &str,
    action: PolicyAction,
) -> Result<(), ServiceError> {
    if is_authorized(policies, user, category, action) {
        return Ok(());
    }
    AUTHORIZATION_DENIALS_TOTAL.inc();
    let user = user.unwrap_or_default().to_string();
    warn!(user = %user, category = %category, action = %action, "sample query action denied");
    Err(ServiceError::Unauthorized { user, category: category.to_string(), action })
}
