use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Mutating actions subject to a category policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Create,
    Update,
    Delete,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Create => "create",
            PolicyAction::Update => "update",
            PolicyAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may perform one action within a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "lowercase")]
pub enum AccessRule {
    /// Any authenticated caller.
    Open,
    /// Only the listed user principal names.
    Restricted {
        #[serde(default)]
        users: Vec<String>,
    },
}

impl Default for AccessRule {
    fn default() -> Self {
        AccessRule::Restricted { users: Vec::new() }
    }
}

impl AccessRule {
    pub fn restricted<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessRule::Restricted { users: users.into_iter().map(Into::into).collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPolicy {
    pub category_name: String,
    #[serde(default)]
    pub create: AccessRule,
    #[serde(default)]
    pub update: AccessRule,
    #[serde(default)]
    pub delete: AccessRule,
}

impl CategoryPolicy {
    /// Policy with every action restricted to nobody.
    pub fn new(category_name: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
            create: AccessRule::default(),
            update: AccessRule::default(),
            delete: AccessRule::default(),
        }
    }

    pub fn rule(&self, action: PolicyAction) -> &AccessRule {
        match action {
            PolicyAction::Create => &self.create,
            PolicyAction::Update => &self.update,
            PolicyAction::Delete => &self.delete,
        }
    }
}

/// The policy document: `{"categoryPolicies": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleQueriesPolicies {
    #[serde(default)]
    pub category_policies: Vec<CategoryPolicy>,
}

impl SampleQueriesPolicies {
    /// Exact, case-sensitive lookup by category name.
    pub fn find(&self, category: &str) -> Option<&CategoryPolicy> {
        self.category_policies.iter().find(|p| p.category_name == category)
    }

    pub fn ensure_unique_categories(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for p in &self.category_policies {
            if !seen.insert(p.category_name.as_str()) {
                return Err(ModelError::Document(format!(
                    "duplicate policy for category '{}'",
                    p.category_name
                )));
            }
        }
        Ok(())
    }
}
