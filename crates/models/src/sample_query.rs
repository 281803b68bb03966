use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ModelError;

pub const HUMAN_NAME_MAX_LEN: usize = 64;
pub const VALID_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// A request header shown alongside a sample query.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// One sample query record.
///
/// Only `id`, `category`, `human_name` and `tip` carry meaning for the service;
/// the remaining display fields, and any field not modelled here (kept in
/// `extra`), are passed through untouched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleQuery {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<Header>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_test: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SampleQuery {
    /// Minimal record with a category and display name; everything else empty.
    pub fn new(category: impl Into<String>, human_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            category: Some(category.into()),
            method: None,
            human_name: Some(human_name.into()),
            request_url: None,
            doc_link: None,
            headers: None,
            body: None,
            tip: None,
            skip_test: None,
            extra: Map::new(),
        }
    }

    /// Category name, or `""` when absent.
    pub fn category_name(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    /// Checks applied to records submitted for create or update.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => {}
            _ => return Err(ModelError::Validation("category is required".into())),
        }
        match self.human_name.as_deref() {
            Some(n) if n.trim().is_empty() => {
                return Err(ModelError::Validation("humanName is required".into()))
            }
            Some(n) if n.chars().count() > HUMAN_NAME_MAX_LEN => {
                return Err(ModelError::Validation(format!(
                    "humanName must be at most {HUMAN_NAME_MAX_LEN} characters"
                )))
            }
            Some(_) => {}
            None => return Err(ModelError::Validation("humanName is required".into())),
        }
        if let Some(url) = self.request_url.as_deref() {
            if !url.starts_with('/') {
                return Err(ModelError::Validation("requestUrl must start with '/'".into()));
            }
        }
        if let Some(method) = self.method.as_deref() {
            let up = method.to_ascii_uppercase();
            if !VALID_METHODS.contains(&up.as_str()) {
                return Err(ModelError::Validation(format!("invalid HTTP method: {method}")));
            }
        }
        if let Some(link) = self.doc_link.as_deref() {
            if !(link.starts_with("http://") || link.starts_with("https://")) {
                return Err(ModelError::Validation("docLink must start with http(s)".into()));
            }
        }
        Ok(())
    }
}

/// The localized sample query document: `{"sampleQueries": [...]}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleQueriesList {
    #[serde(default)]
    pub sample_queries: Vec<SampleQuery>,
}

impl SampleQueriesList {
    pub fn new(sample_queries: Vec<SampleQuery>) -> Self {
        Self { sample_queries }
    }

    pub fn count(&self) -> usize {
        self.sample_queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_queries.is_empty()
    }
}
