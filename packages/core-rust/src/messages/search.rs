//! Query-driven payloads: count, search, scroll, more-like-this, percolate
//! and delete-by-query.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ShardStats;
use crate::action::ActionRequest;
use crate::validation::{require, ValidationError};

// ---------------------------------------------------------------------------
// Count
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountRequest {
    /// Indices to count across. Empty means all.
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub query: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min_score: Option<f64>,
}

impl CountRequest {
    #[must_use]
    pub fn new(indices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = query;
        self
    }
}

impl ActionRequest for CountRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.min_score.is_some_and(|score| !score.is_finite()) {
            errors.add("minScore must be a finite number");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub count: u64,
    pub shards: ShardStats,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// How the search fans out across shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    QueryThenFetch,
    DfsQueryThenFetch,
    /// Only hit counts, no documents.
    Count,
    /// Unsorted scrolling over the full result set.
    Scan,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub indices: Vec<String>,
    /// Search body (query, sort, aggregations...) as opaque JSON.
    #[serde(default)]
    pub source: Value,
    #[serde(default)]
    pub search_type: SearchType,
    #[serde(default)]
    pub from: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u32>,
    /// Keep a scroll context alive this long between pages.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scroll_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(indices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Value) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_scroll(mut self, keep_alive: Duration) -> Self {
        self.scroll_ms = Some(u64::try_from(keep_alive.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

impl ActionRequest for SearchRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.scroll_ms == Some(0) {
            errors.add("scroll keep-alive must be greater than zero");
        }
        if self.search_type == SearchType::Scan && self.scroll_ms.is_none() {
            errors.add("scan search requires a scroll keep-alive");
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchScrollRequest {
    pub scroll_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scroll_ms: Option<u64>,
}

impl SearchScrollRequest {
    #[must_use]
    pub fn new(scroll_id: impl Into<String>) -> Self {
        Self {
            scroll_id: scroll_id.into(),
            scroll_ms: None,
        }
    }
}

impl ActionRequest for SearchScrollRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "scrollId", &self.scroll_id);
        if self.scroll_ms == Some(0) {
            errors.add("scroll keep-alive must be greater than zero");
        }
        errors.into_result()
    }
}

/// Search for documents similar to an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoreLikeThisRequest {
    pub index: String,
    pub id: String,
    /// Fields to extract terms from. Empty means all.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default = "default_min_term_freq")]
    pub min_term_freq: u32,
    #[serde(default = "default_max_query_terms")]
    pub max_query_terms: u32,
    /// Indices to search for similar documents. Empty means the source index.
    #[serde(default)]
    pub search_indices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub search_size: Option<u32>,
}

fn default_min_term_freq() -> u32 {
    2
}

fn default_max_query_terms() -> u32 {
    25
}

impl MoreLikeThisRequest {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            fields: Vec::new(),
            min_term_freq: default_min_term_freq(),
            max_query_terms: default_max_query_terms(),
            search_indices: Vec::new(),
            search_size: None,
        }
    }
}

impl ActionRequest for MoreLikeThisRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        require(&mut errors, "id", &self.id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHits {
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_score: Option<f64>,
    pub hits: Vec<SearchHit>,
}

/// Shared by search, scroll and more-like-this.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scroll_id: Option<String>,
    pub hits: SearchHits,
    pub took_ms: u64,
    pub timed_out: bool,
    pub shards: ShardStats,
}

// ---------------------------------------------------------------------------
// Percolate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercolateRequest {
    pub index: String,
    /// The document to match against registered queries.
    pub source: Value,
}

impl PercolateRequest {
    #[must_use]
    pub fn new(index: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            source,
        }
    }
}

impl ActionRequest for PercolateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        if self.source.is_null() {
            errors.add("source is missing");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercolateResponse {
    /// Ids of the registered queries that matched.
    pub matches: Vec<String>,
}

// ---------------------------------------------------------------------------
// Delete by query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteByQueryRequest {
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub query: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub routing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl DeleteByQueryRequest {
    #[must_use]
    pub fn new(indices: impl IntoIterator<Item = impl Into<String>>, query: Value) -> Self {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            query,
            routing: None,
            timeout_ms: None,
        }
    }
}

impl ActionRequest for DeleteByQueryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.query.is_null() {
            errors.add("query is missing");
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDeleteByQuery {
    pub index: String,
    pub shards: ShardStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteByQueryResponse {
    pub indices: Vec<IndexDeleteByQuery>,
}
