//! Administrative payloads for the cluster and indices admin surfaces.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ShardStats;
use crate::action::ActionRequest;
use crate::validation::{require, ValidationError};

// ---------------------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------------------

/// Coarse cluster health, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterHealthRequest {
    #[serde(default)]
    pub indices: Vec<String>,
    /// Wait until the cluster reaches at least this status.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wait_for_status: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl ActionRequest for ClusterHealthRequest {
    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterHealthResponse {
    pub cluster_name: String,
    pub status: HealthStatus,
    pub number_of_nodes: u32,
    pub active_shards: u32,
    /// The requested status was not reached before the timeout.
    pub timed_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStateRequest {
    #[serde(default)]
    pub filter_nodes: bool,
    #[serde(default)]
    pub filter_metadata: bool,
    #[serde(default)]
    pub filter_routing_table: bool,
}

impl ActionRequest for ClusterStateRequest {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStateResponse {
    pub cluster_name: String,
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesInfoRequest {
    /// Nodes to describe. Empty means every node.
    #[serde(default)]
    pub node_ids: Vec<String>,
}

impl ActionRequest for NodesInfoRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesInfoResponse {
    pub cluster_name: String,
    pub nodes: Vec<NodeInfo>,
}

// ---------------------------------------------------------------------------
// Indices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    pub index: String,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub mappings: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl CreateIndexRequest {
    #[must_use]
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            settings: Value::Null,
            mappings: Value::Null,
            timeout_ms: None,
        }
    }
}

impl ActionRequest for CreateIndexRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        if self.index.chars().any(char::is_uppercase) {
            errors.add("index must be lowercase");
        }
        if self.index.trim().len() != self.index.len()
            || self.index.chars().any(char::is_whitespace)
        {
            errors.add("index must not contain whitespace");
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexResponse {
    pub acknowledged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIndexRequest {
    pub indices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl DeleteIndexRequest {
    #[must_use]
    pub fn new(indices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            timeout_ms: None,
        }
    }
}

impl ActionRequest for DeleteIndexRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.indices.is_empty() {
            errors.add("index / indices is missing");
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIndexResponse {
    pub acknowledged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Indices to refresh. Empty means all.
    #[serde(default)]
    pub indices: Vec<String>,
}

impl ActionRequest for RefreshRequest {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub shards: ShardStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicesExistsRequest {
    pub indices: Vec<String>,
}

impl IndicesExistsRequest {
    #[must_use]
    pub fn new(indices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
        }
    }
}

impl ActionRequest for IndicesExistsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.indices.is_empty() {
            errors.add("index / indices is missing");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicesExistsResponse {
    pub exists: bool,
}
