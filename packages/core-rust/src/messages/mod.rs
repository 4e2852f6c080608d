//! Request and response payloads for every action.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` so handlers living
//! behind a transport can encode them without extra mapping types.

pub mod admin;
pub mod document;
pub mod search;

use serde::{Deserialize, Serialize};

pub use admin::{
    ClusterHealthRequest, ClusterHealthResponse, ClusterStateRequest, ClusterStateResponse,
    CreateIndexRequest, CreateIndexResponse, DeleteIndexRequest, DeleteIndexResponse,
    HealthStatus, IndicesExistsRequest, IndicesExistsResponse, NodeInfo, NodesInfoRequest,
    NodesInfoResponse, RefreshRequest, RefreshResponse,
};
pub use document::{
    BulkItem, BulkItemResponse, BulkRequest, BulkResponse, DeleteRequest, DeleteResponse,
    GetRequest, GetResponse, IndexRequest, IndexResponse, MultiGetItem, MultiGetItemResponse,
    MultiGetRequest, MultiGetResponse, OpType, UpdateRequest, UpdateResponse,
};
pub use search::{
    CountRequest, CountResponse, DeleteByQueryRequest, DeleteByQueryResponse, IndexDeleteByQuery,
    MoreLikeThisRequest, PercolateRequest, PercolateResponse, SearchHit, SearchHits,
    SearchRequest, SearchResponse, SearchScrollRequest, SearchType,
};

/// Shard-level outcome counters shared by broadcast-style responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardStats {
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
}

impl ShardStats {
    /// All `total` shards succeeded.
    #[must_use]
    pub fn all_successful(total: u32) -> Self {
        Self {
            total,
            successful: total,
            failed: 0,
        }
    }
}
