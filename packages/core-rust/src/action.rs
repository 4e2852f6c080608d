//! Action identifiers and the traits tying each identifier to its
//! request/response pairing.
//!
//! An action is a zero-sized marker type. Its `NAME` is the stable key a
//! handler is registered under, and its associated types fix what that
//! handler accepts and produces. Binding a handler for the wrong pairing is
//! therefore detectable once, when the registry is resolved, rather than on
//! every call.

use std::time::Duration;

use crate::messages::{
    BulkRequest, BulkResponse, ClusterHealthRequest, ClusterHealthResponse, ClusterStateRequest,
    ClusterStateResponse, CountRequest, CountResponse, CreateIndexRequest, CreateIndexResponse,
    DeleteByQueryRequest, DeleteByQueryResponse, DeleteIndexRequest, DeleteIndexResponse,
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, IndexRequest, IndexResponse,
    IndicesExistsRequest, IndicesExistsResponse, MoreLikeThisRequest, MultiGetRequest,
    MultiGetResponse, NodesInfoRequest, NodesInfoResponse, PercolateRequest, PercolateResponse,
    RefreshRequest, RefreshResponse, SearchRequest, SearchResponse, SearchScrollRequest,
    UpdateRequest, UpdateResponse,
};
use crate::validation::ValidationError;

/// Well-known action identifiers.
pub mod action_names {
    pub const INDEX: &str = "index";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const BULK: &str = "bulk";
    pub const GET: &str = "get";
    pub const MULTI_GET: &str = "mget";
    pub const COUNT: &str = "count";
    pub const SEARCH: &str = "search";
    pub const SEARCH_SCROLL: &str = "search/scroll";
    pub const MORE_LIKE_THIS: &str = "mlt";
    pub const PERCOLATE: &str = "percolate";
    pub const DELETE_BY_QUERY: &str = "delete_by_query";

    pub const CLUSTER_HEALTH: &str = "cluster/health";
    pub const CLUSTER_STATE: &str = "cluster/state";
    pub const NODES_INFO: &str = "cluster/nodes/info";

    pub const CREATE_INDEX: &str = "indices/create";
    pub const DELETE_INDEX: &str = "indices/delete";
    pub const REFRESH: &str = "indices/refresh";
    pub const INDICES_EXISTS: &str = "indices/exists";
}

/// A request that can be checked before it is executed.
pub trait ActionRequest: Send + 'static {
    /// Checks the request for missing or malformed fields.
    ///
    /// # Errors
    ///
    /// Returns every problem found in the request.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Execution timeout requested by the caller. `None` defers to the
    /// handler's configured default.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// One logical operation: a stable name plus its request/response types.
pub trait Action: Send + Sync + 'static {
    /// Registry key for this action.
    const NAME: &'static str;

    type Request: ActionRequest;
    type Response: Clone + Send + 'static;
}

macro_rules! define_actions {
    ($(
        $(#[$meta:meta])*
        $marker:ident => $name:path, $req:ty, $resp:ty;
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $marker;

            impl Action for $marker {
                const NAME: &'static str = $name;
                type Request = $req;
                type Response = $resp;
            }
        )*
    };
}

define_actions! {
    /// Index a single document.
    IndexAction => action_names::INDEX, IndexRequest, IndexResponse;
    /// Partially update a single document.
    UpdateAction => action_names::UPDATE, UpdateRequest, UpdateResponse;
    /// Delete a single document.
    DeleteAction => action_names::DELETE, DeleteRequest, DeleteResponse;
    /// Execute many index/update/delete operations in one request.
    BulkAction => action_names::BULK, BulkRequest, BulkResponse;
    /// Fetch a single document.
    GetAction => action_names::GET, GetRequest, GetResponse;
    /// Fetch many documents in one request.
    MultiGetAction => action_names::MULTI_GET, MultiGetRequest, MultiGetResponse;
    /// Count documents matching a query.
    CountAction => action_names::COUNT, CountRequest, CountResponse;
    /// Run a search.
    SearchAction => action_names::SEARCH, SearchRequest, SearchResponse;
    /// Continue a scrolling search.
    SearchScrollAction => action_names::SEARCH_SCROLL, SearchScrollRequest, SearchResponse;
    /// Search for documents similar to a given one.
    MoreLikeThisAction => action_names::MORE_LIKE_THIS, MoreLikeThisRequest, SearchResponse;
    /// Match a document against registered queries.
    PercolateAction => action_names::PERCOLATE, PercolateRequest, PercolateResponse;
    /// Delete every document matching a query.
    DeleteByQueryAction => action_names::DELETE_BY_QUERY, DeleteByQueryRequest, DeleteByQueryResponse;

    /// Cluster health summary.
    ClusterHealthAction => action_names::CLUSTER_HEALTH, ClusterHealthRequest, ClusterHealthResponse;
    /// Cluster state snapshot.
    ClusterStateAction => action_names::CLUSTER_STATE, ClusterStateRequest, ClusterStateResponse;
    /// Per-node information.
    NodesInfoAction => action_names::NODES_INFO, NodesInfoRequest, NodesInfoResponse;

    /// Create an index.
    CreateIndexAction => action_names::CREATE_INDEX, CreateIndexRequest, CreateIndexResponse;
    /// Delete one or more indices.
    DeleteIndexAction => action_names::DELETE_INDEX, DeleteIndexRequest, DeleteIndexResponse;
    /// Refresh one or more indices.
    RefreshAction => action_names::REFRESH, RefreshRequest, RefreshResponse;
    /// Check whether indices exist.
    IndicesExistsAction => action_names::INDICES_EXISTS, IndicesExistsRequest, IndicesExistsResponse;
}
