use switchyard_core::action::{
    ClusterHealthAction, ClusterStateAction, CreateIndexAction, DeleteIndexAction,
    IndicesExistsAction, NodesInfoAction, RefreshAction,
};

use crate::error::ConfigError;
use crate::registry::ActionRegistry;

action_facade! {
    /// Cluster-level administration.
    pub struct ClusterAdminClient {
        actions {
            /// Cluster health, optionally waiting for a minimum status.
            health / health_with => ClusterHealthAction,
            /// Snapshot of the cluster state.
            state / state_with => ClusterStateAction,
            /// Information about the nodes in the cluster.
            nodes_info / nodes_info_with => NodesInfoAction,
        }
    }
}

impl ClusterAdminClient {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any cluster action is unbound or bound
    /// to the wrong handler type.
    pub fn new(registry: &ActionRegistry) -> Result<Self, ConfigError> {
        Self::resolve_actions(registry)
    }
}

action_facade! {
    /// Index-level administration.
    pub struct IndicesAdminClient {
        actions {
            create / create_with => CreateIndexAction,
            delete / delete_with => DeleteIndexAction,
            refresh / refresh_with => RefreshAction,
            exists / exists_with => IndicesExistsAction,
        }
    }
}

impl IndicesAdminClient {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any index action is unbound or bound
    /// to the wrong handler type.
    pub fn new(registry: &ActionRegistry) -> Result<Self, ConfigError> {
        Self::resolve_actions(registry)
    }
}

/// Administrative facade, reached through
/// [`NodeClient::admin`](crate::NodeClient::admin).
#[derive(Debug, Clone)]
pub struct AdminClient {
    cluster: ClusterAdminClient,
    indices: IndicesAdminClient,
}

impl AdminClient {
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] hit while resolving.
    pub fn new(registry: &ActionRegistry) -> Result<Self, ConfigError> {
        Ok(Self {
            cluster: ClusterAdminClient::new(registry)?,
            indices: IndicesAdminClient::new(registry)?,
        })
    }

    #[must_use]
    pub fn cluster(&self) -> &ClusterAdminClient {
        &self.cluster
    }

    #[must_use]
    pub fn indices(&self) -> &IndicesAdminClient {
        &self.indices
    }
}
