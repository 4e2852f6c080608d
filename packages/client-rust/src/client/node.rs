use std::sync::Arc;

use switchyard_core::action::{
    BulkAction, CountAction, DeleteAction, DeleteByQueryAction, GetAction, IndexAction,
    MoreLikeThisAction, MultiGetAction, PercolateAction, SearchAction, SearchScrollAction,
    UpdateAction,
};

use super::admin::AdminClient;
use crate::error::ConfigError;
use crate::registry::ActionRegistry;
use crate::thread_pool::ThreadPool;

action_facade! {
    /// Client facade for document and search actions.
    ///
    /// Every handler is resolved from the registry when the client is built;
    /// calls go straight to that handler. Cloning is cheap and every clone
    /// reaches the same handlers.
    pub struct NodeClient {
        fields {
            thread_pool: ThreadPool,
            admin: Arc<AdminClient>,
        }
        actions {
            /// Index a document, creating or replacing it.
            index / index_with => IndexAction,
            /// Partially update a document.
            update / update_with => UpdateAction,
            /// Delete a document by id.
            delete / delete_with => DeleteAction,
            /// Run many index/update/delete operations in one call.
            bulk / bulk_with => BulkAction,
            /// Fetch a document by id.
            get / get_with => GetAction,
            /// Fetch many documents in one call.
            multi_get / multi_get_with => MultiGetAction,
            /// Count documents matching a query.
            count / count_with => CountAction,
            /// Run a search.
            search / search_with => SearchAction,
            /// Fetch the next page of a scrolling search.
            search_scroll / search_scroll_with => SearchScrollAction,
            /// Find documents similar to an existing one.
            more_like_this / more_like_this_with => MoreLikeThisAction,
            /// Match a document against registered queries.
            percolate / percolate_with => PercolateAction,
            /// Delete every document matching a query.
            delete_by_query / delete_by_query_with => DeleteByQueryAction,
        }
    }
}

impl NodeClient {
    /// Resolves every client and admin action from `registry`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] hit while resolving; no client is
    /// built in that case.
    pub fn new(thread_pool: ThreadPool, registry: &ActionRegistry) -> Result<Self, ConfigError> {
        let admin = Arc::new(AdminClient::new(registry)?);
        Self::resolve_actions(registry, thread_pool, admin)
    }

    /// The worker pool handlers run on. The client never shuts it down.
    #[must_use]
    pub fn thread_pool(&self) -> &ThreadPool {
        &self.thread_pool
    }

    /// Cluster and index administration.
    #[must_use]
    pub fn admin(&self) -> &Arc<AdminClient> {
        &self.admin
    }

    /// Does nothing. The client owns no resources: handlers and the pool
    /// belong to whoever built them. Safe to call any number of times.
    pub fn close(&self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::json;
    use switchyard_core::action::{ClusterHealthAction, ClusterStateAction};
    use switchyard_core::messages::{
        CountRequest, CountResponse, GetRequest, GetResponse, SearchHits, SearchRequest,
        SearchResponse,
    };
    use switchyard_core::Action;
    use tower::service_fn;

    use super::*;
    use crate::client::testing::stub_remaining;
    use crate::client::Dispatch;
    use crate::completion::Completer;
    use crate::config::{ClientConfig, ThreadPoolConfig};
    use crate::error::ActionError;
    use crate::handler::{ActionHandler, BoxFuture, ServiceHandler, Unimplemented};
    use crate::listener::listener;
    use crate::middleware::pipeline_handler;
    use crate::registry::{ActionRegistryBuilder, HandlerBinding};
    use crate::thread_pool::executor_names;

    /// Deterministic inline get: found iff the id is not "missing".
    struct StaticGet;

    impl ActionHandler<GetAction> for StaticGet {
        fn execute(&self, request: GetRequest, completer: Completer<GetResponse>) {
            let found = request.id != "missing";
            completer.complete(GetResponse {
                source: found.then(|| json!({ "id": request.id })),
                index: request.index,
                id: request.id,
                version: found.then_some(3),
                found,
            });
        }
    }

    /// Search that counts calls and answers with the running total as `took_ms`.
    struct CountingSearch {
        calls: AtomicU32,
    }

    impl ActionHandler<SearchAction> for CountingSearch {
        fn execute(&self, _request: SearchRequest, completer: Completer<SearchResponse>) {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            completer.complete(SearchResponse {
                took_ms: u64::from(n),
                ..SearchResponse::default()
            });
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap()
    }

    fn pool(rt: &tokio::runtime::Runtime) -> ThreadPool {
        ThreadPool::new(rt.handle().clone(), &ThreadPoolConfig::default())
    }

    fn client_with(
        rt: &tokio::runtime::Runtime,
        bound: &[&str],
        builder: ActionRegistryBuilder,
    ) -> NodeClient {
        let registry = stub_remaining(builder, bound).build().unwrap();
        NodeClient::new(pool(rt), &registry).unwrap()
    }

    #[test]
    fn blocking_and_callback_forms_agree() {
        let rt = runtime();
        let client = client_with(
            &rt,
            &[GetAction::NAME],
            ActionRegistry::builder().register::<GetAction>(StaticGet),
        );

        for id in ["1", "missing"] {
            let blocking = client.get(GetRequest::new("users", id)).get().unwrap();

            let (tx, rx) = mpsc::channel();
            client.get_with(
                GetRequest::new("users", id),
                listener(move |resp| tx.send(resp).unwrap(), |err| panic!("{err}")),
            );
            let callback = rx.recv_timeout(Duration::from_secs(1)).unwrap();
            assert_eq!(blocking, callback);
        }
    }

    #[test]
    fn every_call_reaches_the_handler_bound_at_construction() {
        let rt = runtime();
        let search: Arc<dyn ActionHandler<SearchAction>> = Arc::new(CountingSearch {
            calls: AtomicU32::new(0),
        });
        let client = client_with(
            &rt,
            &[SearchAction::NAME],
            ActionRegistry::builder().register_arc::<SearchAction>(search.clone()),
        );

        let copy = client.clone();
        for expected in 1..=3 {
            let resp = copy.search(SearchRequest::new(["logs"])).get().unwrap();
            assert_eq!(resp.took_ms, expected);
        }
        let bound = <NodeClient as Dispatch<SearchAction>>::bound(&client);
        assert!(Arc::ptr_eq(bound.handler(), &search));
    }

    #[test]
    fn missing_handler_fails_construction() {
        let rt = runtime();
        let registry = stub_remaining(ActionRegistry::builder(), &[PercolateAction::NAME])
            .build()
            .unwrap();
        let err = NodeClient::new(pool(&rt), &registry).unwrap_err();
        assert_eq!(err, ConfigError::MissingHandler { action: "percolate" });
    }

    #[test]
    fn missing_admin_handler_fails_construction() {
        let rt = runtime();
        let registry = stub_remaining(ActionRegistry::builder(), &[ClusterStateAction::NAME])
            .build()
            .unwrap();
        let err = NodeClient::new(pool(&rt), &registry).unwrap_err();
        assert_eq!(err, ConfigError::MissingHandler { action: "cluster/state" });
    }

    #[test]
    fn mismatched_handler_fails_construction() {
        let rt = runtime();
        let registry = stub_remaining(
            ActionRegistry::builder().bind(
                GetAction::NAME,
                HandlerBinding::new::<ClusterHealthAction>(Unimplemented::new()),
            ),
            &[GetAction::NAME],
        )
        .build()
        .unwrap();
        let err = NodeClient::new(pool(&rt), &registry).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::HandlerTypeMismatch { action: "get", .. }
        ));
    }

    #[test]
    fn concurrent_blocking_calls_do_not_cross_talk() {
        let rt = runtime();
        let pool = pool(&rt);
        let count = ServiceHandler::<CountAction, _>::new(
            pool.executor_or_generic(executor_names::SEARCH),
            service_fn(|req: CountRequest| -> BoxFuture<CountResponse> {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    let n = req.indices.first().and_then(|i| i.parse().ok()).unwrap_or(0);
                    Ok(CountResponse {
                        count: n,
                        ..CountResponse::default()
                    })
                })
            }),
        );
        let registry = stub_remaining(
            ActionRegistry::builder().register::<CountAction>(count),
            &[CountAction::NAME],
        )
        .build()
        .unwrap();
        let client = NodeClient::new(pool, &registry).unwrap();

        let handles: Vec<_> = (0..32u64)
            .map(|i| {
                let client = client.clone();
                thread::spawn(move || {
                    let resp = client.count(CountRequest::new([i.to_string()])).get().unwrap();
                    (i, resp.count)
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            let (sent, received) = handle.join().unwrap();
            assert_eq!(sent, received);
            successes += 1;
        }
        assert_eq!(successes, 32);
    }

    #[test]
    fn wait_timeout_leaves_the_call_running() {
        let rt = runtime();
        let pool = pool(&rt);
        let slow = pipeline_handler::<SearchAction, _>(
            &pool,
            executor_names::SEARCH,
            service_fn(|_req: SearchRequest| -> BoxFuture<SearchResponse> {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    Ok(SearchResponse {
                        hits: SearchHits {
                            total: 7,
                            ..SearchHits::default()
                        },
                        ..SearchResponse::default()
                    })
                })
            }),
            &ClientConfig::default(),
        );
        let client = client_with(
            &rt,
            &[SearchAction::NAME],
            ActionRegistry::builder().register::<SearchAction>(slow),
        );

        let completion = client.search(SearchRequest::new(["logs"]));
        let err = completion
            .get_timeout(Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, ActionError::WaitTimeout { waited_ms: 10 }));
        assert!(!completion.is_done());

        let resp = completion.get().unwrap();
        assert_eq!(resp.hits.total, 7);
    }

    #[test]
    fn one_outcome_for_every_observer() {
        let rt = runtime();
        let client = client_with(
            &rt,
            &[GetAction::NAME],
            ActionRegistry::builder().register::<GetAction>(StaticGet),
        );

        let completion = client.get(GetRequest::new("users", "9"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let seen = seen.clone();
            completion.on_complete(move |result| seen.lock().push(result.unwrap()));
        }
        let blocking = completion.get().unwrap();
        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|resp| *resp == blocking));
    }

    #[test]
    fn generic_execute_matches_typed_method() {
        let rt = runtime();
        let client = client_with(
            &rt,
            &[GetAction::NAME],
            ActionRegistry::builder().register::<GetAction>(StaticGet),
        );

        let typed = client.get(GetRequest::new("users", "4")).get().unwrap();
        let generic = client
            .execute::<GetAction>(GetRequest::new("users", "4"))
            .get()
            .unwrap();
        assert_eq!(typed, generic);

        let err = client
            .execute::<PercolateAction>(switchyard_core::messages::PercolateRequest::new(
                "queries",
                json!({"msg": "hi"}),
            ))
            .get()
            .unwrap_err();
        assert!(matches!(err, ActionError::NotImplemented { action: "percolate" }));
    }

    #[test]
    fn threaded_listener_runs_on_the_pool() {
        let rt = runtime();
        let client = client_with(
            &rt,
            &[GetAction::NAME],
            ActionRegistry::builder().register::<GetAction>(StaticGet),
        );

        let caller = thread::current().id();
        let (tx, rx) = mpsc::channel();
        client.get_with(
            GetRequest::new("users", "5"),
            client.thread_pool().threaded(listener(
                move |resp: GetResponse| tx.send((resp.id, thread::current().id())).unwrap(),
                |err| panic!("{err}"),
            )),
        );
        let (id, thread) = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(id, "5");
        assert_ne!(thread, caller);
    }

    #[test]
    fn close_is_a_no_op() {
        let rt = runtime();
        let client = client_with(
            &rt,
            &[GetAction::NAME],
            ActionRegistry::builder().register::<GetAction>(StaticGet),
        );
        client.close();
        client.close();
        client.close();
        assert!(!client.thread_pool().is_shutdown());
        assert!(client.get(GetRequest::new("users", "1")).get().unwrap().found);
    }

    #[test]
    fn admin_is_shared_between_clones() {
        let rt = runtime();
        let client = client_with(&rt, &[], ActionRegistry::builder());
        let copy = client.clone();
        assert!(Arc::ptr_eq(client.admin(), copy.admin()));
    }

    #[test]
    fn client_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone + 'static>() {}
        assert_traits::<NodeClient>();
    }
}
