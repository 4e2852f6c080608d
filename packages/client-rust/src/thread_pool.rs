//! Named, concurrency-bounded executors on top of a tokio runtime.
//!
//! Handlers hand their work to an executor; the facade only exposes the pool
//! to callers. Whoever builds the pool owns its shutdown.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ThreadPoolConfig;
use crate::error::{ActionError, ActionResult};
use crate::listener::ActionListener;

/// Well-known executor names.
pub mod executor_names {
    pub const GENERIC: &str = "generic";
    pub const INDEX: &str = "index";
    pub const BULK: &str = "bulk";
    pub const GET: &str = "get";
    pub const SEARCH: &str = "search";
    pub const PERCOLATE: &str = "percolate";
    pub const MANAGEMENT: &str = "management";
    /// Runs threaded listener callbacks.
    pub const LISTENER: &str = "listener";
    /// Unbounded: tasks start as soon as they are submitted.
    pub const SAME: &str = "same";
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// One lane of the pool. At most `size` tasks run at once; the rest queue
/// for a permit.
#[derive(Debug, Clone)]
pub struct Executor {
    name: &'static str,
    permits: Option<Arc<Semaphore>>,
    handle: Handle,
    shutdown: Arc<AtomicBool>,
}

impl Executor {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `true` once the owning pool has been shut down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Schedules `task`. Tasks accepted before shutdown still run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Rejected`] and drops `task` if the pool is shut down.
    pub fn spawn<F>(&self, task: F) -> ActionResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_shutdown() {
            return Err(ActionError::Rejected {
                executor: self.name,
            });
        }
        match &self.permits {
            Some(permits) => {
                let permits = permits.clone();
                self.handle.spawn(async move {
                    // The semaphore is never closed, so acquisition only fails
                    // if that invariant is broken; run the task regardless.
                    let _permit = permits.acquire_owned().await.ok();
                    task.await;
                });
            }
            None => {
                self.handle.spawn(task);
            }
        }
        Ok(())
    }

    /// Runs `f` on this executor, or inline on the calling thread if the pool
    /// is shut down. `f` runs exactly once either way.
    pub fn execute_or_inline<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(Some(f)));
        let task_slot = slot.clone();
        let spawned = self.spawn(async move {
            let f = task_slot.lock().take();
            if let Some(f) = f {
                f();
            }
        });
        if spawned.is_err() {
            let f = slot.lock().take();
            if let Some(f) = f {
                f();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ThreadPool
// ---------------------------------------------------------------------------

/// The worker pool shared by handlers.
#[derive(Debug, Clone)]
pub struct ThreadPool {
    executors: Arc<HashMap<&'static str, Executor>>,
    same: Executor,
    shutdown: Arc<AtomicBool>,
}

impl ThreadPool {
    /// Builds the executors described by `config` on `handle`. The `same`
    /// executor is always present.
    #[must_use]
    pub fn new(handle: Handle, config: &ThreadPoolConfig) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut executors = HashMap::new();
        for executor in &config.executors {
            executors.insert(
                executor.name,
                Executor {
                    name: executor.name,
                    permits: Some(Arc::new(Semaphore::new(executor.size.max(1)))),
                    handle: handle.clone(),
                    shutdown: shutdown.clone(),
                },
            );
        }
        let same = Executor {
            name: executor_names::SAME,
            permits: None,
            handle,
            shutdown: shutdown.clone(),
        };
        executors.insert(executor_names::SAME, same.clone());
        debug!(executors = executors.len(), "thread pool started");
        Self {
            executors: Arc::new(executors),
            same,
            shutdown,
        }
    }

    /// Builds the pool on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside a tokio runtime.
    pub fn from_current(config: &ThreadPoolConfig) -> anyhow::Result<Self> {
        let handle = Handle::try_current()?;
        Ok(Self::new(handle, config))
    }

    /// Looks up an executor by name.
    #[must_use]
    pub fn executor(&self, name: &str) -> Option<&Executor> {
        self.executors.get(name)
    }

    /// The named executor, or `generic` if no such executor is configured.
    /// Falls back to `same` when `generic` is missing as well.
    #[must_use]
    pub fn executor_or_generic(&self, name: &str) -> Executor {
        self.executors
            .get(name)
            .or_else(|| self.executors.get(executor_names::GENERIC))
            .unwrap_or(&self.same)
            .clone()
    }

    /// Stops accepting new tasks. Already accepted tasks keep running.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            debug!("thread pool shut down");
        }
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Wraps `listener` so its callbacks run on the `listener` executor
    /// instead of the thread that settles the call.
    #[must_use]
    pub fn threaded<L>(&self, listener: L) -> ThreadedListener<L> {
        ThreadedListener {
            executor: self.executor_or_generic(executor_names::LISTENER),
            listener,
        }
    }
}

// ---------------------------------------------------------------------------
// ThreadedListener
// ---------------------------------------------------------------------------

/// Listener adapter that moves callback execution onto an executor.
pub struct ThreadedListener<L> {
    executor: Executor,
    listener: L,
}

impl<T, L> ActionListener<T> for ThreadedListener<L>
where
    T: Send + 'static,
    L: ActionListener<T>,
{
    fn on_response(self, response: T) {
        let listener = self.listener;
        self.executor
            .execute_or_inline(move || listener.on_response(response));
    }

    fn on_failure(self, error: ActionError) {
        let listener = self.listener;
        self.executor
            .execute_or_inline(move || listener.on_failure(error));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
