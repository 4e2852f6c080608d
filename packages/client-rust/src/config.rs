use std::num::NonZeroUsize;

use crate::thread_pool::executor_names;

/// Client-level configuration for handler pipelines and the worker pool.
///
/// Controls default action timeouts, concurrency limits, and executor sizing.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Name of the node this client runs on, attached to log spans.
    pub node_name: String,
    /// Timeout for actions whose request does not carry its own, in milliseconds.
    pub default_action_timeout_ms: u64,
    /// Maximum number of in-flight calls per action before load shedding.
    pub max_concurrent_actions: u32,
    /// Executor sizing for the worker pool.
    pub thread_pool: ThreadPoolConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_name: String::new(),
            default_action_timeout_ms: 30_000,
            max_concurrent_actions: 1000,
            thread_pool: ThreadPoolConfig::default(),
        }
    }
}

/// Concurrency bound for one named executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub name: &'static str,
    /// Maximum number of tasks running at once. Extra tasks queue.
    pub size: usize,
}

/// Executor sizing for [`ThreadPool`](crate::ThreadPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolConfig {
    pub executors: Vec<ExecutorConfig>,
}

impl ThreadPoolConfig {
    /// Configured size for `name`, if that executor exists.
    #[must_use]
    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.executors
            .iter()
            .find(|executor| executor.name == name)
            .map(|executor| executor.size)
    }

    /// Overrides (or adds) the size of one executor. Sizes below one are raised to one.
    #[must_use]
    pub fn with_size(mut self, name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        match self.executors.iter_mut().find(|executor| executor.name == name) {
            Some(executor) => executor.size = size,
            None => self.executors.push(ExecutorConfig { name, size }),
        }
        self
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let executors = vec![
            ExecutorConfig { name: executor_names::GENERIC, size: 128 },
            ExecutorConfig { name: executor_names::INDEX, size: cores },
            ExecutorConfig { name: executor_names::BULK, size: cores },
            ExecutorConfig { name: executor_names::GET, size: cores },
            ExecutorConfig { name: executor_names::SEARCH, size: cores * 3 },
            ExecutorConfig { name: executor_names::PERCOLATE, size: cores },
            ExecutorConfig { name: executor_names::MANAGEMENT, size: 5 },
            ExecutorConfig { name: executor_names::LISTENER, size: (cores / 2).max(1) },
        ];
        Self { executors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.default_action_timeout_ms, 30_000);
        assert_eq!(config.max_concurrent_actions, 1000);
        assert_eq!(config.thread_pool.size_of(executor_names::MANAGEMENT), Some(5));
        assert!(config.thread_pool.size_of(executor_names::LISTENER).unwrap() >= 1);
    }

    #[test]
    fn search_gets_three_times_index() {
        let pool = ThreadPoolConfig::default();
        let index = pool.size_of(executor_names::INDEX).unwrap();
        assert_eq!(pool.size_of(executor_names::SEARCH), Some(index * 3));
    }

    #[test]
    fn with_size_overrides_and_clamps() {
        let pool = ThreadPoolConfig::default()
            .with_size(executor_names::INDEX, 0)
            .with_size("reindex", 2);
        assert_eq!(pool.size_of(executor_names::INDEX), Some(1));
        assert_eq!(pool.size_of("reindex"), Some(2));
        assert_eq!(pool.size_of("missing"), None);
    }
}
