//! Configuration for workspace update execution
//!
//! Controls how the update loop runs a step: whether buffered component
//! updates fan out over a thread pool, how long to pause between steps, and
//! what a failing action does to the step.

use std::time::Duration;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Component updates run in order on the scheduler thread
    #[default]
    Sequential,
    /// Buffered updates run concurrently on a Rayon pool
    Rayon,
}

/// What a step does when one of its actions fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log the failure, report it to listeners and run the next action
    #[default]
    LogAndContinue,
    /// End the step without advancing time and surface the error
    Abort,
}

/// Configuration for workspace execution
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// The concurrency mode to use for buffered updates
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
    /// Pause before every step
    pub update_delay: Duration,
    pub error_policy: ErrorPolicy,
}

impl WorkspaceConfig {
    /// Sequential mode, no delay, failing actions are logged and skipped
    pub fn new() -> Self {
        Self {
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
            update_delay: Duration::ZERO,
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = delay;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.thread_pool_size, None);
        assert_eq!(config.update_delay, Duration::ZERO);
        assert_eq!(config.error_policy, ErrorPolicy::LogAndContinue);
    }

    #[test]
    fn test_config_builder() {
        let config = WorkspaceConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4)
            .with_update_delay(Duration::from_millis(5))
            .with_error_policy(ErrorPolicy::Abort);

        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
        assert_eq!(config.update_delay, Duration::from_millis(5));
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
    }
}
