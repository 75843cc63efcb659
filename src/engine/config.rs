//! Engine configuration.

use std::time::Duration;

/// What happens when a scope write arrives while an update pass is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Run the nested update immediately, before the outer pass continues.
    #[default]
    Reentrant,
    /// Queue the key and run it after the outer pass, in write order.
    Queued,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub update_policy: UpdatePolicy,
    /// Shortest canvas timer period; shorter (and zero) periods are raised to it.
    pub min_timer_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_policy: UpdatePolicy::Reentrant,
            min_timer_period: Duration::from_millis(1),
        }
    }
}

impl EngineConfig {
    pub fn queued() -> Self {
        Self {
            update_policy: UpdatePolicy::Queued,
            ..Self::default()
        }
    }
}
