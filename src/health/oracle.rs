use crate::domain::payment::Provider;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderHealth {
    pub default_up: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Process-wide "is the default processor preferred" flag.
///
/// Cloned into every worker and the refresh loop; all clones share one lock.
#[derive(Clone)]
pub struct HealthOracle {
    inner: Arc<RwLock<ProviderHealth>>,
}

impl HealthOracle {
    pub fn new(default_up: bool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ProviderHealth {
                default_up,
                refreshed_at: None,
            })),
        }
    }

    pub async fn default_up(&self) -> bool {
        self.inner.read().await.default_up
    }

    pub async fn snapshot(&self) -> ProviderHealth {
        *self.inner.read().await
    }

    pub async fn update(&self, default_up: bool) {
        let mut state = self.inner.write().await;
        if state.default_up != default_up {
            tracing::info!(default_up, "default processor health changed");
        }
        state.default_up = default_up;
        state.refreshed_at = Some(Utc::now());
    }

    /// Best-effort hint from a worker that just saw a 5xx. Never waits for the
    /// lock; returns whether the flag was actually flipped.
    pub fn report_unhealthy(&self, provider: Provider) -> bool {
        if provider != Provider::Default {
            return false;
        }
        match self.inner.try_write() {
            Ok(mut state) if state.default_up => {
                state.default_up = false;
                tracing::warn!("default processor marked down after 5xx");
                true
            }
            _ => false,
        }
    }
}
