use crate::domain::health::HealthRole;
use crate::gateways::PaymentProcessor;
use crate::health::oracle::HealthOracle;
use crate::store::HealthBoard;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// The service-health endpoint allows one call per five seconds.
pub const MIN_PROBE_INTERVAL: Duration = Duration::from_secs(5);

#[async_trait::async_trait]
pub trait HealthRefresher: Send + Sync {
    fn role(&self) -> HealthRole;

    /// Current verdict on the default processor: `true` means route to it.
    async fn refresh(&self) -> bool;
}

/// Probes the default processor and publishes the result for followers.
pub struct LeaderRefresher {
    processor: Arc<dyn PaymentProcessor>,
    default_url: String,
    board: Arc<dyn HealthBoard>,
    min_interval: Duration,
    last_probe: Mutex<Option<(Instant, bool)>>,
}

impl LeaderRefresher {
    pub fn new(processor: Arc<dyn PaymentProcessor>, default_url: String, board: Arc<dyn HealthBoard>) -> Self {
        Self {
            processor,
            default_url,
            board,
            min_interval: MIN_PROBE_INTERVAL,
            last_probe: Mutex::new(None),
        }
    }

    async fn probe(&self) -> bool {
        match self.processor.service_health(&self.default_url).await {
            Ok(health) => {
                tracing::debug!(
                    failing = health.failing,
                    min_response_time = health.min_response_time,
                    "default processor probed"
                );
                !health.failing
            }
            Err(e) => {
                tracing::warn!("default processor health probe failed: {}", e);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl HealthRefresher for LeaderRefresher {
    fn role(&self) -> HealthRole {
        HealthRole::Leader
    }

    async fn refresh(&self) -> bool {
        let mut last = self.last_probe.lock().await;
        if let Some((at, up)) = *last {
            if at.elapsed() < self.min_interval {
                return up;
            }
        }

        let up = self.probe().await;
        *last = Some((Instant::now(), up));
        drop(last);

        if let Err(e) = self.board.publish_default_up(up).await {
            tracing::warn!("failed to publish default processor health: {}", e);
        }
        up
    }
}

/// Reads whatever the leader last published; never touches the processor.
pub struct FollowerRefresher {
    board: Arc<dyn HealthBoard>,
}

impl FollowerRefresher {
    pub fn new(board: Arc<dyn HealthBoard>) -> Self {
        Self { board }
    }
}

#[async_trait::async_trait]
impl HealthRefresher for FollowerRefresher {
    fn role(&self) -> HealthRole {
        HealthRole::Follower
    }

    async fn refresh(&self) -> bool {
        match self.board.read_default_up().await {
            Ok(Some(up)) => up,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("failed to read published health: {}", e);
                false
            }
        }
    }
}

pub fn build_refresher(
    role: HealthRole,
    processor: Arc<dyn PaymentProcessor>,
    default_url: String,
    board: Arc<dyn HealthBoard>,
) -> Arc<dyn HealthRefresher> {
    match role {
        HealthRole::Leader => Arc::new(LeaderRefresher::new(processor, default_url, board)),
        HealthRole::Follower => Arc::new(FollowerRefresher::new(board)),
    }
}

/// Refreshes the oracle every `interval`; the first tick fires immediately.
pub fn spawn_refresh_loop(
    oracle: HealthOracle,
    refresher: Arc<dyn HealthRefresher>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(role = ?refresher.role(), "health refresh loop started");
        loop {
            ticker.tick().await;
            let up = refresher.refresh().await;
            oracle.update(up).await;
        }
    })
}
