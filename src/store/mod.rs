use crate::domain::payment::{AbandonedPayment, PaymentRecord};
use anyhow::Result;

pub mod memory;
pub mod redis;

pub const INDEX_KEY: &str = "payments:by-date";
pub const HEALTH_KEY: &str = "payments:health:default-up";
pub const FAILED_KEY: &str = "payments:failed";
pub const FAILED_CAP: isize = 10_000;

pub fn record_key(correlation_id: &str) -> String {
    format!("payments:{}", correlation_id)
}

/// Durable payment records plus the time-ordered index over them.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    /// Writes the record and its index entry as one atomic unit.
    async fn record_success(&self, record: &PaymentRecord) -> Result<()>;

    /// Record keys whose index score (epoch millis) lies in `[from_ms, to_ms]`.
    /// `None` leaves that side open.
    async fn range_keys(&self, from_ms: Option<i64>, to_ms: Option<i64>) -> Result<Vec<String>>;

    /// Positional batch read; missing or undecodable records come back as `None`.
    async fn fetch_records(&self, keys: &[String]) -> Result<Vec<Option<PaymentRecord>>>;

    async fn record_abandoned(&self, abandoned: &AbandonedPayment) -> Result<()>;

    /// Newest first.
    async fn recent_abandoned(&self, limit: usize) -> Result<Vec<AbandonedPayment>>;

    async fn ping(&self) -> Result<()>;
}

/// Shared slot where the health leader publishes its verdict for followers.
#[async_trait::async_trait]
pub trait HealthBoard: Send + Sync {
    async fn publish_default_up(&self, up: bool) -> Result<()>;

    async fn read_default_up(&self) -> Result<Option<bool>>;
}
