use crate::domain::health::ServiceHealth;
use crate::domain::payment::ProcessorPayment;
use anyhow::Result;

pub mod http;
pub mod mock;

/// Result of a single submission attempt against one processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// 5xx: the processor is overloaded right now.
    RetryableFailure { status: u16 },
    /// Any other status or a transport error. Still retried by the caller.
    FatalFailure { reason: String },
}

impl AttemptOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => AttemptOutcome::Success,
            500..=599 => AttemptOutcome::RetryableFailure { status },
            _ => AttemptOutcome::FatalFailure {
                reason: format!("HTTP_{}", status),
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AttemptOutcome::Success => "success".to_string(),
            AttemptOutcome::RetryableFailure { status } => format!("HTTP_{}", status),
            AttemptOutcome::FatalFailure { reason } => reason.clone(),
        }
    }
}

/// One stateless HTTP call per method; retry and routing live in the caller.
#[async_trait::async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn submit(&self, base_url: &str, payment: &ProcessorPayment) -> AttemptOutcome;

    async fn service_health(&self, base_url: &str) -> Result<ServiceHealth>;
}
