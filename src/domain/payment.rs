use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Default,
    Fallback,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Default => "default",
            Provider::Fallback => "fallback",
        }
    }
}

/// Body accepted by `POST /payments`, decoded by the worker that picks it up.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub correlation_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct PaymentTask {
    pub correlation_id: String,
    pub amount: f64,
    pub requested_at: Option<DateTime<Utc>>,
    pub attempt_count: u32,
    pub resolved_provider: Option<Provider>,
}

impl PaymentTask {
    pub fn new(correlation_id: impl Into<String>, amount: f64) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            amount,
            requested_at: None,
            attempt_count: 0,
            resolved_provider: None,
        }
    }

    pub fn decode(raw: &[u8]) -> anyhow::Result<Self> {
        let req: CreatePaymentRequest = serde_json::from_slice(raw)?;
        if req.correlation_id.trim().is_empty() {
            anyhow::bail!("correlationId must not be empty");
        }
        if !req.amount.is_finite() || req.amount <= 0.0 {
            anyhow::bail!("amount must be a positive number, got {}", req.amount);
        }
        Ok(Self::new(req.correlation_id, req.amount))
    }
}

/// Body sent to a processor's `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorPayment {
    pub correlation_id: String,
    pub amount: f64,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub correlation_id: String,
    pub amount: f64,
    pub requested_at: DateTime<Utc>,
    pub on_default: bool,
}

impl PaymentRecord {
    pub fn index_score(&self) -> i64 {
        self.requested_at.timestamp_millis()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonedPayment {
    pub correlation_id: String,
    pub amount: f64,
    pub attempts: u32,
    pub last_error: String,
    pub abandoned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTotals {
    pub total_requests: u64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentsSummary {
    pub default: ProviderTotals,
    pub fallback: ProviderTotals,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}
