use crate::domain::health::ServiceHealth;
use crate::domain::payment::ProcessorPayment;
use crate::gateways::{AttemptOutcome, PaymentProcessor};
use anyhow::Result;

pub struct HttpProcessor {
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl HttpProcessor {
    pub fn new(client: reqwest::Client, timeout_ms: u64) -> Self {
        Self { timeout_ms, client }
    }
}

#[async_trait::async_trait]
impl PaymentProcessor for HttpProcessor {
    async fn submit(&self, base_url: &str, payment: &ProcessorPayment) -> AttemptOutcome {
        let url = format!("{}/payments", base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .json(payment)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        match resp {
            Ok(r) => {
                let status = r.status().as_u16();
                // read to the end so the connection goes back to the pool
                if let Err(e) = r.bytes().await {
                    tracing::debug!(status, "failed to drain processor response: {}", e);
                }
                AttemptOutcome::from_status(status)
            }
            Err(e) if e.is_timeout() => AttemptOutcome::FatalFailure {
                reason: "TIMEOUT".to_string(),
            },
            Err(e) => AttemptOutcome::FatalFailure {
                reason: format!("NETWORK_ERROR: {}", e),
            },
        }
    }

    async fn service_health(&self, base_url: &str) -> Result<ServiceHealth> {
        let url = format!("{}/payments/service-health", base_url.trim_end_matches('/'));
        let health = self
            .client
            .get(url)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?
            .error_for_status()?
            .json::<ServiceHealth>()
            .await?;
        Ok(health)
    }
}
