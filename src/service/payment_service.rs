use crate::domain::payment::{AbandonedPayment, PaymentRecord, PaymentTask, ProcessorPayment, Provider};
use crate::gateways::{AttemptOutcome, PaymentProcessor};
use crate::router::failover::FailoverRouter;
use crate::service::retry_orchestrator::{classify_attempt_result, RetryDirective, RetryPolicy};
use crate::store::PaymentStore;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Recorded(Provider),
    /// The processor accepted the payment but the store write failed.
    PaidNotRecorded(Provider),
    Abandoned { last_error: String },
}

/// Runs one task through attempt, route, retry and persist.
#[derive(Clone)]
pub struct PaymentService {
    pub processor: Arc<dyn PaymentProcessor>,
    pub router: FailoverRouter,
    pub policy: RetryPolicy,
    pub store: Arc<dyn PaymentStore>,
}

impl PaymentService {
    pub async fn deliver(&self, task: &mut PaymentTask) -> DeliveryOutcome {
        loop {
            task.attempt_count += 1;
            let attempt = task.attempt_count;
            let target = self.router.select().await;
            let requested_at = Utc::now();
            task.requested_at = Some(requested_at);

            let payment = ProcessorPayment {
                correlation_id: task.correlation_id.clone(),
                amount: task.amount,
                requested_at,
            };
            let outcome = self.processor.submit(&target.base_url, &payment).await;

            if matches!(outcome, AttemptOutcome::RetryableFailure { .. }) {
                self.router.oracle().report_unhealthy(target.provider);
            }

            match classify_attempt_result(&outcome, attempt, &self.policy) {
                RetryDirective::Success => {
                    task.resolved_provider = Some(target.provider);
                    let record = PaymentRecord {
                        correlation_id: task.correlation_id.clone(),
                        amount: task.amount,
                        requested_at,
                        on_default: target.provider == Provider::Default,
                    };
                    return self.persist(&record, target.provider).await;
                }
                RetryDirective::RetryAfter(wait) => {
                    tracing::debug!(
                        correlation_id = %task.correlation_id,
                        attempt,
                        provider = target.provider.as_str(),
                        outcome = %outcome.describe(),
                        wait_ms = wait.as_millis() as u64,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                RetryDirective::Abandon => {
                    let last_error = outcome.describe();
                    self.abandon(task, &last_error).await;
                    return DeliveryOutcome::Abandoned { last_error };
                }
            }
        }
    }

    async fn persist(&self, record: &PaymentRecord, provider: Provider) -> DeliveryOutcome {
        match self.store.record_success(record).await {
            Ok(()) => {
                tracing::debug!(
                    correlation_id = %record.correlation_id,
                    provider = provider.as_str(),
                    "payment recorded"
                );
                DeliveryOutcome::Recorded(provider)
            }
            Err(e) => {
                tracing::error!(
                    correlation_id = %record.correlation_id,
                    provider = provider.as_str(),
                    amount = record.amount,
                    "paid but not recorded: {}",
                    e
                );
                DeliveryOutcome::PaidNotRecorded(provider)
            }
        }
    }

    async fn abandon(&self, task: &PaymentTask, last_error: &str) {
        tracing::error!(
            correlation_id = %task.correlation_id,
            attempts = task.attempt_count,
            amount = task.amount,
            "payment abandoned after exhausting retries: {}",
            last_error
        );
        let abandoned = AbandonedPayment {
            correlation_id: task.correlation_id.clone(),
            amount: task.amount,
            attempts: task.attempt_count,
            last_error: last_error.to_string(),
            abandoned_at: Utc::now(),
        };
        if let Err(e) = self.store.record_abandoned(&abandoned).await {
            tracing::error!(correlation_id = %task.correlation_id, "failed to store abandoned payment: {}", e);
        }
    }
}
