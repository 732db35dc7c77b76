use crate::domain::payment::PaymentTask;
use crate::queue::admission::AdmissionQueue;
use crate::service::payment_service::{DeliveryOutcome, PaymentService};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Fixed set of workers draining one admission queue.
pub struct WorkerPool {
    queue: AdmissionQueue,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(pool_size: usize, queue: AdmissionQueue, service: Arc<PaymentService>) -> Self {
        let handles = (0..pool_size.max(1))
            .map(|id| tokio::spawn(run_worker(id, queue.clone(), service.clone())))
            .collect();
        Self { queue, handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Closes the queue and waits up to `grace` for workers to drain it.
    /// Returns how many workers had to be aborted.
    pub async fn shutdown(self, grace: Duration) -> usize {
        self.queue.close();
        tracing::info!(
            workers = self.handles.len(),
            pending = self.queue.len(),
            "draining worker pool"
        );

        let deadline = tokio::time::Instant::now() + grace;
        let mut aborted = 0;
        for handle in self.handles {
            let abort = handle.abort_handle();
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("worker task ended abnormally: {}", e),
                Err(_) => {
                    abort.abort();
                    aborted += 1;
                }
            }
        }

        if aborted > 0 {
            tracing::warn!(aborted, "workers exceeded shutdown grace period and were abandoned");
        }
        aborted
    }
}

async fn run_worker(id: usize, queue: AdmissionQueue, service: Arc<PaymentService>) {
    while let Some(raw) = queue.dequeue().await {
        let mut task = match PaymentTask::decode(&raw) {
            Ok(task) => task,
            Err(e) => {
                tracing::warn!(worker = id, "dropping malformed payment task: {}", e);
                continue;
            }
        };

        if let DeliveryOutcome::Recorded(provider) = service.deliver(&mut task).await {
            tracing::trace!(
                worker = id,
                correlation_id = %task.correlation_id,
                attempts = task.attempt_count,
                provider = provider.as_str(),
                "task done"
            );
        }
    }
    tracing::debug!(worker = id, "queue closed, worker exiting");
}
