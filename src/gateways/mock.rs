use crate::domain::health::ServiceHealth;
use crate::domain::payment::ProcessorPayment;
use crate::gateways::{AttemptOutcome, PaymentProcessor};
use anyhow::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MockCall {
    pub base_url: String,
    pub payment: ProcessorPayment,
}

/// In-process processor with scripted responses.
///
/// Each call consumes the next scripted status; once the script runs dry the
/// per-URL status applies, then `default_status`. A status of `0` simulates a
/// transport error.
pub struct MockProcessor {
    pub default_status: u16,
    script: Mutex<VecDeque<u16>>,
    by_url: Mutex<HashMap<String, u16>>,
    calls: Mutex<Vec<MockCall>>,
    failing: AtomicBool,
    probe_error: AtomicBool,
    probes: Mutex<Vec<String>>,
}

impl MockProcessor {
    pub fn new(default_status: u16) -> Self {
        Self {
            default_status,
            script: Mutex::new(VecDeque::new()),
            by_url: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            probe_error: AtomicBool::new(false),
            probes: Mutex::new(Vec::new()),
        }
    }

    pub fn always_success() -> Self {
        Self::new(200)
    }

    pub fn with_script(self, statuses: &[u16]) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(statuses.iter().copied());
        }
        self
    }

    pub fn with_url_status(self, base_url: &str, status: u16) -> Self {
        self.set_url_status(base_url, status);
        self
    }

    pub fn set_url_status(&self, base_url: &str, status: u16) {
        if let Ok(mut by_url) = self.by_url.lock() {
            by_url.insert(base_url.to_string(), status);
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_probe_error(&self, error: bool) {
        self.probe_error.store(error, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn next_status(&self, base_url: &str) -> u16 {
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        if let Some(status) = scripted {
            return status;
        }
        self.by_url
            .lock()
            .ok()
            .and_then(|m| m.get(base_url).copied())
            .unwrap_or(self.default_status)
    }
}

#[async_trait::async_trait]
impl PaymentProcessor for MockProcessor {
    async fn submit(&self, base_url: &str, payment: &ProcessorPayment) -> AttemptOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                base_url: base_url.to_string(),
                payment: payment.clone(),
            });
        }

        match self.next_status(base_url) {
            0 => AttemptOutcome::FatalFailure {
                reason: "NETWORK_ERROR: mock connection refused".to_string(),
            },
            status => AttemptOutcome::from_status(status),
        }
    }

    async fn service_health(&self, base_url: &str) -> Result<ServiceHealth> {
        if let Ok(mut probes) = self.probes.lock() {
            probes.push(base_url.to_string());
        }
        if self.probe_error.load(Ordering::SeqCst) {
            anyhow::bail!("mock health endpoint unreachable");
        }
        Ok(ServiceHealth {
            failing: self.failing.load(Ordering::SeqCst),
            min_response_time: 0,
        })
    }
}
