pub mod config;
pub mod domain {
    pub mod health;
    pub mod payment;
}
pub mod gateways;
pub mod health {
    pub mod oracle;
    pub mod refresher;
}
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
        pub mod summary;
    }
    pub mod routes;
}
pub mod queue {
    pub mod admission;
}
pub mod router {
    pub mod failover;
}
pub mod service {
    pub mod payment_service;
    pub mod retry_orchestrator;
    pub mod summary_service;
    pub mod worker_pool;
}
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub queue: queue::admission::AdmissionQueue,
    pub store: std::sync::Arc<dyn store::PaymentStore>,
    pub oracle: health::oracle::HealthOracle,
}
