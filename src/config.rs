use crate::domain::health::HealthRole;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub redis_url: String,
    pub store_backend: StoreBackend,
    pub default_processor_url: String,
    pub fallback_processor_url: String,
    pub processor_timeout: Duration,
    pub worker_concurrency: usize,
    pub queue_capacity: usize,
    pub health_role: HealthRole,
    pub health_interval: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_jitter: Duration,
    pub shutdown_grace: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9999".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string()),
            store_backend: match std::env::var("STORE_BACKEND").as_deref() {
                Ok("memory") => StoreBackend::Memory,
                _ => StoreBackend::Redis,
            },
            default_processor_url: std::env::var("PROCESSOR_DEFAULT_URL")
                .unwrap_or_else(|_| "http://payment-processor-default:8080".to_string()),
            fallback_processor_url: std::env::var("PROCESSOR_FALLBACK_URL")
                .unwrap_or_else(|_| "http://payment-processor-fallback:8080".to_string()),
            processor_timeout: Duration::from_millis(env_or("PROCESSOR_TIMEOUT_MS", 3000)),
            worker_concurrency: env_or("CONCURRENCY", 20_usize).max(1),
            queue_capacity: env_or("QUEUE_CAPACITY", 2048_usize).max(1),
            health_role: HealthRole::parse(
                &std::env::var("HEALTH_ROLE").unwrap_or_else(|_| "leader".to_string()),
            ),
            health_interval: Duration::from_millis(env_or("HEALTH_INTERVAL_MS", 5000)),
            max_retries: env_or("MAX_RETRIES", 5_u32).max(1),
            backoff_base: Duration::from_millis(env_or("BACKOFF_BASE_MS", 1000)),
            backoff_jitter: Duration::from_millis(env_or("BACKOFF_JITTER_MS", 100)),
            shutdown_grace: Duration::from_millis(env_or("SHUTDOWN_GRACE_MS", 30_000)),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}
