use payments_relay::config::{AppConfig, StoreBackend};
use payments_relay::gateways::http::HttpProcessor;
use payments_relay::gateways::PaymentProcessor;
use payments_relay::health::oracle::HealthOracle;
use payments_relay::health::refresher::{build_refresher, spawn_refresh_loop};
use payments_relay::http::routes::router;
use payments_relay::queue::admission::AdmissionQueue;
use payments_relay::router::failover::FailoverRouter;
use payments_relay::service::payment_service::PaymentService;
use payments_relay::service::retry_orchestrator::RetryPolicy;
use payments_relay::service::worker_pool::WorkerPool;
use payments_relay::store::memory::MemoryStore;
use payments_relay::store::redis::RedisStore;
use payments_relay::store::{HealthBoard, PaymentStore};
use payments_relay::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let (store, board): (Arc<dyn PaymentStore>, Arc<dyn HealthBoard>) = match cfg.store_backend {
        StoreBackend::Redis => {
            let redis = Arc::new(RedisStore::connect(&cfg.redis_url).await?);
            (redis.clone() as Arc<dyn PaymentStore>, redis as Arc<dyn HealthBoard>)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, records are lost on restart");
            let mem = Arc::new(MemoryStore::new());
            (mem.clone() as Arc<dyn PaymentStore>, mem as Arc<dyn HealthBoard>)
        }
    };

    let processor: Arc<dyn PaymentProcessor> = Arc::new(HttpProcessor::new(
        reqwest::Client::new(),
        cfg.processor_timeout.as_millis() as u64,
    ));

    let oracle = HealthOracle::new(true);
    let refresher = build_refresher(
        cfg.health_role,
        processor.clone(),
        cfg.default_processor_url.clone(),
        board,
    );
    let health_loop = spawn_refresh_loop(oracle.clone(), refresher, cfg.health_interval);

    let service = Arc::new(PaymentService {
        processor,
        router: FailoverRouter::new(
            cfg.default_processor_url.clone(),
            cfg.fallback_processor_url.clone(),
            oracle.clone(),
        ),
        policy: RetryPolicy::from_config(&cfg),
        store: store.clone(),
    });

    let queue = AdmissionQueue::new(cfg.queue_capacity);
    let pool = WorkerPool::start(cfg.worker_concurrency, queue.clone(), service);
    tracing::info!(
        workers = pool.size(),
        queue_capacity = queue.capacity(),
        role = ?cfg.health_role,
        "worker pool started"
    );

    let app = router(AppState {
        queue,
        store,
        oracle,
    });

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("http server stopped");
    pool.shutdown(cfg.shutdown_grace).await;
    health_loop.abort();
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
