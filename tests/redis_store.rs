//! Runs against a live server only when `REDIS_URL` is set.

use chrono::{TimeZone, Utc};
use payments_relay::domain::payment::{AbandonedPayment, PaymentRecord};
use payments_relay::service::summary_service::summarize;
use payments_relay::store::redis::RedisStore;
use payments_relay::store::{record_key, HealthBoard, PaymentStore, FAILED_KEY, INDEX_KEY};
use redis::AsyncCommands;

struct Live {
    store: RedisStore,
    conn: redis::aio::MultiplexedConnection,
    run: String,
    base_ms: i64,
}

async fn live() -> Option<Live> {
    let url = std::env::var("REDIS_URL").ok()?;
    let store = RedisStore::connect(&url).await.unwrap();
    let conn = redis::Client::open(url.as_str())
        .unwrap()
        .get_multiplexed_async_connection()
        .await
        .unwrap();
    let nanos = Utc::now().timestamp_nanos_opt().unwrap();
    Some(Live {
        store,
        conn,
        run: format!("it-{}", nanos),
        // far in the future and 100 s apart per run, so windows never overlap
        base_ms: 7_258_118_400_000 + (nanos % 1_000_000) * 100_000,
    })
}

impl Live {
    fn record(&self, id: &str, offset_ms: i64, amount: f64, on_default: bool) -> PaymentRecord {
        PaymentRecord {
            correlation_id: format!("{}-{}", self.run, id),
            amount,
            requested_at: Utc.timestamp_millis_opt(self.base_ms + offset_ms).unwrap(),
            on_default,
        }
    }

    async fn cleanup(&mut self, ids: &[&str]) {
        for id in ids {
            let key = record_key(&format!("{}-{}", self.run, id));
            let _: () = self.conn.del(&key).await.unwrap();
            let _: () = self.conn.zrem(INDEX_KEY, &key).await.unwrap();
        }
    }
}

#[tokio::test]
async fn record_and_index_round_trip() {
    let Some(mut live) = live().await else {
        eprintln!("REDIS_URL not set, skipping");
        return;
    };

    let a = live.record("a", 0, 10.0, true);
    let b = live.record("b", 500, 2.25, false);
    let c = live.record("c", 2_000, 7.0, true);
    for r in [&a, &b, &c] {
        live.store.record_success(r).await.unwrap();
    }

    let keys = live
        .store
        .range_keys(Some(live.base_ms), Some(live.base_ms + 500))
        .await
        .unwrap();
    assert_eq!(
        keys,
        vec![record_key(&a.correlation_id), record_key(&b.correlation_id)]
    );

    let score: Option<f64> = live.conn.zscore(INDEX_KEY, record_key(&c.correlation_id)).await.unwrap();
    assert_eq!(score, Some((live.base_ms + 2_000) as f64));

    let fetched = live.store.fetch_records(&keys).await.unwrap();
    assert_eq!(fetched, vec![Some(a.clone()), Some(b.clone())]);

    let from = Utc.timestamp_millis_opt(live.base_ms).unwrap();
    let to = Utc.timestamp_millis_opt(live.base_ms + 2_000).unwrap();
    let summary = summarize(&live.store, Some(from), Some(to)).await.unwrap();
    assert_eq!(summary.default.total_requests, 2);
    assert_eq!(summary.default.total_amount, 17.0);
    assert_eq!(summary.fallback.total_requests, 1);
    assert_eq!(summary.fallback.total_amount, 2.3);

    live.cleanup(&["a", "b", "c"]).await;
}

#[tokio::test]
async fn rerecording_moves_the_single_index_entry() {
    let Some(mut live) = live().await else {
        eprintln!("REDIS_URL not set, skipping");
        return;
    };

    live.store.record_success(&live.record("m", 0, 1.0, true)).await.unwrap();
    live.store.record_success(&live.record("m", 10_000, 1.0, false)).await.unwrap();

    let early = live.store.range_keys(Some(live.base_ms), Some(live.base_ms + 1)).await.unwrap();
    assert!(early.is_empty());
    let late = live
        .store
        .range_keys(Some(live.base_ms + 10_000), Some(live.base_ms + 10_000))
        .await
        .unwrap();
    assert_eq!(late.len(), 1);

    live.cleanup(&["m"]).await;
}

#[tokio::test]
async fn unreadable_and_missing_records_fetch_as_none() {
    let Some(mut live) = live().await else {
        eprintln!("REDIS_URL not set, skipping");
        return;
    };

    let good = live.record("good", 0, 3.0, true);
    live.store.record_success(&good).await.unwrap();
    let corrupt_key = record_key(&format!("{}-corrupt", live.run));
    let _: () = live.conn.set(&corrupt_key, "{not a record").await.unwrap();

    let out = live
        .store
        .fetch_records(&[
            record_key(&good.correlation_id),
            corrupt_key.clone(),
            record_key(&format!("{}-missing", live.run)),
        ])
        .await
        .unwrap();
    assert_eq!(out, vec![Some(good), None, None]);
    assert!(live.store.fetch_records(&[]).await.unwrap().is_empty());

    live.cleanup(&["good", "corrupt"]).await;
}

#[tokio::test]
async fn abandoned_list_and_health_flag() {
    let Some(mut live) = live().await else {
        eprintln!("REDIS_URL not set, skipping");
        return;
    };

    let abandoned = AbandonedPayment {
        correlation_id: format!("{}-dead", live.run),
        amount: 9.0,
        attempts: 5,
        last_error: "HTTP_500".to_string(),
        abandoned_at: Utc::now(),
    };
    live.store.record_abandoned(&abandoned).await.unwrap();
    let recent = live.store.recent_abandoned(50).await.unwrap();
    assert!(recent.iter().any(|p| p.correlation_id == abandoned.correlation_id));
    assert!(live.store.recent_abandoned(0).await.unwrap().is_empty());

    let payload = serde_json::to_string(&abandoned).unwrap();
    let _: () = live.conn.lrem(FAILED_KEY, 1, payload).await.unwrap();

    live.store.ping().await.unwrap();
    live.store.publish_default_up(false).await.unwrap();
    assert_eq!(live.store.read_default_up().await.unwrap(), Some(false));
    live.store.publish_default_up(true).await.unwrap();
    assert_eq!(live.store.read_default_up().await.unwrap(), Some(true));
}
