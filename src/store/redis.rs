use crate::domain::payment::{AbandonedPayment, PaymentRecord};
use crate::store::{record_key, HealthBoard, PaymentStore, FAILED_CAP, FAILED_KEY, HEALTH_KEY, INDEX_KEY};
use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

fn score_bound(ms: Option<i64>, open: &str) -> String {
    ms.map(|v| v.to_string()).unwrap_or_else(|| open.to_string())
}

#[async_trait::async_trait]
impl PaymentStore for RedisStore {
    async fn record_success(&self, record: &PaymentRecord) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = record_key(&record.correlation_id);
        let payload = serde_json::to_string(record)?;

        let _: () = redis::pipe()
            .atomic()
            .set(&key, payload)
            .ignore()
            .zadd(INDEX_KEY, &key, record.index_score())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn range_keys(&self, from_ms: Option<i64>, to_ms: Option<i64>) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .zrangebyscore(INDEX_KEY, score_bound(from_ms, "-inf"), score_bound(to_ms, "+inf"))
            .await?;
        Ok(keys)
    }

    async fn fetch_records(&self, keys: &[String]) -> Result<Vec<Option<PaymentRecord>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let payloads: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut conn).await?;

        Ok(payloads
            .into_iter()
            .map(|p| p.and_then(|raw| serde_json::from_str::<PaymentRecord>(&raw).ok()))
            .collect())
    }

    async fn record_abandoned(&self, abandoned: &AbandonedPayment) -> Result<()> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(abandoned)?;
        let _: () = redis::pipe()
            .atomic()
            .lpush(FAILED_KEY, payload)
            .ignore()
            .ltrim(FAILED_KEY, 0, FAILED_CAP - 1)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn recent_abandoned(&self, limit: usize) -> Result<Vec<AbandonedPayment>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(FAILED_KEY, 0, limit as isize - 1).await?;
        Ok(raw
            .iter()
            .filter_map(|r| serde_json::from_str::<AbandonedPayment>(r).ok())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl HealthBoard for RedisStore {
    async fn publish_default_up(&self, up: bool) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(HEALTH_KEY, if up { "1" } else { "0" }).await?;
        Ok(())
    }

    async fn read_default_up(&self) -> Result<Option<bool>> {
        let mut conn = self.conn.clone();
        let val: Option<String> = conn.get(HEALTH_KEY).await?;
        Ok(val.map(|v| v == "1" || v.eq_ignore_ascii_case("true")))
    }
}
