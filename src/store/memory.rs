use crate::domain::payment::{AbandonedPayment, PaymentRecord};
use crate::store::{record_key, HealthBoard, PaymentStore, FAILED_CAP};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, VecDeque};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    records: HashMap<String, PaymentRecord>,
    scores: HashMap<String, i64>,
    index: BTreeSet<(i64, String)>,
    failed: VecDeque<AbandonedPayment>,
    default_up: Option<bool>,
}

/// Single-process store with the same semantics as the redis layout.
/// Everything sits behind one lock, so record and index change together.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn index_len(&self) -> usize {
        self.inner.lock().await.index.len()
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryStore {
    async fn record_success(&self, record: &PaymentRecord) -> Result<()> {
        let key = record_key(&record.correlation_id);
        let score = record.index_score();
        let mut inner = self.inner.lock().await;

        if let Some(old) = inner.scores.insert(key.clone(), score) {
            inner.index.remove(&(old, key.clone()));
        }
        inner.index.insert((score, key.clone()));
        inner.records.insert(key, record.clone());
        Ok(())
    }

    async fn range_keys(&self, from_ms: Option<i64>, to_ms: Option<i64>) -> Result<Vec<String>> {
        let from = from_ms.unwrap_or(i64::MIN);
        let to = to_ms.unwrap_or(i64::MAX);
        if from > to {
            return Ok(Vec::new());
        }
        let inner = self.inner.lock().await;
        Ok(inner
            .index
            .range((from, String::new())..)
            .take_while(|(score, _)| *score <= to)
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn fetch_records(&self, keys: &[String]) -> Result<Vec<Option<PaymentRecord>>> {
        let inner = self.inner.lock().await;
        Ok(keys.iter().map(|k| inner.records.get(k).cloned()).collect())
    }

    async fn record_abandoned(&self, abandoned: &AbandonedPayment) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.failed.push_front(abandoned.clone());
        inner.failed.truncate(FAILED_CAP as usize);
        Ok(())
    }

    async fn recent_abandoned(&self, limit: usize) -> Result<Vec<AbandonedPayment>> {
        let inner = self.inner.lock().await;
        Ok(inner.failed.iter().take(limit).cloned().collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl HealthBoard for MemoryStore {
    async fn publish_default_up(&self, up: bool) -> Result<()> {
        self.inner.lock().await.default_up = Some(up);
        Ok(())
    }

    async fn read_default_up(&self) -> Result<Option<bool>> {
        Ok(self.inner.lock().await.default_up)
    }
}
