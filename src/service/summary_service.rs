use crate::domain::payment::{PaymentsSummary, ProviderTotals};
use crate::store::PaymentStore;
use anyhow::Result;
use chrono::{DateTime, Utc};

const FETCH_BATCH: usize = 1000;

pub fn round_amount(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Totals per processor for records with `requested_at` in `[from, to]`.
/// Index entries whose record is missing or unreadable are skipped.
pub async fn summarize(
    store: &dyn PaymentStore,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<PaymentsSummary> {
    let keys = store
        .range_keys(from.map(|t| t.timestamp_millis()), to.map(|t| t.timestamp_millis()))
        .await?;

    let mut summary = PaymentsSummary::default();
    let mut skipped = 0_usize;
    for chunk in keys.chunks(FETCH_BATCH) {
        for record in store.fetch_records(chunk).await? {
            let Some(record) = record else {
                skipped += 1;
                continue;
            };
            let totals = if record.on_default {
                &mut summary.default
            } else {
                &mut summary.fallback
            };
            totals.total_requests += 1;
            totals.total_amount += record.amount;
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "summary skipped index entries without a readable record");
    }

    summary.default = rounded(summary.default);
    summary.fallback = rounded(summary.fallback);
    Ok(summary)
}

fn rounded(t: ProviderTotals) -> ProviderTotals {
    ProviderTotals {
        total_requests: t.total_requests,
        total_amount: round_amount(t.total_amount),
    }
}
