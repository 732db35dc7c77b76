use crate::config::AppConfig;
use crate::gateways::AttemptOutcome;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter_max: Duration,
}

impl RetryPolicy {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: cfg.backoff_base,
            jitter_max: cfg.backoff_jitter,
        }
    }

    /// `base_delay * 2^(attempt-1)`, saturating.
    pub fn deterministic_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        match 1_u32.checked_shl(attempt.max(1) - 1) {
            Some(factor) => self.base_delay.saturating_mul(factor),
            None => Duration::MAX,
        }
    }

    /// Deterministic delay plus a uniform jitter in `[0, jitter_max)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter_ns = self.jitter_max.as_nanos().min(u64::MAX as u128) as u64;
        let jitter = if jitter_ns == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(rand::thread_rng().gen_range(0..jitter_ns))
        };
        self.deterministic_delay(attempt).saturating_add(jitter)
    }

    pub fn attempts_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_retries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDirective {
    Success,
    RetryAfter(Duration),
    Abandon,
}

pub fn classify_attempt_result(outcome: &AttemptOutcome, attempt: u32, policy: &RetryPolicy) -> RetryDirective {
    match outcome {
        AttemptOutcome::Success => RetryDirective::Success,
        AttemptOutcome::RetryableFailure { .. } | AttemptOutcome::FatalFailure { .. } => {
            if policy.attempts_exhausted(attempt) {
                RetryDirective::Abandon
            } else {
                RetryDirective::RetryAfter(policy.backoff(attempt))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            jitter_max: Duration::from_millis(10),
        }
    }

    #[test]
    fn deterministic_part_doubles() {
        let p = policy();
        assert_eq!(p.deterministic_delay(1), Duration::from_millis(100));
        assert_eq!(p.deterministic_delay(2), Duration::from_millis(200));
        assert_eq!(p.deterministic_delay(3), Duration::from_millis(400));
        for n in 1..20 {
            assert!(p.deterministic_delay(n + 1) >= p.deterministic_delay(n));
        }
    }

    #[test]
    fn backoff_stays_inside_jitter_band() {
        let p = policy();
        for n in 1..=6 {
            for _ in 0..200 {
                let d = p.backoff(n);
                assert!(d >= p.deterministic_delay(n));
                assert!(d < p.deterministic_delay(n) + p.jitter_max);
            }
        }
    }

    #[test]
    fn zero_jitter_is_exact() {
        let p = RetryPolicy {
            jitter_max: Duration::ZERO,
            ..policy()
        };
        assert_eq!(p.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn huge_attempts_saturate() {
        let p = policy();
        assert_eq!(p.deterministic_delay(64), Duration::MAX);
        assert_eq!(p.backoff(64), Duration::MAX);
    }

    #[test]
    fn stops_at_max_retries() {
        let p = policy();
        let fail = AttemptOutcome::RetryableFailure { status: 500 };
        assert!(matches!(classify_attempt_result(&fail, 4, &p), RetryDirective::RetryAfter(_)));
        assert_eq!(classify_attempt_result(&fail, 5, &p), RetryDirective::Abandon);
        assert_eq!(
            classify_attempt_result(&AttemptOutcome::Success, 5, &p),
            RetryDirective::Success
        );
    }

    #[test]
    fn fatal_attempts_still_retry() {
        let p = policy();
        let fatal = AttemptOutcome::FatalFailure {
            reason: "HTTP_422".to_string(),
        };
        assert!(matches!(classify_attempt_result(&fatal, 1, &p), RetryDirective::RetryAfter(_)));
    }
}
