use crate::domain::payment::Provider;
use crate::health::oracle::HealthOracle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub provider: Provider,
    pub base_url: String,
}

/// Picks the processor for one attempt from the oracle's current verdict.
#[derive(Clone)]
pub struct FailoverRouter {
    default_url: String,
    fallback_url: String,
    oracle: HealthOracle,
}

impl FailoverRouter {
    pub fn new(default_url: impl Into<String>, fallback_url: impl Into<String>, oracle: HealthOracle) -> Self {
        Self {
            default_url: default_url.into(),
            fallback_url: fallback_url.into(),
            oracle,
        }
    }

    pub fn oracle(&self) -> &HealthOracle {
        &self.oracle
    }

    pub async fn select(&self) -> Target {
        if self.oracle.default_up().await {
            Target {
                provider: Provider::Default,
                base_url: self.default_url.clone(),
            }
        } else {
            Target {
                provider: Provider::Fallback,
                base_url: self.fallback_url.clone(),
            }
        }
    }
}
