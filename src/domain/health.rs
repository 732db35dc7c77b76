use serde::{Deserialize, Serialize};

/// Response of a processor's `GET /payments/service-health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub failing: bool,
    #[serde(default)]
    pub min_response_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthRole {
    Leader,
    Follower,
}

impl HealthRole {
    pub fn parse(v: &str) -> Self {
        match v.trim().to_lowercase().as_str() {
            "leader" | "master" | "true" => HealthRole::Leader,
            _ => HealthRole::Follower,
        }
    }
}
