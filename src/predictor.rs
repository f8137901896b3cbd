use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::stats::{DerivedStats, RawStats};

/// The merged record forwarded to the external model: raw counters plus the
/// five derived rates, flattened into one JSON object with the wire names
/// the model was trained against.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    #[serde(flatten)]
    pub raw: RawStats,
    #[serde(flatten)]
    pub derived: DerivedStats,
}

/// Verdict returned by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionResult {
    pub cluster: i64,
}

/// Seam for the external classification service. The HTTP implementation is
/// the only one in production; tests substitute their own.
#[async_trait]
pub trait ClusterPredictor: Send + Sync {
    /// Submit one merged record and return the predicted cluster id.
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Client for the hosted cluster-prediction service.
pub struct HttpPredictor {
    http: Client,
    endpoint: String,
}

impl HttpPredictor {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpPredictor {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ClusterPredictor for HttpPredictor {
    fn name(&self) -> &str {
        "HttpPredictor"
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        debug!("Forwarding prediction request to {}", self.endpoint);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .context("Prediction service request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Prediction service error {}: {}", status, body);
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse prediction response")?;

        let cluster = raw["cluster"]
            .as_i64()
            .context("Prediction response missing 'cluster' field")?;

        info!("Prediction service returned cluster {}", cluster);
        Ok(PredictionResult { cluster })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::derive;

    fn request() -> PredictionRequest {
        let raw = RawStats {
            matches: 49,
            innings_bat: 42,
            innings_bowl: 44,
            not_out: 11,
            runs: 724,
            highest: 65,
            balls_faced: 575,
            centuries: 0,
            fifties: 13,
            ducks: 4,
            fours: 217,
            sixes: 149,
            overs_bowled: 144.5,
            maidens: 0,
            runs_conceded: 1077,
            wickets: 36,
            four_wickets: 2,
            five_wickets: 0,
            catches: 15,
        };
        let derived = derive(&raw);
        PredictionRequest { raw, derived }
    }

    #[test]
    fn request_flattens_to_one_object() {
        let value = serde_json::to_value(request()).unwrap();
        let obj = value.as_object().unwrap();
        // 19 raw counters + 5 derived rates in a single flat document
        assert_eq!(obj.len(), 24);
        assert_eq!(obj["inningsBat"], 42);
        assert_eq!(obj["oversBowled"], 144.5);
        assert_eq!(obj["averageBatting"], 23.35);
        assert_eq!(obj["strikeRateBowling"], 24.1);
    }
}
