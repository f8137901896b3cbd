use clap::Parser;
use url::Url;

/// Cricket player cluster dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "cricket-cluster-dashboard", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "cricket_clusters.db")]
    pub database_path: String,

    /// Cluster prediction service endpoint
    #[arg(
        long,
        env = "PREDICTOR_URL",
        default_value = "https://fastapi-ipl-app.onrender.com/predict_cluster"
    )]
    pub predictor_url: String,

    /// Prediction request timeout in seconds
    #[arg(long, env = "PREDICTOR_TIMEOUT_SECS", default_value = "10")]
    pub predictor_timeout_secs: u64,

    /// Optional JSON snapshot ({"players": [...], "clusters": [...]}) loaded
    /// once into an empty store at startup
    #[arg(long, env = "SEED_DATA")]
    pub seed_data: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Err(e) = Url::parse(&self.predictor_url) {
            anyhow::bail!("predictor_url '{}' is not a valid URL: {}", self.predictor_url, e);
        }
        if self.predictor_timeout_secs == 0 {
            anyhow::bail!("predictor_timeout_secs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            dashboard_addr: "0.0.0.0:8080".into(),
            database_path: "cricket_clusters.db".into(),
            predictor_url: "https://fastapi-ipl-app.onrender.com/predict_cluster".into(),
            predictor_timeout_secs: 10,
            seed_data: None,
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_malformed_predictor_url() {
        let mut cfg = base();
        cfg.predictor_url = "not a url".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut cfg = base();
        cfg.predictor_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
