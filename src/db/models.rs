use serde::{Deserialize, Serialize};

/// One career row per player, pre-joined with the model's cluster assignment.
///
/// Counters are recorded values; the five rate fields are recomputed by the
/// upstream ETL from the counters and are never edited here. All rates and
/// the cluster id are nullable in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player: String,
    pub matches: i64,
    pub innings_batted: i64,
    pub not_outs: i64,
    pub runs: i64,
    pub highest_score: i64,
    pub balls_faced: i64,
    pub centuries: i64,
    pub fifties: i64,
    pub ducks: i64,
    pub fours: i64,
    pub sixes: i64,
    pub innings_bowled: i64,
    /// Overs as a decimal, e.g. 144.5
    pub overs_bowled: f64,
    pub maidens: i64,
    pub runs_conceded: i64,
    pub wickets: i64,
    pub four_wicket_hauls: i64,
    pub five_wicket_hauls: i64,
    pub catches: i64,
    pub average_batting: Option<f64>,
    pub strike_rate_batting: Option<f64>,
    pub average_bowling: Option<f64>,
    pub economy: Option<f64>,
    pub strike_rate_bowling: Option<f64>,
    /// Cluster id assigned by the external model; absent if unclustered
    pub cluster: Option<i64>,
}

/// Per-cluster aggregate row: mean rates plus per-inning/per-match densities
/// across all players assigned to the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub cluster: i64,
    pub average_batting: Option<f64>,
    pub strike_rate_batting: Option<f64>,
    pub average_bowling: Option<f64>,
    pub economy: Option<f64>,
    pub strike_rate_bowling: Option<f64>,
    pub fours_per_inning: Option<f64>,
    pub sixes_per_inning: Option<f64>,
    pub catches_per_match: Option<f64>,
    pub centuries_per_inning: Option<f64>,
    pub fifties_per_inning: Option<f64>,
    pub wickets_per_inning: Option<f64>,
    pub maidens_per_inning: Option<f64>,
}
