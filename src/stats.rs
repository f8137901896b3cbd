//! Derived-statistics calculator.
//!
//! Transforms raw counting statistics into the five rate statistics the
//! external cluster model consumes. Pure and total: every denominator-zero
//! case yields `0.0` rather than an error, NaN, or infinity, so the values
//! are always renderable and always serializable.
//!
//! Rounding is part of the contract — the external model was validated
//! against 2-decimal rates (1 decimal for bowling strike rate), and the
//! forwarded payload must match that precision.

use serde::{Deserialize, Serialize};

/// Raw counting statistics as entered in the prediction form.
///
/// Wire names are camelCase to match the payload the external model was
/// trained against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStats {
    pub matches: i64,
    pub innings_bat: i64,
    pub innings_bowl: i64,
    pub not_out: i64,
    pub runs: i64,
    pub highest: i64,
    pub balls_faced: i64,
    pub centuries: i64,
    pub fifties: i64,
    pub ducks: i64,
    pub fours: i64,
    pub sixes: i64,
    /// Overs as a decimal, e.g. 144.5
    pub overs_bowled: f64,
    pub maidens: i64,
    pub runs_conceded: i64,
    pub wickets: i64,
    pub four_wickets: i64,
    pub five_wickets: i64,
    pub catches: i64,
}

/// The five rate statistics derived from [`RawStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub average_batting: f64,
    pub strike_rate_batting: f64,
    pub average_bowling: f64,
    pub economy: f64,
    pub strike_rate_bowling: f64,
}

/// Compute the derived rates for a set of raw counters.
pub fn derive(raw: &RawStats) -> DerivedStats {
    let dismissals = raw.innings_bat - raw.not_out;

    let average_batting = if dismissals > 0 {
        round2(raw.runs as f64 / dismissals as f64)
    } else {
        0.0
    };

    let strike_rate_batting = if raw.balls_faced > 0 {
        round2(raw.runs as f64 / raw.balls_faced as f64 * 100.0)
    } else {
        0.0
    };

    let average_bowling = if raw.wickets > 0 {
        round2(raw.runs_conceded as f64 / raw.wickets as f64)
    } else {
        0.0
    };

    let economy = if raw.overs_bowled > 0.0 {
        round2(raw.runs_conceded as f64 / raw.overs_bowled)
    } else {
        0.0
    };

    let strike_rate_bowling = if raw.wickets > 0 {
        round1(raw.overs_bowled * 6.0 / raw.wickets as f64)
    } else {
        0.0
    };

    DerivedStats {
        average_batting,
        strike_rate_batting,
        average_bowling,
        economy,
        strike_rate_bowling,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ── Form field descriptors ───────────────────────────────────────────────────

/// Numeric subtype of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Decimal,
}

/// One prediction-form input: wire name, display label, numeric subtype, and
/// the default value pre-filled in the form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: f64,
}

/// The prediction form's inputs, in display order. The form is generated
/// from this list; it is the single declaration of which raw counters exist
/// and how they are labelled. Defaults are a worked example player.
pub const FORM_FIELDS: [FieldSpec; 19] = [
    field("matches", "Matches", FieldKind::Integer, 49.0),
    field("inningsBat", "Innings Batted", FieldKind::Integer, 42.0),
    field("inningsBowl", "Innings Bowled", FieldKind::Integer, 44.0),
    field("notOut", "Not Out", FieldKind::Integer, 11.0),
    field("runs", "Runs", FieldKind::Integer, 724.0),
    field("highest", "Highest Score", FieldKind::Integer, 65.0),
    field("ballsFaced", "Balls Faced", FieldKind::Integer, 575.0),
    field("centuries", "Centuries", FieldKind::Integer, 0.0),
    field("fifties", "Fifties", FieldKind::Integer, 13.0),
    field("ducks", "Ducks", FieldKind::Integer, 4.0),
    field("fours", "Fours", FieldKind::Integer, 217.0),
    field("sixes", "Sixes", FieldKind::Integer, 149.0),
    field("oversBowled", "Overs Bowled", FieldKind::Decimal, 144.5),
    field("maidens", "Maidens", FieldKind::Integer, 0.0),
    field("runsConceded", "Runs Conceded", FieldKind::Integer, 1077.0),
    field("wickets", "Wickets", FieldKind::Integer, 36.0),
    field("fourWickets", "Four Wickets", FieldKind::Integer, 2.0),
    field("fiveWickets", "Five Wickets", FieldKind::Integer, 0.0),
    field("catches", "Catches", FieldKind::Integer, 15.0),
];

const fn field(name: &'static str, label: &'static str, kind: FieldKind, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        default,
    }
}
