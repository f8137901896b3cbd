use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub mod models;
use models::*;

/// Thread-safe SQLite handle (single connection with mutex).
///
/// Player and cluster rows are produced by an external ETL; at runtime this
/// application only reads them. The insert methods exist for the one-shot
/// seed path at startup.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Players ──────────────────────────────────────────────────────────────

    /// Fetch the full player collection. Fails as a unit: either every row
    /// maps cleanly or the whole fetch errors.
    pub fn fetch_players(&self) -> Result<Vec<PlayerStats>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT player, matches, innings_batted, not_outs, runs, highest_score,
                    balls_faced, centuries, fifties, ducks, fours, sixes,
                    innings_bowled, overs_bowled, maidens, runs_conceded, wickets,
                    four_wicket_hauls, five_wicket_hauls, catches,
                    average_batting, strike_rate_batting, average_bowling,
                    economy, strike_rate_bowling, cluster
             FROM player_stats ORDER BY player ASC",
        )?;
        let players = stmt
            .query_map([], map_player)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    pub fn count_players(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM player_stats", [], |r| r.get(0))?;
        Ok(n)
    }

    /// Insert one player row (seed path only)
    pub fn insert_player(&self, p: &PlayerStats) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO player_stats (
                player, matches, innings_batted, not_outs, runs, highest_score,
                balls_faced, centuries, fifties, ducks, fours, sixes,
                innings_bowled, overs_bowled, maidens, runs_conceded, wickets,
                four_wicket_hauls, five_wicket_hauls, catches,
                average_batting, strike_rate_batting, average_bowling,
                economy, strike_rate_bowling, cluster
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,
                       ?17,?18,?19,?20,?21,?22,?23,?24,?25,?26)",
            params![
                p.player,
                p.matches,
                p.innings_batted,
                p.not_outs,
                p.runs,
                p.highest_score,
                p.balls_faced,
                p.centuries,
                p.fifties,
                p.ducks,
                p.fours,
                p.sixes,
                p.innings_bowled,
                p.overs_bowled,
                p.maidens,
                p.runs_conceded,
                p.wickets,
                p.four_wicket_hauls,
                p.five_wicket_hauls,
                p.catches,
                p.average_batting,
                p.strike_rate_batting,
                p.average_bowling,
                p.economy,
                p.strike_rate_bowling,
                p.cluster,
            ],
        )?;
        Ok(())
    }

    // ── Clusters ─────────────────────────────────────────────────────────────

    /// Fetch the full cluster-aggregate collection
    pub fn fetch_clusters(&self) -> Result<Vec<ClusterInfo>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT cluster, average_batting, strike_rate_batting, average_bowling,
                    economy, strike_rate_bowling, fours_per_inning, sixes_per_inning,
                    catches_per_match, centuries_per_inning, fifties_per_inning,
                    wickets_per_inning, maidens_per_inning
             FROM cluster_info ORDER BY cluster ASC",
        )?;
        let clusters = stmt
            .query_map([], map_cluster)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clusters)
    }

    pub fn count_clusters(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM cluster_info", [], |r| r.get(0))?;
        Ok(n)
    }

    /// Insert one cluster-aggregate row (seed path only)
    pub fn insert_cluster(&self, c: &ClusterInfo) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cluster_info (
                cluster, average_batting, strike_rate_batting, average_bowling,
                economy, strike_rate_bowling, fours_per_inning, sixes_per_inning,
                catches_per_match, centuries_per_inning, fifties_per_inning,
                wickets_per_inning, maidens_per_inning
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                c.cluster,
                c.average_batting,
                c.strike_rate_batting,
                c.average_bowling,
                c.economy,
                c.strike_rate_bowling,
                c.fours_per_inning,
                c.sixes_per_inning,
                c.catches_per_match,
                c.centuries_per_inning,
                c.fifties_per_inning,
                c.wickets_per_inning,
                c.maidens_per_inning,
            ],
        )?;
        Ok(())
    }

    // ── Seed bookkeeping ─────────────────────────────────────────────────────

    /// Record when the store was seeded from a snapshot file
    pub fn record_seeded_at(&self, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO meta (key, value) VALUES ('seeded_at', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![at],
        )?;
        Ok(())
    }

    pub fn seeded_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();
        let at = conn
            .query_row(
                "SELECT value FROM meta WHERE key='seeded_at'",
                [],
                |r| r.get(0),
            )
            .map(Some)
            .unwrap_or(None);
        Ok(at)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_player(row: &rusqlite::Row) -> rusqlite::Result<PlayerStats> {
    Ok(PlayerStats {
        player: row.get(0)?,
        matches: row.get(1)?,
        innings_batted: row.get(2)?,
        not_outs: row.get(3)?,
        runs: row.get(4)?,
        highest_score: row.get(5)?,
        balls_faced: row.get(6)?,
        centuries: row.get(7)?,
        fifties: row.get(8)?,
        ducks: row.get(9)?,
        fours: row.get(10)?,
        sixes: row.get(11)?,
        innings_bowled: row.get(12)?,
        overs_bowled: row.get(13)?,
        maidens: row.get(14)?,
        runs_conceded: row.get(15)?,
        wickets: row.get(16)?,
        four_wicket_hauls: row.get(17)?,
        five_wicket_hauls: row.get(18)?,
        catches: row.get(19)?,
        average_batting: row.get(20)?,
        strike_rate_batting: row.get(21)?,
        average_bowling: row.get(22)?,
        economy: row.get(23)?,
        strike_rate_bowling: row.get(24)?,
        cluster: row.get(25)?,
    })
}

fn map_cluster(row: &rusqlite::Row) -> rusqlite::Result<ClusterInfo> {
    Ok(ClusterInfo {
        cluster: row.get(0)?,
        average_batting: row.get(1)?,
        strike_rate_batting: row.get(2)?,
        average_bowling: row.get(3)?,
        economy: row.get(4)?,
        strike_rate_bowling: row.get(5)?,
        fours_per_inning: row.get(6)?,
        sixes_per_inning: row.get(7)?,
        catches_per_match: row.get(8)?,
        centuries_per_inning: row.get(9)?,
        fifties_per_inning: row.get(10)?,
        wickets_per_inning: row.get(11)?,
        maidens_per_inning: row.get(12)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS player_stats (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    player              TEXT    NOT NULL,
    matches             INTEGER NOT NULL DEFAULT 0,
    innings_batted      INTEGER NOT NULL DEFAULT 0,
    not_outs            INTEGER NOT NULL DEFAULT 0,
    runs                INTEGER NOT NULL DEFAULT 0,
    highest_score       INTEGER NOT NULL DEFAULT 0,
    balls_faced         INTEGER NOT NULL DEFAULT 0,
    centuries           INTEGER NOT NULL DEFAULT 0,
    fifties             INTEGER NOT NULL DEFAULT 0,
    ducks               INTEGER NOT NULL DEFAULT 0,
    fours               INTEGER NOT NULL DEFAULT 0,
    sixes               INTEGER NOT NULL DEFAULT 0,
    innings_bowled      INTEGER NOT NULL DEFAULT 0,
    overs_bowled        REAL    NOT NULL DEFAULT 0,
    maidens             INTEGER NOT NULL DEFAULT 0,
    runs_conceded       INTEGER NOT NULL DEFAULT 0,
    wickets             INTEGER NOT NULL DEFAULT 0,
    four_wicket_hauls   INTEGER NOT NULL DEFAULT 0,
    five_wicket_hauls   INTEGER NOT NULL DEFAULT 0,
    catches             INTEGER NOT NULL DEFAULT 0,
    average_batting     REAL,
    strike_rate_batting REAL,
    average_bowling     REAL,
    economy             REAL,
    strike_rate_bowling REAL,
    cluster             INTEGER
);

CREATE TABLE IF NOT EXISTS cluster_info (
    cluster              INTEGER PRIMARY KEY,
    average_batting      REAL,
    strike_rate_batting  REAL,
    average_bowling      REAL,
    economy              REAL,
    strike_rate_bowling  REAL,
    fours_per_inning     REAL,
    sixes_per_inning     REAL,
    catches_per_match    REAL,
    centuries_per_inning REAL,
    fifties_per_inning   REAL,
    wickets_per_inning   REAL,
    maidens_per_inning   REAL
);

CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_player_stats_player ON player_stats(player);
CREATE INDEX IF NOT EXISTS idx_player_stats_cluster ON player_stats(cluster);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn test_player(name: &str, cluster: Option<i64>) -> PlayerStats {
        PlayerStats {
            player: name.into(),
            matches: 49,
            innings_batted: 42,
            not_outs: 11,
            runs: 724,
            highest_score: 65,
            balls_faced: 575,
            centuries: 0,
            fifties: 13,
            ducks: 4,
            fours: 217,
            sixes: 149,
            innings_bowled: 44,
            overs_bowled: 144.5,
            maidens: 0,
            runs_conceded: 1077,
            wickets: 36,
            four_wicket_hauls: 2,
            five_wicket_hauls: 0,
            catches: 15,
            average_batting: Some(23.35),
            strike_rate_batting: Some(125.91),
            average_bowling: Some(29.92),
            economy: Some(7.45),
            strike_rate_bowling: Some(24.1),
            cluster,
        }
    }

    #[test]
    fn player_round_trip() {
        let db = Database::open(":memory:").unwrap();
        assert_eq!(db.count_players().unwrap(), 0);

        let a = test_player("Ashwin", Some(3));
        let b = test_player("Bumrah", None);
        db.insert_player(&a).unwrap();
        db.insert_player(&b).unwrap();

        let players = db.fetch_players().unwrap();
        assert_eq!(players, vec![a, b]);
        assert_eq!(db.count_players().unwrap(), 2);
    }

    #[test]
    fn cluster_round_trip() {
        let db = Database::open(":memory:").unwrap();
        let c = ClusterInfo {
            cluster: 2,
            average_batting: Some(31.4),
            strike_rate_batting: Some(128.7),
            average_bowling: None,
            economy: Some(8.1),
            strike_rate_bowling: None,
            fours_per_inning: Some(2.8),
            sixes_per_inning: Some(1.1),
            catches_per_match: Some(0.6),
            centuries_per_inning: Some(0.004),
            fifties_per_inning: Some(0.18),
            wickets_per_inning: Some(0.2),
            maidens_per_inning: Some(0.01),
        };
        db.insert_cluster(&c).unwrap();
        assert_eq!(db.fetch_clusters().unwrap(), vec![c]);
        assert_eq!(db.count_clusters().unwrap(), 1);
    }

    #[test]
    fn seeded_at_round_trip() {
        let db = Database::open(":memory:").unwrap();
        assert!(db.seeded_at().unwrap().is_none());
        let now = Utc::now();
        db.record_seeded_at(now).unwrap();
        assert_eq!(db.seeded_at().unwrap(), Some(now));
    }
}
