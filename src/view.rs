//! Server-side table view engine for the player table.
//!
//! Given the fetched player snapshot and the page's query state (search term,
//! cluster filter, sort key + direction), produces the ordered rows to
//! render. Pure: the input slice is never mutated and each call returns a
//! fresh view. The dashboard page re-fetches `/api/players` with the query
//! parameters whenever the user types, picks a cluster, or clicks a header.
//!
//! Null handling: rows missing a value for the active sort key are pushed
//! toward the "high" end of the current direction — last when ascending,
//! first when descending — so they sit at opposite ends of the two orders.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::db::models::PlayerStats;

/// Sortable columns of the player table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Player,
    Matches,
    Runs,
    Wickets,
    AverageBatting,
    AverageBowling,
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn flipped(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Query state of the player table. Omitted URL parameters fall back to the
/// defaults: empty search, no cluster filter, player name ascending.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub search: String,
    pub cluster: Option<i64>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl Default for TableQuery {
    fn default() -> Self {
        TableQuery {
            search: String::new(),
            cluster: None,
            sort_key: SortKey::Player,
            sort_order: SortOrder::Asc,
        }
    }
}

impl TableQuery {
    /// Header-click transition: re-selecting the active key flips the
    /// direction, selecting a new key resets to ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_key = key;
            self.sort_order = SortOrder::Asc;
        }
    }
}

/// Apply the query to a player snapshot: name filter, cluster filter, then a
/// stable sort. Returns a new ordered view; `rows` is untouched.
pub fn view(rows: &[PlayerStats], query: &TableQuery) -> Vec<PlayerStats> {
    let needle = query.search.to_lowercase();

    let mut out: Vec<PlayerStats> = rows
        .iter()
        .filter(|p| needle.is_empty() || p.player.to_lowercase().contains(&needle))
        .filter(|p| match query.cluster {
            Some(wanted) => p.cluster == Some(wanted),
            None => true,
        })
        .cloned()
        .collect();

    out.sort_by(|a, b| compare(a, b, query.sort_key, query.sort_order));
    out
}

/// Value of a sort key for one row; `None` when the column is null.
enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

fn key_value(p: &PlayerStats, key: SortKey) -> Option<SortValue<'_>> {
    match key {
        SortKey::Player => Some(SortValue::Text(&p.player)),
        SortKey::Matches => Some(SortValue::Number(p.matches as f64)),
        SortKey::Runs => Some(SortValue::Number(p.runs as f64)),
        SortKey::Wickets => Some(SortValue::Number(p.wickets as f64)),
        SortKey::AverageBatting => p.average_batting.map(SortValue::Number),
        SortKey::AverageBowling => p.average_bowling.map(SortValue::Number),
        SortKey::Cluster => p.cluster.map(|c| SortValue::Number(c as f64)),
    }
}

fn compare(a: &PlayerStats, b: &PlayerStats, key: SortKey, order: SortOrder) -> Ordering {
    let asc = order == SortOrder::Asc;
    match (key_value(a, key), key_value(b, key)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => {
            if asc {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Some(_), None) => {
            if asc {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (Some(x), Some(y)) => {
            let ord = match (x, y) {
                (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
                (SortValue::Number(x), SortValue::Number(y)) => {
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
                // keys are homogeneous per column, mixed pairs cannot occur
                _ => Ordering::Equal,
            };
            if asc {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, runs: i64) -> PlayerStats {
        PlayerStats {
            player: name.into(),
            matches: 0,
            innings_batted: 0,
            not_outs: 0,
            runs,
            highest_score: 0,
            balls_faced: 0,
            centuries: 0,
            fifties: 0,
            ducks: 0,
            fours: 0,
            sixes: 0,
            innings_bowled: 0,
            overs_bowled: 0.0,
            maidens: 0,
            runs_conceded: 0,
            wickets: 0,
            four_wicket_hauls: 0,
            five_wicket_hauls: 0,
            catches: 0,
            average_batting: None,
            strike_rate_batting: None,
            average_bowling: None,
            economy: None,
            strike_rate_bowling: None,
            cluster: None,
        }
    }

    fn names(rows: &[PlayerStats]) -> Vec<&str> {
        rows.iter().map(|p| p.player.as_str()).collect()
    }

    fn sample() -> Vec<PlayerStats> {
        let mut kohli = row("Kohli", 6283);
        kohli.cluster = Some(5);
        kohli.average_batting = Some(37.25);
        let mut bumrah = row("Bumrah", 56);
        bumrah.cluster = Some(3);
        bumrah.average_batting = None;
        let mut jadeja = row("Jadeja", 2386);
        jadeja.cluster = Some(0);
        jadeja.average_batting = Some(26.51);
        vec![kohli, bumrah, jadeja]
    }

    #[test]
    fn empty_query_keeps_every_row() {
        let rows = sample();
        let out = view(&rows, &TableQuery::default());
        assert_eq!(out.len(), rows.len());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = sample();
        let q = TableQuery {
            search: "koh".into(),
            ..TableQuery::default()
        };
        assert_eq!(names(&view(&rows, &q)), ["Kohli"]);

        let q = TableQuery {
            search: "J".into(),
            ..TableQuery::default()
        };
        assert_eq!(names(&view(&rows, &q)), ["Bumrah", "Jadeja"]);
    }

    #[test]
    fn unmatched_search_yields_empty_not_error() {
        let rows = sample();
        let q = TableQuery {
            search: "tendulkar".into(),
            ..TableQuery::default()
        };
        assert!(view(&rows, &q).is_empty());
    }

    #[test]
    fn cluster_filter_keeps_only_matching_rows() {
        let rows = sample();
        let q = TableQuery {
            cluster: Some(3),
            ..TableQuery::default()
        };
        assert_eq!(names(&view(&rows, &q)), ["Bumrah"]);

        // rows with no cluster never match a set filter
        let mut rows = rows;
        rows.push(row("Unclustered", 0));
        let out = view(&rows, &q);
        assert_eq!(names(&out), ["Bumrah"]);
    }

    #[test]
    fn default_sort_is_player_name_ascending() {
        let rows = sample();
        let out = view(&rows, &TableQuery::default());
        assert_eq!(names(&out), ["Bumrah", "Jadeja", "Kohli"]);
    }

    #[test]
    fn numeric_sort_both_directions() {
        let rows = sample();
        let mut q = TableQuery {
            sort_key: SortKey::Runs,
            ..TableQuery::default()
        };
        assert_eq!(names(&view(&rows, &q)), ["Bumrah", "Jadeja", "Kohli"]);
        q.sort_order = SortOrder::Desc;
        assert_eq!(names(&view(&rows, &q)), ["Kohli", "Jadeja", "Bumrah"]);
    }

    #[test]
    fn toggle_same_key_reverses_new_key_resets() {
        let mut q = TableQuery::default();
        q.toggle_sort(SortKey::Runs);
        assert_eq!((q.sort_key, q.sort_order), (SortKey::Runs, SortOrder::Asc));
        q.toggle_sort(SortKey::Runs);
        assert_eq!((q.sort_key, q.sort_order), (SortKey::Runs, SortOrder::Desc));
        q.toggle_sort(SortKey::Player);
        assert_eq!((q.sort_key, q.sort_order), (SortKey::Player, SortOrder::Asc));
    }

    #[test]
    fn toggling_direction_reverses_the_view() {
        let rows = sample();
        let mut q = TableQuery {
            sort_key: SortKey::AverageBatting,
            ..TableQuery::default()
        };
        let first = view(&rows, &q);
        q.toggle_sort(SortKey::AverageBatting);
        let second = view(&rows, &q);
        let mut reversed = first.clone();
        reversed.reverse();
        assert_eq!(names(&second), names(&reversed));
    }

    #[test]
    fn nulls_sort_last_ascending_first_descending() {
        let mut a = row("A", 0);
        a.average_batting = Some(10.0);
        let mut b = row("B", 0);
        b.average_batting = None;
        let mut c = row("C", 0);
        c.average_batting = Some(5.0);
        let rows = vec![a, b, c];

        let mut q = TableQuery {
            sort_key: SortKey::AverageBatting,
            ..TableQuery::default()
        };
        assert_eq!(names(&view(&rows, &q)), ["C", "A", "B"]);
        q.sort_order = SortOrder::Desc;
        assert_eq!(names(&view(&rows, &q)), ["B", "A", "C"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let rows = vec![row("Zidane", 100), row("Mbappe", 100), row("Ameen", 100)];
        let q = TableQuery {
            sort_key: SortKey::Runs,
            ..TableQuery::default()
        };
        assert_eq!(names(&view(&rows, &q)), ["Zidane", "Mbappe", "Ameen"]);
    }

    #[test]
    fn input_rows_are_not_mutated() {
        let rows = sample();
        let before = rows.clone();
        let q = TableQuery {
            sort_key: SortKey::Runs,
            sort_order: SortOrder::Desc,
            ..TableQuery::default()
        };
        let _ = view(&rows, &q);
        assert_eq!(rows, before);
    }
}
