//! Static cluster catalog: maps the model's integer cluster ids to display
//! names, short tags, and badge colors.
//!
//! The set of ids must stay consistent with whatever the external model can
//! emit. That is a deployment invariant, not something enforced here — any id
//! outside the table maps to the fallback entry instead of failing, so the
//! UI stays renderable even if the model and catalog drift apart.

use serde::Serialize;

/// One catalog row: cluster id plus its presentation attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub cluster: i64,
    pub name: &'static str,
    pub tag: &'static str,
    /// Badge color as a hex token consumed by the dashboard CSS
    pub color: &'static str,
}

const CLUSTERS: [CatalogEntry; 6] = [
    CatalogEntry {
        cluster: 0,
        name: "All-Rounders",
        tag: "ALR",
        color: "#ef4444",
    },
    CatalogEntry {
        cluster: 1,
        name: "Fielding Batsmen",
        tag: "FIELD-BAT",
        color: "#3b82f6",
    },
    CatalogEntry {
        cluster: 2,
        name: "Batting All-Rounders",
        tag: "BAT-ALR",
        color: "#22c55e",
    },
    CatalogEntry {
        cluster: 3,
        name: "Bowlers",
        tag: "BOWL",
        color: "#eab308",
    },
    CatalogEntry {
        cluster: 4,
        name: "Middle Order Batsmen",
        tag: "MID-BAT",
        color: "#6366f1",
    },
    CatalogEntry {
        cluster: 5,
        name: "Top Order Batsmen",
        tag: "TOP-BAT",
        color: "#a855f7",
    },
];

const UNKNOWN: CatalogEntry = CatalogEntry {
    cluster: -1,
    name: "Unknown",
    tag: "UNK",
    color: "#6b7280",
};

/// Resolve a cluster id to its catalog entry. Total over integers: ids
/// outside the known set resolve to the "Unknown" fallback.
pub fn lookup(cluster: i64) -> &'static CatalogEntry {
    CLUSTERS
        .iter()
        .find(|e| e.cluster == cluster)
        .unwrap_or(&UNKNOWN)
}

/// The known entries in id order (drives the filter dropdown and `/api/catalog`).
pub fn entries() -> &'static [CatalogEntry] {
    &CLUSTERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve() {
        assert_eq!(lookup(0).name, "All-Rounders");
        assert_eq!(lookup(3).tag, "BOWL");
        assert_eq!(lookup(5).name, "Top Order Batsmen");
        assert_eq!(lookup(5).color, "#a855f7");
    }

    #[test]
    fn one_entry_per_known_id() {
        for (i, entry) in entries().iter().enumerate() {
            assert_eq!(entry.cluster, i as i64);
        }
        assert_eq!(entries().len(), 6);
    }

    #[test]
    fn unknown_ids_fall_back() {
        for id in [-1, 6, 42, i64::MAX, i64::MIN] {
            let e = lookup(id);
            assert_eq!(e.name, "Unknown");
            assert_eq!(e.tag, "UNK");
            assert_eq!(e.color, "#6b7280");
        }
    }
}
