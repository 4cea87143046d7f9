use super::Granularity;
use super::statistics::{OccurrenceStatistics, playlist_entities};
use crate::models::PlaylistRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Order-independent key for an unordered pair of entity ids
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
}

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// Playlist that contributed to a co-occurrence
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<&PlaylistRecord> for PlaylistRef {
    fn from(playlist: &PlaylistRecord) -> Self {
        Self {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            category: playlist.category.clone(),
        }
    }
}

/// Raw joint statistics for one pair, before scoring
#[derive(Debug, Clone)]
pub struct CoOccurrence {
    pub joint_count: u32,
    /// Marginal probabilities, cached when the pair is first seen
    pub p1: f64,
    pub p2: f64,
    pub playlists: Vec<PlaylistRef>,
}

/// Second pass: accumulate joint counts for every unordered pair within each playlist.
///
/// Work per playlist is quadratic in its number of distinct entities.
pub fn aggregate(
    playlists: &[PlaylistRecord],
    granularity: Granularity,
    stats: &OccurrenceStatistics,
) -> BTreeMap<EdgeKey, CoOccurrence> {
    let mut edges: BTreeMap<EdgeKey, CoOccurrence> = BTreeMap::new();

    for playlist in playlists {
        let entities: Vec<&str> = playlist_entities(playlist, granularity)
            .into_iter()
            .collect();
        if entities.len() < 2 {
            continue;
        }

        let provenance = PlaylistRef::from(playlist);
        for (i, first) in entities.iter().enumerate() {
            for second in &entities[i + 1..] {
                let key = EdgeKey::new(first, second);
                let edge = edges.entry(key).or_insert_with_key(|key| CoOccurrence {
                    joint_count: 0,
                    p1: stats.marginal_probability(&key.source).unwrap_or(0.0),
                    p2: stats.marginal_probability(&key.target).unwrap_or(0.0),
                    playlists: Vec::new(),
                });
                edge.joint_count += 1;
                edge.playlists.push(provenance.clone());
            }
        }
    }

    edges
}
