use super::Granularity;
use crate::models::PlaylistRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct entity ids (artists or tracks) present in one playlist
pub fn playlist_entities(playlist: &PlaylistRecord, granularity: Granularity) -> BTreeSet<&str> {
    let mut entities = BTreeSet::new();
    for track in playlist.valid_tracks() {
        match granularity {
            Granularity::Artist => {
                entities.extend(track.identified_artists().map(|(id, _)| id));
            }
            Granularity::Track => {
                if let Some(id) = track.id.as_deref() {
                    entities.insert(id);
                }
            }
        }
    }
    entities
}

/// Per-entity playlist appearance tallies, fixed before any probability is computed
#[derive(Debug, Clone, Default)]
pub struct OccurrenceStatistics {
    /// Every input record counts, including ones without a track list
    pub total_playlists: usize,
    pub appearances: BTreeMap<String, u32>,
}

impl OccurrenceStatistics {
    /// First pass: count, per entity, the number of playlists it appears in
    pub fn collect(playlists: &[PlaylistRecord], granularity: Granularity) -> Self {
        let mut appearances: BTreeMap<String, u32> = BTreeMap::new();

        for playlist in playlists {
            for entity in playlist_entities(playlist, granularity) {
                *appearances.entry(entity.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            total_playlists: playlists.len(),
            appearances,
        }
    }

    pub fn appearance_count(&self, id: &str) -> u32 {
        self.appearances.get(id).copied().unwrap_or(0)
    }

    /// Fraction of all playlists containing the entity; None with no playlists
    pub fn marginal_probability(&self, id: &str) -> Option<f64> {
        if self.total_playlists == 0 {
            return None;
        }
        Some(self.appearance_count(id) as f64 / self.total_playlists as f64)
    }
}
