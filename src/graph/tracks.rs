use super::attributes::NodeAttributes;
use super::builder::{merge_name, merge_optional};
use super::metadata::{NodeData, TrackNodeData};
use super::statistics::OccurrenceStatistics;
use crate::models::PlaylistRecord;
use std::collections::BTreeMap;

/// Track details merged over every occurrence of a track id.
///
/// The same track can be captured with drifting details in different
/// playlists; popularity is averaged, the earliest release year kept and
/// text fields resolved by `merge_name`/`merge_optional`.
#[derive(Debug, Clone)]
pub struct TrackAccumulator {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub occurrences: u32,
    pub total_popularity: u64,
    pub release_year: i32,
    pub spotify_url: Option<String>,
    pub preview_url: Option<String>,
}

pub fn accumulate_tracks(playlists: &[PlaylistRecord]) -> BTreeMap<String, TrackAccumulator> {
    let mut tracks: BTreeMap<String, TrackAccumulator> = BTreeMap::new();

    for track in playlists.iter().flat_map(|p| p.valid_tracks()) {
        let Some(id) = track.id.as_deref() else {
            continue;
        };
        let release_year = track.release_year();
        let entry = tracks
            .entry(id.to_string())
            .or_insert_with(|| TrackAccumulator {
                id: id.to_string(),
                name: String::new(),
                artist: String::new(),
                album: None,
                occurrences: 0,
                total_popularity: 0,
                release_year,
                spotify_url: None,
                preview_url: None,
            });
        entry.occurrences += 1;
        entry.total_popularity += track.popularity() as u64;
        entry.release_year = entry.release_year.min(release_year);
        merge_name(&mut entry.name, &track.name);
        merge_name(&mut entry.artist, &track.artist_names());
        merge_optional(&mut entry.album, track.album.name.as_deref());
        merge_optional(&mut entry.spotify_url, track.spotify_url());
        merge_optional(&mut entry.preview_url, track.preview_url.as_deref());
    }

    tracks
}

impl TrackAccumulator {
    /// Mean popularity over all occurrences, rounded
    pub fn popularity(&self) -> u32 {
        if self.occurrences == 0 {
            return 0;
        }
        (self.total_popularity as f64 / self.occurrences as f64).round() as u32
    }
}

pub fn derive_track_nodes(
    tracks: BTreeMap<String, TrackAccumulator>,
    statistics: &OccurrenceStatistics,
    current_year: i32,
) -> Vec<NodeData> {
    tracks
        .into_values()
        .map(|track| {
            let popularity = track.popularity();
            NodeData::Track(TrackNodeData {
                size: NodeAttributes::track_size(popularity),
                color: NodeAttributes::recency_color(Some(track.release_year), current_year),
                playlist_count: statistics.appearance_count(&track.id),
                id: track.id,
                name: track.name,
                artist: track.artist,
                album: track.album,
                popularity,
                release_year: track.release_year,
                spotify_url: track.spotify_url,
                preview_url: track.preview_url,
            })
        })
        .collect()
}
