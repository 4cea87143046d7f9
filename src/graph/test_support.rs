// Fixture builders shared by the graph tests

use crate::models::{Album, Artist, ExternalUrls, PlaylistItem, PlaylistRecord, PlaylistTracks, Track};

pub fn track(id: &str, artist_ids: &[&str]) -> Track {
    Track {
        id: Some(id.to_string()),
        name: format!("Track {id}"),
        artists: artist_ids
            .iter()
            .map(|artist_id| Artist {
                id: Some(artist_id.to_string()),
                name: format!("Artist {artist_id}"),
                external_urls: Some(ExternalUrls {
                    spotify: Some(format!("https://open.spotify.com/artist/{artist_id}")),
                }),
            })
            .collect(),
        album: Album::default(),
        popularity: None,
        external_urls: None,
        preview_url: None,
        duration_ms: None,
    }
}

pub fn track_with(id: &str, artist_ids: &[&str], popularity: u32, release_date: &str) -> Track {
    let mut track = track(id, artist_ids);
    track.popularity = Some(popularity as f64);
    track.album = Album {
        id: Some(format!("album-{id}")),
        name: Some(format!("Album {id}")),
        release_date: Some(release_date.to_string()),
    };
    track
}

pub fn playlist(id: &str, tracks: Vec<Track>) -> PlaylistRecord {
    PlaylistRecord {
        id: id.to_string(),
        name: format!("Playlist {id}"),
        category: None,
        tracks: Some(PlaylistTracks {
            items: Some(
                tracks
                    .into_iter()
                    .map(|track| PlaylistItem { track: Some(track) })
                    .collect(),
            ),
        }),
    }
}
