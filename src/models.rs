use serde::{Deserialize, Deserializer, Serialize};

/// Release year used when an album carries no usable release date
pub const DEFAULT_RELEASE_YEAR: i32 = 2000;

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A playlist record as captured from the catalog API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracks>,
}

/// Paging wrapper around the playlist's track items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracks {
    #[serde(default)]
    pub items: Option<Vec<PlaylistItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<Track>,
}

/// Track entry with the fields the graph cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<Artist>,
    /// Local files come with a null album
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: Album,
    /// Usually an integer 0-100, but some exports carry fractional values
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    /// Null for artists of local files
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

impl PlaylistRecord {
    /// Whether the record carries a track list at all
    pub fn has_track_list(&self) -> bool {
        self.tracks.as_ref().is_some_and(|t| t.items.is_some())
    }

    /// Tracks that are present and identified; malformed records yield nothing
    pub fn valid_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .iter()
            .filter_map(|t| t.items.as_ref())
            .flatten()
            .filter_map(|item| item.track.as_ref())
            .filter(|track| track.id.as_deref().is_some_and(|id| !id.is_empty()))
    }
}

impl Track {
    /// Popularity score rounded into 0-100, 0 when absent
    pub fn popularity(&self) -> u32 {
        self.popularity
            .filter(|p| p.is_finite())
            .map(|p| p.round().clamp(0.0, 100.0) as u32)
            .unwrap_or(0)
    }

    /// Artists that carry an id; unidentified ones never become nodes
    pub fn identified_artists(&self) -> impl Iterator<Item = (&str, &Artist)> {
        self.artists
            .iter()
            .filter_map(|artist| artist.id().map(|id| (id, artist)))
    }

    /// Year the album was released, falling back to `DEFAULT_RELEASE_YEAR`
    pub fn release_year(&self) -> i32 {
        parse_release_year(self.album.release_date.as_deref())
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls.as_ref().and_then(|u| u.spotify.as_deref())
    }

    /// Artist names joined for display
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Artist {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls.as_ref().and_then(|u| u.spotify.as_deref())
    }
}

/// Release dates come as "YYYY", "YYYY-MM" or "YYYY-MM-DD"; only the year is kept
pub fn parse_release_year(release_date: Option<&str>) -> i32 {
    release_date
        .and_then(|date| date.split('-').next())
        .and_then(|year| year.trim().parse::<i32>().ok())
        .unwrap_or(DEFAULT_RELEASE_YEAR)
}

/// Response structure for the artist top-tracks call
#[derive(Debug, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<TopTrack>,
}

#[derive(Debug, Deserialize)]
pub struct TopTrack {
    #[serde(default)]
    pub popularity: Option<u32>,
}
