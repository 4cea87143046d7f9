use crate::enrichment::PopularitySource;
use crate::models::TopTracksResponse;
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;
use urlencoding::encode;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("failed to decode catalog response: {0}")]
    Decode(#[from] std::io::Error),
}

impl From<ureq::Error> for CatalogError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(status, response) => CatalogError::Status {
                status,
                url: response.get_url().to_string(),
            },
            other => CatalogError::Transport(other.to_string()),
        }
    }
}

/// Minimal catalog API client for artist top tracks, using bearer auth
pub struct SpotifyClient {
    agent: Agent,
    api_base: String,
    access_token: String,
    market: String,
}

impl SpotifyClient {
    pub fn new(api_base: &str, access_token: &str, market: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();

        SpotifyClient {
            agent,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            market: market.to_string(),
        }
    }

    fn top_tracks_url(&self, artist_id: &str) -> String {
        format!(
            "{}/artists/{}/top-tracks?market={}",
            self.api_base,
            encode(artist_id),
            encode(&self.market)
        )
    }

    /// Fetch an artist's top tracks and average their popularity
    pub fn fetch_top_tracks_popularity(&self, artist_id: &str) -> Result<f64, CatalogError> {
        let url = self.top_tracks_url(artist_id);

        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.access_token))
            .call()?;

        let parsed: TopTracksResponse = response.into_json()?;
        Ok(average_popularity(&parsed))
    }
}

/// Mean popularity of the returned tracks, 0 when there are none
pub fn average_popularity(response: &TopTracksResponse) -> f64 {
    if response.tracks.is_empty() {
        return 0.0;
    }
    let total: u32 = response
        .tracks
        .iter()
        .map(|t| t.popularity.unwrap_or(0))
        .sum();
    total as f64 / response.tracks.len() as f64
}

impl PopularitySource for SpotifyClient {
    fn top_tracks_popularity(&self, artist_id: &str) -> anyhow::Result<f64> {
        Ok(self.fetch_top_tracks_popularity(artist_id)?)
    }
}
