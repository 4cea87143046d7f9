use anyhow::Result;

const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub api_base: String,
    /// Bearer token for the catalog API; enrichment is skipped without one
    pub access_token: Option<String>,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let api_base = std::env::var("SPOTIFY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let access_token = std::env::var("SPOTIFY_ACCESS_TOKEN")
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
        anyhow::bail!("SPOTIFY_API_BASE must be an http(s) URL, got '{}'", api_base);
    }

    Ok(Config {
        api_base,
        access_token,
    })
}
