use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge weighting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMethod {
    #[serde(rename = "PMI", alias = "pmi")]
    Pmi,
    #[serde(rename = "raw-co-occurrence", alias = "raw")]
    RawCoOccurrence,
}

/// What a node in the graph represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Artist,
    Track,
}

/// Configuration for graph construction, loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub method: ScoringMethod,
    pub granularity: Granularity,
    /// Threshold for keeping an edge; resolved per method when unset
    pub min_edge_weight: Option<f64>,
    /// Reference year for the recency color gradient; current year when unset
    pub current_year: Option<i32>,
    pub enrichment: EnrichmentSettings,
}

/// Settings for the top-tracks popularity lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    pub enabled: bool,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub fallback_popularity: f64, // Used when a lookup fails
    pub market: String,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: 5,
            batch_delay_ms: 200,
            fallback_popularity: 50.0,
            market: "US".to_string(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            method: ScoringMethod::Pmi,
            granularity: Granularity::Artist,
            min_edge_weight: None,
            current_year: None,
            enrichment: EnrichmentSettings::default(),
        }
    }
}

impl GraphConfig {
    pub fn new(method: ScoringMethod, granularity: Granularity) -> Self {
        Self {
            method,
            granularity,
            ..Self::default()
        }
    }

    /// Load a graph configuration from a JSON file
    pub fn load_from_file(path: &str) -> anyhow::Result<GraphConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: GraphConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Effective edge threshold: explicit value, otherwise the method's default
    pub fn resolved_min_edge_weight(&self) -> f64 {
        self.min_edge_weight
            .unwrap_or(match (self.method, self.granularity) {
                (ScoringMethod::Pmi, _) => 0.1,
                (ScoringMethod::RawCoOccurrence, Granularity::Artist) => 3.0,
                (ScoringMethod::RawCoOccurrence, Granularity::Track) => 10.0,
            })
    }

    pub fn resolved_current_year(&self) -> i32 {
        use chrono::Datelike;
        self.current_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMethod::Pmi => write!(f, "PMI"),
            ScoringMethod::RawCoOccurrence => write!(f, "raw-co-occurrence"),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Artist => write!(f, "artist"),
            Granularity::Track => write!(f, "track"),
        }
    }
}
