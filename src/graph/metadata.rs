use super::cooccurrence::PlaylistRef;
use super::{Granularity, ScoringMethod};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where node popularity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PopularityOrigin {
    #[serde(rename = "Artist Top Tracks")]
    TopTracks,
    #[serde(rename = "Playlist Average")]
    PlaylistAverage,
}

/// Immutable graph snapshot produced by one build
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub method: ScoringMethod,
    pub granularity: Granularity,
    pub min_edge_weight: f64,
    pub total_playlists: usize,
    pub playlists_analyzed: usize,
    pub popularity_source: PopularityOrigin,
    pub nodes: Vec<NodeData>,
    pub edges: Vec<EdgeData>,
    pub stats: GraphStats,
}

/// Node payload; the shape depends on the graph granularity
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Artist(ArtistNodeData),
    Track(TrackNodeData),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistNodeData {
    pub id: String,
    pub name: String,
    pub spotify_url: Option<String>,
    pub track_count: u32,
    pub total_popularity: u64,
    pub release_years: Vec<i32>,
    pub playlist_count: u32,
    pub top_tracks_popularity: Option<f64>,
    pub avg_popularity: Option<u32>,
    pub avg_release_year: Option<i32>,
    pub size: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackNodeData {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub popularity: u32,
    pub release_year: i32,
    pub playlist_count: u32,
    pub spotify_url: Option<String>,
    pub preview_url: Option<String>,
    pub size: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub thickness: f64,
    pub joint_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_prob: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_prob: Option<f64>,
    pub playlist_count: usize,
    pub playlists: Vec<PlaylistRef>,
}

/// min/avg/max over a collection; all None when it is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl RangeStats {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Self::default();
        }
        Self {
            min: Some(min),
            avg: Some(sum / count as f64),
            max: Some(max),
        }
    }
}

/// Aggregate statistics over the filtered graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub popularity: RangeStats,
    pub release_years: RangeStats,
    pub edge_weights: RangeStats,
}

impl GraphStats {
    pub fn from_graph(nodes: &[NodeData], edges: &[EdgeData]) -> Self {
        let popularity = RangeStats::from_values(nodes.iter().filter_map(|node| match node {
            NodeData::Artist(artist) => artist.avg_popularity.map(f64::from),
            NodeData::Track(track) => Some(track.popularity as f64),
        }));
        let release_years = RangeStats::from_values(nodes.iter().filter_map(|node| match node {
            NodeData::Artist(artist) => artist.avg_release_year.map(f64::from),
            NodeData::Track(track) => Some(track.release_year as f64),
        }));

        Self {
            nodes: nodes.len(),
            edges: edges.len(),
            popularity,
            release_years,
            edge_weights: RangeStats::from_values(edges.iter().map(|e| e.weight)),
        }
    }
}

/// JSON document handed to the visualization layer
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub metadata: ExportMetadata<'a>,
    pub graph: GraphElements<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata<'a> {
    pub generated_at: String,
    pub method: ScoringMethod,
    pub granularity: Granularity,
    pub popularity_source: PopularityOrigin,
    pub min_edge_weight: f64,
    pub total_playlists: usize,
    pub playlists_analyzed: usize,
    pub stats: &'a GraphStats,
}

#[derive(Debug, Serialize)]
pub struct GraphElements<'a> {
    pub nodes: Vec<Element<&'a NodeData>>,
    pub edges: Vec<Element<&'a EdgeData>>,
}

/// Cytoscape-style `{ data: ... }` wrapper
#[derive(Debug, Serialize)]
pub struct Element<T> {
    pub data: T,
}

impl Graph {
    pub fn export(&self, generated_at: DateTime<Utc>) -> GraphExport<'_> {
        GraphExport {
            metadata: ExportMetadata {
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                method: self.method,
                granularity: self.granularity,
                popularity_source: self.popularity_source,
                min_edge_weight: self.min_edge_weight,
                total_playlists: self.total_playlists,
                playlists_analyzed: self.playlists_analyzed,
                stats: &self.stats,
            },
            graph: GraphElements {
                nodes: self.nodes.iter().map(|data| Element { data }).collect(),
                edges: self.edges.iter().map(|data| Element { data }).collect(),
            },
        }
    }
}

impl NodeData {
    pub fn id(&self) -> &str {
        match self {
            NodeData::Artist(artist) => &artist.id,
            NodeData::Track(track) => &track.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeData::Artist(artist) => &artist.name,
            NodeData::Track(track) => &track.name,
        }
    }
}

impl Graph {
    /// Node display names keyed by node id
    pub fn node_names(&self) -> BTreeMap<&str, &str> {
        self.nodes.iter().map(|node| (node.id(), node.name())).collect()
    }
}
