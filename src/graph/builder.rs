use super::attributes::{EdgeAttributes, NodeAttributes, SizeFormula};
use super::cooccurrence::{self, CoOccurrence, EdgeKey};
use super::filters::SignificanceFilter;
use super::metadata::{ArtistNodeData, EdgeData, Graph, GraphStats, NodeData, PopularityOrigin};
use super::scoring::PmiScorer;
use super::statistics::OccurrenceStatistics;
use super::tracks::{self, TrackAccumulator};
use super::{GraphConfig, Granularity, ScoringMethod};
use crate::models::PlaylistRecord;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Keep the lexicographically least non-empty name so repeated records agree regardless of order
pub(super) fn merge_name(current: &mut String, candidate: &str) {
    if !candidate.is_empty() && (current.is_empty() || candidate < current.as_str()) {
        *current = candidate.to_string();
    }
}

/// Same rule for optional values: any value beats none, then the least wins
pub(super) fn merge_optional(current: &mut Option<String>, candidate: Option<&str>) {
    if let Some(candidate) = candidate {
        if current.as_deref().is_none_or(|existing| candidate < existing) {
            *current = Some(candidate.to_string());
        }
    }
}

/// Raw per-artist tallies gathered before any attribute is derived
#[derive(Debug, Clone)]
pub struct ArtistAccumulator {
    pub id: String,
    pub name: String,
    pub spotify_url: Option<String>,
    pub track_count: u32,
    pub total_popularity: u64,
    pub release_years: BTreeSet<i32>,
}

#[derive(Debug, Clone)]
pub enum NodeAccumulators {
    Artists(BTreeMap<String, ArtistAccumulator>),
    Tracks(BTreeMap<String, TrackAccumulator>),
}

/// Scratch result of both accumulation passes; consumed by `derive`
#[derive(Debug, Clone)]
pub struct GraphAggregates {
    pub statistics: OccurrenceStatistics,
    pub playlists_analyzed: usize,
    pub nodes: NodeAccumulators,
    pub co_occurrences: BTreeMap<EdgeKey, CoOccurrence>,
}

/// Builds a graph snapshot from an immutable playlist collection
pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build without popularity overrides
    pub fn build(&self, playlists: &[PlaylistRecord]) -> Graph {
        self.accumulate(playlists).derive(&self.config, &BTreeMap::new())
    }

    /// Run both counting passes: marginals first, then pair statistics
    pub fn accumulate(&self, playlists: &[PlaylistRecord]) -> GraphAggregates {
        let granularity = self.config.granularity;
        info!(
            "Accumulating {} playlists at {} granularity",
            playlists.len(),
            granularity
        );

        let statistics = OccurrenceStatistics::collect(playlists, granularity);
        let nodes = match granularity {
            Granularity::Artist => NodeAccumulators::Artists(accumulate_artists(playlists)),
            Granularity::Track => NodeAccumulators::Tracks(tracks::accumulate_tracks(playlists)),
        };
        let co_occurrences = cooccurrence::aggregate(playlists, granularity, &statistics);
        let playlists_analyzed = playlists.iter().filter(|p| p.has_track_list()).count();

        debug!(
            "Pass complete: {} entities, {} candidate pairs, {} playlists with tracks",
            statistics.appearances.len(),
            co_occurrences.len(),
            playlists_analyzed
        );

        GraphAggregates {
            statistics,
            playlists_analyzed,
            nodes,
            co_occurrences,
        }
    }
}

fn accumulate_artists(playlists: &[PlaylistRecord]) -> BTreeMap<String, ArtistAccumulator> {
    let mut artists: BTreeMap<String, ArtistAccumulator> = BTreeMap::new();

    for track in playlists.iter().flat_map(|p| p.valid_tracks()) {
        let release_year = track.release_year();
        for (id, artist) in track.identified_artists() {
            let entry = artists
                .entry(id.to_string())
                .or_insert_with(|| ArtistAccumulator {
                    id: id.to_string(),
                    name: String::new(),
                    spotify_url: None,
                    track_count: 0,
                    total_popularity: 0,
                    release_years: BTreeSet::new(),
                });
            merge_name(&mut entry.name, &artist.name);
            merge_optional(&mut entry.spotify_url, artist.spotify_url());
            entry.track_count += 1;
            entry.total_popularity += track.popularity() as u64;
            entry.release_years.insert(release_year);
        }
    }

    artists
}

impl GraphAggregates {
    /// Ids of artist nodes, the input to popularity enrichment
    pub fn artist_ids(&self) -> Vec<String> {
        match &self.nodes {
            NodeAccumulators::Artists(artists) => artists.keys().cloned().collect(),
            NodeAccumulators::Tracks(_) => Vec::new(),
        }
    }

    /// Score, filter and derive attributes; totals are final at this point
    pub fn derive(self, config: &GraphConfig, popularity_overrides: &BTreeMap<String, f64>) -> Graph {
        let method = config.method;
        let granularity = config.granularity;
        let current_year = config.resolved_current_year();
        let filter = SignificanceFilter::new(method, config.resolved_min_edge_weight());

        let candidate_count = self.co_occurrences.len();
        let edges = derive_edges(
            self.co_occurrences,
            method,
            granularity,
            self.statistics.total_playlists,
            &filter,
        );
        debug!(
            "Filtered edges: {} of {} with weight >= {}",
            edges.len(),
            candidate_count,
            filter.min_edge_weight()
        );

        let (nodes, popularity_source) = match self.nodes {
            NodeAccumulators::Artists(artists) => {
                let applied = artists.keys().any(|id| popularity_overrides.contains_key(id));
                let nodes = derive_artist_nodes(
                    artists,
                    &self.statistics,
                    popularity_overrides,
                    SizeFormula::for_method(method),
                    current_year,
                );
                let source = if applied {
                    PopularityOrigin::TopTracks
                } else {
                    PopularityOrigin::PlaylistAverage
                };
                (nodes, source)
            }
            NodeAccumulators::Tracks(tracks) => (
                tracks::derive_track_nodes(tracks, &self.statistics, current_year),
                PopularityOrigin::PlaylistAverage,
            ),
        };

        let stats = GraphStats::from_graph(&nodes, &edges);
        info!(
            "Graph built ({}): {} nodes, {} edges",
            method,
            nodes.len(),
            edges.len()
        );

        Graph {
            method,
            granularity,
            min_edge_weight: filter.min_edge_weight(),
            total_playlists: self.statistics.total_playlists,
            playlists_analyzed: self.playlists_analyzed,
            popularity_source,
            nodes,
            edges,
            stats,
        }
    }
}

fn derive_edges(
    co_occurrences: BTreeMap<EdgeKey, CoOccurrence>,
    method: ScoringMethod,
    granularity: Granularity,
    total_playlists: usize,
    filter: &SignificanceFilter,
) -> Vec<EdgeData> {
    let scorer = method.scorer();
    debug!(
        "Scoring {} pairs with {} over {} playlists",
        co_occurrences.len(),
        scorer.method(),
        total_playlists
    );

    co_occurrences
        .into_iter()
        .filter_map(|(key, co)| {
            let weight = scorer.weight(&co, total_playlists);
            if !filter.is_significant(weight) {
                return None;
            }

            let (joint_prob, expected_prob) = match method {
                ScoringMethod::Pmi => (
                    Some(PmiScorer::joint_probability(&co, total_playlists)),
                    Some(PmiScorer::expected_probability(&co)),
                ),
                ScoringMethod::RawCoOccurrence => (None, None),
            };
            let mut playlists = co.playlists;
            playlists.sort();

            Some(EdgeData {
                id: key.to_string(),
                thickness: EdgeAttributes::thickness(method, granularity, weight),
                source: key.source,
                target: key.target,
                weight,
                joint_count: co.joint_count,
                joint_prob,
                expected_prob,
                playlist_count: playlists.len(),
                playlists,
            })
        })
        .collect()
}

fn derive_artist_nodes(
    artists: BTreeMap<String, ArtistAccumulator>,
    statistics: &OccurrenceStatistics,
    popularity_overrides: &BTreeMap<String, f64>,
    formula: SizeFormula,
    current_year: i32,
) -> Vec<NodeData> {
    artists
        .into_values()
        .map(|artist| {
            let top_tracks_popularity = popularity_overrides.get(&artist.id).copied();
            let popularity = NodeAttributes::effective_popularity(
                top_tracks_popularity,
                artist.total_popularity,
                artist.track_count,
            );
            let avg_popularity = popularity.map(|p| p.max(0.0).round() as u32);
            let avg_release_year = NodeAttributes::average_release_year(&artist.release_years);
            let playlist_count = statistics.appearance_count(&artist.id);

            NodeData::Artist(ArtistNodeData {
                size: NodeAttributes::artist_size(
                    formula,
                    popularity.unwrap_or(0.0),
                    avg_popularity.unwrap_or(0),
                    playlist_count,
                    artist.track_count,
                ),
                color: NodeAttributes::recency_color(avg_release_year, current_year),
                id: artist.id,
                name: artist.name,
                spotify_url: artist.spotify_url,
                track_count: artist.track_count,
                total_popularity: artist.total_popularity,
                release_years: artist.release_years.into_iter().collect(),
                playlist_count,
                top_tracks_popularity,
                avg_popularity,
                avg_release_year,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::{playlist, track, track_with};
    use crate::models::ExternalUrls;
    use approx::assert_relative_eq;

    fn config(method: ScoringMethod) -> GraphConfig {
        let mut config = GraphConfig::new(method, Granularity::Artist);
        config.current_year = Some(2025);
        config
    }

    fn artist(graph: &Graph, id: &str) -> ArtistNodeData {
        graph
            .nodes
            .iter()
            .find_map(|node| match node {
                NodeData::Artist(artist) if artist.id == id => Some(artist.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_artist_accumulation() {
        let playlists = vec![
            playlist("p1", vec![track_with("t1", &["a"], 60, "2010-05-01"), track_with("t2", &["a"], 80, "2012")]),
            playlist("p2", vec![track_with("t3", &["a", "b"], 40, "2010-01-01")]),
        ];

        let graph = GraphBuilder::new(config(ScoringMethod::RawCoOccurrence)).build(&playlists);
        let a = artist(&graph, "a");
        assert_eq!(a.track_count, 3);
        assert_eq!(a.total_popularity, 180);
        assert_eq!(a.release_years, vec![2010, 2012]);
        assert_eq!(a.playlist_count, 2);
        assert_eq!(a.avg_popularity, Some(60));
        assert_eq!(a.avg_release_year, Some(2011));
        assert_eq!(a.spotify_url.as_deref(), Some("https://open.spotify.com/artist/a"));
        assert!(a.top_tracks_popularity.is_none());
        assert_eq!(graph.popularity_source, PopularityOrigin::PlaylistAverage);
    }

    #[test]
    fn test_overrides_feed_popularity_and_size() {
        let playlists = vec![playlist("p1", vec![track_with("t1", &["a"], 10, "2020")])];
        let builder = GraphBuilder::new(config(ScoringMethod::Pmi));
        let aggregates = builder.accumulate(&playlists);
        assert_eq!(aggregates.artist_ids(), vec!["a".to_string()]);

        let overrides: BTreeMap<String, f64> = [("a".to_string(), 90.4)].into_iter().collect();
        let graph = aggregates.derive(builder.config(), &overrides);
        let a = artist(&graph, "a");

        assert_eq!(a.avg_popularity, Some(90));
        assert_eq!(a.top_tracks_popularity, Some(90.4));
        let expected = 90.4 * 0.6 + 2.0_f64.ln() * 2.0 + 2.0_f64.ln();
        assert_relative_eq!(a.size, expected, epsilon = 1e-9);
        assert_eq!(graph.popularity_source, PopularityOrigin::TopTracks);
    }

    #[test]
    fn test_raw_threshold_keeps_strong_pairs_only() {
        let mut playlists = Vec::new();
        for i in 0..3 {
            playlists.push(playlist(&format!("p{i}"), vec![track("t1", &["a"]), track("t2", &["b"])]));
        }
        playlists.push(playlist("p9", vec![track("t1", &["a"]), track("t3", &["c"])]));

        let graph = GraphBuilder::new(config(ScoringMethod::RawCoOccurrence)).build(&playlists);
        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.id, "a-b");
        assert_relative_eq!(edge.weight, 3.0);
        assert_eq!(edge.playlist_count, 3);
        assert!(edge.joint_prob.is_none());
        // Nodes are never removed by edge filtering
        assert_eq!(graph.nodes.len(), 3);
    }

    #[test]
    fn test_pmi_edges_carry_probabilities() {
        let playlists = vec![
            playlist("p1", vec![track("t1", &["a"]), track("t2", &["b"])]),
            playlist("p2", vec![track("t3", &["c"])]),
            playlist("p3", vec![track("t4", &["d"])]),
        ];

        let graph = GraphBuilder::new(config(ScoringMethod::Pmi)).build(&playlists);
        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_relative_eq!(edge.weight, 3.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(edge.joint_prob.unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(edge.expected_prob.unwrap(), 1.0 / 9.0, epsilon = 1e-12);
        assert_relative_eq!(edge.thickness, 3.0_f64.ln() * 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_provenance_is_sorted() {
        let playlists = vec![
            playlist("z", vec![track("t1", &["a"]), track("t2", &["b"])]),
            playlist("m", vec![track("t1", &["a"]), track("t2", &["b"])]),
            playlist("c", vec![track("t1", &["a"]), track("t2", &["b"])]),
        ];
        let mut config = config(ScoringMethod::RawCoOccurrence);
        config.min_edge_weight = Some(1.0);

        let graph = GraphBuilder::new(config).build(&playlists);
        let ids: Vec<&str> = graph.edges[0].playlists.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "m", "z"]);
    }

    #[test]
    fn test_conflicting_artist_details_resolve_the_same_either_way() {
        let mut renamed = track("t2", &["a"]);
        renamed.artists[0].name = "Alpha".to_string();
        renamed.artists[0].external_urls = None;
        let mut relinked = track("t3", &["a"]);
        relinked.artists[0].name = String::new();
        relinked.artists[0].external_urls = Some(ExternalUrls {
            spotify: Some("https://open.spotify.com/artist/a-alt".to_string()),
        });

        let forward = vec![
            playlist("p1", vec![track("t1", &["a"])]),
            playlist("p2", vec![renamed]),
            playlist("p3", vec![relinked]),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let builder = GraphBuilder::new(config(ScoringMethod::Pmi));
        for playlists in [forward, reversed] {
            let a = artist(&builder.build(&playlists), "a");
            assert_eq!(a.name, "Alpha");
            assert_eq!(a.spotify_url.as_deref(), Some("https://open.spotify.com/artist/a"));
        }
    }

    #[test]
    fn test_merge_helpers() {
        let mut name = String::new();
        merge_name(&mut name, "Zed");
        merge_name(&mut name, "");
        merge_name(&mut name, "Ann");
        merge_name(&mut name, "Bob");
        assert_eq!(name, "Ann");

        let mut url = None;
        merge_optional(&mut url, None);
        merge_optional(&mut url, Some("b"));
        merge_optional(&mut url, Some("a"));
        merge_optional(&mut url, None);
        assert_eq!(url.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        let graph = GraphBuilder::new(config(ScoringMethod::Pmi)).build(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(graph.total_playlists, 0);
        assert_eq!(graph.stats, GraphStats::default());
    }
}
