use super::{Granularity, ScoringMethod};
use crate::models::DEFAULT_RELEASE_YEAR;
use std::collections::BTreeSet;

pub const MIN_ARTIST_SIZE: f64 = 15.0;
pub const MAX_ARTIST_SIZE: f64 = 80.0;
pub const MIN_TRACK_SIZE: f64 = 10.0;
pub const MAX_TRACK_SIZE: f64 = 50.0;

/// Span of years over which the color gradient runs from blue to red
const COLOR_AGE_SPAN: f64 = 50.0;

/// Clamp that maps NaN to the lower bound instead of propagating it
fn bounded(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Node size strategies; each scoring method has a matching formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeFormula {
    /// Dominated by popularity, nudged by playlist reach and track count
    PopularityWeighted,
    /// Dominated by track count
    Simple,
}

impl SizeFormula {
    pub fn for_method(method: ScoringMethod) -> Self {
        match method {
            ScoringMethod::Pmi => SizeFormula::PopularityWeighted,
            ScoringMethod::RawCoOccurrence => SizeFormula::Simple,
        }
    }
}

/// Derivation of node-level visual and summary attributes
pub struct NodeAttributes;

impl NodeAttributes {
    /// External override when present, otherwise the mean popularity of the tracks seen
    pub fn effective_popularity(
        popularity_override: Option<f64>,
        total_popularity: u64,
        track_count: u32,
    ) -> Option<f64> {
        match popularity_override {
            Some(popularity) => Some(popularity),
            None if track_count > 0 => Some(total_popularity as f64 / track_count as f64),
            None => None,
        }
    }

    pub fn artist_size(
        formula: SizeFormula,
        popularity: f64,
        avg_popularity: u32,
        playlist_count: u32,
        track_count: u32,
    ) -> f64 {
        let raw = match formula {
            SizeFormula::PopularityWeighted => {
                popularity * 0.6
                    + (playlist_count as f64 + 1.0).ln() * 2.0
                    + (track_count as f64 + 1.0).ln()
            }
            SizeFormula::Simple => {
                (track_count as f64 + 1.0).ln() * 5.0 + avg_popularity as f64 * 0.3
            }
        };
        bounded(raw, MIN_ARTIST_SIZE, MAX_ARTIST_SIZE)
    }

    /// Track nodes map popularity 0..100 onto 10..50
    pub fn track_size(popularity: u32) -> f64 {
        bounded(
            MIN_TRACK_SIZE + popularity as f64 * 0.4,
            MIN_TRACK_SIZE,
            MAX_TRACK_SIZE,
        )
    }

    /// Rounded mean of the distinct release years; None for an empty set
    pub fn average_release_year(years: &BTreeSet<i32>) -> Option<i32> {
        if years.is_empty() {
            return None;
        }
        let sum: i64 = years.iter().map(|&y| y as i64).sum();
        Some((sum as f64 / years.len() as f64).round() as i32)
    }

    /// Linear blue-to-red gradient: recent releases are blue, old ones red
    pub fn recency_color(release_year: Option<i32>, current_year: i32) -> String {
        let year = release_year.unwrap_or(DEFAULT_RELEASE_YEAR);
        let age = (current_year - year) as f64;
        let normalized_age = (age / COLOR_AGE_SPAN).clamp(0.0, 1.0);
        format!(
            "rgb({}, 100, {})",
            (255.0 * normalized_age).round() as u8,
            (255.0 * (1.0 - normalized_age)).round() as u8
        )
    }
}

/// Derivation of edge-level visual attributes
pub struct EdgeAttributes;

impl EdgeAttributes {
    pub fn thickness(method: ScoringMethod, granularity: Granularity, weight: f64) -> f64 {
        match (method, granularity) {
            // PMI values are small, so they are scaled up linearly
            (ScoringMethod::Pmi, _) => bounded(weight * 5.0, 1.0, 15.0),
            (ScoringMethod::RawCoOccurrence, Granularity::Artist) => {
                bounded((weight + 1.0).ln() * 3.0, 1.0, 15.0)
            }
            (ScoringMethod::RawCoOccurrence, Granularity::Track) => {
                bounded((weight + 1.0).ln() * 2.0, 1.0, 10.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_override_takes_precedence() {
        assert_eq!(NodeAttributes::effective_popularity(Some(73.5), 10, 1), Some(73.5));
        assert_eq!(NodeAttributes::effective_popularity(None, 150, 2), Some(75.0));
        assert_eq!(NodeAttributes::effective_popularity(None, 0, 0), None);
    }

    #[test]
    fn test_popularity_weighted_size() {
        let size = NodeAttributes::artist_size(SizeFormula::PopularityWeighted, 50.0, 50, 3, 4);
        let expected = 30.0 + 4.0_f64.ln() * 2.0 + 5.0_f64.ln();
        assert_relative_eq!(size, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_simple_size() {
        let size = NodeAttributes::artist_size(SizeFormula::Simple, 90.0, 90, 1, 9);
        let expected = 10.0_f64.ln() * 5.0 + 27.0;
        assert_relative_eq!(size, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_sizes_stay_in_range_for_degenerate_inputs() {
        for formula in [SizeFormula::PopularityWeighted, SizeFormula::Simple] {
            for (popularity, tracks, playlists) in
                [(0.0, 0, 0), (100.0, 0, 0), (100.0, 100_000, 100_000), (0.0, 1, 1), (f64::NAN, 1, 1)]
            {
                let size = NodeAttributes::artist_size(
                    formula,
                    popularity,
                    if popularity.is_nan() { 0 } else { popularity as u32 },
                    playlists,
                    tracks,
                );
                assert!((MIN_ARTIST_SIZE..=MAX_ARTIST_SIZE).contains(&size), "{formula:?} gave {size}");
            }
        }
        assert_relative_eq!(NodeAttributes::track_size(0), MIN_TRACK_SIZE);
        assert_relative_eq!(NodeAttributes::track_size(100), MAX_TRACK_SIZE);
        assert_relative_eq!(NodeAttributes::track_size(u32::MAX), MAX_TRACK_SIZE);
    }

    #[test]
    fn test_average_release_year_uses_distinct_years() {
        let years: BTreeSet<i32> = [1990, 1991, 2000].into_iter().collect();
        assert_eq!(NodeAttributes::average_release_year(&years), Some(1994));
        assert_eq!(NodeAttributes::average_release_year(&BTreeSet::new()), None);
    }

    #[test]
    fn test_recency_color_gradient() {
        assert_eq!(NodeAttributes::recency_color(Some(2025), 2025), "rgb(0, 100, 255)");
        assert_eq!(NodeAttributes::recency_color(Some(1975), 2025), "rgb(255, 100, 0)");
        assert_eq!(NodeAttributes::recency_color(Some(1900), 2025), "rgb(255, 100, 0)");
        assert_eq!(NodeAttributes::recency_color(Some(2000), 2025), "rgb(128, 100, 128)");
        // Release dates in the future do not go past blue
        assert_eq!(NodeAttributes::recency_color(Some(2030), 2025), "rgb(0, 100, 255)");
    }

    #[test]
    fn test_thickness_ranges() {
        let cases = [
            (ScoringMethod::Pmi, Granularity::Artist, 1.0, 15.0),
            (ScoringMethod::RawCoOccurrence, Granularity::Artist, 1.0, 15.0),
            (ScoringMethod::RawCoOccurrence, Granularity::Track, 1.0, 10.0),
        ];
        for (method, granularity, min, max) in cases {
            for weight in [0.0, 1e-9, 1.0, 1e9, f64::MAX] {
                let thickness = EdgeAttributes::thickness(method, granularity, weight);
                assert!(thickness >= min && thickness <= max, "{method} {granularity} {weight}");
            }
        }
    }

    #[test]
    fn test_thickness_values() {
        assert_relative_eq!(EdgeAttributes::thickness(ScoringMethod::Pmi, Granularity::Artist, 2.0), 10.0);
        assert_relative_eq!(
            EdgeAttributes::thickness(ScoringMethod::RawCoOccurrence, Granularity::Artist, 4.0),
            5.0_f64.ln() * 3.0
        );
        assert_relative_eq!(
            EdgeAttributes::thickness(ScoringMethod::RawCoOccurrence, Granularity::Track, 3.0),
            4.0_f64.ln() * 2.0
        );
    }
}
