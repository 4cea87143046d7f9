//! Popularity enrichment from an external top-tracks service.
//!
//! Artists are looked up in fixed-size batches. Lookups inside a batch run
//! concurrently and the batch is joined before the next one starts, with a
//! fixed pause between batches to stay under the service's rate limit. A
//! failed lookup never aborts the run: the artist gets the fallback value.

use crate::graph::EnrichmentSettings;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can report an artist's top-tracks popularity (0-100)
#[cfg_attr(test, mockall::automock)]
pub trait PopularitySource: Send + Sync {
    fn top_tracks_popularity(&self, artist_id: &str) -> anyhow::Result<f64>;
}

/// Look up every artist and return the popularity override for each one
pub fn fetch_popularity_overrides(
    source: &dyn PopularitySource,
    artist_ids: &[String],
    settings: &EnrichmentSettings,
) -> BTreeMap<String, f64> {
    let batch_size = settings.batch_size.max(1);
    let delay = Duration::from_millis(settings.batch_delay_ms);
    let batch_count = artist_ids.len().div_ceil(batch_size);
    let mut overrides = BTreeMap::new();
    let mut failures = 0usize;

    info!(
        "Fetching top tracks popularity for {} artists in {} batches",
        artist_ids.len(),
        batch_count
    );

    for (index, batch) in artist_ids.chunks(batch_size).enumerate() {
        let results = fetch_batch(source, batch, settings.fallback_popularity);
        failures += results.iter().filter(|(_, _, failed)| *failed).count();
        overrides.extend(results.into_iter().map(|(id, popularity, _)| (id, popularity)));
        debug!("Batch {}/{} complete", index + 1, batch_count);

        if index + 1 < batch_count && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    info!(
        "Finished fetching artist popularities ({} fell back to {})",
        failures, settings.fallback_popularity
    );
    overrides
}

/// Run one batch concurrently; returns (artist id, popularity, fell back)
fn fetch_batch(
    source: &dyn PopularitySource,
    batch: &[String],
    fallback: f64,
) -> Vec<(String, f64, bool)> {
    thread::scope(|scope| {
        let handles: Vec<_> = batch
            .iter()
            .map(|artist_id| {
                let handle = scope.spawn(move || source.top_tracks_popularity(artist_id));
                (artist_id, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(artist_id, handle)| match handle.join() {
                Ok(Ok(popularity)) if popularity.is_finite() => {
                    (artist_id.clone(), popularity, false)
                }
                Ok(Ok(popularity)) => {
                    warn!(
                        "Top tracks popularity for artist {} was not a number ({}), using {}",
                        artist_id, popularity, fallback
                    );
                    (artist_id.clone(), fallback, true)
                }
                Ok(Err(e)) => {
                    warn!(
                        "Failed to fetch top tracks for artist {}: {}, using {}",
                        artist_id, e, fallback
                    );
                    (artist_id.clone(), fallback, true)
                }
                Err(_) => {
                    warn!("Top tracks lookup for artist {} panicked, using {}", artist_id, fallback);
                    (artist_id.clone(), fallback, true)
                }
            })
            .collect()
    })
}
