//! Multi-source search aggregation
//!
//! Fans the source adapters out concurrently, absorbs per-source
//! failures into empty result sets, orders the merged list by version
//! tier and popularity, and flags cross-source duplicates as a quality
//! signal.

use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::sources::{Source, SourceAdapter, TrackCandidate};

/// Length of the normalized title key used for duplicate grouping
pub const TITLE_KEY_LENGTH: usize = 30;
/// Popularity increment for titles found on more than one source
const DUPLICATE_BOOST: u8 = 10;
/// Upper bound of the popularity scale
pub const MAX_POPULARITY: u8 = 99;

/// Merged, ranked search result across all sources
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub query: String,
    pub results: Vec<TrackCandidate>,
    /// Per-source result counts, for observability; an all-zero map
    /// reads as "no matches", not an error
    #[serde(rename = "sources")]
    pub source_counts: HashMap<Source, usize>,
}

/// The search orchestration hub: owns one adapter per source
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Search every source concurrently and merge the results.
    ///
    /// A failing adapter is reduced to an empty list here; nothing a
    /// single source does can fail the aggregate call.
    pub async fn search(&self, query: &str) -> AggregateResult {
        // All adapter futures are created before the first await, so
        // source latencies overlap and the total is bounded by the
        // slowest source.
        let searches = self.adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let query = query.to_string();
            async move {
                let source = adapter.source();
                match adapter.search(&query).await {
                    Ok(candidates) => (source, candidates),
                    Err(e) => {
                        tracing::warn!(
                            source = source.as_str(),
                            error = %e,
                            "source search failed; continuing without it"
                        );
                        (source, Vec::new())
                    }
                }
            }
        });

        let per_source = join_all(searches).await;

        let mut source_counts = HashMap::new();
        let mut results = Vec::new();
        for (source, candidates) in per_source {
            source_counts.insert(source, candidates.len());
            results.extend(candidates);
        }

        rank(&mut results);
        mark_cross_source_duplicates(&mut results);

        tracing::info!(
            query = %query,
            total = results.len(),
            "aggregated search complete"
        );

        AggregateResult {
            query: query.to_string(),
            results,
            source_counts,
        }
    }
}

/// Version tier ascending, then popularity descending. The sort is
/// stable, so equal candidates keep source-invocation order.
fn rank(results: &mut [TrackCandidate]) {
    results.sort_by(|a, b| {
        a.version
            .rank()
            .cmp(&b.version.rank())
            .then(b.popularity.cmp(&a.popularity))
    });
}

/// Normalized title key for duplicate grouping: lowercase, alphanumerics
/// only, truncated. Short similar titles can collide; long titles
/// differing only past the cutoff collide too.
fn title_key(title: &str) -> String {
    title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(TITLE_KEY_LENGTH)
        .collect()
}

/// Mark candidates whose normalized title appears on more than one
/// source and boost their popularity. Runs after ranking; the boost
/// deliberately does not re-sort.
fn mark_cross_source_duplicates(results: &mut [TrackCandidate]) {
    let mut sources_by_key: HashMap<String, HashSet<Source>> = HashMap::new();
    for candidate in results.iter() {
        sources_by_key
            .entry(title_key(&candidate.title))
            .or_default()
            .insert(candidate.source);
    }

    for candidate in results.iter_mut() {
        let multi = sources_by_key[&title_key(&candidate.title)].len() > 1;
        candidate.multi_source = multi;
        if multi {
            candidate.popularity =
                candidate.popularity.saturating_add(DUPLICATE_BOOST).min(MAX_POPULARITY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{candidate, MockAdapter};

    fn aggregator(adapters: Vec<MockAdapter>) -> Aggregator {
        Aggregator::new(
            adapters
                .into_iter()
                .map(|a| Arc::new(a) as Arc<dyn SourceAdapter>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_version_tier_dominates_popularity() {
        let agg = aggregator(vec![
            MockAdapter::returning(
                Source::Spotify,
                vec![candidate(Source::Spotify, "Track X (Remix)", 90)],
            ),
            MockAdapter::returning(
                Source::Youtube,
                vec![candidate(Source::Youtube, "Track Y", 10)],
            ),
        ]);

        let result = agg.search("track").await;
        assert_eq!(result.results[0].title, "Track Y");
        assert_eq!(result.results[1].title, "Track X (Remix)");
    }

    #[tokio::test]
    async fn test_popularity_orders_within_tier() {
        let agg = aggregator(vec![
            MockAdapter::returning(
                Source::Spotify,
                vec![candidate(Source::Spotify, "Alpha Song", 40)],
            ),
            MockAdapter::returning(
                Source::Youtube,
                vec![candidate(Source::Youtube, "Beta Song", 80)],
            ),
        ]);

        let result = agg.search("song").await;
        assert_eq!(result.results[0].title, "Beta Song");
    }

    #[tokio::test]
    async fn test_cross_source_duplicates_boosted() {
        let agg = aggregator(vec![
            MockAdapter::returning(
                Source::Spotify,
                vec![candidate(Source::Spotify, "Same Track", 50)],
            ),
            MockAdapter::returning(
                Source::Soulseek,
                vec![candidate(Source::Soulseek, "Same Track", 40)],
            ),
        ]);

        let result = agg.search("same track").await;
        assert!(result.results.iter().all(|c| c.multi_source));
        assert_eq!(result.results[0].popularity, 60);
        assert_eq!(result.results[1].popularity, 50);
    }

    #[tokio::test]
    async fn test_boost_caps_at_99() {
        let agg = aggregator(vec![
            MockAdapter::returning(
                Source::Spotify,
                vec![candidate(Source::Spotify, "Hot Track", 95)],
            ),
            MockAdapter::returning(
                Source::Youtube,
                vec![candidate(Source::Youtube, "Hot Track", 94)],
            ),
        ]);

        let result = agg.search("hot track").await;
        assert_eq!(result.results[0].popularity, MAX_POPULARITY);
    }

    #[tokio::test]
    async fn test_same_source_duplicates_not_boosted() {
        let agg = aggregator(vec![MockAdapter::returning(
            Source::Spotify,
            vec![
                candidate(Source::Spotify, "Same Track", 50),
                candidate(Source::Spotify, "Same Track", 45),
            ],
        )]);

        let result = agg.search("same track").await;
        assert!(result.results.iter().all(|c| !c.multi_source));
        assert_eq!(result.results[0].popularity, 50);
    }

    #[tokio::test]
    async fn test_boost_does_not_resort() {
        // Pre-boost order: A (50) before B (45). B is duplicated across
        // sources and lands on 55 post-boost, but keeps its position.
        let agg = aggregator(vec![
            MockAdapter::returning(
                Source::Spotify,
                vec![
                    candidate(Source::Spotify, "Track Aaa", 50),
                    candidate(Source::Spotify, "Track Bbb", 45),
                ],
            ),
            MockAdapter::returning(
                Source::Youtube,
                vec![candidate(Source::Youtube, "Track Bbb", 20)],
            ),
        ]);

        let result = agg.search("track").await;
        assert_eq!(result.results[0].title, "Track Aaa");
        assert_eq!(result.results[0].popularity, 50);
        assert_eq!(result.results[1].title, "Track Bbb");
        assert_eq!(result.results[1].popularity, 55);
    }

    #[tokio::test]
    async fn test_adapter_failure_is_absorbed() {
        let agg = aggregator(vec![
            MockAdapter::failing(Source::Soulseek),
            MockAdapter::returning(
                Source::Spotify,
                vec![candidate(Source::Spotify, "Track", 70)],
            ),
        ]);

        let result = agg.search("track").await;
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.source_counts[&Source::Soulseek], 0);
        assert_eq!(result.source_counts[&Source::Spotify], 1);
    }

    #[tokio::test]
    async fn test_all_sources_empty_is_not_an_error() {
        let agg = aggregator(vec![
            MockAdapter::returning(Source::Spotify, Vec::new()),
            MockAdapter::failing(Source::Youtube),
        ]);

        let result = agg.search("nothing").await;
        assert!(result.results.is_empty());
        assert_eq!(result.source_counts.values().sum::<usize>(), 0);
    }

    #[test]
    fn test_title_key_normalization() {
        assert_eq!(title_key("Some Track! (feat. X)"), "sometrackfeatx");
        assert_eq!(title_key("UPPER lower 123"), "upperlower123");
    }

    #[test]
    fn test_title_key_truncates() {
        let long = "a".repeat(50);
        assert_eq!(title_key(&long).len(), TITLE_KEY_LENGTH);
    }

    #[test]
    fn test_title_keys_match_across_punctuation() {
        assert_eq!(title_key("Track - Name"), title_key("Track Name"));
    }
}
