//! Candidate scoring and selection for a single service moment.
//!
//! Every song tagged for the moment and not already used elsewhere in the
//! setlist gets a composite score:
//!
//! ```text
//! score = weight * (recency + 0.1) + U(0, 0.5)
//! ```
//!
//! The `+0.1` floor keeps weight differences meaningful for songs used very
//! recently (recency near 0). The random term breaks ties and keeps two runs
//! over the same data from always producing the same setlist. It is drawn
//! from a caller-supplied generator so that tests can seed it.

use crate::recency::RecencyScoreTable;
use crate::song::SongLibrary;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Added to recency so a just-used song keeps a non-zero score.
pub const RECENCY_FLOOR: f64 = 0.1;

/// Upper bound (exclusive) of the random tie-breaking term.
pub const MAX_JITTER: f64 = 0.5;

/// A song considered for a moment, with the parts of its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub title: String,
    pub weight: u8,
    pub recency: f64,
    pub score: f64,
}

/// Outcome of filling one moment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MomentSelection {
    /// Overrides first, in the caller's order, then the best-scoring songs.
    pub titles: Vec<String>,
    /// How many leading titles came from overrides.
    pub override_count: usize,
}

impl MomentSelection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    #[must_use]
    pub fn into_titles(self) -> Vec<String> {
        self.titles
    }
}

/// Deterministic part of the score.
#[must_use]
#[inline]
pub fn base_score(weight: u8, recency: f64) -> f64 {
    f64::from(weight) * (recency + RECENCY_FLOOR)
}

/// Scores every eligible song for `moment`, best first.
///
/// A song is eligible when it carries a weight for `moment` and is not in
/// `excluded`. Songs missing from `recency` count as never used.
pub fn score_candidates<R>(
    moment: &str,
    songs: &SongLibrary,
    recency: &RecencyScoreTable,
    excluded: &HashSet<String>,
    rng: &mut R,
) -> Vec<ScoredCandidate>
where
    R: Rng + ?Sized,
{
    let mut candidates: Vec<ScoredCandidate> = songs
        .values()
        .filter(|song| !excluded.contains(&song.title))
        .filter_map(|song| {
            let weight = song.weight(moment)?;
            let recency = recency.get(&song.title).copied().unwrap_or(1.0);
            let score = base_score(weight, recency) + rng.gen_range(0.0..MAX_JITTER);
            log::trace!(
                "Candidate `{}' for `{}': weight {}, recency {:.3}, score {:.3}",
                song.title,
                moment,
                weight,
                recency,
                score
            );
            Some(ScoredCandidate {
                title: song.title.clone(),
                weight,
                recency,
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates
}

/// Chooses up to `count` songs for `moment`.
///
/// Overrides are placed first, in order, without scoring. An override is
/// skipped when the title is unknown, already in `already_selected`, or
/// repeated. Remaining slots are filled from [`score_candidates`].
///
/// Returns fewer than `count` titles when the eligible pool runs out; the
/// caller decides whether that is acceptable.
///
/// # Examples
///
/// ```
/// use setlister::algorithm::select_songs_for_moment;
/// use setlister::recency::RecencyScoreTable;
/// use setlister::song::{library_from, Song};
/// use rand::{rngs::StdRng, SeedableRng};
/// use std::collections::HashSet;
///
/// let songs = library_from(vec![
///     Song::new("Oceanos").with_tag("louvor", 5),
///     Song::new("Santo").with_tag("louvor", 3),
/// ]);
/// let mut rng = StdRng::seed_from_u64(7);
/// let overrides = vec!["Santo".to_string()];
/// let selection = select_songs_for_moment(
///     "louvor", 2, &songs, &RecencyScoreTable::new(), &HashSet::new(),
///     Some(&overrides), &mut rng,
/// );
/// assert_eq!(selection.titles, vec!["Santo", "Oceanos"]);
/// assert_eq!(selection.override_count, 1);
/// ```
pub fn select_songs_for_moment<R>(
    moment: &str,
    count: usize,
    songs: &SongLibrary,
    recency: &RecencyScoreTable,
    already_selected: &HashSet<String>,
    overrides: Option<&[String]>,
    rng: &mut R,
) -> MomentSelection
where
    R: Rng + ?Sized,
{
    let mut excluded = already_selected.clone();
    let mut titles = Vec::with_capacity(count);

    for title in overrides.unwrap_or_default() {
        if titles.len() >= count {
            break;
        }
        if !songs.contains_key(title) {
            log::warn!("Override `{title}' for `{moment}' is not in the song library, skipping");
            continue;
        }
        if !excluded.insert(title.clone()) {
            log::warn!("Override `{title}' for `{moment}' is already selected, skipping");
            continue;
        }
        titles.push(title.clone());
    }
    let override_count = titles.len();

    let needed = count - override_count;
    if needed > 0 {
        titles.extend(
            score_candidates(moment, songs, recency, &excluded, rng)
                .into_iter()
                .take(needed)
                .map(|candidate| candidate.title),
        );
    }

    log::debug!(
        "Selected {}/{} song(s) for `{}' ({} override(s))",
        titles.len(),
        count,
        moment,
        override_count
    );

    MomentSelection {
        titles,
        override_count,
    }
}
