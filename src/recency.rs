//! Freshness of songs relative to a target service date.
//!
//! A song's recency score decays exponentially back towards 1.0 after it is
//! used:
//!
//! ```text
//! score(days) = 1 - e^(-days / decay_days)
//! ```
//!
//! Never-used songs score exactly 1.0. With the default 45 day decay, a song
//! used a week ago scores about 0.14, six weeks ago about 0.63, and three
//! months ago about 0.86.
//!
//! Only services strictly before the target date count. Scores are always
//! computed as if the target date were "today", so regenerating an old
//! setlist is not skewed by services that came after it.

use crate::setlist::HistoryEntry;
use crate::song::Song;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Days for a song to feel "fresh" again.
pub const DEFAULT_DECAY_DAYS: u32 = 45;

/// Title to freshness in `[0, 1]` for one target date.
pub type RecencyScoreTable = HashMap<String, f64>;

/// Computes a freshness score for every song in `songs`.
///
/// History may come in any order. Entries dated on or after `target_date`
/// are ignored.
///
/// # Examples
///
/// ```
/// use setlister::recency::calculate_recency_scores;
/// use setlister::song::Song;
/// use chrono::NaiveDate;
///
/// let songs = vec![Song::new("Oceanos")];
/// let target = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
/// let scores = calculate_recency_scores(&songs, &[], target, 45);
/// assert_eq!(scores["Oceanos"], 1.0);
/// ```
#[must_use]
pub fn calculate_recency_scores<'a, I>(
    songs: I,
    history: &[HistoryEntry],
    target_date: NaiveDate,
    decay_days: u32,
) -> RecencyScoreTable
where
    I: IntoIterator<Item = &'a Song>,
{
    let last_used = last_used_dates(history, target_date);

    songs
        .into_iter()
        .map(|song| {
            let score = last_used
                .get(song.title.as_str())
                .map_or(1.0, |&used| {
                    decay_score((target_date - used).num_days(), decay_days)
                });
            log::trace!("Recency `{}' for `{}'.", score, song.title);
            (song.title.clone(), score)
        })
        .collect()
}

/// Most recent use strictly before `target_date`, per title.
fn last_used_dates(history: &[HistoryEntry], target_date: NaiveDate) -> HashMap<&str, NaiveDate> {
    let mut last_used: HashMap<&str, NaiveDate> = HashMap::new();

    for entry in history.iter().filter(|entry| entry.date < target_date) {
        for title in entry.moments.values().flatten() {
            last_used
                .entry(title.as_str())
                .and_modify(|date| *date = (*date).max(entry.date))
                .or_insert(entry.date);
        }
    }

    last_used
}

/// `1 - e^(-days / decay_days)`, with non-positive day counts scoring 0.
///
/// A `decay_days` of zero is treated as one day.
#[must_use]
pub fn decay_score(days_since: i64, decay_days: u32) -> f64 {
    if days_since <= 0 {
        return 0.0;
    }
    let decay = f64::from(decay_days.max(1));
    #[allow(clippy::cast_precision_loss)]
    let days = days_since as f64;
    1.0 - (-days / decay).exp()
}

/// One service a song appeared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongUsage {
    pub date: NaiveDate,
    pub label: Option<String>,
    /// Moments of that service the song was used in.
    pub moments: Vec<String>,
}

/// Every service `title` appeared in, oldest first.
#[must_use]
pub fn song_usage_history(title: &str, history: &[HistoryEntry]) -> Vec<SongUsage> {
    let mut usages: Vec<SongUsage> = history
        .iter()
        .filter_map(|entry| {
            let moments: Vec<String> = entry
                .moments
                .iter()
                .filter(|(_, songs)| songs.iter().any(|s| s == title))
                .map(|(moment, _)| moment.clone())
                .collect();

            (!moments.is_empty()).then(|| SongUsage {
                date: entry.date,
                label: entry.label.clone(),
                moments,
            })
        })
        .collect();

    usages.sort_by_key(|usage| usage.date);
    usages
}

/// Whole days between the last use of `title` before `target_date` and
/// `target_date`, or `None` if it was never used before then.
#[must_use]
pub fn days_since_last_use(
    title: &str,
    history: &[HistoryEntry],
    target_date: NaiveDate,
) -> Option<i64> {
    history
        .iter()
        .filter(|entry| entry.date < target_date)
        .filter(|entry| entry.moments.values().flatten().any(|s| s == title))
        .map(|entry| entry.date)
        .max()
        .map(|last| (target_date - last).num_days())
}
