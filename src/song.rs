use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Moment name to weight (1-10).
pub type Tags = HashMap<String, u8>;

/// Every known song, keyed by title.
///
/// Insertion order is kept so that a seeded random source walks the
/// candidates in the same order on every run.
pub type SongLibrary = IndexMap<String, Song>;

/// A song as handed over by the data-access layer, reduced to what the
/// engine reads.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique key across the library.
    pub title: String,
    /// Intensity on a 1-4 scale.
    /// `None` means the song was never rated; the configured default applies.
    #[serde(default)]
    pub energy: Option<f64>,
    /// Which moments the song may fill, and how strongly it is preferred there.
    #[serde(default)]
    pub tags: Tags,
    /// Chord sheet. Never looked at by the engine.
    #[serde(default)]
    pub content: String,
    /// Event types this song is bound to.
    /// Empty means the song is usable for every event type.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub event_types: BTreeSet<String>,
}

impl Song {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tag(mut self, moment: impl Into<String>, weight: u8) -> Self {
        self.tags.insert(moment.into(), weight);
        self
    }

    #[must_use]
    pub const fn with_energy(mut self, energy: f64) -> Self {
        self.energy = Some(energy);
        self
    }

    #[must_use]
    pub fn with_event_type(mut self, slug: impl Into<String>) -> Self {
        self.event_types.insert(slug.into());
        self
    }

    /// Weight for `moment`, or `None` when the song is not tagged for it.
    #[must_use]
    pub fn weight(&self, moment: &str) -> Option<u8> {
        self.tags.get(moment).copied()
    }

    #[must_use]
    pub fn has_moment(&self, moment: &str) -> bool {
        self.tags.contains_key(moment)
    }

    /// Energy, falling back to `default` for unrated songs.
    #[must_use]
    pub fn energy_or(&self, default: f64) -> f64 {
        self.energy.unwrap_or(default)
    }

    /// Unbound songs are available everywhere; bound songs only for their
    /// listed event types.
    #[must_use]
    pub fn is_available_for_event_type(&self, slug: &str) -> bool {
        self.event_types.is_empty() || self.event_types.contains(slug)
    }
}

/// Builds a [`SongLibrary`] keyed by each song's title.
///
/// Later songs with a duplicate title replace earlier ones.
pub fn library_from<I>(songs: I) -> SongLibrary
where
    I: IntoIterator<Item = Song>,
{
    songs
        .into_iter()
        .map(|song| (song.title.clone(), song))
        .collect()
}
