//! # Setlist Generation
//!
//! [`SetlistGenerator`] drives the per-moment pieces across a whole service:
//!
//! 1. Recency scores are computed once for the target date.
//! 2. Moments are filled in configuration order. Each moment's selection
//!    excludes every title already placed in an earlier moment, so no song
//!    appears twice anywhere in one setlist.
//! 3. Each moment is energy-ordered, leaving its overrides in front.
//!
//! A moment whose eligible pool is smaller than its configured count is
//! left short rather than failing the whole generation; the shortfall is
//! reported in [`GenerationReport`].
//!
//! Editing an existing setlist (replacement, derivation) lives in
//! [`crate::replacer`].

use crate::algorithm::select_songs_for_moment;
use crate::config::{validate_moments, GenerationConfig};
use crate::error::Result;
use crate::event_type::{filter_songs_for_event_type, is_default_event_type, EventType};
use crate::ordering::apply_energy_ordering;
use crate::recency::{calculate_recency_scores, RecencyScoreTable};
use crate::setlist::{HistoryEntry, MomentConfig, Setlist};
use crate::song::SongLibrary;
use chrono::NaiveDate;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Caller-chosen titles per moment, placed before any scored selection.
pub type Overrides = HashMap<String, Vec<String>>;

/// A moment that ended up with fewer songs than configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub moment: String,
    pub requested: usize,
    pub selected: usize,
}

/// A generated setlist plus any moments that could not be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub setlist: Setlist,
    pub shortfalls: Vec<Shortfall>,
}

impl GenerationReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Generates and edits setlists over one snapshot of songs and history.
///
/// Only borrows its inputs; every operation returns a new [`Setlist`].
///
/// # Examples
///
/// ```
/// use setlister::generator::{Overrides, SetlistGenerator};
/// use setlister::setlist::MomentConfig;
/// use setlister::song::{library_from, Song};
/// use chrono::NaiveDate;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let songs = library_from(vec![
///     Song::new("A").with_tag("louvor", 5).with_energy(1.0),
///     Song::new("B").with_tag("louvor", 3).with_energy(2.0),
///     Song::new("C").with_tag("louvor", 5).with_energy(4.0),
/// ]);
/// let moments: MomentConfig = [("louvor".to_string(), 3)].into_iter().collect();
/// let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
///
/// let generator = SetlistGenerator::new(&songs, &[]);
/// let setlist = generator.generate(date, &moments, &Overrides::new(), &mut StdRng::seed_from_u64(1))?;
/// assert_eq!(setlist.moments["louvor"], vec!["A", "B", "C"]);
/// # Ok::<(), setlister::error::SetlistError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SetlistGenerator<'a> {
    pub(crate) songs: &'a SongLibrary,
    pub(crate) history: &'a [HistoryEntry],
    pub(crate) config: GenerationConfig,
}

impl<'a> SetlistGenerator<'a> {
    /// Generator with the default configuration.
    #[must_use]
    pub fn new(songs: &'a SongLibrary, history: &'a [HistoryEntry]) -> Self {
        Self {
            songs,
            history,
            config: GenerationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn songs(&self) -> &'a SongLibrary {
        self.songs
    }

    #[must_use]
    pub const fn history(&self) -> &'a [HistoryEntry] {
        self.history
    }

    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Freshness of every song as of `date`.
    #[must_use]
    pub fn recency_scores(&self, date: NaiveDate) -> RecencyScoreTable {
        calculate_recency_scores(self.songs.values(), self.history, date, self.config.decay_days)
    }

    /// Same generator with a different moment layout, e.g. an event type's.
    #[must_use]
    pub fn with_moments(mut self, moments: MomentConfig) -> Self {
        self.config.moments = moments;
        self
    }

    /// Runs `f` against a generator restricted to `songs` and laid out with
    /// `moments`, sharing history and the other tunables.
    pub(crate) fn scoped<T>(
        &self,
        songs: &SongLibrary,
        moments: &MomentConfig,
        f: impl FnOnce(&SetlistGenerator<'_>) -> T,
    ) -> T {
        let scoped = SetlistGenerator {
            songs,
            history: self.history,
            config: self.config.with_moments(moments.clone()),
        };
        f(&scoped)
    }

    /// Generates a complete setlist for `date`.
    ///
    /// Short moments are logged at `warn`; use [`Self::generate_with_report`]
    /// to inspect them.
    ///
    /// # Errors
    ///
    /// [`crate::error::ValidationError::InvalidMomentCount`] when a moment
    /// requires zero songs.
    pub fn generate<R>(
        &self,
        date: NaiveDate,
        moments: &MomentConfig,
        overrides: &Overrides,
        rng: &mut R,
    ) -> Result<Setlist>
    where
        R: Rng + ?Sized,
    {
        let report = self.generate_with_report(date, moments, overrides, rng)?;
        for shortfall in &report.shortfalls {
            log::warn!(
                "Moment `{}' has {} of {} song(s); not enough eligible songs",
                shortfall.moment,
                shortfall.selected,
                shortfall.requested
            );
        }
        Ok(report.setlist)
    }

    /// Generates a setlist and reports which moments came up short.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_with_report<R>(
        &self,
        date: NaiveDate,
        moments: &MomentConfig,
        overrides: &Overrides,
        rng: &mut R,
    ) -> Result<GenerationReport>
    where
        R: Rng + ?Sized,
    {
        validate_moments(moments)?;
        for moment in overrides.keys().filter(|m| !moments.contains_key(*m)) {
            log::warn!("Overrides given for unknown moment `{moment}', ignoring");
        }

        log::debug!(
            "Generating setlist for {} from {} song(s) and {} history entr(ies)",
            date,
            self.songs.len(),
            self.history.len()
        );

        let recency = self.recency_scores(date);
        let energy = self.config.energy_settings();
        let mut setlist = Setlist::new(date);
        let mut already_selected: HashSet<String> = HashSet::new();
        let mut shortfalls = Vec::new();

        for (moment, &count) in moments {
            let selection = select_songs_for_moment(
                moment,
                count,
                self.songs,
                &recency,
                &already_selected,
                overrides.get(moment).map(Vec::as_slice),
                rng,
            );

            if selection.len() < count {
                shortfalls.push(Shortfall {
                    moment: moment.clone(),
                    requested: count,
                    selected: selection.len(),
                });
            }
            already_selected.extend(selection.titles.iter().cloned());

            let ordered = apply_energy_ordering(
                &selection.titles,
                moment,
                self.songs,
                selection.override_count,
                &energy,
            );
            setlist.moments.insert(moment.clone(), ordered);
        }

        Ok(GenerationReport {
            setlist,
            shortfalls,
        })
    }

    /// Generates with the configured moment layout.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_default<R>(&self, date: NaiveDate, overrides: &Overrides, rng: &mut R) -> Result<Setlist>
    where
        R: Rng + ?Sized,
    {
        self.generate(date, &self.config.moments, overrides, rng)
    }

    /// Generates for an event type: only songs available to it, its own
    /// moment layout, and the slug recorded on the setlist (unless it is the
    /// default event type).
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_for_event_type<R>(
        &self,
        date: NaiveDate,
        event_type: &EventType,
        overrides: &Overrides,
        rng: &mut R,
    ) -> Result<GenerationReport>
    where
        R: Rng + ?Sized,
    {
        let available = filter_songs_for_event_type(self.songs, &event_type.slug);
        let mut report = self.scoped(&available, &event_type.moments, |scoped| {
            scoped.generate_with_report(date, &event_type.moments, overrides, rng)
        })?;

        if !is_default_event_type(&event_type.slug) {
            report.setlist.event_type = Some(event_type.slug.clone());
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setlist::Moments;
    use crate::song::{library_from, Song};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn moments(pairs: &[(&str, usize)]) -> MomentConfig {
        pairs.iter().map(|(m, c)| (m.to_string(), *c)).collect()
    }

    fn abc() -> SongLibrary {
        library_from(vec![
            Song::new("A").with_tag("louvor", 5).with_energy(1.0),
            Song::new("B").with_tag("louvor", 3).with_energy(2.0),
            Song::new("C").with_tag("louvor", 5).with_energy(4.0),
        ])
    }

    fn service_library() -> SongLibrary {
        library_from(vec![
            Song::new("Upbeat Song").with_tag("louvor", 3).with_tag("prelúdio", 3).with_energy(1.0),
            Song::new("Moderate Song").with_tag("louvor", 3).with_tag("saudação", 3).with_energy(2.0),
            Song::new("Reflective Song").with_tag("louvor", 3).with_tag("ofertório", 3).with_energy(3.0),
            Song::new("Worship Song").with_tag("louvor", 3).with_tag("poslúdio", 3).with_energy(4.0),
            Song::new("Kids Song").with_tag("crianças", 3).with_energy(1.5),
            Song::new("Extra Song").with_tag("louvor", 3).with_tag("prelúdio", 2).with_energy(2.5),
            Song::new("Another").with_tag("louvor", 2).with_tag("poslúdio", 2).with_energy(3.5),
        ])
    }

    #[test]
    fn test_energy_ordered_when_pool_exact() {
        let songs = abc();
        let generator = SetlistGenerator::new(&songs, &[]);
        for seed in 0..20 {
            let setlist = generator
                .generate(
                    date("2026-02-15"),
                    &moments(&[("louvor", 3)]),
                    &Overrides::new(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
            assert_eq!(setlist.moments["louvor"], vec!["A", "B", "C"]);
        }
    }

    #[test]
    fn test_override_stays_first_despite_energy() {
        let songs = abc();
        let generator = SetlistGenerator::new(&songs, &[]);
        let overrides = Overrides::from([("louvor".to_string(), vec!["C".to_string()])]);
        let setlist = generator
            .generate(
                date("2026-02-15"),
                &moments(&[("louvor", 3)]),
                &overrides,
                &mut StdRng::seed_from_u64(3),
            )
            .unwrap();
        assert_eq!(setlist.moments["louvor"], vec!["C", "A", "B"]);
    }

    #[test]
    fn test_no_title_repeats_across_moments() {
        let songs = service_library();
        let generator = SetlistGenerator::new(&songs, &[]);
        for seed in 0..50 {
            let report = generator
                .generate_with_report(
                    date("2026-02-15"),
                    &generator.config().moments.clone(),
                    &Overrides::new(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
            assert!(report.setlist.has_unique_titles(), "seed {seed}");
        }
    }

    #[test]
    fn test_moments_follow_config_order() {
        let songs = service_library();
        let generator = SetlistGenerator::new(&songs, &[]);
        let setlist = generator
            .generate_default(date("2026-02-15"), &Overrides::new(), &mut StdRng::seed_from_u64(8))
            .unwrap();
        let keys: Vec<_> = setlist.moments.keys().cloned().collect();
        let expected: Vec<_> = generator.config().moments.keys().cloned().collect();
        assert_eq!(keys, expected);
        assert_eq!(setlist.date, date("2026-02-15"));
    }

    #[test]
    fn test_shortfall_reported_not_fatal() {
        let songs = abc();
        let generator = SetlistGenerator::new(&songs, &[]);
        let report = generator
            .generate_with_report(
                date("2026-02-15"),
                &moments(&[("louvor", 5), ("poslúdio", 1)]),
                &Overrides::new(),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.setlist.songs("louvor").len(), 3);
        assert!(report.setlist.songs("poslúdio").is_empty());
        assert_eq!(
            report.shortfalls,
            vec![
                Shortfall {
                    moment: "louvor".to_string(),
                    requested: 5,
                    selected: 3
                },
                Shortfall {
                    moment: "poslúdio".to_string(),
                    requested: 1,
                    selected: 0
                },
            ]
        );
    }

    #[test]
    fn test_zero_count_moment_rejected() {
        let songs = abc();
        let generator = SetlistGenerator::new(&songs, &[]);
        let err = generator
            .generate(
                date("2026-02-15"),
                &moments(&[("louvor", 0)]),
                &Overrides::new(),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_recently_used_songs_avoided() {
        let songs = library_from(vec![
            Song::new("Old").with_tag("louvor", 3),
            Song::new("Yesterday").with_tag("louvor", 3),
        ]);
        let mut used = Moments::new();
        used.insert("louvor".to_string(), vec!["Yesterday".to_string()]);
        let history = vec![HistoryEntry {
            date: date("2026-02-14"),
            moments: used,
            label: None,
            event_type: None,
        }];
        let generator = SetlistGenerator::new(&songs, &history);

        for seed in 0..20 {
            let setlist = generator
                .generate(
                    date("2026-02-15"),
                    &moments(&[("louvor", 1)]),
                    &Overrides::new(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
            assert_eq!(setlist.moments["louvor"], vec!["Old"]);
        }
    }

    #[test]
    fn test_same_seed_same_setlist() {
        let songs = service_library();
        let generator = SetlistGenerator::new(&songs, &[]);
        let run = |seed| {
            generator
                .generate_default(date("2026-02-15"), &Overrides::new(), &mut StdRng::seed_from_u64(seed))
                .unwrap()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_event_type_generation_filters_and_tags() {
        let songs = library_from(vec![
            Song::new("Shared").with_tag("louvor", 3),
            Song::new("Youth Only").with_tag("louvor", 3).with_event_type("youth"),
            Song::new("Christmas Only").with_tag("louvor", 10).with_event_type("christmas"),
        ]);
        let generator = SetlistGenerator::new(&songs, &[]);
        let youth = EventType::new("youth", "Youth").with_moments(moments(&[("louvor", 3)]));

        let report = generator
            .generate_for_event_type(date("2026-02-15"), &youth, &Overrides::new(), &mut StdRng::seed_from_u64(2))
            .unwrap();

        assert_eq!(report.setlist.event_type.as_deref(), Some("youth"));
        assert_eq!(report.setlist.songs("louvor").len(), 2);
        assert!(!report.setlist.contains("Christmas Only"));
    }
}
