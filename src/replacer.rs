//! Editing existing setlists: single-slot replacement, batch replacement,
//! and deriving a variant from a base setlist.
//!
//! Nothing here mutates its input. Every request is fully validated before
//! any song is chosen, so a rejected batch leaves no partial result behind.
//!
//! Auto-selected replacements reuse the moment scorer with an exclusion set
//! built from the titles that stay in the setlist:
//!
//! - single slot: every title except the one at the slot being replaced
//! - batch: every title outside the replaced slots, plus every title chosen
//!   earlier in the same batch
//!
//! Edited setlists keep the moment order of the setlist they came from.
//! Moment names are checked against the generator's layout, so setlists of
//! an event type are edited through a generator built with
//! [`SetlistGenerator::with_moments`] or the `*_for_event_type` methods.

use crate::algorithm::score_candidates;
use crate::error::{Result, SetlistError, ValidationError};
use crate::event_type::{filter_songs_for_event_type, is_default_event_type, EventType};
use crate::generator::SetlistGenerator;
use crate::ordering::apply_energy_ordering;
use crate::recency::RecencyScoreTable;
use crate::setlist::Setlist;
use chrono::NaiveDate;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

/// One slot of a batch replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotReplacement {
    pub moment: String,
    /// 0-indexed.
    pub position: usize,
    /// Caller-chosen title; `None` lets the scorer pick.
    pub manual: Option<String>,
}

impl SlotReplacement {
    #[must_use]
    pub fn auto(moment: impl Into<String>, position: usize) -> Self {
        Self {
            moment: moment.into(),
            position,
            manual: None,
        }
    }

    #[must_use]
    pub fn manual(moment: impl Into<String>, position: usize, title: impl Into<String>) -> Self {
        Self {
            moment: moment.into(),
            position,
            manual: Some(title.into()),
        }
    }
}

/// Titles that stay in `setlist` once the `vacated` slots are emptied.
fn retained_titles(setlist: &Setlist, vacated: &[(&str, usize)]) -> HashSet<String> {
    setlist
        .moments
        .iter()
        .flat_map(|(moment, songs)| {
            songs
                .iter()
                .enumerate()
                .filter(move |&(idx, _)| !vacated.contains(&(moment.as_str(), idx)))
                .map(|(_, title)| title.clone())
        })
        .collect()
}

impl SetlistGenerator<'_> {
    fn validate_slot(&self, setlist: &Setlist, moment: &str, position: usize) -> std::result::Result<(), ValidationError> {
        if !self.config.moments.contains_key(moment) {
            return Err(ValidationError::UnknownMoment {
                moment: moment.to_string(),
                valid: self.config.moments.keys().cloned().collect(),
            });
        }

        let songs = setlist.songs(moment);
        if songs.is_empty() {
            return Err(ValidationError::EmptyMoment {
                moment: moment.to_string(),
            });
        }
        if position >= songs.len() {
            return Err(ValidationError::PositionOutOfRange {
                moment: moment.to_string(),
                position,
                len: songs.len(),
            });
        }
        Ok(())
    }

    fn validate_manual(
        &self,
        setlist: &Setlist,
        moment: &str,
        title: &str,
        vacated: &[(&str, usize)],
    ) -> std::result::Result<(), ValidationError> {
        let song = self.songs.get(title).ok_or_else(|| ValidationError::SongNotFound {
            title: title.to_string(),
        })?;
        if !song.has_moment(moment) {
            return Err(ValidationError::SongNotTaggedForMoment {
                title: title.to_string(),
                moment: moment.to_string(),
            });
        }

        for (existing_moment, songs) in &setlist.moments {
            let taken = songs.iter().enumerate().any(|(idx, existing)| {
                existing == title && !vacated.contains(&(existing_moment.as_str(), idx))
            });
            if taken {
                return Err(ValidationError::SongAlreadyInSetlist {
                    title: title.to_string(),
                    moment: existing_moment.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks that `(moment, position)` names an existing slot and, when a
    /// manual title is given, that it exists, is tagged for `moment`, and is
    /// not already used elsewhere in `setlist`.
    ///
    /// # Errors
    ///
    /// The first [`ValidationError`] found.
    pub fn validate_replacement_request(
        &self,
        setlist: &Setlist,
        moment: &str,
        position: usize,
        manual: Option<&str>,
    ) -> std::result::Result<(), ValidationError> {
        self.validate_slot(setlist, moment, position)?;
        if let Some(title) = manual {
            self.validate_manual(setlist, moment, title, &[(moment, position)])?;
        }
        Ok(())
    }

    fn best_candidate<R>(
        &self,
        moment: &str,
        position: usize,
        recency: &RecencyScoreTable,
        excluded: &HashSet<String>,
        rng: &mut R,
    ) -> Result<String>
    where
        R: Rng + ?Sized,
    {
        score_candidates(moment, self.songs, recency, excluded, rng)
            .into_iter()
            .next()
            .map(|candidate| candidate.title)
            .ok_or_else(|| SetlistError::NoAvailableReplacement {
                moment: moment.to_string(),
                position,
            })
    }

    /// Resolves the song that should go into one slot.
    ///
    /// A manual title is validated and returned as is. Otherwise the best
    /// scoring song for `moment` is chosen, excluding every title in the
    /// setlist except the one currently at the slot.
    ///
    /// # Errors
    ///
    /// A [`ValidationError`] for a bad request, or
    /// [`SetlistError::NoAvailableReplacement`] when no eligible song is left.
    pub fn select_replacement_song<R>(
        &self,
        setlist: &Setlist,
        moment: &str,
        position: usize,
        manual: Option<&str>,
        rng: &mut R,
    ) -> Result<String>
    where
        R: Rng + ?Sized,
    {
        self.validate_replacement_request(setlist, moment, position, manual)?;
        if let Some(title) = manual {
            return Ok(title.to_string());
        }

        let excluded = retained_titles(setlist, &[(moment, position)]);
        let recency = self.recency_scores(setlist.date);
        self.best_candidate(moment, position, &recency, &excluded, rng)
    }

    /// Copy of `setlist` with the slot at `position` set to `replacement`.
    ///
    /// With `reorder_energy`, the moment is re-sorted treating every song as
    /// auto-selected, so the new song may not stay at `position`.
    ///
    /// # Errors
    ///
    /// A [`ValidationError`] when the moment or position is invalid.
    pub fn replace_song_in_setlist(
        &self,
        setlist: &Setlist,
        moment: &str,
        position: usize,
        replacement: &str,
        reorder_energy: bool,
    ) -> Result<Setlist> {
        self.validate_slot(setlist, moment, position)?;

        let mut updated = setlist.clone();
        if let Some(songs) = updated.moments.get_mut(moment) {
            let previous = std::mem::replace(&mut songs[position], replacement.to_string());
            log::info!("Replaced `{previous}' with `{replacement}' in `{moment}' position {position}");

            if reorder_energy {
                *songs = apply_energy_ordering(songs, moment, self.songs, 0, &self.config.energy_settings());
            }
        }
        Ok(updated)
    }

    /// Replaces several slots at once.
    ///
    /// Every slot and every manual title is validated before anything is
    /// chosen. Auto slots are filled in request order so that no two
    /// replacements in one batch pick the same song. Each affected moment is
    /// energy-ordered once at the end.
    ///
    /// # Errors
    ///
    /// [`ValidationError::DuplicateReplacementSlot`] when a slot is requested
    /// twice, any other [`ValidationError`] from slot or manual validation,
    /// or [`SetlistError::NoAvailableReplacement`] when an auto slot runs out
    /// of candidates.
    pub fn replace_songs_batch<R>(
        &self,
        setlist: &Setlist,
        replacements: &[SlotReplacement],
        rng: &mut R,
    ) -> Result<Setlist>
    where
        R: Rng + ?Sized,
    {
        let vacated: Vec<(&str, usize)> = replacements
            .iter()
            .map(|r| (r.moment.as_str(), r.position))
            .collect();

        let mut seen = HashSet::new();
        for replacement in replacements {
            if !seen.insert((replacement.moment.as_str(), replacement.position)) {
                return Err(ValidationError::DuplicateReplacementSlot {
                    moment: replacement.moment.clone(),
                    position: replacement.position,
                }
                .into());
            }
            self.validate_slot(setlist, &replacement.moment, replacement.position)?;
        }

        let mut excluded = retained_titles(setlist, &vacated);
        for replacement in replacements {
            if let Some(title) = &replacement.manual {
                self.validate_manual(setlist, &replacement.moment, title, &vacated)?;
                if !excluded.insert(title.clone()) {
                    return Err(ValidationError::SongAlreadyInSetlist {
                        title: title.clone(),
                        moment: replacement.moment.clone(),
                    }
                    .into());
                }
            }
        }

        let recency = if replacements.iter().any(|r| r.manual.is_none()) {
            self.recency_scores(setlist.date)
        } else {
            RecencyScoreTable::new()
        };

        let mut chosen = Vec::with_capacity(replacements.len());
        for replacement in replacements {
            let title = match &replacement.manual {
                Some(title) => title.clone(),
                None => {
                    let title =
                        self.best_candidate(&replacement.moment, replacement.position, &recency, &excluded, rng)?;
                    excluded.insert(title.clone());
                    title
                }
            };
            chosen.push(title);
        }

        let mut updated = setlist.clone();
        let mut affected: Vec<&str> = Vec::new();
        for (replacement, title) in replacements.iter().zip(chosen) {
            let moment = replacement.moment.as_str();
            if let Some(songs) = updated.moments.get_mut(moment) {
                let previous = std::mem::replace(&mut songs[replacement.position], title);
                log::info!(
                    "Replaced `{}' with `{}' in `{}' position {}",
                    previous,
                    songs[replacement.position],
                    moment,
                    replacement.position
                );
            }
            if !affected.contains(&moment) {
                affected.push(moment);
            }
        }

        let energy = self.config.energy_settings();
        for moment in affected {
            if let Some(songs) = updated.moments.get_mut(moment) {
                *songs = apply_energy_ordering(songs, moment, self.songs, 0, &energy);
            }
        }
        Ok(updated)
    }

    /// Builds a variant of `base` by auto-replacing randomly chosen slots.
    ///
    /// `Some(0)` returns an exact copy. `None` replaces a number of slots
    /// drawn uniformly from `1..=total`. `Some(k)` replaces `min(k, total)`
    /// distinct slots. Label and event type are carried over unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Self::replace_songs_batch`].
    pub fn derive_setlist<R>(&self, base: &Setlist, replace_count: Option<usize>, rng: &mut R) -> Result<Setlist>
    where
        R: Rng + ?Sized,
    {
        let slots = base.slots();
        let total = slots.len();
        if total == 0 {
            return Ok(base.clone());
        }

        let count = match replace_count {
            Some(k) => k.min(total),
            None => rng.gen_range(1..=total),
        };
        if count == 0 {
            return Ok(base.clone());
        }

        log::debug!("Deriving setlist from {} by replacing {count} of {total} slot(s)", base.date);
        let replacements: Vec<SlotReplacement> = index::sample(rng, total, count)
            .into_iter()
            .map(|idx| {
                let (moment, position) = &slots[idx];
                SlotReplacement::auto(moment.clone(), *position)
            })
            .collect();

        self.replace_songs_batch(base, &replacements, rng)
    }

    /// [`Self::derive_setlist`] restricted to the songs available to
    /// `event_type` and validated against its moment layout. The result is
    /// tagged with the event type unless it is the default.
    ///
    /// # Errors
    ///
    /// Same as [`Self::derive_setlist`].
    pub fn derive_setlist_for_event_type<R>(
        &self,
        base: &Setlist,
        replace_count: Option<usize>,
        event_type: &EventType,
        rng: &mut R,
    ) -> Result<Setlist>
    where
        R: Rng + ?Sized,
    {
        let available = filter_songs_for_event_type(self.songs, &event_type.slug);
        let mut derived = self.scoped(&available, &event_type.moments, |scoped| {
            scoped.derive_setlist(base, replace_count, rng)
        })?;
        derived.event_type = (!is_default_event_type(&event_type.slug)).then(|| event_type.slug.clone());
        Ok(derived)
    }

    /// Copy of `base` moved to another date, for reusing a service plan.
    #[must_use]
    pub fn reschedule(&self, base: &Setlist, date: NaiveDate) -> Setlist {
        Setlist { date, ..base.clone() }
    }
}
