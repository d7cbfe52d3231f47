//! Setlists and the service history they become once saved.

use crate::error::ValidationError;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Moment name to ordered song titles.
pub type Moments = IndexMap<String, Vec<String>>;

/// Moment name to required song count, in service order.
pub type MomentConfig = IndexMap<String, usize>;

/// The per-date assignment of songs to moments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setlist {
    pub date: NaiveDate,
    #[serde(default)]
    pub moments: Moments,
    /// Distinguishes several services on the same date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// A service that already happened. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub moments: Moments,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl Setlist {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            moments: Moments::new(),
            label: None,
            event_type: None,
        }
    }

    /// Songs of one moment, empty when the moment is absent.
    #[must_use]
    pub fn songs(&self, moment: &str) -> &[String] {
        self.moments.get(moment).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every title across all moments, in service order.
    pub fn titles(&self) -> impl Iterator<Item = &String> + '_ {
        self.moments.values().flatten()
    }

    /// Every `(moment, position)` slot, in service order.
    #[must_use]
    pub fn slots(&self) -> Vec<(String, usize)> {
        self.moments
            .iter()
            .flat_map(|(moment, songs)| (0..songs.len()).map(move |idx| (moment.clone(), idx)))
            .collect()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.moments.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.titles().any(|t| t == title)
    }

    /// True when no title appears twice anywhere in the setlist.
    #[must_use]
    pub fn has_unique_titles(&self) -> bool {
        let mut seen = HashSet::new();
        self.titles().all(|title| seen.insert(title))
    }

    /// Copy of this setlist with a different label. `None` removes it.
    #[must_use]
    pub fn relabel(&self, label: Option<&str>) -> Self {
        Self {
            label: label.filter(|l| !l.is_empty()).map(str::to_string),
            ..self.clone()
        }
    }
}

impl From<Setlist> for HistoryEntry {
    fn from(setlist: Setlist) -> Self {
        Self {
            date: setlist.date,
            moments: setlist.moments,
            label: setlist.label,
            event_type: setlist.event_type,
        }
    }
}

impl From<&HistoryEntry> for Setlist {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            date: entry.date,
            moments: entry.moments.clone(),
            label: entry.label.clone(),
            event_type: entry.event_type.clone(),
        }
    }
}

/// Locates the setlist a caller wants to edit.
///
/// With no `date`, the most recent entry wins (restricted to `event_type`
/// when one is given). With a date, `label` and `event_type` must match
/// exactly; `None` matches only entries without a label / event type.
///
/// # Errors
///
/// [`ValidationError::SetlistNotFound`] when history is empty or nothing matches.
pub fn find_target_setlist<'a>(
    history: &'a [HistoryEntry],
    date: Option<NaiveDate>,
    label: Option<&str>,
    event_type: Option<&str>,
) -> Result<&'a HistoryEntry, ValidationError> {
    if history.is_empty() {
        return Err(ValidationError::SetlistNotFound(
            "No setlists found in history".to_string(),
        ));
    }

    let Some(date) = date else {
        return history
            .iter()
            .filter(|entry| event_type.map_or(true, |et| entry.event_type.as_deref() == Some(et)))
            .max_by_key(|entry| entry.date)
            .ok_or_else(|| {
                ValidationError::SetlistNotFound(format!(
                    "No setlists found for event type '{}'",
                    event_type.unwrap_or_default()
                ))
            });
    };

    history
        .iter()
        .find(|entry| {
            entry.date == date
                && entry.label.as_deref() == label
                && entry.event_type.as_deref() == event_type
        })
        .ok_or_else(|| {
            let label_suffix = label.map(|l| format!(" (label: {l})")).unwrap_or_default();
            let type_suffix = event_type
                .map(|et| format!(" (event type: {et})"))
                .unwrap_or_default();
            ValidationError::SetlistNotFound(format!(
                "Setlist for date {date}{label_suffix}{type_suffix} not found"
            ))
        })
}
