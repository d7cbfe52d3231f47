//! Event types: distinct kinds of service (main, youth, christmas...) each
//! with its own moment layout.
//!
//! Songs may be bound to specific event types. Unbound songs are available
//! to every event type.

use crate::config::default_moments;
use crate::error::ValidationError;
use crate::setlist::MomentConfig;
use crate::song::SongLibrary;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EVENT_TYPE_SLUG: &str = "main";
pub const DEFAULT_EVENT_TYPE_NAME: &str = "Main Event";
pub const MAX_SLUG_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Falls back to the default service layout when left empty.
    #[serde(default = "default_moments")]
    pub moments: MomentConfig,
}

impl EventType {
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: String::new(),
            moments: default_moments(),
        }
    }

    #[must_use]
    pub fn with_moments(mut self, moments: MomentConfig) -> Self {
        self.moments = if moments.is_empty() {
            default_moments()
        } else {
            moments
        };
        self
    }
}

/// Normalises and validates a slug.
///
/// Slugs are lowercase letters, digits and hyphens, at most 30 characters,
/// starting with a letter or digit. Input is trimmed and lowercased first.
///
/// # Errors
///
/// [`ValidationError::InvalidEventTypeSlug`] describing the first problem.
pub fn validate_event_type_slug(slug: &str) -> Result<String, ValidationError> {
    let slug = slug.trim().to_lowercase();
    let invalid = |reason: &str| ValidationError::InvalidEventTypeSlug {
        slug: slug.clone(),
        reason: reason.to_string(),
    };

    let Some(first) = slug.chars().next() else {
        return Err(invalid("slug cannot be empty"));
    };
    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(invalid("slug must be at most 30 characters"));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !allowed(first) || !slug.chars().all(|c| allowed(c) || c == '-') {
        return Err(invalid(
            "slugs must start with a letter or digit and contain only lowercase letters, digits, and hyphens",
        ));
    }

    Ok(slug)
}

/// The empty slug and `main` both mean the default event type.
#[must_use]
pub fn is_default_event_type(slug: &str) -> bool {
    slug.is_empty() || slug == DEFAULT_EVENT_TYPE_SLUG
}

/// Songs usable for `slug`: every unbound song plus those bound to it.
#[must_use]
pub fn filter_songs_for_event_type(songs: &SongLibrary, slug: &str) -> SongLibrary {
    songs
        .iter()
        .filter(|(_, song)| song.is_available_for_event_type(slug))
        .map(|(title, song)| (title.clone(), song.clone()))
        .collect()
}

/// Just the default event type, keyed by slug.
#[must_use]
pub fn default_event_types() -> IndexMap<String, EventType> {
    let mut main = EventType::new(DEFAULT_EVENT_TYPE_SLUG, DEFAULT_EVENT_TYPE_NAME);
    main.description = "Default service configuration".to_string();
    IndexMap::from([(DEFAULT_EVENT_TYPE_SLUG.to_string(), main)])
}
