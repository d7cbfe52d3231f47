//! Error types for setlist generation and editing.
//!
//! Two kinds of failure exist. [`ValidationError`] means the caller asked for
//! something malformed (unknown moment, bad position, bad tag string) and is
//! always raised before any setlist is touched. [`SetlistError::NoAvailableReplacement`]
//! means the request was fine but the song pool ran dry.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, SetlistError>;

/// Caller-input problems, detected before any mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A token in a tag string carried an unusable weight.
    #[error("Invalid tag '{token}': {reason}")]
    InvalidTagWeight { token: String, reason: String },

    #[error("Invalid moment '{moment}'. Valid: {}", valid.join(", "))]
    UnknownMoment { moment: String, valid: Vec<String> },

    #[error("No songs found in moment '{moment}'")]
    EmptyMoment { moment: String },

    /// Positions are 0-indexed; `len` is the moment's current song count.
    #[error("Position {position} out of range. Moment '{moment}' has {len} song(s) (0-{})", len.saturating_sub(1))]
    PositionOutOfRange {
        moment: String,
        position: usize,
        len: usize,
    },

    #[error("Song '{title}' not found in database")]
    SongNotFound { title: String },

    #[error("Song '{title}' is not tagged for moment '{moment}'")]
    SongNotTaggedForMoment { title: String, moment: String },

    #[error("Song '{title}' is already in the setlist (moment '{moment}')")]
    SongAlreadyInSetlist { title: String, moment: String },

    #[error("Position {position} of moment '{moment}' requested more than once")]
    DuplicateReplacementSlot { moment: String, position: usize },

    #[error("Moment '{moment}' must require at least one song (got {count})")]
    InvalidMomentCount { moment: String, count: usize },

    #[error("Invalid event type slug '{slug}': {reason}")]
    InvalidEventTypeSlug { slug: String, reason: String },

    #[error("{0}")]
    SetlistNotFound(String),
}

/// Every failure the engine can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetlistError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every eligible song for the slot is already in use.
    #[error("No available replacement songs for moment '{moment}' position {position}. All eligible songs may already be in the setlist.")]
    NoAvailableReplacement { moment: String, position: usize },
}

impl SetlistError {
    /// True when the caller's request was malformed rather than unsatisfiable.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_message_names_valid_range() {
        let err = ValidationError::PositionOutOfRange {
            moment: "louvor".to_string(),
            position: 7,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "Position 7 out of range. Moment 'louvor' has 4 song(s) (0-3)"
        );
    }

    #[test]
    fn test_unknown_moment_lists_valid_moments() {
        let err = ValidationError::UnknownMoment {
            moment: "ceia".to_string(),
            valid: vec!["prelúdio".to_string(), "louvor".to_string()],
        };
        assert!(err.to_string().ends_with("Valid: prelúdio, louvor"));
    }

    #[test]
    fn test_kind_is_distinguishable() {
        let validation: SetlistError = ValidationError::SongNotFound {
            title: "X".to_string(),
        }
        .into();
        let exhausted = SetlistError::NoAvailableReplacement {
            moment: "louvor".to_string(),
            position: 0,
        };
        assert!(validation.is_validation());
        assert!(!exhausted.is_validation());
    }
}
