//! Energy-based ordering for building an emotional arc within a moment.
//!
//! Overridden songs keep their caller-given positions at the front; only the
//! auto-selected tail is re-sorted. The sort is stable, so songs of equal
//! energy keep the order the selector ranked them in.

use crate::config::GenerationConfig;
use crate::song::SongLibrary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Default for songs without energy metadata.
pub const DEFAULT_ENERGY: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyDirection {
    /// Low to high: 1 -> 4 (upbeat to worship).
    Ascending,
    /// High to low: 4 -> 1.
    Descending,
}

/// Energy ordering tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySettings {
    pub enabled: bool,
    pub rules: HashMap<String, EnergyDirection>,
    pub default_energy: f64,
}

impl Default for EnergySettings {
    /// The energy part of [`GenerationConfig::default`].
    fn default() -> Self {
        GenerationConfig::default().energy_settings()
    }
}

impl EnergySettings {
    /// The rule for `moment`, or `None` when ordering does not apply.
    #[must_use]
    pub fn rule_for(&self, moment: &str) -> Option<EnergyDirection> {
        if !self.enabled {
            return None;
        }
        self.rules.get(moment).copied()
    }
}

/// Reorders `titles` by energy according to the rule for `moment`.
///
/// The first `override_count` titles are left exactly as given. Titles
/// unknown to `songs` sort with the default energy.
///
/// # Examples
///
/// ```
/// use setlister::ordering::{apply_energy_ordering, EnergySettings};
/// use setlister::song::{library_from, Song};
///
/// let songs = library_from(vec![
///     Song::new("A").with_energy(1.0),
///     Song::new("B").with_energy(2.0),
///     Song::new("C").with_energy(4.0),
/// ]);
/// let titles: Vec<String> = ["C", "A", "B"].iter().map(|s| s.to_string()).collect();
///
/// let ordered = apply_energy_ordering(&titles, "louvor", &songs, 1, &EnergySettings::default());
/// assert_eq!(ordered, vec!["C", "A", "B"]);
///
/// let ordered = apply_energy_ordering(&titles, "louvor", &songs, 0, &EnergySettings::default());
/// assert_eq!(ordered, vec!["A", "B", "C"]);
/// ```
#[must_use]
pub fn apply_energy_ordering(
    titles: &[String],
    moment: &str,
    songs: &SongLibrary,
    override_count: usize,
    settings: &EnergySettings,
) -> Vec<String> {
    let Some(direction) = settings.rule_for(moment) else {
        return titles.to_vec();
    };

    let split = override_count.min(titles.len());
    let (frozen, auto) = titles.split_at(split);

    let energy_of = |title: &String| {
        songs
            .get(title)
            .map_or(settings.default_energy, |song| song.energy_or(settings.default_energy))
    };

    let mut keyed: Vec<(f64, &String)> = auto.iter().map(|t| (energy_of(t), t)).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
        match direction {
            EnergyDirection::Ascending => ord,
            EnergyDirection::Descending => ord.reverse(),
        }
    });

    frozen
        .iter()
        .cloned()
        .chain(keyed.into_iter().map(|(_, t)| t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::{library_from, Song};

    fn songs() -> SongLibrary {
        library_from(vec![
            Song::new("Upbeat").with_energy(1.0),
            Song::new("Moderate").with_energy(2.0),
            Song::new("Reflective").with_energy(3.0),
            Song::new("Worship").with_energy(4.0),
            Song::new("Unrated"),
            Song::new("Also Moderate").with_energy(2.0),
        ])
    }

    fn owned(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    fn descending_settings() -> EnergySettings {
        EnergySettings {
            rules: HashMap::from([("ofertório".to_string(), EnergyDirection::Descending)]),
            ..EnergySettings::default()
        }
    }

    #[test]
    fn test_ascending() {
        let input = owned(&["Worship", "Upbeat", "Reflective", "Moderate"]);
        let out = apply_energy_ordering(&input, "louvor", &songs(), 0, &EnergySettings::default());
        assert_eq!(out, owned(&["Upbeat", "Moderate", "Reflective", "Worship"]));
    }

    #[test]
    fn test_descending() {
        let input = owned(&["Upbeat", "Worship", "Moderate"]);
        let out = apply_energy_ordering(&input, "ofertório", &songs(), 0, &descending_settings());
        assert_eq!(out, owned(&["Worship", "Moderate", "Upbeat"]));
    }

    #[test]
    fn test_disabled_or_no_rule_is_identity() {
        let input = owned(&["Worship", "Upbeat"]);
        let disabled = EnergySettings {
            enabled: false,
            ..EnergySettings::default()
        };
        assert_eq!(apply_energy_ordering(&input, "louvor", &songs(), 0, &disabled), input);
        assert_eq!(
            apply_energy_ordering(&input, "prelúdio", &songs(), 0, &EnergySettings::default()),
            input
        );
    }

    #[test]
    fn test_unrated_and_unknown_use_default_energy() {
        let input = owned(&["Reflective", "Unrated", "Ghost", "Moderate"]);
        let out = apply_energy_ordering(&input, "louvor", &songs(), 0, &EnergySettings::default());
        assert_eq!(out, owned(&["Moderate", "Unrated", "Ghost", "Reflective"]));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let input = owned(&["Also Moderate", "Moderate"]);
        let out = apply_energy_ordering(&input, "louvor", &songs(), 0, &EnergySettings::default());
        assert_eq!(out, input);

        let out = apply_energy_ordering(&input, "ofertório", &songs(), 0, &descending_settings());
        assert_eq!(out, input);
    }

    #[test]
    fn test_prefix_preserved_for_every_k() {
        let input = owned(&["Worship", "Reflective", "Upbeat", "Moderate", "Unrated"]);
        for k in 0..=input.len() + 1 {
            let out = apply_energy_ordering(&input, "louvor", &songs(), k, &EnergySettings::default());
            let frozen = k.min(input.len());
            assert_eq!(out[..frozen], input[..frozen], "prefix of {k}");
            assert_eq!(out.len(), input.len());

            let mut sorted_in = input.clone();
            let mut sorted_out = out.clone();
            sorted_in.sort();
            sorted_out.sort();
            assert_eq!(sorted_in, sorted_out, "same multiset for {k}");
        }
    }

    #[test]
    fn test_idempotent() {
        let input = owned(&["Reflective", "Upbeat", "Worship", "Moderate", "Also Moderate"]);
        for settings in [EnergySettings::default(), descending_settings()] {
            for moment in ["louvor", "ofertório"] {
                let once = apply_energy_ordering(&input, moment, &songs(), 1, &settings);
                let twice = apply_energy_ordering(&once, moment, &songs(), 1, &settings);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_default_settings_follow_generation_defaults() {
        let settings = EnergySettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.rule_for("louvor"), Some(EnergyDirection::Ascending));
        assert_eq!(settings.default_energy, DEFAULT_ENERGY);

        let config = GenerationConfig::default();
        assert_eq!(settings.rules, config.energy_ordering_rules);
        assert_eq!(settings.default_energy, config.default_energy);
    }

    #[test]
    fn test_direction_serde_is_lowercase() {
        let json = serde_json::to_string(&EnergyDirection::Descending).unwrap();
        assert_eq!(json, "\"descending\"");
        let parsed: EnergyDirection = serde_json::from_str("\"ascending\"").unwrap();
        assert_eq!(parsed, EnergyDirection::Ascending);
    }
}
