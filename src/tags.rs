//! Compact weighted-tag strings.
//!
//! Songs are tagged with a string such as `louvor(5), prelúdio, ofertório(2)`.
//! A bare moment name takes the default weight; `name(weight)` sets it
//! explicitly. Weights must be integers in `1..=10`; anything else is rejected
//! rather than clamped, so a typo in the song database surfaces immediately.

use crate::error::ValidationError;
use crate::song::Tags;

pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 10;

/// Parses a tag string into a moment to weight mapping.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTagWeight`] when a weight is not an
/// integer, falls outside `1..=10`, or a token has an empty moment name or
/// unbalanced parentheses.
///
/// # Examples
///
/// ```
/// use setlister::tags::parse_tags;
///
/// let tags = parse_tags("louvor(5), prelúdio", 3)?;
/// assert_eq!(tags["louvor"], 5);
/// assert_eq!(tags["prelúdio"], 3);
/// # Ok::<(), setlister::error::ValidationError>(())
/// ```
pub fn parse_tags(raw: &str, default_weight: u8) -> Result<Tags, ValidationError> {
    let mut tags = Tags::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (moment, weight) = parse_token(token, default_weight)?;
        tags.insert(moment, weight);
    }

    Ok(tags)
}

fn parse_token(token: &str, default_weight: u8) -> Result<(String, u8), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidTagWeight {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let Some(open) = token.find('(') else {
        if token.contains(')') {
            return Err(invalid("unbalanced parentheses"));
        }
        return Ok((token.to_string(), default_weight));
    };

    let Some(inner) = token[open + 1..].strip_suffix(')') else {
        return Err(invalid("weight must be closed with ')'"));
    };

    let moment = token[..open].trim();
    if moment.is_empty() {
        return Err(invalid("moment name is empty"));
    }

    let weight: u8 = inner
        .trim()
        .parse()
        .map_err(|_| invalid("weight must be an integer between 1 and 10"))?;
    if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        return Err(invalid("weight must be an integer between 1 and 10"));
    }

    Ok((moment.to_string(), weight))
}

/// Renders tags back into the compact form, sorted by moment name.
///
/// Weights equal to `default_weight` are written as bare names, so
/// `parse_tags(&format_tags(t, d), d)` gives back `t`.
#[must_use]
pub fn format_tags(tags: &Tags, default_weight: u8) -> String {
    let mut entries: Vec<_> = tags.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    entries
        .into_iter()
        .map(|(moment, &weight)| {
            if weight == default_weight {
                moment.clone()
            } else {
                format!("{moment}({weight})")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_mapping() {
        assert!(parse_tags("", 3).unwrap().is_empty());
        assert!(parse_tags("   ", 3).unwrap().is_empty());
        assert!(parse_tags(" , ,", 3).unwrap().is_empty());
    }

    #[test]
    fn test_bare_name_gets_default_weight() {
        let tags = parse_tags("louvor", 3).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["louvor"], 3);
    }

    #[test]
    fn test_mixed_tokens_and_whitespace() {
        let tags = parse_tags("  louvor(5) ,prelúdio ,  poslúdio ( 2 ) ", 3).unwrap();
        assert_eq!(tags["louvor"], 5);
        assert_eq!(tags["prelúdio"], 3);
        assert_eq!(tags["poslúdio"], 2);
    }

    #[test]
    fn test_weight_bounds_are_inclusive() {
        assert_eq!(parse_tags("louvor(1)", 3).unwrap()["louvor"], 1);
        assert_eq!(parse_tags("louvor(10)", 3).unwrap()["louvor"], 10);
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        for raw in ["louvor(0)", "louvor(11)", "louvor(300)", "louvor(-1)"] {
            let err = parse_tags(raw, 3).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidTagWeight { .. }),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_integer_weight_rejected() {
        assert!(parse_tags("louvor(abc)", 3).is_err());
        assert!(parse_tags("louvor(2.5)", 3).is_err());
        assert!(parse_tags("louvor()", 3).is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert!(parse_tags("(5)", 3).is_err());
        assert!(parse_tags("louvor(5", 3).is_err());
        assert!(parse_tags("louvor5)", 3).is_err());
        assert!(parse_tags("louvor(5)x", 3).is_err());
    }

    #[test]
    fn test_error_carries_offending_token() {
        let err = parse_tags("prelúdio, louvor(42)", 3).unwrap_err();
        assert!(err.to_string().contains("louvor(42)"));
    }

    #[test]
    fn test_format_inverts_parse() {
        let tags = parse_tags("louvor(5),prelúdio,ofertório(2)", 3).unwrap();
        let rendered = format_tags(&tags, 3);
        assert_eq!(rendered, "louvor(5),ofertório(2),prelúdio");
        assert_eq!(parse_tags(&rendered, 3).unwrap(), tags);
    }
}
