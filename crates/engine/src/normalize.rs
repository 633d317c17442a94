//! Address-to-key normalization.
//!
//! Turns a free-text address into a canonical matching key plus the
//! metadata (building name, street-number range) the joiner consults when
//! two keys collide.

use regex::Regex;

use crate::config::MatchConfig;
use crate::error::MatchError;

/// Street-number range captured from a key-column value. Endpoints are the
/// source digit sequences, kept as strings; they never influence the match
/// decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRange {
    pub min: String,
    pub max: String,
}

/// Result of normalizing one key-column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub key: String,
    /// Cleansed non-numeric prefix preceding the house number, if any.
    /// Not part of the key.
    pub building_name: Option<String>,
    pub range: Option<NumberRange>,
}

/// Compiles the normalization pipeline once from a [`MatchConfig`].
#[derive(Debug)]
pub struct KeyNormalizer {
    building_re: Regex,
    range_re: Regex,
    strip_re: Regex,
    spaces_re: Regex,
    rewrites: Vec<(Regex, String)>,
    range_separators: Vec<char>,
}

impl KeyNormalizer {
    pub fn new(config: &MatchConfig) -> Result<Self, MatchError> {
        let mut rewrites = Vec::with_capacity(config.rewrites.len());
        for rule in &config.rewrites {
            let re = Regex::new(&rule.pattern).map_err(|e| {
                MatchError::ConfigValidation(format!(
                    "rewrite pattern '{}' does not compile: {e}",
                    rule.pattern
                ))
            })?;
            rewrites.push((re, rule.replacement.clone()));
        }

        Ok(Self {
            building_re: Regex::new(r"^(?P<building_name>[^\d]+\s+)\d+[\s\W]+").unwrap(),
            range_re: Regex::new(
                r"^(?P<range_min>\d+)\s*(?P<separator>[^\d\s])\s*(?P<range_max>\d+)",
            )
            .unwrap(),
            strip_re: Regex::new(r"[^\w\s]").unwrap(),
            spaces_re: Regex::new(r"\s+").unwrap(),
            rewrites,
            range_separators: config.range_separators.clone(),
        })
    }

    /// Normalize one raw key-column value.
    ///
    /// Steps, in order: lowercase; trim; building-name extraction (a leading
    /// non-digit run followed by a house number moves to metadata); range
    /// detection (`<num><sep><num>` is recorded, and rewritten to
    /// `<min> to <max>` when the separator is recognized); cleansing.
    /// Produced keys re-normalize to themselves unless cleansing exposed a
    /// leading building-name shape the first pass could not see.
    pub fn normalize(&self, address: &str) -> NormalizedAddress {
        let mut working = address.to_lowercase().trim().to_string();

        let mut building_name = None;
        if let Some(caps) = self.building_re.captures(&working) {
            let prefix = caps.name("building_name").unwrap();
            building_name = Some(self.cleanse(prefix.as_str()));
            let prefix_end = prefix.end();
            working.drain(..prefix_end);
        }

        let mut range = None;
        if let Some(caps) = self.range_re.captures(&working) {
            let min = caps.name("range_min").unwrap().as_str().to_string();
            let max = caps.name("range_max").unwrap().as_str().to_string();
            let separator = caps.name("separator").unwrap().as_str();
            let separator = separator.chars().next().unwrap();
            let span_end = caps.get(0).unwrap().end();
            if self.range_separators.contains(&separator) {
                working = format!("{min} to {max}{}", &working[span_end..]);
            }
            range = Some(NumberRange { min, max });
        }

        NormalizedAddress {
            key: self.cleanse(&working),
            building_name,
            range,
        }
    }

    /// Strip non-word non-whitespace characters, apply the configured
    /// rewrites in order, collapse whitespace runs, trim.
    fn cleanse(&self, s: &str) -> String {
        let mut s = self.strip_re.replace_all(s, "").into_owned();
        for (re, replacement) in &self.rewrites {
            s = re.replace_all(&s, replacement.as_str()).into_owned();
        }
        let s = self.spaces_re.replace_all(&s, " ");
        s.trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn norm() -> KeyNormalizer {
        KeyNormalizer::new(&MatchConfig::default()).unwrap()
    }

    #[test]
    fn building_name_extracted_and_cleansed() {
        let n = norm().normalize("The Cornerhouse, 12 Trinity Square");
        assert_eq!(n.building_name.as_deref(), Some("the cornerhouse"));
        assert!(n.key.starts_with("12 trinity"));
        assert_eq!(n.key, "12 trinity square");
    }

    #[test]
    fn building_name_before_street_and_town() {
        let n = norm().normalize("Dolphin House, 1 North Street, Guildford");
        assert_eq!(n.building_name.as_deref(), Some("dolphin house"));
        assert_eq!(n.key, "1 north st guildford");
    }

    #[test]
    fn no_building_name_when_address_starts_with_number() {
        let n = norm().normalize("12 Trinity Square");
        assert_eq!(n.building_name, None);
        assert_eq!(n.key, "12 trinity square");
    }

    #[test]
    fn no_building_name_without_space_before_number() {
        // Digits appear only inside the postcode token, never after a space
        // that closes a non-digit run usable as a prefix.
        let n = norm().normalize("MIDDLETON GRANGE SHOPPING CENTRE PARK ROAD HARTLEPOOL TS24 7RZ");
        assert_eq!(n.building_name, None);
        assert_eq!(
            n.key,
            "middleton grange shopping centre park rd hartlepool ts24 7rz"
        );
    }

    #[test]
    fn no_building_name_when_number_ends_the_string() {
        let n = norm().normalize("Building 7");
        assert_eq!(n.building_name, None);
        assert_eq!(n.key, "building 7");
    }

    #[test]
    fn building_name_keeps_unicode_word_chars() {
        let n = norm().normalize("Müller Straße 5, Berlin");
        assert_eq!(n.building_name.as_deref(), Some("müller straße"));
        assert_eq!(n.key, "5 berlin");
    }

    #[test]
    fn hyphen_range_is_rewritten() {
        let n = norm().normalize("112-114 English Street Carlisle CA3 8ND");
        assert_eq!(
            n.range,
            Some(NumberRange {
                min: "112".into(),
                max: "114".into(),
            })
        );
        assert_eq!(n.key, "112 to 114 english st carlisle ca3 8nd");
    }

    #[test]
    fn en_dash_range_is_rewritten() {
        let n = norm().normalize("46\u{2013}50 Oldham Street");
        assert_eq!(n.key, "46 to 50 oldham st");
        assert!(n.range.is_some());
    }

    #[test]
    fn spaced_separator_range_is_rewritten() {
        let n = norm().normalize("46 - 50 Oldham Street");
        assert_eq!(n.key, "46 to 50 oldham st");
    }

    #[test]
    fn unrecognized_separator_records_metadata_only() {
        let n = norm().normalize("112/114 English Street");
        assert_eq!(
            n.range,
            Some(NumberRange {
                min: "112".into(),
                max: "114".into(),
            })
        );
        // The slash survives range detection untouched, then cleansing
        // strips it, fusing the two numbers.
        assert_eq!(n.key, "112114 english st");
    }

    #[test]
    fn building_prefix_then_range() {
        let n = norm().normalize("Dolphin House, 46-50 Oldham Street");
        assert_eq!(n.building_name.as_deref(), Some("dolphin house"));
        assert_eq!(n.key, "46 to 50 oldham st");
    }

    #[test]
    fn trailing_district_defeats_matching() {
        // Known limitation carried from the source data: these two spellings
        // of the same place normalize to different keys.
        let a = norm().normalize("46-50 Oldham Street, Northern Quarter");
        let b = norm().normalize("46-50 oldham st");
        assert_eq!(a.key, "46 to 50 oldham st northern quarter");
        assert_eq!(b.key, "46 to 50 oldham st");
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn punctuation_and_whitespace_cleansing() {
        let n = norm().normalize("  10,,  HIGH   St.  ");
        assert_eq!(n.key, "10 high st");
    }

    #[test]
    fn street_and_road_abbreviated() {
        assert_eq!(norm().normalize("10 High Street").key, "10 high st");
        assert_eq!(norm().normalize("3 Mill Road").key, "3 mill rd");
    }

    #[test]
    fn rewrites_apply_without_word_boundary() {
        // Rewrite patterns are plain regexes; "street" matches inside a
        // longer token as well.
        assert_eq!(norm().normalize("5 Streetfield").key, "5 stfield");
    }

    #[test]
    fn custom_rewrites_from_config() {
        let mut config = MatchConfig::default();
        config.rewrites.push(crate::config::Rewrite {
            pattern: r"\s+avenue".into(),
            replacement: " ave".into(),
        });
        let n = KeyNormalizer::new(&config).unwrap();
        assert_eq!(n.normalize("12 Smith Avenue").key, "12 smith ave");
    }

    #[test]
    fn bad_rewrite_pattern_is_rejected() {
        let mut config = MatchConfig::default();
        config.rewrites.push(crate::config::Rewrite {
            pattern: "[".into(),
            replacement: "x".into(),
        });
        assert!(KeyNormalizer::new(&config).is_err());
    }

    #[test]
    fn empty_input_normalizes_to_empty_key() {
        let n = norm().normalize("");
        assert_eq!(n.key, "");
        assert_eq!(n.building_name, None);
        assert_eq!(n.range, None);
    }

    #[test]
    fn normalization_is_idempotent_on_keys() {
        let samples = [
            "The Cornerhouse, 12 Trinity Square",
            "112-114 English Street Carlisle CA3 8ND",
            "10 High Street",
            "Dolphin House, 1 North Street, Guildford",
            "MIDDLETON GRANGE SHOPPING CENTRE PARK ROAD HARTLEPOOL TS24 7RZ",
            "46 - 50 Oldham Street",
        ];
        let n = norm();
        for sample in samples {
            let first = n.normalize(sample);
            let second = n.normalize(&first.key);
            assert_eq!(second.key, first.key, "key drifted for {sample:?}");
        }
    }
}
