use regex::Regex;
use serde::Deserialize;

use crate::error::MatchError;

// ---------------------------------------------------------------------------
// Match rules
// ---------------------------------------------------------------------------

/// Rules driving key normalization and CSV framing. Every field has a
/// default, so an empty TOML document yields the stock behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    /// Column whose value seeds key normalization.
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Field delimiter for both inputs and the output.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Quote character for both inputs and the output.
    #[serde(default = "default_quote")]
    pub quote: char,
    /// Value the writer substitutes for columns absent from an output row.
    #[serde(default)]
    pub fill: String,
    /// Separator characters that mark `<num><sep><num>` as a street-number
    /// range. A detected range with any other single-character separator is
    /// still recorded as metadata but not rewritten.
    #[serde(default = "default_range_separators")]
    pub range_separators: Vec<char>,
    /// Rewrites applied, in order, during cleansing. Patterns are regexes;
    /// replacements may reference capture groups with `$n`.
    #[serde(default = "default_rewrites")]
    pub rewrites: Vec<Rewrite>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rewrite {
    pub pattern: String,
    pub replacement: String,
}

fn default_key_column() -> String {
    "address".into()
}

fn default_delimiter() -> char {
    ';'
}

fn default_quote() -> char {
    '"'
}

/// Hyphen plus the typographic dashes seen in scraped address data.
fn default_range_separators() -> Vec<char> {
    vec!['-', '\u{2013}', '\u{2014}']
}

fn default_rewrites() -> Vec<Rewrite> {
    vec![
        Rewrite {
            pattern: r"\s+street".into(),
            replacement: " st".into(),
        },
        Rewrite {
            pattern: r"\s+road".into(),
            replacement: " rd".into(),
        },
    ]
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            key_column: default_key_column(),
            delimiter: default_delimiter(),
            quote: default_quote(),
            fill: String::new(),
            range_separators: default_range_separators(),
            rewrites: default_rewrites(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.key_column.is_empty() {
            return Err(MatchError::ConfigValidation(
                "key_column must not be empty".into(),
            ));
        }

        // The csv crate frames on single bytes
        if !self.delimiter.is_ascii() {
            return Err(MatchError::ConfigValidation(format!(
                "delimiter must be an ASCII character, got '{}'",
                self.delimiter
            )));
        }
        if !self.quote.is_ascii() {
            return Err(MatchError::ConfigValidation(format!(
                "quote must be an ASCII character, got '{}'",
                self.quote
            )));
        }
        if self.delimiter == self.quote {
            return Err(MatchError::ConfigValidation(format!(
                "delimiter and quote must differ, both are '{}'",
                self.delimiter
            )));
        }

        for rewrite in &self.rewrites {
            if let Err(e) = Regex::new(&rewrite.pattern) {
                return Err(MatchError::ConfigValidation(format!(
                    "rewrite pattern '{}' does not compile: {e}",
                    rewrite.pattern
                )));
            }
        }

        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn quote_byte(&self) -> u8 {
        self.quote as u8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
