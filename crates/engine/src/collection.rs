//! Sorted record store loaded from delimited text.

use std::collections::HashMap;

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::normalize::{KeyNormalizer, NormalizedAddress, NumberRange};

/// One input row: the raw fields plus the normalized key and the metadata
/// extracted from the key column.
#[derive(Debug, Clone)]
pub struct Record {
    pub key: String,
    pub building_name: Option<String>,
    pub range: Option<NumberRange>,
    /// Column name → value, as read from the source.
    pub fields: HashMap<String, String>,
}

/// All records of one source, sorted ascending by normalized key, plus the
/// source header in its original order. Immutable once built.
#[derive(Debug, Clone)]
pub struct Collection {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Collection {
    /// Parse delimited text into a sorted Collection.
    pub fn from_csv(csv_data: &str, config: &MatchConfig) -> Result<Self, MatchError> {
        let normalizer = KeyNormalizer::new(config)?;
        Self::from_csv_with(csv_data, config, &normalizer)
    }

    /// Like [`Collection::from_csv`], with a caller-built normalizer so two
    /// sources share one compiled pipeline.
    ///
    /// The header fixes the column set. Fails with [`MatchError::Schema`]
    /// when the key column is absent and at least one data row exists; a
    /// source with no data rows loads as an empty Collection.
    pub fn from_csv_with(
        csv_data: &str,
        config: &MatchConfig,
        normalizer: &KeyNormalizer,
    ) -> Result<Self, MatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(config.delimiter_byte())
            .quote(config.quote_byte())
            .from_reader(csv_data.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| MatchError::Csv(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let key_idx = columns.iter().position(|c| c == &config.key_column);

        let mut records = Vec::new();

        for (n, record) in reader.records().enumerate() {
            let record = record.map_err(|e| MatchError::Csv(e.to_string()))?;

            let key_idx = key_idx.ok_or_else(|| MatchError::Schema {
                line: n + 1,
                column: config.key_column.clone(),
            })?;

            let NormalizedAddress {
                key,
                building_name,
                range,
            } = normalizer.normalize(record.get(key_idx).unwrap_or(""));

            let mut fields = HashMap::with_capacity(columns.len());
            for (idx, column) in columns.iter().enumerate() {
                fields.insert(column.clone(), record.get(idx).unwrap_or("").to_string());
            }

            records.push(Record {
                key,
                building_name,
                range,
                fields,
            });
        }

        // Stable: records with equal keys keep their source order.
        records.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(Self { columns, records })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
