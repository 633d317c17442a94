use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Rules validation error (empty key column, bad rewrite pattern, etc.).
    ConfigValidation(String),
    /// Key column absent from the first parsed row of a source.
    Schema { line: usize, column: String },
    /// CSV reader/writer error.
    Csv(String),
    /// IO error surfaced through the output path.
    Io(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "rules parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "rules validation error: {msg}"),
            Self::Schema { line, column } => {
                write!(f, "line #{line}: key column '{column}' not present")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}
