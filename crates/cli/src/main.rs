// smatch - merge two address-keyed CSV files that share no identifier

mod exit_codes;
mod read;

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use streetmatch_engine::{
    merge_join, output_columns, Collection, JoinOptions, JoinSummary, KeyNormalizer, MatchColumn,
    MatchConfig, MatchError,
};

use exit_codes::{match_exit_code, EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "smatch")]
#[command(about = "Merge two address-keyed CSV files that share no identifier")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two CSV files on a normalized address key
    #[command(after_help = "\
Rows pair up when their address text reduces to the same key: lowercased,
building name split off, number ranges rewritten (\"112-114\" becomes
\"112 to 114\"), punctuation stripped, street/road abbreviated. Rows whose
building names disagree stay apart. On merged rows the left file's values
win for shared columns.

Examples:
  smatch merge council.csv ratings.csv
  smatch merge council.csv ratings.csv -o merged.csv
  smatch merge council.csv ratings.csv --key street_address --delimiter ,
  smatch merge council.csv ratings.csv --ratio-of rateable_value,floor_area
  cat ratings.csv | smatch merge council.csv - --summary json
  smatch merge council.csv ratings.csv --rules north-west.toml --quiet")]
    Merge {
        /// Left dataset (file path, or - for stdin); wins on shared columns
        left: String,

        /// Right dataset (file path, or - for stdin)
        right: String,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Key column holding the address text
        #[arg(long)]
        key: Option<String>,

        /// Field delimiter for input and output
        #[arg(long)]
        delimiter: Option<char>,

        /// Quote character for input and output
        #[arg(long)]
        quote: Option<char>,

        /// Fill value for columns a row's source file does not have
        #[arg(long)]
        fill: Option<String>,

        /// Rules file (TOML): key column, delimiter, rewrite patterns
        #[arg(long, env = "SMATCH_RULES")]
        rules: Option<PathBuf>,

        /// Append a ratio column computed from two integer columns
        #[arg(long, value_name = "NUM_COL,DEN_COL")]
        ratio_of: Option<String>,

        /// Name for the ratio column (default: ratio)
        #[arg(long, value_name = "NAME")]
        match_column: Option<String>,

        /// Summary format
        #[arg(long, default_value = "human")]
        summary: SummaryFormat,

        /// Quiet mode - suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Inspect and validate rules files
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Parse and validate a rules file
    #[command(after_help = "\
Examples:
  smatch rules check north-west.toml")]
    Check {
        /// Rules file to validate
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryFormat {
    Human,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: smatch <command> [options]");
            eprintln!("       smatch --help for more information");
            Ok(())
        }
        Some(Commands::Merge {
            left,
            right,
            output,
            key,
            delimiter,
            quote,
            fill,
            rules,
            ratio_of,
            match_column,
            summary,
            quiet,
        }) => cmd_merge(
            left, right, output, key, delimiter, quote, fill, rules, ratio_of, match_column,
            summary, quiet,
        ),
        Some(Commands::Rules { command }) => match command {
            RulesCommands::Check { path } => cmd_rules_check(path),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Error type
// ============================================================================

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an engine error, prefixed with the input label.
    pub fn engine(err: MatchError, label: &str) -> Self {
        let hint = match &err {
            MatchError::Schema { column, .. } => Some(format!(
                "pass --key (or key_column in the rules file) if the address column is not named '{}'",
                column
            )),
            _ => None,
        };
        Self {
            code: match_exit_code(&err),
            message: format!("{}: {}", label, err),
            hint,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// merge
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_merge(
    left_arg: String,
    right_arg: String,
    output: Option<PathBuf>,
    key: Option<String>,
    delimiter: Option<char>,
    quote: Option<char>,
    fill: Option<String>,
    rules: Option<PathBuf>,
    ratio_of: Option<String>,
    match_column: Option<String>,
    summary_format: SummaryFormat,
    quiet: bool,
) -> Result<(), CliError> {
    if left_arg == "-" && right_arg == "-" {
        return Err(CliError::args("cannot read both sides from stdin")
            .with_hint("provide at least one file path: smatch merge - ratings.csv"));
    }

    if match_column.is_some() && ratio_of.is_none() {
        return Err(CliError::args("--match-column requires --ratio-of")
            .with_hint("name the columns to divide: --ratio-of rateable_value,floor_area"));
    }

    // Rules file first, then flag overrides, then re-validate the result.
    // A failure here can only come from a flag value; the file already
    // validated inside from_toml.
    let mut config = match rules {
        Some(ref path) => {
            let text = read::read_file_as_utf8(path)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            MatchConfig::from_toml(&text)
                .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))?
        }
        None => MatchConfig::default(),
    };
    if let Some(key) = key {
        config.key_column = key;
    }
    if let Some(delimiter) = delimiter {
        config.delimiter = delimiter;
    }
    if let Some(quote) = quote {
        config.quote = quote;
    }
    if let Some(fill) = fill {
        config.fill = fill;
    }
    config.validate().map_err(|e| CliError::args(e.to_string()))?;

    let ratio_cols = match ratio_of {
        Some(ref spec) => Some(parse_ratio_spec(spec)?),
        None => None,
    };

    let (left_text, left_label) = read::read_input(&left_arg)?;
    let (right_text, right_label) = read::read_input(&right_arg)?;

    // One compiled normalizer shared by both sides
    let normalizer =
        KeyNormalizer::new(&config).map_err(|e| CliError::parse(e.to_string()))?;
    let left = Collection::from_csv_with(&left_text, &config, &normalizer)
        .map_err(|e| CliError::engine(e, &left_label))?;
    let right = Collection::from_csv_with(&right_text, &config, &normalizer)
        .map_err(|e| CliError::engine(e, &right_label))?;

    let options = JoinOptions {
        match_column: ratio_cols.map(|(num, den)| MatchColumn {
            name: match_column.unwrap_or_else(|| "ratio".to_string()),
            compute: Box::new(move |row| ratio_value(row, &num, &den)),
        }),
    };

    let columns = output_columns(&left, &right, &options);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter_byte())
        .quote(config.quote_byte())
        .from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|e| CliError::internal(e.to_string()))?;

    let fill_value = config.fill.clone();
    let summary = merge_join(&left, &right, &options, |row| {
        let record: Vec<&str> = columns
            .iter()
            .map(|col| row.get(col).map(String::as_str).unwrap_or(fill_value.as_str()))
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| MatchError::Io(e.to_string()))
    })
    .map_err(|e| CliError::engine(e, "merge"))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::internal(e.to_string()))?;

    match output {
        Some(path) => {
            std::fs::write(&path, &bytes)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        }
        None => {
            io::stdout()
                .write_all(&bytes)
                .map_err(|e| CliError::io(e.to_string()))?;
        }
    }

    // Summary goes to stderr so stdout stays clean CSV (--quiet suppresses)
    if !quiet {
        print_summary(&summary, &left_label, &right_label, summary_format);
    }

    Ok(())
}

/// Split a `NUM_COL,DEN_COL` spec into its two column names.
fn parse_ratio_spec(spec: &str) -> Result<(String, String), CliError> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [num, den] if !num.is_empty() && !den.is_empty() => {
            Ok((num.to_string(), den.to_string()))
        }
        _ => Err(CliError::args(format!("invalid --ratio-of \"{}\"", spec))
            .with_hint("expected two column names: --ratio-of rateable_value,floor_area")),
    }
}

/// Ratio of two integer columns, with sentinels instead of numbers:
/// "?" when a column is absent from the row, "-" when a value does not
/// parse as an integer, "inf" when the denominator is zero.
fn ratio_value(row: &HashMap<String, String>, num_col: &str, den_col: &str) -> String {
    let (num_raw, den_raw) = match (row.get(num_col), row.get(den_col)) {
        (Some(n), Some(d)) => (n, d),
        _ => return "?".to_string(),
    };
    match (safe_int(num_raw), safe_int(den_raw)) {
        (Some(_), Some(0)) => "inf".to_string(),
        (Some(num), Some(den)) => format!("{:.2}", num as f64 / den as f64),
        _ => "-".to_string(),
    }
}

fn safe_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn print_summary(
    summary: &JoinSummary,
    left_label: &str,
    right_label: &str,
    format: SummaryFormat,
) {
    match format {
        SummaryFormat::Human => {
            eprintln!("left:  {} rows ({})", summary.left_rows, left_label);
            eprintln!("right: {} rows ({})", summary.right_rows, right_label);
            eprintln!("merged: {}", summary.merged);
            eprintln!("building_conflicts: {}", summary.building_conflicts);
            eprintln!("only_left: {}", summary.left_only);
            eprintln!("only_right: {}", summary.right_only);
        }
        SummaryFormat::Json => {
            if let Ok(json) = serde_json::to_string(summary) {
                eprintln!("{}", json);
            }
        }
    }
}

// ============================================================================
// rules check
// ============================================================================

fn cmd_rules_check(path: PathBuf) -> Result<(), CliError> {
    let text = read::read_file_as_utf8(&path)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    let config = MatchConfig::from_toml(&text)
        .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))?;
    println!(
        "ok: key column '{}', delimiter '{}', {} rewrite(s)",
        config.key_column,
        config.delimiter,
        config.rewrites.len()
    );
    Ok(())
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  streetmatch-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  streetmatch-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn ratio_divides_to_two_decimals() {
        let r = row(&[("rateable_value", "1000"), ("floor_area", "400")]);
        assert_eq!(ratio_value(&r, "rateable_value", "floor_area"), "2.50");
    }

    #[test]
    fn ratio_missing_column_is_question_mark() {
        let r = row(&[("rateable_value", "1000")]);
        assert_eq!(ratio_value(&r, "rateable_value", "floor_area"), "?");
    }

    #[test]
    fn ratio_non_integer_is_dash() {
        let r = row(&[("rateable_value", "n/a"), ("floor_area", "400")]);
        assert_eq!(ratio_value(&r, "rateable_value", "floor_area"), "-");
        let r = row(&[("rateable_value", "12.5"), ("floor_area", "400")]);
        assert_eq!(ratio_value(&r, "rateable_value", "floor_area"), "-");
    }

    #[test]
    fn ratio_zero_denominator_is_inf() {
        let r = row(&[("rateable_value", "1000"), ("floor_area", "0")]);
        assert_eq!(ratio_value(&r, "rateable_value", "floor_area"), "inf");
    }

    #[test]
    fn ratio_trims_whitespace_before_parsing() {
        let r = row(&[("rateable_value", " 90 "), ("floor_area", "30")]);
        assert_eq!(ratio_value(&r, "rateable_value", "floor_area"), "3.00");
    }

    #[test]
    fn ratio_spec_needs_exactly_two_names() {
        assert!(parse_ratio_spec("a,b").is_ok());
        assert!(parse_ratio_spec("a, b").is_ok());
        assert!(parse_ratio_spec("a").is_err());
        assert!(parse_ratio_spec("a,b,c").is_err());
        assert!(parse_ratio_spec("a,").is_err());
        assert!(parse_ratio_spec(",b").is_err());
    }

    #[test]
    fn negative_values_divide() {
        let r = row(&[("delta", "-30"), ("base", "20")]);
        assert_eq!(ratio_value(&r, "delta", "base"), "-1.50");
    }
}
