//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `smatch` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                  |
//! |------|-----------|----------------------------------------------|
//! | 0    | Universal | Success                                      |
//! | 1    | Universal | General error (unspecified)                  |
//! | 2    | Universal | CLI usage error (bad args, conflicting flags)|
//! | 3    | merge     | I/O error (unreadable input, unwritable out) |
//! | 4    | merge     | Schema error (key column not present)        |
//! | 5    | merge     | Parse error (malformed CSV or rules file)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use streetmatch_engine::MatchError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Merge (3-5)
// =============================================================================

/// I/O error reading an input or writing the output.
pub const EXIT_IO: u8 = 3;

/// Key column not present in an input that has data rows.
pub const EXIT_SCHEMA: u8 = 4;

/// Parse error: malformed CSV, or a rules file that fails to
/// deserialize or validate.
pub const EXIT_PARSE: u8 = 5;

/// Map an engine error to its exit code.
pub fn match_exit_code(err: &MatchError) -> u8 {
    match err {
        MatchError::Schema { .. } => EXIT_SCHEMA,
        MatchError::Csv(_) => EXIT_PARSE,
        MatchError::ConfigParse(_) | MatchError::ConfigValidation(_) => EXIT_PARSE,
        MatchError::Io(_) => EXIT_IO,
    }
}
