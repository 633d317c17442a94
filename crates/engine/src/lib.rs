// Address-keyed CSV merge-join engine. Parses delimited text it is
// handed, normalizes the key column, and merge-joins two sorted
// collections into one outer-joined row stream. No file I/O.

pub mod collection;
pub mod config;
pub mod error;
pub mod join;
pub mod normalize;

pub use collection::{Collection, Record};
pub use config::{MatchConfig, Rewrite};
pub use error::MatchError;
pub use join::{merge_join, output_columns, JoinOptions, JoinSummary, MatchColumn};
pub use normalize::{KeyNormalizer, NormalizedAddress, NumberRange};
