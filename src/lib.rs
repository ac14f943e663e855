//! Turns PGN games into `fen,,result` lines for evaluation tuning.

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod logging;
pub mod reader;
pub mod types;
pub mod visitor;

pub use config::{CommentRule, CompressionMode, Config, InvalidGames};
pub use error::{Error, Result};
pub use extract::{ExtractStats, Extractor};
pub use filter::{CommentFilter, FilterPolicy, MarkerFilter, MissingComment, PatternFilter, Verdict};
pub use reader::{GameSource, InputSource, PgnGameSource};
pub use types::{Game, MoveNode, ResultLabel, TrainingRecord};
