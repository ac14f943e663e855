use std::io;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to open file '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to initialize zstd decoder for '{}': {source}", .path.display())]
    Decoder { path: PathBuf, source: io::Error },

    #[error("Read error in {input} at game {game}: {source}")]
    Read {
        input: String,
        game: u64,
        source: io::Error,
    },

    #[error("Invalid game {game} in {input}: {message}")]
    InvalidGame {
        input: String,
        game: u64,
        message: String,
    },

    #[error("Game {game} in {input}: ply {ply} ({san}) has no comment")]
    MissingComment {
        input: String,
        game: u64,
        ply: usize,
        san: String,
    },

    #[error("Invalid input pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("No input files match '{0}'")]
    NoMatch(String),

    #[error("Invalid comment pattern: {0}")]
    CommentPattern(#[from] regex::Error),

    #[error("{0}")]
    Compression(String),

    #[error("Failed to write output: {0}")]
    Write(#[source] io::Error),
}

impl Error {
    /// Output side went away (e.g. `extract-tune | head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Write(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
