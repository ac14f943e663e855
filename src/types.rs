use smallvec::SmallVec;
use std::fmt;

pub type Mainline = SmallVec<[MoveNode; 32]>;

/// One ply of a game's mainline, replayed against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNode {
    /// SAN as it appeared in the movetext.
    pub san: String,
    /// All comments following the move, trimmed and space-joined.
    pub comment: Option<String>,
    /// Whether the move captured, judged on the board before the move.
    pub capture: bool,
    /// Position strictly after the move.
    pub fen: String,
}

impl MoveNode {
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_capture(&self) -> bool {
        self.capture
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }
}

/// A parsed game: result header plus the replayed mainline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    /// Ordinal within its input, starting at 0.
    pub index: u64,
    pub result: Option<String>,
    pub mainline: Mainline,
    /// Set when replay stopped early; `mainline` then holds the legal prefix.
    pub parse_error: Option<String>,
}

impl Game {
    pub fn result_tag(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn mainline(&self) -> &[MoveNode] {
        &self.mainline
    }
}

/// Training target derived from the `Result` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultLabel {
    WhiteWin,
    BlackWin,
    Draw,
}

impl ResultLabel {
    /// Anything that is not a decisive result, including a missing header,
    /// counts as a draw.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("1-0") => Self::WhiteWin,
            Some("0-1") => Self::BlackWin,
            _ => Self::Draw,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteWin => "1",
            Self::BlackWin => "0",
            Self::Draw => "0.5",
        }
    }
}

impl fmt::Display for ResultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output line: `fen,,result`.
#[derive(Debug, Clone, Copy)]
pub struct TrainingRecord<'a> {
    pub fen: &'a str,
    pub label: ResultLabel,
}

impl fmt::Display for TrainingRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},,{}", self.fen, self.label)
    }
}
