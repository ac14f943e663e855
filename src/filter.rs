use crate::types::MoveNode;
use regex::Regex;

pub const DEFAULT_MATE_MARKER: char = 'M';

/// Decides from a move's annotation whether it carries a mate score.
pub trait CommentFilter {
    fn is_excluded(&self, comment: &str) -> bool;
}

/// Excludes comments whose first character is `marker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerFilter {
    marker: char,
}

impl MarkerFilter {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }
}

impl Default for MarkerFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MATE_MARKER)
    }
}

impl CommentFilter for MarkerFilter {
    fn is_excluded(&self, comment: &str) -> bool {
        comment.chars().next() == Some(self.marker)
    }
}

/// Excludes comments matched anywhere by a regex.
#[derive(Debug, Clone)]
pub struct PatternFilter(Regex);

impl PatternFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }
}

impl CommentFilter for PatternFilter {
    fn is_excluded(&self, comment: &str) -> bool {
        self.0.is_match(comment)
    }
}

/// What to do with a move that has no annotation at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingComment {
    /// Treat it as not mate-tagged.
    #[default]
    Include,
    /// Abort the run.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Emit,
    MateTagged,
    Capture,
    /// No comment under `MissingComment::Fail`.
    MissingComment,
}

/// Per-move admission rules.
pub struct FilterPolicy {
    pub exclude_captures: bool,
    pub comment_filter: Box<dyn CommentFilter>,
    pub missing_comment: MissingComment,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            exclude_captures: true,
            comment_filter: Box::new(MarkerFilter::default()),
            missing_comment: MissingComment::Include,
        }
    }
}

impl FilterPolicy {
    /// The comment test runs before the capture test.
    pub fn verdict(&self, node: &MoveNode) -> Verdict {
        match node.comment() {
            Some(comment) if self.comment_filter.is_excluded(comment) => {
                return Verdict::MateTagged;
            }
            Some(_) => {}
            None if self.missing_comment == MissingComment::Fail => {
                return Verdict::MissingComment;
            }
            None => {}
        }

        if self.exclude_captures && node.is_capture() {
            return Verdict::Capture;
        }

        Verdict::Emit
    }
}
