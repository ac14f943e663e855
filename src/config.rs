use crate::error::{Error, Result};
use crate::filter::{CommentFilter, FilterPolicy, MarkerFilter, MissingComment, PatternFilter};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMode {
    /// zstd for `*.zst` files, plain otherwise.
    #[default]
    Auto,
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else if normalized.eq_ignore_ascii_case("plain") {
            Ok(Self::Plain)
        } else if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else {
            Err(Error::Compression(format!(
                "Invalid compression value '{}'. Supported values: 'auto', 'plain' or 'zstd'.",
                normalized
            )))
        }
    }

    /// Whether a file at `path` is zstd-decoded under this mode.
    pub fn is_zstd_for(self, path: &Path) -> bool {
        match self {
            Self::Auto => path.extension().is_some_and(|ext| ext == "zst"),
            Self::Plain => false,
            Self::Zstd => true,
        }
    }
}

/// What to do with a game whose mainline could not be fully replayed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InvalidGames {
    #[default]
    Fail,
    /// Warn and process the legal prefix.
    Truncate,
}

/// Which comment test marks a move as mate-scored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommentRule {
    Marker(char),
    Pattern(String),
}

impl Default for CommentRule {
    fn default() -> Self {
        Self::Marker(crate::filter::DEFAULT_MATE_MARKER)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub exclude_captures: bool,
    pub comment_rule: CommentRule,
    pub missing_comment: MissingComment,
    pub invalid_games: InvalidGames,
    pub compression: CompressionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_captures: true,
            comment_rule: CommentRule::default(),
            missing_comment: MissingComment::Include,
            invalid_games: InvalidGames::Fail,
            compression: CompressionMode::Auto,
        }
    }
}

impl Config {
    /// Builds the per-move policy; fails on an invalid comment regex.
    pub fn filter_policy(&self) -> Result<FilterPolicy> {
        let comment_filter: Box<dyn CommentFilter> = match &self.comment_rule {
            CommentRule::Marker(marker) => Box::new(MarkerFilter::new(*marker)),
            CommentRule::Pattern(pattern) => Box::new(PatternFilter::new(pattern)?),
        };

        Ok(FilterPolicy {
            exclude_captures: self.exclude_captures,
            comment_filter,
            missing_comment: self.missing_comment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Verdict;
    use crate::types::MoveNode;

    #[test]
    fn test_parse_compression_mode_case_insensitive() {
        assert_eq!(CompressionMode::parse("zstd").unwrap(), CompressionMode::Zstd);
        assert_eq!(CompressionMode::parse("ZSTD").unwrap(), CompressionMode::Zstd);
        assert_eq!(CompressionMode::parse(" Plain ").unwrap(), CompressionMode::Plain);
        assert_eq!(CompressionMode::parse("auto").unwrap(), CompressionMode::Auto);
    }

    #[test]
    fn test_parse_compression_mode_rejects_empty_value() {
        let err = CompressionMode::parse("  ").unwrap_err();
        assert!(err.to_string().contains("Invalid compression value ''"));
    }

    #[test]
    fn test_parse_compression_mode_rejects_unsupported_value() {
        let err = CompressionMode::parse("gzip").unwrap_err();
        assert!(err.to_string().contains("'gzip'"));
        assert!(err.to_string().contains("'zstd'"));
    }

    #[test]
    fn test_compression_mode_by_extension() {
        let zst = Path::new("games/lichess_2024-01.pgn.zst");
        let pgn = Path::new("games/lichess_2024-01.pgn");

        assert!(CompressionMode::Auto.is_zstd_for(zst));
        assert!(!CompressionMode::Auto.is_zstd_for(pgn));
        assert!(!CompressionMode::Plain.is_zstd_for(zst));
        assert!(CompressionMode::Zstd.is_zstd_for(pgn));
    }

    #[test]
    fn test_filter_policy_from_pattern_rule() {
        let config = Config {
            comment_rule: CommentRule::Pattern(r"^[+-]?M".to_string()),
            exclude_captures: false,
            ..Config::default()
        };
        let policy = config.filter_policy().unwrap();

        let node = MoveNode {
            san: "Qh5".to_string(),
            comment: Some("-M4/22".to_string()),
            capture: false,
            fen: String::new(),
        };
        assert_eq!(policy.verdict(&node), Verdict::MateTagged);
        assert!(!policy.exclude_captures);
    }

    #[test]
    fn test_filter_policy_rejects_bad_pattern() {
        let config = Config {
            comment_rule: CommentRule::Pattern("[".to_string()),
            ..Config::default()
        };

        assert!(matches!(
            config.filter_policy(),
            Err(Error::CommentPattern(_))
        ));
    }
}
