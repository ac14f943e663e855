use crate::config::InvalidGames;
use crate::error::{Error, Result};
use crate::filter::{FilterPolicy, Verdict};
use crate::reader::GameSource;
use crate::types::{Game, ResultLabel, TrainingRecord};
use std::fmt;
use std::io::Write;

/// Counters over everything an `Extractor` has seen.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExtractStats {
    pub games: u64,
    pub invalid_games: u64,
    pub moves: u64,
    pub records: u64,
    pub mate_tagged: u64,
    pub captures: u64,
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games ({} invalid), {} moves, {} records, {} mate-tagged, {} captures skipped",
            self.games,
            self.invalid_games,
            self.moves,
            self.records,
            self.mate_tagged,
            self.captures
        )
    }
}

/// Walks each game's mainline and writes one `fen,,result` line per move the
/// policy admits.
pub struct Extractor {
    policy: FilterPolicy,
    invalid_games: InvalidGames,
    stats: ExtractStats,
}

impl Extractor {
    pub fn new(policy: FilterPolicy, invalid_games: InvalidGames) -> Self {
        Self {
            policy,
            invalid_games,
            stats: ExtractStats::default(),
        }
    }

    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    /// Drains `source`. Stops at the first fatal error; lines already
    /// written stay in `out`.
    pub fn run<S, W>(&mut self, source: &mut S, out: &mut W) -> Result<()>
    where
        S: GameSource + ?Sized,
        W: Write + ?Sized,
    {
        while let Some(game) = source.next_game()? {
            self.extract_game(source.label(), &game, out)?;
        }
        Ok(())
    }

    pub fn extract_game<W: Write + ?Sized>(
        &mut self,
        input: &str,
        game: &Game,
        out: &mut W,
    ) -> Result<()> {
        self.stats.games += 1;

        if let Some(message) = game.parse_error.as_deref() {
            self.stats.invalid_games += 1;
            match self.invalid_games {
                InvalidGames::Fail => {
                    return Err(Error::InvalidGame {
                        input: input.to_string(),
                        game: game.index,
                        message: message.to_string(),
                    });
                }
                InvalidGames::Truncate => {
                    log::warn!(
                        "Game {} in {}: {}; keeping {} legal plies",
                        game.index,
                        input,
                        message,
                        game.mainline().len()
                    );
                }
            }
        }

        let label = ResultLabel::from_tag(game.result_tag());
        log::debug!(
            "Game {} in {}: result {:?} -> {}, {} plies",
            game.index,
            input,
            game.result_tag(),
            label,
            game.mainline().len()
        );

        for (i, node) in game.mainline().iter().enumerate() {
            self.stats.moves += 1;

            match self.policy.verdict(node) {
                Verdict::Emit => {
                    let record = TrainingRecord {
                        fen: node.fen(),
                        label,
                    };
                    writeln!(out, "{record}").map_err(Error::Write)?;
                    self.stats.records += 1;
                }
                Verdict::MateTagged => self.stats.mate_tagged += 1,
                Verdict::Capture => self.stats.captures += 1,
                Verdict::MissingComment => {
                    return Err(Error::MissingComment {
                        input: input.to_string(),
                        game: game.index,
                        ply: i + 1,
                        san: node.san.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
