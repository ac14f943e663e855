use crate::types::{Game, Mainline, MoveNode};
use pgn_reader::{RawComment, RawTag, SanPlus, Skip, Visitor};
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, FromSetup, Position, fen::Fen};
use std::mem;
use std::ops::ControlFlow;

/// Streaming PGN visitor (pgn-reader).
///
/// Replays the mainline with shakmaty as it is read, so every `MoveNode`
/// already carries its capture flag and the FEN after the move. Variations
/// are skipped. An unplayable move, a bad `FEN` tag or an unknown `Variant`
/// ends the game early with `parse_error` set.
#[derive(Debug, Default)]
pub struct GameVisitor;

impl GameVisitor {
    pub fn new() -> Self {
        Self
    }
}

/// Header tags the replay depends on. A repeated tag overrides the earlier
/// value; empty values are ignored.
#[derive(Debug, Default)]
pub struct TagFields {
    result: Option<String>,
    fen: Option<String>,
    variant: Option<String>,
}

impl TagFields {
    fn set_known_tag(&mut self, key: &[u8], value: RawTag<'_>) {
        let slot = match key {
            b"Result" => &mut self.result,
            b"FEN" => &mut self.fen,
            b"Variant" => &mut self.variant,
            _ => return,
        };

        let value = String::from_utf8_lossy(value.as_bytes());
        if value.trim().is_empty() {
            return;
        }

        *slot = Some(value.into_owned());
    }
}

/// Board cursor plus the game being built.
pub struct Replay {
    pos: Chess,
    game: Game,
    pending_comment: String,
}

impl Replay {
    fn push_comment(&mut self, bytes: &[u8], partial: bool) {
        self.pending_comment.push_str(&String::from_utf8_lossy(bytes));
        if !partial {
            self.flush_comment();
        }
    }

    fn flush_comment(&mut self) {
        let text = mem::take(&mut self.pending_comment);
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        // Comments before the first move belong to the game, not to a ply.
        let Some(node) = self.game.mainline.last_mut() else {
            return;
        };

        match &mut node.comment {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => node.comment = Some(text.to_string()),
        }
    }
}

fn castling_mode(variant: Option<&str>) -> Result<CastlingMode, String> {
    let Some(raw) = variant else {
        return Ok(CastlingMode::Standard);
    };

    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "" | "standard" | "chess" | "normal" | "from position" => Ok(CastlingMode::Standard),
        v if v.contains("960") || v.starts_with("fischer") => Ok(CastlingMode::Chess960),
        _ => Err(format!("Unsupported variant '{}'", raw.trim())),
    }
}

/// Passes the turn. Clocks advance as for a quiet move.
fn play_null(pos: &Chess) -> Result<Chess, String> {
    let mut setup = pos.to_setup(EnPassantMode::Always);
    setup.halfmoves = setup.halfmoves.saturating_add(1);
    if setup.turn == Color::Black {
        setup.fullmoves = setup.fullmoves.saturating_add(1);
    }
    setup.swap_turn();
    Chess::from_setup(setup, pos.castles().mode()).map_err(|e| e.to_string())
}

fn start_position(fen: &str, mode: CastlingMode) -> Result<Chess, String> {
    let setup = Fen::from_ascii(fen.trim().as_bytes())
        .map_err(|e| format!("Invalid FEN tag '{fen}': {e}"))?;
    setup
        .into_position(mode)
        .map_err(|e| format!("Illegal FEN tag position '{fen}': {e}"))
}

impl Visitor for GameVisitor {
    type Tags = TagFields;
    type Movetext = Replay;
    type Output = Game;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(TagFields::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.set_known_tag(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let mut problems = Vec::new();

        let mode = castling_mode(tags.variant.as_deref()).unwrap_or_else(|msg| {
            problems.push(msg);
            CastlingMode::Standard
        });

        let pos = match tags.fen.as_deref() {
            Some(fen) => start_position(fen, mode).unwrap_or_else(|msg| {
                problems.push(msg);
                Chess::default()
            }),
            None => Chess::default(),
        };

        let game = Game {
            index: 0,
            result: tags.result,
            mainline: Mainline::new(),
            parse_error: (!problems.is_empty()).then(|| problems.join("; ")),
        };

        if game.parse_error.is_some() {
            return ControlFlow::Break(game);
        }

        ControlFlow::Continue(Replay {
            pos,
            game,
            pending_comment: String::new(),
        })
    }

    fn san(&mut self, replay: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        replay.flush_comment();
        let ply = replay.game.mainline.len() + 1;

        let capture = if let San::Null = san_plus.san {
            match play_null(&replay.pos) {
                Ok(pos) => replay.pos = pos,
                Err(e) => {
                    replay.game.parse_error =
                        Some(format!("Illegal null move at ply {ply}: {e}"));
                    return ControlFlow::Break(mem::take(&mut replay.game));
                }
            }
            false
        } else {
            let m = match san_plus.san.to_move(&replay.pos) {
                Ok(m) => m,
                Err(e) => {
                    replay.game.parse_error =
                        Some(format!("Illegal move at ply {ply}: {san_plus} ({e})"));
                    return ControlFlow::Break(mem::take(&mut replay.game));
                }
            };
            let capture = m.is_capture();
            replay.pos.play_unchecked(m);
            capture
        };
        let fen = Fen::from_position(&replay.pos, EnPassantMode::Legal).to_string();

        replay.game.mainline.push(MoveNode {
            san: san_plus.to_string(),
            comment: None,
            capture,
            fen,
        });
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        replay: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        replay.push_comment(comment.as_bytes(), false);
        ControlFlow::Continue(())
    }

    fn partial_comment(
        &mut self,
        replay: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        replay.push_comment(comment.as_bytes(), true);
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, mut replay: Self::Movetext) -> Self::Output {
        replay.flush_comment();
        replay.game
    }
}
