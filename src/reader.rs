use crate::config::CompressionMode;
use crate::error::{Error, Result};
use crate::types::Game;
use crate::visitor::GameVisitor;
use pgn_reader::Reader;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read>;

/// Where games come from. The extractor only sees this boundary; parsing,
/// legality and FEN generation all live behind it.
pub trait GameSource {
    /// Names the input in diagnostics.
    fn label(&self) -> &str;

    /// `Ok(None)` once the input is exhausted.
    fn next_game(&mut self) -> Result<Option<Game>>;
}

/// `GameSource` over a PGN byte stream.
pub struct PgnGameSource<R: Read> {
    label: String,
    pgn_reader: Reader<R>,
    visitor: GameVisitor,
    next_game_index: u64,
}

impl<R: Read> PgnGameSource<R> {
    // pgn-reader buffers internally; no extra BufReader layer.
    pub fn new(input: R, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pgn_reader: Reader::new(input),
            visitor: GameVisitor::new(),
            next_game_index: 0,
        }
    }
}

impl<R: Read> GameSource for PgnGameSource<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn next_game(&mut self) -> Result<Option<Game>> {
        let game_index = self.next_game_index;

        match self.pgn_reader.read_game(&mut self.visitor) {
            Ok(Some(mut game)) => {
                self.next_game_index += 1;
                game.index = game_index;
                Ok(Some(game))
            }
            Ok(None) => Ok(None),
            Err(source) => Err(Error::Read {
                input: self.label.clone(),
                game: game_index,
                source,
            }),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn is_glob_pattern(arg: &str) -> bool {
    arg.contains('*') || arg.contains('?') || arg.contains('[')
}

/// Expands CLI arguments into inputs, in argument order. No arguments, or
/// `-`, means standard input. Glob matches are sorted; a pattern matching
/// nothing is an error.
pub fn resolve_inputs<S: AsRef<str>>(args: &[S]) -> Result<Vec<InputSource>> {
    if args.is_empty() {
        return Ok(vec![InputSource::Stdin]);
    }

    let mut inputs = Vec::with_capacity(args.len());
    for arg in args {
        let arg = arg.as_ref();
        if arg == "-" {
            inputs.push(InputSource::Stdin);
        } else if is_glob_pattern(arg) {
            let mut paths: Vec<PathBuf> = glob::glob(arg)
                .map_err(|source| Error::Pattern {
                    pattern: arg.to_string(),
                    source,
                })?
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::warn!("Skipping unreadable match for '{}': {}", arg, e);
                        None
                    }
                })
                .collect();

            if paths.is_empty() {
                return Err(Error::NoMatch(arg.to_string()));
            }

            paths.sort();
            inputs.extend(paths.into_iter().map(InputSource::File));
        } else {
            inputs.push(InputSource::File(PathBuf::from(arg)));
        }
    }

    Ok(inputs)
}

/// Opens one input, wrapping it in a zstd decoder when the mode asks for it.
pub fn open_input(input: &InputSource, compression: CompressionMode) -> Result<PgnInput> {
    match input {
        InputSource::Stdin => {
            if compression == CompressionMode::Zstd {
                ZstdDecoder::new(io::stdin())
                    .map(|decoder| Box::new(decoder) as PgnInput)
                    .map_err(|source| Error::Decoder {
                        path: PathBuf::from("<stdin>"),
                        source,
                    })
            } else {
                Ok(Box::new(io::stdin()))
            }
        }
        InputSource::File(path) => {
            let file = File::open(path).map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

            if compression.is_zstd_for(path) {
                ZstdDecoder::new(file)
                    .map(|decoder| Box::new(decoder) as PgnInput)
                    .map_err(|source| Error::Decoder {
                        path: path.clone(),
                        source,
                    })
            } else {
                Ok(Box::new(file))
            }
        }
    }
}

/// Opens `input` and wraps it as a game source.
pub fn open_source(
    input: &InputSource,
    compression: CompressionMode,
) -> Result<PgnGameSource<PgnInput>> {
    let stream = open_input(input, compression)?;
    Ok(PgnGameSource::new(stream, input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    const TWO_GAMES: &str = r#"[Event "One"]
[Result "1-0"]

1. e4 {a} e5 {b} 1-0

[Event "Two"]
[Result "0-1"]

1. d4 {c} 0-1
"#;

    #[test]
    fn test_source_reads_games_with_indices() {
        let mut source = PgnGameSource::new(TWO_GAMES.as_bytes(), "mem");

        let first = source.next_game().unwrap().unwrap();
        let second = source.next_game().unwrap().unwrap();

        assert_eq!(first.index, 0);
        assert_eq!(second.index, 1);
        assert_eq!(second.result_tag(), Some("0-1"));
        assert!(source.next_game().unwrap().is_none());
        assert_eq!(source.label(), "mem");
    }

    #[test]
    fn test_source_empty_input() {
        let mut source = PgnGameSource::new("".as_bytes(), "empty");
        assert!(source.next_game().unwrap().is_none());

        let mut source = PgnGameSource::new("\n\n  \n".as_bytes(), "blank");
        assert!(source.next_game().unwrap().is_none());
    }

    #[test]
    fn test_source_io_error_is_reported_with_location() {
        struct FailingRead;
        impl Read for FailingRead {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let mut source = PgnGameSource::new(FailingRead, "broken.pgn");
        let err = source.next_game().unwrap_err();

        assert!(matches!(err, Error::Read { game: 0, .. }));
        assert!(err.to_string().contains("broken.pgn"));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_resolve_inputs_defaults_to_stdin() {
        let none: [&str; 0] = [];
        assert_eq!(resolve_inputs(&none).unwrap(), vec![InputSource::Stdin]);
        assert_eq!(resolve_inputs(&["-"]).unwrap(), vec![InputSource::Stdin]);
    }

    #[test]
    fn test_resolve_inputs_plain_paths_kept_in_order() {
        let inputs = resolve_inputs(&["b.pgn", "a.pgn"]).unwrap();
        assert_eq!(
            inputs,
            vec![
                InputSource::File(PathBuf::from("b.pgn")),
                InputSource::File(PathBuf::from("a.pgn")),
            ]
        );
    }

    #[test]
    fn test_resolve_inputs_expands_glob_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2024-02.pgn", "2024-01.pgn", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let pattern = dir.path().join("*.pgn");
        let inputs = resolve_inputs(&[pattern.to_str().unwrap()]).unwrap();

        assert_eq!(
            inputs,
            vec![
                InputSource::File(dir.path().join("2024-01.pgn")),
                InputSource::File(dir.path().join("2024-02.pgn")),
            ]
        );
    }

    #[test]
    fn test_resolve_inputs_glob_without_match_fails() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.pgn");

        let err = resolve_inputs(&[pattern.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, Error::NoMatch(_)));
    }

    #[test]
    fn test_open_input_missing_file() {
        let input = InputSource::File(PathBuf::from("/nonexistent/games.pgn"));
        let err = open_input(&input, CompressionMode::Auto).err().unwrap();

        assert!(matches!(err, Error::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/games.pgn"));
    }

    #[test]
    fn test_open_source_reads_zstd_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.pgn.zst");
        let compressed = zstd::encode_all(TWO_GAMES.as_bytes(), 3).unwrap();
        fs::write(&path, compressed).unwrap();

        let input = InputSource::File(path);
        let mut source = open_source(&input, CompressionMode::Auto).unwrap();

        let first = source.next_game().unwrap().unwrap();
        assert_eq!(first.mainline().len(), 2);
        assert!(source.next_game().unwrap().is_some());
        assert!(source.next_game().unwrap().is_none());
    }

    #[test]
    fn test_open_source_plain_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_GAMES.as_bytes()).unwrap();

        let input = InputSource::File(file.path().to_path_buf());
        let mut source = open_source(&input, CompressionMode::Plain).unwrap();

        assert_eq!(source.label(), file.path().display().to_string());
        assert_eq!(source.next_game().unwrap().unwrap().result_tag(), Some("1-0"));
    }
}
