use anyhow::Context;
use clap::Parser;
use extract_tune::reader::{self, InputSource};
use extract_tune::{
    CommentRule, CompressionMode, Config, Error, Extractor, InvalidGames, MissingComment, logging,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "extract-tune",
    version,
    about = "Extract `fen,,result` tuning records from PGN games"
)]
struct Args {
    /// PGN files or glob patterns; none or `-` reads stdin
    inputs: Vec<String>,

    /// Write records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep capture moves
    #[arg(long)]
    include_captures: bool,

    /// First comment character marking a mate score
    #[arg(long, default_value_t = 'M')]
    mate_marker: char,

    /// Exclude moves whose comment matches this regex instead of the marker test
    #[arg(long, value_name = "REGEX", conflicts_with = "mate_marker")]
    exclude_comment: Option<String>,

    /// Treat a move without a comment as a fatal error
    #[arg(long)]
    strict_comments: bool,

    /// Warn and keep the legal prefix of games with illegal moves instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Input decompression: auto, plain or zstd
    #[arg(long, default_value = "auto", value_parser = CompressionMode::parse)]
    compression: CompressionMode,

    /// error, warn, info or debug (overrides EXTRACT_TUNE_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            exclude_captures: !self.include_captures,
            comment_rule: match &self.exclude_comment {
                Some(pattern) => CommentRule::Pattern(pattern.clone()),
                None => CommentRule::Marker(self.mate_marker),
            },
            missing_comment: if self.strict_comments {
                MissingComment::Fail
            } else {
                MissingComment::Include
            },
            invalid_games: if self.skip_invalid {
                InvalidGames::Truncate
            } else {
                InvalidGames::Fail
            },
            compression: self.compression,
        }
    }
}

fn extract_all<W: Write + ?Sized>(
    extractor: &mut Extractor,
    inputs: &[InputSource],
    compression: CompressionMode,
    out: &mut W,
) -> extract_tune::Result<()> {
    for input in inputs {
        log::info!("Reading {}", input);
        let mut source = reader::open_source(input, compression)?;
        extractor.run(&mut source, out)?;
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.config();
    let policy = config.filter_policy()?;
    let inputs = reader::resolve_inputs(args.inputs.as_slice())?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut extractor = Extractor::new(policy, config.invalid_games);
    let result = extract_all(&mut extractor, &inputs, config.compression, &mut out);
    let flushed = out.flush().map_err(Error::Write);

    log::info!("{}", extractor.stats());
    result?;
    flushed?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level.as_deref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<Error>().is_some_and(Error::is_broken_pipe) {
                return ExitCode::SUCCESS;
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["extract-tune"]).unwrap();
        let config = args.config();

        assert!(args.inputs.is_empty());
        assert!(config.exclude_captures);
        assert_eq!(config.comment_rule, CommentRule::Marker('M'));
        assert_eq!(config.missing_comment, MissingComment::Include);
        assert_eq!(config.invalid_games, InvalidGames::Fail);
        assert_eq!(config.compression, CompressionMode::Auto);
    }

    #[test]
    fn test_args_all_options() {
        let args = Args::try_parse_from([
            "extract-tune",
            "--include-captures",
            "--exclude-comment",
            "^[+-]?M",
            "--strict-comments",
            "--skip-invalid",
            "--compression",
            "ZSTD",
            "-o",
            "out.csv",
            "a.pgn",
            "games/*.pgn.zst",
        ])
        .unwrap();
        let config = args.config();

        assert_eq!(args.inputs, vec!["a.pgn", "games/*.pgn.zst"]);
        assert_eq!(args.output, Some(PathBuf::from("out.csv")));
        assert!(!config.exclude_captures);
        assert_eq!(config.comment_rule, CommentRule::Pattern("^[+-]?M".to_string()));
        assert_eq!(config.missing_comment, MissingComment::Fail);
        assert_eq!(config.invalid_games, InvalidGames::Truncate);
        assert_eq!(config.compression, CompressionMode::Zstd);
    }

    #[test]
    fn test_args_reject_bad_compression() {
        assert!(Args::try_parse_from(["extract-tune", "--compression", "gzip"]).is_err());
    }

    #[test]
    fn test_args_marker_and_pattern_conflict() {
        assert!(
            Args::try_parse_from([
                "extract-tune",
                "--mate-marker",
                "#",
                "--exclude-comment",
                "M"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.pgn");
        let output = dir.path().join("records.csv");
        std::fs::write(
            &input,
            "[Result \"1-0\"]\n\n1. e4 {good} e5 {M3} 1-0\n",
        )
        .unwrap();

        let args = Args::try_parse_from([
            OsStr::new("extract-tune"),
            OsStr::new("-o"),
            output.as_os_str(),
            input.as_os_str(),
        ])
        .unwrap();
        run(&args).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1,,1\n"
        );
    }
}
