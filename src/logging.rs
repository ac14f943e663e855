use log::{LevelFilter, Log, Metadata, Record};
use std::env;

pub const LOG_ENV: &str = "EXTRACT_TUNE_LOG";

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Maps a level name to a filter; unknown names fall back to `Error`.
pub fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_lowercase().as_str() {
        "error" | "err" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" | "trace" => LevelFilter::Debug,
        "off" | "none" => LevelFilter::Off,
        _ => LevelFilter::Error,
    }
}

fn resolve_level(explicit: Option<&str>, from_env: Option<&str>) -> LevelFilter {
    explicit
        .or(from_env)
        .map(parse_level)
        .unwrap_or(LevelFilter::Warn)
}

/// Installs the stderr logger. `explicit` wins over `EXTRACT_TUNE_LOG`.
pub fn init(explicit: Option<&str>) {
    let from_env = env::var(LOG_ENV).ok();
    let level = resolve_level(explicit, from_env.as_deref());

    // A second call keeps the first logger but still adjusts the level.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
