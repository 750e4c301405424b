//! Minimal stderr sink for the `log` facade.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Maps the `-v` count to a level filter: warnings by default, then debug, then trace.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => Level::Debug.to_level_filter(),
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbose: u8) {
    // A logger may already be installed when running under a test harness.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_for(verbose));
    }
}
