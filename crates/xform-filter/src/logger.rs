//! Line-protocol logging.
//!
//! The invoking server reads the error channel line by line, classifying
//! lines by their `ERROR:`/`INFO:`/`DEBUG:` prefixes, so log records are
//! formatted to that protocol instead of env_logger's default layout.

use std::io::Write;

use log::{Level, LevelFilter};

/// Install the stderr logger.
///
/// The base level comes from `SERVER_LOGLEVEL` (`debug` or `info`); each
/// `-v` raises it one step.
pub fn init(verbose: u8, server_loglevel: Option<&str>) {
    let base = match server_loglevel {
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        _ => LevelFilter::Warn,
    };
    let level = match verbose {
        0 => base,
        1 => base.max(LevelFilter::Info),
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            let prefix = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARNING",
                Level::Info => "INFO",
                Level::Debug | Level::Trace => "DEBUG",
            };
            writeln!(buf, "{prefix}: {}", record.args())
        })
        .init();
}
