//! Diagnostic logging for the CLI.
//!
//! Silent by default. `-v` enables `info` events, `-vv` and above enables
//! `debug`. Events go to stderr so stdout stays clean for `--json`.

use tracing::Level;
use tracing_subscriber::fmt;

/// Level for a `-v` repeat count, or `None` for silence.
pub fn level_for(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::INFO),
        _ => Some(Level::DEBUG),
    }
}

pub fn init(verbosity: u8) {
    let Some(level) = level_for(verbosity) else {
        return;
    };
    // A subscriber installed earlier (tests, embedding) wins.
    let _ = fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}
