pub mod doctor;
pub mod output;
pub mod search;
pub mod show;
pub mod tags;

use std::path::Path;

use jotlog_core::config::{ConfigLoader, ResolvedConfig};
use jotlog_core::entry::Entry;

use crate::logging::{self, LogGuard};
use crate::store;

/// A loaded log with its config. Keep it alive until output is written.
pub(crate) struct OpenLog {
    pub config: ResolvedConfig,
    pub entries: Vec<Entry>,
    _log: LogGuard,
}

/// Load config, start logging, and read the log, exiting on failure.
pub(crate) fn open_log(config: Option<&Path>, profile: Option<&str>) -> OpenLog {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };
    let log = start_logging(&rc);

    match store::load_entries(&rc.log_file) {
        Ok(entries) => OpenLog { config: rc, entries, _log: log },
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Start logging, exiting when the diagnostics file cannot be opened.
pub(crate) fn start_logging(rc: &ResolvedConfig) -> LogGuard {
    logging::init(rc).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}
