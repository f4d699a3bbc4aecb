use jotlog_core::config::{ConfigLoader, default_config_path};
use std::path::Path;

use super::start_logging;
use crate::store;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            let _log = start_logging(&rc);
            println!("OK   jot doctor");
            println!("path: {}", rc.config_path.display());
            println!("profile: {}", rc.active_profile);
            println!("log_file: {}", rc.log_file.display());
            match store::load_entries(&rc.log_file) {
                Ok(entries) if rc.log_file.exists() => println!("entries: {}", entries.len()),
                Ok(_) => println!("entries: 0 (file not created yet)"),
                Err(e) => {
                    println!("FAIL {e}");
                    std::process::exit(1);
                }
            }
            println!("search.matching: {}", rc.search.matching);
            println!("search.distance: {}", rc.search.distance);
            println!("search.case: {}", rc.search.case);
            println!("search.ranker: {}", rc.search.ranker);
            println!("never_finish: [{}]", rc.never_finish.join(", "));
        }
        Err(e) => {
            println!("FAIL jot doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
