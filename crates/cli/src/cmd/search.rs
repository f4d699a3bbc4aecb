//! Search command implementation.

use std::path::Path;

use jotlog_core::chronify::NaturalChronify;
use jotlog_core::filter::{Filter, FilterOptions};
use jotlog_core::query::NeverFinish;

use super::open_log;
use super::output::{print_entries, resolve_format};
use crate::SearchArgs;
use crate::rank::SearchRanker;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: SearchArgs) {
    let log = open_log(config, profile);
    let (rc, entries) = (&log.config, &log.entries);
    let format = resolve_format(args.output, args.json);

    let mut hits = if args.rank {
        let ranker = SearchRanker::from_config(&rc.search);
        match ranker.rank(entries, &args.query) {
            Ok(hits) => hits,
            Err(e) => {
                eprintln!("Error running ranker '{}': {e}", rc.search.ranker);
                std::process::exit(1);
            }
        }
    } else {
        let chronify = NaturalChronify::from_local_clock();
        let never = NeverFinish::new(&rc.never_finish);
        let filter = Filter::new(&chronify, &never, rc.search.clone());
        let options = FilterOptions { search: Some(args.query.clone()), ..Default::default() };
        match filter.run(entries, &options) {
            Ok(hits) => hits,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    };

    if args.count > 0 {
        hits.truncate(args.count);
    }
    print_entries(&hits, format);
}
