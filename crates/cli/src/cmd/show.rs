//! `jot show`: list entries through the filter pipeline.

use std::path::Path;

use jotlog_core::chronify::NaturalChronify;
use jotlog_core::filter::{Filter, FilterOptions};
use jotlog_core::query::{NeverFinish, SearchMatching};

use super::open_log;
use super::output::{print_entries, resolve_format};
use crate::ShowArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: ShowArgs) {
    let log = open_log(config, profile);
    let (rc, entries) = (&log.config, &log.entries);

    let chronify = NaturalChronify::from_local_clock();
    let never = NeverFinish::new(&rc.never_finish);
    let filter = Filter::new(&chronify, &never, rc.search.clone());

    let format = resolve_format(args.output, args.json);
    let asc = args.asc;
    let options = to_options(args);

    let mut hits = match filter.run(entries, &options) {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if asc {
        hits.reverse();
    }
    print_entries(&hits, format);
}

fn to_options(args: ShowArgs) -> FilterOptions {
    let matching = if args.exact {
        Some(SearchMatching::Exact)
    } else if args.fuzzy {
        Some(SearchMatching::Fuzzy)
    } else {
        None
    };

    FilterOptions {
        section: args.section,
        tag: args.tag,
        bool_mode: args.bool_mode,
        val: args.val,
        search: args.search,
        case: args.case,
        matching,
        from: args.from,
        before: args.before,
        after: args.after,
        only_timed: args.only_timed,
        today: args.today,
        yesterday: args.yesterday,
        unfinished: args.unfinished,
        negate: args.negate,
        count: args.count,
        age: args.age,
        ..Default::default()
    }
}
