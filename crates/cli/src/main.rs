mod cmd;
mod logging;
mod rank;
mod store;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jotlog_core::filter::Age;
use jotlog_core::query::{BoolMode, CaseMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "jot", version, about = "Slice and query a personal log of tagged entries")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// List entries matching tag, value, text and time filters
    Show(ShowArgs),

    /// Search entry titles and notes
    Search(SearchArgs),

    /// List tag names and how often they are used
    Tags(TagsArgs),
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    /// Titles only, one per line
    Quiet,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Tags to match, comma or space separated (repeatable)
    #[arg(long, short = 't')]
    pub tag: Vec<String>,

    /// How tags and value queries combine: and, or, not, pattern
    #[arg(long = "bool", default_value = "and")]
    pub bool_mode: BoolMode,

    /// Value query such as "progress > 50" (repeatable)
    #[arg(long)]
    pub val: Vec<String>,

    /// Free-text query over titles and notes
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Case handling for --search: sensitive, ignore, smart
    #[arg(long)]
    pub case: Option<CaseMode>,

    /// Match --search as one literal string
    #[arg(long, conflicts_with = "fuzzy")]
    pub exact: bool,

    /// Match --search with typo tolerance
    #[arg(long)]
    pub fuzzy: bool,

    /// Only entries whose section starts with this label ("All" for every section)
    #[arg(long)]
    pub section: Option<String>,

    /// Date or time span, e.g. "monday to friday" or "9am to 5pm"
    #[arg(long)]
    pub from: Option<String>,

    /// Only entries started before this date or time
    #[arg(long)]
    pub before: Option<String>,

    /// Only entries started after this date or time
    #[arg(long)]
    pub after: Option<String>,

    /// Only entries with a recorded duration
    #[arg(long)]
    pub only_timed: bool,

    /// Only entries started today
    #[arg(long, conflicts_with = "yesterday")]
    pub today: bool,

    /// Only entries started yesterday
    #[arg(long)]
    pub yesterday: bool,

    /// Only entries not marked @done
    #[arg(long)]
    pub unfinished: bool,

    /// Invert every filter
    #[arg(long = "not")]
    pub negate: bool,

    /// Maximum number of entries (0 = all)
    #[arg(long, short = 'n', default_value_t = 0)]
    pub count: usize,

    /// Which end of the list --count keeps: newest or oldest
    #[arg(long, default_value = "newest")]
    pub age: Age,

    /// Print oldest first
    #[arg(long)]
    pub asc: bool,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search query (`+must -not 'exact /regex/`)
    pub query: String,

    /// Order hits by relevance using the configured ranker
    #[arg(long)]
    pub rank: bool,

    /// Maximum number of results (0 = all)
    #[arg(long, short = 'n', default_value_t = 0)]
    pub count: usize,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Sort by count instead of name
    #[arg(long)]
    pub by_count: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref(), cli.profile.as_deref()),
        Commands::Show(args) => {
            cmd::show::run(cli.config.as_deref(), cli.profile.as_deref(), args)
        }
        Commands::Search(args) => {
            cmd::search::run(cli.config.as_deref(), cli.profile.as_deref(), args)
        }
        Commands::Tags(args) => {
            cmd::tags::run(cli.config.as_deref(), cli.profile.as_deref(), args)
        }
    }
}
