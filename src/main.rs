use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lms_search::render::{render_error, render_explain, render_matches};
use lms_search::repl::{self, Session};
use lms_search::{read_records, Config, SearchEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lms-search")]
#[command(about = "Advanced search over student and course records", long_about = None)]
struct Args {
    /// Directory holding lms-search.toml and .env
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    /// Compiled-query cache size (0 disables caching)
    #[arg(long, global = true)]
    cache_capacity: Option<usize>,

    /// Pretty-print matched records as one JSON array
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the records matching a query
    Query {
        /// Filter expression, e.g. "average>=90 AND courses>=4"
        query: String,

        /// JSON array or JSON Lines file ("-" or omitted reads stdin)
        #[arg(short, long)]
        records: Option<PathBuf>,
    },

    /// Show how a query is parsed
    Explain {
        /// Filter expression
        query: String,
    },

    /// Interactive search session
    Repl {
        /// JSON array or JSON Lines file
        #[arg(short, long)]
        records: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lms_search=info,lmsql_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(&args.config)?;
    if let Some(capacity) = args.cache_capacity {
        config.engine.cache_capacity = capacity;
    }
    if args.pretty {
        config.output.pretty = true;
    }
    if args.no_color {
        config.output.color = false;
    }
    if !config.output.color {
        colored::control::set_override(false);
    }
    tracing::debug!(?config, "Configuration loaded");

    let engine = SearchEngine::with_config(&config.engine);

    match args.command {
        Command::Query { query, records } => {
            let records = read_records(records.as_deref())?;
            match engine.search(&records, &query) {
                Ok(matches) => {
                    print!("{}", render_matches(&matches, config.output.pretty)?);
                    if config.output.pretty {
                        println!();
                    }
                    tracing::info!("{} of {} records match", matches.len(), records.len());
                }
                Err(e) => {
                    eprintln!("{}", render_error(&e, &query, config.output.color));
                    std::process::exit(2);
                }
            }
        }

        Command::Explain { query } => match engine.compile(&query) {
            Ok(compiled) => print!("{}", render_explain(&compiled)),
            Err(e) => {
                eprintln!("{}", render_error(&e, &query, config.output.color));
                std::process::exit(2);
            }
        },

        Command::Repl { records } => {
            let records = read_records(Some(records.as_path()))?;
            let session = Session::new(&engine, records, config.output);
            repl::run(&session)?;
        }
    }

    Ok(())
}
