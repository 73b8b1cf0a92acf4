//! `lineage` command line
//!
//! Loads rows from a JSON file or the synthetic generator, applies filters
//! and prints graphs, options or summaries as pretty JSON. Logs go to stderr
//! and honor `RUST_LOG` (default `info`).

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lineage_aggregate::{FilterField, Selection};
use lineage_core::{
    Dashboard, EngineConfig, FixtureProvider, JsonFileFixture, SyntheticConfig, SyntheticFixture,
};
use lineage_graph::Tier;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("lineage")
        .version(lineage_core::VERSION)
        .about("Data lineage flow aggregation and graph construction")
        .subcommand_required(true)
        .arg(
            Arg::new("input")
                .long("input")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON array of lineage rows"),
        )
        .arg(
            Arg::new("synthetic")
                .long("synthetic")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("input")
                .help("Use generated rows instead of a file"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .global(true)
                .default_value("42")
                .value_parser(value_parser!(u64))
                .help("Seed for generated rows"),
        )
        .arg(
            Arg::new("rows")
                .long("rows")
                .global(true)
                .default_value("200")
                .value_parser(value_parser!(usize))
                .help("Number of generated rows"),
        )
        .arg(
            Arg::new("gbgf")
                .long("gbgf")
                .global(true)
                .help("GB/GF filter (default ALL)"),
        )
        .arg(
            Arg::new("eim-id")
                .long("eim-id")
                .global(true)
                .help("EIM id filter (default ALL)"),
        )
        .arg(
            Arg::new("app")
                .long("app")
                .global(true)
                .help("Application name filter (default ALL)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML or YAML engine configuration"),
        )
        .subcommand(Command::new("overview").about("Print the overview graph"))
        .subcommand(
            Command::new("detail")
                .about("Print the drill-down graph of one downstream application")
                .arg(
                    Arg::new("node")
                        .value_name("NODE_ID")
                        .required(true)
                        .help("Node id (downstream:<name>) or plain application name"),
                ),
        )
        .subcommand(
            Command::new("options")
                .about("Print the options of one filter field")
                .arg(
                    Arg::new("field")
                        .value_name("FIELD")
                        .required(true)
                        .value_parser(value_parser!(FilterField))
                        .help("gbgf, eimId or applicationName"),
                ),
        )
        .subcommand(Command::new("summary").about("Print headline figures"))
        .subcommand(Command::new("tag-flow").about("Print the GB/GF flow graph"))
        .subcommand(
            Command::new("generate")
                .about("Print generated rows as JSON")
                .arg(
                    Arg::new("malformed-rate")
                        .long("malformed-rate")
                        .default_value("0")
                        .value_parser(value_parser!(f64))
                        .help("Chance of one malformed numeric cell per row"),
                ),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn synthetic(args: &ArgMatches) -> SyntheticConfig {
    SyntheticConfig::default()
        .with_seed(args.get_one::<u64>("seed").copied().unwrap_or(42))
        .with_rows(args.get_one::<usize>("rows").copied().unwrap_or(200))
}

fn provider(args: &ArgMatches, config: &EngineConfig) -> anyhow::Result<Box<dyn FixtureProvider>> {
    if args.get_flag("synthetic") {
        return Ok(Box::new(SyntheticFixture::new(synthetic(args))));
    }

    match args.get_one::<PathBuf>("input").or(config.input.as_ref()) {
        Some(path) => Ok(Box::new(JsonFileFixture::new(path.clone()))),
        None => bail!("no input: pass --input <rows.json> or --synthetic"),
    }
}

fn dashboard(args: &ArgMatches) -> anyhow::Result<Dashboard> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let provider = provider(args, &config)?;
    let mut dashboard = Dashboard::new(config);
    dashboard
        .load_from(provider.as_ref())
        .with_context(|| format!("loading rows from {}", provider.name()))?;

    let filters = [
        (FilterField::Gbgf, "gbgf"),
        (FilterField::EimId, "eim-id"),
        (FilterField::ApplicationName, "app"),
    ];
    for (field, arg) in filters {
        if let Some(value) = args.get_one::<String>(arg) {
            let change = dashboard.set_filter(field, Selection::parse(value));
            for reset in change.reset {
                tracing::warn!(field = %reset, "filter reset to ALL, value unavailable");
            }
        }
    }

    Ok(dashboard)
}

/// A node id as given, or a plain application name turned into one
fn node_id_arg(node: &str) -> String {
    match Tier::of_node_id(node) {
        Some(_) => node.to_string(),
        None => Tier::Downstream.node_id(node),
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("generate", args)) => {
            let rate = args.get_one::<f64>("malformed-rate").copied().unwrap_or(0.0);
            let fixture = SyntheticFixture::new(synthetic(args).with_malformed_rate(rate));
            let rows: Vec<BTreeMap<String, String>> = fixture
                .rows()?
                .into_iter()
                .map(|row| row.into_iter().collect())
                .collect();
            print_json(&rows)
        }
        Some(("overview", args)) => print_json(&dashboard(args)?.overview()),
        Some(("summary", args)) => print_json(&dashboard(args)?.summary()),
        Some(("tag-flow", args)) => print_json(&dashboard(args)?.tag_flow()),
        Some(("options", args)) => {
            let Some(field) = args.get_one::<FilterField>("field").copied() else {
                bail!("missing FIELD");
            };
            print_json(&dashboard(args)?.options(field))
        }
        Some(("detail", args)) => {
            let Some(node) = args.get_one::<String>("node") else {
                bail!("missing NODE_ID");
            };
            let node_id = node_id_arg(node);

            let mut dashboard = dashboard(args)?;
            dashboard
                .select(&node_id)
                .with_context(|| format!("cannot drill into {node_id}"))?;
            print_json(&dashboard.current()?)
        }
        _ => bail!("unknown command"),
    }
}

fn main() -> ExitCode {
    init_logging();
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
