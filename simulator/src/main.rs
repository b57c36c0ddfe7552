//! Run a Streamlet population to its epoch budget and audit what it finalized.

use clap::{value_parser, Arg, Command};
use commonware_runtime::{deterministic, Metrics, Runner};
use std::process::ExitCode;
use streamlet::{
    audit, Config, Elector, Error, Hashed, HonestNode, Logger, Node, OfflineNode, Participant,
    RoundRobin, Scheduler,
};
use tracing::{error, info};

const ROUND_ROBIN: &str = "round-robin";
const HASHED: &str = "hashed";

/// Returns the version of the crate.
fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Finalized length of each node and every chain their union forms.
struct Summary {
    finalized: Vec<(u32, usize, bool)>,
    chains: Vec<Vec<u64>>,
}

async fn simulate<E: Elector>(
    context: deterministic::Context,
    config: Config,
    elector: E,
    offline: u32,
) -> Result<Summary, Error> {
    let online = config.node_count.saturating_sub(offline);
    let nodes = (0..config.node_count)
        .map(|index| {
            if index < online {
                Participant::Honest(HonestNode::new(
                    context.with_label(&format!("node_{index}")),
                    index,
                    elector.clone(),
                    config.clone(),
                ))
            } else {
                Participant::Offline(OfflineNode::new(index, elector.clone(), config.clone()))
            }
        })
        .collect();
    let scheduler = Scheduler::new(context.with_label("scheduler"), config, Logger);
    let nodes = scheduler.run(nodes).await?;

    let finalized = nodes
        .iter()
        .map(|node| {
            (
                node.index(),
                node.finalized().len(),
                matches!(node, Participant::Offline(_)),
            )
        })
        .collect();
    let chains = audit::finalized_chains(&nodes)
        .into_iter()
        .map(|chain| chain.iter().map(|block| block.epoch).collect())
        .collect();
    Ok(Summary { finalized, chains })
}

fn main() -> ExitCode {
    // Parse arguments
    let matches = Command::new("streamlet-simulator")
        .about("Simulate Streamlet consensus over discrete time.")
        .version(crate_version())
        .arg(
            Arg::new("delta")
                .long("delta")
                .default_value("1")
                .value_parser(value_parser!(u64))
                .help("Network delay bound; an epoch spans 2 * delta time units"),
        )
        .arg(
            Arg::new("nodes")
                .long("nodes")
                .default_value("10")
                .value_parser(value_parser!(u32))
                .help("Number of participants"),
        )
        .arg(
            Arg::new("max-dishonest")
                .long("max-dishonest")
                .default_value("3")
                .value_parser(value_parser!(u32))
                .help("Tolerated number of faulty participants (quorum is 2f+1)"),
        )
        .arg(
            Arg::new("t-zero")
                .long("t-zero")
                .default_value("0")
                .value_parser(value_parser!(u64))
                .help("Virtual time of the first tick"),
        )
        .arg(
            Arg::new("epochs")
                .long("epochs")
                .default_value("100")
                .value_parser(value_parser!(u64))
                .help("Stop after the first epoch at or beyond this value"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .default_value("0")
                .value_parser(value_parser!(u32))
                .help("Number of participants (taken from the highest indices) that stay silent"),
        )
        .arg(
            Arg::new("elector")
                .long("elector")
                .default_value(ROUND_ROBIN)
                .value_parser([ROUND_ROBIN, HASHED])
                .help("Leader election strategy"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .default_value("0")
                .value_parser(value_parser!(u64))
                .help("Seed of the deterministic runtime"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Maximum level of emitted logs"),
        )
        .get_matches();

    // Create logger
    let level = matches
        .get_one::<String>("log-level")
        .and_then(|level| level.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = Config::default();
    let arg = |name: &str| matches.get_one::<u64>(name).copied().unwrap_or_default();
    config.epoch_duration = arg("delta");
    config.start_time = arg("t-zero");
    config.epoch_budget = arg("epochs");
    let count = |name: &str| matches.get_one::<u32>(name).copied().unwrap_or_default();
    config.node_count = count("nodes");
    config.max_dishonest = count("max-dishonest");
    let offline = count("offline");
    let seed = arg("seed");
    let elector = matches
        .get_one::<String>("elector")
        .cloned()
        .unwrap_or_else(|| ROUND_ROBIN.to_string());
    if offline > config.node_count {
        error!(
            offline,
            nodes = config.node_count,
            "more offline nodes than participants"
        );
        return ExitCode::FAILURE;
    }
    info!(?config, offline, %elector, seed, "starting simulation");

    // Run to the epoch budget
    let executor = deterministic::Runner::seeded(seed);
    let result = executor.start(|context| async move {
        match elector.as_str() {
            HASHED => simulate(context, config, Hashed, offline).await,
            _ => simulate(context, config, RoundRobin, offline).await,
        }
    });
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = ?e, "simulation halted");
            return ExitCode::FAILURE;
        }
    };

    // Report
    for (index, length, offline) in &summary.finalized {
        let kind = if *offline { "offline" } else { "honest" };
        println!("node {index} ({kind}): finalized {length} blocks");
    }
    match summary.chains.len() {
        0 => println!("no blocks finalized"),
        1 => println!(
            "finalized blocks form a single chain of {} blocks: epochs {:?}",
            summary.chains[0].len(),
            summary.chains[0]
        ),
        forks => {
            error!(forks, "finalized blocks form conflicting chains");
            for (i, chain) in summary.chains.iter().enumerate() {
                println!("chain {i}: epochs {chain:?}");
            }
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
