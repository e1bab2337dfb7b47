//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Mother PID selection
//! - Polling interval
//! - Discovery strategy override
//! - Output format selection (human/JSON)
//! - Single-shot and quiet modes

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pidtree::models::{DiscoveryStrategy, PollingConfiguration};

pub fn build_command() -> Command {
    Command::new("pidtree")
        .version(env!("PIDTREE_VERSION"))
        .long_version(concat!(env!("PIDTREE_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("Track the process tree of a running process")
        .long_about(
            "Periodically discovers every descendant of a mother process and reaps \
             terminated children. Stops on SIGUSR1, SIGINT or SIGTERM, or when the \
             mother process exits.",
        )
        .arg(
            Arg::new("pid")
                .short('p')
                .long("pid")
                .value_name("PID")
                .help("Mother process to monitor")
                .required(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECONDS")
                .help("Polling interval in seconds (0.1-300)")
                .default_value("1.0")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("strategy")
                .short('s')
                .long("strategy")
                .value_name("STRATEGY")
                .help("Discovery strategy; auto probes /proc for child listings")
                .value_parser(["auto", "kernel", "pstree"])
                .default_value("auto"),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Output one JSON object per snapshot")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Take a single snapshot and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments and return configuration
pub fn parse_args() -> Result<PollingConfiguration> {
    config_from_matches(&build_command().get_matches())
}

pub fn config_from_matches(matches: &ArgMatches) -> Result<PollingConfiguration> {
    let pid = *matches.get_one::<i32>("pid").context("missing --pid")?;
    let interval = *matches
        .get_one::<f64>("interval")
        .context("missing --interval")?;

    let mut config = PollingConfiguration::new(pid, interval)?;
    config.strategy = match matches.get_one::<String>("strategy").map(String::as_str) {
        Some("kernel") => Some(DiscoveryStrategy::Kernel),
        Some("pstree") => Some(DiscoveryStrategy::Pstree),
        _ => None,
    };
    config.output_json = matches.get_flag("json");
    config.once = matches.get_flag("once");
    config.quiet_mode = matches.get_flag("quiet");

    Ok(config)
}
