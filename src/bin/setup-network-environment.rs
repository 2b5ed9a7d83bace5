use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use log::{debug, error};

use setup_network_environment::backoff::{RetryPolicy, ThreadSleeper};
use setup_network_environment::constants::{
    ENV_DEFAULT_ROUTE_POLICY, ENV_OUTPUT, ENV_RETRIES, ENV_RETRY_DELAY, ENV_VERBOSE,
    FILE_NETWORK_ENVIRONMENT, RETRY_ATTEMPTS,
};
use setup_network_environment::logger::init_logger;
use setup_network_environment::{
    Config, DefaultRoutePolicy, NetlinkSource, discover_and_write,
};

/// Write the host's IPv4 addresses and default interface to an environment file
#[derive(Clone, Debug, Parser)]
#[command(version)]
struct Cli {
    /// Environment file to write
    #[arg(short = 'o', long, env = ENV_OUTPUT, default_value = FILE_NETWORK_ENVIRONMENT)]
    output: PathBuf,

    /// Trace route and interface discovery on stderr
    #[arg(short, long, env = ENV_VERBOSE)]
    verbose: bool,

    /// Whether a missing default route aborts the run
    #[arg(long, env = ENV_DEFAULT_ROUTE_POLICY, value_enum, default_value_t = DefaultRoutePolicy::Strict)]
    default_route_policy: DefaultRoutePolicy,

    /// Discovery attempts before giving up
    #[arg(long, env = ENV_RETRIES, default_value_t = RETRY_ATTEMPTS)]
    retries: u32,

    /// Delay between discovery attempts
    #[arg(long, env = ENV_RETRY_DELAY, default_value = "10s", value_parser = humantime::parse_duration)]
    retry_delay: Duration,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            destination: cli.output,
            verbose: cli.verbose,
            retry: RetryPolicy::new(cli.retries, cli.retry_delay),
            default_route_policy: cli.default_route_policy,
        }
    }
}

fn main() {
    let config: Config = Cli::parse().into();

    if let Err(e) = init_logger(config.verbose) {
        // Use eprintln! here since the logger did not initialize.
        eprintln!("unable to initialize logger: {}", e);
        process::exit(exitcode::SOFTWARE);
    }
    debug!("Configuration: {:?}", config);

    let result = NetlinkSource::new()
        .and_then(|source| discover_and_write(&source, &config, &mut ThreadSleeper));
    if let Err(e) = result {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
