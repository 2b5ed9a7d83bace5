use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::backoff::RetryPolicy;
use crate::constants::FILE_NETWORK_ENVIRONMENT;

/// What to do when the routing table has no default route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DefaultRoutePolicy {
    /// Abort the attempt.
    #[default]
    Strict,
    /// Carry on without a DEFAULT_IPV4 line.
    Lenient,
}

impl fmt::Display for DefaultRoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultRoutePolicy::Strict => write!(f, "strict"),
            DefaultRoutePolicy::Lenient => write!(f, "lenient"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub destination: PathBuf,
    pub verbose: bool,
    pub retry: RetryPolicy,
    pub default_route_policy: DefaultRoutePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(FILE_NETWORK_ENVIRONMENT),
            verbose: false,
            retry: RetryPolicy::default(),
            default_route_policy: DefaultRoutePolicy::default(),
        }
    }
}
