use std::time::Duration;

pub const FILE_NETWORK_ENVIRONMENT: &str = "/etc/network-environment";

pub const ENV_OUTPUT: &str = "NETWORK_ENVIRONMENT_FILE";
pub const ENV_VERBOSE: &str = "NETWORK_ENVIRONMENT_VERBOSE";
pub const ENV_DEFAULT_ROUTE_POLICY: &str = "NETWORK_ENVIRONMENT_DEFAULT_ROUTE_POLICY";
pub const ENV_RETRIES: &str = "NETWORK_ENVIRONMENT_RETRIES";
pub const ENV_RETRY_DELAY: &str = "NETWORK_ENVIRONMENT_RETRY_DELAY";

pub const KEY_DEFAULT_IPV4: &str = "DEFAULT_IPV4";
pub const KEY_SUFFIX_IPV4: &str = "_IPV4";

pub const RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

pub const RT_TABLE_MAIN: u32 = 254;
