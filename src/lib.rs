pub mod backoff;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod fs;
pub mod interface;
pub mod logger;
pub mod netlink;
pub mod route;

pub use config::{Config, DefaultRoutePolicy};
pub use environment::{EnvironmentDocument, discover, discover_and_write};
pub use error::{Error, Result};
pub use netlink::{InterfaceAddresses, NetlinkSource, NetworkSource, Route};
