use std::fmt;
use std::io::Write;

use log::{debug, info};

use crate::backoff::Sleeper;
use crate::config::Config;
use crate::constants::{KEY_DEFAULT_IPV4, KEY_SUFFIX_IPV4};
use crate::error::{Error, Result};
use crate::fs::atomic_write;
use crate::interface::{InterfaceRecord, scan_interfaces};
use crate::netlink::NetworkSource;
use crate::route::resolve_default_interface;

/// Ordered `KEY=VALUE` pairs destined for the environment file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentDocument {
    entries: Vec<(String, String)>,
}

impl EnvironmentDocument {
    /// One line per interface with an IPv4 address, in record order. The
    /// DEFAULT_IPV4 line follows the default interface's own line.
    pub fn new(records: &[InterfaceRecord], default_interface: Option<&str>) -> Self {
        let mut entries = Vec::new();
        for record in records {
            let Some(ipv4) = record.ipv4 else {
                continue;
            };
            entries.push((interface_key(&record.name), ipv4.to_string()));
            if default_interface == Some(record.name.as_str()) {
                entries.push((KEY_DEFAULT_IPV4.to_string(), ipv4.to_string()));
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for EnvironmentDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

// "eth0.100" becomes "ETH0_100_IPV4".
fn interface_key(name: &str) -> String {
    format!("{}{}", name.to_uppercase().replace('.', "_"), KEY_SUFFIX_IPV4)
}

/// A single discovery attempt: resolve the default interface, scan
/// interfaces and format the document. Nothing is written.
pub fn discover<S: NetworkSource + ?Sized>(
    source: &S,
    config: &Config,
) -> Result<EnvironmentDocument> {
    let default_interface = resolve_default_interface(source, config.default_route_policy)?;
    let records = scan_interfaces(source)?;
    Ok(EnvironmentDocument::new(
        &records,
        default_interface.as_deref(),
    ))
}

/// Discover with bounded retries, then atomically replace the destination.
/// Persisting is attempted once; its failure is not retried here.
pub fn discover_and_write<S, Z>(source: &S, config: &Config, sleeper: &mut Z) -> Result<()>
where
    S: NetworkSource + ?Sized,
    Z: Sleeper + ?Sized,
{
    let document = config.retry.retry(sleeper, |attempt| {
        debug!("Discovery attempt {}", attempt);
        discover(source, config)
    })?;
    persist(config, &document)?;
    info!(
        "Wrote {} entries to {}",
        document.entries().len(),
        config.destination.display()
    );
    Ok(())
}

fn persist(config: &Config, document: &EnvironmentDocument) -> Result<()> {
    let contents = document.to_string();
    atomic_write(&config.destination, |mut f| {
        f.write_all(contents.as_bytes())?;
        Ok(())
    })
    .map_err(|e| Error::Persist(format!("{:#}", e)))
}
