use log::{debug, warn};

use crate::config::DefaultRoutePolicy;
use crate::error::{Error, Result};
use crate::netlink::{NetworkSource, Route};

/// Name of the interface carrying the default route. `None` only when there
/// is no default route and the policy is lenient.
pub fn resolve_default_interface<S: NetworkSource + ?Sized>(
    source: &S,
    policy: DefaultRoutePolicy,
) -> Result<Option<String>> {
    debug!("Querying routes");
    let routes = source.list_routes().inspect_err(|e| debug!("Route query failed: {}", e))?;
    debug!("Found {} routes", routes.len());

    let candidates = default_interfaces(&routes)?;
    match pick_default_interface(candidates) {
        Some(name) => {
            debug!("Using {} interface as first default", name);
            Ok(Some(name))
        }
        None => match policy {
            DefaultRoutePolicy::Strict => Err(Error::NoDefaultRoute),
            DefaultRoutePolicy::Lenient => {
                warn!("No default route found, continuing without DEFAULT_IPV4");
                Ok(None)
            }
        },
    }
}

// A default route without an interface is a broken entry, not one to skip.
fn default_interfaces(routes: &[Route]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for (i, route) in routes.iter().enumerate() {
        debug!("{}", route_trace(i, route));
        if route.is_default {
            let name = route
                .interface
                .as_ref()
                .ok_or(Error::UnresolvedDefaultRoute)?;
            names.push(name.clone());
        }
    }
    Ok(names)
}

fn route_trace(index: usize, route: &Route) -> String {
    format!(
        "Route {}: interface = {}, default = {}",
        index,
        route.interface.as_deref().unwrap_or("none"),
        route.is_default
    )
}

/// Deterministic choice among competing default routes: the lexicographically
/// smallest interface name. Kernel dump order is not relied upon.
pub fn pick_default_interface(mut names: Vec<String>) -> Option<String> {
    names.sort();
    names.into_iter().next()
}
