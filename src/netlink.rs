use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use futures::{Stream, StreamExt};
use log::debug;
use netlink_packet_route::AddressFamily;
use netlink_packet_route::address::{AddressAttribute, AddressMessage};
use netlink_packet_route::link::{LinkAttribute, LinkMessage};
use netlink_packet_route::route::{RouteAttribute, RouteMessage};
use rtnetlink::{Error as NlError, Handle as NlHandle, RouteMessageBuilder, new_connection};
use tokio::runtime::{Builder, Runtime};

use crate::constants::RT_TABLE_MAIN;
use crate::error::{Error, Result};

/// A routing table entry as far as default route resolution cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub interface: Option<String>,
    pub is_default: bool,
}

/// An interface and its bound addresses in `address/prefix_len` form, in the
/// order the kernel reported them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceAddresses {
    pub name: String,
    pub addresses: Vec<String>,
}

/// Read-only view of the host's network state.
pub trait NetworkSource {
    fn list_routes(&self) -> Result<Vec<Route>>;
    fn list_interfaces(&self) -> Result<Vec<InterfaceAddresses>>;
}

#[derive(Clone, Debug)]
struct LinkEntry {
    index: u32,
    name: String,
}

/// [`NetworkSource`] backed by rtnetlink. Owns a current-thread runtime so
/// callers stay synchronous.
pub struct NetlinkSource {
    rt: Runtime,
    handle: NlHandle,
}

impl NetlinkSource {
    pub fn new() -> Result<Self> {
        let rt = Builder::new_current_thread()
            .enable_io()
            .build()
            .map_err(|e| Error::Connection(format!("unable to start runtime: {}", e)))?;
        let (connection, handle, _) = {
            let _guard = rt.enter();
            new_connection().map_err(|e| Error::Connection(e.to_string()))?
        };
        rt.spawn(connection);
        Ok(Self { rt, handle })
    }

    fn link_stream(&self) -> impl Stream<Item = Result<LinkMessage, NlError>> {
        self.handle.link().get().execute()
    }

    fn address_stream(
        &self,
        ifindex: u32,
    ) -> impl Stream<Item = Result<AddressMessage, NlError>> {
        self.handle
            .address()
            .get()
            .set_link_index_filter(ifindex)
            .execute()
    }

    fn route_stream(&self) -> impl Stream<Item = Result<RouteMessage, NlError>> {
        let msg = RouteMessageBuilder::<Ipv4Addr>::default().build();
        self.handle.route().get(msg).execute()
    }

    async fn get_links(&self) -> Result<Vec<LinkEntry>, NlError> {
        let mut entries = Vec::new();
        let mut links = self.link_stream();
        while let Some(link_res) = links.next().await {
            let link = link_res?;
            match extract_link(&link) {
                Some(entry) => entries.push(entry),
                None => debug!("Skipping link {} without a name", link.header.index),
            }
        }
        Ok(entries)
    }

    async fn get_routes(&self) -> Result<Vec<Route>> {
        let links = self
            .get_links()
            .await
            .map_err(|e| Error::RouteQuery(format!("unable to list links: {}", e)))?;
        let names: HashMap<u32, String> = links.into_iter().map(|l| (l.index, l.name)).collect();

        let mut routes = Vec::new();
        let mut stream = self.route_stream();
        while let Some(route_res) = stream.next().await {
            let msg = route_res.map_err(|e| Error::RouteQuery(e.to_string()))?;
            if let Some(route) = extract_route(&msg, &names) {
                routes.push(route);
            }
        }
        Ok(routes)
    }

    async fn get_interfaces(&self) -> Result<Vec<InterfaceAddresses>> {
        let links = self
            .get_links()
            .await
            .map_err(|e| Error::InterfaceEnumeration(e.to_string()))?;
        let mut interfaces = Vec::with_capacity(links.len());
        for link in links {
            let mut addresses = Vec::new();
            let mut stream = self.address_stream(link.index);
            while let Some(addr_res) = stream.next().await {
                let msg = addr_res.map_err(|e| Error::AddressEnumeration {
                    interface: link.name.clone(),
                    message: e.to_string(),
                })?;
                if let Some(address) = extract_address(&msg) {
                    addresses.push(address);
                }
            }
            debug!("Interface {}: addresses = {:?}", link.name, addresses);
            interfaces.push(InterfaceAddresses {
                name: link.name,
                addresses,
            });
        }
        Ok(interfaces)
    }
}

impl NetworkSource for NetlinkSource {
    fn list_routes(&self) -> Result<Vec<Route>> {
        self.rt.block_on(self.get_routes())
    }

    fn list_interfaces(&self) -> Result<Vec<InterfaceAddresses>> {
        self.rt.block_on(self.get_interfaces())
    }
}

// Links without a name cannot be turned into a key and are left out.
fn extract_link(link: &LinkMessage) -> Option<LinkEntry> {
    let name = link.attributes.iter().find_map(|nla| match nla {
        LinkAttribute::IfName(n) if !n.is_empty() => Some(n.clone()),
        _ => None,
    })?;
    Some(LinkEntry {
        index: link.header.index,
        name,
    })
}

// Routes outside the main table are not considered. The table attribute
// carries ids above 255 which do not fit the header field.
fn extract_route(msg: &RouteMessage, names: &HashMap<u32, String>) -> Option<Route> {
    let table = msg
        .attributes
        .iter()
        .find_map(|a| match a {
            RouteAttribute::Table(id) => Some(*id),
            _ => None,
        })
        .unwrap_or(msg.header.table as u32);
    if table != RT_TABLE_MAIN {
        return None;
    }
    let interface = msg
        .attributes
        .iter()
        .find_map(|a| match a {
            RouteAttribute::Oif(idx) => Some(*idx),
            _ => None,
        })
        .and_then(|idx| names.get(&idx).cloned());
    Some(Route {
        interface,
        is_default: msg.header.destination_prefix_length == 0,
    })
}

// For IPv4 the local address is the interface's own; the address attribute
// is the peer on point-to-point links.
fn extract_address(msg: &AddressMessage) -> Option<String> {
    let mut local: Option<IpAddr> = None;
    let mut address: Option<IpAddr> = None;
    for attr in &msg.attributes {
        match attr {
            AddressAttribute::Local(ip) => local = Some(*ip),
            AddressAttribute::Address(ip) => address = Some(*ip),
            _ => {}
        }
    }
    let ip = if msg.header.family == AddressFamily::Inet {
        local.or(address)
    } else {
        address.or(local)
    }?;
    Some(format!("{}/{}", ip, msg.header.prefix_len))
}
