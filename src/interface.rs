use std::net::{IpAddr, Ipv4Addr};

use cidr::IpInet;
use log::debug;

use crate::error::Result;
use crate::netlink::NetworkSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub ipv4: Option<Ipv4Addr>,
}

/// One record per interface, in enumeration order. Any enumeration failure
/// fails the whole scan.
pub fn scan_interfaces<S: NetworkSource + ?Sized>(source: &S) -> Result<Vec<InterfaceRecord>> {
    let interfaces = source.list_interfaces()?;
    Ok(interfaces
        .into_iter()
        .map(|interface| {
            let ipv4 = first_ipv4(interface.addresses.as_slice());
            debug!("Interface {}: ipv4 = {:?}", interface.name, ipv4);
            InterfaceRecord {
                name: interface.name,
                ipv4,
            }
        })
        .collect())
}

// Only the first IPv4 address counts; later ones on the same interface are
// ignored. Entries that are not in address/prefix form are skipped.
fn first_ipv4<S: AsRef<str>>(addresses: &[S]) -> Option<Ipv4Addr> {
    addresses.iter().find_map(|a| {
        let a = a.as_ref();
        if !a.contains('/') {
            return None;
        }
        match a.parse::<IpInet>().ok()?.address() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::netlink::test::{FakeSource, iface};

    #[test]
    fn test_first_ipv4() {
        struct Case<'a> {
            addresses: &'a [&'a str],
            expected: Option<Ipv4Addr>,
        }
        let cases = [
            Case {
                addresses: &[],
                expected: None,
            },
            Case {
                addresses: &["10.0.0.5/24"],
                expected: Some(Ipv4Addr::new(10, 0, 0, 5)),
            },
            Case {
                addresses: &["fe80::1/64", "10.0.0.5/24", "10.0.0.6/24"],
                expected: Some(Ipv4Addr::new(10, 0, 0, 5)),
            },
            Case {
                addresses: &["fe80::1/64", "2001:db8::1/64"],
                expected: None,
            },
            Case {
                addresses: &["garbage", "10.0.0.5", "192.168.1.10/33", "192.168.1.10/24"],
                expected: Some(Ipv4Addr::new(192, 168, 1, 10)),
            },
        ];
        for case in cases {
            assert_eq!(case.expected, first_ipv4(case.addresses));
        }
    }

    #[test]
    fn test_scan_interfaces() {
        let source = FakeSource::new(
            vec![],
            vec![
                iface("lo", &["127.0.0.1/8", "::1/128"]),
                iface("eth0", &["fe80::1/64", "10.0.0.5/24", "10.0.0.6/24"]),
                iface("eth1", &[]),
            ],
        );
        let records = scan_interfaces(&source).unwrap();
        assert_eq!(
            records,
            vec![
                InterfaceRecord {
                    name: "lo".into(),
                    ipv4: Some(Ipv4Addr::LOCALHOST),
                },
                InterfaceRecord {
                    name: "eth0".into(),
                    ipv4: Some(Ipv4Addr::new(10, 0, 0, 5)),
                },
                InterfaceRecord {
                    name: "eth1".into(),
                    ipv4: None,
                },
            ]
        );
    }

    #[test]
    fn test_scan_interfaces_errors() {
        let source = FakeSource {
            routes: Ok(vec![]),
            interfaces: Err(Error::AddressEnumeration {
                interface: "eth0".into(),
                message: "no buffer space available".into(),
            }),
        };
        assert!(matches!(
            scan_interfaces(&source),
            Err(Error::AddressEnumeration { interface, .. }) if interface == "eth0"
        ));

        let source = FakeSource {
            routes: Ok(vec![]),
            interfaces: Err(Error::InterfaceEnumeration("permission denied".into())),
        };
        assert_eq!(
            scan_interfaces(&source),
            Err(Error::InterfaceEnumeration("permission denied".into()))
        );
    }
}
