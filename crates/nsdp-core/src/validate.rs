// ── Validation ──
//
// Runs before any device contact and reports every problem at once.
// Reads only need the identity and port checks so a bare `mac` can be
// imported; writes additionally require a complete addressing choice.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use nsdp_api::MacAddress;

use crate::error::CoreError;
use crate::model::{PortConfig, SwitchConfig};

pub const MIN_VLAN: u16 = 1;
pub const MAX_VLAN: u16 = 4093;

/// Checks needed by every operation: hardware address and declared ports.
pub fn validate_identity(config: &SwitchConfig) -> Result<MacAddress, Vec<CoreError>> {
    let mut errors = Vec::new();

    let mac = match config.mac.parse::<MacAddress>() {
        Ok(mac) => Some(mac),
        Err(err) => {
            errors.push(CoreError::InvalidMac { input: err.input });
            None
        }
    };

    check_ports(&config.ports, config.port_count, &mut errors);

    match mac {
        Some(mac) if errors.is_empty() => Ok(mac),
        _ => Err(errors),
    }
}

/// Checks for create, update and plan: identity plus addressing.
pub fn validate_for_write(config: &SwitchConfig) -> Result<MacAddress, Vec<CoreError>> {
    let (mac, mut errors) = match validate_identity(config) {
        Ok(mac) => (Some(mac), Vec::new()),
        Err(errors) => (None, errors),
    };

    // `dhcp = false` declares nothing: turning DHCP off is done by writing
    // a static address.
    match (&config.cidr, &config.gateway, config.dhcp.filter(|on| *on)) {
        (Some(_), Some(_), Some(_)) => errors.push(CoreError::validation(
            "dhcp",
            "conflicts with cidr and gateway; declare either a static address or dhcp",
        )),
        (Some(_), None, _) => {
            errors.push(CoreError::validation("gateway", "required when cidr is set"));
        }
        (None, Some(_), _) => {
            errors.push(CoreError::validation("cidr", "required when gateway is set"));
        }
        (None, None, None) if config.dhcp == Some(false) => errors.push(CoreError::validation(
            "dhcp",
            "dhcp = false needs a static address; declare cidr and gateway",
        )),
        (None, None, None) => errors.push(CoreError::validation(
            "cidr",
            "one of cidr+gateway or dhcp must be declared",
        )),
        (Some(_), Some(_), None) | (None, None, Some(_)) => {}
    }

    if let Some(cidr) = &config.cidr {
        if let Err(err) = parse_cidr(cidr) {
            errors.push(err);
        }
    }
    if let Some(gateway) = &config.gateway {
        if let Err(err) = parse_gateway(gateway) {
            errors.push(err);
        }
    }

    match mac {
        Some(mac) if errors.is_empty() => Ok(mac),
        _ => Err(errors),
    }
}

/// Port ids against the port count of a bound switch.
pub fn check_port_range(ports: &[PortConfig], port_count: u8) -> Result<(), Vec<CoreError>> {
    let errors: Vec<CoreError> = ports
        .iter()
        .filter(|p| p.id > port_count)
        .map(|p| {
            CoreError::validation(
                format!("ports[{}].id", p.id),
                format!("switch only has {port_count} ports"),
            )
        })
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Parse `a.b.c.d/len`. The prefix length is mandatory.
pub fn parse_cidr(raw: &str) -> Result<Ipv4Network, CoreError> {
    let invalid = |message: &str| CoreError::validation("cidr", format!("'{raw}' {message}"));

    let (addr, len) = raw
        .split_once('/')
        .ok_or_else(|| invalid("is missing a prefix length"))?;
    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|_| invalid("is not an IPv4 address"))?;
    let len: u8 = len
        .parse()
        .map_err(|_| invalid("has an invalid prefix length"))?;
    Ipv4Network::new(addr, len).map_err(|_| invalid("has a prefix length above 32"))
}

pub fn parse_gateway(raw: &str) -> Result<Ipv4Addr, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::validation("gateway", format!("'{raw}' is not an IPv4 address")))
}

fn check_ports(ports: &[PortConfig], port_count: Option<u8>, errors: &mut Vec<CoreError>) {
    let mut seen = BTreeSet::new();

    for port in ports {
        let field = |name: &str| format!("ports[{}].{name}", port.id);

        if port.id == 0 {
            errors.push(CoreError::validation(field("id"), "port ids start at 1"));
        }
        if let Some(count) = port_count {
            if port.id > count {
                errors.push(CoreError::validation(
                    field("id"),
                    format!("switch only has {count} ports"),
                ));
            }
        }
        if !seen.insert(port.id) {
            errors.push(CoreError::validation(field("id"), "declared more than once"));
        }

        if let Some(pvid) = port.pvid {
            if !(MIN_VLAN..=MAX_VLAN).contains(&pvid) {
                errors.push(CoreError::validation(
                    field("pvid"),
                    format!("{pvid} is outside {MIN_VLAN}-{MAX_VLAN}"),
                ));
            }
        }

        for (name, tags) in [("tagged", &port.tagged), ("untagged", &port.untagged)] {
            for tag in tags.iter().flatten() {
                if !(MIN_VLAN..=MAX_VLAN).contains(tag) {
                    errors.push(CoreError::validation(
                        field(name),
                        format!("VLAN {tag} is outside {MIN_VLAN}-{MAX_VLAN}"),
                    ));
                }
            }
        }

        if let (Some(tagged), Some(untagged)) = (&port.tagged, &port.untagged) {
            for tag in tagged.intersection(untagged) {
                errors.push(CoreError::validation(
                    field("tagged"),
                    format!("VLAN {tag} is also listed as untagged"),
                ));
            }
        }
    }
}
