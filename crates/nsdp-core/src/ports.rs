// ── VLAN/port mapping ──
//
// The switch keeps VLAN membership per VLAN (tag -> member ports); users
// declare it per port (port -> tagged/untagged tags). Everything here is
// scoped to declared ports. Undeclared ports are never reported or touched.

use std::collections::{BTreeMap, BTreeSet};

use nsdp_api::{Pvid, Pvids, TaggedVlans};

use crate::model::PortConfig;

/// One membership edit for a single (VLAN, port) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// Add the port to the VLAN, or change its tagged flag.
    Join { tag: u16, port: u8, tagged: bool },
    Leave { tag: u16, port: u8 },
}

impl MembershipChange {
    fn key(&self) -> (u16, u8) {
        match *self {
            Self::Join { tag, port, .. } | Self::Leave { tag, port } => (tag, port),
        }
    }
}

/// Per-port view of the device tables for the declared port ids.
///
/// Every declared id appears exactly once, in ascending order, with both
/// sets present. Ports missing from the tables come back empty and without
/// a PVID.
pub fn project(
    declared: impl IntoIterator<Item = u8>,
    pvids: &Pvids,
    vlans: &TaggedVlans,
) -> Vec<PortConfig> {
    let ids: BTreeSet<u8> = declared.into_iter().collect();

    ids.into_iter()
        .map(|id| {
            let mut tagged = BTreeSet::new();
            let mut untagged = BTreeSet::new();
            for (&tag, vlan) in vlans {
                match vlan.members.get(&id) {
                    Some(true) => {
                        tagged.insert(tag);
                    }
                    Some(false) => {
                        untagged.insert(tag);
                    }
                    None => {}
                }
            }
            PortConfig {
                id,
                pvid: pvids.get(&id).map(|p| p.value),
                tagged: Some(tagged),
                untagged: Some(untagged),
            }
        })
        .collect()
}

/// PVID entries for declared ports that carry one.
pub fn pvid_table(ports: &[PortConfig]) -> Pvids {
    ports
        .iter()
        .filter_map(|p| {
            p.pvid.map(|value| {
                (
                    p.id,
                    Pvid {
                        port: p.id,
                        value,
                    },
                )
            })
        })
        .collect()
}

/// Membership edits that bring `current` in line with the declared sets.
///
/// A port's existing tagged memberships are only removed when its `tagged`
/// set is declared, and likewise for untagged. Joins come first so a port
/// is never left without the VLAN it is moving to. Each group is ordered
/// by (tag, port).
pub fn membership_changes(ports: &[PortConfig], current: &TaggedVlans) -> Vec<MembershipChange> {
    let mut joins = Vec::new();
    let mut leaves = Vec::new();

    for port in ports.iter().filter(|p| p.manages_membership()) {
        let wanted = desired_membership(port);
        let actual: BTreeMap<u16, bool> = current
            .iter()
            .filter_map(|(&tag, vlan)| vlan.members.get(&port.id).map(|&tagged| (tag, tagged)))
            .collect();

        for (&tag, &tagged) in &wanted {
            if actual.get(&tag) != Some(&tagged) {
                joins.push(MembershipChange::Join {
                    tag,
                    port: port.id,
                    tagged,
                });
            }
        }

        for (&tag, &tagged) in &actual {
            let managed = if tagged {
                port.tagged.is_some()
            } else {
                port.untagged.is_some()
            };
            if managed && !wanted.contains_key(&tag) {
                leaves.push(MembershipChange::Leave { tag, port: port.id });
            }
        }
    }

    joins.sort_by_key(MembershipChange::key);
    leaves.sort_by_key(MembershipChange::key);
    joins.extend(leaves);
    joins
}

fn desired_membership(port: &PortConfig) -> BTreeMap<u16, bool> {
    let untagged = port.untagged.iter().flatten().map(|&tag| (tag, false));
    let tagged = port.tagged.iter().flatten().map(|&tag| (tag, true));
    untagged.chain(tagged).collect()
}
