// ── In-memory switch ──
//
// A `Controller` whose switches live in process memory and can be loaded
// from / saved to a JSON file. Every exchange is journaled so callers can
// assert exactly which requests reached the device, and any request kind
// can be made to fail on demand.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::mac::MacAddress;
use crate::protocol::{
    DeviceName, DeviceNetwork, Dhcp, Pvid, Pvids, TaggedVlan, TaggedVlans, VlanModeCode,
};
use crate::switch::{Controller, Switch};

const MAX_NAME_LEN: usize = 20;
const MAX_VLAN_TAG: u16 = 4093;

// ── Journal ─────────────────────────────────────────────────────────

/// One exchange with the device, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(RequestKind), derive(Hash, PartialOrd, Ord, strum::Display))]
pub enum Request {
    GetDeviceName,
    SetDeviceName(DeviceName),
    GetDhcp,
    SetDhcp(Dhcp),
    GetDeviceNetwork,
    SetDeviceNetwork(DeviceNetwork),
    GetVlanMode,
    GetPvids,
    SetPvids(Pvids),
    GetTaggedVlans,
    SetVlanMember { tag: u16, port: u8, tagged: bool },
    RemoveVlanMember { tag: u16, port: u8 },
    SetLoopDetection(bool),
}

impl Request {
    /// Returns `true` if the request mutates device state.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::GetDeviceName
                | Self::GetDhcp
                | Self::GetDeviceNetwork
                | Self::GetVlanMode
                | Self::GetPvids
                | Self::GetTaggedVlans
        )
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// Full state of one simulated switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedDevice {
    pub mac: MacAddress,
    pub model: String,
    pub port_count: u8,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dhcp: bool,
    pub network: DeviceNetwork,
    pub vlan_mode: VlanModeCode,
    #[serde(default)]
    pub loop_detection: bool,
    #[serde(default)]
    pub pvids: Pvids,
    #[serde(default)]
    pub vlans: TaggedVlans,

    #[serde(skip)]
    journal: Vec<Request>,
    #[serde(skip)]
    failures: BTreeSet<RequestKind>,
}

impl SimulatedDevice {
    /// A factory-fresh switch: DHCP on, advanced 802.1Q mode, every port an
    /// untagged member of VLAN 1 with PVID 1.
    pub fn new(
        mac: MacAddress,
        model: impl Into<String>,
        port_count: u8,
        password: impl Into<String>,
    ) -> Self {
        let ports = 1..=port_count;
        let pvids = ports
            .clone()
            .map(|port| (port, Pvid { port, value: 1 }))
            .collect();
        let default_vlan = TaggedVlan {
            members: ports.map(|port| (port, false)).collect(),
        };

        Self {
            mac,
            model: model.into(),
            port_count,
            password: password.into(),
            name: String::new(),
            dhcp: true,
            network: DeviceNetwork {
                ip: Ipv4Addr::new(192, 168, 0, 239),
                mask: Ipv4Addr::new(255, 255, 255, 0),
                gateway: Ipv4Addr::new(192, 168, 0, 254),
            },
            vlan_mode: VlanModeCode::ADVANCED_TAGGED,
            loop_detection: false,
            pvids,
            vlans: BTreeMap::from([(1, default_vlan)]),
            journal: Vec::new(),
            failures: BTreeSet::new(),
        }
    }

    /// Every exchange since the device was created or the journal was cleared.
    pub fn journal(&self) -> &[Request] {
        &self.journal
    }

    /// Only the exchanges that mutated state.
    pub fn writes(&self) -> Vec<&Request> {
        self.journal.iter().filter(|r| r.is_write()).collect()
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Make every future request of `kind` fail with `Error::Rejected`.
    pub fn fail_on(&mut self, kind: RequestKind) {
        self.failures.insert(kind);
    }

    fn check_port(&self, operation: RequestKind, port: u8) -> Result<(), Error> {
        if port == 0 || port > self.port_count {
            return Err(rejected(operation, format!("port {port} out of range")));
        }
        Ok(())
    }

    fn check_tag(operation: RequestKind, tag: u16) -> Result<(), Error> {
        if tag == 0 || tag > MAX_VLAN_TAG {
            return Err(rejected(operation, format!("VLAN {tag} out of range")));
        }
        Ok(())
    }
}

fn rejected(operation: RequestKind, message: impl Into<String>) -> Error {
    Error::Rejected {
        operation: operation.to_string(),
        message: message.into(),
    }
}

// ── Controller ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct DeviceFile {
    devices: Vec<SimulatedDevice>,
}

/// Registry of simulated switches keyed by hardware address.
///
/// Cheaply cloneable; clones share the same devices.
#[derive(Debug, Clone, Default)]
pub struct SimulatedController {
    devices: BTreeMap<MacAddress, Arc<Mutex<SimulatedDevice>>>,
}

impl SimulatedController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: SimulatedDevice) -> Self {
        self.insert(device);
        self
    }

    pub fn insert(&mut self, device: SimulatedDevice) {
        self.devices.insert(device.mac, Arc::new(Mutex::new(device)));
    }

    /// Shared handle to a device, for inspection or failure injection.
    pub fn device(&self, mac: MacAddress) -> Option<Arc<Mutex<SimulatedDevice>>> {
        self.devices.get(&mac).cloned()
    }

    /// Load devices from a JSON file (`{"devices": [...]}`).
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let file: DeviceFile = serde_json::from_str(&raw)?;
        let mut controller = Self::new();
        for device in file.devices {
            controller.insert(device);
        }
        debug!(path = %path.display(), count = controller.devices.len(), "loaded simulated devices");
        Ok(controller)
    }

    /// Persist every device back to `path`.
    pub async fn save(&self, path: &Path) -> Result<(), Error> {
        let mut devices = Vec::with_capacity(self.devices.len());
        for device in self.devices.values() {
            devices.push(device.lock().await.clone());
        }
        let json = serde_json::to_string_pretty(&DeviceFile { devices })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Controller for SimulatedController {
    type Switch = SimulatedSwitch;

    async fn use_switch(
        &self,
        mac: MacAddress,
        password: &SecretString,
    ) -> Result<SimulatedSwitch, Error> {
        let device = self.device(mac).ok_or(Error::Unreachable { mac })?;

        // Reads need no password; an empty one binds a read-only session.
        let read_only = password.expose_secret().is_empty();
        let (model, port_count) = {
            let guard = device.lock().await;
            if !read_only && guard.password != password.expose_secret() {
                return Err(Error::Authentication {
                    message: format!("password rejected by {mac}"),
                });
            }
            (guard.model.clone(), guard.port_count)
        };

        debug!(%mac, %model, read_only, "bound simulated switch");
        Ok(SimulatedSwitch {
            mac,
            model,
            port_count,
            read_only,
            device,
        })
    }
}

// ── Switch ──────────────────────────────────────────────────────────

/// Session with one simulated device.
#[derive(Debug, Clone)]
pub struct SimulatedSwitch {
    mac: MacAddress,
    model: String,
    port_count: u8,
    read_only: bool,
    device: Arc<Mutex<SimulatedDevice>>,
}

impl SimulatedSwitch {
    /// Journal the request, honor injected failures, then run `apply`
    /// against the locked device.
    async fn exchange<T, F>(&self, request: Request, apply: F) -> Result<T, Error>
    where
        F: FnOnce(&mut SimulatedDevice) -> Result<T, Error> + Send,
    {
        let kind = RequestKind::from(&request);
        if self.read_only && request.is_write() {
            return Err(Error::Authentication {
                message: format!("{kind} needs the device password"),
            });
        }
        let mut device = self.device.lock().await;
        debug!(mac = %self.mac, request = %kind, "simulated exchange");

        if device.failures.contains(&kind) {
            return Err(rejected(kind, "injected failure"));
        }
        device.journal.push(request);
        apply(&mut *device)
    }
}

impl Switch for SimulatedSwitch {
    fn model(&self) -> &str {
        &self.model
    }

    fn port_count(&self) -> u8 {
        self.port_count
    }

    fn hardware_addr(&self) -> MacAddress {
        self.mac
    }

    async fn get_device_name(&self) -> Result<DeviceName, Error> {
        self.exchange(Request::GetDeviceName, |d| {
            Ok(DeviceName {
                name: d.name.clone(),
            })
        })
        .await
    }

    async fn set_device_name(&self, name: &DeviceName) -> Result<(), Error> {
        let name = name.clone();
        self.exchange(Request::SetDeviceName(name.clone()), move |d| {
            if name.name.chars().count() > MAX_NAME_LEN {
                return Err(rejected(
                    RequestKind::SetDeviceName,
                    format!("name longer than {MAX_NAME_LEN} characters"),
                ));
            }
            d.name = name.name;
            Ok(())
        })
        .await
    }

    async fn get_dhcp(&self) -> Result<Dhcp, Error> {
        self.exchange(Request::GetDhcp, |d| Ok(Dhcp { enabled: d.dhcp }))
            .await
    }

    async fn set_dhcp(&self, dhcp: Dhcp) -> Result<(), Error> {
        self.exchange(Request::SetDhcp(dhcp), move |d| {
            d.dhcp = dhcp.enabled;
            Ok(())
        })
        .await
    }

    async fn get_device_network(&self) -> Result<DeviceNetwork, Error> {
        self.exchange(Request::GetDeviceNetwork, |d| Ok(d.network))
            .await
    }

    /// Assigning a static address switches the device to static addressing.
    async fn set_device_network(&self, network: &DeviceNetwork) -> Result<(), Error> {
        let network = *network;
        self.exchange(Request::SetDeviceNetwork(network), move |d| {
            d.network = network;
            d.dhcp = false;
            Ok(())
        })
        .await
    }

    async fn get_vlan_mode(&self) -> Result<VlanModeCode, Error> {
        self.exchange(Request::GetVlanMode, |d| Ok(d.vlan_mode))
            .await
    }

    async fn get_pvids(&self) -> Result<Pvids, Error> {
        self.exchange(Request::GetPvids, |d| Ok(d.pvids.clone()))
            .await
    }

    async fn set_pvids(&self, pvids: &Pvids) -> Result<(), Error> {
        let pvids = pvids.clone();
        self.exchange(Request::SetPvids(pvids.clone()), move |d| {
            for entry in pvids.values() {
                d.check_port(RequestKind::SetPvids, entry.port)?;
                SimulatedDevice::check_tag(RequestKind::SetPvids, entry.value)?;
            }
            d.pvids.extend(pvids);
            Ok(())
        })
        .await
    }

    async fn get_tagged_vlans(&self) -> Result<TaggedVlans, Error> {
        self.exchange(Request::GetTaggedVlans, |d| Ok(d.vlans.clone()))
            .await
    }

    async fn set_vlan_member(&self, tag: u16, port: u8, tagged: bool) -> Result<(), Error> {
        let request = Request::SetVlanMember { tag, port, tagged };
        self.exchange(request, move |d| {
            d.check_port(RequestKind::SetVlanMember, port)?;
            SimulatedDevice::check_tag(RequestKind::SetVlanMember, tag)?;
            d.vlans.entry(tag).or_default().members.insert(port, tagged);
            Ok(())
        })
        .await
    }

    async fn remove_vlan_member(&self, tag: u16, port: u8) -> Result<(), Error> {
        self.exchange(Request::RemoveVlanMember { tag, port }, move |d| {
            if let Some(vlan) = d.vlans.get_mut(&tag) {
                vlan.members.remove(&port);
            }
            Ok(())
        })
        .await
    }

    async fn set_loop_detection(&self, enabled: bool) -> Result<(), Error> {
        self.exchange(Request::SetLoopDetection(enabled), move |d| {
            d.loop_detection = enabled;
            Ok(())
        })
        .await
    }
}
