use nsdp_core::{SwitchConfig, lifecycle, validate};
use serde::Serialize;

use super::Session;
use crate::cli::InfoArgs;
use crate::error::CliError;
use crate::output;

/// Identity and management address of one switch.
#[derive(Debug, Serialize)]
struct SwitchInfo {
    mac: String,
    model: String,
    name: String,
    port_count: Option<u8>,
    dhcp: bool,
    ip: Option<String>,
    mask: Option<String>,
    gateway: Option<String>,
    vlan_mode: String,
}

impl SwitchInfo {
    fn from_config(config: SwitchConfig) -> Self {
        let network = config
            .cidr
            .as_deref()
            .and_then(|cidr| validate::parse_cidr(cidr).ok());
        Self {
            mac: config.id.unwrap_or(config.mac),
            model: config.model.unwrap_or_default(),
            name: config.name.unwrap_or_default(),
            port_count: config.port_count,
            dhcp: config.dhcp.unwrap_or(false),
            ip: network.map(|n| n.ip().to_string()),
            mask: network.map(|n| n.mask().to_string()),
            gateway: config.gateway,
            vlan_mode: config.vlan_mode.to_string(),
        }
    }
}

fn detail(info: &SwitchInfo) -> String {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    [
        format!("MAC:       {}", info.mac),
        format!("Model:     {}", info.model),
        format!("Name:      {}", info.name),
        format!(
            "Ports:     {}",
            info.port_count.map_or_else(|| "-".into(), |n| n.to_string())
        ),
        format!("DHCP:      {}", if info.dhcp { "on" } else { "off" }),
        format!("IP:        {}", dash(&info.ip)),
        format!("Mask:      {}", dash(&info.mask)),
        format!("Gateway:   {}", dash(&info.gateway)),
        format!("VLAN mode: {}", info.vlan_mode),
    ]
    .join("\n")
}

pub async fn handle(args: InfoArgs, session: &Session) -> Result<(), CliError> {
    let desired = SwitchConfig::new(args.mac);
    let ctx = session.read_only_context(&desired.mac);

    let applied = session
        .run(lifecycle::read(&ctx, &desired))
        .await?
        .map_err(|d| CliError::switch("info", d))?;
    let info = SwitchInfo::from_config(applied.config);

    let out = output::render_single(&session.format, &info, detail, |i| i.mac.clone())?;
    output::print_output(&out, session.quiet);
    Ok(())
}
