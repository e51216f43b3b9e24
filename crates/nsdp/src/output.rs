//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use nsdp_core::{Diagnostic, PortConfig, SwitchConfig};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print engine warnings to stderr. Never suppressed by `--quiet`.
pub fn print_warnings(warnings: &[Diagnostic], color: bool) {
    let mut stderr = io::stderr().lock();
    for warning in warnings {
        if color {
            let _ = writeln!(
                stderr,
                "{} {}\n  {}",
                "warning:".yellow().bold(),
                warning.summary,
                warning.detail.dimmed()
            );
        } else {
            let _ = writeln!(stderr, "warning: {}\n  {}", warning.summary, warning.detail);
        }
    }
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Switch configuration views ───────────────────────────────────────

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    id: u8,
    #[tabled(rename = "PVID")]
    pvid: String,
    #[tabled(rename = "Tagged")]
    tagged: String,
    #[tabled(rename = "Untagged")]
    untagged: String,
}

impl From<&PortConfig> for PortRow {
    fn from(p: &PortConfig) -> Self {
        let tags = |set: &Option<std::collections::BTreeSet<u16>>| match set {
            Some(set) => set.iter().map(u16::to_string).collect::<Vec<_>>().join(","),
            None => "-".into(),
        };
        Self {
            id: p.id,
            pvid: p.pvid.map_or_else(|| "-".into(), |v| v.to_string()),
            tagged: tags(&p.tagged),
            untagged: tags(&p.untagged),
        }
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Key/value detail view of a switch configuration, with a port table.
pub fn switch_detail(config: &SwitchConfig) -> String {
    let addressing = match (config.dhcp, &config.cidr) {
        (Some(true), _) => "dhcp".to_owned(),
        (_, Some(cidr)) => format!("{cidr} via {}", or_dash(config.gateway.as_deref())),
        _ => "-".to_owned(),
    };

    let mut lines = vec![
        format!("MAC:        {}", config.mac),
        format!("Tracked:    {}", if config.id.is_some() { "yes" } else { "no" }),
        format!("Model:      {}", or_dash(config.model.as_deref())),
        format!(
            "Ports:      {}",
            config.port_count.map_or_else(|| "-".into(), |n| n.to_string())
        ),
        format!("Name:       {}", or_dash(config.name.as_deref())),
        format!("Addressing: {addressing}"),
        format!("VLAN mode:  {}", config.vlan_mode),
    ];
    if let Some(enabled) = config.loop_detection {
        lines.push(format!("Loop det.:  {}", if enabled { "on" } else { "off" }));
    }

    if !config.ports.is_empty() {
        let rows: Vec<PortRow> = config.ports.iter().map(PortRow::from).collect();
        lines.push(String::new());
        lines.push(render_table(&rows));
    }

    lines.join("\n")
}

pub fn switch_id(config: &SwitchConfig) -> String {
    config.id.clone().unwrap_or_else(|| config.mac.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_shows_dhcp_and_ports() {
        let config = SwitchConfig {
            dhcp: Some(true),
            ports: vec![PortConfig::new(3).with_pvid(10).with_tagged([10, 20])],
            ..SwitchConfig::new("00:11:22:33:44:55")
        };
        let text = switch_detail(&config);
        assert!(text.contains("Addressing: dhcp"));
        assert!(text.contains("10,20"));
        assert!(text.contains("Tracked:    no"));
    }

    #[test]
    fn plain_uses_id_when_tracked() {
        let config = SwitchConfig {
            id: Some("00:11:22:33:44:55".into()),
            ..SwitchConfig::new("00-11-22-33-44-55")
        };
        assert_eq!(switch_id(&config), "00:11:22:33:44:55");
    }
}
