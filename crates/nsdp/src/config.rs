//! CLI-side config resolution: `--config` override on top of `nsdp_config`.

use std::path::PathBuf;

use nsdp_config::{Config, ConfigError};

use crate::cli::GlobalOpts;

pub fn path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(nsdp_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, ConfigError> {
    nsdp_config::load_config_from(&path(global))
}
