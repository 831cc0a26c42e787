use serde::Deserialize;
use std::fs;
use std::path::Path;

use clap::{Parser, ValueEnum};

/// XDP attach mode for the probe program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum XdpMode {
    /// Let the kernel pick the best available mode.
    Auto,
    /// Generic (skb) mode; works everywhere, slower.
    Skb,
    /// Native driver mode.
    Driver,
    /// Hardware offload.
    Hw,
}

/// Application configuration, loadable from CLI or YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Network interface to attach the XDP probe on.
    #[serde(default)]
    pub interface: Option<String>,

    /// API server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// How often to snapshot the kernel flow map, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// XDP attach mode.
    #[serde(default = "default_xdp_mode")]
    pub xdp_mode: XdpMode,

    /// Quiet mode (suppress non-error logs).
    #[serde(default)]
    pub quiet: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_poll_interval() -> u64 {
    5
}

fn default_xdp_mode() -> XdpMode {
    XdpMode::Auto
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: None,
            port: default_port(),
            poll_interval_seconds: default_poll_interval(),
            xdp_mode: default_xdp_mode(),
            quiet: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Merge CLI args into config (CLI takes precedence).
    pub fn merge_cli(&mut self, cli: &CliArgs) {
        if cli.interface.is_some() {
            self.interface = cli.interface.clone();
        }
        if cli.port != default_port() {
            self.port = cli.port;
        }
        if cli.poll_interval != default_poll_interval() {
            self.poll_interval_seconds = cli.poll_interval;
        }
        if cli.xdp_mode != default_xdp_mode() {
            self.xdp_mode = cli.xdp_mode;
        }
        if cli.quiet {
            self.quiet = true;
        }
    }
}

/// ioamflow: SRv6 IOAM flow probe
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Network interface to attach the XDP probe to (e.g., eth0).
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Port to serve the API on.
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Path to YAML config file.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Flow map polling interval in seconds.
    #[arg(long, default_value_t = 5)]
    pub poll_interval: u64,

    /// XDP attach mode.
    #[arg(long, value_enum, default_value_t = XdpMode::Auto)]
    pub xdp_mode: XdpMode,

    /// Quiet mode (suppress non-error logs).
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults_fill_missing_fields() {
        let config: Config = serde_yaml::from_str("interface: eth0").unwrap();
        assert_eq!(config.interface.as_deref(), Some("eth0"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.poll_interval_seconds, 5);
        assert_eq!(config.xdp_mode, XdpMode::Auto);
        assert!(!config.quiet);
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config: Config = serde_yaml::from_str("port: 8080\nxdp_mode: skb").unwrap();
        let cli = CliArgs {
            interface: Some("ens3".into()),
            port: 3000,
            config: None,
            poll_interval: 1,
            xdp_mode: XdpMode::Auto,
            quiet: false,
        };
        config.merge_cli(&cli);
        assert_eq!(config.interface.as_deref(), Some("ens3"));
        // untouched CLI defaults leave the file values alone
        assert_eq!(config.port, 8080);
        assert_eq!(config.xdp_mode, XdpMode::Skb);
        assert_eq!(config.poll_interval_seconds, 1);
    }
}
