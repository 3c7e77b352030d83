//! Controller configuration (ambient stack — see SPEC_FULL.md §1).
//!
//! Generalizes the source's ad-hoc environment-variable reads
//! (`strata-control::main.rs` reads `DATABASE_URL`/`LISTEN_ADDR` directly)
//! into a single struct with documented defaults, in the same
//! env-var-with-fallback idiom.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// REST listen address, e.g. `0.0.0.0:8080`.
    pub listen_addr: String,
    /// MSDP peer listener port (§6: 1791 by default).
    pub msdp_port: u16,
    /// Network monitor sampling interval, seconds (§4.7 default: 5).
    pub monitor_interval_secs: u64,
    /// `true` selects the simulation probe, `false` the (stubbed) ICMP probe.
    pub monitor_simulation_mode: bool,
    /// MSDP peer addresses to gossip Source-Active messages to.
    pub msdp_peers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            msdp_port: 1791,
            monitor_interval_secs: 5,
            monitor_simulation_mode: true,
            msdp_peers: Vec::new(),
        }
    }
}

impl Config {
    /// Load from an optional TOML file (`MRT_CONFIG_FILE`, if set and
    /// readable) overlaid with environment variables, which take
    /// precedence — the same env-var-with-fallback idiom the source uses,
    /// widened to accept a file for the fields an operator would otherwise
    /// have to repeat across every `docker run`/systemd unit.
    pub fn from_env() -> Self {
        let from_file = std::env::var("MRT_CONFIG_FILE")
            .ok()
            .and_then(|path| Self::from_toml_file(&path))
            .unwrap_or_default();

        Self {
            listen_addr: std::env::var("MRT_LISTEN_ADDR").unwrap_or(from_file.listen_addr),
            msdp_port: std::env::var("MRT_MSDP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(from_file.msdp_port),
            monitor_interval_secs: std::env::var("MRT_MONITOR_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(from_file.monitor_interval_secs),
            monitor_simulation_mode: std::env::var("MRT_MONITOR_REAL_PROBE")
                .map(|v| v != "1")
                .unwrap_or(from_file.monitor_simulation_mode),
            msdp_peers: std::env::var("MRT_MSDP_PEERS")
                .map(|v| v.split(',').map(str::trim).map(String::from).collect())
                .unwrap_or(from_file.msdp_peers),
        }
    }

    /// Parses a TOML document into a `Config`, falling back to the default
    /// for any field the document omits (every field is individually
    /// optional at the file layer).
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        #[derive(Deserialize, Default)]
        struct PartialConfig {
            listen_addr: Option<String>,
            msdp_port: Option<u16>,
            monitor_interval_secs: Option<u64>,
            monitor_simulation_mode: Option<bool>,
            msdp_peers: Option<Vec<String>>,
        }

        let partial: PartialConfig = toml::from_str(raw)?;
        let defaults = Self::default();
        Ok(Self {
            listen_addr: partial.listen_addr.unwrap_or(defaults.listen_addr),
            msdp_port: partial.msdp_port.unwrap_or(defaults.msdp_port),
            monitor_interval_secs: partial.monitor_interval_secs.unwrap_or(defaults.monitor_interval_secs),
            monitor_simulation_mode: partial.monitor_simulation_mode.unwrap_or(defaults.monitor_simulation_mode),
            msdp_peers: partial.msdp_peers.unwrap_or(defaults.msdp_peers),
        })
    }

    /// Reads and parses `path`; absorbs both I/O and parse failures into
    /// `None` with a `tracing::warn!`, matching §7's sentinel-over-error
    /// posture for ambient (non-request-path) configuration.
    fn from_toml_file(path: &str) -> Option<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%path, %err, "could not read MRT_CONFIG_FILE, falling back to defaults/env");
                return None;
            }
        };
        match Self::from_toml_str(&raw) {
            Ok(cfg) => Some(cfg),
            Err(err) => {
                tracing::warn!(%path, %err, "could not parse MRT_CONFIG_FILE, falling back to defaults/env");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.msdp_port, 1791);
        assert_eq!(cfg.monitor_interval_secs, 5);
        assert!(cfg.monitor_simulation_mode);
    }

    #[test]
    fn toml_file_overrides_only_the_fields_it_sets() {
        let cfg = Config::from_toml_str("msdp_port = 2791\nmonitor_simulation_mode = false\n").unwrap();
        assert_eq!(cfg.msdp_port, 2791);
        assert!(!cfg.monitor_simulation_mode);
        assert_eq!(cfg.listen_addr, Config::default().listen_addr);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(Config::from_toml_str("not = [valid").is_err());
    }
}
