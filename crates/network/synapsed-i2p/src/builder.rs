//! Engine option building.
//!
//! Turns a [`RouterConfig`] into the ordered key/value options the engine is
//! initialized with. The builder is total and deterministic: the same config
//! always yields the same entries in the same order, and every key appears at
//! most once.

use crate::config::{LogDestination, RouterConfig};
use std::fmt;

/// SAM listens on every interface so other local processes can always bind.
pub const SAM_BIND_ADDRESS: &str = "0.0.0.0";

/// Engine option names.
pub mod keys {
    /// Data directory
    pub const DATA_DIR: &str = "datadir";
    /// Certificate directory
    pub const CERTS_DIR: &str = "certsdir";
    /// SAM bridge switch
    pub const SAM_ENABLED: &str = "sam.enabled";
    /// SAM bind address
    pub const SAM_ADDRESS: &str = "sam.address";
    /// SAM port
    pub const SAM_PORT: &str = "sam.port";
    /// Reseed signature verification
    pub const RESEED_VERIFY: &str = "reseed.verify";
    /// Bandwidth class
    pub const BANDWIDTH: &str = "bandwidth";
    /// Inbound pool size
    pub const INBOUND_QUANTITY: &str = "tunconf.inbound.quantity";
    /// Outbound pool size
    pub const OUTBOUND_QUANTITY: &str = "tunconf.outbound.quantity";
    /// Inbound hops
    pub const INBOUND_LENGTH: &str = "tunconf.inbound.length";
    /// Outbound hops
    pub const OUTBOUND_LENGTH: &str = "tunconf.outbound.length";
    /// Reseed servers
    pub const RESEED_URLS: &str = "reseed.urls";
    /// UPnP
    pub const UPNP_ENABLED: &str = "upnp.enabled";
    /// Web console
    pub const HTTP_ENABLED: &str = "http.enabled";
    /// HTTP proxy
    pub const HTTP_PROXY_ENABLED: &str = "httpproxy.enabled";
    /// SOCKS proxy
    pub const SOCKS_PROXY_ENABLED: &str = "socksproxy.enabled";
    /// IRC proxy
    pub const IRC_PROXY_ENABLED: &str = "ircproxy.enabled";
    /// I2PControl
    pub const I2P_CONTROL_ENABLED: &str = "i2pcontrol.enabled";
    /// Floodfill role
    pub const FLOODFILL: &str = "floodfill";
    /// Log destination
    pub const LOG: &str = "log";
    /// Log file path
    pub const LOG_FILE: &str = "logfile";
    /// Log level
    pub const LOG_LEVEL: &str = "loglevel";

    /// Keys that only appear when SAM is enabled.
    pub const SAM_ONLY: [&str; 2] = [SAM_ADDRESS, SAM_PORT];
}

/// A single engine option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    key: &'static str,
    value: String,
}

impl ConfigEntry {
    /// Option name.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Option value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered engine options with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    entries: Vec<ConfigEntry>,
}

impl EngineOptions {
    fn push(&mut self, key: &'static str, value: impl Into<String>) {
        debug_assert!(!self.contains(key), "duplicate engine option {key}");
        self.entries.push(ConfigEntry {
            key,
            value: value.into(),
        });
    }

    fn push_flag(&mut self, key: &'static str, enabled: bool) {
        self.push(key, if enabled { "true" } else { "false" });
    }

    /// Value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(ConfigEntry::value)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Entries in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigEntry> {
        self.entries.iter()
    }

    /// Option names in emission order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(ConfigEntry::key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Command-line form: `program --key value ...`.
    pub fn to_args(&self, program: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(1 + self.entries.len() * 2);
        args.push(program.to_string());
        for entry in &self.entries {
            args.push(format!("--{}", entry.key));
            args.push(entry.value.clone());
        }
        args
    }
}

impl<'a> IntoIterator for &'a EngineOptions {
    type Item = &'a ConfigEntry;
    type IntoIter = std::slice::Iter<'a, ConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} = {}", entry.key, entry.value)?;
        }
        Ok(())
    }
}

/// Builds engine options from a router config.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigBuilder;

impl ConfigBuilder {
    /// Builds the ordered option set for `config`.
    pub fn build(config: &RouterConfig) -> EngineOptions {
        let mut options = EngineOptions::default();

        options.push(keys::DATA_DIR, config.effective_data_dir().to_string_lossy());
        options.push(keys::CERTS_DIR, config.certificates_dir().to_string_lossy());

        options.push_flag(keys::SAM_ENABLED, config.sam.enabled);
        if config.sam.enabled {
            options.push(keys::SAM_ADDRESS, SAM_BIND_ADDRESS);
            options.push(keys::SAM_PORT, config.sam.port.to_string());
        }

        options.push_flag(keys::RESEED_VERIFY, config.reseed.verify);
        options.push(keys::BANDWIDTH, config.bandwidth.as_str());

        let tunnels = &config.tunnels;
        options.push(keys::INBOUND_QUANTITY, tunnels.inbound_quantity.to_string());
        options.push(keys::OUTBOUND_QUANTITY, tunnels.outbound_quantity.to_string());
        options.push(keys::INBOUND_LENGTH, tunnels.inbound_length.to_string());
        options.push(keys::OUTBOUND_LENGTH, tunnels.outbound_length.to_string());

        options.push(keys::RESEED_URLS, config.reseed.urls.join(","));

        let services = &config.services;
        options.push_flag(keys::UPNP_ENABLED, services.upnp);
        options.push_flag(keys::HTTP_ENABLED, services.http_console);
        options.push_flag(keys::HTTP_PROXY_ENABLED, services.http_proxy);
        options.push_flag(keys::SOCKS_PROXY_ENABLED, services.socks_proxy);
        options.push_flag(keys::IRC_PROXY_ENABLED, services.irc_proxy);
        options.push_flag(keys::I2P_CONTROL_ENABLED, services.i2p_control);
        options.push_flag(keys::FLOODFILL, services.floodfill);

        match config.log_destination() {
            LogDestination::Stdout => {
                options.push(keys::LOG, "stdout");
                options.push(keys::LOG_LEVEL, "debug");
            }
            LogDestination::File(path) => {
                options.push(keys::LOG, "file");
                options.push(keys::LOG_FILE, path.to_string_lossy());
                options.push(keys::LOG_LEVEL, "warn");
            }
            LogDestination::None => {
                options.push(keys::LOG, "none");
                options.push(keys::LOG_LEVEL, "error");
            }
        }

        options
    }
}
