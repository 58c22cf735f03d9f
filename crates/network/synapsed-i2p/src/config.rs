//! Configuration types for the embedded router.
//!
//! Values are resolved from built-in defaults, an optional TOML file and
//! `SYNAPSED_I2P_*` environment overrides, in that order.

use crate::error::{Result, RouterError};
use crate::poller::ReadinessPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Data directory used when none is configured.
pub const DEFAULT_DATA_DIR: &str = ".i2pd";

/// Certificate directory, relative to the data directory.
pub const CERTIFICATES_SUBDIR: &str = "certificates";

/// Engine log file name, relative to the data directory.
pub const LOG_FILE_NAME: &str = "i2pd.log";

/// Default SAM bridge port.
pub const DEFAULT_SAM_PORT: u16 = 7656;

/// Default tunnels per pool direction.
pub const DEFAULT_TUNNEL_QUANTITY: u8 = 3;

/// Default hops per tunnel.
pub const DEFAULT_TUNNEL_LENGTH: u8 = 2;

/// Largest pool size the engine accepts.
pub const MAX_TUNNEL_QUANTITY: u8 = 16;

/// Longest tunnel the engine accepts.
pub const MAX_TUNNEL_LENGTH: u8 = 8;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SYNAPSED_I2P_";

/// Bootstrap reseed servers used on first contact.
pub const DEFAULT_RESEED_URLS: [&str; 5] = [
    "https://reseed.i2p-projekt.de/",
    "https://i2p.mooo.com/netDb/",
    "https://reseed.i2p.net/",
    "https://reseed-proxy.i2p.online/",
    "https://reseed.diva.exchange/",
];

/// Host-supplied configuration for an embedded router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Engine data directory (keys, network database, certificates)
    pub data_dir: PathBuf,

    /// SAM bridge settings
    pub sam: SamConfig,

    /// Verbose engine logging to the console
    pub debug: bool,

    /// Engine logs to a file inside the data directory when not debugging
    pub log_to_file: bool,

    /// Shared bandwidth class
    pub bandwidth: BandwidthClass,

    /// Tunnel pool sizing
    pub tunnels: TunnelPoolConfig,

    /// Bootstrap settings
    pub reseed: ReseedConfig,

    /// Optional network-facing services
    pub services: ServiceToggles,

    /// Bridge readiness polling after start
    pub readiness: ReadinessPolicy,

    /// How `is_running` decides liveness
    pub liveness: LivenessMode,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sam: SamConfig::default(),
            debug: false,
            log_to_file: false,
            bandwidth: BandwidthClass::default(),
            tunnels: TunnelPoolConfig::default(),
            reseed: ReseedConfig::default(),
            services: ServiceToggles::default(),
            readiness: ReadinessPolicy::default(),
            liveness: LivenessMode::default(),
        }
    }
}

impl RouterConfig {
    /// Creates a config for `data_dir` with every other value defaulted.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Enables the SAM bridge on `port`.
    pub fn with_sam(mut self, port: u16) -> Self {
        self.sam = SamConfig { enabled: true, port };
        self
    }

    /// Disables the SAM bridge.
    pub fn without_sam(mut self) -> Self {
        self.sam.enabled = false;
        self
    }

    /// Sets the debug flag.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the readiness policy.
    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a TOML file and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)?.with_env_overrides(std::env::vars())
    }

    /// Defaults plus overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(std::env::vars())
    }

    /// Applies `SYNAPSED_I2P_*` overrides from `vars`; other keys are ignored.
    pub fn with_env_overrides<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match name {
                "DATA_DIR" => self.data_dir = PathBuf::from(value),
                "SAM_ENABLED" => self.sam.enabled = parse_flag(name, value)?,
                "SAM_PORT" => self.sam.port = parse_number(name, value)?,
                "DEBUG" => self.debug = parse_flag(name, value)?,
                "LOG_TO_FILE" => self.log_to_file = parse_flag(name, value)?,
                "TUNNEL_LENGTH" => {
                    self.tunnels = self.tunnels.with_length(parse_number(name, value)?)
                }
                "BANDWIDTH" => self.bandwidth = value.parse()?,
                _ => tracing::debug!(key = key.as_ref(), "ignoring unknown override"),
            }
        }
        Ok(self)
    }

    /// Data directory handed to the engine; never empty.
    pub fn effective_data_dir(&self) -> PathBuf {
        if self.data_dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_DATA_DIR)
        } else {
            self.data_dir.clone()
        }
    }

    /// Certificate directory derived from the data directory.
    pub fn certificates_dir(&self) -> PathBuf {
        self.effective_data_dir().join(CERTIFICATES_SUBDIR)
    }

    /// Engine log file used when logging to file.
    pub fn log_file(&self) -> PathBuf {
        self.effective_data_dir().join(LOG_FILE_NAME)
    }

    /// Loopback address downstream SAM clients connect to.
    pub fn sam_address(&self) -> Option<SocketAddr> {
        self.sam
            .enabled
            .then(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.sam.port))
    }

    /// Engine log destination selected by the debug and log-to-file flags.
    pub fn log_destination(&self) -> LogDestination {
        if self.debug {
            LogDestination::Stdout
        } else if self.log_to_file {
            LogDestination::File(self.log_file())
        } else {
            LogDestination::None
        }
    }

    /// Checks the values the engine cannot recover from.
    pub fn validate(&self) -> Result<()> {
        if self.sam.enabled && self.sam.port == 0 {
            return Err(RouterError::config("sam.port must be non-zero when SAM is enabled"));
        }
        self.tunnels.validate()?;
        self.reseed.validate()?;
        self.readiness.validate()?;
        Ok(())
    }
}

/// SAM bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamConfig {
    /// Whether the bridge is enabled
    pub enabled: bool,
    /// Listening port
    pub port: u16,
}

impl Default for SamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_SAM_PORT,
        }
    }
}

/// Shared bandwidth classes understood by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandwidthClass {
    /// Under 12 KB/s
    K,
    /// 12 - 48 KB/s
    L,
    /// 48 - 64 KB/s
    M,
    /// 64 - 128 KB/s
    N,
    /// 128 - 256 KB/s
    O,
    /// 256 - 2000 KB/s
    P,
    /// Unlimited
    #[default]
    X,
}

impl BandwidthClass {
    /// Single-letter class code.
    pub fn as_str(self) -> &'static str {
        match self {
            BandwidthClass::K => "K",
            BandwidthClass::L => "L",
            BandwidthClass::M => "M",
            BandwidthClass::N => "N",
            BandwidthClass::O => "O",
            BandwidthClass::P => "P",
            BandwidthClass::X => "X",
        }
    }
}

impl fmt::Display for BandwidthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BandwidthClass {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "K" => Ok(BandwidthClass::K),
            "L" => Ok(BandwidthClass::L),
            "M" => Ok(BandwidthClass::M),
            "N" => Ok(BandwidthClass::N),
            "O" => Ok(BandwidthClass::O),
            "P" => Ok(BandwidthClass::P),
            "X" => Ok(BandwidthClass::X),
            other => Err(RouterError::config(format!("Unknown bandwidth class '{other}'"))),
        }
    }
}

/// Tunnel length presets offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelLength {
    /// One hop; lowest latency
    Fast,
    /// Three hops
    Balanced,
    /// Five hops; strongest anonymity
    Anonymous,
}

impl TunnelLength {
    /// Hops per tunnel for this preset.
    pub fn hops(self) -> u8 {
        match self {
            TunnelLength::Fast => 1,
            TunnelLength::Balanced => 3,
            TunnelLength::Anonymous => 5,
        }
    }
}

impl TryFrom<u8> for TunnelLength {
    type Error = RouterError;

    fn try_from(hops: u8) -> Result<Self> {
        match hops {
            1 => Ok(TunnelLength::Fast),
            3 => Ok(TunnelLength::Balanced),
            5 => Ok(TunnelLength::Anonymous),
            other => Err(RouterError::config(format!(
                "tunnel length preset must be 1, 3 or 5 hops, got {other}"
            ))),
        }
    }
}

/// Tunnel pool sizing for the client pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelPoolConfig {
    /// Inbound tunnels
    pub inbound_quantity: u8,
    /// Outbound tunnels
    pub outbound_quantity: u8,
    /// Hops per inbound tunnel
    pub inbound_length: u8,
    /// Hops per outbound tunnel
    pub outbound_length: u8,
}

impl Default for TunnelPoolConfig {
    fn default() -> Self {
        Self {
            inbound_quantity: DEFAULT_TUNNEL_QUANTITY,
            outbound_quantity: DEFAULT_TUNNEL_QUANTITY,
            inbound_length: DEFAULT_TUNNEL_LENGTH,
            outbound_length: DEFAULT_TUNNEL_LENGTH,
        }
    }
}

impl TunnelPoolConfig {
    /// Applies the same hop count to both directions.
    pub fn with_length(mut self, hops: u8) -> Self {
        self.inbound_length = hops;
        self.outbound_length = hops;
        self
    }

    /// Applies a host-facing preset to both directions.
    pub fn with_preset(self, preset: TunnelLength) -> Self {
        self.with_length(preset.hops())
    }

    fn validate(&self) -> Result<()> {
        for (name, quantity) in [
            ("inbound", self.inbound_quantity),
            ("outbound", self.outbound_quantity),
        ] {
            if quantity == 0 || quantity > MAX_TUNNEL_QUANTITY {
                return Err(RouterError::config(format!(
                    "{name} tunnel quantity must be between 1 and {MAX_TUNNEL_QUANTITY}, got {quantity}"
                )));
            }
        }
        for (name, length) in [("inbound", self.inbound_length), ("outbound", self.outbound_length)] {
            if length > MAX_TUNNEL_LENGTH {
                return Err(RouterError::config(format!(
                    "{name} tunnel length must be at most {MAX_TUNNEL_LENGTH}, got {length}"
                )));
            }
        }
        Ok(())
    }
}

/// Bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReseedConfig {
    /// Reseed servers, tried in order
    pub urls: Vec<String>,
    /// Verify reseed bundle signatures
    pub verify: bool,
}

impl Default for ReseedConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_RESEED_URLS.iter().map(|url| (*url).to_string()).collect(),
            verify: false,
        }
    }
}

impl ReseedConfig {
    fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(RouterError::config("at least one reseed URL is required"));
        }
        if let Some(url) = self
            .urls
            .iter()
            .find(|url| !(url.starts_with("https://") || url.starts_with("http://")) || url.contains(','))
        {
            return Err(RouterError::config(format!("Invalid reseed URL '{url}'")));
        }
        Ok(())
    }
}

/// Optional engine services. All off unless the host opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceToggles {
    /// Web console
    pub http_console: bool,
    /// HTTP proxy
    pub http_proxy: bool,
    /// SOCKS proxy
    pub socks_proxy: bool,
    /// IRC proxy
    pub irc_proxy: bool,
    /// I2PControl endpoint
    pub i2p_control: bool,
    /// UPnP port mapping
    pub upnp: bool,
    /// Floodfill role
    pub floodfill: bool,
}

/// Where the engine writes its own log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Verbose console logging
    Stdout,
    /// Log file inside the data directory
    File(PathBuf),
    /// No engine log
    None,
}

/// How liveness is decided by `is_running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessMode {
    /// Running state and a present SAM bridge
    #[default]
    BridgeAware,
    /// Running state only
    StateOnly,
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(RouterError::config(format!("{ENV_PREFIX}{name}: expected a boolean, got '{value}'"))),
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| RouterError::config(format!("{ENV_PREFIX}{name}: expected a number, got '{value}'")))
}
