//! Status snapshots for host applications.

use crate::state::RouterState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Point-in-time view of a router, suitable for UIs and health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterStatus {
    /// Lifecycle state
    pub state: RouterState,
    /// Liveness as reported by `is_running`
    pub running: bool,
    /// Whether the SAM bridge is present
    pub bridge_ready: bool,
    /// Public `.b32.i2p` address, once known
    pub address: Option<String>,
    /// Loopback SAM address for local clients
    pub sam_address: Option<SocketAddr>,
    /// Summarized health
    pub health: HealthLevel,
    /// When the snapshot was taken
    pub observed_at: DateTime<Utc>,
}

/// Health levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    /// Running with an active SAM bridge
    Healthy,
    /// Usable soon or after a restart
    Warning,
    /// Not configured or torn down
    Critical,
}

impl HealthLevel {
    /// Health for a state and bridge observation.
    pub fn assess(state: RouterState, bridge_ready: bool) -> Self {
        match state {
            RouterState::Running if bridge_ready => HealthLevel::Healthy,
            RouterState::Running | RouterState::Initialized | RouterState::Stopped => {
                HealthLevel::Warning
            }
            RouterState::Uninitialized | RouterState::Terminated => HealthLevel::Critical,
        }
    }
}
