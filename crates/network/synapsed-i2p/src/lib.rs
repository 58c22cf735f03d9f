//! # Synapsed-I2P
//!
//! Lifecycle control for an I2P router embedded in a host application.
//!
//! The routing engine itself (tunnels, cryptography, peer discovery) is an
//! external subsystem behind the [`RouterEngine`] trait. This crate builds its
//! configuration, drives it through an explicit state machine, waits (bounded)
//! for its SAM bridge after start, and publishes the node's `.b32.i2p`
//! address.
//!
//! ## Architecture
//!
//! - **Config**: [`RouterConfig`] with policy defaults, TOML and env loading
//! - **Builder**: [`ConfigBuilder`] turns a config into ordered [`EngineOptions`]
//! - **Controller**: [`RouterController`] owns the [`RouterState`] and drives the engine
//! - **Poller**: [`ReadinessPoller`] waits for the SAM bridge after start
//! - **Identity**: [`IdentityPublisher`] derives and caches the public address
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use synapsed_i2p::{RouterConfig, RouterController, RouterEngine};
//!
//! # async fn run(engine: Arc<dyn RouterEngine>) -> synapsed_i2p::Result<()> {
//! let controller = RouterController::new(engine);
//! controller.init(RouterConfig::new("/var/lib/node/i2pd").with_sam(7656))?;
//! let readiness = controller.start().await?;
//! if readiness.is_timed_out() {
//!     // still running; the bridge may come up later
//! }
//! if let Some(address) = controller.address() {
//!     println!("reachable at {address}");
//! }
//! controller.terminate();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod identity;
pub mod logging;
pub mod poller;
pub mod state;
pub mod status;

// Re-export commonly used types
pub use builder::{ConfigBuilder, ConfigEntry, EngineOptions};
pub use config::{
    BandwidthClass, LivenessMode, LogDestination, ReseedConfig, RouterConfig, SamConfig,
    ServiceToggles, TunnelLength, TunnelPoolConfig,
};
pub use controller::RouterController;
pub use engine::{IdentHash, RouterEngine};
pub use error::{EngineError, Result, RouterError};
pub use identity::{AddressLookup, IdentityPublisher, B32_SUFFIX};
pub use poller::{Readiness, ReadinessPolicy, ReadinessPoller, Sleeper, TokioSleeper};
pub use state::RouterState;
pub use status::{HealthLevel, RouterStatus};
