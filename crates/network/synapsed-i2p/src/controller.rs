//! Router lifecycle controller.
//!
//! Drives an embedded engine through
//! `Uninitialized -> Initialized -> Running <-> Stopped -> Terminated`.
//! The state lives in one atomic so status queries from other threads never
//! block on, or observe a half-finished, transition.

use crate::builder::{ConfigBuilder, EngineOptions};
use crate::config::{LivenessMode, RouterConfig};
use crate::engine::RouterEngine;
use crate::error::{Result, RouterError};
use crate::identity::{AddressLookup, IdentityPublisher};
use crate::poller::{Readiness, ReadinessPoller, Sleeper, TokioSleeper};
use crate::state::{AtomicState, RouterState};
use crate::status::{HealthLevel, RouterStatus};
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

/// Everything fixed by a successful `init`.
struct Setup {
    config: RouterConfig,
    options: EngineOptions,
    poller: ReadinessPoller,
}

/// Lifecycle controller for one embedded router.
///
/// Control operations (`init`, `start`, `stop`, `terminate`) are meant to be
/// issued from a single management task. Queries may run concurrently from
/// anywhere; share the controller through an `Arc`.
pub struct RouterController {
    engine: Arc<dyn RouterEngine>,
    sleeper: Arc<dyn Sleeper>,
    state: AtomicState,
    setup: OnceCell<Setup>,
    identity: IdentityPublisher,
}

impl RouterController {
    /// Creates a controller that polls readiness on the tokio timer.
    pub fn new(engine: Arc<dyn RouterEngine>) -> Self {
        Self::with_sleeper(engine, Arc::new(TokioSleeper))
    }

    /// Creates a controller with a custom delay source for readiness polling.
    pub fn with_sleeper(engine: Arc<dyn RouterEngine>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            engine,
            sleeper,
            state: AtomicState::new(RouterState::Uninitialized),
            setup: OnceCell::new(),
            identity: IdentityPublisher::new(),
        }
    }

    /// Validates `config`, prepares the data directory and configures the
    /// engine. Allowed once, from `Uninitialized`.
    pub fn init(&self, config: RouterConfig) -> Result<()> {
        let state = self.state.load();
        if state != RouterState::Uninitialized {
            return Err(RouterError::InvalidState {
                operation: "init",
                state,
            });
        }

        config.validate()?;
        prepare_data_dir(&config.effective_data_dir())?;

        let options = ConfigBuilder::build(&config);
        tracing::debug!(entries = options.len(), options = %options, "engine options built");

        self.engine
            .init(&options)
            .map_err(|e| RouterError::config(format!("engine rejected configuration: {e}")))?;

        let poller = ReadinessPoller::with_sleeper(config.readiness, self.sleeper.clone());
        let data_dir = config.effective_data_dir().display().to_string();
        let sam_port = config.sam.enabled.then_some(config.sam.port);
        if self
            .setup
            .set(Setup {
                config,
                options,
                poller,
            })
            .is_err()
        {
            return Err(RouterError::InvalidState {
                operation: "init",
                state: self.state.load(),
            });
        }

        self.state
            .transition(RouterState::Uninitialized, RouterState::Initialized)
            .map_err(|state| RouterError::InvalidState {
                operation: "init",
                state,
            })?;

        tracing::info!(%data_dir, ?sam_port, "router initialized");
        Ok(())
    }

    /// Starts the engine and waits, bounded, for its SAM bridge.
    ///
    /// A no-op returning [`Readiness::AlreadyRunning`] when already running.
    /// The readiness result is advisory: a timeout still leaves the router
    /// running. On engine failure the state does not change.
    pub async fn start(&self) -> Result<Readiness> {
        let state = self.state.load();
        if state == RouterState::Running {
            tracing::debug!("start ignored: router already running");
            return Ok(Readiness::AlreadyRunning);
        }
        if !state.can_start() {
            return Err(RouterError::InvalidState {
                operation: "start",
                state,
            });
        }
        let setup = self.setup.get().ok_or(RouterError::InvalidState {
            operation: "start",
            state,
        })?;

        tracing::info!(from = %state, "starting router");
        if let Err(err) = self.engine.start() {
            tracing::error!(error = %err, "engine failed to start");
            return Err(RouterError::EngineStartFailed(err));
        }

        // A terminate issued while the engine was starting wins.
        self.state
            .transition(state, RouterState::Running)
            .map_err(|actual| RouterError::InvalidState {
                operation: "start",
                state: actual,
            })?;

        let readiness = setup.poller.wait_for_bridge(self.engine.as_ref()).await;
        match readiness {
            Readiness::Ready { attempts, waited } => {
                tracing::info!(attempts, waited_ms = waited.as_millis() as u64, "router running, SAM bridge active");
            }
            Readiness::TimedOut { attempts, waited } => {
                tracing::warn!(
                    attempts,
                    waited_ms = waited.as_millis() as u64,
                    "SAM bridge not active after start; router left running"
                );
            }
            Readiness::Skipped | Readiness::AlreadyRunning => {
                tracing::info!("router running");
            }
        }
        Ok(readiness)
    }

    /// Stops a running engine. A no-op in any other state.
    pub fn stop(&self) {
        match self.state.transition(RouterState::Running, RouterState::Stopped) {
            Ok(()) => {
                tracing::info!("stopping router");
                self.engine.stop();
                tracing::info!("router stopped");
            }
            Err(state) => tracing::debug!(%state, "stop ignored: router not running"),
        }
    }

    /// Tears the engine down and drops the cached address. Absorbing: only
    /// the first call does any work.
    pub fn terminate(&self) {
        let previous = self.state.swap(RouterState::Terminated);
        if previous == RouterState::Terminated {
            tracing::debug!("terminate ignored: router already terminated");
            return;
        }

        if previous == RouterState::Running {
            self.engine.stop();
        }
        if previous.is_initialized() {
            self.engine.terminate();
        }
        self.identity.clear();
        tracing::info!(%previous, "router terminated");
    }

    /// Raw lifecycle state.
    pub fn state(&self) -> RouterState {
        self.state.load()
    }

    /// Whether the router is running and, in bridge-aware mode, its SAM
    /// bridge is present right now.
    pub fn is_running(&self) -> bool {
        if self.state.load() != RouterState::Running {
            return false;
        }
        match self.liveness() {
            LivenessMode::BridgeAware => self.engine.is_bridge_ready(),
            LivenessMode::StateOnly => true,
        }
    }

    /// The node's `.b32.i2p` address; `None` unless running with an
    /// established identity.
    pub fn address(&self) -> Option<String> {
        self.lookup().into_address()
    }

    /// Like [`address`](Self::address), but says why no address is
    /// available.
    pub fn lookup(&self) -> AddressLookup {
        if self.state.load() != RouterState::Running {
            return AddressLookup::NotRunning;
        }

        let lookup = self.identity.resolve(self.engine.as_ref());
        match self.state.load() {
            RouterState::Running => lookup,
            RouterState::Terminated => {
                self.identity.clear();
                AddressLookup::NotRunning
            }
            _ => AddressLookup::NotRunning,
        }
    }

    /// Loopback address of the SAM bridge, once configured with SAM enabled.
    pub fn sam_address(&self) -> Option<SocketAddr> {
        self.setup.get().and_then(|setup| setup.config.sam_address())
    }

    /// Configuration accepted by `init`.
    pub fn config(&self) -> Option<&RouterConfig> {
        self.setup.get().map(|setup| &setup.config)
    }

    /// Options handed to the engine by `init`.
    pub fn options(&self) -> Option<&EngineOptions> {
        self.setup.get().map(|setup| &setup.options)
    }

    /// Point-in-time status snapshot.
    pub fn status(&self) -> RouterStatus {
        let state = self.state.load();
        let bridge_ready = matches!(
            state,
            RouterState::Initialized | RouterState::Running | RouterState::Stopped
        ) && self.engine.is_bridge_ready();
        let running = state == RouterState::Running
            && (bridge_ready || self.liveness() == LivenessMode::StateOnly);

        RouterStatus {
            state,
            running,
            bridge_ready,
            address: self.address(),
            sam_address: self.sam_address(),
            health: HealthLevel::assess(state, bridge_ready),
            observed_at: chrono::Utc::now(),
        }
    }

    fn liveness(&self) -> LivenessMode {
        self.setup
            .get()
            .map(|setup| setup.config.liveness)
            .unwrap_or_default()
    }
}

impl Drop for RouterController {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for RouterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterController")
            .field("state", &self.state.load())
            .field("address", &self.identity.cached())
            .finish_non_exhaustive()
    }
}

fn prepare_data_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(RouterError::config(format!(
            "data directory {} is not a directory",
            path.display()
        )));
    }
    std::fs::create_dir_all(path).map_err(|e| {
        RouterError::config(format!("unusable data directory {}: {e}", path.display()))
    })
}
