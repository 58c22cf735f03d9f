//! Common test utilities and engine doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use synapsed_i2p::{
    EngineError, EngineOptions, IdentHash, RouterConfig, RouterController, RouterEngine, Sleeper,
};
use tracing_subscriber::EnvFilter;

/// Initialize test logging
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("synapsed_i2p=debug".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mock! {
    pub Engine {}

    impl RouterEngine for Engine {
        fn init(&self, options: &EngineOptions) -> Result<(), EngineError>;
        fn start(&self) -> Result<(), EngineError>;
        fn stop(&self);
        fn terminate(&self);
        fn is_bridge_ready(&self) -> bool;
        fn router_ident_hash(&self) -> Result<IdentHash, EngineError>;
    }
}

/// In-memory engine whose bridge comes up after a number of checks.
pub struct FakeEngine {
    bridge_after: AtomicU32,
    bridge_checks: AtomicU32,
    started: AtomicBool,
    fail_start: AtomicBool,
    identity: Mutex<Result<IdentHash, EngineError>>,
    last_options: Mutex<Option<EngineOptions>>,
    pub inits: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub terminates: AtomicUsize,
}

impl FakeEngine {
    /// Bridge present on the `bridge_after`th check after each start;
    /// `u32::MAX` keeps it down forever.
    pub fn new(bridge_after: u32) -> Arc<Self> {
        Arc::new(Self {
            bridge_after: AtomicU32::new(bridge_after),
            bridge_checks: AtomicU32::new(0),
            started: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
            identity: Mutex::new(Ok(IdentHash::from_identity(b"fake-router-identity"))),
            last_options: Mutex::new(None),
            inits: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            terminates: AtomicUsize::new(0),
        })
    }

    pub fn set_identity(&self, identity: Result<IdentHash, EngineError>) {
        *self.identity.lock() = identity;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn kill_bridge(&self) {
        self.bridge_after.store(u32::MAX, Ordering::SeqCst);
    }

    pub fn bridge_checks(&self) -> u32 {
        self.bridge_checks.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<EngineOptions> {
        self.last_options.lock().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl RouterEngine for FakeEngine {
    fn init(&self, options: &EngineOptions) -> Result<(), EngineError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock() = Some(options.clone());
        Ok(())
    }

    fn start(&self) -> Result<(), EngineError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(EngineError::Startup("transport ports unavailable".into()));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.bridge_checks.store(0, Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
    }

    fn terminate(&self) {
        self.terminates.fetch_add(1, Ordering::SeqCst);
    }

    fn is_bridge_ready(&self) -> bool {
        if !self.started.load(Ordering::SeqCst) {
            return false;
        }
        let checks = self.bridge_checks.fetch_add(1, Ordering::SeqCst) + 1;
        checks >= self.bridge_after.load(Ordering::SeqCst)
    }

    fn router_ident_hash(&self) -> Result<IdentHash, EngineError> {
        self.identity.lock().clone()
    }
}

/// Sleeper that records requested delays without waiting.
#[derive(Default)]
pub struct InstantSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn total(&self) -> Duration {
        self.slept.lock().iter().sum()
    }

    pub fn calls(&self) -> usize {
        self.slept.lock().len()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Controller over `engine` with an instant sleeper.
pub fn instant_controller(engine: Arc<dyn RouterEngine>) -> (RouterController, Arc<InstantSleeper>) {
    let sleeper = Arc::new(InstantSleeper::default());
    (RouterController::with_sleeper(engine, sleeper.clone()), sleeper)
}

/// SAM-enabled config rooted in a fresh temp directory.
pub fn node_config(dir: &tempfile::TempDir, name: &str) -> RouterConfig {
    RouterConfig::new(dir.path().join(name)).with_sam(7656)
}
