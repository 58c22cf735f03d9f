//! Router lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of an embedded router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RouterState {
    /// Controller constructed, engine not configured
    Uninitialized = 0,
    /// Engine configured, not started
    Initialized = 1,
    /// Engine started
    Running = 2,
    /// Engine stopped, may be started again
    Stopped = 3,
    /// Engine torn down; absorbing
    Terminated = 4,
}

impl RouterState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RouterState::Uninitialized,
            1 => RouterState::Initialized,
            2 => RouterState::Running,
            3 => RouterState::Stopped,
            _ => RouterState::Terminated,
        }
    }

    /// Whether `start` may move the router to `Running` from this state.
    pub fn can_start(self) -> bool {
        matches!(self, RouterState::Initialized | RouterState::Stopped)
    }

    /// Whether the engine has been handed a configuration.
    pub fn is_initialized(self) -> bool {
        !matches!(self, RouterState::Uninitialized)
    }

    /// Lowercase name used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            RouterState::Uninitialized => "uninitialized",
            RouterState::Initialized => "initialized",
            RouterState::Running => "running",
            RouterState::Stopped => "stopped",
            RouterState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomically readable state cell.
///
/// Readers observe either the value before or after a transition.
#[derive(Debug)]
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub(crate) fn new(state: RouterState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> RouterState {
        RouterState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from` to `to`; returns the actual state on failure.
    pub(crate) fn transition(&self, from: RouterState, to: RouterState) -> Result<(), RouterState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(RouterState::from_u8)
    }

    /// Unconditionally stores `to`, returning the previous state.
    pub(crate) fn swap(&self, to: RouterState) -> RouterState {
        RouterState::from_u8(self.0.swap(to as u8, Ordering::AcqRel))
    }
}
