//! Boundary to the embedded I2P routing engine.
//!
//! The engine owns its worker threads, tunnels, cryptography and network
//! database. The controller only calls its entry points and reads status, so
//! the boundary is a small synchronous trait that an FFI binding (for example
//! to i2pd's `api.h`) or a test double implements.

use crate::builder::EngineOptions;
use crate::error::EngineError;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a router identity hash.
pub const IDENT_HASH_LEN: usize = 32;

/// SHA-256 hash of a router identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentHash([u8; IDENT_HASH_LEN]);

impl IdentHash {
    /// Wraps raw hash bytes.
    pub const fn new(bytes: [u8; IDENT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Hashes the serialized router identity.
    pub fn from_identity(identity: &[u8]) -> Self {
        let digest = Sha256::digest(identity);
        let mut bytes = [0u8; IDENT_HASH_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; IDENT_HASH_LEN] {
        &self.0
    }
}

impl From<[u8; IDENT_HASH_LEN]> for IdentHash {
    fn from(bytes: [u8; IDENT_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for IdentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentHash(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

/// Entry points of the embedded routing engine.
///
/// Implementations must be safe to query (`is_bridge_ready`,
/// `router_ident_hash`) from any thread while a `start` or `stop` is in
/// flight on another.
pub trait RouterEngine: Send + Sync {
    /// Applies the configuration. Called at most once.
    fn init(&self, options: &EngineOptions) -> Result<(), EngineError>;

    /// Starts the router and its client services. Returns before the SAM
    /// bridge is necessarily up.
    fn start(&self) -> Result<(), EngineError>;

    /// Stops the router and its client services.
    fn stop(&self);

    /// Releases everything the engine holds.
    fn terminate(&self);

    /// Whether the SAM bridge currently exists.
    fn is_bridge_ready(&self) -> bool;

    /// Hash of the local router identity.
    ///
    /// Returns [`EngineError::NotReady`] while the identity is still being
    /// established and [`EngineError::Internal`] on unexpected faults.
    fn router_ident_hash(&self) -> Result<IdentHash, EngineError>;
}
