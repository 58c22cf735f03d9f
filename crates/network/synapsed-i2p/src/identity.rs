//! Public address derivation and caching.
//!
//! A node's address is the lowercase, unpadded RFC 4648 base32 form of its
//! router identity hash followed by `.b32.i2p`. The address is derived once
//! the engine has an identity and cached until the router is terminated.

use crate::engine::{IdentHash, RouterEngine};
use crate::error::EngineError;
use parking_lot::RwLock;

/// Suffix of self-certifying I2P addresses.
pub const B32_SUFFIX: &str = ".b32.i2p";

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Lowercase RFC 4648 base32 without padding.
pub fn encode_base32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8 + 4) / 5);
    let mut buffer: u16 = 0;
    let mut bits = 0u8;
    for &byte in bytes {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[usize::from((buffer >> bits) & 0x1f)] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[usize::from((buffer << (5 - bits)) & 0x1f)] as char);
    }
    out
}

/// `.b32.i2p` address for an identity hash.
pub fn b32_address(hash: &IdentHash) -> String {
    let mut address = encode_base32(hash.as_bytes());
    address.push_str(B32_SUFFIX);
    address
}

/// Result of an address query, keeping the reason an address is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressLookup {
    /// Address derived from the current router identity
    Available(String),
    /// Router is not in the running state
    NotRunning,
    /// Identity not established yet
    NotReady(String),
    /// Engine faulted while producing the identity
    Fault(String),
}

impl AddressLookup {
    /// The address, if available.
    pub fn into_address(self) -> Option<String> {
        match self {
            AddressLookup::Available(address) => Some(address),
            _ => None,
        }
    }

    /// Whether an address was produced.
    pub fn is_available(&self) -> bool {
        matches!(self, AddressLookup::Available(_))
    }
}

/// Derives and caches the node's public address.
///
/// Only the publisher writes the cache; readers get clones.
#[derive(Debug, Default)]
pub struct IdentityPublisher {
    cached: RwLock<Option<String>>,
}

impl IdentityPublisher {
    /// Creates an empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached address, if one has been derived.
    pub fn cached(&self) -> Option<String> {
        self.cached.read().clone()
    }

    /// Returns the cached address or derives it from the engine. The caller
    /// is responsible for checking the router is running.
    pub fn resolve(&self, engine: &dyn RouterEngine) -> AddressLookup {
        if let Some(address) = self.cached() {
            return AddressLookup::Available(address);
        }

        match engine.router_ident_hash() {
            Ok(hash) if hash.as_bytes().iter().all(|byte| *byte == 0) => {
                tracing::debug!("router identity hash is still empty");
                AddressLookup::NotReady("router identity hash is empty".to_string())
            }
            Ok(hash) => {
                let address = b32_address(&hash);
                let mut slot = self.cached.write();
                let address = slot.get_or_insert(address).clone();
                tracing::info!(%address, "router address published");
                AddressLookup::Available(address)
            }
            Err(EngineError::NotReady(reason)) => {
                tracing::debug!(%reason, "router identity not established yet");
                AddressLookup::NotReady(reason)
            }
            Err(err) => {
                tracing::warn!(error = %err, "engine fault while reading router identity");
                AddressLookup::Fault(err.to_string())
            }
        }
    }

    /// Drops the cached address.
    pub fn clear(&self) {
        self.cached.write().take();
    }
}
