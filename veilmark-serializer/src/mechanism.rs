//! The pluggable encryption capability and its call-scoped context.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Opaque identifier handed to the mechanism alongside each call, commonly
/// the name of the owning type. Not cryptographic key material; it lets a
/// single mechanism implementation vary behavior per type if it wants to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncryptKey(String);

impl EncryptKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EncryptKey {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EncryptKey {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EncryptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutable context scoped to one top-level serialize/deserialize call.
///
/// Threaded by `&mut` through nested encrypted regions so a mechanism can
/// keep cross-call context for one traversal (a running nonce, a buffer).
/// Created fresh per call, owned exclusively by that call's traversal,
/// discarded when it ends.
#[derive(Default)]
pub struct SerializationState {
    slots: HashMap<String, Box<dyn Any + Send>>,
}

impl SerializationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: 'static>(&self, slot: &str) -> Option<&T> {
        self.slots.get(slot).and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self, slot: &str) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(|v| v.downcast_mut())
    }

    pub fn set<T: 'static + Send>(&mut self, slot: impl Into<String>, value: T) {
        self.slots.insert(slot.into(), Box::new(value));
    }

    /// Fetch the slot, initializing it on first use. A slot name is bound
    /// to one value type for the lifetime of the state.
    pub fn get_or_insert_with<T: 'static + Send>(
        &mut self,
        slot: &str,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        self.slots
            .entry(slot.to_string())
            .or_insert_with(|| Box::new(init()))
            .downcast_mut()
            .expect("serialization state slot reused with a different type")
    }
}

/// Two-way text transform applied to already-escaped member text.
///
/// The engine treats implementations as opaque, potentially non-idempotent
/// and ordering-sensitive. `decrypt_with(encrypt_with(t, k, s), k, s)` must
/// equal `t` for matching key/state lineage. Output embedded into the
/// document must not contain literal reserved markup characters; the engine
/// does not re-escape cipher text.
///
/// The keyed/stateful forms default to the stateless pair, so a simple
/// mechanism only implements `encrypt`/`decrypt`.
pub trait EncryptionMechanism: Send + Sync {
    fn encrypt(&self, plain_text: &str) -> Result<String>;

    fn decrypt(&self, cipher_text: &str) -> Result<String>;

    fn encrypt_with(
        &self,
        plain_text: &str,
        _key: &EncryptKey,
        _state: &mut SerializationState,
    ) -> Result<String> {
        self.encrypt(plain_text)
    }

    fn decrypt_with(
        &self,
        cipher_text: &str,
        _key: &EncryptKey,
        _state: &mut SerializationState,
    ) -> Result<String> {
        self.decrypt(cipher_text)
    }
}

/// Stateless mechanism that base64-encodes the escaped text.
///
/// Not cryptography. It exists for tests and for tooling that needs a
/// reversible opaque transform; the base64 alphabet contains no reserved
/// markup characters, so its output is always safe to embed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64EncryptionMechanism;

impl EncryptionMechanism for Base64EncryptionMechanism {
    fn encrypt(&self, plain_text: &str) -> Result<String> {
        Ok(BASE64.encode(plain_text.as_bytes()))
    }

    fn decrypt(&self, cipher_text: &str) -> Result<String> {
        let bytes = BASE64.decode(cipher_text.trim())?;
        String::from_utf8(bytes).map_err(anyhow::Error::from)
    }
}
