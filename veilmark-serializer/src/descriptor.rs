//! Static member/type metadata and the global descriptor registry.
//!
//! Encryption markers are declarative metadata, resolved once per type and
//! cached; they are never re-derived per call. At decode time the engine
//! relies solely on this metadata to tell cipher text from escaped plain
//! text; node content is never inspected to guess.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Capability record for one serialized member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    /// `Some(true)` / `Some(false)` is an explicit member-level marking and
    /// always wins; `None` inherits the type-level default.
    pub encrypt: Option<bool>,
}

/// Member table for one registered type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Registered type name; also the element name used for items of this
    /// type inside collections.
    pub type_name: String,
    /// Type-level marking: every member is encrypted unless it opts out
    /// with an explicit member-level `encrypt = false`.
    pub encrypt_all: bool,
    pub members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            encrypt_all: false,
            members: Vec::new(),
        }
    }

    /// Mark every member of this type for encryption.
    pub fn encrypt_all(mut self) -> Self {
        self.encrypt_all = true;
        self
    }

    /// Declare a member that inherits the type-level marking.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            encrypt: None,
        });
        self
    }

    /// Declare a member explicitly marked for encryption.
    pub fn encrypted_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            encrypt: Some(true),
        });
        self
    }

    /// Declare a member explicitly opted out of encryption.
    pub fn plain_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            encrypt: Some(false),
        });
        self
    }

    pub fn find(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Global, thread-safe map: TypeId -> resolved descriptor.
static REGISTRY: Lazy<DashMap<TypeId, Arc<TypeDescriptor>>> = Lazy::new(DashMap::new);

/// Fetch the cached descriptor for `T`, building and registering it on
/// first use. Descriptors are immutable once registered.
pub fn descriptor_of<T: 'static>(build: impl FnOnce() -> TypeDescriptor) -> Arc<TypeDescriptor> {
    if let Some(existing) = REGISTRY.get(&TypeId::of::<T>()) {
        return existing.clone();
    }
    let built = Arc::new(build());
    REGISTRY
        .entry(TypeId::of::<T>())
        .or_insert(built)
        .value()
        .clone()
}
