//! Markup serialization with selective member encryption for Veilmark
//!
//! This crate provides:
//! - A reversible entity escaper for the five reserved markup characters
//! - A pluggable `EncryptionMechanism` capability with key/state threading
//! - Descriptor-driven member-level and type-level encryption markers
//! - Encode/decode cores that embed cipher text into markup without
//!   corrupting either the markup or the cipher text
//!
//! Whether a node holds escaped plain text or cipher text is decided
//! solely by the static member metadata, never by inspecting content.

pub mod context;
pub mod decode;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod escape;
pub mod mechanism;
pub mod node;
pub mod scalar;
pub mod serializer;

pub use context::{Applicability, EncryptionContext, EncryptionResolver};
pub use decode::MemberReader;
pub use descriptor::{descriptor_of, MemberDescriptor, TypeDescriptor};
pub use encode::MemberWriter;
pub use error::{MarkupError, Result};
pub use escape::{escape, unescape, EntityError};
pub use mechanism::{
    Base64EncryptionMechanism, EncryptKey, EncryptionMechanism, SerializationState,
};
pub use node::Element;
pub use scalar::MarkupScalar;
pub use serializer::{MarkupSerialize, MarkupSerializer, SerializerOptions};
