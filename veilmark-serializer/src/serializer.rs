//! Top-level serializer: one reversible pipeline over a typed object
//! graph, configured once and reusable across calls. Every serialize or
//! deserialize call gets its own SerializationState; a shared mechanism
//! instance is responsible for its own thread-safety.

use std::marker::PhantomData;
use std::sync::Arc;

use veilmark_common::{Component, Logger};

use crate::context::{EncryptionContext, EncryptionResolver};
use crate::decode::{Decoder, MemberReader};
use crate::descriptor::{self, TypeDescriptor};
use crate::encode::{Encoder, MemberWriter};
use crate::error::{MarkupError, Result};
use crate::mechanism::{EncryptKey, EncryptionMechanism, SerializationState};
use crate::node::Element;

/// A type that can be written to and read from a markup element.
///
/// Implementations declare their member table explicitly; it is built once
/// and cached in the global descriptor registry.
pub trait MarkupSerialize: Sized + 'static {
    /// Registered type name; used as the root element name and as the
    /// element name for items of this type inside collections.
    fn type_name() -> &'static str;

    /// Build the member-capability table for this type. Called at most
    /// once per process.
    fn build_descriptor() -> TypeDescriptor;

    fn descriptor() -> Arc<TypeDescriptor> {
        descriptor::descriptor_of::<Self>(Self::build_descriptor)
    }

    fn write_members(&self, writer: &mut MemberWriter<'_, '_>) -> Result<()>;

    fn read_members(reader: &mut MemberReader<'_, '_>) -> Result<Self>;
}

/// Builder-style configuration for a [`MarkupSerializer`].
#[derive(Clone, Default)]
pub struct SerializerOptions {
    mechanism: Option<Arc<dyn EncryptionMechanism>>,
    encrypt_key: Option<EncryptKey>,
}

impl SerializerOptions {
    pub fn with_encryption_mechanism(mut self, mechanism: Arc<dyn EncryptionMechanism>) -> Self {
        self.mechanism = Some(mechanism);
        self
    }

    pub fn with_encrypt_key(mut self, key: impl Into<EncryptKey>) -> Self {
        self.encrypt_key = Some(key.into());
        self
    }
}

/// Serializes values of `T` to markup text and back.
pub struct MarkupSerializer<T: MarkupSerialize> {
    options: SerializerOptions,
    logger: Logger,
    _marker: PhantomData<fn() -> T>,
}

impl<T: MarkupSerialize> Default for MarkupSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MarkupSerialize> MarkupSerializer<T> {
    /// A serializer with no encryption configured.
    pub fn new() -> Self {
        Self::build(|options| options)
    }

    /// Configure-and-build constructor:
    ///
    /// ```ignore
    /// let serializer = MarkupSerializer::<Foo>::build(|o| o
    ///     .with_encryption_mechanism(mechanism)
    ///     .with_encrypt_key("Foo"));
    /// ```
    pub fn build(configure: impl FnOnce(SerializerOptions) -> SerializerOptions) -> Self {
        Self {
            options: configure(SerializerOptions::default()),
            logger: Logger::new_root(Component::Serializer, T::type_name()),
            _marker: PhantomData,
        }
    }

    /// The resolver only decides applicability and supplies context; when
    /// no key is configured the root type name is used as the opaque key.
    fn resolver(&self) -> EncryptionResolver {
        match &self.options.mechanism {
            Some(mechanism) => {
                let encrypt_key = self
                    .options
                    .encrypt_key
                    .clone()
                    .unwrap_or_else(|| EncryptKey::new(T::type_name()));
                EncryptionResolver::new(Some(EncryptionContext {
                    mechanism: mechanism.clone(),
                    encrypt_key,
                }))
            }
            None => EncryptionResolver::disabled(),
        }
    }

    pub fn serialize(&self, value: &T) -> Result<String> {
        Ok(self.serialize_to_element(value)?.to_markup())
    }

    pub fn serialize_to_element(&self, value: &T) -> Result<Element> {
        let descriptor = T::descriptor();
        let resolver = self.resolver();
        // Fresh state per top-level call; never shared, never reused.
        let mut state = SerializationState::new();
        let mut encoder = Encoder::new(&resolver, &mut state, &self.logger);
        encoder.path.push(descriptor.type_name.clone());
        self.logger
            .debug(format!("serializing '{}'", descriptor.type_name));
        encoder.encode_value(value, &descriptor.type_name, false)
    }

    pub fn deserialize(&self, markup: &str) -> Result<T> {
        let root = Element::from_markup(markup)?;
        self.deserialize_element(&root)
    }

    pub fn deserialize_element(&self, root: &Element) -> Result<T> {
        let descriptor = T::descriptor();
        if root.name() != descriptor.type_name {
            return Err(MarkupError::Document(format!(
                "expected root element '{}', found '{}'",
                descriptor.type_name,
                root.name()
            )));
        }
        let resolver = self.resolver();
        let mut state = SerializationState::new();
        let mut decoder = Decoder::new(&resolver, &mut state, &self.logger);
        decoder.path.push(descriptor.type_name.clone());
        self.logger
            .debug(format!("deserializing '{}'", descriptor.type_name));
        decoder.decode_value(root, false)
    }
}
