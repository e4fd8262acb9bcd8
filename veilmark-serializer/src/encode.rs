//! Encoding core: render -> escape -> (optionally) encrypt -> embed.

use veilmark_common::Logger;

use crate::context::{member_marked, Applicability, EncryptionResolver};
use crate::descriptor::TypeDescriptor;
use crate::error::{MarkupError, Result};
use crate::escape::escape;
use crate::mechanism::SerializationState;
use crate::node::Element;
use crate::scalar::MarkupScalar;
use crate::serializer::MarkupSerialize;

/// Depth-first encoding pass over one object graph. Holds the member-path
/// stack used in failure reports; the SerializationState lives for the
/// whole top-level call and is threaded through every encrypted region.
pub struct Encoder<'a> {
    resolver: &'a EncryptionResolver,
    state: &'a mut SerializationState,
    logger: &'a Logger,
    pub(crate) path: Vec<String>,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(
        resolver: &'a EncryptionResolver,
        state: &'a mut SerializationState,
        logger: &'a Logger,
    ) -> Self {
        Self {
            resolver,
            state,
            logger,
            path: Vec::new(),
        }
    }

    pub(crate) fn member_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    /// Encode one object as an element named `element_name`. `ambient` is
    /// true when the object sits inside an encrypted region.
    pub(crate) fn encode_value<T: MarkupSerialize>(
        &mut self,
        value: &T,
        element_name: &str,
        ambient: bool,
    ) -> Result<Element> {
        let descriptor = T::descriptor();
        let mut element = Element::new(element_name);
        let mut writer = MemberWriter {
            encoder: self,
            element: &mut element,
            owner: &descriptor,
            ambient,
        };
        value.write_members(&mut writer)?;
        Ok(element)
    }
}

/// Handed to [`MarkupSerialize::write_members`]; one call per member, in
/// document order.
pub struct MemberWriter<'w, 'a> {
    encoder: &'w mut Encoder<'a>,
    element: &'w mut Element,
    owner: &'w TypeDescriptor,
    ambient: bool,
}

impl MemberWriter<'_, '_> {
    /// Encode a scalar member.
    ///
    /// Null values encode to an empty node and never reach the mechanism.
    /// Otherwise the plain text is escaped first, and when encryption is
    /// active the *escaped* text is what gets encrypted; the cipher text is
    /// embedded verbatim.
    pub fn scalar<T: MarkupScalar>(&mut self, name: &str, value: &T) -> Result<()> {
        self.encoder.path.push(name.to_string());
        let result = self.scalar_inner(name, value);
        self.encoder.path.pop();
        result
    }

    fn scalar_inner<T: MarkupScalar>(&mut self, name: &str, value: &T) -> Result<()> {
        let mut child = Element::new(name);
        if let Some(plain) = value.render() {
            let escaped = escape(&plain);
            let resolver: &EncryptionResolver = self.encoder.resolver;
            match resolver.resolve_member(self.owner, name, self.ambient) {
                Applicability::Active { mechanism, key } => {
                    match mechanism.encrypt_with(&escaped, key, self.encoder.state) {
                        Ok(cipher) => child.set_raw_text(cipher),
                        Err(source) => {
                            return Err(MarkupError::Encryption {
                                path: self.encoder.member_path(),
                                source: source.into(),
                            })
                        }
                    }
                }
                // No mechanism configured: embed the escaped text as-is.
                Applicability::Inactive | Applicability::Degraded => {
                    child.set_raw_text(escaped.into_owned());
                }
            }
        }
        self.element.add_child(child);
        Ok(())
    }

    /// Encode a nested object member. A member-level (or inherited)
    /// encryption marking puts the whole subtree into an encrypted region.
    pub fn nested<T: MarkupSerialize>(&mut self, name: &str, value: &T) -> Result<()> {
        self.encoder.path.push(name.to_string());
        let child_ambient = member_marked(self.owner, name, self.ambient);
        let encoded = self.encoder.encode_value(value, name, child_ambient);
        self.encoder.path.pop();
        self.element.add_child(encoded?);
        Ok(())
    }

    /// Encode an optional nested object member; `None` encodes to an empty
    /// element.
    pub fn optional_nested<T: MarkupSerialize>(
        &mut self,
        name: &str,
        value: &Option<T>,
    ) -> Result<()> {
        match value {
            Some(inner) => self.nested(name, inner),
            None => {
                self.element.add_child(Element::new(name));
                Ok(())
            }
        }
    }

    /// Encode a collection member: a wrapper element named after the
    /// member, one child per item named after the item type. Every item
    /// runs through the same pipeline with the same threaded state.
    pub fn collection<'t, T>(
        &mut self,
        name: &str,
        items: impl IntoIterator<Item = &'t T>,
    ) -> Result<()>
    where
        T: MarkupSerialize + 't,
    {
        self.encoder.path.push(name.to_string());
        let child_ambient = member_marked(self.owner, name, self.ambient);
        let item_descriptor = T::descriptor();
        let mut wrapper = Element::new(name);
        for (index, item) in items.into_iter().enumerate() {
            self.encoder.path.push(format!("[{index}]"));
            let encoded = self.encoder.encode_value(item, &item_descriptor.type_name, child_ambient);
            self.encoder.path.pop();
            wrapper.add_child(encoded?);
        }
        self.encoder.path.pop();
        self.encoder
            .logger
            .debug(format!("encoded {} items into '{name}'", wrapper.children().len()));
        self.element.add_child(wrapper);
        Ok(())
    }
}
