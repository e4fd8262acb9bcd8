//! Decoding core: extract raw text -> (optionally) decrypt -> unescape ->
//! parse. Total over empty nodes, escaped plain text, and cipher text.

use std::borrow::Cow;

use veilmark_common::Logger;

use crate::context::{member_marked, Applicability, EncryptionResolver};
use crate::descriptor::TypeDescriptor;
use crate::error::{MarkupError, Result};
use crate::escape::unescape;
use crate::mechanism::SerializationState;
use crate::node::Element;
use crate::scalar::MarkupScalar;
use crate::serializer::MarkupSerialize;

/// Depth-first decoding pass over one document tree. Mirrors
/// [`crate::encode::Encoder`]: one SerializationState per top-level call,
/// member-path stack for failure reports.
pub struct Decoder<'a> {
    resolver: &'a EncryptionResolver,
    state: &'a mut SerializationState,
    logger: &'a Logger,
    pub(crate) path: Vec<String>,
}

impl<'a> Decoder<'a> {
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

    pub(crate) fn decode_value<T: MarkupSerialize>(
        &mut self,
        element: &Element,
        ambient: bool,
    ) -> Result<T> {
        let descriptor = T::descriptor();
        let mut reader = MemberReader {
            decoder: self,
            element,
            owner: &descriptor,
            ambient,
        };
        T::read_members(&mut reader)
    }
}

/// Handed to [`MarkupSerialize::read_members`]; one call per member, in
/// document order.
pub struct MemberReader<'r, 'a> {
    decoder: &'r mut Decoder<'a>,
    element: &'r Element,
    owner: &'r TypeDescriptor,
    ambient: bool,
}

impl MemberReader<'_, '_> {
    /// Decode a scalar member.
    ///
    /// Absent or empty nodes short-circuit to the scalar's default before
    /// the resolver, the mechanism, or the escaper are consulted: an
    /// encryption-marked member with an empty element round-trips to its
    /// default even when the configured mechanism rejects empty input.
    pub fn scalar<T: MarkupScalar>(&mut self, name: &str) -> Result<T> {
        self.decoder.path.push(name.to_string());
        let result = self.scalar_inner(name);
        self.decoder.path.pop();
        result
    }

    fn scalar_inner<T: MarkupScalar>(&mut self, name: &str) -> Result<T> {
        let element = self.element;
        let raw = match element.child(name).and_then(|node| node.raw_text()) {
            None => {
                return T::absent().map_err(|detail| self.coercion_error::<T>(detail));
            }
            Some(raw) => raw,
        };

        let resolver: &EncryptionResolver = self.decoder.resolver;
        match resolver.resolve_member(self.owner, name, self.ambient) {
            Applicability::Inactive => {
                let plain = self.unescape_here(raw)?;
                T::parse(&plain).map_err(|detail| self.coercion_error::<T>(detail))
            }
            Applicability::Active { mechanism, key } => {
                let escaped = match mechanism.decrypt_with(raw, key, self.decoder.state) {
                    Ok(text) => text,
                    Err(source) => {
                        return Err(MarkupError::Encryption {
                            path: self.decoder.member_path(),
                            source: source.into(),
                        })
                    }
                };
                let plain = self.unescape_here(&escaped)?;
                T::parse(&plain).map_err(|detail| self.coercion_error::<T>(detail))
            }
            // Degraded mode: marked for encryption but no mechanism is
            // configured. The node text is literal, already-final content:
            // no decryption, no unescaping, returned byte-for-byte.
            Applicability::Degraded => {
                self.decoder
                    .logger
                    .debug(format!("no mechanism configured, passing '{name}' through"));
                T::parse(raw).map_err(|detail| self.coercion_error::<T>(detail))
            }
        }
    }

    /// Decode a nested object member. Missing elements are a document
    /// error; use [`MemberReader::optional_nested`] for optional members.
    pub fn nested<T: MarkupSerialize>(&mut self, name: &str) -> Result<T> {
        self.decoder.path.push(name.to_string());
        let element = self.element;
        let result = match element.child(name) {
            Some(child) => {
                let child_ambient = member_marked(self.owner, name, self.ambient);
                self.decoder.decode_value(child, child_ambient)
            }
            None => Err(MarkupError::Document(format!(
                "missing element at '{}'",
                self.decoder.member_path()
            ))),
        };
        self.decoder.path.pop();
        result
    }

    /// Decode an optional nested object member; absent or empty elements
    /// produce `None`.
    pub fn optional_nested<T: MarkupSerialize>(&mut self, name: &str) -> Result<Option<T>> {
        let element = self.element;
        match element.child(name) {
            None => Ok(None),
            Some(child) if child.is_empty() => Ok(None),
            Some(child) => {
                self.decoder.path.push(name.to_string());
                let child_ambient = member_marked(self.owner, name, self.ambient);
                let result = self.decoder.decode_value(child, child_ambient);
                self.decoder.path.pop();
                result.map(Some)
            }
        }
    }

    /// Decode a collection member. An absent wrapper element decodes to an
    /// empty collection.
    pub fn collection<T: MarkupSerialize>(&mut self, name: &str) -> Result<Vec<T>> {
        self.decoder.path.push(name.to_string());
        let result = self.collection_inner(name);
        self.decoder.path.pop();
        result
    }

    fn collection_inner<T: MarkupSerialize>(&mut self, name: &str) -> Result<Vec<T>> {
        let element = self.element;
        let Some(wrapper) = element.child(name) else {
            return Ok(Vec::new());
        };
        let child_ambient = member_marked(self.owner, name, self.ambient);
        let mut items = Vec::with_capacity(wrapper.children().len());
        for (index, item_element) in wrapper.children().iter().enumerate() {
            self.decoder.path.push(format!("[{index}]"));
            let item = self.decoder.decode_value::<T>(item_element, child_ambient);
            self.decoder.path.pop();
            items.push(item?);
        }
        Ok(items)
    }

    fn unescape_here<'t>(&self, text: &'t str) -> Result<Cow<'t, str>> {
        unescape(text).map_err(|e| MarkupError::EscapeFormat {
            path: self.decoder.member_path(),
            detail: format!("{} (offset {})", e.detail, e.offset),
        })
    }

    fn coercion_error<T: MarkupScalar>(&self, detail: String) -> MarkupError {
        MarkupError::TypeCoercion {
            path: self.decoder.member_path(),
            target: T::type_label(),
            detail,
        }
    }
}
