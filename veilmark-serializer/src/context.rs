//! The encryption context resolver: decides whether encryption applies to
//! a member and supplies the key. It performs no I/O and no text
//! transformation itself.

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::mechanism::{EncryptKey, EncryptionMechanism};

/// Everything the encode/decode cores need to run encryption for one
/// top-level call.
#[derive(Clone)]
pub struct EncryptionContext {
    pub mechanism: Arc<dyn EncryptionMechanism>,
    pub encrypt_key: EncryptKey,
}

/// Outcome of consulting the resolver for one member.
pub enum Applicability<'a> {
    /// Member is not marked; escaped text is embedded directly.
    Inactive,
    /// Member is marked and a mechanism is configured.
    Active {
        mechanism: &'a dyn EncryptionMechanism,
        key: &'a EncryptKey,
    },
    /// Member is marked but no mechanism is configured. On decode the node
    /// text is treated as literal, already-final content.
    Degraded,
}

/// Whether a member is marked for encryption. An explicit member-level
/// flag wins over the type-level flag; unmarked members inherit the type
/// flag, then the ambient region flag set by an encrypted parent member.
pub(crate) fn member_marked(owner: &TypeDescriptor, name: &str, ambient: bool) -> bool {
    match owner.find(name).and_then(|m| m.encrypt) {
        Some(explicit) => explicit,
        None => owner.encrypt_all || ambient,
    }
}

pub struct EncryptionResolver {
    context: Option<EncryptionContext>,
}

impl EncryptionResolver {
    pub fn new(context: Option<EncryptionContext>) -> Self {
        Self { context }
    }

    pub fn disabled() -> Self {
        Self { context: None }
    }

    pub fn has_mechanism(&self) -> bool {
        self.context.is_some()
    }

    pub fn resolve_member(
        &self,
        owner: &TypeDescriptor,
        name: &str,
        ambient: bool,
    ) -> Applicability<'_> {
        if !member_marked(owner, name, ambient) {
            return Applicability::Inactive;
        }
        match &self.context {
            Some(ctx) => Applicability::Active {
                mechanism: ctx.mechanism.as_ref(),
                key: &ctx.encrypt_key,
            },
            None => Applicability::Degraded,
        }
    }
}
