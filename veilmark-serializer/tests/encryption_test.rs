use std::sync::Arc;

use anyhow::{anyhow, Result as AnyResult};
use veilmark_serializer::{
    Base64EncryptionMechanism, EncryptionMechanism, MarkupSerialize, MarkupSerializer,
    MemberReader, MemberWriter, Result, TypeDescriptor,
};

/// Marker mechanism that wraps the escaped text in `ENCRYPTED(...)` and
/// swaps angle brackets for square ones so its output never contains
/// reserved markup characters. Reversible but clearly not idempotent.
struct MarkerMechanism;

impl EncryptionMechanism for MarkerMechanism {
    fn encrypt(&self, plain_text: &str) -> AnyResult<String> {
        let body = plain_text
            .replace('[', r"\[")
            .replace('<', "[")
            .replace(']', r"\]")
            .replace('>', "]");
        Ok(format!("ENCRYPTED({body})"))
    }

    fn decrypt(&self, cipher_text: &str) -> AnyResult<String> {
        let body = cipher_text
            .strip_prefix("ENCRYPTED(")
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| anyhow!("unrecognized cipher text: {cipher_text}"))?;
        const SENTINEL: &str = "\u{1}veilmark\u{1}";
        Ok(body
            .replace(r"\[", SENTINEL)
            .replace('[', "<")
            .replace(SENTINEL, "[")
            .replace(r"\]", SENTINEL)
            .replace(']', ">")
            .replace(SENTINEL, "]"))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
    id: String,
    secret: Option<String>,
}

impl MarkupSerialize for Account {
    fn type_name() -> &'static str {
        "Account"
    }

    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Account")
            .member("Id")
            .encrypted_member("Secret")
    }

    fn write_members(&self, w: &mut MemberWriter<'_, '_>) -> Result<()> {
        w.scalar("Id", &self.id)?;
        w.scalar("Secret", &self.secret)
    }

    fn read_members(r: &mut MemberReader<'_, '_>) -> Result<Self> {
        Ok(Account {
            id: r.scalar("Id")?,
            secret: r.scalar("Secret")?,
        })
    }
}

/// Type-level marking with one member explicitly opted out.
#[derive(Debug, Clone, PartialEq)]
struct Vault {
    label: String,
    combination: String,
    owner: String,
}

impl MarkupSerialize for Vault {
    fn type_name() -> &'static str {
        "Vault"
    }

    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Vault")
            .encrypt_all()
            .plain_member("Label")
            .member("Combination")
            .member("Owner")
    }

    fn write_members(&self, w: &mut MemberWriter<'_, '_>) -> Result<()> {
        w.scalar("Label", &self.label)?;
        w.scalar("Combination", &self.combination)?;
        w.scalar("Owner", &self.owner)
    }

    fn read_members(r: &mut MemberReader<'_, '_>) -> Result<Self> {
        Ok(Vault {
            label: r.scalar("Label")?,
            combination: r.scalar("Combination")?,
            owner: r.scalar("Owner")?,
        })
    }
}

fn marker_serializer() -> MarkupSerializer<Account> {
    MarkupSerializer::<Account>::build(|o| {
        o.with_encryption_mechanism(Arc::new(MarkerMechanism))
            .with_encrypt_key("Account")
    })
}

#[test]
fn encrypted_member_round_trips_reserved_characters() -> Result<()> {
    let serializer = marker_serializer();
    let original = Account {
        id: "a-1".to_string(),
        secret: Some("A & B < C".to_string()),
    };

    let markup = serializer.serialize(&original)?;
    // The escaped text is what gets encrypted, and the cipher text is
    // embedded verbatim without re-escaping.
    assert!(markup.contains("<Secret>ENCRYPTED(A &amp; B &lt; C)</Secret>"));

    let decoded = serializer.deserialize(&markup)?;
    assert_eq!(decoded, original);
    Ok(())
}

#[test]
fn unencrypted_member_stays_readable_next_to_cipher_text() -> Result<()> {
    let serializer = marker_serializer();
    let markup = serializer.serialize(&Account {
        id: "visible".to_string(),
        secret: Some("hidden".to_string()),
    })?;

    assert!(markup.contains("<Id>visible</Id>"));
    // The marker mechanism wraps rather than hides; the member text is
    // the mechanism's output, not the plain value.
    assert!(markup.contains("<Secret>ENCRYPTED(hidden)</Secret>"));
    assert!(!markup.contains("<Secret>hidden</Secret>"));
    Ok(())
}

#[test]
fn base64_mechanism_round_trips() -> Result<()> {
    let serializer = MarkupSerializer::<Account>::build(|o| {
        o.with_encryption_mechanism(Arc::new(Base64EncryptionMechanism))
            .with_encrypt_key("Account")
    });
    let original = Account {
        id: "a-2".to_string(),
        secret: Some(r#"quotes " and 'apostrophes' & more"#.to_string()),
    };

    let markup = serializer.serialize(&original)?;
    assert!(!markup.contains("quotes"));

    assert_eq!(serializer.deserialize(&markup)?, original);
    Ok(())
}

#[test]
fn type_level_marking_encrypts_all_but_opted_out_members() -> Result<()> {
    let serializer = MarkupSerializer::<Vault>::build(|o| {
        o.with_encryption_mechanism(Arc::new(MarkerMechanism))
            .with_encrypt_key("Vault")
    });
    let original = Vault {
        label: "office safe".to_string(),
        combination: "13-37-42".to_string(),
        owner: "facilities".to_string(),
    };

    let markup = serializer.serialize(&original)?;
    assert!(markup.contains("<Label>office safe</Label>"));
    assert!(markup.contains("<Combination>ENCRYPTED(13-37-42)</Combination>"));
    assert!(markup.contains("<Owner>ENCRYPTED(facilities)</Owner>"));

    assert_eq!(serializer.deserialize(&markup)?, original);
    Ok(())
}

#[test]
fn encrypt_key_defaults_to_the_root_type_name() -> Result<()> {
    /// Mechanism that embeds the key it was handed, so the test can watch
    /// key resolution from the outside.
    struct KeyEcho;
    impl EncryptionMechanism for KeyEcho {
        fn encrypt(&self, plain_text: &str) -> AnyResult<String> {
            Ok(plain_text.to_string())
        }
        fn decrypt(&self, cipher_text: &str) -> AnyResult<String> {
            Ok(cipher_text.to_string())
        }
        fn encrypt_with(
            &self,
            plain_text: &str,
            key: &veilmark_serializer::EncryptKey,
            _state: &mut veilmark_serializer::SerializationState,
        ) -> AnyResult<String> {
            Ok(format!("{key}.{plain_text}"))
        }
        fn decrypt_with(
            &self,
            cipher_text: &str,
            key: &veilmark_serializer::EncryptKey,
            _state: &mut veilmark_serializer::SerializationState,
        ) -> AnyResult<String> {
            cipher_text
                .strip_prefix(&format!("{key}."))
                .map(str::to_string)
                .ok_or_else(|| anyhow!("wrong key"))
        }
    }

    let serializer =
        MarkupSerializer::<Account>::build(|o| o.with_encryption_mechanism(Arc::new(KeyEcho)));
    let markup = serializer.serialize(&Account {
        id: "a-3".to_string(),
        secret: Some("s".to_string()),
    })?;

    assert!(markup.contains("<Secret>Account.s</Secret>"));
    assert_eq!(
        serializer.deserialize(&markup)?.secret,
        Some("s".to_string())
    );
    Ok(())
}
