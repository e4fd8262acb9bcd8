//! The type/value formatter seam: renders a scalar to plain text and
//! parses plain text back into a typed value.

/// Plain-text formatting for one scalar type.
///
/// `parse` receives text that is already unescaped, except in degraded
/// decoding, where it receives the raw node text verbatim. Parse failures
/// carry a detail string; the decode core wraps them into a path-tagged
/// coercion error.
pub trait MarkupScalar: Sized {
    /// Target-type label used in coercion failures.
    fn type_label() -> &'static str;

    /// Plain textual form; `None` means the value has no textual form and
    /// encodes to an empty node.
    fn render(&self) -> Option<String>;

    fn parse(text: &str) -> std::result::Result<Self, String>;

    /// Value produced for an absent or empty node.
    fn absent() -> std::result::Result<Self, String>;
}

impl MarkupScalar for String {
    fn type_label() -> &'static str {
        "String"
    }

    fn render(&self) -> Option<String> {
        Some(self.clone())
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        Ok(text.to_string())
    }

    fn absent() -> std::result::Result<Self, String> {
        Ok(String::new())
    }
}

impl MarkupScalar for bool {
    fn type_label() -> &'static str {
        "bool"
    }

    fn render(&self) -> Option<String> {
        Some(if *self { "true" } else { "false" }.to_string())
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(format!("expected 'true' or 'false', got '{other}'")),
        }
    }

    fn absent() -> std::result::Result<Self, String> {
        Err("empty node has no bool representation".to_string())
    }
}

macro_rules! impl_markup_scalar_for_numeric {
    ($($ty:ty => $label:literal),* $(,)?) => {
        $(
            impl MarkupScalar for $ty {
                fn type_label() -> &'static str {
                    $label
                }

                fn render(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn parse(text: &str) -> std::result::Result<Self, String> {
                    text.trim().parse::<$ty>().map_err(|e| e.to_string())
                }

                fn absent() -> std::result::Result<Self, String> {
                    Err(concat!("empty node has no ", $label, " representation").to_string())
                }
            }
        )*
    };
}

impl_markup_scalar_for_numeric!(
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    f32 => "f32",
    f64 => "f64",
);

/// Nullable values: `None` renders as an empty node and an absent node
/// parses back to `None`.
///
/// `Some(String::new())` also renders to an empty node, so it decodes
/// back as `None`: empty nodes always mean the absent value, and an
/// empty optional string is not distinguishable from a missing one.
impl<T: MarkupScalar> MarkupScalar for Option<T> {
    fn type_label() -> &'static str {
        T::type_label()
    }

    fn render(&self) -> Option<String> {
        self.as_ref().and_then(|value| value.render())
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        T::parse(text).map(Some)
    }

    fn absent() -> std::result::Result<Self, String> {
        Ok(None)
    }
}
