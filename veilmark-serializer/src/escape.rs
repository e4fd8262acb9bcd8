//! Entity escaping for the five reserved markup characters.
//!
//! `escape` and `unescape` are exact inverses for anything `escape`
//! produced. `unescape` additionally inverts the five named references in
//! externally authored input, one pass, left to right: `&amp;lt;` becomes
//! `&lt;` and is not rescanned.

use std::borrow::Cow;

/// Raised when `unescape` meets a malformed entity reference. The decode
/// core wraps this into a path-tagged [`crate::MarkupError::EscapeFormat`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityError {
    /// Byte offset of the offending `&` in the input.
    pub offset: usize,
    pub detail: String,
}

/// Replace literal `&`, `<`, `>`, `"`, `'` with their named references.
///
/// Returns the input unchanged (borrowed) when no reserved character
/// occurs. Applied exactly once per serialization pass; escaping twice
/// double-encodes on purpose.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text
        .bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
    {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Invert the five named references. Any other use of `&` is a malformed
/// entity reference and fails with the offset attached.
pub fn unescape(text: &str) -> std::result::Result<Cow<'_, str>, EntityError> {
    if !text.contains('&') {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut consumed = 0usize;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let offset = consumed + pos;
        let tail = &rest[pos..];

        // Longest recognized reference is 6 bytes (`&quot;`).
        let semi = tail
            .bytes()
            .take(7)
            .position(|b| b == b';')
            .ok_or_else(|| EntityError {
                offset,
                detail: "unterminated entity reference".to_string(),
            })?;

        let replacement = match &tail[1..semi] {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            other => {
                return Err(EntityError {
                    offset,
                    detail: format!("unknown entity reference '&{other};'"),
                })
            }
        };
        out.push(replacement);

        rest = &tail[semi + 1..];
        consumed = offset + semi + 1;
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}
