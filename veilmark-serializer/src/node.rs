//! Narrow markup-tree interface consumed by the encode/decode cores.
//!
//! An [`Element`] holds either raw text or child elements. "Raw" means the
//! engine stores and reads node content verbatim: escaped plain text and
//! cipher text pass through this layer untouched, and the reader/writer
//! below never performs entity processing. Attributes, namespaces and
//! mixed content are out of scope.

use std::fmt::Write as _;

use crate::error::{MarkupError, Result};

/// One markup element in the document tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.text = text.into();
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// An element with no text and no children. Empty nodes decode to the
    /// member's default value, never to an error.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.children.is_empty()
    }

    /// Verbatim node content; `None` when the node is empty.
    pub fn raw_text(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn set_raw_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Write this element and its subtree as markup text.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        if self.is_empty() {
            let _ = write!(out, "<{} />", self.name);
        } else if self.children.is_empty() {
            let _ = write!(out, "<{}>{}</{}>", self.name, self.text, self.name);
        } else {
            let _ = write!(out, "<{}>", self.name);
            for child in &self.children {
                child.write_into(out);
            }
            let _ = write!(out, "</{}>", self.name);
        }
    }

    /// Read one element tree from markup text. Accepts both `<A></A>` and
    /// `<A />` as an empty element.
    pub fn from_markup(input: &str) -> Result<Element> {
        let mut parser = Parser { input, pos: 0 };
        parser.skip_whitespace();
        let root = parser.parse_element()?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(MarkupError::Document(format!(
                "trailing content after root element at offset {}",
                parser.pos
            )));
        }
        Ok(root)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(MarkupError::Document(format!(
                "expected '{token}' at offset {}",
                self.pos
            )))
        }
    }

    fn read_name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let mut len = 0;
        for (i, ch) in rest.char_indices() {
            let valid = if i == 0 {
                ch.is_ascii_alphabetic() || ch == '_'
            } else {
                ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
            };
            if !valid {
                break;
            }
            len = i + ch.len_utf8();
        }
        if len == 0 {
            return Err(MarkupError::Document(format!(
                "expected element name at offset {}",
                self.pos
            )));
        }
        let name = &rest[..len];
        self.pos += len;
        Ok(name)
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect("<")?;
        let name = self.read_name()?;
        self.skip_whitespace();

        if self.rest().starts_with("/>") {
            self.pos += 2;
            return Ok(Element::new(name));
        }
        self.expect(">")?;

        let mut element = Element::new(name);
        let text_start = self.pos;
        let text_len = self.rest().find('<').ok_or_else(|| {
            MarkupError::Document(format!("unterminated element '{name}'"))
        })?;
        let text = &self.input[text_start..text_start + text_len];
        self.pos += text_len;

        if self.rest().starts_with("</") {
            element.text = text.to_string();
        } else {
            // Child elements; anything between them must be whitespace.
            if !text.trim().is_empty() {
                return Err(MarkupError::Document(format!(
                    "mixed text and child content in element '{name}'"
                )));
            }
            loop {
                if self.rest().starts_with("</") {
                    break;
                }
                element.add_child(self.parse_element()?);
                self.skip_whitespace();
                if self.rest().is_empty() {
                    return Err(MarkupError::Document(format!(
                        "unterminated element '{name}'"
                    )));
                }
            }
        }

        self.expect("</")?;
        let closing = self.read_name()?;
        if closing != name {
            return Err(MarkupError::Document(format!(
                "mismatched closing element: expected '</{name}>', found '</{closing}>'"
            )));
        }
        self.skip_whitespace();
        self.expect(">")?;
        Ok(element)
    }
}
