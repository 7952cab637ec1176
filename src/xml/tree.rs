//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Ax.
//! The Ax project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Generic attributed XML tree.
//!
//! Policy documents are small and frequently hand-edited, so the reader is a
//! straightforward recursive-descent tokenizer. It accepts the one deviation
//! from strict XML that gateway authors rely on: policy expressions such as
//! `@(context.Request.Headers.GetValueOrDefault("x", ""))` may contain raw
//! quotes inside an attribute value and raw `<`/`>` inside element text.

use crate::errors::{AxError, Result};
use crate::xml::escape::{AxFEscapeText, AxFFormatAttributeText, AxFIsExpression, AxFUnescapeXml};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxCXmlNode {
    Element(AxCXmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AxCXmlElement {
    pub name: String,
    /// Unescaped values in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<AxCXmlNode>,
}

impl AxCXmlElement {
    #[allow(non_snake_case)]
    pub fn AxFNew(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFAttribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[allow(non_snake_case)]
    pub fn AxFChildElements(&self) -> impl Iterator<Item = &AxCXmlElement> {
        self.children.iter().filter_map(|node| match node {
            AxCXmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    #[allow(non_snake_case)]
    pub fn AxFChild(&self, name: &str) -> Option<&AxCXmlElement> {
        self.AxFChildElements().find(|el| el.name == name)
    }

    #[allow(non_snake_case)]
    pub fn AxFHasElementChildren(&self) -> bool {
        self.AxFChildElements().next().is_some()
    }

    /// Concatenated text and CDATA of direct children.
    #[allow(non_snake_case)]
    pub fn AxFText(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                AxCXmlNode::Text(t) | AxCXmlNode::CData(t) => text.push_str(t),
                _ => {}
            }
        }
        text
    }

    #[allow(non_snake_case)]
    pub fn AxFTrimmedText(&self) -> Option<String> {
        let text = self.AxFText();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Pretty-prints the element with `indent_width` spaces per level.
    #[allow(non_snake_case)]
    pub fn AxFSerialize(&self, indent_width: usize) -> String {
        let mut lines = Vec::new();
        serialize_into(self, indent_width, 0, &mut lines);
        lines.join("\n")
    }
}

fn open_tag(el: &AxCXmlElement) -> String {
    let mut tag = format!("<{}", el.name);
    for (k, v) in &el.attributes {
        tag.push_str(&format!(" {}=\"{}\"", k, AxFFormatAttributeText(v)));
    }
    tag
}

fn text_content(text: &str) -> String {
    if AxFIsExpression(text.trim_start()) {
        text.to_string()
    } else {
        AxFEscapeText(text)
    }
}

fn serialize_into(el: &AxCXmlElement, indent_width: usize, depth: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent_width * depth);
    let meaningful: Vec<&AxCXmlNode> = el
        .children
        .iter()
        .filter(|node| !matches!(node, AxCXmlNode::Text(t) if t.trim().is_empty()))
        .collect();

    if meaningful.is_empty() {
        lines.push(format!("{}{} />", pad, open_tag(el)));
        return;
    }

    let inline = meaningful
        .iter()
        .all(|node| matches!(node, AxCXmlNode::Text(_) | AxCXmlNode::CData(_)));
    if inline {
        let mut body = String::new();
        for node in &meaningful {
            match node {
                AxCXmlNode::Text(t) => body.push_str(&text_content(t.trim())),
                AxCXmlNode::CData(t) => body.push_str(&format!("<![CDATA[{}]]>", t)),
                _ => {}
            }
        }
        lines.push(format!("{}{}>{}</{}>", pad, open_tag(el), body, el.name));
        return;
    }

    lines.push(format!("{}{}>", pad, open_tag(el)));
    let inner_pad = " ".repeat(indent_width * (depth + 1));
    for node in meaningful {
        match node {
            AxCXmlNode::Element(child) => serialize_into(child, indent_width, depth + 1, lines),
            AxCXmlNode::Text(t) => lines.push(format!("{}{}", inner_pad, text_content(t.trim()))),
            AxCXmlNode::CData(t) => lines.push(format!("{}<![CDATA[{}]]>", inner_pad, t)),
            AxCXmlNode::Comment(c) => lines.push(format!("{}<!--{}-->", inner_pad, c)),
        }
    }
    lines.push(format!("{}</{}>", pad, el.name));
}

/// Parses a complete document and returns its root element.
#[allow(non_snake_case)]
pub fn AxFParseDocument(source: &str) -> Result<AxCXmlElement> {
    let mut reader = AxCXmlReader::AxFNew(source);
    reader.skip_misc()?;
    if !reader.starts_with("<") || reader.at_end() {
        return Err(AxError::parse("expected a root element", reader.pos));
    }
    let root = reader.read_element()?;
    reader.skip_misc()?;
    if !reader.at_end() {
        return Err(AxError::parse("unexpected content after the root element", reader.pos));
    }
    Ok(root)
}

struct AxCXmlReader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> AxCXmlReader<'a> {
    #[allow(non_snake_case)]
    fn AxFNew(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Returns the text before `pat` and moves past it.
    fn take_until(&mut self, pat: &str, what: &str) -> Result<&'a str> {
        match self.rest().find(pat) {
            Some(idx) => {
                let text = &self.rest()[..idx];
                self.pos += idx + pat.len();
                Ok(text)
            }
            None => Err(AxError::parse(format!("unterminated {}", what), self.pos)),
        }
    }

    /// Whitespace, comments, processing instructions and DOCTYPE outside the root.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_ws();
            if self.starts_with("<?") {
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("<!--") {
                self.pos += 4;
                self.take_until("-->", "comment")?;
            } else if self.starts_with("<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<()> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(AxError::parse("unterminated DOCTYPE", start))
    }

    fn read_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '/' | '>' | '=' | '<' | '"' | '\'') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let name = &self.src[start..self.pos];
        match name.chars().next() {
            Some(first) if first.is_alphabetic() || first == '_' || first == ':' => Ok(name.to_string()),
            _ => Err(AxError::parse(format!("invalid name '{}'", name), start)),
        }
    }

    fn read_element(&mut self) -> Result<AxCXmlElement> {
        let start = self.pos;
        self.bump();
        let mut element = AxCXmlElement::AxFNew(self.read_name()?);

        loop {
            self.skip_ws();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(element);
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            if self.at_end() {
                return Err(AxError::parse(
                    format!("unterminated start tag <{}>", element.name),
                    start,
                ));
            }
            let attr_pos = self.pos;
            let name = self.read_name()?;
            self.skip_ws();
            if self.bump() != Some('=') {
                return Err(AxError::parse(
                    format!("attribute '{}' has no value", name),
                    attr_pos,
                ));
            }
            self.skip_ws();
            let value = self.read_attribute_value()?;
            if element.AxFAttribute(&name).is_some() {
                return Err(AxError::parse(format!("duplicate attribute '{}'", name), attr_pos));
            }
            element.attributes.push((name, value));
        }

        self.read_children(&mut element, start)?;
        Ok(element)
    }

    fn read_attribute_value(&mut self) -> Result<String> {
        let quote_pos = self.pos;
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(AxError::parse("attribute value must be quoted", quote_pos)),
        };
        let value_start = self.pos;
        if self.starts_with("@(") || self.starts_with("@{") {
            if let Some(end) = scan_expression(self.src, self.pos) {
                if self.src[end..].starts_with(quote) {
                    self.pos = end + quote.len_utf8();
                    return Ok(AxFUnescapeXml(&self.src[value_start..end]));
                }
            }
        }
        match self.rest().find(quote) {
            Some(idx) => {
                let raw = &self.rest()[..idx];
                self.pos += idx + quote.len_utf8();
                Ok(AxFUnescapeXml(raw))
            }
            None => Err(AxError::parse("unterminated attribute value", quote_pos)),
        }
    }

    fn read_children(&mut self, element: &mut AxCXmlElement, start: usize) -> Result<()> {
        loop {
            if self.at_end() {
                return Err(AxError::parse(
                    format!("unclosed element <{}>", element.name),
                    start,
                ));
            }
            if self.starts_with("</") {
                let close_pos = self.pos;
                self.pos += 2;
                let name = self.read_name()?;
                self.skip_ws();
                if self.bump() != Some('>') {
                    return Err(AxError::parse("malformed closing tag", close_pos));
                }
                if name != element.name {
                    return Err(AxError::parse(
                        format!("mismatched closing tag </{}> for <{}>", name, element.name),
                        close_pos,
                    ));
                }
                return Ok(());
            } else if self.starts_with("<!--") {
                self.pos += 4;
                let comment = self.take_until("-->", "comment")?;
                element.children.push(AxCXmlNode::Comment(comment.to_string()));
            } else if self.starts_with("<![CDATA[") {
                self.pos += 9;
                let data = self.take_until("]]>", "CDATA section")?;
                element.children.push(AxCXmlNode::CData(data.to_string()));
            } else if self.starts_with("<?") {
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("<") {
                let child = self.read_element()?;
                element.children.push(AxCXmlNode::Element(child));
            } else {
                let text = self.read_text();
                element.children.push(AxCXmlNode::Text(AxFUnescapeXml(text)));
            }
        }
    }

    /// Text up to the next markup, skipping over balanced policy expressions.
    fn read_text(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            if c == '@' {
                let next = self.src[self.pos + 1..].chars().next();
                if matches!(next, Some('(') | Some('{')) {
                    if let Some(end) = scan_expression(self.src, self.pos) {
                        self.pos = end;
                        continue;
                    }
                }
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }
}

/// Finds the end of a `@(...)` or `@{...}` expression starting at `at`.
///
/// String literals are skipped so brackets and quotes inside them do not
/// count. Returns the byte offset just past the closing bracket.
fn scan_expression(src: &str, at: usize) -> Option<usize> {
    let mut chars = src[at..].char_indices().skip(1);
    let (_, open) = chars.next()?;
    let close = match open {
        '(' => ')',
        '{' => '}',
        _ => return None,
    };
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in chars {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(at + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
