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

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::config::AxCNamedValueStyle;
use crate::model::AxCAttributeValue;

/// Leading character of a live policy expression (`@(...)`, `@{...}`).
pub const AX_EXPRESSION_PREFIX: char = '@';

static NAMED_VALUE_TOKEN: OnceLock<Regex> = OnceLock::new();

fn named_value_token() -> &'static Regex {
    NAMED_VALUE_TOKEN.get_or_init(|| {
        Regex::new(r"^\$?\{\{([^{}]+)\}\}$").expect("named value pattern is valid")
    })
}

/// Escapes the five reserved characters for use in attribute values.
#[allow(non_snake_case)]
pub fn AxFEscapeXml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes element text; quotes are left alone.
#[allow(non_snake_case)]
pub fn AxFEscapeText(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decodes predefined and numeric character references in a single pass.
///
/// Unknown or malformed references are kept verbatim.
#[allow(non_snake_case)]
pub fn AxFUnescapeXml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(semi) if semi <= 12 => {
                let entity = &tail[1..semi];
                match decode_entity(entity) {
                    Some(c) => {
                        out.push(c);
                        rest = &tail[semi + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &tail[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

/// True when the text is a live policy expression that must not be escaped.
#[allow(non_snake_case)]
pub fn AxFIsExpression(s: &str) -> bool {
    s.starts_with(AX_EXPRESSION_PREFIX)
}

#[allow(non_snake_case)]
pub fn AxFFormatNamedValue(name: &str, style: AxCNamedValueStyle) -> String {
    match style {
        AxCNamedValueStyle::Dollar => format!("${{{{{}}}}}", name),
        AxCNamedValueStyle::Plain => format!("{{{{{}}}}}", name),
    }
}

/// Extracts the name from a whole-string named-value token.
///
/// Accepts both `${{name}}` and `{{name}}`.
#[allow(non_snake_case)]
pub fn AxFParseNamedValue(s: &str) -> Option<String> {
    named_value_token()
        .captures(s.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Attribute text: expressions pass through, everything else is escaped.
#[allow(non_snake_case)]
pub fn AxFFormatAttributeText(s: &str) -> String {
    if AxFIsExpression(s) {
        s.to_string()
    } else {
        AxFEscapeXml(s)
    }
}

#[allow(non_snake_case)]
pub fn AxFFormatAttributeValue(value: &AxCAttributeValue, style: AxCNamedValueStyle) -> String {
    match value {
        AxCAttributeValue::NamedValue(reference) => AxFFormatNamedValue(&reference.name, style),
        AxCAttributeValue::Literal(s) => AxFFormatAttributeText(s),
    }
}

/// Renders a configuration value as unescaped attribute text.
///
/// `null` yields `None` so the attribute is omitted. Arrays are comma-joined;
/// `{ "name": .. }` objects are named-value references; other objects fall
/// back to compact JSON.
#[allow(non_snake_case)]
pub fn AxFScalarText(value: &Value, style: AxCNamedValueStyle) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(values) => Some(
            values
                .iter()
                .filter_map(|v| AxFScalarText(v, style))
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) if map.len() == 1 || (map.len() == 2 && map.contains_key("keyVault")) => {
                Some(AxFFormatNamedValue(name, style))
            }
            _ => Some(value.to_string()),
        },
    }
}

/// Renders a configuration value as escaped attribute text.
#[allow(non_snake_case)]
pub fn AxFFormatConfigValue(value: &Value, style: AxCNamedValueStyle) -> Option<String> {
    let text = AxFScalarText(value, style)?;
    if AxFParseNamedValue(&text).is_some() {
        return Some(text);
    }
    Some(AxFFormatAttributeText(&text))
}
