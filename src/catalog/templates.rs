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

//! XML templates for policies whose body is nested elements rather than flat
//! attributes. Each template receives the item's configuration and returns an
//! unindented fragment; the generator indents it into place.

use serde_json::Value;

use crate::config::{AxCCompilerConfig, AxCNamedValueStyle};
use crate::model::AxCConfiguration;
use crate::xml::escape::AxFScalarText;
use crate::xml::generator::AxFReindent;
use crate::xml::tree::{AxCXmlElement, AxCXmlNode};

fn text(config: &AxCConfiguration, key: &str, style: AxCNamedValueStyle) -> Option<String> {
    config
        .get(key)
        .and_then(|v| AxFScalarText(v, style))
        .filter(|s| !s.is_empty())
}

fn list(config: &AxCConfiguration, key: &str, style: AxCNamedValueStyle) -> Vec<String> {
    match config.get(key) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| AxFScalarText(v, style))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Some(other) => AxFScalarText(other, style).into_iter().collect(),
        None => Vec::new(),
    }
}

fn objects<'c>(config: &'c AxCConfiguration, key: &str) -> Vec<&'c serde_json::Map<String, Value>> {
    match config.get(key) {
        Some(Value::Array(values)) => values.iter().filter_map(|v| v.as_object()).collect(),
        Some(Value::Object(map)) => vec![map],
        _ => Vec::new(),
    }
}

fn element(
    name: &str,
    config: &AxCConfiguration,
    keys: &[&str],
    style: AxCNamedValueStyle,
) -> AxCXmlElement {
    let mut el = AxCXmlElement::AxFNew(name);
    for key in keys {
        if let Some(value) = text(config, key, style) {
            el.attributes.push((key.to_string(), value));
        }
    }
    el
}

fn leaf(name: &str, content: impl Into<String>) -> AxCXmlNode {
    let mut el = AxCXmlElement::AxFNew(name);
    el.children.push(AxCXmlNode::Text(content.into()));
    AxCXmlNode::Element(el)
}

pub(crate) fn check_header(config: &AxCConfiguration, cfg: &AxCCompilerConfig) -> String {
    let style = cfg.named_value_style;
    let mut el = element(
        "check-header",
        config,
        &["name", "failed-check-httpcode", "failed-check-error-message", "ignore-case"],
        style,
    );
    for value in list(config, "values", style) {
        el.children.push(leaf("value", value));
    }
    el.AxFSerialize(cfg.indent_width)
}

pub(crate) fn set_body(config: &AxCConfiguration, cfg: &AxCCompilerConfig) -> String {
    let style = cfg.named_value_style;
    let mut el = element("set-body", config, &["template", "xsi-nil"], style);
    if let Some(body) = text(config, "value", style).or_else(|| text(config, "body", style)) {
        el.children.push(AxCXmlNode::Text(body));
    }
    el.AxFSerialize(cfg.indent_width)
}

pub(crate) fn set_method(config: &AxCConfiguration, cfg: &AxCCompilerConfig) -> String {
    let style = cfg.named_value_style;
    let mut el = AxCXmlElement::AxFNew("set-method");
    if let Some(method) = text(config, "method", style) {
        el.children.push(AxCXmlNode::Text(method));
    }
    el.AxFSerialize(cfg.indent_width)
}

pub(crate) fn trace(config: &AxCConfiguration, cfg: &AxCCompilerConfig) -> String {
    let style = cfg.named_value_style;
    let mut el = element("trace", config, &["source", "severity"], style);
    if let Some(message) = text(config, "message", style) {
        el.children.push(leaf("message", message));
    }
    el.AxFSerialize(cfg.indent_width)
}

pub(crate) fn log_to_eventhub(config: &AxCConfiguration, cfg: &AxCCompilerConfig) -> String {
    let style = cfg.named_value_style;
    let mut el = element(
        "log-to-eventhub",
        config,
        &["logger-id", "partition-id", "partition-key"],
        style,
    );
    if let Some(message) = text(config, "message", style) {
        el.children.push(AxCXmlNode::Text(message));
    }
    el.AxFSerialize(cfg.indent_width)
}

pub(crate) fn choose(config: &AxCConfiguration, cfg: &AxCCompilerConfig) -> String {
    let style = cfg.named_value_style;
    let pad = cfg.AxFIndent(1);
    let mut lines = vec!["<choose>".to_string()];
    for branch in objects(config, "when") {
        let condition = text(branch, "condition", style).unwrap_or_default();
        let body = branch
            .get("policies")
            .and_then(|v| v.as_str())
            .map(AxFReindent)
            .unwrap_or_default();
        let open = format!(
            "{}<when condition=\"{}\"",
            pad,
            crate::xml::escape::AxFFormatAttributeText(&condition)
        );
        if body.is_empty() {
            lines.push(format!("{} />", open));
        } else {
            lines.push(format!("{}>", open));
            lines.extend(body.into_iter().map(|l| format!("{}{}{}", pad, pad, l)));
            lines.push(format!("{}</when>", pad));
        }
    }
    if let Some(otherwise) = config.get("otherwise").and_then(|v| v.as_str()) {
        let body = AxFReindent(otherwise);
        if body.is_empty() {
            lines.push(format!("{}<otherwise />", pad));
        } else {
            lines.push(format!("{}<otherwise>", pad));
            lines.extend(body.into_iter().map(|l| format!("{}{}{}", pad, pad, l)));
            lines.push(format!("{}</otherwise>", pad));
        }
    }
    lines.push("</choose>".to_string());
    lines.join("\n")
}
