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

//! `send-request` configuration and its nested-element XML body.
//!
//! Configuration keys are camelCase (`url`, `setUrl`, `method`, `headers`,
//! `body`, `timeout`, `ignoreErrors`, `responseVariableName`, `mode`) and map
//! to the gateway body like this:
//!
//! | configuration                 | XML                                        |
//! |-------------------------------|--------------------------------------------|
//! | `url`, no `setUrl`            | `<set-backend-service base-url="url" />`   |
//! | `url`, `setUrl: true`         | `<set-url>url</set-url>`                   |
//! | `url`, `setUrl: "target"`     | `<set-url>target</set-url>` + base-url     |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AxCCompilerConfig;
use crate::model::AxCConfiguration;
use crate::xml::escape::{AxFParseNamedValue, AxFScalarText};
use crate::xml::parser::AxFCoerceScalar;
use crate::xml::tree::{AxCXmlElement, AxCXmlNode};

pub const AX_SEND_REQUEST: &str = "send-request";

/// `setUrl` is either a switch routing `url` into `<set-url>` or the request URL itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxCSetUrl {
    Flag(bool),
    Target(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCSendRequestHeader {
    pub name: String,
    /// Literal text or a `{ "name": .. }` named-value reference.
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists_action: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCSendRequestConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_url: Option<AxCSetUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<AxCSendRequestHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_variable_name: Option<String>,
}

fn string_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn bool_of(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn header_from_object(map: &Map<String, Value>) -> Option<AxCSendRequestHeader> {
    let name = string_of(map.get("name"))?;
    let exists_action = string_of(map.get("existsAction").or_else(|| map.get("exists-action")));
    Some(AxCSendRequestHeader {
        name,
        value: map.get("value").cloned().unwrap_or(Value::Null),
        exists_action,
    })
}

fn named_or_literal(text: &str) -> Value {
    match AxFParseNamedValue(text) {
        Some(name) => serde_json::json!({ "name": name }),
        None => Value::String(text.to_string()),
    }
}

impl AxCSendRequestConfiguration {
    /// Reads a catalog item configuration. Unrecognized keys and ill-typed values are ignored.
    #[allow(non_snake_case)]
    pub fn AxFFromConfiguration(config: &AxCConfiguration) -> Self {
        let set_url = match config.get("setUrl") {
            Some(Value::Bool(flag)) => Some(AxCSetUrl::Flag(*flag)),
            Some(Value::String(s)) if s == "true" || s == "false" => Some(AxCSetUrl::Flag(s == "true")),
            Some(Value::String(s)) => Some(AxCSetUrl::Target(s.clone())),
            _ => None,
        };
        let headers = match config.get("headers") {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_object())
                .filter_map(header_from_object)
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, value)| AxCSendRequestHeader {
                    name: name.clone(),
                    value: value.clone(),
                    exists_action: None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            mode: string_of(config.get("mode")),
            url: string_of(config.get("url")),
            set_url,
            method: string_of(config.get("method")),
            headers,
            body: string_of(config.get("body")),
            timeout: config.get("timeout").filter(|v| !v.is_null()).cloned(),
            ignore_errors: bool_of(config.get("ignoreErrors")),
            response_variable_name: string_of(config.get("responseVariableName")),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFToConfiguration(&self) -> AxCConfiguration {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// `(set-url text, set-backend-service base-url)`.
    #[allow(non_snake_case)]
    pub fn AxFTargets(&self) -> (Option<String>, Option<String>) {
        match &self.set_url {
            Some(AxCSetUrl::Flag(true)) => (self.url.clone(), None),
            Some(AxCSetUrl::Target(target)) => (Some(target.clone()), self.url.clone()),
            Some(AxCSetUrl::Flag(false)) | None => (None, self.url.clone()),
        }
    }

    /// Builds the `<send-request>` element.
    #[allow(non_snake_case)]
    pub fn AxFToElement(&self, config: &AxCCompilerConfig) -> AxCXmlElement {
        let style = config.named_value_style;
        let mut el = AxCXmlElement::AxFNew(AX_SEND_REQUEST);
        el.attributes.push((
            "mode".into(),
            self.mode.clone().unwrap_or_else(|| "new".to_string()),
        ));
        if let Some(name) = &self.response_variable_name {
            el.attributes.push(("response-variable-name".into(), name.clone()));
        }
        if let Some(timeout) = self.timeout.as_ref().and_then(|t| AxFScalarText(t, style)) {
            el.attributes.push(("timeout".into(), timeout));
        }
        if let Some(ignore) = self.ignore_errors {
            el.attributes.push(("ignore-error".into(), ignore.to_string()));
        }

        let (set_url, base_url) = self.AxFTargets();
        if let Some(url) = set_url {
            el.children.push(text_element("set-url", url));
        }
        if let Some(method) = &self.method {
            el.children.push(text_element("set-method", method.clone()));
        }
        if !self.headers.is_empty() {
            let mut headers = AxCXmlElement::AxFNew("set-headers");
            for header in &self.headers {
                let mut h = AxCXmlElement::AxFNew("header");
                h.attributes.push(("name".into(), header.name.clone()));
                if let Some(value) = AxFScalarText(&header.value, style) {
                    h.attributes.push(("value".into(), value));
                }
                if let Some(action) = &header.exists_action {
                    h.attributes.push(("exists-action".into(), action.clone()));
                }
                headers.children.push(AxCXmlNode::Element(h));
            }
            el.children.push(AxCXmlNode::Element(headers));
        }
        if let Some(body) = &self.body {
            el.children.push(text_element("set-body", body.clone()));
        }
        if let Some(base) = base_url {
            let mut backend = AxCXmlElement::AxFNew("set-backend-service");
            backend.attributes.push(("base-url".into(), base));
            el.children.push(AxCXmlNode::Element(backend));
        }
        el
    }

    /// Reads a parsed `<send-request>` element.
    ///
    /// Returns `None` when the element has an attribute or child this
    /// configuration cannot represent; the caller keeps it as raw XML.
    #[allow(non_snake_case)]
    pub fn AxFFromElement(el: &AxCXmlElement, config: &AxCCompilerConfig) -> Option<Self> {
        let mut out = Self::default();
        for (key, value) in &el.attributes {
            match key.as_str() {
                "mode" => out.mode = Some(value.clone()),
                "response-variable-name" => out.response_variable_name = Some(value.clone()),
                "timeout" => out.timeout = Some(AxFCoerceScalar(value, config.coerce_scalars)),
                "ignore-error" => match value.as_str() {
                    "true" => out.ignore_errors = Some(true),
                    "false" => out.ignore_errors = Some(false),
                    _ => return None,
                },
                _ => return None,
            }
        }

        let mut set_url = None;
        let mut base_url = None;
        for node in &el.children {
            let child = match node {
                AxCXmlNode::Element(child) => child,
                AxCXmlNode::Text(t) if t.trim().is_empty() => continue,
                _ => return None,
            };
            match child.name.as_str() {
                "set-url" => set_url = Some(child.AxFTrimmedText().unwrap_or_default()),
                "set-method" => out.method = child.AxFTrimmedText(),
                "set-body" => out.body = child.AxFTrimmedText(),
                "set-backend-service" => base_url = Some(child.AxFAttribute("base-url")?.to_string()),
                "set-headers" => {
                    for header in child.AxFChildElements() {
                        if header.name != "header" {
                            return None;
                        }
                        out.headers.push(AxCSendRequestHeader {
                            name: header.AxFAttribute("name")?.to_string(),
                            value: header
                                .AxFAttribute("value")
                                .map(named_or_literal)
                                .unwrap_or(Value::Null),
                            exists_action: header.AxFAttribute("exists-action").map(str::to_string),
                        });
                    }
                }
                // The gateway's own form: <set-header name=".." exists-action=".."><value>..</value></set-header>
                "set-header" => {
                    let values: Vec<String> = child
                        .AxFChildElements()
                        .filter(|v| v.name == "value")
                        .map(|v| v.AxFText().trim().to_string())
                        .collect();
                    out.headers.push(AxCSendRequestHeader {
                        name: child.AxFAttribute("name")?.to_string(),
                        value: match values.len() {
                            0 => Value::Null,
                            _ => named_or_literal(&values.join(",")),
                        },
                        exists_action: child.AxFAttribute("exists-action").map(str::to_string),
                    });
                }
                _ => return None,
            }
        }

        match (set_url, base_url) {
            (Some(target), Some(base)) => {
                out.set_url = Some(AxCSetUrl::Target(target));
                out.url = Some(base);
            }
            (Some(target), None) => {
                out.set_url = Some(AxCSetUrl::Flag(true));
                out.url = Some(target);
            }
            (None, base) => out.url = base,
        }
        Some(out)
    }
}

fn text_element(name: &str, text: String) -> AxCXmlNode {
    let mut el = AxCXmlElement::AxFNew(name);
    el.children.push(AxCXmlNode::Text(text));
    AxCXmlNode::Element(el)
}
