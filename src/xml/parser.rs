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

//! XML to policy model.
//!
//! Input may be hand-authored, so this is not a strict inverse of the
//! generator. Each child of a section is classified by [`AxFClassifyElement`]
//! and then turned into an item; anything with structure the model cannot
//! express is kept as `custom-xml`.
//!
//! A few known policies carry a parameter as element text (`<set-method>GET</set-method>`)
//! or as a text-only child (`<trace><message>..</message></trace>`). Those are
//! read back into the named parameter; other element text lands in `#text`.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::config::AxCCompilerConfig;
use crate::errors::{AxError, Result};
use crate::model::{
    AxCAttributeValue, AxCCatalogItem, AxCConfiguration, AxCExpressionContext, AxCNamedValueReference,
    AxCPolicyItem, AxCPolicyModel, AxCPolicySection, AxCSectionKind,
};
use crate::xml::escape::{AxFIsExpression, AxFParseNamedValue};
use crate::xml::generator::AX_TEXT_KEY;
use crate::xml::send_request::{AxCSendRequestConfiguration, AX_SEND_REQUEST};
use crate::xml::tree::{AxFParseDocument, AxCXmlElement, AxCXmlNode};

pub const AX_ROOT_ELEMENT: &str = "policies";

/// Policies whose element text is a named parameter rather than `#text`.
const TEXT_PARAMETERS: &[(&str, &str)] = &[
    ("set-body", "value"),
    ("set-method", "method"),
    ("log-to-eventhub", "message"),
];

/// Policies whose plain-text child elements are parameters of the same name.
const LEAF_PARAMETERS: &[(&str, &[&str])] = &[("trace", &["message"])];

fn text_parameter(policy_id: &str) -> Option<&'static str> {
    TEXT_PARAMETERS
        .iter()
        .find(|(id, _)| *id == policy_id)
        .map(|(_, param)| *param)
}

fn leaf_parameters(policy_id: &str) -> &'static [&'static str] {
    LEAF_PARAMETERS
        .iter()
        .find(|(id, _)| *id == policy_id)
        .map(|(_, leaves)| *leaves)
        .unwrap_or(&[])
}

fn is_leaf(child: &AxCXmlElement, leaves: &[&str]) -> bool {
    leaves.contains(&child.name.as_str())
        && child.attributes.is_empty()
        && child.children.iter().all(|n| matches!(n, AxCXmlNode::Text(_)))
}

/// How a section child is turned into a policy item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxCElementShape {
    /// `<base />`, the inheritance marker.
    Base,
    /// `<include-fragment fragment-id=".." />`.
    Fragment,
    /// `<send-request>` with a nested body.
    SendRequest,
    /// Attributes and plain text, plus the text-only children some policies use.
    Simple,
    /// Nested elements, comments or CDATA.
    Complex,
}

/// Classifies a section child by its shape alone.
#[allow(non_snake_case)]
pub fn AxFClassifyElement(el: &AxCXmlElement) -> AxCElementShape {
    match el.name.as_str() {
        "base" => AxCElementShape::Base,
        "include-fragment" | "include" => {
            let has_id = el
                .AxFAttribute("fragment-id")
                .map(|id| !id.trim().is_empty())
                .unwrap_or(false);
            if has_id && !el.AxFHasElementChildren() {
                AxCElementShape::Fragment
            } else {
                AxCElementShape::Complex
            }
        }
        AX_SEND_REQUEST => AxCElementShape::SendRequest,
        _ => {
            let leaves = leaf_parameters(&el.name);
            let mut seen = Vec::new();
            let structured = el.children.iter().any(|node| match node {
                AxCXmlNode::Element(child) if is_leaf(child, leaves) && !seen.contains(&child.name) => {
                    seen.push(child.name.clone());
                    false
                }
                AxCXmlNode::Text(_) => false,
                _ => true,
            });
            if structured {
                AxCElementShape::Complex
            } else {
                AxCElementShape::Simple
            }
        }
    }
}

/// Attribute text as a JSON value.
///
/// Numbers and booleans are converted only when printing them back gives the
/// same text, so `"007"` or `"1e3"` stay strings.
#[allow(non_snake_case)]
pub fn AxFCoerceScalar(text: &str, coerce: bool) -> Value {
    if coerce {
        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(n) = text.parse::<i64>() {
            if n.to_string() == text {
                return Value::from(n);
            }
        }
        if let Ok(f) = text.parse::<f64>() {
            if let Some(n) = Number::from_f64(f) {
                if n.to_string() == text {
                    return Value::Number(n);
                }
            }
        }
    }
    Value::String(text.to_string())
}

pub struct AxCXmlParser {
    config: AxCCompilerConfig,
}

impl Default for AxCXmlParser {
    fn default() -> Self {
        Self::AxFNew()
    }
}

impl AxCXmlParser {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self {
            config: AxCCompilerConfig::default(),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFWithConfig(mut self, config: AxCCompilerConfig) -> Self {
        self.config = config;
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFParse(&self, xml: &str) -> Result<AxCPolicyModel> {
        let root = AxFParseDocument(xml)?;
        if root.name != AX_ROOT_ELEMENT {
            return Err(AxError::parse(
                format!("expected <{}> root, found <{}>", AX_ROOT_ELEMENT, root.name),
                0,
            ));
        }

        let mut model = AxCPolicyModel::AxFNew(self.config.default_scope);
        for node in &root.children {
            match node {
                AxCXmlNode::Element(el) => match AxCSectionKind::AxFFromXmlName(&el.name) {
                    Some(kind) if model.sections.AxFGet(kind).is_some() => {
                        log::warn!("duplicate <{}> section ignored", el.name);
                    }
                    Some(kind) => {
                        let section = self.parse_section(kind, el);
                        model.sections.AxFSet(kind, Some(section));
                    }
                    None => log::warn!("unknown element <{}> under <policies> ignored", el.name),
                },
                AxCXmlNode::Text(t) if !t.trim().is_empty() => {
                    log::warn!("stray text under <policies> ignored");
                }
                _ => {}
            }
        }
        Ok(model)
    }

    fn parse_section(&self, kind: AxCSectionKind, el: &AxCXmlElement) -> AxCPolicySection {
        let mut section = AxCPolicySection::AxFNew().AxFWithBase(false);
        let mut order: i64 = 0;
        let next_id = |order: &mut i64| {
            let id = format!("{}-{}", kind.AxFJsonKey(), order);
            let current = *order;
            *order += 1;
            (id, current)
        };

        for node in &el.children {
            let item = match node {
                AxCXmlNode::Element(child) => match AxFClassifyElement(child) {
                    AxCElementShape::Base => {
                        section.include_base = Some(true);
                        continue;
                    }
                    shape => {
                        let (id, n) = next_id(&mut order);
                        self.element_item(id, n, child, shape)
                    }
                },
                AxCXmlNode::Comment(comment) => {
                    let (id, n) = next_id(&mut order);
                    AxCPolicyItem::AxFCustomXml(id, n, format!("<!--{}-->", comment))
                }
                AxCXmlNode::Text(t) | AxCXmlNode::CData(t) => {
                    let text = t.trim();
                    if text.is_empty() {
                        continue;
                    }
                    if AxFIsExpression(text) {
                        let (id, n) = next_id(&mut order);
                        AxCPolicyItem::AxFExpression(id, n, text, Some(AxCExpressionContext::Condition))
                    } else {
                        log::warn!("stray text in <{}> ignored", kind.AxFXmlName());
                        continue;
                    }
                }
            };
            section.items.push(item);
        }
        section
    }

    fn element_item(&self, id: String, order: i64, el: &AxCXmlElement, shape: AxCElementShape) -> AxCPolicyItem {
        match shape {
            AxCElementShape::Fragment => {
                let fragment_id = el.AxFAttribute("fragment-id").unwrap_or_default().trim();
                AxCPolicyItem::AxFFragment(id, order, fragment_id)
            }
            AxCElementShape::SendRequest => {
                match AxCSendRequestConfiguration::AxFFromElement(el, &self.config) {
                    Some(send) => AxCPolicyItem::Catalog(AxCCatalogItem {
                        id,
                        order,
                        policy_id: AX_SEND_REQUEST.to_string(),
                        configuration: send.AxFToConfiguration(),
                        attributes: BTreeMap::new(),
                    }),
                    None => self.custom_xml(id, order, el),
                }
            }
            AxCElementShape::Simple => self.simple_item(id, order, el),
            AxCElementShape::Complex | AxCElementShape::Base => self.custom_xml(id, order, el),
        }
    }

    fn simple_item(&self, id: String, order: i64, el: &AxCXmlElement) -> AxCPolicyItem {
        let mut configuration = AxCConfiguration::new();
        let mut attributes = BTreeMap::new();
        for (key, value) in &el.attributes {
            match AxFParseNamedValue(value) {
                Some(name) => {
                    attributes.insert(
                        key.clone(),
                        AxCAttributeValue::NamedValue(AxCNamedValueReference::AxFNew(name)),
                    );
                }
                None => {
                    configuration.insert(key.clone(), AxFCoerceScalar(value, self.config.coerce_scalars));
                }
            }
        }
        for child in el.AxFChildElements() {
            if let Some(text) = child.AxFTrimmedText() {
                configuration.insert(child.name.clone(), Value::String(text));
            }
        }
        if let Some(text) = el.AxFTrimmedText() {
            let key = text_parameter(&el.name)
                .filter(|param| !configuration.contains_key(*param))
                .unwrap_or(AX_TEXT_KEY);
            configuration.insert(key.to_string(), Value::String(text));
        }
        AxCPolicyItem::Catalog(AxCCatalogItem {
            id,
            order,
            policy_id: el.name.clone(),
            configuration,
            attributes,
        })
    }

    fn custom_xml(&self, id: String, order: i64, el: &AxCXmlElement) -> AxCPolicyItem {
        AxCPolicyItem::AxFCustomXml(id, order, el.AxFSerialize(self.config.indent_width))
    }
}

/// Parses a policy document with default settings.
#[allow(non_snake_case)]
pub fn AxFFromXml(xml: &str) -> Result<AxCPolicyModel> {
    AxCXmlParser::AxFNew().AxFParse(xml)
}

#[allow(non_snake_case)]
pub fn AxFFromXmlWith(xml: &str, config: &AxCCompilerConfig) -> Result<AxCPolicyModel> {
    AxCXmlParser::AxFNew().AxFWithConfig(config.clone()).AxFParse(xml)
}
