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

//! Policy model to XML.
//!
//! Generation is total: every well-typed model produces a document. Unknown
//! policy ids fall back to the generic attribute renderer instead of failing.

use crate::catalog::{AxCPolicyCatalog, AxFCatalog};
use crate::config::AxCCompilerConfig;
use crate::model::{
    AxCCatalogItem, AxCExpressionContext, AxCExpressionItem, AxCPolicyItem, AxCPolicyModel,
    AxCPolicySection, AxCSectionKind,
};
use crate::xml::escape::{
    AxFEscapeText, AxFEscapeXml, AxFFormatAttributeValue, AxFFormatConfigValue, AxFIsExpression,
    AX_EXPRESSION_PREFIX,
};
use crate::xml::send_request::{AxCSendRequestConfiguration, AX_SEND_REQUEST};

/// Configuration key rendered as element text by the generic renderer.
pub const AX_TEXT_KEY: &str = "#text";

/// Renders policy models using a catalog and compiler settings.
pub struct AxCXmlGenerator<'a> {
    catalog: &'a AxCPolicyCatalog,
    config: AxCCompilerConfig,
}

impl Default for AxCXmlGenerator<'static> {
    fn default() -> Self {
        Self::AxFNew()
    }
}

impl AxCXmlGenerator<'static> {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self {
            catalog: AxFCatalog(),
            config: AxCCompilerConfig::default(),
        }
    }
}

impl<'a> AxCXmlGenerator<'a> {
    #[allow(non_snake_case)]
    pub fn AxFWithCatalog(catalog: &'a AxCPolicyCatalog, config: AxCCompilerConfig) -> Self {
        Self { catalog, config }
    }

    #[allow(non_snake_case)]
    pub fn AxFWithConfig(mut self, config: AxCCompilerConfig) -> Self {
        self.config = config;
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFGenerate(&self, model: &AxCPolicyModel) -> String {
        let mut lines = vec!["<policies>".to_string()];
        for kind in AxCSectionKind::ALL {
            self.render_section(kind, model.sections.AxFGet(kind), &mut lines);
        }
        lines.push("</policies>".to_string());
        lines.join("\n")
    }

    fn render_section(&self, kind: AxCSectionKind, section: Option<&AxCPolicySection>, lines: &mut Vec<String>) {
        let name = kind.AxFXmlName();
        let pad = self.config.AxFIndent(1);
        let inner = self.config.AxFIndent(2);

        let section = match section {
            Some(section) => section,
            None if kind == AxCSectionKind::Backend => {
                lines.push(format!("{}<{}>", pad, name));
                lines.push(format!("{}<forward-request />", inner));
                lines.push(format!("{}</{}>", pad, name));
                return;
            }
            None => {
                lines.push(format!("{}<{} />", pad, name));
                return;
            }
        };

        let mut body = Vec::new();
        if section.AxFIncludesBase() {
            body.push("<base />".to_string());
        }
        for item in section.AxFSortedItems() {
            body.extend(self.AxFRenderItem(item).lines().map(str::to_string));
        }

        if body.is_empty() {
            lines.push(format!("{}<{} />", pad, name));
            return;
        }
        lines.push(format!("{}<{}>", pad, name));
        for line in body {
            if line.is_empty() {
                lines.push(line);
            } else {
                lines.push(format!("{}{}", inner, line));
            }
        }
        lines.push(format!("{}</{}>", pad, name));
    }

    /// Renders one item as an unindented fragment.
    #[allow(non_snake_case)]
    pub fn AxFRenderItem(&self, item: &AxCPolicyItem) -> String {
        match item {
            AxCPolicyItem::Catalog(item) => self.render_catalog(item),
            AxCPolicyItem::Fragment(item) => format!(
                "<include-fragment fragment-id=\"{}\" />",
                AxFEscapeXml(&item.fragment_id)
            ),
            AxCPolicyItem::CustomXml(item) => AxFReindent(&item.xml).join("\n"),
            AxCPolicyItem::Expression(item) => render_expression(item),
        }
    }

    fn render_catalog(&self, item: &AxCCatalogItem) -> String {
        if item.policy_id == AX_SEND_REQUEST {
            return AxCSendRequestConfiguration::AxFFromConfiguration(&item.configuration)
                .AxFToElement(&self.config)
                .AxFSerialize(self.config.indent_width);
        }
        match self.catalog.AxFGetPolicyById(&item.policy_id) {
            Some(entry) => match entry.xml_template {
                Some(template) if item.attributes.is_empty() => {
                    match (entry.text_parameter, item.configuration.get(AX_TEXT_KEY)) {
                        (Some(param), Some(text)) if !item.configuration.contains_key(param) => {
                            let mut configuration = item.configuration.clone();
                            configuration.remove(AX_TEXT_KEY);
                            configuration.insert(param.to_string(), text.clone());
                            template(&configuration, &self.config)
                        }
                        (_, Some(_)) => self.render_generic(item),
                        _ => template(&item.configuration, &self.config),
                    }
                }
                _ => self.render_generic(item),
            },
            None => {
                log::debug!(
                    "policy '{}' is not in the catalog, using the generic renderer",
                    item.policy_id
                );
                self.render_generic(item)
            }
        }
    }

    /// `<policyId key="value" ...>` from configuration then attributes.
    fn render_generic(&self, item: &AxCCatalogItem) -> String {
        let style = self.config.named_value_style;
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut text = None;

        for (key, value) in &item.configuration {
            if key == AX_TEXT_KEY {
                text = crate::xml::escape::AxFScalarText(value, style);
                continue;
            }
            if item.attributes.contains_key(key) {
                continue;
            }
            if let Some(rendered) = AxFFormatConfigValue(value, style) {
                attrs.push((key.clone(), rendered));
            }
        }
        for (key, value) in &item.attributes {
            attrs.push((key.clone(), AxFFormatAttributeValue(value, style)));
        }

        let mut open = format!("<{}", item.policy_id);
        for (key, value) in &attrs {
            open.push_str(&format!(" {}=\"{}\"", key, value));
        }
        match text.filter(|t| !t.is_empty()) {
            Some(t) => {
                let content = if AxFIsExpression(&t) { t } else { AxFEscapeText(&t) };
                format!("{}>{}</{}>", open, content, item.policy_id)
            }
            None => format!("{} />", open),
        }
    }
}

fn wrap_expression(expression: &str) -> String {
    let trimmed = expression.trim();
    if trimmed.starts_with(AX_EXPRESSION_PREFIX) {
        trimmed.to_string()
    } else {
        format!("@({})", trimmed)
    }
}

fn render_expression(item: &AxCExpressionItem) -> String {
    let expression = wrap_expression(&item.expression);
    match (item.context, &item.target_element, &item.target_attribute) {
        (Some(AxCExpressionContext::Attribute), Some(element), Some(attribute)) => {
            format!("<{} {}=\"{}\" />", element, attribute, expression)
        }
        (Some(AxCExpressionContext::Value), Some(element), _) => {
            format!("<{}>{}</{}>", element, expression, element)
        }
        (Some(AxCExpressionContext::Condition), _, _) => expression,
        _ => {
            // Unmodeled contexts and incomplete targets render like a condition.
            log::debug!("expression item '{}' rendered as a bare expression", item.id);
            expression
        }
    }
}

/// Splits a raw XML fragment into lines with the common indentation removed.
///
/// Leading and trailing blank lines are dropped; trailing whitespace is trimmed.
#[allow(non_snake_case)]
pub fn AxFReindent(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return Vec::new(),
    };
    let body = &lines[start..=end];
    let common = body
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|l| if l.is_empty() { String::new() } else { l[common..].to_string() })
        .collect()
}

/// Renders a model with the built-in catalog and default settings.
#[allow(non_snake_case)]
pub fn AxFToXml(model: &AxCPolicyModel) -> String {
    AxCXmlGenerator::AxFNew().AxFGenerate(model)
}

#[allow(non_snake_case)]
pub fn AxFToXmlWith(model: &AxCPolicyModel, config: &AxCCompilerConfig) -> String {
    AxCXmlGenerator::AxFNew()
        .AxFWithConfig(config.clone())
        .AxFGenerate(model)
}
