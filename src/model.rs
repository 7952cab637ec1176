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

//! # Ax Policy Model Module
//!
//! The in-memory representation of a gateway policy document. The model is a
//! plain nested record that serializes to the JSON shape shared with UI and
//! storage layers:
//!
//! ```json
//! {
//!   "scope": "api",
//!   "apiId": "orders",
//!   "sections": {
//!     "inbound": {
//!       "includeBase": true,
//!       "items": [
//!         {"type": "catalog", "id": "rl", "order": 0, "policyId": "rate-limit",
//!          "configuration": {"calls": 100, "renewal-period": 60}}
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! ## Invariants
//!
//! - `apiId` is present when the scope is `api` or `operation`; `operationId`
//!   only when the scope is `operation`. The validator reports violations.
//! - Items inside a section are emitted by ascending `order`, ties keeping
//!   their insertion position. Orders need not be contiguous or unique.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AxError, Result};
use crate::xml::escape::AxFParseNamedValue;

/// Level at which a policy document applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxCPolicyScope {
    #[default]
    Global,
    Product,
    Api,
    Operation,
}

impl AxCPolicyScope {
    pub const ALL: [AxCPolicyScope; 4] = [
        AxCPolicyScope::Global,
        AxCPolicyScope::Product,
        AxCPolicyScope::Api,
        AxCPolicyScope::Operation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AxCPolicyScope::Global => "global",
            AxCPolicyScope::Product => "product",
            AxCPolicyScope::Api => "api",
            AxCPolicyScope::Operation => "operation",
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFRequiresApiId(&self) -> bool {
        matches!(self, AxCPolicyScope::Api | AxCPolicyScope::Operation)
    }

    #[allow(non_snake_case)]
    pub fn AxFAllowsOperationId(&self) -> bool {
        matches!(self, AxCPolicyScope::Operation)
    }
}

impl fmt::Display for AxCPolicyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four pipeline phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxCSectionKind {
    #[serde(rename = "inbound")]
    Inbound,
    #[serde(rename = "backend")]
    Backend,
    #[serde(rename = "outbound")]
    Outbound,
    #[serde(rename = "onError")]
    OnError,
}

impl AxCSectionKind {
    /// Document order.
    pub const ALL: [AxCSectionKind; 4] = [
        AxCSectionKind::Inbound,
        AxCSectionKind::Backend,
        AxCSectionKind::Outbound,
        AxCSectionKind::OnError,
    ];

    /// Key used in the JSON model.
    #[allow(non_snake_case)]
    pub fn AxFJsonKey(&self) -> &'static str {
        match self {
            AxCSectionKind::Inbound => "inbound",
            AxCSectionKind::Backend => "backend",
            AxCSectionKind::Outbound => "outbound",
            AxCSectionKind::OnError => "onError",
        }
    }

    /// Element name used in the XML document.
    #[allow(non_snake_case)]
    pub fn AxFXmlName(&self) -> &'static str {
        match self {
            AxCSectionKind::Inbound => "inbound",
            AxCSectionKind::Backend => "backend",
            AxCSectionKind::Outbound => "outbound",
            AxCSectionKind::OnError => "on-error",
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFFromXmlName(name: &str) -> Option<Self> {
        AxCSectionKind::ALL
            .into_iter()
            .find(|kind| kind.AxFXmlName() == name)
    }
}

impl fmt::Display for AxCSectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.AxFXmlName())
    }
}

/// Key Vault backing for a named value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCKeyVaultSecret {
    pub secret_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_client_id: Option<String>,
}

/// Indirection to a gateway-managed secret or configuration value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCNamedValueReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault: Option<AxCKeyVaultSecret>,
}

impl AxCNamedValueReference {
    #[allow(non_snake_case)]
    pub fn AxFNew(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_vault: None,
        }
    }
}

/// Value of an item attribute: either literal text or a named value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxCAttributeValue {
    Literal(String),
    NamedValue(AxCNamedValueReference),
}

impl From<&str> for AxCAttributeValue {
    fn from(s: &str) -> Self {
        AxCAttributeValue::Literal(s.to_string())
    }
}

impl From<String> for AxCAttributeValue {
    fn from(s: String) -> Self {
        AxCAttributeValue::Literal(s)
    }
}

impl From<AxCNamedValueReference> for AxCAttributeValue {
    fn from(r: AxCNamedValueReference) -> Self {
        AxCAttributeValue::NamedValue(r)
    }
}

/// Policy-specific key/value parameters, kept in authoring order.
pub type AxCConfiguration = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCCatalogItem {
    pub id: String,
    pub order: i64,
    pub policy_id: String,
    #[serde(default)]
    pub configuration: AxCConfiguration,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AxCAttributeValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCFragmentItem {
    pub id: String,
    pub order: i64,
    pub fragment_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCCustomXmlItem {
    pub id: String,
    pub order: i64,
    pub xml: String,
}

/// Where an inline expression is placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxCExpressionContext {
    Attribute,
    Value,
    Condition,
    /// Any context string this crate does not model. Rendered like `condition`.
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCExpressionItem {
    pub id: String,
    pub order: i64,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AxCExpressionContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_attribute: Option<String>,
}

/// A single entry of a section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AxCPolicyItem {
    Catalog(AxCCatalogItem),
    Fragment(AxCFragmentItem),
    CustomXml(AxCCustomXmlItem),
    Expression(AxCExpressionItem),
}

impl AxCPolicyItem {
    /// Catalog item; a non-object `configuration` becomes an empty map.
    #[allow(non_snake_case)]
    pub fn AxFCatalog(
        id: impl Into<String>,
        order: i64,
        policy_id: impl Into<String>,
        configuration: Value,
    ) -> Self {
        let configuration = match configuration {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        AxCPolicyItem::Catalog(AxCCatalogItem {
            id: id.into(),
            order,
            policy_id: policy_id.into(),
            configuration,
            attributes: BTreeMap::new(),
        })
    }

    #[allow(non_snake_case)]
    pub fn AxFFragment(id: impl Into<String>, order: i64, fragment_id: impl Into<String>) -> Self {
        AxCPolicyItem::Fragment(AxCFragmentItem {
            id: id.into(),
            order,
            fragment_id: fragment_id.into(),
        })
    }

    #[allow(non_snake_case)]
    pub fn AxFCustomXml(id: impl Into<String>, order: i64, xml: impl Into<String>) -> Self {
        AxCPolicyItem::CustomXml(AxCCustomXmlItem {
            id: id.into(),
            order,
            xml: xml.into(),
        })
    }

    #[allow(non_snake_case)]
    pub fn AxFExpression(
        id: impl Into<String>,
        order: i64,
        expression: impl Into<String>,
        context: Option<AxCExpressionContext>,
    ) -> Self {
        AxCPolicyItem::Expression(AxCExpressionItem {
            id: id.into(),
            order,
            expression: expression.into(),
            context,
            target_element: None,
            target_attribute: None,
        })
    }

    /// Adds an attribute to a catalog item. Other item kinds are returned unchanged.
    #[allow(non_snake_case)]
    pub fn AxFWithAttribute(mut self, key: impl Into<String>, value: impl Into<AxCAttributeValue>) -> Self {
        if let AxCPolicyItem::Catalog(item) = &mut self {
            item.attributes.insert(key.into(), value.into());
        }
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFId(&self) -> &str {
        match self {
            AxCPolicyItem::Catalog(i) => &i.id,
            AxCPolicyItem::Fragment(i) => &i.id,
            AxCPolicyItem::CustomXml(i) => &i.id,
            AxCPolicyItem::Expression(i) => &i.id,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFOrder(&self) -> i64 {
        match self {
            AxCPolicyItem::Catalog(i) => i.order,
            AxCPolicyItem::Fragment(i) => i.order,
            AxCPolicyItem::CustomXml(i) => i.order,
            AxCPolicyItem::Expression(i) => i.order,
        }
    }

    /// The `type` discriminator used in JSON.
    #[allow(non_snake_case)]
    pub fn AxFKindName(&self) -> &'static str {
        match self {
            AxCPolicyItem::Catalog(_) => "catalog",
            AxCPolicyItem::Fragment(_) => "fragment",
            AxCPolicyItem::CustomXml(_) => "custom-xml",
            AxCPolicyItem::Expression(_) => "expression",
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFAsCatalog(&self) -> Option<&AxCCatalogItem> {
        match self {
            AxCPolicyItem::Catalog(item) => Some(item),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicySection {
    /// `None` behaves like `Some(true)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_base: Option<bool>,
    #[serde(default)]
    pub items: Vec<AxCPolicyItem>,
}

impl AxCPolicySection {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn AxFWithBase(mut self, include_base: bool) -> Self {
        self.include_base = Some(include_base);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithItem(mut self, item: AxCPolicyItem) -> Self {
        self.items.push(item);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFIncludesBase(&self) -> bool {
        self.include_base != Some(false)
    }

    /// Items by ascending order; equal orders keep insertion position.
    #[allow(non_snake_case)]
    pub fn AxFSortedItems(&self) -> Vec<&AxCPolicyItem> {
        let mut items: Vec<&AxCPolicyItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.AxFOrder());
        items
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicySections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<AxCPolicySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<AxCPolicySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<AxCPolicySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<AxCPolicySection>,
}

impl AxCPolicySections {
    #[allow(non_snake_case)]
    pub fn AxFGet(&self, kind: AxCSectionKind) -> Option<&AxCPolicySection> {
        match kind {
            AxCSectionKind::Inbound => self.inbound.as_ref(),
            AxCSectionKind::Backend => self.backend.as_ref(),
            AxCSectionKind::Outbound => self.outbound.as_ref(),
            AxCSectionKind::OnError => self.on_error.as_ref(),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFGetMut(&mut self, kind: AxCSectionKind) -> Option<&mut AxCPolicySection> {
        match kind {
            AxCSectionKind::Inbound => self.inbound.as_mut(),
            AxCSectionKind::Backend => self.backend.as_mut(),
            AxCSectionKind::Outbound => self.outbound.as_mut(),
            AxCSectionKind::OnError => self.on_error.as_mut(),
        }
    }

    fn slot(&mut self, kind: AxCSectionKind) -> &mut Option<AxCPolicySection> {
        match kind {
            AxCSectionKind::Inbound => &mut self.inbound,
            AxCSectionKind::Backend => &mut self.backend,
            AxCSectionKind::Outbound => &mut self.outbound,
            AxCSectionKind::OnError => &mut self.on_error,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFSet(&mut self, kind: AxCSectionKind, section: Option<AxCPolicySection>) {
        *self.slot(kind) = section;
    }

    /// Replaces every section present in `patch`, leaving the others untouched.
    /// A merge never removes a section.
    #[allow(non_snake_case)]
    pub fn AxFMerge(&mut self, patch: AxCPolicySections) {
        let AxCPolicySections {
            inbound,
            backend,
            outbound,
            on_error,
        } = patch;
        for (kind, section) in [
            (AxCSectionKind::Inbound, inbound),
            (AxCSectionKind::Backend, backend),
            (AxCSectionKind::Outbound, outbound),
            (AxCSectionKind::OnError, on_error),
        ] {
            if section.is_some() {
                *self.slot(kind) = section;
            }
        }
    }

    /// Present sections in document order.
    #[allow(non_snake_case)]
    pub fn AxFIter(&self) -> impl Iterator<Item = (AxCSectionKind, &AxCPolicySection)> {
        AxCSectionKind::ALL
            .into_iter()
            .filter_map(move |kind| self.AxFGet(kind).map(|section| (kind, section)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Root value of a policy configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicyModel {
    pub scope: AxCPolicyScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub sections: AxCPolicySections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AxCPolicyMetadata>,
}

impl AxCPolicyModel {
    #[allow(non_snake_case)]
    pub fn AxFNew(scope: AxCPolicyScope) -> Self {
        Self {
            scope,
            api_id: None,
            operation_id: None,
            sections: AxCPolicySections::default(),
            metadata: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFWithApi(mut self, api_id: impl Into<String>) -> Self {
        self.api_id = Some(api_id.into());
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithOperation(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithSection(mut self, kind: AxCSectionKind, section: AxCPolicySection) -> Self {
        self.sections.AxFSet(kind, Some(section));
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithMetadata(mut self, metadata: AxCPolicyMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Every item of every present section, in document order.
    #[allow(non_snake_case)]
    pub fn AxFItems(&self) -> impl Iterator<Item = (AxCSectionKind, &AxCPolicyItem)> {
        self.sections
            .AxFIter()
            .flat_map(|(kind, section)| section.items.iter().map(move |item| (kind, item)))
    }

    #[allow(non_snake_case)]
    pub fn AxFItemCount(&self) -> usize {
        self.sections.AxFIter().map(|(_, s)| s.items.len()).sum()
    }

    /// Names of all named values the model depends on, deduplicated.
    ///
    /// Covers attribute references as well as `${{name}}` / `{{name}}` tokens
    /// embedded anywhere in catalog configuration.
    #[allow(non_snake_case)]
    pub fn AxFNamedValueReferences(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for (_, item) in self.AxFItems() {
            if let AxCPolicyItem::Catalog(catalog) = item {
                for value in catalog.attributes.values() {
                    if let AxCAttributeValue::NamedValue(r) = value {
                        names.insert(r.name.clone());
                    }
                }
                for value in catalog.configuration.values() {
                    collect_named_values(value, &mut names);
                }
            }
        }
        names
    }

    /// Fragment ids referenced by fragment items, deduplicated.
    #[allow(non_snake_case)]
    pub fn AxFFragmentIds(&self) -> BTreeSet<String> {
        self.AxFItems()
            .filter_map(|(_, item)| match item {
                AxCPolicyItem::Fragment(f) => Some(f.fragment_id.clone()),
                _ => None,
            })
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn AxFToJson(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AxError::internal(format!("Failed to serialize policy model: {}", e)))
    }

    #[allow(non_snake_case)]
    pub fn AxFFromJson(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AxError::validation(format!("Invalid policy model JSON: {}", e)))
    }

    #[allow(non_snake_case)]
    pub fn AxFToYaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AxError::internal(format!("Failed to serialize policy model: {}", e)))
    }

    #[allow(non_snake_case)]
    pub fn AxFFromYaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AxError::validation(format!("Invalid policy model YAML: {}", e)))
    }
}

fn collect_named_values(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => {
            if let Some(name) = AxFParseNamedValue(s) {
                names.insert(name);
            }
        }
        Value::Array(values) => values.iter().for_each(|v| collect_named_values(v, names)),
        Value::Object(map) => {
            // `{ "name": ... }` objects inside configuration are named-value references
            // (send-request header values use this shape).
            if let Some(Value::String(name)) = map.get("name") {
                if map.len() == 1 || (map.len() == 2 && map.contains_key("keyVault")) {
                    names.insert(name.clone());
                }
            }
            map.values().for_each(|v| collect_named_values(v, names));
        }
        _ => {}
    }
}
