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

//! # Ax Validator Module
//!
//! Structural and semantic checks over a policy model. Findings are returned
//! as data; nothing here fails or mutates the model.
//!
//! ## Errors
//!
//! | code                         | condition                                            |
//! |------------------------------|------------------------------------------------------|
//! | `UNKNOWN_POLICY`             | `policyId` not in the catalog                        |
//! | `INVALID_SECTION`            | entry does not support the containing section        |
//! | `MISSING_REQUIRED_PARAMETER` | required catalog parameter absent or `null`          |
//! | `EMPTY_NAMED_VALUE`          | named-value reference with a blank name              |
//! | `EMPTY_FRAGMENT_ID`          | fragment item with a blank id                        |
//!
//! Everything else is a warning and never affects `valid`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::schema::{AxCParameterMismatch, AxCPolicyCatalogEntry};
use crate::catalog::{AxCPolicyCatalog, AxFCatalog};
use crate::config::AxCNamedValueStyle;
use crate::model::{
    AxCAttributeValue, AxCCatalogItem, AxCExpressionContext, AxCPolicyItem, AxCPolicyModel, AxCSectionKind,
};
use crate::xml::escape::AxFScalarText;
use crate::xml::generator::AX_TEXT_KEY;
use crate::xml::send_request::{AxCSendRequestConfiguration, AX_SEND_REQUEST};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxCValidationCode {
    UnknownPolicy,
    InvalidSection,
    MissingRequiredParameter,
    EmptyNamedValue,
    EmptyFragmentId,
    DuplicateVariableName,
    DuplicateItemId,
    ScopeMissingApiId,
    ScopeMissingOperationId,
    ScopeUnexpectedOperationId,
    UnsupportedScope,
    ParameterTypeMismatch,
    ParameterInvalidEnum,
    EmptyCustomXml,
    ExpressionTargetMissing,
}

impl AxCValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxCValidationCode::UnknownPolicy => "UNKNOWN_POLICY",
            AxCValidationCode::InvalidSection => "INVALID_SECTION",
            AxCValidationCode::MissingRequiredParameter => "MISSING_REQUIRED_PARAMETER",
            AxCValidationCode::EmptyNamedValue => "EMPTY_NAMED_VALUE",
            AxCValidationCode::EmptyFragmentId => "EMPTY_FRAGMENT_ID",
            AxCValidationCode::DuplicateVariableName => "DUPLICATE_VARIABLE_NAME",
            AxCValidationCode::DuplicateItemId => "DUPLICATE_ITEM_ID",
            AxCValidationCode::ScopeMissingApiId => "SCOPE_MISSING_API_ID",
            AxCValidationCode::ScopeMissingOperationId => "SCOPE_MISSING_OPERATION_ID",
            AxCValidationCode::ScopeUnexpectedOperationId => "SCOPE_UNEXPECTED_OPERATION_ID",
            AxCValidationCode::UnsupportedScope => "UNSUPPORTED_SCOPE",
            AxCValidationCode::ParameterTypeMismatch => "PARAMETER_TYPE_MISMATCH",
            AxCValidationCode::ParameterInvalidEnum => "PARAMETER_INVALID_ENUM",
            AxCValidationCode::EmptyCustomXml => "EMPTY_CUSTOM_XML",
            AxCValidationCode::ExpressionTargetMissing => "EXPRESSION_TARGET_MISSING",
        }
    }
}

impl fmt::Display for AxCValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxCValidationIssue {
    /// Location within the model, e.g. `sections.inbound.items[0].configuration.calls`.
    pub path: String,
    pub message: String,
    pub code: AxCValidationCode,
}

impl AxCValidationIssue {
    #[allow(non_snake_case)]
    pub fn AxFNew(path: impl Into<String>, code: AxCValidationCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxCValidationResult {
    pub valid: bool,
    pub errors: Vec<AxCValidationIssue>,
    pub warnings: Vec<AxCValidationIssue>,
}

impl AxCValidationResult {
    #[allow(non_snake_case)]
    pub fn AxFFrom(errors: Vec<AxCValidationIssue>, warnings: Vec<AxCValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFHasCode(&self, code: AxCValidationCode) -> bool {
        self.errors.iter().chain(&self.warnings).any(|i| i.code == code)
    }

    #[allow(non_snake_case)]
    pub fn AxFCount(&self, code: AxCValidationCode) -> usize {
        self.errors.iter().chain(&self.warnings).filter(|i| i.code == code).count()
    }
}

#[derive(Default)]
struct AxCIssueSink {
    errors: Vec<AxCValidationIssue>,
    warnings: Vec<AxCValidationIssue>,
}

impl AxCIssueSink {
    fn error(&mut self, path: impl Into<String>, code: AxCValidationCode, message: impl Into<String>) {
        self.errors.push(AxCValidationIssue::AxFNew(path, code, message));
    }

    fn warning(&mut self, path: impl Into<String>, code: AxCValidationCode, message: impl Into<String>) {
        self.warnings.push(AxCValidationIssue::AxFNew(path, code, message));
    }
}

fn item_path(kind: AxCSectionKind, index: usize) -> String {
    format!("sections.{}.items[{}]", kind.AxFJsonKey(), index)
}

pub struct AxCValidator<'a> {
    catalog: &'a AxCPolicyCatalog,
}

impl Default for AxCValidator<'static> {
    fn default() -> Self {
        Self::AxFNew()
    }
}

impl AxCValidator<'static> {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self { catalog: AxFCatalog() }
    }
}

impl<'a> AxCValidator<'a> {
    #[allow(non_snake_case)]
    pub fn AxFWithCatalog(catalog: &'a AxCPolicyCatalog) -> Self {
        Self { catalog }
    }

    #[allow(non_snake_case)]
    pub fn AxFValidate(&self, model: &AxCPolicyModel) -> AxCValidationResult {
        let mut sink = AxCIssueSink::default();
        check_scope(model, &mut sink);

        for (kind, section) in model.sections.AxFIter() {
            for (index, item) in section.items.iter().enumerate() {
                let path = item_path(kind, index);
                match item {
                    AxCPolicyItem::Catalog(catalog_item) => {
                        self.check_catalog_item(model, kind, &path, catalog_item, &mut sink)
                    }
                    AxCPolicyItem::Fragment(fragment) => {
                        if fragment.fragment_id.trim().is_empty() {
                            sink.error(
                                format!("{}.fragmentId", path),
                                AxCValidationCode::EmptyFragmentId,
                                "fragment item has an empty fragment id",
                            );
                        }
                    }
                    AxCPolicyItem::CustomXml(custom) => {
                        if custom.xml.trim().is_empty() {
                            sink.warning(
                                format!("{}.xml", path),
                                AxCValidationCode::EmptyCustomXml,
                                "custom XML item is empty",
                            );
                        }
                    }
                    AxCPolicyItem::Expression(expression) => {
                        let missing = match expression.context {
                            Some(AxCExpressionContext::Attribute) => {
                                expression.target_element.is_none() || expression.target_attribute.is_none()
                            }
                            Some(AxCExpressionContext::Value) => expression.target_element.is_none(),
                            _ => false,
                        };
                        if missing {
                            sink.warning(
                                path,
                                AxCValidationCode::ExpressionTargetMissing,
                                "expression has no target and will be emitted as a bare expression",
                            );
                        }
                    }
                }
            }
        }

        check_duplicate_ids(model, &mut sink);
        sink.warnings.extend(AxFCheckDuplicateVariableNames(model));
        AxCValidationResult::AxFFrom(sink.errors, sink.warnings)
    }

    fn check_catalog_item(
        &self,
        model: &AxCPolicyModel,
        kind: AxCSectionKind,
        path: &str,
        item: &AxCCatalogItem,
        sink: &mut AxCIssueSink,
    ) {
        check_named_values(path, item, sink);

        let entry = match self.catalog.AxFGetPolicyById(&item.policy_id) {
            Some(entry) => entry,
            None => {
                sink.error(
                    format!("{}.policyId", path),
                    AxCValidationCode::UnknownPolicy,
                    format!("unknown policy '{}'", item.policy_id),
                );
                return;
            }
        };

        if !entry.AxFSupportsSection(kind) {
            sink.error(
                path,
                AxCValidationCode::InvalidSection,
                format!(
                    "policy '{}' is not allowed in the {} section",
                    item.policy_id,
                    kind.AxFXmlName()
                ),
            );
        }
        if !entry.AxFSupportsScope(model.scope) {
            sink.warning(
                path,
                AxCValidationCode::UnsupportedScope,
                format!("policy '{}' is not supported at {} scope", item.policy_id, model.scope),
            );
        }

        for parameter in entry.AxFRequiredParameters() {
            if !has_parameter(entry, item, parameter.name) {
                sink.error(
                    format!("{}.configuration.{}", path, parameter.name),
                    AxCValidationCode::MissingRequiredParameter,
                    format!(
                        "policy '{}' requires parameter '{}'",
                        item.policy_id, parameter.name
                    ),
                );
            }
        }

        for (key, value) in &item.configuration {
            if key == AX_TEXT_KEY || value.is_null() {
                continue;
            }
            let Some(parameter) = entry.AxFParameter(key) else {
                continue;
            };
            match parameter.kind.AxFCheck(value) {
                Ok(()) => {}
                Err(AxCParameterMismatch::WrongType { expected }) => sink.warning(
                    format!("{}.configuration.{}", path, key),
                    AxCValidationCode::ParameterTypeMismatch,
                    format!("parameter '{}' should be a {}", key, expected),
                ),
                Err(AxCParameterMismatch::NotAllowed { allowed }) => sink.warning(
                    format!("{}.configuration.{}", path, key),
                    AxCValidationCode::ParameterInvalidEnum,
                    format!("parameter '{}' must be one of: {}", key, allowed.join(", ")),
                ),
            }
        }
    }
}

fn has_parameter(entry: &AxCPolicyCatalogEntry, item: &AxCCatalogItem, name: &str) -> bool {
    let in_configuration = item
        .configuration
        .get(name)
        .map(|v| !v.is_null())
        .unwrap_or(false);
    let as_text = entry.text_parameter == Some(name)
        && item
            .configuration
            .get(AX_TEXT_KEY)
            .map(|v| !v.is_null())
            .unwrap_or(false);
    in_configuration || as_text || item.attributes.contains_key(name)
}

fn check_scope(model: &AxCPolicyModel, sink: &mut AxCIssueSink) {
    let has = |id: &Option<String>| id.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
    if model.scope.AxFRequiresApiId() && !has(&model.api_id) {
        sink.warning(
            "apiId",
            AxCValidationCode::ScopeMissingApiId,
            format!("{} scope requires an apiId", model.scope),
        );
    }
    if model.scope.AxFAllowsOperationId() {
        if !has(&model.operation_id) {
            sink.warning(
                "operationId",
                AxCValidationCode::ScopeMissingOperationId,
                "operation scope requires an operationId",
            );
        }
    } else if model.operation_id.is_some() {
        sink.warning(
            "operationId",
            AxCValidationCode::ScopeUnexpectedOperationId,
            format!("operationId is only meaningful at operation scope, not {}", model.scope),
        );
    }
}

fn check_named_values(path: &str, item: &AxCCatalogItem, sink: &mut AxCIssueSink) {
    for (key, value) in &item.attributes {
        if let AxCAttributeValue::NamedValue(reference) = value {
            if reference.name.trim().is_empty() {
                sink.error(
                    format!("{}.attributes.{}", path, key),
                    AxCValidationCode::EmptyNamedValue,
                    "named value reference has an empty name",
                );
            }
        }
    }
    if item.policy_id == AX_SEND_REQUEST {
        let send = AxCSendRequestConfiguration::AxFFromConfiguration(&item.configuration);
        for (index, header) in send.headers.iter().enumerate() {
            if let Value::Object(reference) = &header.value {
                let blank = reference
                    .get("name")
                    .and_then(|n| n.as_str())
                    .map(|n| n.trim().is_empty())
                    .unwrap_or(true);
                if blank {
                    sink.error(
                        format!("{}.configuration.headers[{}].value", path, index),
                        AxCValidationCode::EmptyNamedValue,
                        format!("header '{}' references a named value with an empty name", header.name),
                    );
                }
            }
        }
    }
}

fn check_duplicate_ids(model: &AxCPolicyModel, sink: &mut AxCIssueSink) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (kind, section) in model.sections.AxFIter() {
        for (index, item) in section.items.iter().enumerate() {
            let count = seen.entry(item.AxFId()).or_insert(0);
            *count += 1;
            if *count == 2 {
                sink.warning(
                    format!("{}.id", item_path(kind, index)),
                    AxCValidationCode::DuplicateItemId,
                    format!("item id '{}' is used more than once", item.AxFId()),
                );
            }
        }
    }
}

/// Variable assigned by a catalog item, if it assigns one.
fn assigned_variable(item: &AxCCatalogItem) -> Option<String> {
    let key = match item.policy_id.as_str() {
        "set-variable" => "name",
        "cache-lookup-value" => "variable-name",
        _ => return None,
    };
    let configured = match item.configuration.get(key) {
        Some(value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            AxFScalarText(value, AxCNamedValueStyle::Dollar)
        }
        _ => None,
    };
    match configured {
        Some(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => match item.attributes.get(key) {
            Some(AxCAttributeValue::Literal(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        },
    }
}

/// One warning per variable name assigned more than once across all sections.
#[allow(non_snake_case)]
pub fn AxFCheckDuplicateVariableNames(model: &AxCPolicyModel) -> Vec<AxCValidationIssue> {
    let mut assignments: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (kind, section) in model.sections.AxFIter() {
        for (index, item) in section.items.iter().enumerate() {
            if let Some(name) = item.AxFAsCatalog().and_then(assigned_variable) {
                assignments.entry(name).or_default().push(item_path(kind, index));
            }
        }
    }
    assignments
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(name, paths)| {
            AxCValidationIssue::AxFNew(
                paths[1].clone(),
                AxCValidationCode::DuplicateVariableName,
                format!(
                    "variable '{}' is assigned {} times ({})",
                    name,
                    paths.len(),
                    paths.join(", ")
                ),
            )
        })
        .collect()
}

/// Validates against the built-in catalog.
#[allow(non_snake_case)]
pub fn AxFValidate(model: &AxCPolicyModel) -> AxCValidationResult {
    AxCValidator::AxFNew().AxFValidate(model)
}
