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

use axp::catalog::entries::AxFBuiltinEntries;
use axp::catalog::AxCPolicyCatalog;
use axp::model::AxCExpressionItem;
use axp::validator::AxFCheckDuplicateVariableNames;
use axp::{
    AxCNamedValueReference, AxCPolicyItem, AxCPolicyModel, AxCPolicyScope, AxCPolicySection, AxCSectionKind,
    AxCValidationCode, AxCValidator, AxFValidate, AxCExpressionContext, AxFFromXml,
};
use serde_json::json;

fn api_model() -> AxCPolicyModel {
    AxCPolicyModel::AxFNew(AxCPolicyScope::Api).AxFWithApi("orders")
}

fn with(model: AxCPolicyModel, kind: AxCSectionKind, items: Vec<AxCPolicyItem>) -> AxCPolicyModel {
    let mut section = AxCPolicySection::AxFNew();
    section.items = items;
    model.AxFWithSection(kind, section)
}

fn rate_limit(id: &str) -> AxCPolicyItem {
    AxCPolicyItem::AxFCatalog(id, 0, "rate-limit", json!({"calls": 100, "renewal-period": 60}))
}

fn set_variable(id: &str, name: &str) -> AxCPolicyItem {
    AxCPolicyItem::AxFCatalog(id, 0, "set-variable", json!({"name": name, "value": "@(1)"}))
}

#[test]
fn AxFTValidModelHasNoFindings() {
    let model = with(api_model(), AxCSectionKind::Inbound, vec![rate_limit("rl")]);
    let result = AxFValidate(&model);
    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn AxFTWrongSectionYieldsExactlyOneError() {
    let model = with(api_model(), AxCSectionKind::Outbound, vec![rate_limit("rl")]);
    let result = AxFValidate(&model);

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, AxCValidationCode::InvalidSection);
    assert_eq!(result.errors[0].path, "sections.outbound.items[0]");
}

#[test]
fn AxFTUnknownPolicyIsAnErrorAndSkipsOtherChecks() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![AxCPolicyItem::AxFCatalog("x", 0, "no-such-policy", json!({}))],
    );
    let result = AxFValidate(&model);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, AxCValidationCode::UnknownPolicy);
    assert_eq!(result.errors[0].path, "sections.inbound.items[0].policyId");
}

#[test]
fn AxFTMissingRequiredParametersAreReportedPerParameter() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![AxCPolicyItem::AxFCatalog("rl", 0, "rate-limit", json!({"calls": 10, "renewal-period": null}))],
    );
    let result = AxFValidate(&model);
    assert_eq!(result.AxFCount(AxCValidationCode::MissingRequiredParameter), 1);
    assert_eq!(
        result.errors[0].path,
        "sections.inbound.items[0].configuration.renewal-period"
    );
}

#[test]
fn AxFTRequiredParametersMayComeFromAttributesOrText() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![
            AxCPolicyItem::AxFCatalog("h", 0, "set-header", json!({}))
                .AxFWithAttribute("name", AxCNamedValueReference::AxFNew("header-name")),
            AxCPolicyItem::AxFCatalog("m", 1, "set-method", json!({"#text": "POST"})),
        ],
    );
    assert!(AxFValidate(&model).valid);
}

#[test]
fn AxFTEmptyNamedValueIsAnError() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![AxCPolicyItem::AxFCatalog("h", 0, "set-header", json!({"name": "x"}))
            .AxFWithAttribute("value", AxCNamedValueReference::AxFNew("  "))],
    );
    let result = AxFValidate(&model);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, AxCValidationCode::EmptyNamedValue);
    assert_eq!(result.errors[0].path, "sections.inbound.items[0].attributes.value");
}

#[test]
fn AxFTEmptySendRequestHeaderReferenceIsAnError() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![AxCPolicyItem::AxFCatalog(
            "sr",
            0,
            "send-request",
            json!({"responseVariableName": "r", "headers": [{"name": "Authorization", "value": {"name": ""}}]}),
        )],
    );
    let result = AxFValidate(&model);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, AxCValidationCode::EmptyNamedValue);
}

#[test]
fn AxFTEmptyFragmentIdIsAnError() {
    let model = with(
        api_model(),
        AxCSectionKind::Backend,
        vec![AxCPolicyItem::AxFFragment("f", 0, " ")],
    );
    let result = AxFValidate(&model);
    assert!(result.AxFHasCode(AxCValidationCode::EmptyFragmentId));
    assert!(!result.valid);
}

#[test]
fn AxFTDuplicateVariableNamesWarnOncePerName() {
    let model = with(
        with(
            api_model(),
            AxCSectionKind::Inbound,
            vec![set_variable("a", "userId"), set_variable("b", "tenant")],
        ),
        AxCSectionKind::Outbound,
        vec![set_variable("c", "userId"), set_variable("d", "userId")],
    );

    let warnings = AxFCheckDuplicateVariableNames(&model);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, AxCValidationCode::DuplicateVariableName);
    assert_eq!(warnings[0].path, "sections.outbound.items[0]");

    let result = AxFValidate(&model);
    assert!(result.valid);
    assert_eq!(result.AxFCount(AxCValidationCode::DuplicateVariableName), 1);
}

#[test]
fn AxFTNumericVariableNamesStillCountAsDuplicates() {
    let model = AxFFromXml(
        r#"<policies><inbound><set-variable name="1" value="a"/><set-variable name="1" value="b"/></inbound></policies>"#,
    )
    .unwrap();
    let warnings = AxFCheckDuplicateVariableNames(&model);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, AxCValidationCode::DuplicateVariableName);
    assert_eq!(warnings[0].path, "sections.inbound.items[1]");

    let flags = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![
            AxCPolicyItem::AxFCatalog("a", 0, "set-variable", json!({"name": true, "value": "x"})),
            AxCPolicyItem::AxFCatalog("b", 1, "set-variable", json!({"name": "true", "value": "y"})),
        ],
    );
    assert_eq!(AxFCheckDuplicateVariableNames(&flags).len(), 1);
}

#[test]
fn AxFTCacheLookupValueCountsAsAssignment() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![
            set_variable("a", "token"),
            AxCPolicyItem::AxFCatalog("b", 1, "cache-lookup-value", json!({"key": "k", "variable-name": "token"})),
        ],
    );
    assert_eq!(AxFCheckDuplicateVariableNames(&model).len(), 1);
}

#[test]
fn AxFTScopeChecksAreWarnings() {
    let missing_api = with(
        AxCPolicyModel::AxFNew(AxCPolicyScope::Operation),
        AxCSectionKind::Inbound,
        vec![rate_limit("rl")],
    );
    let result = AxFValidate(&missing_api);
    assert!(result.valid);
    assert!(result.AxFHasCode(AxCValidationCode::ScopeMissingApiId));
    assert!(result.AxFHasCode(AxCValidationCode::ScopeMissingOperationId));

    let stray_operation = api_model().AxFWithOperation("get-order");
    assert!(AxFValidate(&stray_operation).AxFHasCode(AxCValidationCode::ScopeUnexpectedOperationId));
}

#[test]
fn AxFTUnsupportedScopeIsAWarning() {
    let model = with(
        AxCPolicyModel::AxFNew(AxCPolicyScope::Global),
        AxCSectionKind::Inbound,
        vec![rate_limit("rl")],
    );
    let result = AxFValidate(&model);
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, AxCValidationCode::UnsupportedScope);
}

#[test]
fn AxFTParameterSchemaMismatchesAreWarnings() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![
            AxCPolicyItem::AxFCatalog("rl", 0, "rate-limit", json!({"calls": "many", "renewal-period": 60})),
            AxCPolicyItem::AxFCatalog("m", 1, "set-method", json!({"method": "FETCH"})),
        ],
    );
    let result = AxFValidate(&model);
    assert!(result.valid);
    assert_eq!(result.AxFCount(AxCValidationCode::ParameterTypeMismatch), 1);
    assert_eq!(result.AxFCount(AxCValidationCode::ParameterInvalidEnum), 1);
}

#[test]
fn AxFTDuplicateItemIdsAndEmptyCustomXmlWarn() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![
            AxCPolicyItem::AxFCustomXml("same", 0, "  "),
            AxCPolicyItem::AxFCustomXml("same", 1, "<x />"),
        ],
    );
    let result = AxFValidate(&model);
    assert!(result.valid);
    assert_eq!(result.AxFCount(AxCValidationCode::DuplicateItemId), 1);
    assert_eq!(result.AxFCount(AxCValidationCode::EmptyCustomXml), 1);
}

#[test]
fn AxFTExpressionWithoutTargetWarns() {
    let model = with(
        api_model(),
        AxCSectionKind::Inbound,
        vec![AxCPolicyItem::Expression(AxCExpressionItem {
            id: "e".into(),
            order: 0,
            expression: "@(1)".into(),
            context: Some(AxCExpressionContext::Attribute),
            target_element: Some("set-header".into()),
            target_attribute: None,
        })],
    );
    let result = AxFValidate(&model);
    assert!(result.valid);
    assert!(result.AxFHasCode(AxCValidationCode::ExpressionTargetMissing));
}

#[test]
fn AxFTValidatorAcceptsACustomCatalog() {
    let entries = AxFBuiltinEntries()
        .into_iter()
        .filter(|e| e.id != "rate-limit")
        .collect();
    let catalog = AxCPolicyCatalog::AxFFromEntries(entries);
    let model = with(api_model(), AxCSectionKind::Inbound, vec![rate_limit("rl")]);

    let result = AxCValidator::AxFWithCatalog(&catalog).AxFValidate(&model);
    assert!(result.AxFHasCode(AxCValidationCode::UnknownPolicy));
}

#[test]
fn AxFTValidationResultSerializesCodesInScreamingCase() {
    let model = with(api_model(), AxCSectionKind::Outbound, vec![rate_limit("rl")]);
    let value = serde_json::to_value(AxFValidate(&model)).unwrap();
    assert_eq!(value["valid"], json!(false));
    assert_eq!(value["errors"][0]["code"], json!("INVALID_SECTION"));
    assert_eq!(AxCValidationCode::InvalidSection.to_string(), "INVALID_SECTION");
}
