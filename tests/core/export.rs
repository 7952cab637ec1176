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

use axp::errors::AxError;
use axp::export::arm::{AX_DEFAULT_API_VERSION, AX_POLICY_FORMAT};
use axp::export::bundle::AX_BUNDLE_VERSION;
use axp::export::{AxFResourceName, AxFResourceType, AxFToArmResource, AxFToBicep, AxCValidationSummary};
use axp::{
    AxCExportBundle, AxCExportBundleBuilder, AxCExportOptions, AxCPolicyItem, AxCPolicyMetadata, AxCPolicyModel,
    AxCPolicyScope, AxCPolicySection, AxCSectionKind, AxFToXml, AxFValidate,
};
use serde_json::json;

fn rate_limited(scope: AxCPolicyScope) -> AxCPolicyModel {
    let inbound = AxCPolicySection::AxFNew().AxFWithItem(AxCPolicyItem::AxFCatalog(
        "inbound-0",
        0,
        "rate-limit",
        json!({"calls": 100, "renewal-period": 60}),
    ));
    AxCPolicyModel::AxFNew(scope).AxFWithSection(AxCSectionKind::Inbound, inbound)
}

fn options() -> AxCExportOptions {
    AxCExportOptions::AxFNew("contoso-apim")
}

#[test]
fn AxFTResourceTypesPerScope() {
    assert_eq!(AxFResourceType(AxCPolicyScope::Global), "Microsoft.ApiManagement/service/policies");
    assert_eq!(
        AxFResourceType(AxCPolicyScope::Product),
        "Microsoft.ApiManagement/service/products/policies"
    );
    assert_eq!(AxFResourceType(AxCPolicyScope::Api), "Microsoft.ApiManagement/service/apis/policies");
    assert_eq!(
        AxFResourceType(AxCPolicyScope::Operation),
        "Microsoft.ApiManagement/service/apis/operations/policies"
    );
}

#[test]
fn AxFTResourceNamesPerScope() {
    let global = rate_limited(AxCPolicyScope::Global);
    assert_eq!(AxFResourceName(&global, &options()).unwrap(), "contoso-apim/policy");

    let product = rate_limited(AxCPolicyScope::Product);
    assert!(matches!(
        AxFResourceName(&product, &options()),
        Err(AxError::Validation { .. })
    ));
    assert_eq!(
        AxFResourceName(&product, &options().AxFWithProduct("starter")).unwrap(),
        "contoso-apim/starter/policy"
    );

    let api = rate_limited(AxCPolicyScope::Api).AxFWithApi("orders");
    assert_eq!(AxFResourceName(&api, &options()).unwrap(), "contoso-apim/orders/policy");

    let operation = rate_limited(AxCPolicyScope::Operation)
        .AxFWithApi("orders")
        .AxFWithOperation("get-order");
    assert_eq!(
        AxFResourceName(&operation, &options()).unwrap(),
        "contoso-apim/orders/get-order/policy"
    );
}

#[test]
fn AxFTResourceNameRequiresIdentifiers() {
    let api = rate_limited(AxCPolicyScope::Api);
    let err = AxFResourceName(&api, &options()).unwrap_err();
    assert!(err.to_string().contains("apiId"));

    let operation = rate_limited(AxCPolicyScope::Operation).AxFWithApi("orders");
    assert!(AxFResourceName(&operation, &options()).is_err());

    let global = rate_limited(AxCPolicyScope::Global);
    assert!(AxFResourceName(&global, &AxCExportOptions::AxFNew("  ")).is_err());
}

#[test]
fn AxFTArmResourceShape() {
    let model = rate_limited(AxCPolicyScope::Api).AxFWithApi("orders");
    let xml = AxFToXml(&model);
    let resource = AxFToArmResource(&model, &xml, &options()).unwrap();

    let value = serde_json::to_value(&resource).unwrap();
    assert_eq!(value["type"], json!("Microsoft.ApiManagement/service/apis/policies"));
    assert_eq!(value["apiVersion"], json!(AX_DEFAULT_API_VERSION));
    assert_eq!(value["name"], json!("contoso-apim/orders/policy"));
    assert_eq!(value["properties"]["format"], json!(AX_POLICY_FORMAT));
    assert_eq!(value["properties"]["value"], json!(xml));

    let pinned = AxFToArmResource(&model, &xml, &options().AxFWithApiVersion("2023-05-01-preview")).unwrap();
    assert_eq!(pinned.api_version, "2023-05-01-preview");
}

#[test]
fn AxFTBicepDeclaration() {
    let model = rate_limited(AxCPolicyScope::Global);
    let bicep = AxFToBicep(&model, "<policies />", &options()).unwrap();
    assert_eq!(
        bicep,
        "resource servicePolicy 'Microsoft.ApiManagement/service/policies@2022-08-01' = {\n  name: 'contoso-apim/policy'\n  properties: {\n    format: 'rawxml'\n    value: '''\n<policies />\n'''\n  }\n}\n"
    );

    let operation = rate_limited(AxCPolicyScope::Operation)
        .AxFWithApi("orders")
        .AxFWithOperation("get-order");
    let bicep = AxFToBicep(&operation, "<policies />", &options()).unwrap();
    assert!(bicep.starts_with("resource operationPolicy 'Microsoft.ApiManagement/service/apis/operations/policies@"));

    let err = AxFToBicep(&model, "<policies><!-- ''' --></policies>", &options()).unwrap_err();
    assert!(matches!(err, AxError::Validation { .. }));
}

#[test]
fn AxFTBundleCarriesXmlAndFingerprint() {
    let model = rate_limited(AxCPolicyScope::Api)
        .AxFWithApi("orders")
        .AxFWithMetadata(AxCPolicyMetadata {
            name: Some("orders throttling".to_string()),
            ..Default::default()
        });
    let bundle = AxCExportBundleBuilder::AxFNew(&model)
        .AxFWithArm(options())
        .AxFRequireValid(true)
        .AxFBuild()
        .unwrap();

    assert_eq!(bundle.version, AX_BUNDLE_VERSION);
    assert_eq!(bundle.scope, AxCPolicyScope::Api);
    assert_eq!(bundle.api_id.as_deref(), Some("orders"));
    assert_eq!(bundle.xml, AxFToXml(&model));
    assert_eq!(bundle.fingerprint, axp::detection::AxFFingerprint(&bundle.xml));
    assert_eq!(bundle.fingerprint.len(), 64);
    assert!(bundle.validation.valid);
    assert_eq!(bundle.validation.error_count, 0);
    assert_eq!(bundle.arm_resource.as_ref().unwrap().name, "contoso-apim/orders/policy");
    assert_eq!(bundle.metadata.as_ref().unwrap().name.as_deref(), Some("orders throttling"));

    let json = bundle.AxFToJson().unwrap();
    assert!(json.contains("\"generatedAt\""));
    assert!(json.contains("\"armResource\""));
    assert_eq!(AxCExportBundle::AxFFromJson(&json).unwrap(), bundle);
}

#[test]
fn AxFTBundleWithoutArm() {
    let model = rate_limited(AxCPolicyScope::Global);
    let bundle = AxCExportBundleBuilder::AxFNew(&model).AxFBuild().unwrap();
    assert!(bundle.arm_resource.is_none());
    let value: serde_json::Value = serde_json::from_str(&bundle.AxFToJson().unwrap()).unwrap();
    assert!(value.get("armResource").is_none());
    assert!(value.get("apiId").is_none());
}

#[test]
fn AxFTBundleRequireValidRejectsErrors() {
    let inbound = AxCPolicySection::AxFNew().AxFWithItem(AxCPolicyItem::AxFCatalog(
        "inbound-0",
        0,
        "no-such-policy",
        json!({}),
    ));
    let model = AxCPolicyModel::AxFNew(AxCPolicyScope::Global).AxFWithSection(AxCSectionKind::Inbound, inbound);

    let err = AxCExportBundleBuilder::AxFNew(&model)
        .AxFRequireValid(true)
        .AxFBuild()
        .unwrap_err();
    assert!(err.to_string().contains("UNKNOWN_POLICY"));

    let lenient = AxCExportBundleBuilder::AxFNew(&model).AxFBuild().unwrap();
    assert!(!lenient.validation.valid);
    assert_eq!(lenient.validation.error_count, 1);
    assert!(lenient.validation.codes.contains("UNKNOWN_POLICY"));
}

#[test]
fn AxFTBundleArmErrorsPropagate() {
    let model = rate_limited(AxCPolicyScope::Operation).AxFWithApi("orders");
    let result = AxCExportBundleBuilder::AxFNew(&model).AxFWithArm(options()).AxFBuild();
    assert!(matches!(result, Err(AxError::Validation { .. })));
}

#[test]
fn AxFTValidationSummaryCollectsCodes() {
    let model = rate_limited(AxCPolicyScope::Api);
    let result = AxFValidate(&model);
    let summary = AxCValidationSummary::from(&result);
    assert!(summary.valid);
    assert_eq!(summary.warning_count, result.warnings.len());
    assert!(summary.codes.contains("SCOPE_MISSING_API_ID"));

    let value = serde_json::to_value(&summary).unwrap();
    assert!(value.get("errorCount").is_some());
}
