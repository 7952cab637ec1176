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

use axp::config::AxCCompilerConfigBuilder;
use axp::xml::parser::{AxFCoerceScalar, AxFFromXmlWith};
use axp::xml::tree::AxFParseDocument;
use axp::xml::{AxCElementShape, AxFClassifyElement};
use axp::{
    AxCAttributeValue, AxCExpressionContext, AxCNamedValueReference, AxCPolicyItem, AxCPolicyModel,
    AxCPolicyScope, AxCPolicySection, AxCSectionKind, AxFFromXml, AxFToXml,
};
use serde_json::json;

fn shape(xml: &str) -> AxCElementShape {
    AxFClassifyElement(&AxFParseDocument(xml).unwrap())
}

#[test]
fn AxFTParsesRateLimitExample() {
    let model =
        AxFFromXml(r#"<policies><inbound><base/><rate-limit calls="100" renewal-period="60"/></inbound></policies>"#)
            .unwrap();

    assert_eq!(model.scope, AxCPolicyScope::Api);
    let inbound = model.sections.AxFGet(AxCSectionKind::Inbound).unwrap();
    assert_eq!(inbound.include_base, Some(true));
    assert_eq!(inbound.items.len(), 1);

    let item = inbound.items[0].AxFAsCatalog().unwrap();
    assert_eq!(item.id, "inbound-0");
    assert_eq!(item.order, 0);
    assert_eq!(item.policy_id, "rate-limit");
    assert_eq!(
        serde_json::Value::Object(item.configuration.clone()),
        json!({"calls": 100, "renewal-period": 60})
    );
    assert!(model.sections.AxFGet(AxCSectionKind::Backend).is_none());
}

#[test]
fn AxFTMissingRootOrMalformedXmlFails() {
    let err = AxFFromXml("<policy><inbound /></policy>").unwrap_err();
    assert!(err.is_parse());
    assert!(AxFFromXml("<policies><inbound></policies>").unwrap_err().is_parse());
    assert!(AxFFromXml("").unwrap_err().is_parse());
}

#[test]
fn AxFTSectionsWithoutBaseAreMarkedExplicitly() {
    let model = AxFFromXml("<policies><outbound><set-status code=\"200\" /></outbound><on-error /></policies>").unwrap();
    let outbound = model.sections.AxFGet(AxCSectionKind::Outbound).unwrap();
    assert_eq!(outbound.include_base, Some(false));
    assert_eq!(outbound.items[0].AxFId(), "outbound-0");

    let on_error = model.sections.AxFGet(AxCSectionKind::OnError).unwrap();
    assert_eq!(on_error.include_base, Some(false));
    assert!(on_error.items.is_empty());
}

#[test]
fn AxFTNamedValueAttributesBecomeReferences() {
    let model = AxFFromXml(
        r#"<policies><inbound><set-header name="x-api-key" value="${{backend-api-key}}" exists-action="override" /></inbound></policies>"#,
    )
    .unwrap();
    let item = model.sections.inbound.as_ref().unwrap().items[0].AxFAsCatalog().unwrap();

    assert_eq!(
        item.attributes.get("value"),
        Some(&AxCAttributeValue::NamedValue(AxCNamedValueReference::AxFNew("backend-api-key")))
    );
    assert_eq!(item.configuration.get("name"), Some(&json!("x-api-key")));
    assert_eq!(item.configuration.get("exists-action"), Some(&json!("override")));
    assert!(!item.configuration.contains_key("value"));
}

#[test]
fn AxFTFragmentsAndCommentsAndExpressions() {
    let model = AxFFromXml(
        r#"<policies>
  <inbound>
    <base />
    <!-- shared auth -->
    <include-fragment fragment-id="common-auth" />
    @(context.Variables.ContainsKey("x"))
  </inbound>
</policies>"#,
    )
    .unwrap();
    let items = &model.sections.inbound.as_ref().unwrap().items;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], AxCPolicyItem::AxFCustomXml("inbound-0", 0, "<!-- shared auth -->"));
    assert_eq!(items[1], AxCPolicyItem::AxFFragment("inbound-1", 1, "common-auth"));
    assert_eq!(
        items[2],
        AxCPolicyItem::AxFExpression(
            "inbound-2",
            2,
            r#"@(context.Variables.ContainsKey("x"))"#,
            Some(AxCExpressionContext::Condition)
        )
    );
}

#[test]
fn AxFTComplexElementsBecomeCustomXml() {
    let model = AxFFromXml(
        r#"<policies><inbound><choose><when condition="@(true)"><set-variable name="a" value="1" /></when></choose></inbound></policies>"#,
    )
    .unwrap();
    match &model.sections.inbound.as_ref().unwrap().items[0] {
        AxCPolicyItem::CustomXml(custom) => assert_eq!(
            custom.xml,
            "<choose>\n  <when condition=\"@(true)\">\n    <set-variable name=\"a\" value=\"1\" />\n  </when>\n</choose>"
        ),
        other => panic!("expected custom xml, got {:?}", other),
    }
}

#[test]
fn AxFTElementTextFillsTheTextParameter() {
    let model = AxFFromXml(
        "<policies><inbound><set-method>POST</set-method><custom-note>hi</custom-note></inbound></policies>",
    )
    .unwrap();
    let items = &model.sections.inbound.as_ref().unwrap().items;
    let method = items[0].AxFAsCatalog().unwrap();
    assert_eq!(method.policy_id, "set-method");
    assert_eq!(method.configuration.get("method"), Some(&json!("POST")));
    assert_eq!(method.configuration.get("#text"), None);

    let note = items[1].AxFAsCatalog().unwrap();
    assert_eq!(note.configuration.get("#text"), Some(&json!("hi")));
}

#[test]
fn AxFTTextParameterWinsOverAnExplicitAttribute() {
    let model =
        AxFFromXml(r#"<policies><inbound><set-body value="a">b</set-body></inbound></policies>"#).unwrap();
    let item = model.sections.inbound.as_ref().unwrap().items[0].AxFAsCatalog().unwrap();
    assert_eq!(item.configuration.get("value"), Some(&json!("a")));
    assert_eq!(item.configuration.get("#text"), Some(&json!("b")));
}

fn regenerated(policy_id: &str, configuration: serde_json::Value) -> AxCPolicyItem {
    let model = AxCPolicyModel::AxFNew(AxCPolicyScope::Api).AxFWithSection(
        AxCSectionKind::Inbound,
        AxCPolicySection::AxFNew().AxFWithItem(AxCPolicyItem::AxFCatalog("p", 0, policy_id, configuration)),
    );
    let parsed = AxFFromXml(&AxFToXml(&model)).unwrap();
    parsed.sections.inbound.as_ref().unwrap().items[0].clone()
}

#[test]
fn AxFTTemplatedPoliciesKeepTheirConfiguration() {
    let cases = [
        ("set-method", json!({"method": "GET"})),
        ("set-body", json!({"template": "liquid", "value": "hello"})),
        ("log-to-eventhub", json!({"logger-id": "hub", "message": "ping"})),
        ("trace", json!({"source": "s", "message": "hi"})),
    ];
    for (policy_id, configuration) in cases {
        let item = regenerated(policy_id, configuration.clone());
        let catalog = item
            .AxFAsCatalog()
            .unwrap_or_else(|| panic!("{} came back as {:?}", policy_id, item));
        assert_eq!(catalog.policy_id, policy_id);
        assert_eq!(serde_json::Value::Object(catalog.configuration.clone()), configuration, "{}", policy_id);
    }
}

#[test]
fn AxFTSendRequestIsReconstructed() {
    let model = AxFFromXml(
        r#"<policies><inbound>
  <send-request mode="new" response-variable-name="tokenResponse" timeout="20" ignore-error="true">
    <set-url>https://auth.example.com/token</set-url>
    <set-method>POST</set-method>
    <set-headers>
      <header name="Authorization" value="{{auth-token}}" />
      <header name="Accept" value="application/json" exists-action="skip" />
    </set-headers>
    <set-body>grant_type=client_credentials</set-body>
  </send-request>
</inbound></policies>"#,
    )
    .unwrap();
    let item = model.sections.inbound.as_ref().unwrap().items[0].AxFAsCatalog().unwrap();
    assert_eq!(item.policy_id, "send-request");
    assert_eq!(
        serde_json::Value::Object(item.configuration.clone()),
        json!({
            "mode": "new",
            "url": "https://auth.example.com/token",
            "setUrl": true,
            "method": "POST",
            "headers": [
                {"name": "Authorization", "value": {"name": "auth-token"}},
                {"name": "Accept", "value": "application/json", "existsAction": "skip"}
            ],
            "body": "grant_type=client_credentials",
            "timeout": 20,
            "ignoreErrors": true,
            "responseVariableName": "tokenResponse"
        })
    );
}

#[test]
fn AxFTSendRequestWithBackendServiceKeepsBothTargets() {
    let model = AxFFromXml(
        r#"<policies><inbound><send-request response-variable-name="r"><set-url>/token</set-url><set-backend-service base-url="https://base.example.com" /></send-request></inbound></policies>"#,
    )
    .unwrap();
    let item = model.sections.inbound.as_ref().unwrap().items[0].AxFAsCatalog().unwrap();
    assert_eq!(item.configuration.get("setUrl"), Some(&json!("/token")));
    assert_eq!(item.configuration.get("url"), Some(&json!("https://base.example.com")));
}

#[test]
fn AxFTUnrecognizedSendRequestFallsBackToCustomXml() {
    let model = AxFFromXml(
        r#"<policies><inbound><send-request mode="new" response-variable-name="r"><authentication-certificate thumbprint="abc" /></send-request></inbound></policies>"#,
    )
    .unwrap();
    let item = &model.sections.inbound.as_ref().unwrap().items[0];
    assert_eq!(item.AxFKindName(), "custom-xml");
}

#[test]
fn AxFTDuplicateAndUnknownSectionsAreIgnored() {
    let model = AxFFromXml(
        r#"<policies><inbound><set-status code="1" /></inbound><inbound><set-status code="2" /></inbound><extra /></policies>"#,
    )
    .unwrap();
    let inbound = model.sections.inbound.as_ref().unwrap();
    assert_eq!(inbound.items.len(), 1);
    assert_eq!(inbound.items[0].AxFAsCatalog().unwrap().configuration.get("code"), Some(&json!(1)));
    assert_eq!(model.AxFItemCount(), 1);
}

#[test]
fn AxFTCoercionCanBeDisabled() {
    let config = AxCCompilerConfigBuilder {
        coerce_scalars: Some(false),
        default_scope: Some(AxCPolicyScope::Global),
        ..Default::default()
    }
    .AxFBuild();
    let model = AxFFromXmlWith(
        r#"<policies><inbound><rate-limit calls="100" renewal-period="60" /></inbound></policies>"#,
        &config,
    )
    .unwrap();
    assert_eq!(model.scope, AxCPolicyScope::Global);
    let item = model.sections.inbound.as_ref().unwrap().items[0].AxFAsCatalog().unwrap();
    assert_eq!(item.configuration.get("calls"), Some(&json!("100")));
}

#[test]
fn AxFTCoerceScalarOnlyWhenLossless() {
    assert_eq!(AxFCoerceScalar("42", true), json!(42));
    assert_eq!(AxFCoerceScalar("-7", true), json!(-7));
    assert_eq!(AxFCoerceScalar("1.5", true), json!(1.5));
    assert_eq!(AxFCoerceScalar("true", true), json!(true));
    assert_eq!(AxFCoerceScalar("007", true), json!("007"));
    assert_eq!(AxFCoerceScalar("1e3", true), json!("1e3"));
    assert_eq!(AxFCoerceScalar("True", true), json!("True"));
    assert_eq!(AxFCoerceScalar("42", false), json!("42"));
}

#[test]
fn AxFTClassifyElementShapes() {
    assert_eq!(shape("<base />"), AxCElementShape::Base);
    assert_eq!(shape(r#"<include-fragment fragment-id="a" />"#), AxCElementShape::Fragment);
    assert_eq!(shape(r#"<include fragment-id="a" />"#), AxCElementShape::Fragment);
    assert_eq!(shape(r#"<include-fragment fragment-id="  " />"#), AxCElementShape::Complex);
    assert_eq!(shape("<include-fragment />"), AxCElementShape::Complex);
    assert_eq!(
        shape(r#"<include-fragment fragment-id="a"><x /></include-fragment>"#),
        AxCElementShape::Complex
    );
    assert_eq!(shape("<send-request />"), AxCElementShape::SendRequest);
    assert_eq!(shape(r#"<rate-limit calls="1" />"#), AxCElementShape::Simple);
    assert_eq!(shape("<set-body>text</set-body>"), AxCElementShape::Simple);
    assert_eq!(shape("<set-body>\n  </set-body>"), AxCElementShape::Simple);
    assert_eq!(shape("<set-body><![CDATA[x]]></set-body>"), AxCElementShape::Complex);
    assert_eq!(shape("<set-body><!-- c -->x</set-body>"), AxCElementShape::Complex);
    assert_eq!(shape("<cors><allowed-origins /></cors>"), AxCElementShape::Complex);
    assert_eq!(shape(r#"<trace source="s"><message>hi</message></trace>"#), AxCElementShape::Simple);
    assert_eq!(
        shape("<trace><message>a</message><message>b</message></trace>"),
        AxCElementShape::Complex
    );
    assert_eq!(
        shape(r#"<trace><message id="1">a</message></trace>"#),
        AxCElementShape::Complex
    );
    assert_eq!(shape("<set-method><message>a</message></set-method>"), AxCElementShape::Complex);
}
