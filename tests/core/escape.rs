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

use axp::config::AxCNamedValueStyle;
use axp::xml::escape::{
    AxFEscapeText, AxFEscapeXml, AxFFormatAttributeValue, AxFFormatConfigValue, AxFFormatNamedValue,
    AxFIsExpression, AxFParseNamedValue, AxFUnescapeXml,
};
use axp::{AxCAttributeValue, AxCNamedValueReference};
use serde_json::json;

#[test]
fn AxFTEscapeXmlReplacesAllFiveReservedCharacters() {
    assert_eq!(
        AxFEscapeXml(r#"a & b < c > d " e ' f"#),
        "a &amp; b &lt; c &gt; d &quot; e &apos; f"
    );
}

#[test]
fn AxFTEscapeTextLeavesQuotesAlone() {
    assert_eq!(AxFEscapeText(r#"say "hi" & <go>"#), r#"say "hi" &amp; &lt;go&gt;"#);
}

#[test]
fn AxFTUnescapeDecodesPredefinedAndNumericReferences() {
    assert_eq!(AxFUnescapeXml("&lt;a&gt; &amp;&amp; &quot;&apos;"), "<a> && \"'");
    assert_eq!(AxFUnescapeXml("&#65;&#x42;&#X43;"), "ABC");
}

#[test]
fn AxFTUnescapeKeepsUnknownReferencesVerbatim() {
    assert_eq!(AxFUnescapeXml("fish &chips; & more"), "fish &chips; & more");
    assert_eq!(AxFUnescapeXml("&#xZZ;"), "&#xZZ;");
    assert_eq!(AxFUnescapeXml("trailing &"), "trailing &");
}

#[test]
fn AxFTUnescapeIsSinglePass() {
    assert_eq!(AxFUnescapeXml("&amp;lt;"), "&lt;");
}

#[test]
fn AxFTNamedValueTokensInBothStyles() {
    assert_eq!(AxFFormatNamedValue("key", AxCNamedValueStyle::Dollar), "${{key}}");
    assert_eq!(AxFFormatNamedValue("key", AxCNamedValueStyle::Plain), "{{key}}");

    assert_eq!(AxFParseNamedValue("${{backend-api-key}}").as_deref(), Some("backend-api-key"));
    assert_eq!(AxFParseNamedValue(" {{plain}} ").as_deref(), Some("plain"));
    assert_eq!(AxFParseNamedValue("prefix {{x}}"), None);
    assert_eq!(AxFParseNamedValue("{{}}"), None);
    assert_eq!(AxFParseNamedValue("{{  }}"), None);
}

#[test]
fn AxFTExpressionsPassThroughUnescaped() {
    let expr = r#"@(context.Request.Headers.GetValueOrDefault("x", ""))"#;
    assert!(AxFIsExpression(expr));

    let literal = AxCAttributeValue::Literal(expr.to_string());
    assert_eq!(AxFFormatAttributeValue(&literal, AxCNamedValueStyle::Dollar), expr);

    let plain = AxCAttributeValue::Literal("a<b".to_string());
    assert_eq!(AxFFormatAttributeValue(&plain, AxCNamedValueStyle::Dollar), "a&lt;b");
}

#[test]
fn AxFTNamedValueAttributeRendersToken() {
    let value = AxCAttributeValue::NamedValue(AxCNamedValueReference::AxFNew("backend-api-key"));
    assert_eq!(
        AxFFormatAttributeValue(&value, AxCNamedValueStyle::Dollar),
        "${{backend-api-key}}"
    );
}

#[test]
fn AxFTConfigValuesRenderScalarsListsAndReferences() {
    let style = AxCNamedValueStyle::Dollar;
    assert_eq!(AxFFormatConfigValue(&json!(100), style).as_deref(), Some("100"));
    assert_eq!(AxFFormatConfigValue(&json!(true), style).as_deref(), Some("true"));
    assert_eq!(AxFFormatConfigValue(&json!(["a", "b"]), style).as_deref(), Some("a,b"));
    assert_eq!(AxFFormatConfigValue(&json!({"name": "nv"}), style).as_deref(), Some("${{nv}}"));
    assert_eq!(AxFFormatConfigValue(&json!("{{nv}}"), style).as_deref(), Some("{{nv}}"));
    assert_eq!(AxFFormatConfigValue(&json!("x&y"), style).as_deref(), Some("x&amp;y"));
    assert_eq!(AxFFormatConfigValue(&json!(null), style), None);
}
