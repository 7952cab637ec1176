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

use serde::{Deserialize, Serialize};

use crate::errors::{AxError, Result};
use crate::model::{AxCPolicyModel, AxCPolicyScope};

pub const AX_DEFAULT_API_VERSION: &str = "2022-08-01";
pub const AX_POLICY_FORMAT: &str = "rawxml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCExportOptions {
    /// Name of the API Management service instance.
    pub service_name: String,
    pub api_version: String,
    /// Required for product scope; the model does not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl AxCExportOptions {
    #[allow(non_snake_case)]
    pub fn AxFNew(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            api_version: AX_DEFAULT_API_VERSION.to_string(),
            product_id: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFWithProduct(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithApiVersion(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxCArmPolicyProperties {
    pub format: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCArmResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub api_version: String,
    pub name: String,
    pub properties: AxCArmPolicyProperties,
}

/// Resource type suffix under `Microsoft.ApiManagement/service`.
#[allow(non_snake_case)]
pub fn AxFResourceType(scope: AxCPolicyScope) -> &'static str {
    match scope {
        AxCPolicyScope::Global => "Microsoft.ApiManagement/service/policies",
        AxCPolicyScope::Product => "Microsoft.ApiManagement/service/products/policies",
        AxCPolicyScope::Api => "Microsoft.ApiManagement/service/apis/policies",
        AxCPolicyScope::Operation => "Microsoft.ApiManagement/service/apis/operations/policies",
    }
}

fn required<'m>(value: Option<&'m str>, what: &str, scope: AxCPolicyScope) -> Result<&'m str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AxError::validation(format!(
            "{} scope export requires {}",
            scope, what
        ))),
    }
}

/// Resource name segments, e.g. `svc/orders/get-order/policy`.
#[allow(non_snake_case)]
pub fn AxFResourceName(model: &AxCPolicyModel, options: &AxCExportOptions) -> Result<String> {
    let service = required(Some(options.service_name.as_str()), "a service name", model.scope)?;
    let mut segments = vec![service.to_string()];
    match model.scope {
        AxCPolicyScope::Global => {}
        AxCPolicyScope::Product => {
            segments.push(required(options.product_id.as_deref(), "a product id", model.scope)?.to_string());
        }
        AxCPolicyScope::Api => {
            segments.push(required(model.api_id.as_deref(), "an apiId", model.scope)?.to_string());
        }
        AxCPolicyScope::Operation => {
            segments.push(required(model.api_id.as_deref(), "an apiId", model.scope)?.to_string());
            segments.push(required(model.operation_id.as_deref(), "an operationId", model.scope)?.to_string());
        }
    }
    segments.push("policy".to_string());
    Ok(segments.join("/"))
}

/// ARM template resource deploying `xml` at the model's scope.
#[allow(non_snake_case)]
pub fn AxFToArmResource(model: &AxCPolicyModel, xml: &str, options: &AxCExportOptions) -> Result<AxCArmResource> {
    Ok(AxCArmResource {
        resource_type: AxFResourceType(model.scope).to_string(),
        api_version: options.api_version.clone(),
        name: AxFResourceName(model, options)?,
        properties: AxCArmPolicyProperties {
            format: AX_POLICY_FORMAT.to_string(),
            value: xml.to_string(),
        },
    })
}

/// Bicep declaration of the same resource. The document goes in a `'''` block.
#[allow(non_snake_case)]
pub fn AxFToBicep(model: &AxCPolicyModel, xml: &str, options: &AxCExportOptions) -> Result<String> {
    if xml.contains("'''") {
        return Err(AxError::validation(
            "policy XML contains ''' and cannot be embedded in a Bicep multi-line string",
        ));
    }
    let symbol = match model.scope {
        AxCPolicyScope::Global => "servicePolicy",
        AxCPolicyScope::Product => "productPolicy",
        AxCPolicyScope::Api => "apiPolicy",
        AxCPolicyScope::Operation => "operationPolicy",
    };
    let name = AxFResourceName(model, options)?;
    Ok(format!(
        "resource {} '{}@{}' = {{\n  name: '{}'\n  properties: {{\n    format: '{}'\n    value: '''\n{}\n'''\n  }}\n}}\n",
        symbol,
        AxFResourceType(model.scope),
        options.api_version,
        name,
        AX_POLICY_FORMAT,
        xml
    ))
}
