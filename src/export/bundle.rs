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

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detection::AxFFingerprint;
use crate::errors::{AxError, Result};
use crate::export::arm::{AxCArmResource, AxCExportOptions, AxFToArmResource};
use crate::model::{AxCPolicyMetadata, AxCPolicyModel, AxCPolicyScope};
use crate::validator::{AxCValidationResult, AxFValidate};
use crate::xml::generator::AxFToXml;

pub const AX_BUNDLE_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCValidationSummary {
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    /// Distinct codes of all findings.
    pub codes: BTreeSet<String>,
}

impl From<&AxCValidationResult> for AxCValidationSummary {
    fn from(result: &AxCValidationResult) -> Self {
        Self {
            valid: result.valid,
            error_count: result.errors.len(),
            warning_count: result.warnings.len(),
            codes: result
                .errors
                .iter()
                .chain(&result.warnings)
                .map(|i| i.code.as_str().to_string())
                .collect(),
        }
    }
}

/// Everything a deployment pipeline needs for one policy document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCExportBundle {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub scope: AxCPolicyScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    pub xml: String,
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_resource: Option<AxCArmResource>,
    pub validation: AxCValidationSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AxCPolicyMetadata>,
}

impl AxCExportBundle {
    #[allow(non_snake_case)]
    pub fn AxFToJson(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AxError::internal(format!("Failed to serialize export bundle: {}", e)))
    }

    #[allow(non_snake_case)]
    pub fn AxFFromJson(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AxError::validation(format!("Invalid export bundle JSON: {}", e)))
    }
}

pub struct AxCExportBundleBuilder<'m> {
    model: &'m AxCPolicyModel,
    options: Option<AxCExportOptions>,
    require_valid: bool,
}

impl<'m> AxCExportBundleBuilder<'m> {
    #[allow(non_snake_case)]
    pub fn AxFNew(model: &'m AxCPolicyModel) -> Self {
        Self {
            model,
            options: None,
            require_valid: false,
        }
    }

    /// Adds an ARM resource for the given service.
    #[allow(non_snake_case)]
    pub fn AxFWithArm(mut self, options: AxCExportOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Refuse to build when validation reports errors.
    #[allow(non_snake_case)]
    pub fn AxFRequireValid(mut self, require_valid: bool) -> Self {
        self.require_valid = require_valid;
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFBuild(self) -> Result<AxCExportBundle> {
        let validation = AxFValidate(self.model);
        if self.require_valid && !validation.valid {
            let codes: Vec<&str> = validation.errors.iter().map(|e| e.code.as_str()).collect();
            return Err(AxError::validation(format!(
                "policy has {} validation error(s): {}",
                validation.errors.len(),
                codes.join(", ")
            )));
        }

        let xml = AxFToXml(self.model);
        let arm_resource = match &self.options {
            Some(options) => Some(AxFToArmResource(self.model, &xml, options)?),
            None => None,
        };

        Ok(AxCExportBundle {
            version: AX_BUNDLE_VERSION.to_string(),
            generated_at: Utc::now(),
            scope: self.model.scope,
            api_id: self.model.api_id.clone(),
            operation_id: self.model.operation_id.clone(),
            fingerprint: AxFFingerprint(&xml),
            xml,
            arm_resource,
            validation: AxCValidationSummary::from(&validation),
            metadata: self.model.metadata.clone(),
        })
    }
}
