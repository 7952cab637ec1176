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

//! # Ax Wizard Module
//!
//! Editing session over a policy model, stepping through a fixed sequence.
//!
//! [`AxCWizardState`] is a plain value; every transition consumes it and
//! returns the next state, so transitions can be tested in isolation.
//! [`AxCWizardInstance`] wraps one state for callers that prefer `&mut self`.
//!
//! `current_step` is not bounded by the step table. Moving past the last step
//! is a valid state that callers read as "finished".

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{AxCPolicyMetadata, AxCPolicyModel, AxCPolicyScope, AxCPolicySections};
use crate::validator::{AxCValidationResult, AxFValidate};
use crate::xml::generator::AxFToXml;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AxCWizardStepDef {
    pub id: &'static str,
    pub order: usize,
    pub required: bool,
    pub title: &'static str,
    pub description: &'static str,
}

const fn step(
    id: &'static str,
    order: usize,
    required: bool,
    title: &'static str,
    description: &'static str,
) -> AxCWizardStepDef {
    AxCWizardStepDef {
        id,
        order,
        required,
        title,
        description,
    }
}

const STEPS: [AxCWizardStepDef; 12] = [
    step("scope-selection", 0, true, "Scope", "Choose global, product, API or operation scope."),
    step("policy-detection", 1, false, "Existing policy", "Load a policy already stored or deployed for the scope."),
    step("section-selection", 2, true, "Sections", "Pick the pipeline sections to configure."),
    step("policy-selection", 3, true, "Policies", "Add policies from the catalog."),
    step("policy-configuration", 4, true, "Configuration", "Fill in policy parameters."),
    step("fragment-selection", 5, false, "Fragments", "Include reusable policy fragments."),
    step("named-values", 6, false, "Named values", "Reference gateway-managed secrets and settings."),
    step("external-calls", 7, false, "External calls", "Configure send-request calls."),
    step("advanced-custom", 8, false, "Advanced", "Add custom XML and inline expressions."),
    step("ordering", 9, false, "Ordering", "Arrange policies within each section."),
    step("validation", 10, true, "Validation", "Check the policy for errors."),
    step("review-export", 11, true, "Review and export", "Review the XML and export it."),
];

/// The fixed step table.
#[allow(non_snake_case)]
pub fn AxFSteps() -> &'static [AxCWizardStepDef] {
    &STEPS
}

#[allow(non_snake_case)]
pub fn AxFStepById(id: &str) -> Option<&'static AxCWizardStepDef> {
    STEPS.iter().find(|s| s.id == id)
}

/// Distinguishes an absent field from an explicit `null`.
fn explicit<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Top-level fields to replace in the model. Absent fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicyModelPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<AxCPolicyScope>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub api_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<Option<String>>,
    /// Present sections replace the model's sections of the same name.
    /// Absent or `null` sections are left alone, so a patch cannot remove one;
    /// start a new state with `AxFFromModel` for that.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<AxCPolicySections>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AxCPolicyMetadata>,
}

impl AxCPolicyModelPatch {
    #[allow(non_snake_case)]
    pub fn AxFWithScope(mut self, scope: AxCPolicyScope) -> Self {
        self.scope = Some(scope);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithApiId(mut self, api_id: Option<&str>) -> Self {
        self.api_id = Some(api_id.map(str::to_string));
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithOperationId(mut self, operation_id: Option<&str>) -> Self {
        self.operation_id = Some(operation_id.map(str::to_string));
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithSections(mut self, sections: AxCPolicySections) -> Self {
        self.sections = Some(sections);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithMetadata(mut self, metadata: AxCPolicyMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCWizardState {
    pub current_step: usize,
    pub policy_model: AxCPolicyModel,
    #[serde(default)]
    pub completed_steps: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<AxCValidationResult>,
}

impl AxCWizardState {
    #[allow(non_snake_case)]
    pub fn AxFStart(scope: AxCPolicyScope, api_id: Option<&str>, operation_id: Option<&str>) -> Self {
        let mut model = AxCPolicyModel::AxFNew(scope);
        model.api_id = api_id.map(str::to_string);
        model.operation_id = operation_id.map(str::to_string);
        Self::AxFFromModel(model)
    }

    #[allow(non_snake_case)]
    pub fn AxFFromModel(model: AxCPolicyModel) -> Self {
        Self {
            current_step: 0,
            policy_model: model,
            completed_steps: BTreeSet::new(),
            validation_result: None,
        }
    }

    /// Shallow merge of `patch`; drops the cached validation result.
    #[allow(non_snake_case)]
    pub fn AxFUpdatePolicyModel(mut self, patch: AxCPolicyModelPatch) -> Self {
        let model = &mut self.policy_model;
        if let Some(scope) = patch.scope {
            model.scope = scope;
        }
        if let Some(api_id) = patch.api_id {
            model.api_id = api_id;
        }
        if let Some(operation_id) = patch.operation_id {
            model.operation_id = operation_id;
        }
        if let Some(sections) = patch.sections {
            model.sections.AxFMerge(sections);
        }
        if let Some(metadata) = patch.metadata {
            model.metadata = Some(metadata);
        }
        self.validation_result = None;
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFNextStep(mut self) -> Self {
        self.current_step = self.current_step.saturating_add(1);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFPreviousStep(mut self) -> Self {
        self.current_step = self.current_step.saturating_sub(1);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFGoToStep(mut self, index: usize) -> Self {
        self.current_step = index;
        self
    }

    /// Records `step_id` as completed. Repeating it is a no-op.
    #[allow(non_snake_case)]
    pub fn AxFCompleteStep(mut self, step_id: &str) -> Self {
        if AxFStepById(step_id).is_none() {
            log::debug!("completing step '{}' which is not in the step table", step_id);
        }
        self.completed_steps.insert(step_id.to_string());
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFValidate(mut self) -> Self {
        self.validation_result = Some(AxFValidate(&self.policy_model));
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFToXml(&self) -> String {
        AxFToXml(&self.policy_model)
    }

    #[allow(non_snake_case)]
    pub fn AxFCurrentStepDef(&self) -> Option<&'static AxCWizardStepDef> {
        STEPS.get(self.current_step)
    }

    #[allow(non_snake_case)]
    pub fn AxFIsFinished(&self) -> bool {
        self.current_step >= STEPS.len()
    }

    #[allow(non_snake_case)]
    pub fn AxFIsStepCompleted(&self, step_id: &str) -> bool {
        self.completed_steps.contains(step_id)
    }

    /// Completed required steps over all required steps, in `[0, 1]`.
    #[allow(non_snake_case)]
    pub fn AxFProgress(&self) -> f64 {
        let required: Vec<&AxCWizardStepDef> = STEPS.iter().filter(|s| s.required).collect();
        let done = required
            .iter()
            .filter(|s| self.completed_steps.contains(s.id))
            .count();
        done as f64 / required.len() as f64
    }

    /// True when the last validation run found no errors.
    #[allow(non_snake_case)]
    pub fn AxFCanExport(&self) -> bool {
        self.validation_result
            .as_ref()
            .map(|r| r.valid)
            .unwrap_or(false)
    }
}

/// Mutable handle over a [`AxCWizardState`], one per editing session.
#[derive(Clone, Debug, Default)]
pub struct AxCWizardInstance {
    state: AxCWizardState,
}

impl AxCWizardInstance {
    #[allow(non_snake_case)]
    pub fn AxFStart(scope: AxCPolicyScope, api_id: Option<&str>, operation_id: Option<&str>) -> Self {
        Self {
            state: AxCWizardState::AxFStart(scope, api_id, operation_id),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFFromModel(model: AxCPolicyModel) -> Self {
        Self {
            state: AxCWizardState::AxFFromModel(model),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFState(&self) -> &AxCWizardState {
        &self.state
    }

    #[allow(non_snake_case)]
    pub fn AxFModel(&self) -> &AxCPolicyModel {
        &self.state.policy_model
    }

    #[allow(non_snake_case)]
    pub fn AxFIntoState(self) -> AxCWizardState {
        self.state
    }

    fn apply(&mut self, transition: impl FnOnce(AxCWizardState) -> AxCWizardState) {
        let state = std::mem::take(&mut self.state);
        self.state = transition(state);
    }

    #[allow(non_snake_case)]
    pub fn AxFUpdatePolicyModel(&mut self, patch: AxCPolicyModelPatch) {
        self.apply(|s| s.AxFUpdatePolicyModel(patch));
    }

    #[allow(non_snake_case)]
    pub fn AxFNextStep(&mut self) {
        self.apply(AxCWizardState::AxFNextStep);
    }

    #[allow(non_snake_case)]
    pub fn AxFPreviousStep(&mut self) {
        self.apply(AxCWizardState::AxFPreviousStep);
    }

    #[allow(non_snake_case)]
    pub fn AxFGoToStep(&mut self, index: usize) {
        self.apply(|s| s.AxFGoToStep(index));
    }

    #[allow(non_snake_case)]
    pub fn AxFCompleteStep(&mut self, step_id: &str) {
        self.apply(|s| s.AxFCompleteStep(step_id));
    }

    /// Validates the current model and caches the result.
    #[allow(non_snake_case)]
    pub fn AxFValidate(&mut self) -> &AxCValidationResult {
        let result = AxFValidate(&self.state.policy_model);
        self.state.validation_result.insert(result)
    }

    #[allow(non_snake_case)]
    pub fn AxFToXml(&self) -> String {
        self.state.AxFToXml()
    }
}
