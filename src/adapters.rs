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

//! # Ax Adapters Module
//!
//! Contracts for the external stores the compiler talks to. Concrete
//! database and management-API clients live outside this crate; the
//! in-memory store here backs tests and offline tooling.
//!
//! - [`AxCDatabaseAdapter`]: cached policy documents, read and write
//! - [`AxCApimApiAdapter`]: documents deployed on a live gateway, read only
//! - [`AxCFragmentsAdapter`]: policy fragment lookup
//! - [`AxCNamedValuesAdapter`]: named value lookup
//!
//! Timeouts and retries are the implementations' concern.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::Result;
use crate::model::{AxCPolicyModel, AxCPolicyScope};

/// Which policy document an adapter call is about.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicyTarget {
    pub scope: AxCPolicyScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl AxCPolicyTarget {
    #[allow(non_snake_case)]
    pub fn AxFNew(scope: AxCPolicyScope, api_id: Option<&str>, operation_id: Option<&str>) -> Self {
        Self {
            scope,
            api_id: api_id.map(str::to_string),
            operation_id: operation_id.map(str::to_string),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFFromModel(model: &AxCPolicyModel) -> Self {
        Self {
            scope: model.scope,
            api_id: model.api_id.clone(),
            operation_id: model.operation_id.clone(),
        }
    }

    /// Stable storage key, e.g. `operation/orders/get-order`.
    #[allow(non_snake_case)]
    pub fn AxFKey(&self) -> String {
        let mut key = self.scope.as_str().to_string();
        for id in [&self.api_id, &self.operation_id].into_iter().flatten() {
            key.push('/');
            key.push_str(id);
        }
        key
    }
}

impl fmt::Display for AxCPolicyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.AxFKey())
    }
}

#[async_trait]
pub trait AxCDatabaseAdapter: Send + Sync {
    async fn get_policy(&self, target: &AxCPolicyTarget) -> Result<Option<String>>;

    async fn save_policy(&self, target: &AxCPolicyTarget, xml: &str) -> Result<()>;
}

#[async_trait]
pub trait AxCApimApiAdapter: Send + Sync {
    async fn get_policy(&self, target: &AxCPolicyTarget) -> Result<Option<String>>;
}

#[async_trait]
pub trait AxCFragmentsAdapter: Send + Sync {
    async fn fragment_exists(&self, fragment_id: &str) -> Result<bool>;

    /// Fragment body, or `None` when it does not exist.
    async fn get_fragment(&self, fragment_id: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait AxCNamedValuesAdapter: Send + Sync {
    async fn named_value_exists(&self, name: &str) -> Result<bool>;

    /// Resolved value, or `None` when it does not exist.
    async fn resolve_named_value(&self, name: &str) -> Result<Option<String>>;
}

/// References a model depends on that the adapters could not find.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCReferenceReport {
    pub missing_fragments: BTreeSet<String>,
    pub missing_named_values: BTreeSet<String>,
}

impl AxCReferenceReport {
    #[allow(non_snake_case)]
    pub fn AxFIsComplete(&self) -> bool {
        self.missing_fragments.is_empty() && self.missing_named_values.is_empty()
    }
}

/// Checks every fragment and named value referenced by `model`.
///
/// Lookups run sequentially; the first adapter error is returned.
#[allow(non_snake_case)]
pub async fn AxFCheckReferences(
    model: &AxCPolicyModel,
    fragments: &dyn AxCFragmentsAdapter,
    named_values: &dyn AxCNamedValuesAdapter,
) -> Result<AxCReferenceReport> {
    let mut report = AxCReferenceReport::default();
    for fragment_id in model.AxFFragmentIds() {
        if !fragments.fragment_exists(&fragment_id).await? {
            report.missing_fragments.insert(fragment_id);
        }
    }
    for name in model.AxFNamedValueReferences() {
        if !named_values.named_value_exists(&name).await? {
            report.missing_named_values.insert(name);
        }
    }
    Ok(report)
}

/// In-memory store implementing every adapter contract.
#[derive(Debug, Default)]
pub struct AxCMemoryPolicyStore {
    policies: RwLock<HashMap<String, String>>,
    fragments: RwLock<HashMap<String, String>>,
    named_values: RwLock<HashMap<String, String>>,
}

impl AxCMemoryPolicyStore {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub async fn AxFInsertPolicy(&self, target: &AxCPolicyTarget, xml: impl Into<String>) {
        self.policies.write().await.insert(target.AxFKey(), xml.into());
    }

    #[allow(non_snake_case)]
    pub async fn AxFInsertFragment(&self, fragment_id: impl Into<String>, xml: impl Into<String>) {
        self.fragments.write().await.insert(fragment_id.into(), xml.into());
    }

    #[allow(non_snake_case)]
    pub async fn AxFInsertNamedValue(&self, name: impl Into<String>, value: impl Into<String>) {
        self.named_values.write().await.insert(name.into(), value.into());
    }

    #[allow(non_snake_case)]
    pub async fn AxFPolicyCount(&self) -> usize {
        self.policies.read().await.len()
    }
}

#[async_trait]
impl AxCDatabaseAdapter for AxCMemoryPolicyStore {
    async fn get_policy(&self, target: &AxCPolicyTarget) -> Result<Option<String>> {
        Ok(self.policies.read().await.get(&target.AxFKey()).cloned())
    }

    async fn save_policy(&self, target: &AxCPolicyTarget, xml: &str) -> Result<()> {
        self.policies
            .write()
            .await
            .insert(target.AxFKey(), xml.to_string());
        Ok(())
    }
}

#[async_trait]
impl AxCApimApiAdapter for AxCMemoryPolicyStore {
    async fn get_policy(&self, target: &AxCPolicyTarget) -> Result<Option<String>> {
        Ok(self.policies.read().await.get(&target.AxFKey()).cloned())
    }
}

#[async_trait]
impl AxCFragmentsAdapter for AxCMemoryPolicyStore {
    async fn fragment_exists(&self, fragment_id: &str) -> Result<bool> {
        Ok(self.fragments.read().await.contains_key(fragment_id))
    }

    async fn get_fragment(&self, fragment_id: &str) -> Result<Option<String>> {
        Ok(self.fragments.read().await.get(fragment_id).cloned())
    }
}

#[async_trait]
impl AxCNamedValuesAdapter for AxCMemoryPolicyStore {
    async fn named_value_exists(&self, name: &str) -> Result<bool> {
        Ok(self.named_values.read().await.contains_key(name))
    }

    async fn resolve_named_value(&self, name: &str) -> Result<Option<String>> {
        Ok(self.named_values.read().await.get(name).cloned())
    }
}
