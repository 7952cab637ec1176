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

//! # Ax Detection Module
//!
//! Finds the existing policy document for a scope by asking the database and
//! the live gateway at the same time.
//!
//! ## Precedence
//!
//! | database | gateway | source     | document used |
//! |----------|---------|------------|---------------|
//! | yes      | no      | `database` | database      |
//! | no       | yes     | `apim`     | gateway       |
//! | same     | same    | `both`     | either        |
//! | differs  | differs | `both`     | gateway, `conflict = true` |
//! | no       | no      | `none`     | nothing       |
//!
//! A source that fails is logged and counted as having returned nothing.
//! A document that does not parse is still returned as raw XML.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::{AxCApimApiAdapter, AxCDatabaseAdapter, AxCPolicyTarget};
use crate::config::AxCCompilerConfig;
use crate::errors::{AxError, Result};
use crate::model::AxCPolicyModel;
use crate::xml::parser::AxFFromXmlWith;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxCDetectionSource {
    Database,
    Apim,
    Both,
    None,
}

/// Outcome of [`AxFMergeSources`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxCSourceMerge {
    pub source: AxCDetectionSource,
    pub xml: Option<String>,
    pub conflict: bool,
}

/// Applies the precedence table to the two raw documents.
///
/// Documents are compared after trimming surrounding whitespace.
#[allow(non_snake_case)]
pub fn AxFMergeSources(database: Option<&str>, apim: Option<&str>) -> AxCSourceMerge {
    match (database, apim) {
        (Some(db), Some(live)) => AxCSourceMerge {
            source: AxCDetectionSource::Both,
            xml: Some(live.to_string()),
            conflict: db.trim() != live.trim(),
        },
        (Some(db), None) => AxCSourceMerge {
            source: AxCDetectionSource::Database,
            xml: Some(db.to_string()),
            conflict: false,
        },
        (None, Some(live)) => AxCSourceMerge {
            source: AxCDetectionSource::Apim,
            xml: Some(live.to_string()),
            conflict: false,
        },
        (None, None) => AxCSourceMerge {
            source: AxCDetectionSource::None,
            xml: None,
            conflict: false,
        },
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCDetectionResult {
    pub found: bool,
    pub source: AxCDetectionSource,
    /// The document to edit.
    pub xml: Option<String>,
    /// Parsed form of `xml`, when it parsed.
    pub policy_model: Option<AxCPolicyModel>,
    pub database_xml: Option<String>,
    pub apim_xml: Option<String>,
    pub database_model: Option<AxCPolicyModel>,
    pub apim_model: Option<AxCPolicyModel>,
    /// Both sources returned documents with different content.
    pub conflict: bool,
    /// BLAKE3 hex digest of `xml`.
    pub fingerprint: Option<String>,
    pub detected_at: DateTime<Utc>,
}

/// BLAKE3 hex digest of a policy document.
#[allow(non_snake_case)]
pub fn AxFFingerprint(xml: &str) -> String {
    blake3::hash(xml.as_bytes()).to_hex().to_string()
}

#[derive(Default)]
pub struct AxCPolicyDetector<'a> {
    database: Option<&'a dyn AxCDatabaseAdapter>,
    apim: Option<&'a dyn AxCApimApiAdapter>,
    config: AxCCompilerConfig,
}

impl<'a> AxCPolicyDetector<'a> {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn AxFWithDatabase(mut self, database: &'a dyn AxCDatabaseAdapter) -> Self {
        self.database = Some(database);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithApim(mut self, apim: &'a dyn AxCApimApiAdapter) -> Self {
        self.apim = Some(apim);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFWithConfig(mut self, config: AxCCompilerConfig) -> Self {
        self.config = config;
        self
    }

    async fn fetch_database(&self, target: &AxCPolicyTarget) -> Option<String> {
        let adapter = self.database?;
        match adapter.get_policy(target).await {
            Ok(xml) => xml.filter(|x| !x.trim().is_empty()),
            Err(e) => {
                log::warn!("database lookup for {} failed: {}", target, e);
                None
            }
        }
    }

    async fn fetch_apim(&self, target: &AxCPolicyTarget) -> Option<String> {
        let adapter = self.apim?;
        match adapter.get_policy(target).await {
            Ok(xml) => xml.filter(|x| !x.trim().is_empty()),
            Err(e) => {
                log::warn!("gateway lookup for {} failed: {}", target, e);
                None
            }
        }
    }

    fn parse(&self, label: &str, xml: Option<&str>, target: &AxCPolicyTarget) -> Option<AxCPolicyModel> {
        match AxFFromXmlWith(xml?, &self.config) {
            Ok(mut model) => {
                model.scope = target.scope;
                model.api_id = target.api_id.clone();
                model.operation_id = target.operation_id.clone();
                Some(model)
            }
            Err(e) => {
                log::warn!("{} policy for {} does not parse: {}", label, target, e);
                None
            }
        }
    }

    /// Queries both sources concurrently and merges the results.
    #[allow(non_snake_case)]
    pub async fn AxFDetect(&self, target: &AxCPolicyTarget) -> AxCDetectionResult {
        let (database_xml, apim_xml) =
            futures::future::join(self.fetch_database(target), self.fetch_apim(target)).await;

        let merge = AxFMergeSources(database_xml.as_deref(), apim_xml.as_deref());
        if merge.conflict {
            log::info!("policy for {} differs between database and gateway, using the gateway copy", target);
        }

        let database_model = self.parse("database", database_xml.as_deref(), target);
        let apim_model = self.parse("gateway", apim_xml.as_deref(), target);
        let policy_model = match merge.source {
            AxCDetectionSource::Database => database_model.clone(),
            AxCDetectionSource::Apim | AxCDetectionSource::Both => apim_model.clone(),
            AxCDetectionSource::None => None,
        };

        AxCDetectionResult {
            found: merge.xml.is_some(),
            source: merge.source,
            fingerprint: merge.xml.as_deref().map(AxFFingerprint),
            xml: merge.xml,
            policy_model,
            database_xml,
            apim_xml,
            database_model,
            apim_model,
            conflict: merge.conflict,
            detected_at: Utc::now(),
        }
    }

    /// Persists a document through the database adapter.
    #[allow(non_snake_case)]
    pub async fn AxFStorePolicy(&self, target: &AxCPolicyTarget, xml: &str) -> Result<()> {
        let adapter = self
            .database
            .ok_or_else(|| AxError::adapter("database", "no database adapter configured"))?;
        adapter.save_policy(target, xml).await
    }
}

/// Detects with default settings.
#[allow(non_snake_case)]
pub async fn AxFDetectPolicy(
    target: &AxCPolicyTarget,
    database: Option<&dyn AxCDatabaseAdapter>,
    apim: Option<&dyn AxCApimApiAdapter>,
) -> AxCDetectionResult {
    let mut detector = AxCPolicyDetector::AxFNew();
    detector.database = database;
    detector.apim = apim;
    detector.AxFDetect(target).await
}
