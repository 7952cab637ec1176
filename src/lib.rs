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

//! # Ax Core Library
//!
//! Ax is a compiler for API gateway policy documents. It holds a policy
//! configuration as a structured model, converts it to and from the gateway's
//! XML policy format, and checks it against a catalog of known policies before
//! it reaches a live gateway.
//!
//! ## Module Overview
//!
//! - **model**: the policy model (scope, four sections, tagged policy items)
//! - **catalog**: static registry of built-in policies with placement rules and parameter schemas
//! - **xml**: escaping, tolerant tokenizer, generator and heuristic parser
//! - **validator**: structural and semantic checks returned as data
//! - **wizard**: step-by-step editing session as pure state transitions
//! - **adapters**: contracts for the database, live gateway, fragments and named values
//! - **detection**: concurrent two-source lookup of an existing policy
//! - **service**: the compiler as a capability with fallback strategies
//! - **export**: ARM/Bicep resources and JSON export bundles
//! - **config**: compiler settings loaded from JSON or YAML
//!
//! ## Quick Start
//!
//! ```rust
//! # fn main() -> axp::Result<()> {
//! use axp::{AxCPolicyItem, AxCPolicyModel, AxCPolicyScope, AxCPolicySection, AxCSectionKind};
//!
//! let model = AxCPolicyModel::AxFNew(AxCPolicyScope::Api)
//!     .AxFWithApi("orders")
//!     .AxFWithSection(
//!         AxCSectionKind::Inbound,
//!         AxCPolicySection::AxFNew().AxFWithBase(true).AxFWithItem(AxCPolicyItem::AxFCatalog(
//!             "rl",
//!             0,
//!             "rate-limit",
//!             serde_json::json!({"calls": 100, "renewal-period": 60}),
//!         )),
//!     );
//!
//! let xml = axp::AxFToXml(&model);
//! let report = axp::AxFValidate(&model);
//! assert!(report.valid);
//!
//! let parsed = axp::AxFFromXml(&xml)?;
//! assert_eq!(parsed.AxFItemCount(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Operations that can fail return `Result<T, AxError>`. Validation findings
//! are not errors; they come back in an [`AxCValidationResult`].

#![allow(non_snake_case)]

pub mod errors;
pub mod config;
pub mod model;
pub mod catalog;
pub mod xml;
pub mod validator;
pub mod wizard;
pub mod adapters;
pub mod detection;
pub mod service;
pub mod export;

pub use errors::{AxError, Result};
pub use config::{AxCCompilerConfig, AxCCompilerConfigBuilder, AxCNamedValueStyle};
pub use model::{
    AxCAttributeValue, AxCCatalogItem, AxCConfiguration, AxCCustomXmlItem, AxCExpressionContext,
    AxCExpressionItem, AxCFragmentItem, AxCKeyVaultSecret, AxCNamedValueReference, AxCPolicyItem,
    AxCPolicyMetadata, AxCPolicyModel, AxCPolicyScope, AxCPolicySection, AxCPolicySections,
    AxCSectionKind,
};
pub use catalog::schema::{AxCParameterKind, AxCPolicyCatalogEntry, AxCPolicyCategory, AxCPolicyParameter};
pub use catalog::{AxCPolicyCatalog, AxFCatalog, AxFGetAllPolicies, AxFGetPoliciesByCategory, AxFGetPolicyById};
pub use xml::{AxCXmlGenerator, AxCXmlParser, AxFFromXml, AxFToXml};
pub use validator::{AxCValidationCode, AxCValidationIssue, AxCValidationResult, AxCValidator, AxFValidate};
pub use wizard::{AxCPolicyModelPatch, AxCWizardInstance, AxCWizardState, AxCWizardStepDef};
pub use adapters::{
    AxCApimApiAdapter, AxCDatabaseAdapter, AxCFragmentsAdapter, AxCMemoryPolicyStore, AxCNamedValuesAdapter,
    AxCPolicyTarget,
};
pub use detection::{AxCDetectionResult, AxCDetectionSource, AxCPolicyDetector};
pub use service::{AxCCompilerProvider, AxCLocalCompiler, AxCPolicyCompiler};
pub use export::{AxCExportBundle, AxCExportBundleBuilder, AxCExportOptions};
