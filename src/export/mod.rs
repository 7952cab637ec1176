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

//! # Policy Export Module
//!
//! Packages generated policy XML for infrastructure-as-code deployment.
//!
//! ## Module Components
//!
//! - **arm**: ARM template resource and Bicep declaration for a policy at its scope
//! - **bundle**: JSON export bundle with the XML, ARM resource and validation summary
//!
//! ## Resource Types
//!
//! | scope     | resource type                                              |
//! |-----------|------------------------------------------------------------|
//! | global    | `Microsoft.ApiManagement/service/policies`                 |
//! | product   | `Microsoft.ApiManagement/service/products/policies`        |
//! | api       | `Microsoft.ApiManagement/service/apis/policies`            |
//! | operation | `Microsoft.ApiManagement/service/apis/operations/policies` |
//!
//! ## Usage
//!
//! ```rust
//! use axp::export::{AxCExportBundleBuilder, AxCExportOptions};
//!
//! let bundle = AxCExportBundleBuilder::AxFNew(&model)
//!     .AxFWithArm(AxCExportOptions::AxFNew("contoso-apim"))
//!     .AxFRequireValid(true)
//!     .AxFBuild()?;
//! std::fs::write("policy.bundle.json", bundle.AxFToJson()?)?;
//! ```

pub mod arm;
pub mod bundle;

pub use arm::{
    AxCArmPolicyProperties, AxCArmResource, AxCExportOptions, AxFResourceName, AxFResourceType,
    AxFToArmResource, AxFToBicep,
};
pub use bundle::{AxCExportBundle, AxCExportBundleBuilder, AxCValidationSummary};
