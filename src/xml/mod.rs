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

//! # XML Codec Module
//!
//! Conversion between [`crate::model::AxCPolicyModel`] and the gateway's XML
//! policy document.
//!
//! ## Document Layout
//!
//! ```xml
//! <policies>
//!   <inbound>
//!     <base />
//!     <rate-limit calls="100" renewal-period="60" />
//!   </inbound>
//!   <backend>
//!     <forward-request />
//!   </backend>
//!   <outbound />
//!   <on-error />
//! </policies>
//! ```
//!
//! ## Components
//!
//! - **escape**: entity escaping, named-value tokens (`${{name}}`), expression detection
//! - **tree**: tolerant XML tokenizer and pretty serializer
//! - **send_request**: the nested `send-request` body
//! - **generator**: deterministic model to XML rendering
//! - **parser**: heuristic XML to model reconstruction
//!
//! The generator is total and consults the catalog for templates. The parser
//! works from element shape only, because it must accept documents the
//! generator never produced.

pub mod escape;
pub mod generator;
pub mod parser;
pub mod send_request;
pub mod tree;

pub use generator::{AxCXmlGenerator, AxFToXml, AxFToXmlWith};
pub use parser::{AxCElementShape, AxCXmlParser, AxFClassifyElement, AxFFromXml, AxFFromXmlWith};
