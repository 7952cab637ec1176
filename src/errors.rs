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

//! # Ax Error Module
//!
//! This module defines the error types used throughout the Ax policy compiler.
//!
//! ## Error Handling Philosophy
//!
//! Only failures that stop an operation are errors. Structural or semantic
//! problems found in a policy model are reported as data through
//! [`crate::validator::AxCValidationResult`] and never surface here.
//!
//! ## Error Categories
//!
//! - **Parse**: Malformed XML or a document without a `<policies>` root
//! - **Validation**: Input rejected before any work was done (bad JSON model,
//!   unknown wizard step id)
//! - **Adapter**: Failures reported by an external collaborator (database,
//!   live gateway, remote compiler)
//! - **Config**: Unreadable or invalid compiler configuration
//! - **Io / Serde**: Filesystem and serialization failures
//! - **Internal**: Unexpected internal failures
//!
//! ## Usage
//!
//! ```rust
//! use axp::errors::{Result, AxError};
//!
//! fn load(xml: &str) -> Result<axp::AxCPolicyModel> {
//!     if xml.trim().is_empty() {
//!         return Err(AxError::parse("empty document", 0));
//!     }
//!     axp::AxFFromXml(xml)
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Ax.
pub type Result<T> = std::result::Result<T, AxError>;

/// Canonical error enumeration for Ax.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxError {
    /// The document is not well-formed XML or lacks a `<policies>` root.
    #[error("parse error at byte {position}: {message}")]
    Parse { message: String, position: usize },

    /// Input rejected before processing.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Failure reported by an external collaborator.
    #[error("adapter '{source_name}' failed: {message}")]
    Adapter {
        source_name: String,
        message: String,
    },

    /// A compiler strategy that cannot serve requests in this process.
    #[error("compiler '{name}' unavailable: {message}")]
    Unavailable { name: String, message: String },

    /// Invalid or unreadable compiler configuration.
    #[error("config error: {message}")]
    Config { message: String },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AxError {
    fn from(err: io::Error) -> Self {
        AxError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AxError {
    fn from(err: serde_json::Error) -> Self {
        AxError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for AxError {
    fn from(err: serde_yaml::Error) -> Self {
        AxError::Serde(err.to_string())
    }
}

impl AxError {
    /// Helper to construct parse errors.
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        AxError::Parse {
            message: message.into(),
            position,
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        AxError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct adapter errors.
    pub fn adapter(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AxError::Adapter {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct unavailable-compiler errors.
    pub fn unavailable(name: impl Into<String>, message: impl Into<String>) -> Self {
        AxError::Unavailable {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        AxError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        AxError::Internal(message.into())
    }

    /// True for parse failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, AxError::Parse { .. })
    }
}
