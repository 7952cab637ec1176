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

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::AxCCompilerConfig;
use crate::model::{AxCConfiguration, AxCPolicyScope, AxCSectionKind};
use crate::xml::escape::{AxFIsExpression, AxFParseNamedValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxCPolicyCategory {
    AccessControl,
    Transformation,
    Backend,
    Observability,
    Caching,
    Security,
    AiGateway,
    Advanced,
}

impl AxCPolicyCategory {
    pub const ALL: [AxCPolicyCategory; 8] = [
        AxCPolicyCategory::AccessControl,
        AxCPolicyCategory::Transformation,
        AxCPolicyCategory::Backend,
        AxCPolicyCategory::Observability,
        AxCPolicyCategory::Caching,
        AxCPolicyCategory::Security,
        AxCPolicyCategory::AiGateway,
        AxCPolicyCategory::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AxCPolicyCategory::AccessControl => "access-control",
            AxCPolicyCategory::Transformation => "transformation",
            AxCPolicyCategory::Backend => "backend",
            AxCPolicyCategory::Observability => "observability",
            AxCPolicyCategory::Caching => "caching",
            AxCPolicyCategory::Security => "security",
            AxCPolicyCategory::AiGateway => "ai-gateway",
            AxCPolicyCategory::Advanced => "advanced",
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFParse(s: &str) -> Option<Self> {
        AxCPolicyCategory::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for AxCPolicyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "allowed", rename_all = "lowercase")]
pub enum AxCParameterKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Whole seconds.
    Duration,
    /// A policy expression such as `@(context.Request.Url.Path)`.
    Expression,
    Enum(&'static [&'static str]),
    /// JSON array or comma-separated text.
    List,
    Object,
}

/// Why a configuration value does not fit its parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxCParameterMismatch {
    WrongType { expected: &'static str },
    NotAllowed { allowed: &'static [&'static str] },
}

impl AxCParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxCParameterKind::String => "string",
            AxCParameterKind::Integer => "integer",
            AxCParameterKind::Number => "number",
            AxCParameterKind::Boolean => "boolean",
            AxCParameterKind::Duration => "duration",
            AxCParameterKind::Expression => "expression",
            AxCParameterKind::Enum(_) => "enum",
            AxCParameterKind::List => "list",
            AxCParameterKind::Object => "object",
        }
    }

    /// Checks a configuration value against the kind.
    ///
    /// Expressions and named-value tokens are accepted for every kind since
    /// the gateway resolves them at runtime.
    #[allow(non_snake_case)]
    pub fn AxFCheck(&self, value: &Value) -> Result<(), AxCParameterMismatch> {
        if let Value::String(s) = value {
            if AxFIsExpression(s) || AxFParseNamedValue(s).is_some() {
                return Ok(());
            }
        }
        let wrong = || AxCParameterMismatch::WrongType {
            expected: self.as_str(),
        };
        match self {
            AxCParameterKind::String | AxCParameterKind::Expression => match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
                _ => Err(wrong()),
            },
            AxCParameterKind::Integer | AxCParameterKind::Duration => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
                Value::String(s) if s.trim().parse::<i64>().is_ok() => Ok(()),
                _ => Err(wrong()),
            },
            AxCParameterKind::Number => match value {
                Value::Number(_) => Ok(()),
                Value::String(s) if s.trim().parse::<f64>().is_ok() => Ok(()),
                _ => Err(wrong()),
            },
            AxCParameterKind::Boolean => match value {
                Value::Bool(_) => Ok(()),
                Value::String(s) if s == "true" || s == "false" => Ok(()),
                _ => Err(wrong()),
            },
            AxCParameterKind::Enum(allowed) => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return Err(wrong()),
                };
                if allowed.iter().any(|a| a.eq_ignore_ascii_case(&text)) {
                    Ok(())
                } else {
                    Err(AxCParameterMismatch::NotAllowed { allowed })
                }
            }
            AxCParameterKind::List => match value {
                Value::Array(_) | Value::String(_) => Ok(()),
                _ => Err(wrong()),
            },
            AxCParameterKind::Object => match value {
                Value::Object(_) | Value::Array(_) => Ok(()),
                _ => Err(wrong()),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxCPolicyParameter {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: AxCParameterKind,
    pub required: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl AxCPolicyParameter {
    #[allow(non_snake_case)]
    pub fn AxFRequired(name: &'static str, kind: AxCParameterKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFOptional(name: &'static str, kind: AxCParameterKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            default: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFWithDefault(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Renders an item's configuration as an unindented XML fragment.
pub type AxCXmlTemplate = fn(&AxCConfiguration, &AxCCompilerConfig) -> String;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxCPolicyCatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: AxCPolicyCategory,
    pub description: &'static str,
    pub supported_sections: &'static [AxCSectionKind],
    pub supported_scopes: &'static [AxCPolicyScope],
    pub parameters: Vec<AxCPolicyParameter>,
    /// Parameter carried as element text (`<set-method>POST</set-method>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_parameter: Option<&'static str>,
    #[serde(skip)]
    pub xml_template: Option<AxCXmlTemplate>,
}

impl AxCPolicyCatalogEntry {
    #[allow(non_snake_case)]
    pub fn AxFWithTextParameter(mut self, name: &'static str) -> Self {
        self.text_parameter = Some(name);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFSupportsSection(&self, kind: AxCSectionKind) -> bool {
        self.supported_sections.contains(&kind)
    }

    #[allow(non_snake_case)]
    pub fn AxFSupportsScope(&self, scope: AxCPolicyScope) -> bool {
        self.supported_scopes.contains(&scope)
    }

    #[allow(non_snake_case)]
    pub fn AxFParameter(&self, name: &str) -> Option<&AxCPolicyParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    #[allow(non_snake_case)]
    pub fn AxFRequiredParameters(&self) -> impl Iterator<Item = &AxCPolicyParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}
