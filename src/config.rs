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

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AxError, Result};
use crate::model::AxCPolicyScope;

/// How named-value references are written into attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxCNamedValueStyle {
    /// `${{name}}`
    #[default]
    Dollar,
    /// `{{name}}`, the gateway's native token.
    Plain,
}

/// Settings shared by the generator and the parser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxCCompilerConfig {
    /// Spaces per nesting level in generated XML.
    pub indent_width: usize,
    /// Scope assigned to parsed models; XML carries no scope marker.
    pub default_scope: AxCPolicyScope,
    /// Parser turns numeric and boolean attribute text into JSON numbers/booleans.
    pub coerce_scalars: bool,
    pub named_value_style: AxCNamedValueStyle,
}

impl Default for AxCCompilerConfig {
    fn default() -> Self {
        AxCCompilerConfig {
            indent_width: 2,
            default_scope: AxCPolicyScope::Api,
            coerce_scalars: true,
            named_value_style: AxCNamedValueStyle::Dollar,
        }
    }
}

impl AxCCompilerConfig {
    #[allow(non_snake_case)]
    pub fn AxFIndent(&self, depth: usize) -> String {
        " ".repeat(self.indent_width * depth)
    }

    /// Loads a configuration file, dispatching on its extension.
    #[allow(non_snake_case)]
    pub fn AxFFromFile(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => AxCCompilerConfigBuilder::AxFFromYaml(&content),
            "json" => AxCCompilerConfigBuilder::AxFFromJsonStr(&content),
            other => Err(AxError::config(format!(
                "unsupported config extension '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxCCompilerConfigBuilder {
    pub indent_width: Option<usize>,
    pub default_scope: Option<AxCPolicyScope>,
    pub coerce_scalars: Option<bool>,
    pub named_value_style: Option<AxCNamedValueStyle>,
}

impl AxCCompilerConfigBuilder {
    #[allow(non_snake_case)]
    pub fn AxFBuild(self) -> AxCCompilerConfig {
        let base = AxCCompilerConfig::default();
        AxCCompilerConfig {
            indent_width: self.indent_width.unwrap_or(base.indent_width),
            default_scope: self.default_scope.unwrap_or(base.default_scope),
            coerce_scalars: self.coerce_scalars.unwrap_or(base.coerce_scalars),
            named_value_style: self.named_value_style.unwrap_or(base.named_value_style),
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFFromJson(value: &Value) -> Result<AxCCompilerConfig> {
        let builder: AxCCompilerConfigBuilder = serde_json::from_value(value.clone())
            .map_err(|e| AxError::config(format!("invalid compiler config: {}", e)))?;
        Ok(builder.AxFBuild())
    }

    #[allow(non_snake_case)]
    pub fn AxFFromJsonStr(source: &str) -> Result<AxCCompilerConfig> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| AxError::config(format!("invalid compiler config JSON: {}", e)))?;
        Self::AxFFromJson(&value)
    }

    #[allow(non_snake_case)]
    pub fn AxFFromYaml(source: &str) -> Result<AxCCompilerConfig> {
        let builder: AxCCompilerConfigBuilder = serde_yaml::from_str(source)
            .map_err(|e| AxError::config(format!("invalid compiler config YAML: {}", e)))?;
        Ok(builder.AxFBuild())
    }
}
