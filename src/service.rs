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

//! # Ax Compiler Service Module
//!
//! The compiler as a capability. Callers hold an [`AxCCompilerProvider`] with
//! an ordered list of strategies, typically this crate first and a remote
//! compilation API second. A strategy that answers with
//! [`AxError::Unavailable`] is skipped; any other error is returned as is.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AxCCompilerConfig;
use crate::errors::{AxError, Result};
use crate::model::AxCPolicyModel;
use crate::validator::{AxCValidationResult, AxFValidate};
use crate::xml::generator::AxFToXmlWith;
use crate::xml::parser::AxFFromXmlWith;

#[async_trait]
pub trait AxCPolicyCompiler: Send + Sync {
    fn name(&self) -> &str;

    async fn to_xml(&self, model: &AxCPolicyModel) -> Result<String>;

    async fn from_xml(&self, xml: &str) -> Result<AxCPolicyModel>;

    async fn validate(&self, model: &AxCPolicyModel) -> Result<AxCValidationResult>;
}

/// In-process compiler backed by this crate.
#[derive(Clone, Debug, Default)]
pub struct AxCLocalCompiler {
    config: AxCCompilerConfig,
}

impl AxCLocalCompiler {
    #[allow(non_snake_case)]
    pub fn AxFNew(config: AxCCompilerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AxCPolicyCompiler for AxCLocalCompiler {
    fn name(&self) -> &str {
        "local"
    }

    async fn to_xml(&self, model: &AxCPolicyModel) -> Result<String> {
        Ok(AxFToXmlWith(model, &self.config))
    }

    async fn from_xml(&self, xml: &str) -> Result<AxCPolicyModel> {
        AxFFromXmlWith(xml, &self.config)
    }

    async fn validate(&self, model: &AxCPolicyModel) -> Result<AxCValidationResult> {
        Ok(AxFValidate(model))
    }
}

#[derive(Clone, Default)]
pub struct AxCCompilerProvider {
    strategies: Vec<Arc<dyn AxCPolicyCompiler>>,
}

impl AxCCompilerProvider {
    #[allow(non_snake_case)]
    pub fn AxFNew() -> Self {
        Self::default()
    }

    /// Local compiler only.
    #[allow(non_snake_case)]
    pub fn AxFDefault() -> Self {
        Self::AxFNew().AxFWithStrategy(Arc::new(AxCLocalCompiler::default()))
    }

    /// Appends a strategy; earlier strategies are tried first.
    #[allow(non_snake_case)]
    pub fn AxFWithStrategy(mut self, strategy: Arc<dyn AxCPolicyCompiler>) -> Self {
        self.strategies.push(strategy);
        self
    }

    #[allow(non_snake_case)]
    pub fn AxFStrategyNames(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    #[allow(non_snake_case)]
    pub async fn AxFToXml(&self, model: &AxCPolicyModel) -> Result<String> {
        for strategy in &self.strategies {
            match strategy.to_xml(model).await {
                Err(AxError::Unavailable { name, message }) => skip(&name, &message),
                other => return other,
            }
        }
        Err(exhausted())
    }

    #[allow(non_snake_case)]
    pub async fn AxFFromXml(&self, xml: &str) -> Result<AxCPolicyModel> {
        for strategy in &self.strategies {
            match strategy.from_xml(xml).await {
                Err(AxError::Unavailable { name, message }) => skip(&name, &message),
                other => return other,
            }
        }
        Err(exhausted())
    }

    #[allow(non_snake_case)]
    pub async fn AxFValidate(&self, model: &AxCPolicyModel) -> Result<AxCValidationResult> {
        for strategy in &self.strategies {
            match strategy.validate(model).await {
                Err(AxError::Unavailable { name, message }) => skip(&name, &message),
                other => return other,
            }
        }
        Err(exhausted())
    }
}

fn skip(name: &str, message: &str) {
    log::info!("compiler '{}' unavailable ({}), trying the next one", name, message);
}

fn exhausted() -> AxError {
    AxError::unavailable("provider", "no compiler strategy is available")
}
