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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axp::errors::{AxError, Result};
use axp::{
    AxCCompilerConfig, AxCCompilerProvider, AxCLocalCompiler, AxCPolicyCompiler, AxCPolicyModel, AxCPolicyScope,
    AxCValidationResult,
};

const XML: &str = r#"<policies><inbound><base /><rate-limit calls="100" renewal-period="60" /></inbound></policies>"#;

/// Remote compiler that is either offline or rejecting requests.
struct AxCRemoteCompiler {
    online: bool,
    calls: AtomicUsize,
}

impl AxCRemoteCompiler {
    fn new(online: bool) -> Self {
        Self {
            online,
            calls: AtomicUsize::new(0),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.online {
            Err(AxError::adapter("remote", "500 internal server error"))
        } else {
            Err(AxError::unavailable("remote", "endpoint not configured"))
        }
    }
}

#[async_trait]
impl AxCPolicyCompiler for AxCRemoteCompiler {
    fn name(&self) -> &str {
        "remote"
    }

    async fn to_xml(&self, _model: &AxCPolicyModel) -> Result<String> {
        self.fail()
    }

    async fn from_xml(&self, _xml: &str) -> Result<AxCPolicyModel> {
        self.fail()
    }

    async fn validate(&self, _model: &AxCPolicyModel) -> Result<AxCValidationResult> {
        self.fail()
    }
}

#[tokio::test]
async fn AxFTLocalCompilerRoundTrip() {
    let local = AxCLocalCompiler::AxFNew(AxCCompilerConfig::default());
    assert_eq!(local.name(), "local");

    let model = local.from_xml(XML).await.unwrap();
    assert_eq!(model.scope, AxCPolicyScope::Api);
    let xml = local.to_xml(&model).await.unwrap();
    assert!(xml.contains(r#"<rate-limit calls="100" renewal-period="60" />"#));
    assert!(local.validate(&model).await.unwrap().valid);
}

#[tokio::test]
async fn AxFTUnavailableStrategyFallsThrough() {
    let remote = Arc::new(AxCRemoteCompiler::new(false));
    let provider = AxCCompilerProvider::AxFNew()
        .AxFWithStrategy(remote.clone())
        .AxFWithStrategy(Arc::new(AxCLocalCompiler::default()));
    assert_eq!(provider.AxFStrategyNames(), vec!["remote", "local"]);

    let model = provider.AxFFromXml(XML).await.unwrap();
    let xml = provider.AxFToXml(&model).await.unwrap();
    assert!(xml.starts_with("<policies>"));
    assert!(provider.AxFValidate(&model).await.unwrap().valid);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn AxFTOtherErrorsStopTheChain() {
    let provider = AxCCompilerProvider::AxFNew()
        .AxFWithStrategy(Arc::new(AxCRemoteCompiler::new(true)))
        .AxFWithStrategy(Arc::new(AxCLocalCompiler::default()));

    let err = provider.AxFFromXml(XML).await.unwrap_err();
    assert!(matches!(err, AxError::Adapter { .. }));
}

#[tokio::test]
async fn AxFTLocalParseErrorsAreReturned() {
    let provider = AxCCompilerProvider::AxFDefault();
    assert_eq!(provider.AxFStrategyNames(), vec!["local"]);
    let err = provider.AxFFromXml("<inbound />").await.unwrap_err();
    assert!(err.is_parse());
}

#[tokio::test]
async fn AxFTEmptyProviderIsUnavailable() {
    let provider = AxCCompilerProvider::AxFNew();
    let model = AxCPolicyModel::AxFNew(AxCPolicyScope::Global);
    assert!(matches!(
        provider.AxFToXml(&model).await,
        Err(AxError::Unavailable { .. })
    ));

    let offline_only = AxCCompilerProvider::AxFNew().AxFWithStrategy(Arc::new(AxCRemoteCompiler::new(false)));
    match offline_only.AxFValidate(&model).await {
        Err(AxError::Unavailable { name, .. }) => assert_eq!(name, "provider"),
        other => panic!("expected unavailable, got {:?}", other),
    }
}
