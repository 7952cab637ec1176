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

//! # Policy Catalog Module
//!
//! Static registry of the built-in gateway policies. Every catalog item in a
//! policy model names one of these entries through its `policyId`; the
//! generator uses the entry's template (if any), the validator uses its
//! section support and parameter schema.
//!
//! ## Categories
//!
//! - **access-control**: rate limits, quotas, JWT validation, CORS, IP filtering
//! - **transformation**: headers, query parameters, variables, bodies, rewrites
//! - **backend**: forwarding, backend routing, retries, outbound calls, authentication
//! - **observability**: tracing, event hub logging, custom metrics
//! - **caching**: response and value caching
//! - **security**: content, parameter, header and status validation
//! - **ai-gateway**: token limits, token metrics, semantic caching, content safety
//! - **advanced**: control flow, fragments, concurrency, proxies, Dapr
//!
//! ## Usage
//!
//! ```rust
//! use axp::catalog::{AxFGetPolicyById, AxFGetPoliciesByCategory};
//! use axp::catalog::schema::AxCPolicyCategory;
//!
//! let rate_limit = AxFGetPolicyById("rate-limit").unwrap();
//! assert!(rate_limit.AxFRequiredParameters().any(|p| p.name == "calls"));
//!
//! let caching = AxFGetPoliciesByCategory(AxCPolicyCategory::Caching);
//! assert!(!caching.is_empty());
//! ```

pub mod entries;
pub mod schema;
pub(crate) mod templates;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::catalog::schema::{AxCPolicyCatalogEntry, AxCPolicyCategory};

/// Ordered set of catalog entries with id and category indexes.
#[derive(Debug)]
pub struct AxCPolicyCatalog {
    entries: Vec<AxCPolicyCatalogEntry>,
    by_id: HashMap<&'static str, usize>,
    by_category: HashMap<AxCPolicyCategory, Vec<usize>>,
}

static CATALOG: OnceLock<AxCPolicyCatalog> = OnceLock::new();

/// The process-wide built-in catalog.
#[allow(non_snake_case)]
pub fn AxFCatalog() -> &'static AxCPolicyCatalog {
    CATALOG.get_or_init(|| AxCPolicyCatalog::AxFFromEntries(entries::AxFBuiltinEntries()))
}

impl AxCPolicyCatalog {
    /// Builds a catalog. A later entry with an already-registered id is dropped.
    #[allow(non_snake_case)]
    pub fn AxFFromEntries(entries: Vec<AxCPolicyCatalogEntry>) -> Self {
        let mut kept = Vec::with_capacity(entries.len());
        let mut by_id = HashMap::new();
        let mut by_category: HashMap<AxCPolicyCategory, Vec<usize>> = HashMap::new();
        for entry in entries {
            if by_id.contains_key(entry.id) {
                log::warn!("duplicate catalog entry '{}' ignored", entry.id);
                continue;
            }
            let index = kept.len();
            by_id.insert(entry.id, index);
            by_category.entry(entry.category).or_default().push(index);
            kept.push(entry);
        }
        Self {
            entries: kept,
            by_id,
            by_category,
        }
    }

    #[allow(non_snake_case)]
    pub fn AxFGetAllPolicies(&self) -> &[AxCPolicyCatalogEntry] {
        &self.entries
    }

    #[allow(non_snake_case)]
    pub fn AxFGetPolicyById(&self, id: &str) -> Option<&AxCPolicyCatalogEntry> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    #[allow(non_snake_case)]
    pub fn AxFGetPoliciesByCategory(&self, category: AxCPolicyCategory) -> Vec<&AxCPolicyCatalogEntry> {
        self.by_category
            .get(&category)
            .map(|indexes| indexes.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Case-insensitive substring match over id, name and description.
    #[allow(non_snake_case)]
    pub fn AxFSearch(&self, query: &str) -> Vec<&AxCPolicyCatalogEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|entry| {
                entry.id.contains(&needle)
                    || entry.name.to_lowercase().contains(&needle)
                    || entry.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Categories that have at least one entry, in declaration order.
    #[allow(non_snake_case)]
    pub fn AxFCategories(&self) -> Vec<AxCPolicyCategory> {
        AxCPolicyCategory::ALL
            .into_iter()
            .filter(|c| self.by_category.contains_key(c))
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn AxFLen(&self) -> usize {
        self.entries.len()
    }
}

#[allow(non_snake_case)]
pub fn AxFGetAllPolicies() -> &'static [AxCPolicyCatalogEntry] {
    AxFCatalog().AxFGetAllPolicies()
}

#[allow(non_snake_case)]
pub fn AxFGetPoliciesByCategory(category: AxCPolicyCategory) -> Vec<&'static AxCPolicyCatalogEntry> {
    AxFCatalog().AxFGetPoliciesByCategory(category)
}

#[allow(non_snake_case)]
pub fn AxFGetPolicyById(id: &str) -> Option<&'static AxCPolicyCatalogEntry> {
    AxFCatalog().AxFGetPolicyById(id)
}

#[allow(non_snake_case)]
pub fn AxFSearchPolicies(query: &str) -> Vec<&'static AxCPolicyCatalogEntry> {
    AxFCatalog().AxFSearch(query)
}
