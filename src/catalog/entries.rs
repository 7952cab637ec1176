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

use crate::catalog::schema::{
    AxCParameterKind as K, AxCPolicyCatalogEntry, AxCPolicyCategory as C, AxCPolicyParameter as P,
};
use crate::catalog::templates;
use crate::model::AxCPolicyScope as Scope;
use crate::model::AxCSectionKind as S;

const ALL_SECTIONS: &[S] = &[S::Inbound, S::Backend, S::Outbound, S::OnError];
const INBOUND: &[S] = &[S::Inbound];
const OUTBOUND: &[S] = &[S::Outbound];
const BACKEND: &[S] = &[S::Backend];
const INBOUND_BACKEND: &[S] = &[S::Inbound, S::Backend];
const INBOUND_ON_ERROR: &[S] = &[S::Inbound, S::OnError];
const NOT_BACKEND: &[S] = &[S::Inbound, S::Outbound, S::OnError];

const ALL_SCOPES: &[Scope] = &[Scope::Global, Scope::Product, Scope::Api, Scope::Operation];
const API_SCOPES: &[Scope] = &[Scope::Api, Scope::Operation];
const PRODUCT_AND_BELOW: &[Scope] = &[Scope::Product, Scope::Api, Scope::Operation];

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE"];
const EXISTS_ACTIONS: &[&str] = &["override", "skip", "append", "delete"];
const CONTENT_ACTIONS: &[&str] = &["ignore", "prevent", "detect"];
const CACHING_TYPES: &[&str] = &["internal", "external", "prefer-external"];

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &'static str,
    name: &'static str,
    category: C,
    description: &'static str,
    supported_sections: &'static [S],
    supported_scopes: &'static [Scope],
    parameters: Vec<P>,
    xml_template: Option<crate::catalog::schema::AxCXmlTemplate>,
) -> AxCPolicyCatalogEntry {
    AxCPolicyCatalogEntry {
        id,
        name,
        category,
        description,
        supported_sections,
        supported_scopes,
        parameters,
        text_parameter: None,
        xml_template,
    }
}

#[allow(non_snake_case)]
pub fn AxFBuiltinEntries() -> Vec<AxCPolicyCatalogEntry> {
    let mut entries = Vec::new();
    entries.extend(access_control());
    entries.extend(transformation());
    entries.extend(backend());
    entries.extend(observability());
    entries.extend(caching());
    entries.extend(security());
    entries.extend(ai_gateway());
    entries.extend(advanced());
    entries
}

fn access_control() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "check-header",
            "Check HTTP header",
            C::AccessControl,
            "Enforces that a request has a specified HTTP header.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("name", K::String, "Header to check."),
                P::AxFRequired("failed-check-httpcode", K::Integer, "Status code returned when the check fails."),
                P::AxFRequired("failed-check-error-message", K::String, "Error message returned when the check fails."),
                P::AxFRequired("ignore-case", K::Boolean, "Compare header values case-insensitively."),
                P::AxFOptional("values", K::List, "Allowed header values."),
            ],
            Some(templates::check_header),
        ),
        entry(
            "rate-limit",
            "Limit call rate by subscription",
            C::AccessControl,
            "Prevents API usage spikes by limiting the call rate per subscription.",
            INBOUND,
            PRODUCT_AND_BELOW,
            vec![
                P::AxFRequired("calls", K::Integer, "Maximum calls allowed during the renewal period."),
                P::AxFRequired("renewal-period", K::Duration, "Window length in seconds."),
                P::AxFOptional("retry-after-header-name", K::String, "Response header carrying the retry interval."),
                P::AxFOptional("retry-after-variable-name", K::String, "Variable storing the retry interval."),
                P::AxFOptional("remaining-calls-header-name", K::String, "Response header carrying the remaining calls."),
                P::AxFOptional("remaining-calls-variable-name", K::String, "Variable storing the remaining calls."),
                P::AxFOptional("total-calls-header-name", K::String, "Response header carrying the limit."),
            ],
            None,
        ),
        entry(
            "rate-limit-by-key",
            "Limit call rate by key",
            C::AccessControl,
            "Limits the call rate per arbitrary key, typically an expression.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("calls", K::Integer, "Maximum calls allowed during the renewal period."),
                P::AxFRequired("renewal-period", K::Duration, "Window length in seconds."),
                P::AxFRequired("counter-key", K::Expression, "Key used for rate limiting."),
                P::AxFOptional("increment-condition", K::Expression, "Whether the request counts toward the limit."),
                P::AxFOptional("increment-count", K::Integer, "Amount added to the counter per request.").AxFWithDefault("1"),
                P::AxFOptional("retry-after-header-name", K::String, "Response header carrying the retry interval."),
                P::AxFOptional("remaining-calls-header-name", K::String, "Response header carrying the remaining calls."),
            ],
            None,
        ),
        entry(
            "quota",
            "Set usage quota by subscription",
            C::AccessControl,
            "Enforces a renewable call volume or bandwidth quota per subscription.",
            INBOUND,
            PRODUCT_AND_BELOW,
            vec![
                P::AxFOptional("calls", K::Integer, "Maximum calls during the renewal period."),
                P::AxFOptional("bandwidth", K::Integer, "Maximum kilobytes during the renewal period."),
                P::AxFRequired("renewal-period", K::Duration, "Quota period in seconds."),
            ],
            None,
        ),
    ]
}

fn transformation() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "set-header",
            "Set HTTP header",
            C::Transformation,
            "Assigns a value to an existing header or adds a new one.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("name", K::String, "Header name."),
                P::AxFOptional("exists-action", K::Enum(EXISTS_ACTIONS), "Action when the header already exists.").AxFWithDefault("override"),
                P::AxFOptional("value", K::String, "Header value."),
            ],
            None,
        ),
        entry(
            "set-query-parameter",
            "Set query string parameter",
            C::Transformation,
            "Adds, replaces or deletes a request query string parameter.",
            INBOUND_BACKEND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("name", K::String, "Parameter name."),
                P::AxFOptional("exists-action", K::Enum(EXISTS_ACTIONS), "Action when the parameter already exists."),
                P::AxFOptional("value", K::String, "Parameter value."),
            ],
            None,
        ),
        entry(
            "set-variable",
            "Set variable",
            C::Transformation,
            "Persists a value in a named context variable for later access.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("name", K::String, "Variable name."),
                P::AxFRequired("value", K::Expression, "Value or expression assigned to the variable."),
            ],
            None,
        ),
        entry(
            "set-body",
            "Set body",
            C::Transformation,
            "Sets the message body of a request or response.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("value", K::Expression, "Literal body or expression."),
                P::AxFOptional("template", K::Enum(&["liquid"]), "Templating mode."),
                P::AxFOptional("xsi-nil", K::Enum(&["blank", "null"]), "Handling of nil elements."),
            ],
            Some(templates::set_body),
        )
        .AxFWithTextParameter("value"),
        entry(
            "set-method",
            "Set request method",
            C::Transformation,
            "Changes the HTTP method of the request.",
            INBOUND_ON_ERROR,
            ALL_SCOPES,
            vec![P::AxFRequired("method", K::Enum(HTTP_METHODS), "HTTP method.")],
            Some(templates::set_method),
        )
        .AxFWithTextParameter("method"),
        entry(
            "set-status",
            "Set status code",
            C::Transformation,
            "Sets the HTTP status code of the response.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("code", K::Integer, "Status code."),
                P::AxFOptional("reason", K::String, "Reason phrase."),
            ],
            None,
        ),
        entry(
            "rewrite-uri",
            "Rewrite URL",
            C::Transformation,
            "Converts a request URL from its public form to the form the backend expects.",
            INBOUND,
            API_SCOPES,
            vec![
                P::AxFRequired("template", K::String, "Backend URL template."),
                P::AxFOptional("copy-unmatched-params", K::Boolean, "Forward query parameters absent from the template.").AxFWithDefault("true"),
            ],
            None,
        ),
        entry(
            "find-and-replace",
            "Find and replace string in body",
            C::Transformation,
            "Finds a substring in the body and replaces it.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("from", K::String, "Text to find."),
                P::AxFRequired("to", K::String, "Replacement text."),
            ],
            None,
        ),
    ]
}

fn backend() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "forward-request",
            "Forward request",
            C::Backend,
            "Forwards the incoming request to the backend service.",
            BACKEND,
            ALL_SCOPES,
            vec![
                P::AxFOptional("timeout", K::Duration, "Seconds to wait for the backend.").AxFWithDefault("300"),
                P::AxFOptional("follow-redirects", K::Boolean, "Follow backend redirects."),
                P::AxFOptional("buffer-request-body", K::Boolean, "Buffer the request body for retries."),
                P::AxFOptional("buffer-response", K::Boolean, "Buffer the response."),
                P::AxFOptional("fail-on-error-status-code", K::Boolean, "Treat 4xx/5xx as errors."),
            ],
            None,
        ),
        entry(
            "set-backend-service",
            "Set backend service",
            C::Backend,
            "Redirects the request to a different backend.",
            INBOUND_BACKEND,
            ALL_SCOPES,
            vec![
                P::AxFOptional("base-url", K::String, "New backend base URL."),
                P::AxFOptional("backend-id", K::String, "Identifier of a configured backend."),
            ],
            None,
        ),
        entry(
            "send-request",
            "Send request",
            C::Backend,
            "Sends a request to a URL and stores the response in a context variable.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFOptional("mode", K::Enum(&["new", "copy"]), "Start from a new or a copied request.").AxFWithDefault("new"),
                P::AxFOptional("url", K::String, "Target URL or backend base URL."),
                P::AxFOptional("setUrl", K::String, "Explicit request URL, or true to send to 'url'."),
                P::AxFOptional("method", K::Enum(HTTP_METHODS), "HTTP method."),
                P::AxFOptional("headers", K::Object, "Headers as {name, value} objects or a name-to-value map."),
                P::AxFOptional("body", K::Expression, "Request body."),
                P::AxFOptional("timeout", K::Duration, "Seconds to wait for the response."),
                P::AxFOptional("ignoreErrors", K::Boolean, "Continue when the call fails."),
                P::AxFRequired("responseVariableName", K::String, "Variable receiving the response."),
            ],
            None,
        ),
        entry(
            "authentication-managed-identity",
            "Authenticate with managed identity",
            C::Backend,
            "Acquires a token with the gateway's managed identity for the backend.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("resource", K::String, "Application id of the target resource."),
                P::AxFOptional("client-id", K::String, "User-assigned identity client id."),
                P::AxFOptional("output-token-variable-name", K::String, "Variable receiving the token."),
                P::AxFOptional("ignore-error", K::Boolean, "Continue when token acquisition fails."),
            ],
            None,
        ),
    ]
}

fn observability() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "trace",
            "Trace",
            C::Observability,
            "Adds custom traces to request tracing output and Application Insights.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("source", K::String, "Trace source shown in the output."),
                P::AxFOptional("severity", K::Enum(&["verbose", "information", "error"]), "Trace severity.").AxFWithDefault("verbose"),
                P::AxFRequired("message", K::Expression, "Message to log."),
            ],
            Some(templates::trace),
        ),
        entry(
            "log-to-eventhub",
            "Log to event hub",
            C::Observability,
            "Sends messages to an event hub through a logger entity.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("logger-id", K::String, "Logger registered with the gateway."),
                P::AxFOptional("partition-id", K::String, "Partition index."),
                P::AxFOptional("partition-key", K::String, "Partition key."),
                P::AxFRequired("message", K::Expression, "Message to send."),
            ],
            Some(templates::log_to_eventhub),
        )
        .AxFWithTextParameter("message"),
    ]
}

fn caching() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "cache-lookup",
            "Get from cache",
            C::Caching,
            "Looks up a cached response and returns it when available.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("vary-by-developer", K::Boolean, "Cache per developer."),
                P::AxFRequired("vary-by-developer-groups", K::Boolean, "Cache per developer group."),
                P::AxFOptional("caching-type", K::Enum(CACHING_TYPES), "Cache to use."),
                P::AxFOptional("downstream-caching-type", K::Enum(&["none", "private", "public"]), "Downstream caching."),
                P::AxFOptional("must-revalidate", K::Boolean, "Add must-revalidate to Cache-Control."),
                P::AxFOptional("allow-private-response-caching", K::Boolean, "Cache requests with Authorization headers."),
            ],
            None,
        ),
        entry(
            "cache-store",
            "Store to cache",
            C::Caching,
            "Caches responses according to the specified settings.",
            OUTBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("duration", K::Duration, "Time to live in seconds."),
                P::AxFOptional("cache-response", K::Boolean, "Cache the current response."),
            ],
            None,
        ),
        entry(
            "cache-lookup-value",
            "Get value from cache",
            C::Caching,
            "Retrieves a cached item by key into a variable.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("key", K::String, "Cache key."),
                P::AxFRequired("variable-name", K::String, "Variable receiving the value."),
                P::AxFOptional("default-value", K::String, "Value used on a cache miss."),
                P::AxFOptional("caching-type", K::Enum(CACHING_TYPES), "Cache to use."),
            ],
            None,
        ),
        entry(
            "cache-store-value",
            "Store value in cache",
            C::Caching,
            "Stores an item in the cache by key.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("key", K::String, "Cache key."),
                P::AxFRequired("value", K::Expression, "Value to cache."),
                P::AxFRequired("duration", K::Duration, "Time to live in seconds."),
                P::AxFOptional("caching-type", K::Enum(CACHING_TYPES), "Cache to use."),
            ],
            None,
        ),
    ]
}

fn security() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "validate-content",
            "Validate content",
            C::Security,
            "Validates the size or content of a request or response body.",
            NOT_BACKEND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("unspecified-content-type-action", K::Enum(CONTENT_ACTIONS), "Action for undeclared content types."),
                P::AxFRequired("max-size", K::Integer, "Maximum body size in bytes."),
                P::AxFRequired("size-exceeded-action", K::Enum(CONTENT_ACTIONS), "Action when the body is too large."),
                P::AxFOptional("errors-variable-name", K::String, "Variable receiving validation errors."),
            ],
            None,
        ),
        entry(
            "validate-parameters",
            "Validate parameters",
            C::Security,
            "Validates request parameters against the API schema.",
            INBOUND,
            API_SCOPES,
            vec![
                P::AxFRequired("specified-parameter-action", K::Enum(CONTENT_ACTIONS), "Action for declared parameters."),
                P::AxFRequired("unspecified-parameter-action", K::Enum(CONTENT_ACTIONS), "Action for undeclared parameters."),
                P::AxFOptional("errors-variable-name", K::String, "Variable receiving validation errors."),
            ],
            None,
        ),
    ]
}

fn ai_gateway() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "azure-openai-token-limit",
            "Limit Azure OpenAI token usage",
            C::AiGateway,
            "Limits language model token consumption per key.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("counter-key", K::Expression, "Key used for the limit."),
                P::AxFRequired("tokens-per-minute", K::Integer, "Maximum tokens per minute."),
                P::AxFRequired("estimate-prompt-tokens", K::Boolean, "Estimate prompt tokens before the call."),
                P::AxFOptional("remaining-tokens-header-name", K::String, "Response header with the remaining tokens."),
                P::AxFOptional("remaining-tokens-variable-name", K::String, "Variable with the remaining tokens."),
                P::AxFOptional("tokens-consumed-header-name", K::String, "Response header with the consumed tokens."),
            ],
            None,
        ),
        entry(
            "llm-token-limit",
            "Limit LLM token usage",
            C::AiGateway,
            "Limits large language model token consumption per key.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("counter-key", K::Expression, "Key used for the limit."),
                P::AxFRequired("tokens-per-minute", K::Integer, "Maximum tokens per minute."),
                P::AxFRequired("estimate-prompt-tokens", K::Boolean, "Estimate prompt tokens before the call."),
                P::AxFOptional("remaining-tokens-header-name", K::String, "Response header with the remaining tokens."),
                P::AxFOptional("remaining-tokens-variable-name", K::String, "Variable with the remaining tokens."),
            ],
            None,
        ),
        entry(
            "llm-semantic-cache-lookup",
            "LLM semantic cache lookup",
            C::AiGateway,
            "Returns cached responses for semantically similar prompts.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("score-threshold", K::Number, "Similarity threshold."),
                P::AxFRequired("embeddings-backend-id", K::String, "Backend serving embeddings."),
                P::AxFRequired("embeddings-backend-auth", K::Enum(&["system-assigned"]), "Authentication for the embeddings backend."),
            ],
            None,
        ),
        entry(
            "llm-content-safety",
            "Enforce content safety",
            C::AiGateway,
            "Screens prompts with a content safety service before forwarding them.",
            INBOUND,
            ALL_SCOPES,
            vec![
                P::AxFRequired("backend-id", K::String, "Content safety backend."),
                P::AxFOptional("shield-prompt", K::Boolean, "Enable prompt shields."),
            ],
            None,
        ),
    ]
}

fn advanced() -> Vec<AxCPolicyCatalogEntry> {
    vec![
        entry(
            "choose",
            "Control flow",
            C::Advanced,
            "Applies policy statements conditionally.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("when", K::Object, "Branches as {condition, policies} objects."),
                P::AxFOptional("otherwise", K::String, "Policies applied when no branch matches."),
            ],
            Some(templates::choose),
        ),
        entry(
            "include-fragment",
            "Include fragment",
            C::Advanced,
            "Inserts a policy fragment stored in the gateway.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![P::AxFRequired("fragment-id", K::String, "Fragment identifier.")],
            None,
        ),
        entry(
            "limit-concurrency",
            "Limit concurrency",
            C::Advanced,
            "Limits the number of enclosed policies executing concurrently.",
            ALL_SECTIONS,
            ALL_SCOPES,
            vec![
                P::AxFRequired("key", K::Expression, "Concurrency key."),
                P::AxFRequired("max-count", K::Integer, "Maximum concurrent executions."),
            ],
            None,
        ),
    ]
}
