/*
 * This file is part of the ContentGate content authorization service.
 *
 * Copyright (C) 2026 ContentGate contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use moka::future::Cache;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 20;
const RESPONSE_CACHE_CAPACITY: u64 = 10_000;
const RESPONSE_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum SolrError {
    #[error("solr request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON response from solr: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Optional query parts of a search call.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub fq: Option<Vec<String>>,
    pub fields: Option<Vec<String>>,
    pub rows: Option<u32>,
    pub start: Option<u32>,
    pub sort: Option<String>,
}

/// The narrow Solr seam the extractors depend on, mockable in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SolrApi: Send + Sync {
    async fn search(
        &self,
        collection: &str,
        q: &str,
        options: SearchOptions,
    ) -> Result<Value, SolrError>;
}

/// HTTP tunables of the pooled client.
#[derive(Debug, Clone)]
pub struct SolrClientOptions {
    pub timeout: Duration,
    pub max_idle_connections: usize,
}

impl Default for SolrClientOptions {
    fn default() -> Self {
        SolrClientOptions {
            timeout: DEFAULT_TIMEOUT,
            max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
        }
    }
}

/// Pooled client for the external document store.
///
/// Responses are memoized per `URL + canonical body` for one hour, capped at
/// ten thousand entries, so hot document ids skip the network. The pool and
/// the cache are process-wide and shared by every Solr-backed extractor.
pub struct SolrClient {
    base_url: String,
    http: reqwest::Client,
    cache: Cache<String, String>,
    credentials: Option<(String, String)>,
    proxy_url: Option<String>,
}

impl SolrClient {
    pub fn new(
        base_url: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
        proxy_url: Option<String>,
    ) -> Result<Self, SolrError> {
        Self::with_options(
            base_url,
            username,
            password,
            proxy_url,
            SolrClientOptions::default(),
        )
    }

    pub fn with_options(
        base_url: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
        proxy_url: Option<String>,
        options: SolrClientOptions,
    ) -> Result<Self, SolrError> {
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .pool_max_idle_per_host(options.max_idle_connections);
        if let Some(proxy) = &proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(SolrClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: builder.build()?,
            cache: Cache::builder()
                .max_capacity(RESPONSE_CACHE_CAPACITY)
                .time_to_live(RESPONSE_CACHE_TTL)
                .build(),
            credentials: username.zip(password),
            proxy_url,
        })
    }

    /// Auth details for introspection, password always redacted.
    pub fn authentication_details(&self) -> Option<String> {
        self.credentials
            .as_ref()
            .map(|(username, _)| format!("Basic Auth: {username}:[REDACTED]"))
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// Sends a POST query to `{base_url}/{collection}/{handler}`, serving
    /// repeats from the response cache.
    pub async fn post_query(
        &self,
        collection: &str,
        body: &Value,
        handler: &str,
    ) -> Result<Value, SolrError> {
        let url = format!("{}/{}/{}", self.base_url, collection, handler);
        let key = cache_key(&url, body);

        if let Some(hit) = self.cache.get(&key).await {
            debug!("cache hit for solr query to collection '{collection}' at {url}");
            return Ok(serde_json::from_str(&hit)?);
        }

        debug!("sending solr query to collection '{collection}' at {url} with body {body}");
        let mut request = self.http.post(&url).json(body);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?.error_for_status()?;
        let result: Value = response.json().await?;
        self.cache.insert(key, result.to_string()).await;
        Ok(result)
    }
}

#[async_trait]
impl SolrApi for SolrClient {
    async fn search(
        &self,
        collection: &str,
        q: &str,
        options: SearchOptions,
    ) -> Result<Value, SolrError> {
        self.post_query(collection, &search_body(q, &options), "select")
            .await
    }
}

/// Cache key: URL plus the serialized body. `serde_json` maps are ordered by
/// key, so equivalent bodies produce identical keys regardless of how their
/// fields were assembled.
fn cache_key(url: &str, body: &Value) -> String {
    format!("{url}:{body}")
}

fn search_body(q: &str, options: &SearchOptions) -> Value {
    let mut body = json!({
        "query": q,
        "limit": options.rows.unwrap_or(10),
        "offset": options.start.unwrap_or(0),
    });

    let mut params = serde_json::Map::new();
    if let Some(fq) = &options.fq {
        params.insert("fq".to_string(), json!(fq));
    }
    if let Some(fields) = &options.fields {
        params.insert("fl".to_string(), Value::String(fields.join(",")));
    }
    if let Some(sort) = &options.sort {
        params.insert("sort".to_string(), Value::String(sort.clone()));
    }
    if !params.is_empty() {
        body["params"] = Value::Object(params);
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_key_is_canonical() {
        let a: Value = serde_json::from_str(r#"{"query": "id:x", "limit": 1}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"limit": 1, "query": "id:x"}"#).unwrap();
        assert_eq!(cache_key("http://solr/c/select", &a), cache_key("http://solr/c/select", &b));
    }

    #[test]
    fn test_search_body_shape() {
        let options = SearchOptions {
            fields: Some(vec!["rights_bm_get_img_l".to_string()]),
            rows: Some(1),
            ..SearchOptions::default()
        };
        assert_eq!(
            search_body("id:EXP-1829-03-26-a-*", &options),
            serde_json::json!({
                "query": "id:EXP-1829-03-26-a-*",
                "limit": 1,
                "offset": 0,
                "params": {"fl": "rights_bm_get_img_l"},
            })
        );
    }

    #[test]
    fn test_search_body_without_params() {
        assert_eq!(
            search_body("*:*", &SearchOptions::default()),
            serde_json::json!({"query": "*:*", "limit": 10, "offset": 0})
        );
    }

    #[test]
    fn test_authentication_details_are_redacted() {
        let client = SolrClient::new(
            "http://localhost:8983/solr/",
            Some("reader".to_string()),
            Some("hunter2".to_string()),
            None,
        )
        .unwrap();

        let details = client.authentication_details().unwrap();
        assert_eq!(details, "Basic Auth: reader:[REDACTED]");
        assert!(!details.contains("hunter2"));
    }

    #[test]
    fn test_authentication_details_absent_without_credentials() {
        let client = SolrClient::new("http://localhost:8983/solr", None, None, None).unwrap();
        assert_eq!(client.authentication_details(), None);
        assert_eq!(client.proxy_url(), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = SolrClient::new("http://localhost:8983/solr/", None, None, None).unwrap();
        assert_eq!(client.base_url, "http://localhost:8983/solr");
    }
}
