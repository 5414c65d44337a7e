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

use serde::Deserialize;

use crate::quota::{DEFAULT_QUOTA_LIMIT, DEFAULT_WINDOW_SECONDS};

/// The `AppConfig` struct is the main application configuration model used
/// for deserializing and storing the configuration of the sidecar.
///
/// Most options are prerequisites of individual extractor or matcher
/// strategies. A strategy whose prerequisites are absent is registered as its
/// null variant at startup, so the route still resolves but the decision
/// defaults to deny.
///
/// # Attributes
///
/// * `server` - Listener host and port, represented by [`ServerConfig`].
/// * `log_level` - Root log verbosity (`trace` .. `error`), default `info`.
/// * `static_files_path` - Enables the `manifest-with-secret` extractor.
/// * `static_secret` - Enables the `static-secret` extractor.
/// * `cookie_name`, `jwt_secret`, `jwt_verify_audience` - Enable the
///   cookie-based extractors.
/// * `solr` - Document store connection, represented by [`SolrConfig`].
///   Enables the index-backed extractors.
/// * `redis` - Quota store connection, represented by [`RedisConfig`].
///   Enables the remote quota checker.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    static_files_path: Option<String>,
    #[serde(default)]
    static_secret: Option<String>,
    #[serde(default)]
    cookie_name: Option<String>,
    #[serde(default)]
    jwt_secret: Option<String>,
    #[serde(default = "default_true")]
    jwt_verify_audience: bool,
    #[serde(default)]
    solr: SolrConfig,
    #[serde(default)]
    redis: RedisConfig,
}

/// A configuration struct for defining server settings.
///
/// # Fields
///
/// * `host` - A `String` representing the hostname or IP address to bind.
/// * `port` - A `u16` representing the port number the server listens on.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

/// Connection settings of the external document store.
///
/// The index-backed extractors are only enabled when `base_url`, `username`,
/// `password` and `content_item_collection` are all present.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SolrConfig {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    proxy_url: Option<String>,
    content_item_collection: Option<String>,
}

/// Connection settings of the remote quota store.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    url: Option<String>,
    #[serde(default = "default_quota_limit")]
    quota_limit: u64,
    #[serde(default = "default_window_days")]
    window_days: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_quota_limit() -> u64 {
    DEFAULT_QUOTA_LIMIT
}

fn default_window_days() -> u64 {
    DEFAULT_WINDOW_SECONDS / 86_400
}

impl Default for ServerConfig {
    /// Default listener used for local development or testing scenarios:
    /// `0.0.0.0:8000`.
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: None,
            quota_limit: default_quota_limit(),
            window_days: default_window_days(),
        }
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            log_level: default_log_level(),
            static_files_path: None,
            static_secret: None,
            cookie_name: None,
            jwt_secret: None,
            jwt_verify_audience: true,
            solr: SolrConfig::default(),
            redis: RedisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `config/default` (YAML) overlaid with
    /// environment variables (`__` separates nesting levels, e.g.
    /// `SOLR__BASE_URL`).
    ///
    /// # Errors
    /// Returns an error when the configuration file is missing or its
    /// contents cannot be deserialized into the expected structure.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(true))
            .add_source(config::Environment::default().separator("__"));
        builder.build()?.try_deserialize()
    }

    /// Retrieves a reference to the `ServerConfig` instance.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Returns the configured root log verbosity.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Returns the static files base path, when configured.
    pub fn static_files_path(&self) -> Option<&str> {
        self.static_files_path.as_deref()
    }

    /// Returns the shared static secret, when configured.
    pub fn static_secret(&self) -> Option<&str> {
        self.static_secret.as_deref()
    }

    /// Returns the access cookie name, when configured.
    pub fn cookie_name(&self) -> Option<&str> {
        self.cookie_name.as_deref()
    }

    /// Returns the JWT signing secret, when configured.
    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref()
    }

    /// Returns whether cookie JWTs must carry the reconstructed audience.
    pub fn jwt_verify_audience(&self) -> bool {
        self.jwt_verify_audience
    }

    /// Provides access to the document store configuration.
    pub fn solr(&self) -> &SolrConfig {
        &self.solr
    }

    /// Provides access to the quota store configuration.
    pub fn redis(&self) -> &RedisConfig {
        &self.redis
    }

    /// Check if the index-backed extractors are fully configured.
    pub fn is_solr_content_item_enabled(&self) -> bool {
        self.solr.base_url.is_some()
            && self.solr.username.is_some()
            && self.solr.password.is_some()
            && self.solr.content_item_collection.is_some()
    }
}

impl ServerConfig {
    /// Returns the host value.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port number.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl SolrConfig {
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }
    pub fn content_item_collection(&self) -> Option<&str> {
        self.content_item_collection.as_deref()
    }
}

impl RedisConfig {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
    pub fn quota_limit(&self) -> u64 {
        self.quota_limit
    }
    /// The configured window, converted from days to seconds.
    pub fn window_seconds(&self) -> u64 {
        self.window_days * 86_400
    }
}
