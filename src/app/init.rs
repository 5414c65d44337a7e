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

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::app::app_state::AppState;
use crate::app::config::AppConfig;
use crate::decision::{
    self, ExtractorRegistry, MatcherEntry, MatcherRegistry, QUOTA_MATCHER_NAME,
};
use crate::extractor::{
    BearerTokenExtractor, CookieBitmapExtractor, CookieUserIdExtractor, IiifManifestExtractor,
    IiifUriDocIdExtractor, ManifestWithSecretExtractor, NullExtractor, SolrDocumentExtractor,
    StaticSecretExtractor, TokenExtractor, uri,
};
use crate::matcher::{BitwiseAndMatcher, EqualityMatcher, QuotaMatcher};
use crate::quota::{NullQuotaChecker, QuotaChecker, RedisQuotaChecker};
use crate::solr::SolrClient;

/// Registry names of the two index-backed extractors and the rights field
/// each of them reads.
const SOLR_BITMAP_EXTRACTORS: [(&str, &str); 2] = [
    ("content-item-image-bitmap", "rights_bm_get_img_l"),
    ("content-item-explore-bitmap", "rights_bm_explore_l"),
];

/// Sets up a global tracing subscriber with the configured maximum level.
///
/// # Panics
/// - If a global subscriber is already set. Call this function once, early
///   in program initialization, before any tracing events are emitted.
pub fn init_subscriber(config: &AppConfig) {
    let level = Level::from_str(config.log_level()).unwrap_or(Level::INFO);
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())
        .expect("setting default subscriber failed");
}

/// Retrieves the application configuration from the configuration file and
/// the environment, wrapped in a thread-safe `Arc` pointer for shared access
/// throughout the application.
pub fn init_config() -> Result<Arc<AppConfig>> {
    Ok(Arc::new(AppConfig::from_env()?))
}

/// Initializes and constructs the application state.
///
/// Inspects the configuration and registers the fully-configured strategies;
/// every strategy with missing prerequisites is replaced by its null variant
/// under the same registry name, so the URL surface never changes with the
/// configuration. The document store client and the quota checker are built
/// first and shared by every strategy that needs them.
///
/// # Errors
/// Fails when the document store client cannot be constructed or the quota
/// store is configured but unreachable; a partially wired registry never
/// serves decisions.
pub async fn init_app_state(config: Arc<AppConfig>) -> Result<Arc<AppState>> {
    let solr = init_solr(&config)?;
    let quota_checker = init_quota_checker(&config).await?;

    Ok(Arc::new(AppState {
        extractors: build_extractors(&config, solr.as_ref())?,
        matchers: build_matchers(&config, quota_checker),
    }))
}

/// Sets up and returns the main application router: the decision routes
/// wrapped in request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(decision::routes::routes(state))
        .layer(TraceLayer::new_for_http())
}

fn init_solr(config: &AppConfig) -> Result<Option<Arc<SolrClient>>> {
    if !config.is_solr_content_item_enabled() {
        info!("document store not configured, index-backed extractors disabled");
        return Ok(None);
    }
    let solr = config.solr();
    let client = SolrClient::new(
        solr.base_url().unwrap_or_default(),
        solr.username().map(str::to_string),
        solr.password().map(str::to_string),
        solr.proxy_url().map(str::to_string),
    )?;
    if let Some(details) = client.authentication_details() {
        info!("document store client configured with {details}");
    }
    if let Some(proxy) = client.proxy_url() {
        info!("document store requests use proxy {proxy}");
    }
    Ok(Some(Arc::new(client)))
}

async fn init_quota_checker(config: &AppConfig) -> Result<Arc<dyn QuotaChecker>> {
    match config.redis().url() {
        Some(url) => {
            let checker = RedisQuotaChecker::connect(
                url,
                config.redis().quota_limit(),
                config.redis().window_seconds(),
            )
            .await?;
            info!("remote quota checker enabled");
            Ok(Arc::new(checker))
        }
        None => {
            info!("quota store not configured, quota checks disabled");
            Ok(Arc::new(NullQuotaChecker))
        }
    }
}

fn build_extractors(
    config: &AppConfig,
    solr: Option<&Arc<SolrClient>>,
) -> Result<ExtractorRegistry> {
    let null: Arc<dyn TokenExtractor> = Arc::new(NullExtractor);
    let mut entries: HashMap<String, Arc<dyn TokenExtractor>> = HashMap::new();

    entries.insert("bearer-token".to_string(), Arc::new(BearerTokenExtractor));

    let manifest_with_secret: Arc<dyn TokenExtractor> = match config.static_files_path() {
        Some(base_path) => Arc::new(ManifestWithSecretExtractor::new(base_path)),
        None => null.clone(),
    };
    entries.insert("manifest-with-secret".to_string(), manifest_with_secret);

    let static_secret: Arc<dyn TokenExtractor> = match config.static_secret() {
        Some(secret) => Arc::new(StaticSecretExtractor::new(secret)),
        None => null.clone(),
    };
    entries.insert("static-secret".to_string(), static_secret);

    entries.insert("cookie-bitmap".to_string(), cookie_bitmap(config, &null));

    for (name, field) in SOLR_BITMAP_EXTRACTORS {
        let entry: Arc<dyn TokenExtractor> =
            match (solr, config.solr().content_item_collection()) {
                (Some(solr), Some(collection)) => Arc::new(SolrDocumentExtractor::new(
                    solr.clone(),
                    collection,
                    field,
                    "id",
                    uri::extract_id_from_x_original_uri_with_iiif_and_wildcard_page_suffix,
                )),
                _ => null.clone(),
            };
        entries.insert(name.to_string(), entry);
    }

    entries.insert(
        "iiif-presentation-manifest".to_string(),
        Arc::new(IiifManifestExtractor::new(
            uri::extract_url_from_x_original_uri,
        )?),
    );

    Ok(ExtractorRegistry::new(entries))
}

fn cookie_bitmap(config: &AppConfig, null: &Arc<dyn TokenExtractor>) -> Arc<dyn TokenExtractor> {
    match (config.cookie_name(), config.jwt_secret()) {
        (Some(cookie_name), Some(jwt_secret)) => Arc::new(CookieBitmapExtractor::new(
            cookie_name,
            jwt_secret,
            config.jwt_verify_audience(),
        )),
        _ => null.clone(),
    }
}

fn build_matchers(config: &AppConfig, quota_checker: Arc<dyn QuotaChecker>) -> MatcherRegistry {
    let mut entries: HashMap<String, MatcherEntry> = HashMap::new();

    entries.insert(
        "equality".to_string(),
        MatcherEntry::Token(Arc::new(EqualityMatcher)),
    );
    entries.insert(
        "bitwise-and".to_string(),
        MatcherEntry::Token(Arc::new(BitwiseAndMatcher)),
    );

    let user_id_extractor: Arc<dyn TokenExtractor> = match (config.cookie_name(), config.jwt_secret())
    {
        (Some(cookie_name), Some(jwt_secret)) => Arc::new(CookieUserIdExtractor::new(
            cookie_name,
            jwt_secret,
            config.jwt_verify_audience(),
        )),
        _ => Arc::new(NullExtractor),
    };
    entries.insert(
        QUOTA_MATCHER_NAME.to_string(),
        MatcherEntry::Request(Arc::new(QuotaMatcher::new(
            quota_checker,
            user_id_extractor,
            Arc::new(IiifUriDocIdExtractor),
        ))),
    );

    MatcherRegistry::new(entries)
}
