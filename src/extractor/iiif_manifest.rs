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
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::common::error::{ExtractError, ExtractorResult};
use crate::common::request::AuthRequest;
use crate::common::types::BitMask64;
use crate::extractor::{Token, TokenExtractor};

pub const DEFAULT_METADATA_FIELD: &str = "explore_bitmaps";
pub const DEFAULT_MANIFEST_PATH: &str = "manifest.json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// IIIF Presentation v3 manifest, reduced to the parts the extractor reads.
/// Metadata labels and values are language maps: `{lang -> [strings]}`.
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    items: Vec<Canvas>,
}

#[derive(Debug, Deserialize)]
struct Canvas {
    #[serde(default)]
    metadata: Vec<MetadataItem>,
}

#[derive(Debug, Deserialize)]
struct MetadataItem {
    #[serde(default)]
    label: HashMap<String, Vec<String>>,
    #[serde(default)]
    value: HashMap<String, Vec<String>>,
}

/// Fetches the IIIF presentation manifest next to the requested resource and
/// reads a permission mask out of its first canvas' metadata.
///
/// The resource URL (derived by the configured parser) is rewritten so its
/// last path segment becomes `manifest.json`; the metadata entry whose label
/// contains the configured field name (in any language) carries the mask as
/// a binary string. A missing manifest (404) yields no token, other upstream
/// failures propagate.
pub struct IiifManifestExtractor {
    http: reqwest::Client,
    url_extractor: fn(&AuthRequest) -> Option<String>,
    metadata_field: String,
    manifest_path: String,
}

impl IiifManifestExtractor {
    pub fn new(url_extractor: fn(&AuthRequest) -> Option<String>) -> Result<Self, reqwest::Error> {
        Ok(IiifManifestExtractor {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?,
            url_extractor,
            metadata_field: DEFAULT_METADATA_FIELD.to_string(),
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
        })
    }

    /// Rewrites a resource URL into its sibling manifest URL:
    /// `scheme://host/dir/file` -> `scheme://host/dir/manifest.json`.
    fn manifest_url(&self, file_url: &str) -> Option<Url> {
        let mut url = Url::parse(file_url).ok()?;
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop();
            segments.push(&self.manifest_path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Some(url)
    }

    /// Walks `items[0].metadata[*]` looking for the entry labelled with the
    /// configured field name in any language; returns its first value.
    fn bitmap_from_manifest<'a>(&self, manifest: &'a Manifest) -> Option<&'a str> {
        let canvas = manifest.items.first()?;
        for item in &canvas.metadata {
            let labelled = item
                .label
                .values()
                .any(|labels| labels.iter().any(|label| label == &self.metadata_field));
            if !labelled {
                continue;
            }
            if let Some(value) = item
                .value
                .values()
                .find_map(|values| values.first().map(String::as_str))
            {
                return Some(value);
            }
        }
        None
    }
}

#[async_trait]
impl TokenExtractor for IiifManifestExtractor {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        let Some(file_url) = (self.url_extractor)(request) else {
            debug!("no file URL extracted from request");
            return Ok(None);
        };
        let Some(manifest_url) = self.manifest_url(&file_url) else {
            debug!("could not derive a manifest URL from '{file_url}'");
            return Ok(None);
        };

        debug!("fetching manifest from {manifest_url}");
        let response = self.http.get(manifest_url.clone()).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("no manifest found at '{manifest_url}'");
                return Ok(None);
            }
            status if !status.is_success() => {
                return Err(ExtractError::UpstreamStatus(status));
            }
            _ => {}
        }

        let manifest: Manifest = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidPayload(e.to_string()))?;

        match self.bitmap_from_manifest(&manifest) {
            Some(rendered) => match rendered.parse::<BitMask64>() {
                Ok(mask) => {
                    debug!("extracted bitmap {mask} from manifest");
                    Ok(Some(Token::Bitmap(mask)))
                }
                Err(e) => {
                    warn!("manifest metadata '{}' is not a bitmap: {e}", self.metadata_field);
                    Ok(None)
                }
            },
            None => {
                debug!("no bitmap found in manifest metadata");
                Ok(None)
            }
        }
    }

    fn describe(&self) -> String {
        format!(
            "IiifManifestExtractor(metadata_field={}, manifest_path={})",
            self.metadata_field, self.manifest_path
        )
    }
}
