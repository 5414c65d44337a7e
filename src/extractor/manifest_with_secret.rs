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

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::common::error::ExtractorResult;
use crate::common::request::AuthRequest;
use crate::extractor::{Token, TokenExtractor};

/// Reads the per-resource secret from a manifest file stored next to the
/// protected file.
///
/// The requested URI (from `x-original-uri`, query and fragment stripped) is
/// resolved under the configured base path, and the manifest lives at
/// `{stem}_manifest.json`: `/xxx/file.txt` -> `/xxx/file_manifest.json`.
/// Any I/O or parse problem yields no token.
pub struct ManifestWithSecretExtractor {
    base_path: PathBuf,
}

impl ManifestWithSecretExtractor {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        ManifestWithSecretExtractor {
            base_path: base_path.into(),
        }
    }

    /// Maps a request URI onto the manifest path under the base directory.
    fn manifest_path(&self, uri: &str) -> Option<PathBuf> {
        let path = uri.split(['?', '#']).next().unwrap_or(uri);
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }
        let file_path = self.base_path.join(relative);
        let stem = file_path.file_stem()?.to_str()?.to_string();
        let directory = file_path.parent().unwrap_or(Path::new(""));
        Some(directory.join(format!("{stem}_manifest.json")))
    }

    fn secret_from_manifest(raw: &str) -> Option<String> {
        let manifest: Value = serde_json::from_str(raw).ok()?;
        match manifest.get("secret")? {
            Value::Null => None,
            Value::String(secret) => Some(secret.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[async_trait]
impl TokenExtractor for ManifestWithSecretExtractor {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        let Some(uri) = request.header("x-original-uri") else {
            return Ok(None);
        };
        let Some(manifest_path) = self.manifest_path(uri) else {
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("could not read manifest {}: {e}", manifest_path.display());
                return Ok(None);
            }
        };

        Ok(Self::secret_from_manifest(&raw).map(Token::Text))
    }

    fn describe(&self) -> String {
        format!(
            "ManifestWithSecretExtractor(base_path={})",
            self.base_path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use pretty_assertions::assert_eq;

    fn request(uri: &str) -> AuthRequest {
        let mut headers = HeaderMap::new();
        headers.insert("x-original-uri", HeaderValue::from_str(uri).unwrap());
        AuthRequest::new(headers)
    }

    #[test]
    fn test_manifest_path_mapping() {
        let extractor = ManifestWithSecretExtractor::new("/app/static_files");
        assert_eq!(
            extractor.manifest_path("/docs/report.pdf"),
            Some(PathBuf::from("/app/static_files/docs/report_manifest.json"))
        );
    }

    #[test]
    fn test_manifest_path_strips_query_and_fragment() {
        let extractor = ManifestWithSecretExtractor::new("/srv");
        assert_eq!(
            extractor.manifest_path("/a/b.txt?download=1#top"),
            Some(PathBuf::from("/srv/a/b_manifest.json"))
        );
    }

    #[test]
    fn test_manifest_path_rejects_bare_root() {
        let extractor = ManifestWithSecretExtractor::new("/srv");
        assert_eq!(extractor.manifest_path("/"), None);
    }

    #[test]
    fn test_secret_parsing() {
        assert_eq!(
            ManifestWithSecretExtractor::secret_from_manifest(r#"{"secret": "abc"}"#),
            Some("abc".to_string())
        );
        assert_eq!(
            ManifestWithSecretExtractor::secret_from_manifest(r#"{"secret": 42}"#),
            Some("42".to_string())
        );
        assert_eq!(
            ManifestWithSecretExtractor::secret_from_manifest(r#"{"secret": null}"#),
            None
        );
        assert_eq!(
            ManifestWithSecretExtractor::secret_from_manifest(r#"{"other": "abc"}"#),
            None
        );
        assert_eq!(
            ManifestWithSecretExtractor::secret_from_manifest("not json"),
            None
        );
    }

    #[tokio::test]
    async fn test_extracts_secret_from_manifest_on_disk() {
        let base = std::env::temp_dir().join(format!("manifest-extractor-{}", std::process::id()));
        tokio::fs::create_dir_all(base.join("docs")).await.unwrap();
        tokio::fs::write(
            base.join("docs/report_manifest.json"),
            r#"{"secret": "from-disk"}"#,
        )
        .await
        .unwrap();

        let extractor = ManifestWithSecretExtractor::new(&base);
        let token = extractor
            .extract(&request("/docs/report.pdf"))
            .await
            .unwrap();

        assert_eq!(token, Some(Token::Text("from-disk".to_string())));
        tokio::fs::remove_dir_all(&base).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_manifest_yields_no_token() {
        let extractor = ManifestWithSecretExtractor::new("/nonexistent-base");
        let token = extractor
            .extract(&request("/docs/report.pdf"))
            .await
            .unwrap();
        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn test_missing_uri_header_yields_no_token() {
        let extractor = ManifestWithSecretExtractor::new("/srv");
        let token = extractor
            .extract(&AuthRequest::new(HeaderMap::new()))
            .await
            .unwrap();
        assert_eq!(token, None);
    }
}
