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

use async_trait::async_trait;

use crate::common::error::ExtractorResult;
use crate::common::request::AuthRequest;
use crate::extractor::{Token, TokenExtractor};

/// Returns the same configured secret for every request, regardless of its
/// contents. Pairs with the equality matcher to gate a route behind one
/// shared credential.
pub struct StaticSecretExtractor {
    secret: String,
}

impl StaticSecretExtractor {
    pub fn new(secret: impl Into<String>) -> Self {
        StaticSecretExtractor {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl TokenExtractor for StaticSecretExtractor {
    async fn extract(&self, _request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        Ok(Some(Token::Text(self.secret.clone())))
    }

    fn describe(&self) -> String {
        "StaticSecretExtractor(secret=[REDACTED])".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_returns_configured_secret() {
        let extractor = StaticSecretExtractor::new("s3cr3t");
        let request = AuthRequest::new(HeaderMap::new());

        assert_eq!(
            extractor.extract(&request).await.unwrap(),
            Some(Token::Text("s3cr3t".to_string()))
        );
    }

    #[test]
    fn test_description_does_not_leak_the_secret() {
        let extractor = StaticSecretExtractor::new("s3cr3t");
        assert!(!extractor.describe().contains("s3cr3t"));
    }
}
