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

/// Extracts the bearer token from the `Authorization` header.
///
/// The header must consist of exactly two whitespace-separated parts with a
/// case-insensitive `Bearer` scheme; anything else yields no token.
pub struct BearerTokenExtractor;

#[async_trait]
impl TokenExtractor for BearerTokenExtractor {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        let Some(header) = request.header("authorization") else {
            return Ok(None);
        };

        let mut parts = header.split_whitespace();
        Ok(match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
                Some(Token::Text(token.to_string()))
            }
            _ => None,
        })
    }

    fn describe(&self) -> String {
        "BearerTokenExtractor".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use pretty_assertions::assert_eq;

    async fn extract(header: Option<&str>) -> Option<Token> {
        let mut headers = HeaderMap::new();
        if let Some(value) = header {
            headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        }
        BearerTokenExtractor
            .extract(&AuthRequest::new(headers))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_bearer_token() {
        assert_eq!(
            extract(Some("Bearer s3cr3t")).await,
            Some(Token::Text("s3cr3t".to_string()))
        );
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        assert_eq!(
            extract(Some("bEaReR abc")).await,
            Some(Token::Text("abc".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_header() {
        assert_eq!(extract(None).await, None);
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        assert_eq!(extract(Some("Token abc")).await, None);
    }

    #[tokio::test]
    async fn test_three_parts_rejected() {
        assert_eq!(extract(Some("Bearer  x  y")).await, None);
    }

    #[tokio::test]
    async fn test_scheme_only_rejected() {
        assert_eq!(extract(Some("Bearer")).await, None);
    }
}
