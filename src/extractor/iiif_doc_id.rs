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
use tracing::{debug, warn};

use crate::common::error::ExtractorResult;
use crate::common::request::AuthRequest;
use crate::extractor::uri::extract_id_from_x_original_uri_with_iiif;
use crate::extractor::{Token, TokenExtractor};

/// Document id from the IIIF URI in `x-original-uri`, as a strategy. Used as
/// the quota matcher's document-id side.
pub struct IiifUriDocIdExtractor;

#[async_trait]
impl TokenExtractor for IiifUriDocIdExtractor {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        match extract_id_from_x_original_uri_with_iiif(request) {
            Some(doc_id) => {
                debug!("successfully extracted document id from IIIF URI: {doc_id}");
                Ok(Some(Token::Text(doc_id)))
            }
            None => {
                warn!("failed to extract document id from IIIF URI");
                Ok(None)
            }
        }
    }

    fn describe(&self) -> String {
        "IiifUriDocIdExtractor".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_extracts_first_path_segment() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-original-uri",
            HeaderValue::from_static("/EXP-1829-03-26-a-p0007/full/max/0/default.jpg"),
        );

        let token = IiifUriDocIdExtractor
            .extract(&AuthRequest::new(headers))
            .await
            .unwrap();

        assert_eq!(token, Some(Token::Text("EXP-1829-03-26-a-p0007".to_string())));
    }

    #[tokio::test]
    async fn test_missing_header_yields_no_token() {
        let token = IiifUriDocIdExtractor
            .extract(&AuthRequest::new(HeaderMap::new()))
            .await
            .unwrap();

        assert_eq!(token, None);
    }
}
