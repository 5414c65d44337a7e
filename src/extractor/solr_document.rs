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

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::common::error::ExtractorResult;
use crate::common::request::AuthRequest;
use crate::common::types::BitMask64;
use crate::extractor::{Token, TokenExtractor};
use crate::solr::{SearchOptions, SolrApi};

/// Derives a document id from the request and returns a rights mask read
/// from the matching document in the external store.
///
/// The id is derived by the configured parser, queried as `{id_field}:{id}`
/// with a single row and only the rights field selected. A missing id or
/// document yields no token; store failures propagate.
pub struct SolrDocumentExtractor {
    solr: Arc<dyn SolrApi>,
    collection: String,
    field: String,
    id_field: String,
    id_extractor: fn(&AuthRequest) -> Option<String>,
}

impl SolrDocumentExtractor {
    pub fn new(
        solr: Arc<dyn SolrApi>,
        collection: impl Into<String>,
        field: impl Into<String>,
        id_field: impl Into<String>,
        id_extractor: fn(&AuthRequest) -> Option<String>,
    ) -> Self {
        SolrDocumentExtractor {
            solr,
            collection: collection.into(),
            field: field.into(),
            id_field: id_field.into(),
            id_extractor,
        }
    }

    /// Converts the document field into a mask. Rights fields are stored as
    /// integers; the binary string rendering is accepted as well. Any other
    /// shape is a type mismatch and yields no token.
    fn mask_from_field(value: &Value) -> Option<BitMask64> {
        match value {
            Value::Number(number) => number.as_u64().map(BitMask64::from),
            Value::String(rendered) => rendered.parse().ok(),
            _ => None,
        }
    }
}

#[async_trait]
impl TokenExtractor for SolrDocumentExtractor {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        let Some(doc_id) = (self.id_extractor)(request) else {
            debug!("no document id extracted from request URL");
            return Ok(None);
        };

        let query = format!("{}:{}", self.id_field, doc_id);
        let options = SearchOptions {
            fields: Some(vec![self.field.clone()]),
            rows: Some(1),
            ..SearchOptions::default()
        };
        let response = self.solr.search(&self.collection, &query, options).await?;

        let Some(document) = response
            .pointer("/response/docs")
            .and_then(Value::as_array)
            .and_then(|docs| docs.first())
        else {
            debug!("no document found with id '{doc_id}'");
            return Ok(None);
        };

        Ok(document
            .get(&self.field)
            .and_then(Self::mask_from_field)
            .map(Token::Bitmap))
    }

    fn describe(&self) -> String {
        format!(
            "SolrDocumentExtractor(collection={}, field={}, id_field={})",
            self.collection, self.field, self.id_field
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::uri::extract_id_from_x_original_uri_with_iiif_and_wildcard_page_suffix;
    use crate::solr::{MockSolrApi, SolrError};
    use axum::http::{HeaderMap, HeaderValue};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn request(uri: &str) -> AuthRequest {
        let mut headers = HeaderMap::new();
        headers.insert("x-original-uri", HeaderValue::from_str(uri).unwrap());
        AuthRequest::new(headers)
    }

    fn extractor(solr: MockSolrApi) -> SolrDocumentExtractor {
        SolrDocumentExtractor::new(
            Arc::new(solr),
            "content_items",
            "rights_bm_get_img_l",
            "id",
            extract_id_from_x_original_uri_with_iiif_and_wildcard_page_suffix,
        )
    }

    #[tokio::test]
    async fn test_returns_rights_mask_from_document() {
        let mut solr = MockSolrApi::new();
        solr.expect_search()
            .with(
                eq("content_items"),
                eq("id:EXP-1829-03-26-a-*"),
                mockall::predicate::always(),
            )
            .returning(|_, _, _| {
                Ok(serde_json::json!({
                    "response": {"docs": [{"rights_bm_get_img_l": 2}]}
                }))
            });

        let token = extractor(solr)
            .extract(&request("/EXP-1829-03-26-a-p0007/info.json"))
            .await
            .unwrap();

        assert_eq!(token, Some(Token::Bitmap(BitMask64::from(2))));
    }

    #[tokio::test]
    async fn test_no_document_yields_no_token() {
        let mut solr = MockSolrApi::new();
        solr.expect_search()
            .returning(|_, _, _| Ok(serde_json::json!({"response": {"docs": []}})));

        let token = extractor(solr)
            .extract(&request("/EXP-1829-03-26-a-p0007/info.json"))
            .await
            .unwrap();

        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn test_document_without_field_yields_no_token() {
        let mut solr = MockSolrApi::new();
        solr.expect_search()
            .returning(|_, _, _| Ok(serde_json::json!({"response": {"docs": [{"id": "x"}]}})));

        let token = extractor(solr)
            .extract(&request("/EXP-1829-03-26-a-p0007/info.json"))
            .await
            .unwrap();

        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn test_unextractable_id_skips_the_query() {
        let mut solr = MockSolrApi::new();
        solr.expect_search().never();

        let token = extractor(solr)
            .extract(&AuthRequest::new(HeaderMap::new()))
            .await
            .unwrap();

        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut solr = MockSolrApi::new();
        solr.expect_search().returning(|_, _, _| {
            Err(SolrError::InvalidJson(
                serde_json::from_str::<Value>("garbage").unwrap_err(),
            ))
        });

        let result = extractor(solr)
            .extract(&request("/EXP-1829-03-26-a-p0007/info.json"))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_mask_from_field_shapes() {
        assert_eq!(
            SolrDocumentExtractor::mask_from_field(&serde_json::json!(3)),
            Some(BitMask64::from(3))
        );
        assert_eq!(
            SolrDocumentExtractor::mask_from_field(&serde_json::json!("11")),
            Some(BitMask64::from(3))
        );
        assert_eq!(
            SolrDocumentExtractor::mask_from_field(&serde_json::json!([1, 2])),
            None
        );
        assert_eq!(
            SolrDocumentExtractor::mask_from_field(&serde_json::json!(-5)),
            None
        );
    }
}
