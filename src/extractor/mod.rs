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
#[cfg(test)]
use mockall::automock;

use crate::common::error::ExtractorResult;
use crate::common::request::AuthRequest;
use crate::common::types::BitMask64;

pub(crate) mod bearer_token;
pub(crate) mod cookie_bitmap;
pub(crate) mod cookie_user_id;
pub(crate) mod iiif_doc_id;
pub(crate) mod iiif_manifest;
pub(crate) mod manifest_with_secret;
pub(crate) mod solr_document;
pub(crate) mod static_secret;
pub(crate) mod uri;

pub use bearer_token::BearerTokenExtractor;
pub use cookie_bitmap::CookieBitmapExtractor;
pub use cookie_user_id::CookieUserIdExtractor;
pub use iiif_doc_id::IiifUriDocIdExtractor;
pub use iiif_manifest::IiifManifestExtractor;
pub use manifest_with_secret::ManifestWithSecretExtractor;
pub use solr_document::SolrDocumentExtractor;
pub use static_secret::StaticSecretExtractor;

/// What an extractor produces: one of the three token shapes the matcher
/// layer understands. Mixing shapes at match time is not a programming error,
/// it simply never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String),
    Bitmap(BitMask64),
    UserId(String),
}

impl Token {
    /// The textual payload, for tokens that carry one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(value) | Token::UserId(value) => Some(value),
            Token::Bitmap(_) => None,
        }
    }

    pub fn as_bitmap(&self) -> Option<BitMask64> {
        match self {
            Token::Bitmap(mask) => Some(*mask),
            _ => None,
        }
    }
}

/// A token extraction strategy.
///
/// Implementations are idempotent and side-effect-free apart from outbound
/// HTTP or file reads. Absent or malformed input is `Ok(None)`, never an
/// error; `Err` is reserved for upstream dependencies that could not be
/// consulted (see [`crate::common::error::ExtractError`]).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenExtractor: Send + Sync {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>>;

    /// Short human-readable description, used in wiring and debug logs.
    fn describe(&self) -> String;
}

/// Stand-in for extractors whose prerequisites are not configured. Keeps the
/// registry shape uniform: the route still resolves, the decision is deny.
pub struct NullExtractor;

#[async_trait]
impl TokenExtractor for NullExtractor {
    async fn extract(&self, _request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        Ok(None)
    }

    fn describe(&self) -> String {
        "NullExtractor".to_string()
    }
}
