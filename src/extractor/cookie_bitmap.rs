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
use crate::common::jwt;
use crate::common::request::AuthRequest;
use crate::extractor::{Token, TokenExtractor};

pub const DEFAULT_BITMAP_CLAIM: &str = "bitmap";

/// Extracts the permission bitmap from a signed JWT carried in a cookie.
///
/// The expected audience is reconstructed from the `x-forwarded-*` headers so
/// a token stays scoped to the public hostname it was issued for. Invalid,
/// expired or mis-scoped tokens yield no token.
pub struct CookieBitmapExtractor {
    cookie_name: String,
    jwt_secret: String,
    bitmap_claim: String,
    verify_audience: bool,
}

impl CookieBitmapExtractor {
    pub fn new(
        cookie_name: impl Into<String>,
        jwt_secret: impl Into<String>,
        verify_audience: bool,
    ) -> Self {
        CookieBitmapExtractor {
            cookie_name: cookie_name.into(),
            jwt_secret: jwt_secret.into(),
            bitmap_claim: DEFAULT_BITMAP_CLAIM.to_string(),
            verify_audience,
        }
    }

    pub fn with_bitmap_claim(mut self, claim: impl Into<String>) -> Self {
        self.bitmap_claim = claim.into();
        self
    }
}

#[async_trait]
impl TokenExtractor for CookieBitmapExtractor {
    async fn extract(&self, request: &AuthRequest) -> ExtractorResult<Option<Token>> {
        let Some(cookie) = request.cookie(&self.cookie_name) else {
            warn!("cookie '{}' not found in request", self.cookie_name);
            return Ok(None);
        };

        let audience = jwt::audience_from_forwarded(request);
        let Some(claims) = jwt::validate(
            cookie,
            &self.jwt_secret,
            audience.as_deref(),
            self.verify_audience,
        ) else {
            warn!(
                "failed to validate JWT token from cookie '{}'",
                self.cookie_name
            );
            return Ok(None);
        };

        let Some(bitmap) = jwt::bitmap_claim(&claims, &self.bitmap_claim) else {
            warn!(
                "bitmap claim '{}' not found in validated token",
                self.bitmap_claim
            );
            return Ok(None);
        };

        debug!(
            "successfully extracted bitmap from cookie '{}'",
            self.cookie_name
        );
        Ok(Some(Token::Bitmap(bitmap)))
    }

    fn describe(&self) -> String {
        format!(
            "CookieBitmapExtractor(cookie_name='{}', verify_audience={})",
            self.cookie_name, self.verify_audience
        )
    }
}
