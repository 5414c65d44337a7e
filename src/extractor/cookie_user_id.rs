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
use serde_json::Value;
use tracing::{debug, warn};

use crate::common::error::ExtractorResult;
use crate::common::jwt;
use crate::common::request::AuthRequest;
use crate::extractor::{Token, TokenExtractor};

/// Extracts the user id (`sub` claim) from a signed JWT carried in a cookie.
/// Same cookie and validation rules as [`crate::extractor::CookieBitmapExtractor`].
pub struct CookieUserIdExtractor {
    cookie_name: String,
    jwt_secret: String,
    verify_audience: bool,
}

impl CookieUserIdExtractor {
    pub fn new(
        cookie_name: impl Into<String>,
        jwt_secret: impl Into<String>,
        verify_audience: bool,
    ) -> Self {
        CookieUserIdExtractor {
            cookie_name: cookie_name.into(),
            jwt_secret: jwt_secret.into(),
            verify_audience,
        }
    }
}

#[async_trait]
impl TokenExtractor for CookieUserIdExtractor {
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

        let Some(user_id) = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
        else {
            warn!("user id ('sub' claim) not found in validated token");
            return Ok(None);
        };

        debug!(
            "successfully extracted user id from cookie '{}'",
            self.cookie_name
        );
        Ok(Some(Token::UserId(user_id.to_string())))
    }

    fn describe(&self) -> String {
        format!(
            "CookieUserIdExtractor(cookie_name='{}', verify_audience={})",
            self.cookie_name, self.verify_audience
        )
    }
}
