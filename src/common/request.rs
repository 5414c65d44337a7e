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

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

/// The request view every extractor and matcher strategy operates on:
/// case-insensitive headers plus the cookies parsed out of them.
///
/// Strategies never see the inbound body or the decision-route path
/// parameters; the authorized resource is described entirely by the
/// forwarded headers the reverse proxy sets on the subrequest.
pub struct AuthRequest {
    headers: HeaderMap,
    cookies: CookieJar,
}

impl AuthRequest {
    pub fn new(headers: HeaderMap) -> Self {
        let cookies = CookieJar::from_headers(&headers);
        AuthRequest { headers, cookies }
    }

    /// Returns the header value, or `None` when the header is missing, not
    /// valid UTF-8, or empty. Empty values are treated as absent throughout
    /// the strategy layer.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }

    /// Returns the named cookie's value, empty values treated as absent.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
    }
}

impl<S> FromRequestParts<S> for AuthRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthRequest::new(parts.headers.clone()))
    }
}
