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

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value};
use tracing::warn;

use crate::common::request::AuthRequest;
use crate::common::types::BitMask64;

/// Decoded JWT payload. Claims stay untyped because the bitmap claim name is
/// configurable per deployment.
pub type Claims = Map<String, Value>;

/// Validates a signed token (HS256) and returns its payload.
///
/// Signature and expiration are always checked; the audience only when
/// `verify_audience` is set and an expected audience is known. Every failure
/// path returns `None` with a warning log, callers treat that as "no token".
pub fn validate(
    token: &str,
    secret: &str,
    audience: Option<&str>,
    verify_audience: bool,
) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(audience) if verify_audience => validation.set_audience(&[audience]),
        _ => validation.validate_aud = false,
    }

    match decode::<Value>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims.as_object().cloned(),
        Err(e) => {
            warn!("JWT validation failed: {e}");
            None
        }
    }
}

/// Reads the named claim as a base64-encoded big-endian mask. Missing or
/// non-string claims, and payloads longer than 8 bytes, yield `None`.
pub fn bitmap_claim(claims: &Claims, key: &str) -> Option<BitMask64> {
    let encoded = claims.get(key)?.as_str()?;
    match BitMask64::from_base64(encoded) {
        Ok(mask) => Some(mask),
        Err(e) => {
            warn!("claim '{key}' does not hold a valid bitmap: {e}");
            None
        }
    }
}

/// Reconstructs the JWT audience from the reverse proxy's forwarded headers.
///
/// Both `x-forwarded-proto` and `x-forwarded-host` are required. The port is
/// appended unless it is a default one (80, 443) or absent.
pub fn audience_from_forwarded(request: &AuthRequest) -> Option<String> {
    let host = request.header("x-forwarded-host")?;
    let proto = request.header("x-forwarded-proto")?;
    let port_part = match request.header("x-forwarded-port") {
        Some(port) if port != "80" && port != "443" => format!(":{port}"),
        _ => String::new(),
    };
    Some(format!("{proto}://{host}{port_part}"))
}
