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

use crate::common::request::AuthRequest;
use crate::extractor::Token;

pub(crate) mod bitwise_and;
pub(crate) mod equality;
pub(crate) mod quota;

pub use bitwise_and::BitwiseAndMatcher;
pub use equality::EqualityMatcher;
pub use quota::QuotaMatcher;

/// Reduces the client and resource tokens to a verdict. A pure total
/// function: any token pair has an answer, mismatched token shapes simply
/// never match.
#[cfg_attr(test, automock)]
pub trait TokenMatcher: Send + Sync {
    fn matches(&self, client_token: &Token, resource_token: &Token) -> bool;

    /// Short human-readable description, used in wiring and debug logs.
    fn describe(&self) -> String;
}

/// A matcher that bypasses the two-token model and judges the request as a
/// whole. The quota matcher is the only variant.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestMatcher: Send + Sync {
    async fn matches(&self, request: &AuthRequest) -> bool;

    fn describe(&self) -> String;
}

/// Stand-in for matchers whose prerequisites are not configured: never
/// matches, so the route resolves but always denies.
pub struct NullMatcher;

impl TokenMatcher for NullMatcher {
    fn matches(&self, _client_token: &Token, _resource_token: &Token) -> bool {
        false
    }

    fn describe(&self) -> String {
        "NullMatcher".to_string()
    }
}
