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

use crate::extractor::Token;
use crate::matcher::TokenMatcher;

/// Structural equality of the two tokens.
pub struct EqualityMatcher;

impl TokenMatcher for EqualityMatcher {
    fn matches(&self, client_token: &Token, resource_token: &Token) -> bool {
        client_token == resource_token
    }

    fn describe(&self) -> String {
        "EqualityMatcher".to_string()
    }
}
