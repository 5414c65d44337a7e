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

use tracing::{debug, warn};

use crate::extractor::Token;
use crate::matcher::TokenMatcher;

/// Matches two permission masks: access is allowed when their bitwise AND is
/// non-zero. Tokens that are not masks never match.
pub struct BitwiseAndMatcher;

impl TokenMatcher for BitwiseAndMatcher {
    fn matches(&self, client_token: &Token, resource_token: &Token) -> bool {
        match (client_token.as_bitmap(), resource_token.as_bitmap()) {
            (Some(client_mask), Some(resource_mask)) => {
                let allowed = client_mask.allows(&resource_mask);
                debug!("bitwise-and match of {client_mask} & {resource_mask}: {allowed}");
                allowed
            }
            _ => {
                warn!("bitwise-and matcher received non-bitmap tokens");
                false
            }
        }
    }

    fn describe(&self) -> String {
        "BitwiseAndMatcher".to_string()
    }
}
