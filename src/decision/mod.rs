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

use std::collections::HashMap;
use std::sync::Arc;

use crate::extractor::TokenExtractor;
use crate::matcher::{RequestMatcher, TokenMatcher};

pub(crate) mod handler;
pub(crate) mod routes;
pub(crate) mod service;
#[cfg(test)]
mod tests;

/// Registry name of the request-level quota matcher consulted by the
/// `with-quota-check` routes.
pub const QUOTA_MATCHER_NAME: &str = "quota";

/// A registered matcher: either the usual token-pair kind, or the
/// request-level kind. Selecting a request-level matcher where a token-pair
/// matcher is expected is a runtime type mismatch and denies.
#[derive(Clone)]
pub enum MatcherEntry {
    Token(Arc<dyn TokenMatcher>),
    Request(Arc<dyn RequestMatcher>),
}

/// Named extractor table, built once at startup and read-only afterwards.
/// Names missing prerequisites hold the null variant, names absent from the
/// table deny at decision time.
pub struct ExtractorRegistry {
    entries: HashMap<String, Arc<dyn TokenExtractor>>,
}

impl ExtractorRegistry {
    pub fn new(entries: HashMap<String, Arc<dyn TokenExtractor>>) -> Self {
        ExtractorRegistry { entries }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TokenExtractor>> {
        self.entries.get(name).cloned()
    }
}

/// Named matcher table, same lifecycle as [`ExtractorRegistry`].
pub struct MatcherRegistry {
    entries: HashMap<String, MatcherEntry>,
}

impl MatcherRegistry {
    pub fn new(entries: HashMap<String, MatcherEntry>) -> Self {
        MatcherRegistry { entries }
    }

    pub fn get(&self, name: &str) -> Option<MatcherEntry> {
        self.entries.get(name).cloned()
    }
}
