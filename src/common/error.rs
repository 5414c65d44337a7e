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
use thiserror::Error;

use crate::solr::SolrError;

/// The only failures a token extractor is allowed to surface to the decision
/// pipeline. Everything else (absent headers, bad cookies, unparseable URIs,
/// invalid tokens) folds into "no token" inside the strategy itself.
///
/// Surfaced failures mean an authoritative upstream could not be consulted;
/// the pipeline converts them to a 5xx response.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("document store error: {0}")]
    Solr(#[from] SolrError),

    #[error("upstream returned an invalid payload: {0}")]
    InvalidPayload(String),
}

pub type ExtractorResult<T> = Result<T, ExtractError>;
