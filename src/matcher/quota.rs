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

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::common::request::AuthRequest;
use crate::extractor::TokenExtractor;
use crate::matcher::RequestMatcher;
use crate::quota::{QuotaChecker, QuotaVerdict};

/// Request-level matcher gating access on the user's document quota.
///
/// User and document ids are derived by the two configured extractors; the
/// quota checker then decides. This matcher fails open on every internal
/// problem: no user id, no doc id, extractor or store failure.
pub struct QuotaMatcher {
    quota_checker: Arc<dyn QuotaChecker>,
    user_id_extractor: Arc<dyn TokenExtractor>,
    doc_id_extractor: Arc<dyn TokenExtractor>,
}

impl QuotaMatcher {
    pub fn new(
        quota_checker: Arc<dyn QuotaChecker>,
        user_id_extractor: Arc<dyn TokenExtractor>,
        doc_id_extractor: Arc<dyn TokenExtractor>,
    ) -> Self {
        QuotaMatcher {
            quota_checker,
            user_id_extractor,
            doc_id_extractor,
        }
    }

    async fn id_from(&self, extractor: &Arc<dyn TokenExtractor>, request: &AuthRequest) -> Option<String> {
        match extractor.extract(request).await {
            Ok(token) => token.and_then(|token| token.as_text().map(str::to_string)),
            Err(e) => {
                error!("id extraction failed during quota check: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl RequestMatcher for QuotaMatcher {
    async fn matches(&self, request: &AuthRequest) -> bool {
        let user_id = self.id_from(&self.user_id_extractor, request).await;
        let doc_id = self.id_from(&self.doc_id_extractor, request).await;

        let (Some(user_id), Some(doc_id)) = (user_id, doc_id) else {
            warn!("failed to extract user id or document id from request, skipping quota check");
            return true;
        };

        match self.quota_checker.check(&user_id, &doc_id).await {
            Ok(QuotaVerdict::BelowQuota) => {
                debug!("user {user_id} is within quota for document {doc_id}");
                true
            }
            Ok(QuotaVerdict::QuotaReached) => {
                debug!("user {user_id} has reached quota for document {doc_id}");
                false
            }
            Err(e) => {
                error!("quota check failed for user {user_id}, doc {doc_id}: {e}");
                true
            }
        }
    }

    fn describe(&self) -> String {
        format!(
            "QuotaMatcher(user_id_extractor={}, doc_id_extractor={})",
            self.user_id_extractor.describe(),
            self.doc_id_extractor.describe()
        )
    }
}
