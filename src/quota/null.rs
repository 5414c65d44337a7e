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

use crate::quota::{QuotaChecker, QuotaError, QuotaVerdict};

/// Quota checker used when quota tracking is disabled or not configured:
/// every access is below quota.
pub struct NullQuotaChecker;

#[async_trait]
impl QuotaChecker for NullQuotaChecker {
    async fn check(&self, _user_id: &str, _doc_id: &str) -> Result<QuotaVerdict, QuotaError> {
        Ok(QuotaVerdict::BelowQuota)
    }
}
