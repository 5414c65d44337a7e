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
use thiserror::Error;

pub(crate) mod null;
pub(crate) mod redis;

pub use self::null::NullQuotaChecker;
pub use self::redis::RedisQuotaChecker;

/// Default ceiling of distinct documents per user and window.
pub const DEFAULT_QUOTA_LIMIT: u64 = 200_000;

/// Default window length: 30 days.
pub const DEFAULT_WINDOW_SECONDS: u64 = 2_592_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaVerdict {
    BelowQuota,
    QuotaReached,
}

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("quota store error: {0}")]
    Store(#[from] ::redis::RedisError),
}

/// Tracks distinct document accesses per user within a rolling time window.
///
/// A check for an unseen document charges it against the user's quota;
/// re-checking a document already seen in the window never charges twice.
/// Callers treat `Err` as "below quota" and log it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuotaChecker: Send + Sync {
    async fn check(&self, user_id: &str, doc_id: &str) -> Result<QuotaVerdict, QuotaError>;
}
