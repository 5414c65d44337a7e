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

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::Script;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::quota::{QuotaChecker, QuotaError, QuotaVerdict};

const QUOTA_SCRIPT: &str = include_str!("quota_check.lua");

/// Remote-backed quota checker.
///
/// Per user, the store holds a probabilistic set of seen document ids
/// (`user:{uid}:bloom`), a counter of distinct documents charged in the
/// window (`user:{uid}:count`) and the window start (`user:{uid}:first_access`),
/// all with TTLs matching the window. The three keys are only ever mutated by
/// one server-side script, so concurrent checks for the same user cannot
/// race a read-modify-write.
pub struct RedisQuotaChecker {
    connection: ConnectionManager,
    script: Script,
    quota_limit: u64,
    window_seconds: u64,
}

impl RedisQuotaChecker {
    pub async fn connect(
        url: &str,
        quota_limit: u64,
        window_seconds: u64,
    ) -> Result<Self, QuotaError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(RedisQuotaChecker {
            connection,
            script: Script::new(QUOTA_SCRIPT),
            quota_limit,
            window_seconds,
        })
    }

    fn keys(user_id: &str) -> [String; 3] {
        [
            format!("user:{user_id}:bloom"),
            format!("user:{user_id}:count"),
            format!("user:{user_id}:first_access"),
        ]
    }
}

#[async_trait]
impl QuotaChecker for RedisQuotaChecker {
    async fn check(&self, user_id: &str, doc_id: &str) -> Result<QuotaVerdict, QuotaError> {
        let [bloom_key, count_key, first_access_key] = Self::keys(user_id);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);

        let mut connection = self.connection.clone();
        let allowed: i64 = self
            .script
            .key(bloom_key)
            .key(count_key)
            .key(first_access_key)
            .arg(doc_id)
            .arg(self.quota_limit)
            .arg(now)
            .arg(self.window_seconds)
            .invoke_async(&mut connection)
            .await?;

        debug!("quota script verdict for user {user_id}, doc {doc_id}: allowed={allowed}");
        Ok(if allowed == 1 {
            QuotaVerdict::BelowQuota
        } else {
            QuotaVerdict::QuotaReached
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_scheme() {
        assert_eq!(
            RedisQuotaChecker::keys("local-user-1"),
            [
                "user:local-user-1:bloom".to_string(),
                "user:local-user-1:count".to_string(),
                "user:local-user-1:first_access".to_string(),
            ]
        );
    }

    #[test]
    fn test_script_parameter_order_matches_lua_header() {
        // The script reads three KEYS and four ARGV entries; a mismatch here
        // would silently misinterpret the quota limit as the document id.
        assert!(QUOTA_SCRIPT.contains("KEYS[3]"));
        assert!(QUOTA_SCRIPT.contains("ARGV[4]"));
        assert!(!QUOTA_SCRIPT.contains("KEYS[4]"));
    }
}
