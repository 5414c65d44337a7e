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

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::error::ExtractError;
use crate::common::request::AuthRequest;
use crate::decision::{ExtractorRegistry, MatcherEntry, MatcherRegistry, QUOTA_MATCHER_NAME};

/// Redirect hint attached to denials caused by an exhausted quota.
pub const QUOTA_EXHAUSTED_REDIRECT: &str = "https://http.cat/429";

/// Strategy names resolved from the decision route's path segments.
#[derive(Debug, Deserialize)]
pub struct DecisionParams {
    pub matcher: String,
    pub client_extractor: String,
    pub resource_extractor: String,
}

/// Outcome of the pipeline. A deny may carry a redirect hint for the reverse
/// proxy; nothing else ever reaches the caller.
#[derive(Debug, PartialEq)]
pub enum Verdict {
    Allow,
    Deny { redirect: Option<&'static str> },
}

impl Verdict {
    fn deny() -> Self {
        Verdict::Deny { redirect: None }
    }
}

/// Failure to consult an authoritative upstream. Converted to a 5xx by the
/// handler; every other irregularity folds into [`Verdict::Deny`].
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("extractor upstream failure: {0}")]
    Extract(#[from] ExtractError),
}

pub struct DecisionService;

impl DecisionService {
    /// Runs the decision pipeline for one subrequest.
    ///
    /// 1. Resolve the matcher and both extractors by name; any miss denies.
    /// 2. With `with_quota` set, consult the request-level `"quota"` matcher
    ///    first; a negative answer denies with a redirect hint. An absent
    ///    entry is skipped silently.
    /// 3. Run both extractors concurrently; either yielding no token denies.
    /// 4. The matcher reduces `(client_token, resource_token)` to the verdict.
    pub async fn decide(
        params: &DecisionParams,
        request: &AuthRequest,
        extractors: &ExtractorRegistry,
        matchers: &MatcherRegistry,
        with_quota: bool,
    ) -> Result<Verdict, DecisionError> {
        let Some(matcher) = matchers.get(&params.matcher) else {
            warn!("unknown matcher '{}'", params.matcher);
            return Ok(Verdict::deny());
        };
        let Some(client_extractor) = extractors.get(&params.client_extractor) else {
            warn!("unknown client extractor '{}'", params.client_extractor);
            return Ok(Verdict::deny());
        };
        let Some(resource_extractor) = extractors.get(&params.resource_extractor) else {
            warn!("unknown resource extractor '{}'", params.resource_extractor);
            return Ok(Verdict::deny());
        };

        if with_quota {
            match matchers.get(QUOTA_MATCHER_NAME) {
                Some(MatcherEntry::Request(quota)) => {
                    if !quota.matches(request).await {
                        debug!("{} denied the request, attaching redirect hint", quota.describe());
                        return Ok(Verdict::Deny {
                            redirect: Some(QUOTA_EXHAUSTED_REDIRECT),
                        });
                    }
                }
                Some(MatcherEntry::Token(_)) => {
                    warn!("'{QUOTA_MATCHER_NAME}' matcher is not request-level, skipping quota check");
                }
                None => {}
            }
        }

        // The two extractors are independent and may block on I/O; run them
        // concurrently and wait for both.
        let (client_token, resource_token) = tokio::join!(
            client_extractor.extract(request),
            resource_extractor.extract(request),
        );
        let (Some(client_token), Some(resource_token)) = (client_token?, resource_token?) else {
            debug!(
                "missing token (client via {}, resource via {})",
                client_extractor.describe(),
                resource_extractor.describe()
            );
            return Ok(Verdict::deny());
        };

        match matcher {
            MatcherEntry::Token(matcher) => {
                Ok(if matcher.matches(&client_token, &resource_token) {
                    Verdict::Allow
                } else {
                    debug!("{} rejected the token pair", matcher.describe());
                    Verdict::deny()
                })
            }
            MatcherEntry::Request(_) => {
                warn!(
                    "matcher '{}' is request-level and cannot compare tokens",
                    params.matcher
                );
                Ok(Verdict::deny())
            }
        }
    }
}
