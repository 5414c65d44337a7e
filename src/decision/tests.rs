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

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use mockall::predicate::always;
use pretty_assertions::assert_eq;

use crate::app::app_state::AppState;
use crate::common::error::ExtractError;
use crate::common::request::AuthRequest;
use crate::common::types::BitMask64;
use crate::decision::handler::{REDIRECT_HINT_HEADER, check, check_with_quota, health};
use crate::decision::service::{
    DecisionParams, DecisionService, QUOTA_EXHAUSTED_REDIRECT, Verdict,
};
use crate::decision::{ExtractorRegistry, MatcherEntry, MatcherRegistry, QUOTA_MATCHER_NAME};
use crate::extractor::{
    BearerTokenExtractor, MockTokenExtractor, StaticSecretExtractor, Token, TokenExtractor,
};
use crate::matcher::{EqualityMatcher, MockRequestMatcher, NullMatcher};

fn params(matcher: &str, client: &str, resource: &str) -> DecisionParams {
    DecisionParams {
        matcher: matcher.to_string(),
        client_extractor: client.to_string(),
        resource_extractor: resource.to_string(),
    }
}

fn bearer_request(token: &str) -> AuthRequest {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    AuthRequest::new(headers)
}

fn mock_extractor(result: Result<Option<Token>, ()>) -> Arc<dyn TokenExtractor> {
    let mut mock = MockTokenExtractor::new();
    mock.expect_extract().with(always()).returning(move |_| {
        result
            .clone()
            .map_err(|_| ExtractError::InvalidPayload("upstream gone".to_string()))
    });
    mock.expect_describe()
        .return_const("MockTokenExtractor".to_string());
    Arc::new(mock)
}

fn extractors(entries: Vec<(&str, Arc<dyn TokenExtractor>)>) -> ExtractorRegistry {
    ExtractorRegistry::new(
        entries
            .into_iter()
            .map(|(name, extractor)| (name.to_string(), extractor))
            .collect(),
    )
}

fn matchers(entries: Vec<(&str, MatcherEntry)>) -> MatcherRegistry {
    MatcherRegistry::new(
        entries
            .into_iter()
            .map(|(name, matcher)| (name.to_string(), matcher))
            .collect(),
    )
}

fn shared_secret_registries(secret: &str) -> (ExtractorRegistry, MatcherRegistry) {
    (
        extractors(vec![
            ("static-secret", Arc::new(StaticSecretExtractor::new(secret))),
            ("bearer-token", Arc::new(BearerTokenExtractor)),
        ]),
        matchers(vec![(
            "equality",
            MatcherEntry::Token(Arc::new(EqualityMatcher)),
        )]),
    )
}

fn quota_matcher(allowed: bool) -> MatcherEntry {
    let mut mock = MockRequestMatcher::new();
    mock.expect_matches()
        .with(always())
        .returning(move |_| allowed);
    mock.expect_describe()
        .return_const("MockRequestMatcher".to_string());
    MatcherEntry::Request(Arc::new(mock))
}

#[tokio::test]
async fn test_matching_secret_allows() {
    let (extractors, matchers) = shared_secret_registries("s3cr3t");

    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &bearer_request("s3cr3t"),
        &extractors,
        &matchers,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Allow);
}

#[tokio::test]
async fn test_wrong_secret_denies() {
    let (extractors, matchers) = shared_secret_registries("s3cr3t");

    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &bearer_request("xyz"),
        &extractors,
        &matchers,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Deny { redirect: None });
}

#[tokio::test]
async fn test_unknown_strategy_names_deny() {
    let (extractors, matchers) = shared_secret_registries("s3cr3t");
    let request = bearer_request("s3cr3t");

    for bad_params in [
        params("nope", "static-secret", "bearer-token"),
        params("equality", "nope", "bearer-token"),
        params("equality", "static-secret", "nope"),
    ] {
        let verdict =
            DecisionService::decide(&bad_params, &request, &extractors, &matchers, false)
                .await
                .unwrap();
        assert_eq!(verdict, Verdict::Deny { redirect: None });
    }
}

#[tokio::test]
async fn test_missing_token_denies() {
    let (extractors, matchers) = shared_secret_registries("s3cr3t");

    // No Authorization header: the bearer extractor yields no token.
    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &AuthRequest::new(HeaderMap::new()),
        &extractors,
        &matchers,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Deny { redirect: None });
}

#[tokio::test]
async fn test_overlapping_bitmaps_allow() {
    let registries = (
        extractors(vec![
            (
                "client-mask",
                mock_extractor(Ok(Some(Token::Bitmap(BitMask64::from(3))))),
            ),
            (
                "resource-mask",
                mock_extractor(Ok(Some(Token::Bitmap(BitMask64::from(2))))),
            ),
        ]),
        matchers(vec![(
            "bitwise-and",
            MatcherEntry::Token(Arc::new(crate::matcher::BitwiseAndMatcher)),
        )]),
    );

    let verdict = DecisionService::decide(
        &params("bitwise-and", "client-mask", "resource-mask"),
        &AuthRequest::new(HeaderMap::new()),
        &registries.0,
        &registries.1,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Allow);
}

#[tokio::test]
async fn test_disjoint_bitmaps_deny() {
    let registries = (
        extractors(vec![
            (
                "client-mask",
                mock_extractor(Ok(Some(Token::Bitmap(BitMask64::from(1))))),
            ),
            (
                "resource-mask",
                mock_extractor(Ok(Some(Token::Bitmap(BitMask64::from(2))))),
            ),
        ]),
        matchers(vec![(
            "bitwise-and",
            MatcherEntry::Token(Arc::new(crate::matcher::BitwiseAndMatcher)),
        )]),
    );

    let verdict = DecisionService::decide(
        &params("bitwise-and", "client-mask", "resource-mask"),
        &AuthRequest::new(HeaderMap::new()),
        &registries.0,
        &registries.1,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Deny { redirect: None });
}

#[tokio::test]
async fn test_exhausted_quota_denies_with_redirect_hint() {
    let (extractors, _) = shared_secret_registries("s3cr3t");
    let matchers = matchers(vec![
        ("equality", MatcherEntry::Token(Arc::new(EqualityMatcher))),
        (QUOTA_MATCHER_NAME, quota_matcher(false)),
    ]);

    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &bearer_request("s3cr3t"),
        &extractors,
        &matchers,
        true,
    )
    .await
    .unwrap();

    assert_eq!(
        verdict,
        Verdict::Deny {
            redirect: Some(QUOTA_EXHAUSTED_REDIRECT)
        }
    );
}

#[tokio::test]
async fn test_quota_below_limit_proceeds_to_matching() {
    let (extractors, _) = shared_secret_registries("s3cr3t");
    let matchers = matchers(vec![
        ("equality", MatcherEntry::Token(Arc::new(EqualityMatcher))),
        (QUOTA_MATCHER_NAME, quota_matcher(true)),
    ]);

    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &bearer_request("s3cr3t"),
        &extractors,
        &matchers,
        true,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Allow);
}

#[tokio::test]
async fn test_absent_quota_entry_is_skipped_silently() {
    let (extractors, matchers) = shared_secret_registries("s3cr3t");

    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &bearer_request("s3cr3t"),
        &extractors,
        &matchers,
        true,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Allow);
}

#[tokio::test]
async fn test_request_level_matcher_on_token_position_denies() {
    let (extractors, _) = shared_secret_registries("s3cr3t");
    let matchers = matchers(vec![(QUOTA_MATCHER_NAME, quota_matcher(true))]);

    let verdict = DecisionService::decide(
        &params(QUOTA_MATCHER_NAME, "static-secret", "bearer-token"),
        &bearer_request("s3cr3t"),
        &extractors,
        &matchers,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Deny { redirect: None });
}

#[tokio::test]
async fn test_extractor_upstream_failure_propagates() {
    let registries = (
        extractors(vec![
            ("failing", mock_extractor(Err(()))),
            (
                "static-secret",
                Arc::new(StaticSecretExtractor::new("s3cr3t")) as Arc<dyn TokenExtractor>,
            ),
        ]),
        matchers(vec![(
            "equality",
            MatcherEntry::Token(Arc::new(EqualityMatcher)),
        )]),
    );

    let result = DecisionService::decide(
        &params("equality", "failing", "static-secret"),
        &AuthRequest::new(HeaderMap::new()),
        &registries.0,
        &registries.1,
        false,
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_null_matcher_always_denies() {
    let (extractors, _) = shared_secret_registries("s3cr3t");
    let matchers = matchers(vec![(
        "equality",
        MatcherEntry::Token(Arc::new(NullMatcher)),
    )]);

    let verdict = DecisionService::decide(
        &params("equality", "static-secret", "bearer-token"),
        &bearer_request("s3cr3t"),
        &extractors,
        &matchers,
        false,
    )
    .await
    .unwrap();

    assert_eq!(verdict, Verdict::Deny { redirect: None });
}

fn app_state(secret: &str) -> Arc<AppState> {
    let (extractors, _) = shared_secret_registries(secret);
    let matchers = matchers(vec![
        ("equality", MatcherEntry::Token(Arc::new(EqualityMatcher))),
        (QUOTA_MATCHER_NAME, quota_matcher(false)),
    ]);
    Arc::new(AppState {
        extractors,
        matchers,
    })
}

#[tokio::test]
async fn test_health_handler() {
    let response = axum::response::IntoResponse::into_response(health().await);
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_check_handler_statuses() {
    let state = app_state("s3cr3t");

    let response = check(
        State(state.clone()),
        Path(params("equality", "static-secret", "bearer-token")),
        bearer_request("s3cr3t"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = check(
        State(state),
        Path(params("equality", "static-secret", "bearer-token")),
        bearer_request("wrong"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_quota_handler_sets_redirect_hint() {
    let state = app_state("s3cr3t");

    let response = check_with_quota(
        State(state),
        Path(params("equality", "static-secret", "bearer-token")),
        bearer_request("s3cr3t"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response
            .headers()
            .get(REDIRECT_HINT_HEADER)
            .and_then(|value| value.to_str().ok()),
        Some(QUOTA_EXHAUSTED_REDIRECT)
    );
}
