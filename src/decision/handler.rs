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

use axum::Json;
use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::app::app_state::AppState;
use crate::common::request::AuthRequest;
use crate::decision::service::{DecisionError, DecisionParams, DecisionService, Verdict};

pub const REDIRECT_HINT_HEADER: &str = "x-redirect-url";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[debug_handler]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Core decision route. The response is a bare status, the reverse proxy
/// consumes nothing else.
///
/// Note: `#[debug_handler]` is omitted here because axum-macros' generated
/// future-send check defines a helper function named `check`, which
/// collides with this handler's name.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Path(params): Path<DecisionParams>,
    request: AuthRequest,
) -> Response {
    decide(&state, &params, &request, false).await
}

/// Decision route that additionally honours the per-user document quota.
#[debug_handler]
pub async fn check_with_quota(
    State(state): State<Arc<AppState>>,
    Path(params): Path<DecisionParams>,
    request: AuthRequest,
) -> Response {
    decide(&state, &params, &request, true).await
}

async fn decide(
    state: &AppState,
    params: &DecisionParams,
    request: &AuthRequest,
    with_quota: bool,
) -> Response {
    match DecisionService::decide(
        params,
        request,
        &state.extractors,
        &state.matchers,
        with_quota,
    )
    .await
    {
        Ok(verdict) => verdict.into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for Verdict {
    fn into_response(self) -> Response {
        match self {
            Verdict::Allow => StatusCode::OK.into_response(),
            Verdict::Deny { redirect: None } => StatusCode::FORBIDDEN.into_response(),
            Verdict::Deny {
                redirect: Some(url),
            } => (StatusCode::FORBIDDEN, [(REDIRECT_HINT_HEADER, url)]).into_response(),
        }
    }
}

impl IntoResponse for DecisionError {
    /// Upstream failures surface as a bare 502; diagnostics stay in the logs.
    fn into_response(self) -> Response {
        error!("decision failed: {self}");
        StatusCode::BAD_GATEWAY.into_response()
    }
}
