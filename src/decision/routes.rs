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

use crate::app::app_state::AppState;
use crate::decision::handler::{check, check_with_quota, health};
use axum::Router;
use axum::routing::{any, get};
use std::sync::Arc;

/// Decision routes accept any method: the reverse proxy mirrors the original
/// request's method onto the auth subrequest.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{matcher}/{client_extractor}/{resource_extractor}", any(check))
        .route(
            "/{matcher}/{client_extractor}/{resource_extractor}/with-quota-check",
            any(check_with_quota),
        )
        .with_state(state)
}
