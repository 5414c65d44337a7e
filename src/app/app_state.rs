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

use crate::decision::{ExtractorRegistry, MatcherRegistry};

/// `AppState` is the shared state handed to every request handler.
///
/// # Notes
///
/// * The registries are populated once at startup and read-only afterwards;
///   individual strategies are shared `Arc` singletons, so cloning the state
///   across tasks is cheap and thread-safe.
pub struct AppState {
    pub extractors: ExtractorRegistry,
    pub matchers: MatcherRegistry,
}
