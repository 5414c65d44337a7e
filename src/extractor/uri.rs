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

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::common::request::AuthRequest;

/// Last path component before a file extension: `/a/b/img-1.jpg` -> `img-1`.
static FILE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([^/]+)\.\w+$").expect("file id pattern must compile")
});

/// Trailing IIIF page suffix, e.g. `-p0007`.
static PAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-p\d+$").expect("page suffix pattern must compile"));

/// Reconstructs the originally requested URL from the proxy subrequest
/// headers. Requires `x-original-uri` and `x-forwarded-host`; the scheme is
/// `https` only when `x-forwarded-proto` says so.
pub fn extract_url_from_x_original_uri(request: &AuthRequest) -> Option<String> {
    let Some(path) = request.header("x-original-uri") else {
        debug!("no 'x-original-uri' header found in request");
        return None;
    };
    let Some(host) = request.header("x-forwarded-host") else {
        debug!("no 'x-forwarded-host' header found in request");
        return None;
    };
    let scheme = match request.header("x-forwarded-proto") {
        Some("https") => "https",
        _ => "http",
    };
    Some(format!("{scheme}://{host}{path}"))
}

/// Extracts a document id as the filename (without extension) of the last
/// path component: `/foo/bar/audio-1.mp3` -> `audio-1`.
///
/// Retained for routes configured with plain file URLs; IIIF routes use the
/// segment-based parsers below.
pub fn extract_id_from_x_original_uri(request: &AuthRequest) -> Option<String> {
    let Some(path) = request.header("x-original-uri") else {
        debug!("no 'x-original-uri' header found in request");
        return None;
    };
    match FILE_ID.captures(path) {
        Some(captures) => Some(captures[1].to_string()),
        None => {
            debug!("could not extract id from URL path: {path}");
            None
        }
    }
}

/// Extracts a document id from an IIIF-style URI, where the id is the first
/// path segment: `/EXP-1829-03-26-a-p0007/full/.../default.jpg`.
///
/// An optional `x-prefix-strip` header carries a comma-separated prefix list;
/// the first prefix matching the path is removed before parsing, so mounts
/// like `/iiif/` or `/v2/` do not end up in the id.
pub fn extract_id_from_x_original_uri_with_iiif(request: &AuthRequest) -> Option<String> {
    let path = request.header("x-original-uri")?;
    let path = match request.header("x-prefix-strip") {
        Some(prefixes) => prefixes
            .split(',')
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| path.strip_prefix(prefix))
            .unwrap_or(path),
        None => path,
    };
    path.split('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// IIIF id parse with the trailing page suffix (`-p0007`) replaced by a `-*`
/// wildcard, so page-level URIs match their content-item document by id
/// prefix query.
pub fn extract_id_from_x_original_uri_with_iiif_and_wildcard_page_suffix(
    request: &AuthRequest,
) -> Option<String> {
    extract_id_from_x_original_uri_with_iiif(request)
        .map(|id| PAGE_SUFFIX.replace(&id, "-*").into_owned())
}
