// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token extraction and the claims extractor for gated handlers.
//!
//! Handlers registered behind the permission gate take the verified claims
//! as their first extractor:
//!
//! ```rust,ignore
//! async fn list_drinks_detail(
//!     Authorized(claims): Authorized,
//!     State(state): State<AppState>,
//! ) -> Json<DrinkList> {
//!     // claims.permissions contains the granted permissions
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Claims};

/// Pull the bearer token out of the `Authorization` header.
///
/// The header value must be exactly two whitespace-separated parts, the
/// first of which is `bearer` in any case. The token is returned verbatim.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    let mut parts = value.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::MalformedToken);
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    Ok(token)
}

/// Claims placed on the request by the permission gate.
pub struct Authorized(pub Claims);

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only the gate inserts claims; a handler mounted without it sees none.
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Authorized)
            .ok_or(AuthError::MissingAuthHeader)
    }
}
