// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission gate middleware for Axum.
//!
//! A [`PermissionGate`] runs the full pipeline for one required permission:
//! bearer extraction, key-set lookup, token verification, permission check.
//! The first failure short-circuits into an [`AuthError`] response and the
//! wrapped handler never runs. On success the verified [`Claims`] are put in
//! the request extensions for the [`Authorized`](super::Authorized) extractor.
//!
//! Gates are attached explicitly when the router is built:
//!
//! ```rust,ignore
//! let app = Router::new().route(
//!     "/drinks-detail",
//!     get(list_drinks_detail).route_layer(middleware::from_fn_with_state(
//!         auth.gate(GET_DRINKS_DETAIL),
//!         require_permission,
//!     )),
//! );
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::{check_permission, extract_bearer_token, AuthError, Claims, JwksManager, Verifier};

/// Authentication configuration.
///
/// Read-only after startup; clones share the key-set cache.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWKS manager for key fetching
    pub jwks: JwksManager,
    /// Expected issuer, audience and algorithm
    pub verifier: Arc<Verifier>,
}

impl AuthConfig {
    pub fn new(jwks: JwksManager, verifier: Verifier) -> Self {
        Self {
            jwks,
            verifier: Arc::new(verifier),
        }
    }

    /// Gate requiring `permission`.
    pub fn gate(&self, permission: impl Into<Arc<str>>) -> PermissionGate {
        PermissionGate {
            config: self.clone(),
            permission: permission.into(),
        }
    }
}

/// Authorization check for a single required permission.
#[derive(Clone)]
pub struct PermissionGate {
    config: AuthConfig,
    permission: Arc<str>,
}

impl PermissionGate {
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Run the pipeline against request headers.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        let key_set = self.config.jwks.key_set().await?;
        let claims = match self.config.verifier.verify(token, &key_set) {
            // The provider may have rotated in a key we have not seen yet
            Err(AuthError::NoMatchingKey) => {
                match self.config.jwks.refresh_unknown_key(&key_set).await? {
                    Some(fresh) => self.config.verifier.verify(token, &fresh)?,
                    None => return Err(AuthError::NoMatchingKey),
                }
            }
            result => result?,
        };
        check_permission(&self.permission, &claims)?;
        Ok(claims)
    }
}

/// Authentication middleware function.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()).await {
        Ok(claims) => {
            debug!(
                permission = gate.permission(),
                subject = claims.subject(),
                expires_at = ?claims.expires_at(),
                "Request authorized"
            );
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            // Anonymous requests to gated routes are routine
            if e == AuthError::MissingAuthHeader {
                debug!(permission = gate.permission(), "Authorization header missing");
            } else {
                warn!(
                    permission = gate.permission(),
                    code = e.error_code(),
                    status = e.status_code().as_u16(),
                    "Authorization failed"
                );
            }
            e.into_response()
        }
    }
}
