// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication and permission checks for the drinks API.
//!
//! ## Auth Flow
//!
//! 1. Client authenticates with the identity provider (Auth0)
//! 2. Client sends `Authorization: Bearer <JWT>`
//! 3. Server, per gated route:
//!    - Extracts the bearer token
//!    - Loads the provider's JWKS (cached with TTL)
//!    - Selects the key by `kid`, verifies RS256 signature, expiry, issuer, audience
//!    - Checks the route's permission against the `permissions` claim
//!    - Hands the verified claims to the handler
//!
//! ## Security
//!
//! - Only the configured signing algorithm is accepted
//! - Key-set fetches are time-bounded
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

pub use claims::{Audience, Claims};
pub use error::AuthError;
pub use extractor::{extract_bearer_token, Authorized};
pub use jwks::{JwksManager, KeySet};
pub use middleware::{require_permission, AuthConfig, PermissionGate};
pub use permissions::check_permission;
pub use verifier::Verifier;
