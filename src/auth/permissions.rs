// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission checks against the `permissions` claim.
//!
//! Permission strings are opaque labels such as `post:drinks`. Matching is
//! exact: no wildcards, no hierarchy.

use super::{AuthError, Claims};

/// Permission required to read the detailed drink list.
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
/// Permission required to create drinks.
pub const POST_DRINKS: &str = "post:drinks";
/// Permission required to modify drinks.
pub const PATCH_DRINKS: &str = "patch:drinks";
/// Permission required to delete drinks.
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Confirm that `claims` grants `required`.
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_deref()
        .ok_or(AuthError::MissingPermissions)?;

    if granted.iter().any(|permission| permission == required) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}
