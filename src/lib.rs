// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coffee Shop Server - Drinks API
//!
//! Public drink listing plus permission-gated detail and management
//! endpoints. Access is controlled by RS256 bearer tokens from an external
//! identity provider, verified against its published key set.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token verification and permission gate
//! - `config` - Environment configuration
//! - `store` - In-memory drink storage

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
