// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT signature and claim verification against a fetched key set.
//!
//! ## Failure mapping
//!
//! | Cause | Error | Status |
//! |-------|-------|--------|
//! | Header undecodable or without `kid` | `invalid_header` | 401 |
//! | No key with the token's `kid` | `invalid_header` | 400 |
//! | `exp` in the past | `token_expired` | 401 |
//! | Audience or issuer mismatch, `nbf` in the future | `invalid_claims` | 401 |
//! | Anything else (signature, algorithm, payload) | `invalid_header` | 400 |

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::{AuthError, Claims};

/// Expected issuer, audience and algorithm for incoming tokens.
#[derive(Debug, Clone)]
pub struct Verifier {
    issuer: String,
    audience: String,
    algorithm: Algorithm,
    /// Seconds of clock skew tolerated on `exp` and `nbf`.
    leeway: u64,
}

impl Verifier {
    /// Create a verifier accepting RS256 tokens.
    ///
    /// # Arguments
    /// - `issuer`: Expected `iss` claim (`https://<domain>/`)
    /// - `audience`: Expected `aud` claim
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm: Algorithm::RS256,
            leeway: 0,
        }
    }

    /// Set the single allowed signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Tolerate `leeway` seconds of clock skew. Defaults to none.
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn leeway(&self) -> u64 {
        self.leeway
    }

    /// Verify `token` with the matching key from `key_set` and return its claims.
    pub fn verify(&self, token: &str, key_set: &JwkSet) -> Result<Claims, AuthError> {
        // Decode header to get kid (key ID)
        let header = decode_header(token).map_err(|_| AuthError::UnreadableHeader)?;
        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;

        let jwk = find_key(key_set, kid).ok_or(AuthError::NoMatchingKey)?;
        let decoding_key = rsa_decoding_key(jwk)?;

        decode::<Claims>(token, &decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation
    }
}

/// First key whose `kid` equals `kid`.
fn find_key<'a>(key_set: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    key_set
        .keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

/// Convert an RSA JWK to a DecodingKey.
fn rsa_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|_| AuthError::InvalidToken)
        }
        _ => Err(AuthError::InvalidToken),
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::ImmatureSignature => {
            AuthError::InvalidClaims
        }
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::InvalidClaims
        }
        _ => AuthError::InvalidToken,
    }
}
