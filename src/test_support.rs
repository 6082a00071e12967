// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test fixtures: signing keys, token builders and a local JWKS server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::auth::{AuthConfig, JwksManager, Verifier};

pub const TEST_KID: &str = "test-key";
pub const TEST_AUDIENCE: &str = "api";
pub const TEST_ISSUER: &str = "https://coffee.test.example/";

/// Port 1 on loopback refuses connections.
pub const UNREACHABLE_JWKS_URL: &str = "http://127.0.0.1:1/.well-known/jwks.json";

const SIGNING_KEY_PEM: &str = include_str!("../testdata/signing_key.pem");
const ROGUE_KEY_PEM: &str = include_str!("../testdata/rogue_key.pem");

/// Base64url modulus of `testdata/signing_key.pem`.
pub const SIGNING_KEY_MODULUS: &str = "pG189xS5R45XcPWQy3urkLWLNQ_19oRFUei8mP352eHm5QYFXmj85sukiBBHoScCaB7MvmFZBOz-UfFQXNoHyTf3zst8QeG1jpILElLF24BQpDu99VHfO1QEPTjuD2sfGmmvJH0KZnX4bxUVPUObPvDIOBd8aZ_pm7xqeKqf79XeqB_vOkCRCBhRCWpZPjAiW5mZxa58nUP-ecIpNOTnfcBZ_01rIWYJq_pI4x_9ZQKVHaUJRTVG4Kcuwx6XQfjnV4cetXyASOQNrJxiRsTRZSLip9gT-S7sKyJ8ZkcsacC_yV3s05St7mfn5B1qTB56hYDQKpOdfptglDjFVzscvw";

/// Base64url modulus of `testdata/rogue_key.pem`.
pub const ROGUE_KEY_MODULUS: &str = "qhp5B6UetBfSOsKrTnW9KS3C_l5qjBYF0UJWH4hvsEM2k2wx1p_AHwgse72fMC90HpsQMUFm_mRnQefrhaWQGLErcCvE8OrZjB56u3QLCgMNhgW2yepE1ICuvcsRCvs_9OQfnGPxG1HrKPSVIGOghPh02mkKn57RoYn_rcBXR3iBZD2pWRc8324RN9w7foIyISaPQyKfySqR_IU4lf5zCoGXaBYnSPml7fr0cNgRwX1rpSnVCl2MH9QXziMkWIDUOV0xmdEfGtw1GXhnRaWCZqF_CoWjWZLa4touDdOFH3j24XTwQyRlkeLMOfUV15g6DEDVTONQOB025a1OJA-PcQ";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn jwk(kid: &str, modulus: &str) -> Value {
    json!({ "kty": "RSA", "kid": kid, "use": "sig", "alg": "RS256", "n": modulus, "e": "AQAB" })
}

/// Published key set containing only the signing key.
pub fn key_set() -> Value {
    json!({ "keys": [jwk(TEST_KID, SIGNING_KEY_MODULUS)] })
}

/// Unexpired claims with the configured audience and issuer.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|barista",
        "iat": now(),
        "exp": now() + 3600,
        "aud": TEST_AUDIENCE,
        "iss": TEST_ISSUER,
        "permissions": permissions,
    })
}

fn sign_pem(claims: &Value, kid: Option<&str>, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_owned);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("test key parses");
    encode(&header, claims, &key).expect("token encodes")
}

pub fn sign(claims: &Value) -> String {
    sign_with_kid(claims, Some(TEST_KID))
}

pub fn sign_with_kid(claims: &Value, kid: Option<&str>) -> String {
    sign_pem(claims, kid, SIGNING_KEY_PEM)
}

/// Signed with a key that is not in the published set.
pub fn sign_rogue(claims: &Value, kid: Option<&str>) -> String {
    sign_pem(claims, kid, ROGUE_KEY_PEM)
}

pub fn sign_hs256(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_owned());
    encode(&header, claims, &EncodingKey::from_secret(b"shared-secret")).expect("token encodes")
}

/// Auth configuration whose key-set endpoint refuses connections.
pub fn offline_auth_config() -> AuthConfig {
    let jwks = JwksManager::new(UNREACHABLE_JWKS_URL).expect("http client");
    AuthConfig::new(jwks, Verifier::new(TEST_ISSUER, TEST_AUDIENCE))
}

/// Local JWKS endpoint counting how often it is hit.
pub struct KeyServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    body: Arc<RwLock<Value>>,
}

impl KeyServer {
    pub async fn spawn(body: Value) -> Self {
        Self::spawn_with_delay(body, Duration::ZERO).await
    }

    pub async fn spawn_with_delay(body: Value, delay: Duration) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let body = Arc::new(RwLock::new(body));
        let counter = hits.clone();
        let served = body.clone();
        let handler = move || {
            let counter = counter.clone();
            let served = served.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                let body = served.read().expect("body lock").clone();
                Json(body)
            }
        };
        let app = Router::new().route("/.well-known/jwks.json", get(handler));
        Self::serve(app, hits, body).await
    }

    /// Endpoint answering every request with 500.
    pub async fn spawn_failing() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handler = move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
        let app = Router::new().route("/.well-known/jwks.json", get(handler));
        Self::serve(app, hits, Arc::new(RwLock::new(Value::Null))).await
    }

    async fn serve(app: Router, hits: Arc<AtomicUsize>, body: Arc<RwLock<Value>>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test JWKS server");
        });
        Self { addr, hits, body }
    }

    pub fn jwks_url(&self) -> String {
        format!("http://{}/.well-known/jwks.json", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Publish a different key set from now on.
    pub fn set_body(&self, body: Value) {
        *self.body.write().expect("body lock") = body;
    }

    /// Auth configuration trusting this server, without key caching.
    pub fn auth_config(&self) -> AuthConfig {
        let jwks = JwksManager::new(self.jwks_url())
            .expect("http client")
            .with_cache_ttl(Duration::ZERO);
        AuthConfig::new(jwks, Verifier::new(TEST_ISSUER, TEST_AUDIENCE))
    }
}
