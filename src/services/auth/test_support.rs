//! Token minting helpers for tests. Production code never issues tokens.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn mint(secret: &str, claims: Value) -> String {
    mint_with(Algorithm::HS256, secret, claims)
}

pub fn mint_with(alg: Algorithm, secret: &str, claims: Value) -> String {
    let mut header = Header::new(alg);
    header.typ = Some("JWT".to_string());
    jsonwebtoken::encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign test token")
}

/// Hand-assembles a token from arbitrary header/claims JSON and a raw signature segment.
pub fn forge(header: Value, claims: Value, signature: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        signature
    )
}
