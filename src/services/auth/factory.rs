//! Factory: build `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenVerifier;

pub fn build_token_verifier(config: &Config) -> Arc<TokenVerifier> {
    let verifier = TokenVerifier::new(
        config.jwt_secret.clone(),
        config.auth_issuer.as_deref(),
        config.auth_audience.as_deref(),
        config.access_token_leeway_seconds,
    );

    tracing::debug!(
        issuer_pinned = config.auth_issuer.is_some(),
        audience_pinned = config.auth_audience.is_some(),
        leeway_seconds = config.access_token_leeway_seconds,
        "token verifier ready"
    );

    Arc::new(verifier)
}
