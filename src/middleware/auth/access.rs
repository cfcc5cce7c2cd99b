//! Access gate: `Authorization` → TokenVerifier → AuthCtx in request extensions.
//!
//! - Accepts a raw token or `Bearer <token>`.
//! - Every failure is logged with its kind, then answered with the same opaque 401.
//! - On success the wrapped handler runs exactly once and its response is returned as-is.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{VerificationError, VerifiedIdentity};
use crate::state::AppState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("missing credential")]
    MissingCredential,
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),
}

/// Put the access gate in front of every route of `router`.
///
/// ```ignore
/// let protected = Router::new().route("/secret", post(secret));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: unmatched paths stay 404 instead of turning into 401
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(req.headers(), |credential| state.verifier.verify(credential))
        .map_err(|_| AppError::Unauthorized)?;

    tracing::info!(
        email = %identity.email,
        sub = identity.subject.as_deref().unwrap_or("-"),
        "authenticated request"
    );

    // gate → extractor hand-off
    req.extensions_mut().insert(AuthCtx::new(identity));

    Ok(next.run(req).await)
}

/// Extracts the credential and hands it to `verify`.
/// Without a usable credential `verify` is never called.
pub(crate) fn authenticate<F>(headers: &HeaderMap, verify: F) -> Result<VerifiedIdentity, GateError>
where
    F: FnOnce(&str) -> Result<VerifiedIdentity, VerificationError>,
{
    let credential = extract_credential(headers).inspect_err(|err| {
        tracing::warn!(error = %err, "request rejected");
    })?;

    verify(credential).map_err(|err| {
        let err = GateError::from(err);
        tracing::warn!(
            error = %err,
            credential = %fingerprint(credential),
            "request rejected"
        );
        err
    })
}

/// Pulls the credential out of `Authorization`, with or without a `Bearer` scheme.
pub(crate) fn extract_credential(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or(GateError::MissingCredential)?;

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        return Err(GateError::MissingCredential);
    }
    Ok(token)
}

// Short digest so failures can be correlated in logs without recording the token.
fn fingerprint(credential: &str) -> String {
    Sha256::digest(credential.as_bytes())[..8]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
