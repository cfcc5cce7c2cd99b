/*
 * Responsibility
 * - URL layout: /health is public, /secret sits behind the access gate
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{health::health, secret::secret};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/secret", post(secret));

    Router::new()
        .route("/health", get(health))
        .merge(access::apply(protected, state))
}
