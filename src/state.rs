/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Built once at startup, read-only afterwards; Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use crate::services::auth::TokenVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}
