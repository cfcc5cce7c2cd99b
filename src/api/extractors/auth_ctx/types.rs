/*
 * Responsibility
 * - Type of the authenticated context handlers see
 * - The gate verifies the token and stores this in request extensions;
 *   handlers only ever receive this type
 */

use crate::services::auth::VerifiedIdentity;

/// Context attached to a request that passed the gate.
///
/// Lives for one request only; never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub identity: VerifiedIdentity,
}

impl AuthCtx {
    pub fn new(identity: VerifiedIdentity) -> Self {
        Self { identity }
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }
}
