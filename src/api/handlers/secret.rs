/*
 * Responsibility
 * - POST /secret (the protected resource)
 * - Only reachable through the access gate; reads the identity it attached
 */
use axum::Json;

use crate::api::dto::secret::SecretResponse;
use crate::api::extractors::AuthCtxExtractor;

pub async fn secret(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<SecretResponse> {
    Json(SecretResponse::for_user(ctx.email()))
}
