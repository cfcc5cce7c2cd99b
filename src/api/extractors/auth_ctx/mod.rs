/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Provide the authenticated request context (AuthCtx) to handlers
 * - axum-specific code stays in core; the type lives in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;
