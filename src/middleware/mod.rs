/*
 * Responsibility
 * - Middleware entry points, each exposed as `apply(router, ...)`
 */
pub mod auth;
pub mod cors;
pub mod http;
