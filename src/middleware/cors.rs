//! CORS policy for the browser client.
//!
//! Policy:
//! - Default: any origin (`Access-Control-Allow-Origin: *`), without credentials.
//! - `CORS_ALLOWED_ORIGINS` set: exact-match allowlist, without credentials.
//!
//! Preflight requests are answered here, so they never reach the access gate.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(&config.cors_allowed_origins))
}

fn layer(allowed_origins: &[String]) -> CorsLayer {
    // `AllowOrigin::list` refuses a wildcard entry, so "*" means any origin.
    let allow_origin = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        // Config has already rejected origins that are not valid header values.
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10))
}
