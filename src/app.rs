/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config → dependencies → Router
 * - Middleware stacking (gate per route, CORS + transport around everything)
 * - axum::serve()
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api, config::Config, middleware, services::auth::build_token_verifier, state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,request_gate=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash so it gets noticed. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "refusing to start");
            return Err(err.into());
        }
    };

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting request gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_state(config: &Config) -> AppState {
    AppState::new(build_token_verifier(config))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone()).with_state(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
