use bench_core::{bind_from_config, signal::shutdown_signal};
use server_http::{build_router, AppState};
use std::process::ExitCode;
use std::sync::Arc;
use storage_engine::{RequestCounters, UnifiedStorageFactory};
use time_engine::UnifiedSleepFactory;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match shared::config::init() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    info!("Starting bench HTTP server...");
    let metrics = Arc::new(RequestCounters::new());
    let bindings = match bind_from_config(
        &config,
        &UnifiedSleepFactory,
        &UnifiedStorageFactory,
        metrics,
    )
    .await
    {
        Ok(bindings) => bindings,
        Err(e) => {
            error!("Port binding failed: {}", e);
            return ExitCode::from(2);
        }
    };
    info!(
        "Ports bound: sleep={}, cache={}",
        bindings.sleep_adapter(),
        bindings.cache_adapter()
    );

    let addr = config.bind_addr(config.http.port());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("HTTP Server listening on http://{}", addr);
    info!("Try: curl http://localhost:{}/hello/platform", config.http.port());

    let router = build_router(AppState::from_bindings(bindings.clone()));
    let drain = bindings.clone();
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Sleeping requests are interrupted so the graceful drain finishes.
            drain.shutdown().await;
        })
        .await;

    bindings.shutdown().await;
    match served {
        Ok(()) => {
            info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("HTTP server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
