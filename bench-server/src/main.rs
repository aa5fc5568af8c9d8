use bench_core::{
    bind_from_config, signal::shutdown_signal, HelloOperations, HelloService, Interrupt,
};
use std::process::ExitCode;
use std::sync::Arc;
use storage_engine::{RequestCounters, UnifiedStorageFactory};
use time_engine::UnifiedSleepFactory;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match shared::config::init() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    info!("Starting bench server");
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        debug!("Ignoring command line arguments: {:?}", args);
    }

    // ============================================
    // STEP 1: Bind ports to adapters
    // ============================================
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
        "Ports bound: sleep={}, cache={} (deadline {:?})",
        bindings.sleep_adapter(),
        bindings.cache_adapter(),
        bindings.cache_deadline()
    );

    let ops: Arc<dyn HelloOperations> = Arc::new(HelloService::new(bindings.clone()));
    let stop = Interrupt::new();

    // ============================================
    // STEP 2: Bind listeners
    // ============================================
    let http_addr = config.bind_addr(config.http.port());
    let tcp_addr = config.bind_addr(config.tcp.port());
    let (http_listener, tcp_listener) =
        match tokio::try_join!(TcpListener::bind(&http_addr), TcpListener::bind(&tcp_addr)) {
            Ok(listeners) => listeners,
            Err(e) => {
                error!("Failed to bind listeners ({} / {}): {}", http_addr, tcp_addr, e);
                return ExitCode::FAILURE;
            }
        };

    // ============================================
    // STEP 3: Spawn HTTP and TCP server tasks
    // ============================================
    let http_router = server_http::build_router(server_http::AppState::new(ops.clone()));
    let http_stop = stop.clone();
    let mut http_handle = tokio::spawn(async move {
        axum::serve(http_listener, http_router)
            .with_graceful_shutdown(async move { http_stop.triggered().await })
            .await
    });
    let mut tcp_handle = tokio::spawn(server_tcp::serve(tcp_listener, ops, stop.clone()));

    info!("Bench server started successfully");
    info!("  - HTTP: {}://{}", config.http.scheme(), http_addr);
    info!("  - TCP:  {}://{}", config.tcp.scheme(), tcp_addr);

    // ============================================
    // STEP 4: Wait for shutdown signal
    // ============================================
    let mut http_joined = None;
    let mut tcp_joined = None;
    tokio::select! {
        joined = &mut http_handle => {
            error!("HTTP server task exited early");
            http_joined = Some(joined);
        }
        joined = &mut tcp_handle => {
            error!("TCP server task exited early");
            tcp_joined = Some(joined);
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    };
    let early_exit = http_joined.is_some() || tcp_joined.is_some();

    stop.trigger();
    // Interrupts sleeping requests so both hosts can drain.
    bindings.shutdown().await;
    let http_joined = match http_joined {
        Some(joined) => joined,
        None => http_handle.await,
    };
    let tcp_joined = match tcp_joined {
        Some(joined) => joined,
        None => tcp_handle.await,
    };

    let mut healthy = !early_exit;
    match http_joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("HTTP server error: {}", e);
            healthy = false;
        }
        Err(e) => {
            error!("HTTP server task failed: {}", e);
            healthy = false;
        }
    }
    if let Err(e) = tcp_joined {
        error!("TCP server task failed: {}", e);
        healthy = false;
    }

    info!("Bench server shut down");
    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
