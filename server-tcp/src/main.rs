use bench_core::{HelloOperations, HelloService, Interrupt, bind_from_config, signal::shutdown_signal};
use server_tcp::serve;
use std::process::ExitCode;
use std::sync::Arc;
use storage_engine::{RequestCounters, UnifiedStorageFactory};
use time_engine::UnifiedSleepFactory;
use tokio::net::TcpListener;
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

    let addr = config.bind_addr(config.tcp.port());
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("TCP Server listening on tcp://{}", addr);

    let ops: Arc<dyn HelloOperations> = Arc::new(HelloService::new(bindings.clone()));
    let stop = Interrupt::new();
    let mut server = tokio::spawn(serve(listener, ops, stop.clone()));

    let joined = tokio::select! {
        joined = &mut server => joined,
        _ = shutdown_signal() => {
            stop.trigger();
            (&mut server).await
        }
    };
    bindings.shutdown().await;

    match joined {
        Ok(()) => {
            info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("TCP server task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
