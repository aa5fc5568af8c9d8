use crate::protocol::{self, Request, Response};
use bench_core::{HelloMode, HelloOperations, Interrupt, Lookup};
use futures::{SinkExt, Stream, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

pub type ConnectionError = Box<dyn std::error::Error + Send + Sync>;

/// Pause after a failed accept so a persistent error (e.g. `EMFILE`) does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Accepts connections until `stop` fires. Each connection gets its own task.
pub async fn serve(listener: TcpListener, ops: Arc<dyn HelloOperations>, stop: Interrupt) {
    let incoming = futures::stream::unfold(listener, |listener| async move {
        let accepted = listener.accept().await.inspect(|(socket, _)| {
            socket.set_nodelay(true).ok();
        });
        Some((accepted, listener))
    });
    serve_incoming(incoming, ops, stop).await;
}

/// Accept loop over any connection source. Accept errors are logged and skipped.
pub async fn serve_incoming<I, S>(incoming: I, ops: Arc<dyn HelloOperations>, stop: Interrupt)
where
    I: Stream<Item = io::Result<(S, SocketAddr)>>,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut incoming = pin!(incoming);
    loop {
        let accepted = tokio::select! {
            biased;
            _ = stop.triggered() => break,
            next = incoming.next() => match next {
                Some(accepted) => accepted,
                None => break,
            },
        };

        match accepted {
            Ok((socket, addr)) => {
                let ops = ops.clone();
                tokio::spawn(async move {
                    debug!("Connection {addr} successful.");

                    if let Err(err) = process_connection(socket, ops).await {
                        warn!("Connection {addr} error: {err:?}");
                    }
                });
            }
            Err(e) => {
                error!("TCP accept error: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }

    info!("TCP listener stopped");
}

pub async fn process_connection<S>(
    socket: S,
    ops: Arc<dyn HelloOperations>,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(socket, protocol::codec());

    while let Some(frame_result) = framed.next().await {
        let frame = frame_result?;

        let response = match Request::decode(frame.freeze()) {
            Ok(request) => {
                debug!("Received request: {:?}", request);
                dispatch(request, ops.as_ref()).await
            }
            Err(e) => {
                warn!("Failed to decode request: {}", e);
                Response::Error { msg: e }
            }
        };

        framed.send(response.encode()).await?;
    }

    Ok(())
}

async fn dispatch(request: Request, ops: &dyn HelloOperations) -> Response {
    let outcome = match request {
        Request::Ping => return Response::Pong,

        Request::Hello { mode, sleep } => match mode.parse::<HelloMode>() {
            Ok(mode) => ops.hello(mode, sleep, &ops.interrupt()).await.map(Some),
            Err(e) => Err(e),
        },

        Request::Get { key } => match std::str::from_utf8(&key) {
            Ok(key) => ops.lookup(key).await.map(Lookup::into_option),
            Err(e) => {
                return Response::Error {
                    msg: format!("Invalid key UTF-8: {}", e),
                }
            }
        },
    };

    match outcome {
        Ok(Some(value)) => Response::Value {
            value: value.into(),
        },
        Ok(None) | Err(shared::Error::NotFound) => Response::NotFound,
        Err(e) => {
            if matches!(e, shared::Error::Interrupted) {
                debug!("Request interrupted");
            }
            Response::Error { msg: e.to_string() }
        }
    }
}
