use crate::protocol::{self, Request, Response};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::io;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Minimal request/response client for the TCP host.
pub struct BenchClient {
    framed: Framed<TcpStream, LengthDelimitedCodec>,
}

impl BenchClient {
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            framed: Framed::new(stream, protocol::codec()),
        })
    }

    pub async fn ping(&mut self) -> io::Result<Response> {
        self.call(Request::Ping).await
    }

    pub async fn hello(&mut self, mode: &str, sleep: i64) -> io::Result<Response> {
        self.call(Request::Hello {
            mode: mode.to_string(),
            sleep,
        })
        .await
    }

    pub async fn get(&mut self, key: &str) -> io::Result<Response> {
        self.call(Request::Get {
            key: Bytes::copy_from_slice(key.as_bytes()),
        })
        .await
    }

    pub async fn call(&mut self, request: Request) -> io::Result<Response> {
        self.framed.send(request.encode()).await?;
        let frame = self.framed.next().await.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by server")
        })??;
        Response::decode(frame.freeze()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
