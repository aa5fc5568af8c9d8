use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::LengthDelimitedCodec;

// Command type identifiers
pub const CMD_PING: u8 = 0x00;
pub const CMD_HELLO: u8 = 0x01;
pub const CMD_GET: u8 = 0x02;

// Response type identifiers
pub const RESP_PONG: u8 = 0x00;
pub const RESP_VALUE: u8 = 0x02;
pub const RESP_NOT_FOUND: u8 = 0x03;
pub const RESP_ERROR: u8 = 0x04;

pub const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Length-delimited framing with a 4-byte big-endian length prefix.
pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Ping,
    /// `sleep` is in seconds; validation happens in the service, not the codec.
    Hello { mode: String, sleep: i64 },
    Get { key: Bytes },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Pong,
    Value { value: Bytes },
    NotFound,
    Error { msg: String },
}

impl Request {
    /// Encode a Request into Bytes for transmission
    ///
    /// Format:
    /// - PING: [0x00]
    /// - HELLO: [0x01][mode_len: u32][mode bytes][sleep: i64]
    /// - GET: [0x02][key_len: u32][key bytes]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        match self {
            Request::Ping => {
                buf.put_u8(CMD_PING);
            }
            Request::Hello { mode, sleep } => {
                buf.put_u8(CMD_HELLO);
                put_chunk(&mut buf, mode.as_bytes());
                buf.put_i64(*sleep);
            }
            Request::Get { key } => {
                buf.put_u8(CMD_GET);
                put_chunk(&mut buf, key);
            }
        }

        buf.freeze()
    }

    /// Decode a Request from a complete frame produced by [`codec`].
    pub fn decode(mut buf: Bytes) -> Result<Self, String> {
        if buf.is_empty() {
            return Err("Empty buffer".to_string());
        }

        let cmd = buf.get_u8();

        match cmd {
            CMD_PING => Ok(Request::Ping),
            CMD_HELLO => {
                let mode_bytes = take_chunk(&mut buf, "HELLO", "mode")?;
                let mode = String::from_utf8(mode_bytes.to_vec())
                    .map_err(|e| format!("Invalid mode UTF-8: {}", e))?;
                if buf.remaining() < 8 {
                    return Err("Invalid HELLO: missing sleep".to_string());
                }
                let sleep = buf.get_i64();
                Ok(Request::Hello { mode, sleep })
            }
            CMD_GET => {
                let key = take_chunk(&mut buf, "GET", "key")?;
                Ok(Request::Get { key })
            }
            _ => Err(format!("Unknown command: 0x{:02X}", cmd)),
        }
    }
}

impl Response {
    /// Encode a Response into Bytes for transmission
    ///
    /// Format:
    /// - PONG: [0x00]
    /// - VALUE: [0x02][value_len: u32][value bytes]
    /// - NOT_FOUND: [0x03]
    /// - ERROR: [0x04][msg_len: u32][msg bytes]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        match self {
            Response::Pong => {
                buf.put_u8(RESP_PONG);
            }
            Response::Value { value } => {
                buf.put_u8(RESP_VALUE);
                put_chunk(&mut buf, value);
            }
            Response::NotFound => {
                buf.put_u8(RESP_NOT_FOUND);
            }
            Response::Error { msg } => {
                buf.put_u8(RESP_ERROR);
                put_chunk(&mut buf, msg.as_bytes());
            }
        }

        buf.freeze()
    }

    /// Decode a Response from Bytes received from the network
    pub fn decode(mut buf: Bytes) -> Result<Self, String> {
        if buf.is_empty() {
            return Err("Empty buffer".to_string());
        }

        let resp_type = buf.get_u8();

        match resp_type {
            RESP_PONG => Ok(Response::Pong),
            RESP_VALUE => {
                let value = take_chunk(&mut buf, "VALUE", "value")?;
                Ok(Response::Value { value })
            }
            RESP_NOT_FOUND => Ok(Response::NotFound),
            RESP_ERROR => {
                let msg_bytes = take_chunk(&mut buf, "ERROR", "msg")?;
                let msg = String::from_utf8_lossy(&msg_bytes).to_string();
                Ok(Response::Error { msg })
            }
            _ => Err(format!("Unknown response type: 0x{:02X}", resp_type)),
        }
    }
}

fn put_chunk(buf: &mut BytesMut, chunk: &[u8]) {
    buf.put_u32(chunk.len() as u32);
    buf.put_slice(chunk);
}

fn take_chunk(buf: &mut Bytes, what: &str, field: &str) -> Result<Bytes, String> {
    if buf.remaining() < 4 {
        return Err(format!("Invalid {}: missing {} length", what, field));
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(format!(
            "Invalid {}: expected {} bytes, got {}",
            what,
            len,
            buf.remaining()
        ));
    }
    Ok(buf.copy_to_bytes(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_encode_decode() {
        let req = Request::Hello {
            mode: "virtual".to_string(),
            sleep: -3,
        };
        let decoded = Request::decode(req.encode()).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_get_with_empty_key_survives_decoding() {
        let req = Request::Get { key: Bytes::new() };
        let decoded = Request::decode(req.encode()).unwrap();
        assert_eq!(decoded, Request::Get { key: Bytes::new() });
    }

    #[test]
    fn test_truncated_frames_rejected() {
        let mut encoded = Request::Hello {
            mode: "platform".to_string(),
            sleep: 1,
        }
        .encode();
        encoded.truncate(encoded.len() - 1);
        assert!(Request::decode(encoded).unwrap_err().contains("sleep"));

        let frame = Bytes::from_static(&[CMD_GET, 0, 0, 0, 9, b'k']);
        assert!(Request::decode(frame).unwrap_err().contains("expected 9 bytes"));

        assert!(Request::decode(Bytes::new()).is_err());
        assert!(Request::decode(Bytes::from_static(&[0x7F])).is_err());
    }

    #[test]
    fn test_response_value_encode_decode() {
        let resp = Response::Value {
            value: Bytes::from("test_data"),
        };
        let decoded = Response::decode(resp.encode()).unwrap();
        assert_eq!(decoded, resp);

        let resp = Response::Error {
            msg: "sleep interrupted".to_string(),
        };
        assert_eq!(Response::decode(resp.encode()).unwrap(), resp);
    }
}
