use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Opaque identifier of the RPC endpoint a message is addressed to.
///
/// The handle is assigned by the host when the channel is established and
/// stays fixed for the lifetime of the connection; this crate only carries
/// it, it never creates or reassigns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Correlation id tying a [`RpcMessage::Response`] back to its
/// [`RpcMessage::Request`]. Allocated sequentially by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsgId(pub u64);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum RpcMessage {
    /// One-way message; the host never replies to it.
    Notification {
        channel: ChannelId,
        method: String,
        params: Vec<Value>,
    },
    /// Two-way message; the host answers with a `Response` carrying the
    /// same `msgid`.
    Request {
        channel: ChannelId,
        msgid: MsgId,
        method: String,
        params: Vec<Value>,
    },
    Response {
        msgid: MsgId,
        result: Value,
        error: Option<String>,
    },
}

/// Upper bound on a single packet body.
pub const MAX_PACKET: usize = (u16::MAX as usize) + 1;

/// Write one length-prefixed packet (u32 little-endian length, then body).
pub async fn write_packet<S>(stream: &mut S, data: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    if data.len() > MAX_PACKET {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("packet of {} bytes exceeds limit", data.len()),
        ));
    }
    stream.write_all(&(data.len() as u32).to_le_bytes()).await?;
    stream.write_all(data).await?;
    stream.flush().await
}

/// Read one length-prefixed packet. Fails with `UnexpectedEof` when the
/// peer closes the stream mid-packet or before one starts.
pub async fn read_packet<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut len = [0u8; 4];
    stream.read_exact(&mut len).await?;
    let len = u32::from_le_bytes(len) as usize;
    if len > MAX_PACKET {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("peer announced packet of {len} bytes"),
        ));
    }
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}
