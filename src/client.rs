use std::{
    io,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::{mpsc, oneshot},
};

use crate::{
    rpc::{read_packet, write_packet, ChannelId, MsgId, RpcMessage},
    transport::Transport,
};

/// Abstraction for any asynchronous stream that can both read and write,
/// so the client actor stays agnostic of the underlying transport.
pub trait AsyncStream: AsyncRead + AsyncWrite {}
impl<T: AsyncRead + AsyncWrite + Unpin> AsyncStream for T {}

#[cfg(unix)]
pub const UNIX_PATH: &str = "/tmp/neophyte.sock";

/// Request from a handle to the client actor. `reply` is present for
/// two-way requests only; notifications carry `None` and the handle does
/// not wait for anything once the message is queued.
struct ClientMsg {
    msg: RpcMessage,
    reply: Option<(MsgId, oneshot::Sender<io::Result<Value>>)>,
}

/// Actor-backed client for one RPC channel.
///
/// A spawned task owns the stream; cloned handles feed it over an mpsc
/// channel. The channel handle is injected at construction and tagged onto
/// every outgoing message; it is never reassigned.
#[derive(Clone)]
pub struct ChannelClient {
    channel: ChannelId,
    next_msgid: Arc<AtomicU64>,
    tx: mpsc::Sender<ClientMsg>,
}

impl ChannelClient {
    /// Connect to the host: TCP if the `NEOPHYTE_ADDR` env var is set,
    /// otherwise the Unix socket at [`UNIX_PATH`].
    pub async fn connect(channel: ChannelId) -> io::Result<Self> {
        let stream: Box<dyn AsyncStream + Send + Unpin> =
            if let Ok(addr) = std::env::var("NEOPHYTE_ADDR") {
                let tcp = TcpStream::connect(addr.as_str()).await?;
                log::info!("connected to {addr} via TCP");
                Box::new(tcp)
            } else {
                #[cfg(unix)]
                {
                    let unix = tokio::net::UnixStream::connect(UNIX_PATH).await?;
                    log::info!("connected to {UNIX_PATH} via Unix socket");
                    Box::new(unix)
                }

                #[cfg(not(unix))]
                {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "NEOPHYTE_ADDR must be set on this platform",
                    ));
                }
            };

        Ok(Self::from_stream(stream, channel))
    }

    /// Run the client over an already-established stream.
    pub fn from_stream<S>(stream: S, channel: ChannelId) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<ClientMsg>(32);

        // Spawn the client actor task
        tokio::spawn(async move {
            let mut stream = stream;

            while let Some(ClientMsg { msg, reply }) = rx.recv().await {
                let data = match serde_json::to_vec(&msg) {
                    Ok(d) => d,
                    Err(e) => {
                        let err = io::Error::new(io::ErrorKind::InvalidData, e);
                        match reply {
                            Some((_, resp_tx)) => {
                                let _ = resp_tx.send(Err(err));
                            }
                            None => log::error!("failed to serialize notification: {err}"),
                        }
                        continue;
                    }
                };

                // A failed write means the stream is gone; exit so later
                // sends fail fast instead of silently queueing.
                if let Err(e) = write_packet(&mut stream, &data).await {
                    match reply {
                        Some((_, resp_tx)) => {
                            let _ = resp_tx.send(Err(e));
                        }
                        None => log::error!("failed to send notification: {e}"),
                    }
                    break;
                }

                // Notifications are done once written.
                let Some((wanted, resp_tx)) = reply else {
                    continue;
                };

                // Block this actor until the correlated reply arrives.
                let mut connection_lost = false;
                let result = loop {
                    let buf = match read_packet(&mut stream).await {
                        Ok(buf) => buf,
                        Err(e) => {
                            connection_lost = true;
                            break Err(e);
                        }
                    };

                    match serde_json::from_slice::<RpcMessage>(&buf) {
                        Ok(RpcMessage::Response {
                            msgid,
                            result,
                            error,
                        }) if msgid == wanted => {
                            break match error {
                                Some(message) => {
                                    Err(io::Error::new(io::ErrorKind::Other, message))
                                }
                                None => Ok(result),
                            };
                        }
                        Ok(other) => {
                            log::debug!("skipping message while awaiting {wanted:?}: {other:?}");
                        }
                        Err(e) => break Err(io::Error::new(io::ErrorKind::InvalidData, e)),
                    }
                };

                let _ = resp_tx.send(result);
                if connection_lost {
                    break;
                }
            }
        });

        Self {
            channel,
            next_msgid: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    fn alloc_msgid(&self) -> MsgId {
        MsgId(self.next_msgid.fetch_add(1, Ordering::Relaxed))
    }

    async fn send(&self, msg: ClientMsg) -> io::Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "Client actor dropped"))
    }
}

#[async_trait]
impl Transport for ChannelClient {
    async fn notify(&self, method: &str, params: Vec<Value>) -> io::Result<()> {
        let msg = RpcMessage::Notification {
            channel: self.channel,
            method: method.to_owned(),
            params,
        };
        self.send(ClientMsg { msg, reply: None }).await
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> io::Result<Value> {
        let msgid = self.alloc_msgid();
        let msg = RpcMessage::Request {
            channel: self.channel,
            msgid,
            method: method.to_owned(),
            params,
        };

        let (resp_tx, resp_rx) = oneshot::channel();
        self.send(ClientMsg {
            msg,
            reply: Some((msgid, resp_tx)),
        })
        .await?;

        // Wait for reply
        resp_rx.await.unwrap_or_else(|_| {
            Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "Client actor ended",
            ))
        })
    }
}
