use std::io;

use async_trait::async_trait;
use serde_json::Value;

/// The two primitives this crate consumes from the underlying RPC channel.
///
/// - [`notify`](Transport::notify) is fire-and-forget: it resolves once the
///   message has been handed off for sending and never waits on the peer.
/// - [`request`](Transport::request) suspends the caller until the host's
///   reply arrives and returns the reply value unmodified.
///
/// No timeout or cancellation is defined here; those belong to whatever
/// runtime sits behind the implementation. Failures surface as plain
/// [`io::Error`]s, unwrapped.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn notify(&self, method: &str, params: Vec<Value>) -> io::Result<()>;

    async fn request(&self, method: &str, params: Vec<Value>) -> io::Result<Value>;
}
