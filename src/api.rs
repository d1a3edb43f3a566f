use std::{io, sync::Arc};

use serde_json::Value;

use crate::transport::Transport;

/// Typed facade over the neophyte RPC channel.
///
/// Each call is a single stateless send or round-trip; the facade holds no
/// state of its own. Fractional inputs are truncated toward zero before
/// transmission, so the setter argument on the wire is always a whole
/// number.
pub struct NeophyteClient {
    transport: Arc<dyn Transport>,
}

impl NeophyteClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Set the font height in pixels. Fire-and-forget; no reply is awaited.
    pub async fn set_font_height(&self, height: f64) -> io::Result<()> {
        self.transport
            .notify("neophyte.set_font_height", vec![Value::from(height as i64)])
            .await
    }

    /// Set the font width in pixels. Fire-and-forget; no reply is awaited.
    pub async fn set_font_width(&self, width: f64) -> io::Result<()> {
        self.transport
            .notify("neophyte.set_font_width", vec![Value::from(width as i64)])
            .await
    }

    /// Ask the host for the number ten. Suspends until the reply arrives
    /// and returns it as-is.
    pub async fn get_ten(&self) -> io::Result<i64> {
        let reply = self
            .transport
            .request("neophyte.get_ten", Vec::new())
            .await?;
        reply.as_i64().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected integer reply, got {reply}"),
            )
        })
    }
}
