//! UDP agent loop.
//!
//! Thin tokio glue around [`Engine`]: bind a socket, feed datagrams through
//! the engine, send replies. Requests are processed one at a time on the
//! loop task because MIB callbacks mutate shared state with no locking of
//! their own; the engine's `&mut MibRegistry` makes that explicit.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::engine::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_VARBINDS, Engine};
use crate::error::{Error, Result};
use crate::mib::MibRegistry;

/// Builder for [`Agent`].
///
/// # Example
///
/// ```rust,no_run
/// use microsnmp::{Agent, MibObject, MibRegistry, Value, oid};
///
/// # async fn example() -> Result<(), microsnmp::Error> {
/// let mut mib = MibRegistry::new();
/// mib.register(MibObject::scalar(
///     oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
///     Value::from("demo agent"),
/// ));
///
/// let agent = Agent::builder()
///     .bind("0.0.0.0:161")
///     .community(b"public")
///     .build()
///     .await?;
///
/// agent.run(&mut mib).await
/// # }
/// ```
pub struct AgentBuilder {
    bind_addr: String,
    community: Bytes,
    max_message_size: usize,
    max_varbinds: usize,
    cancel: Option<CancellationToken>,
}

impl AgentBuilder {
    fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:161".to_string(),
            community: Bytes::from_static(b"public"),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_varbinds: DEFAULT_MAX_VARBINDS,
            cancel: None,
        }
    }

    /// Set the bind address (default "0.0.0.0:161").
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the community string (default "public").
    pub fn community(mut self, community: &[u8]) -> Self {
        self.community = Bytes::copy_from_slice(community);
        self
    }

    /// Cap the encoded response size (default 1472).
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Cap the number of varbinds accepted per request.
    pub fn max_varbinds(mut self, count: usize) -> Self {
        self.max_varbinds = count;
        self
    }

    /// Set a cancellation token for graceful shutdown.
    ///
    /// If not set, the agent creates its own token accessible via
    /// [`Agent::cancel`].
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bind the socket and build the agent.
    pub async fn build(self) -> Result<Agent> {
        let bind_addr: SocketAddr = self
            .bind_addr
            .parse()
            .map_err(|_| Error::Config(format!("invalid bind address: {}", self.bind_addr)))?;

        let socket = UdpSocket::bind(bind_addr).await.map_err(|source| Error::Io {
            peer: Some(bind_addr),
            source,
        })?;
        let local_addr = socket.local_addr().map_err(|source| Error::Io {
            peer: Some(bind_addr),
            source,
        })?;

        tracing::info!(
            target: "microsnmp::agent",
            { snmp.local_addr = %local_addr },
            "agent listening"
        );

        Ok(Agent {
            socket,
            local_addr,
            engine: Engine::new(self.community)
                .max_message_size(self.max_message_size)
                .max_varbinds(self.max_varbinds),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// SNMP agent bound to a UDP socket.
#[derive(Debug)]
pub struct Agent {
    socket: UdpSocket,
    local_addr: SocketAddr,
    engine: Engine,
    cancel: CancellationToken,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the local address the agent is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get the cancellation token for this agent.
    ///
    /// Call `token.cancel()` to initiate graceful shutdown.
    pub fn cancel(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Serve requests until the cancellation token fires.
    ///
    /// Datagrams are handled sequentially on this task. Engine-level
    /// failures (a half-applied SET, a registry bug) are logged and the
    /// loop keeps serving; only socket receive errors end it.
    pub async fn run(&self, mib: &mut MibRegistry) -> Result<()> {
        let mut buf = vec![0u8; 65535];

        loop {
            let (len, peer) = tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    result.map_err(|source| Error::Io {
                        peer: None,
                        source,
                    })?
                }
                _ = self.cancel.cancelled() => {
                    tracing::info!(target: "microsnmp::agent", "agent shutdown requested");
                    return Ok(());
                }
            };

            match self.engine.handle(&buf[..len], mib) {
                Ok(Some(response)) => {
                    if let Err(e) = self.socket.send_to(&response, peer).await {
                        tracing::warn!(
                            target: "microsnmp::agent",
                            { snmp.source = %peer, error = %e },
                            "failed to send response"
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        target: "microsnmp::agent",
                        { snmp.source = %peer, error = %e },
                        "error handling request"
                    );
                }
            }
        }
    }
}
