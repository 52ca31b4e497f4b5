//! Session lifecycle
//!
//! ```text
//! Disconnected -> Connecting -> Authenticating -> Ready <-> Locked
//!      ^                                            |         |
//!      +------------- disconnect / broken transport +---------+
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;
use lightpack_core::{Command, Response, DEFAULT_HOST, DEFAULT_PORT};
use lightpack_transport::{LineTransport, TcpConfig, TcpTransport};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

use crate::auth;
use crate::builder::SessionBuilder;
use crate::channel::CommandChannel;
use crate::error::{ClientError, Result};
use crate::lock::LockManager;

/// Connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    /// Pre-shared key; `None` means the controller needs no authentication
    pub api_key: Option<String>,
    pub transport: TcpConfig,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            transport: TcpConfig::default(),
        }
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating,
    Ready,
    Locked,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Authenticating => "authenticating",
            SessionState::Ready => "ready",
            SessionState::Locked => "locked",
        };
        f.write_str(name)
    }
}

/// Lifecycle phase; `Locked` is derived from the lock manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disconnected,
    Connecting,
    Authenticating,
    Ready,
}

/// One connection to a controller
///
/// Every operation takes `&mut self`, so a session serves one caller at a
/// time. Share it between tasks behind a mutex, or open one per task.
pub struct Session {
    config: SessionConfig,
    channel: Option<CommandChannel>,
    lock: LockManager,
    phase: Phase,
}

impl Session {
    /// Create an unconnected session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            channel: None,
            lock: LockManager::new(),
            phase: Phase::Disconnected,
        }
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Connect with default settings (convenience method)
    pub async fn connect_to(host: &str, port: u16) -> Result<Self> {
        SessionBuilder::new().host(host).port(port).connect().await
    }

    /// Connect, run `action`, and always disconnect afterwards
    pub async fn open<T, F>(config: SessionConfig, action: F) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T>>,
    {
        let mut session = Session::new(config);
        session.connect().await?;

        let outcome = AssertUnwindSafe(action(&mut session)).catch_unwind().await;
        session.disconnect().await;

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref()
    }

    /// Change the key used by the next `connect`
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.config.api_key = api_key;
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Disconnected => SessionState::Disconnected,
            Phase::Connecting => SessionState::Connecting,
            Phase::Authenticating => SessionState::Authenticating,
            Phase::Ready if self.lock.is_locked() => SessionState::Locked,
            Phase::Ready => SessionState::Ready,
        }
    }

    /// True once connected and authenticated
    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.channel.as_ref().and_then(|c| c.peer_addr())
    }

    /// Open the TCP connection, discard the welcome line, and authenticate
    ///
    /// On any failure the socket is closed and the session is left
    /// `Disconnected`. Socket errors come back as [`ClientError::Connect`],
    /// a bad greeting as [`ClientError::Handshake`], a refused key as
    /// [`ClientError::AuthenticationFailed`]. Dropping the returned future
    /// part way through also leaves the session `Disconnected`.
    pub async fn connect(&mut self) -> Result<()> {
        let attempt = self.begin_connect()?;

        let host = attempt.session.config.host.clone();
        let port = attempt.session.config.port;
        let transport = TcpTransport::with_config(attempt.session.config.transport.clone());

        let connected = transport.connect(&host, port).await;
        match connected {
            Ok(stream) => attempt.handshake(Box::new(stream)).await,
            Err(e) => {
                warn!("Connection to {}:{} failed: {}", host, port, e);
                Err(ClientError::Connect(e))
            }
        }
    }

    /// Run the connect sequence over an already-open transport
    ///
    /// The configured `host` and `port` are then only used in log messages.
    pub async fn connect_with<T>(&mut self, transport: T) -> Result<()>
    where
        T: LineTransport + 'static,
    {
        self.begin_connect()?.handshake(Box::new(transport)).await
    }

    /// [`Session::connect`] reduced to success or failure; the cause is logged
    pub async fn try_connect(&mut self) -> bool {
        self.connect().await.is_ok()
    }

    fn begin_connect(&mut self) -> Result<ConnectAttempt<'_>> {
        if self.phase != Phase::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        self.phase = Phase::Connecting;
        self.lock.reset();
        Ok(ConnectAttempt {
            session: self,
            done: false,
        })
    }

    /// Release the lock if held, then close the connection
    ///
    /// Returns `false` if there was nothing to disconnect. The session always
    /// ends `Disconnected` and unlocked, whatever the controller answers to
    /// `unlock`.
    pub async fn disconnect(&mut self) -> bool {
        if self.channel.is_none() {
            self.phase = Phase::Disconnected;
            self.lock.reset();
            return false;
        }

        if let Err(e) = self.unlock().await {
            warn!("Unlock during disconnect failed: {}", e);
        }

        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("Error closing socket: {}", e);
            }
        }

        self.phase = Phase::Disconnected;
        self.lock.reset();
        info!("Disconnected from {}:{}", self.config.host, self.config.port);
        true
    }

    /// Send one command and classify the response
    pub async fn execute(&mut self, command: &Command) -> Result<Response> {
        let channel = self.ready_channel()?;
        let result = channel.execute(command).await;
        self.observe(result)
    }

    fn ready_channel(&mut self) -> Result<&mut CommandChannel> {
        if self.phase != Phase::Ready {
            return Err(ClientError::NotConnected);
        }
        self.channel.as_mut().ok_or(ClientError::NotConnected)
    }

    pub(crate) fn lock_parts(&mut self) -> Result<(&mut LockManager, &mut CommandChannel)> {
        if self.phase != Phase::Ready {
            return Err(ClientError::NotConnected);
        }
        match self.channel.as_mut() {
            Some(channel) => Ok((&mut self.lock, channel)),
            None => Err(ClientError::NotConnected),
        }
    }

    /// Drop the connection if the transport died underneath a command
    pub(crate) fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ClientError::Transport(_) | ClientError::NotConnected) = &result {
            if self.channel.is_some() {
                warn!("Connection to {}:{} lost", self.config.host, self.config.port);
                self.channel = None;
            }
            self.phase = Phase::Disconnected;
            self.lock.reset();
        }
        result
    }
}

/// An in-flight connect sequence
///
/// Puts the session back to `Disconnected` on drop unless the handshake
/// completed, so a failed or cancelled connect never leaves it half-open.
struct ConnectAttempt<'a> {
    session: &'a mut Session,
    done: bool,
}

impl ConnectAttempt<'_> {
    async fn handshake(mut self, transport: Box<dyn LineTransport>) -> Result<()> {
        let mut channel = CommandChannel::new(transport);

        if let Err(e) = channel.read_welcome().await {
            return abort_connect(channel, e).await;
        }

        self.session.phase = Phase::Authenticating;
        let api_key = self.session.config.api_key.as_deref();
        if let Err(e) = auth::authenticate(&mut channel, api_key).await {
            return abort_connect(channel, e).await;
        }

        self.session.channel = Some(channel);
        self.session.phase = Phase::Ready;
        self.done = true;
        info!(
            "Connected to {}:{}",
            self.session.config.host, self.session.config.port
        );
        Ok(())
    }
}

impl Drop for ConnectAttempt<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.session.phase = Phase::Disconnected;
        }
    }
}

async fn abort_connect(mut channel: CommandChannel, err: ClientError) -> Result<()> {
    warn!("Connect sequence failed: {}", err);
    if let Err(e) = channel.close().await {
        debug!("Error closing socket: {}", e);
    }
    Err(err)
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.lock.is_locked() {
            warn!("Session dropped while holding the controller lock");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("state", &self.state())
            .finish()
    }
}
