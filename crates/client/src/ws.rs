//! Timeout-bounded WebSocket sessions.
//!
//! [`WsSession::connect`] resolves its URL and headers the same way the
//! HTTP client does, then opens the socket immediately; construction is the
//! connection. A driver task owns the socket and dispatches events
//! serially, so handlers always run to completion before the next frame is
//! delivered.
//!
//! The session is bounded by an optional one-shot timeout: when it fires,
//! the transport is torn down and the close event reports code 1006 with
//! reason "Connection Timeout". Whatever ends the session, the pending
//! timer is cancelled with it; a terminated session never leaves a timer
//! behind.

use std::collections::{BTreeMap, HashMap};
use std::pin::Pin;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Sleep, sleep};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use surge_domain::{
    Authenticator, CLOSE_ABNORMAL, CLOSE_NORMAL, CredentialDefaults, HandshakeFrame, HeaderMap,
    HubFrame, NORMAL_CLOSE_REASON, Protocol, SessionState, SessionTags, TIMEOUT_CLOSE_REASON,
    TargetSpec,
};

use crate::error::{ClientError, ClientResult};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default session timeout duration.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for opening a WebSocket session.
#[derive(Debug, Clone, Default)]
pub struct WsOptions {
    /// Where the socket connects; resolved by the same base-URL rules as
    /// HTTP targets.
    pub target: TargetSpec,
    /// Handshake headers. When absent, the default API set composed with
    /// the resolved credentials is used.
    pub headers: Option<HeaderMap>,
    /// Explicit basic-auth username.
    pub username: Option<String>,
    /// Explicit basic-auth password.
    pub password: Option<String>,
    /// Explicit bearer token.
    pub token: Option<String>,
    /// Injected fallback credentials.
    pub defaults: CredentialDefaults,
    /// Session id; generated when absent.
    pub session_id: Option<String>,
    /// Caller tags attached to session events and error records.
    pub tags: BTreeMap<String, String>,
    /// Duration used by [`WsSession::start_default_timeout`].
    pub timeout: Option<Duration>,
    /// Hub handshake frame; `Some` switches the session into SignalR mode
    /// (handshake on open, per-target frame dispatch).
    pub handshake: Option<HandshakeFrame>,
}

impl WsOptions {
    /// Creates options for a target.
    #[must_use]
    pub fn new(target: TargetSpec) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Creates options for a `wss://` host.
    #[must_use]
    pub fn from_host(host: impl Into<String>) -> Self {
        Self::new(TargetSpec::from_host(host).with_protocol(Protocol::Wss))
    }

    /// Supplies an explicit header set, skipping credential composition.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets explicit basic-auth credentials.
    #[must_use]
    pub fn with_basic(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets an explicit bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Injects fallback credentials.
    #[must_use]
    pub fn with_credential_defaults(mut self, defaults: CredentialDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Supplies the session id instead of generating one.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Adds a session tag.
    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Sets the default timeout duration.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables SignalR mode with the standard `json`/1 handshake.
    #[must_use]
    pub fn with_signalr(mut self) -> Self {
        self.handshake = Some(HandshakeFrame::default());
        self
    }

    /// Enables SignalR mode with a custom handshake frame.
    #[must_use]
    pub fn with_handshake(mut self, frame: HandshakeFrame) -> Self {
        self.handshake = Some(frame);
        self
    }
}

/// Events emitted by a session, in arrival order.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// The socket opened (and any handshake frame was sent).
    Open,
    /// An inbound text message.
    Message(String),
    /// An inbound binary message.
    Binary(Vec<u8>),
    /// The session ended. Timeout closures carry code 1006 and reason
    /// "Connection Timeout".
    Closed {
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
    /// A transport error; a `Closed` event follows.
    Error(String),
}

/// Handler invoked for hub frames carrying a matching target.
pub type TargetHandler = Box<dyn FnMut(HubFrame) + Send>;

enum Command {
    Send(String),
    Close { code: u16, reason: String },
    StartTimeout(Duration),
    CancelTimeout,
    Register { target: String, handler: TargetHandler },
}

/// A live WebSocket session handle.
///
/// Dropping the handle closes the session normally.
pub struct WsSession {
    url: String,
    headers: HeaderMap,
    tags: SessionTags,
    timeout_duration: Duration,
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<WsEvent>,
    state: watch::Receiver<SessionState>,
}

impl WsSession {
    /// Resolves the URL, headers, and tags, then opens the socket.
    ///
    /// # Errors
    ///
    /// Fails fast on configuration errors and when the socket cannot be
    /// established; everything after construction is reported through
    /// events instead.
    pub async fn connect(options: WsOptions) -> ClientResult<Self> {
        let base_url = options.target.resolve()?;
        let headers = options.headers.unwrap_or_else(|| {
            let authenticator = Authenticator::new(
                options.username.as_deref(),
                options.password.as_deref(),
                options.token.as_deref(),
                &options.defaults,
            );
            HeaderMap::api_defaults().with_authorization(&authenticator)
        });
        let tags = SessionTags::new(options.session_id, options.tags);
        let url = base_url.as_str().to_string();

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::Connect(e.to_string()))?;
        for (name, value) in headers.iter() {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                continue;
            };
            let Ok(value) = HeaderValue::from_str(value) else {
                continue;
            };
            request.headers_mut().insert(name, value);
        }

        let (socket, _response) = connect_async(request)
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;

        tracing::info!(
            target: "surge::ws",
            url = %url,
            session_id = tags.session_id(),
            "websocket session opened"
        );

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(256);
        let (state_tx, state) = watch::channel(SessionState::Open);

        tokio::spawn(drive(
            socket,
            command_rx,
            events.clone(),
            state_tx,
            options.handshake,
        ));

        Ok(Self {
            url,
            headers,
            tags,
            timeout_duration: options.timeout.unwrap_or(DEFAULT_SESSION_TIMEOUT),
            commands,
            events,
            state,
        })
    }

    /// Returns the resolved socket URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the handshake headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the session tags.
    #[must_use]
    pub const fn tags(&self) -> &SessionTags {
        &self.tags
    }

    /// Returns the session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.tags.session_id()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribes to session events from this point on.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<WsEvent> {
        self.events.subscribe()
    }

    /// Serializes `message` to JSON text and transmits it.
    ///
    /// # Errors
    ///
    /// Fails when the message cannot be serialized or the session has
    /// terminated.
    pub fn send<T: serde::Serialize + ?Sized>(&self, message: &T) -> ClientResult<()> {
        let text = serde_json::to_string(message)?;
        self.send_text(text)
    }

    /// Transmits text verbatim.
    ///
    /// # Errors
    ///
    /// Fails when the session has terminated.
    pub fn send_text(&self, text: impl Into<String>) -> ClientResult<()> {
        self.command(Command::Send(text.into()))
    }

    /// Registers a handler for hub frames with a matching `target` field.
    /// Unhandled targets are logged and ignored.
    ///
    /// # Errors
    ///
    /// Fails when the session has terminated.
    pub fn on_target(
        &self,
        target: impl Into<String>,
        handler: impl FnMut(HubFrame) + Send + 'static,
    ) -> ClientResult<()> {
        self.command(Command::Register {
            target: target.into(),
            handler: Box::new(handler),
        })
    }

    /// Arms the one-shot timeout: unless the session closes first, the
    /// socket is force-closed after `duration` with code 1006 and reason
    /// "Connection Timeout". Arming again replaces the pending timer.
    ///
    /// # Errors
    ///
    /// Fails when the session has terminated.
    pub fn start_timeout(&self, duration: Duration) -> ClientResult<()> {
        self.command(Command::StartTimeout(duration))
    }

    /// Arms the timeout with the duration from [`WsOptions`].
    ///
    /// # Errors
    ///
    /// Fails when the session has terminated.
    pub fn start_default_timeout(&self) -> ClientResult<()> {
        self.start_timeout(self.timeout_duration)
    }

    /// Clears the pending timeout. Idempotent; a no-op without one or after
    /// termination.
    pub fn cancel_timeout(&self) {
        let _ = self.commands.send(Command::CancelTimeout);
    }

    /// Closes the session normally (1000, "Normal Closure").
    pub fn close(&self) {
        self.close_with(CLOSE_NORMAL, NORMAL_CLOSE_REASON);
    }

    /// Closes the session with an explicit code and reason.
    pub fn close_with(&self, code: u16, reason: &str) {
        let _ = self.commands.send(Command::Close {
            code,
            reason: reason.to_string(),
        });
    }

    fn command(&self, command: Command) -> ClientResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::SessionClosed)
    }
}

async fn drive(
    socket: Socket,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: broadcast::Sender<WsEvent>,
    state: watch::Sender<SessionState>,
    handshake: Option<HandshakeFrame>,
) {
    let signalr = handshake.is_some();
    let (mut writer, mut reader) = socket.split();
    let mut handlers: HashMap<String, TargetHandler> = HashMap::new();
    let mut deadline: Option<Pin<Box<Sleep>>> = None;
    let mut handle_dropped = false;

    if let Some(frame) = handshake {
        if let Err(e) = writer.send(Message::Text(frame.to_wire().into())).await {
            tracing::warn!(target: "surge::ws", error = %e, "failed to send handshake frame");
        }
    }
    let _ = events.send(WsEvent::Open);

    loop {
        tokio::select! {
            command = commands.recv(), if !handle_dropped => match command {
                Some(Command::Send(text)) => {
                    tracing::debug!(target: "surge::ws", message = %text, "sending message");
                    if let Err(e) = writer.send(Message::Text(text.into())).await {
                        let _ = events.send(WsEvent::Error(e.to_string()));
                    }
                }
                Some(Command::Close { code, reason }) => {
                    let _ = state.send(SessionState::Closing);
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    if writer.send(Message::Close(Some(frame))).await.is_err() {
                        deadline = None;
                        let _ = events.send(WsEvent::Closed { code, reason });
                        break;
                    }
                    // The peer's acknowledgement arrives on the reader.
                }
                Some(Command::StartTimeout(duration)) => {
                    // Re-arming replaces the pending timer; timers never stack.
                    tracing::debug!(target: "surge::ws", ?duration, "timeout armed");
                    deadline = Some(Box::pin(sleep(duration)));
                }
                Some(Command::CancelTimeout) => {
                    deadline = None;
                }
                Some(Command::Register { target, handler }) => {
                    handlers.insert(target, handler);
                }
                None => {
                    // Session handle dropped: initiate a normal close.
                    handle_dropped = true;
                    let _ = state.send(SessionState::Closing);
                    let frame = CloseFrame {
                        code: CloseCode::from(CLOSE_NORMAL),
                        reason: NORMAL_CLOSE_REASON.into(),
                    };
                    if writer.send(Message::Close(Some(frame))).await.is_err() {
                        deadline = None;
                        break;
                    }
                }
            },
            () = wait_deadline(&mut deadline), if deadline.is_some() => {
                tracing::info!(target: "surge::ws", "closing websocket session after timeout");
                deadline = None;
                let _ = events.send(WsEvent::Closed {
                    code: CLOSE_ABNORMAL,
                    reason: TIMEOUT_CLOSE_REASON.to_string(),
                });
                // Dropping the transport is the abnormal closure the event
                // reports; 1006 is never sent on the wire.
                break;
            },
            frame = reader.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if signalr {
                        dispatch_hub_frame(&mut handlers, text.as_str());
                    }
                    let _ = events.send(WsEvent::Message(text.as_str().to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    let _ = events.send(WsEvent::Binary(data.to_vec()));
                }
                Some(Ok(Message::Close(frame))) => {
                    deadline = None;
                    let (code, reason) = frame.map_or((CLOSE_NORMAL, String::new()), |f| {
                        (f.code.into(), f.reason.as_str().to_string())
                    });
                    let _ = events.send(WsEvent::Closed { code, reason });
                    break;
                }
                Some(Ok(_)) => {} // ping/pong, handled by the protocol layer
                Some(Err(e)) => {
                    deadline = None;
                    let _ = events.send(WsEvent::Error(e.to_string()));
                    let _ = events.send(WsEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    break;
                }
                None => {
                    deadline = None;
                    let _ = events.send(WsEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    break;
                }
            },
        }
    }

    let _ = state.send(SessionState::Closed);
    tracing::info!(target: "surge::ws", "websocket session closed");
}

async fn wait_deadline(deadline: &mut Option<Pin<Box<Sleep>>>) {
    match deadline.as_mut() {
        Some(sleep) => sleep.await,
        None => std::future::pending().await,
    }
}

fn dispatch_hub_frame(handlers: &mut HashMap<String, TargetHandler>, text: &str) {
    match HubFrame::parse(text) {
        Ok(frame) => match frame.target.clone() {
            Some(hub_target) => match handlers.get_mut(&hub_target) {
                Some(handler) => handler(frame),
                None => {
                    tracing::debug!(target: "surge::ws", %hub_target, "unhandled hub frame");
                }
            },
            None => tracing::debug!(target: "surge::ws", "hub protocol message received"),
        },
        // Malformed frames never terminate the session.
        Err(e) => tracing::warn!(target: "surge::ws", error = %e, "failed to parse hub frame"),
    }
}
