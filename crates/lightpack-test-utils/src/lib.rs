//! Test helpers for Lightpack clients
//!
//! This crate provides:
//! - [`MockController`]: a TCP server speaking the controller's line protocol
//! - [`ControllerModel`]: the state the default mock answers from, with the
//!   lock shared between all connections
//! - Scripted mode for feeding arbitrary replies

use lightpack_core::{parse_records, LedArea, Rgb};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

/// Greeting sent by the mock on every new connection
pub const WELCOME: &str = "Lightpack API v1.4 - Prismatik API v2.2 (type \"help\" for more info)";

/// Index of an accepted connection, starting at 0
pub type ConnectionId = usize;

/// What the mock sends back for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A line; `\r\n` is appended
    Line(String),
    /// Bytes written verbatim
    Raw(Vec<u8>),
    /// Close the connection without answering
    Close,
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Line(s.to_string())
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::Line(s)
    }
}

type Responder = Box<dyn FnMut(ConnectionId, &str) -> Reply + Send>;

// ============================================================================
// Port Allocation
// ============================================================================

/// A local port with nothing listening on it
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// Mock Controller - aborted on drop
// ============================================================================

/// A mock controller listening on `127.0.0.1`
pub struct MockController {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    model: Arc<Mutex<ControllerModel>>,
    handle: JoinHandle<()>,
}

impl MockController {
    /// Start a mock with the default model and no API key
    pub async fn start() -> Self {
        Self::with_model(ControllerModel::default()).await
    }

    /// Start a mock that requires `key`
    pub async fn with_api_key(key: &str) -> Self {
        Self::with_model(ControllerModel {
            api_key: Some(key.to_string()),
            ..ControllerModel::default()
        })
        .await
    }

    /// Start a mock answering from `model`
    pub async fn with_model(model: ControllerModel) -> Self {
        let model = Arc::new(Mutex::new(model));
        let shared = Arc::clone(&model);
        let responder: Responder = Box::new(move |conn, line| shared.lock().handle(conn, line));
        Self::spawn(Reply::from(WELCOME), responder, model).await
    }

    /// Start a mock that answers every line with `script(line)`
    pub async fn scripted<F>(script: F) -> Self
    where
        F: FnMut(&str) -> Reply + Send + 'static,
    {
        Self::scripted_with_welcome(Reply::from(WELCOME), script).await
    }

    /// Like [`MockController::scripted`] with a custom greeting
    pub async fn scripted_with_welcome<F>(welcome: Reply, mut script: F) -> Self
    where
        F: FnMut(&str) -> Reply + Send + 'static,
    {
        let responder: Responder = Box::new(move |_, line| script(line));
        Self::spawn(
            welcome,
            responder,
            Arc::new(Mutex::new(ControllerModel::default())),
        )
        .await
    }

    async fn spawn(welcome: Reply, responder: Responder, model: Arc<Mutex<ControllerModel>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let responder = Arc::new(Mutex::new(responder));

        let handle = {
            let received = Arc::clone(&received);
            let connections = Arc::clone(&connections);
            let model = Arc::clone(&model);

            tokio::spawn(async move {
                while let Ok((stream, peer)) = listener.accept().await {
                    let id = connections.fetch_add(1, Ordering::SeqCst);
                    debug!("Mock accepted connection {} from {}", id, peer);

                    tokio::spawn(serve(
                        stream,
                        id,
                        welcome.clone(),
                        Arc::clone(&responder),
                        Arc::clone(&received),
                        Arc::clone(&model),
                    ));
                }
            })
        };

        Self {
            addr,
            received,
            connections,
            model,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Every line received so far, across connections, without delimiters
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Number of received lines whose verb is `verb`
    pub fn count(&self, verb: &str) -> usize {
        self.received
            .lock()
            .iter()
            .filter(|line| line.split(':').next() == Some(verb))
            .count()
    }

    /// Number of accepted connections
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Inspect or modify the model
    pub fn model(&self) -> MutexGuard<'_, ControllerModel> {
        self.model.lock()
    }
}

impl Drop for MockController {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    stream: TcpStream,
    id: ConnectionId,
    welcome: Reply,
    responder: Arc<Mutex<Responder>>,
    received: Arc<Mutex<Vec<String>>>,
    model: Arc<Mutex<ControllerModel>>,
) {
    let (reader, mut writer) = stream.into_split();

    if write_reply(&mut writer, &welcome).await {
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim_end_matches('\r').to_string();
            received.lock().push(line.clone());

            let reply = {
                let mut respond = responder.lock();
                respond(id, &line)
            };

            if !write_reply(&mut writer, &reply).await {
                break;
            }
        }
    }

    debug!("Mock connection {} closed", id);
    model.lock().disconnected(id);
}

async fn write_reply(writer: &mut OwnedWriteHalf, reply: &Reply) -> bool {
    let result = match reply {
        Reply::Line(line) => writer.write_all(format!("{}\r\n", line).as_bytes()).await,
        Reply::Raw(bytes) => writer.write_all(bytes).await,
        Reply::Close => return false,
    };
    result.is_ok()
}

// ============================================================================
// Controller Model
// ============================================================================

/// State behind the default mock
#[derive(Debug, Clone)]
pub struct ControllerModel {
    pub api_key: Option<String>,
    pub authorized: HashSet<ConnectionId>,
    pub lock_holder: Option<ConnectionId>,
    pub status: String,
    pub mode: String,
    pub profile: String,
    pub profiles: Vec<String>,
    pub gamma: f64,
    pub brightness: u8,
    pub smooth: u8,
    pub leds: Vec<LedArea>,
    pub colors: Vec<Rgb>,
    pub fps: String,
    pub screen: String,
}

impl Default for ControllerModel {
    fn default() -> Self {
        Self::with_leds(10)
    }
}

impl ControllerModel {
    /// A model with `count` LEDs laid out left to right
    pub fn with_leds(count: usize) -> Self {
        Self {
            api_key: None,
            authorized: HashSet::new(),
            lock_holder: None,
            status: "on".to_string(),
            mode: "ambilight".to_string(),
            profile: "Lightpack".to_string(),
            profiles: vec!["Lightpack".to_string(), "Movies".to_string()],
            gamma: 2.0,
            brightness: 100,
            smooth: 100,
            leds: (0..count)
                .map(|i| LedArea::new(i as i32 * 100, 0, 100, 50))
                .collect(),
            colors: vec![Rgb::BLACK; count],
            fps: "60.0".to_string(),
            screen: "0,0,1920,1080".to_string(),
        }
    }

    /// Answer one request line from connection `conn`
    pub fn handle(&mut self, conn: ConnectionId, line: &str) -> Reply {
        let (verb, arg) = match line.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (line, None),
        };

        if self.api_key.is_some() && !self.authorized.contains(&conn) && verb != "apikey" {
            return "authorization required".into();
        }

        match verb {
            "apikey" => match (&self.api_key, arg) {
                (None, _) => "ok".into(),
                (Some(key), Some(given)) if key == given => {
                    self.authorized.insert(conn);
                    "ok".into()
                }
                _ => "fail".into(),
            },
            "lock" => match self.lock_holder {
                None => {
                    self.lock_holder = Some(conn);
                    "lock:success".into()
                }
                Some(holder) if holder == conn => "lock:success".into(),
                Some(_) => "lock:busy".into(),
            },
            "unlock" => {
                if self.lock_holder == Some(conn) {
                    self.lock_holder = None;
                    "unlock:success".into()
                } else {
                    "unlock:not locked".into()
                }
            }
            "getstatus" => format!("status:{}", self.status).into(),
            "getstatusapi" => {
                let state = if self.lock_holder.is_some() { "busy" } else { "idle" };
                format!("statusapi:{}", state).into()
            }
            "getprofiles" => {
                let list: String = self.profiles.iter().map(|p| format!("{};", p)).collect();
                format!("profiles:{}", list).into()
            }
            "getprofile" => format!("profile:{}", self.profile).into(),
            "getcountleds" => format!("countleds:{}", self.leds.len()).into(),
            "getleds" => {
                let list: String = self
                    .leds
                    .iter()
                    .enumerate()
                    .map(|(i, area)| format!("{};", area.to_record(i)))
                    .collect();
                format!("leds:{}", list).into()
            }
            "getcolors" => {
                let list: String = self
                    .colors
                    .iter()
                    .enumerate()
                    .map(|(i, c)| format!("{};", c.to_record(i)))
                    .collect();
                format!("colors:{}", list).into()
            }
            "getfps" => format!("fps:{}", self.fps).into(),
            "getscreensize" => format!("screensize:{}", self.screen).into(),
            "getmode" => format!("mode:{}", self.mode).into(),
            "setstatus" | "setmode" | "setgamma" | "setbrightness" | "setsmooth"
            | "setprofile" | "setcolor" | "setleds" | "newprofile" | "deleteprofile" => {
                if self.lock_holder != Some(conn) {
                    return "not locked".into();
                }
                match self.apply(verb, arg.unwrap_or("")) {
                    Some(()) => "ok".into(),
                    None => "error".into(),
                }
            }
            _ => "unknown command".into(),
        }
    }

    fn apply(&mut self, verb: &str, arg: &str) -> Option<()> {
        match verb {
            "setstatus" => match arg {
                "on" | "off" => self.status = arg.to_string(),
                _ => return None,
            },
            "setmode" => match arg {
                "ambilight" | "moodlamp" => self.mode = arg.to_string(),
                _ => return None,
            },
            "setgamma" => self.gamma = arg.parse().ok()?,
            "setbrightness" => self.brightness = arg.parse().ok().filter(|b| *b <= 100)?,
            "setsmooth" => self.smooth = arg.parse().ok()?,
            "setprofile" => {
                if !self.profiles.iter().any(|p| p == arg) {
                    return None;
                }
                self.profile = arg.to_string();
            }
            "newprofile" => {
                if !self.profiles.iter().any(|p| p == arg) {
                    self.profiles.push(arg.to_string());
                }
                self.profile = arg.to_string();
            }
            "deleteprofile" => {
                let before = self.profiles.len();
                self.profiles.retain(|p| p != arg);
                if self.profiles.len() == before {
                    return None;
                }
            }
            "setcolor" => {
                for record in parse_records(arg).ok()? {
                    let slot = self.colors.get_mut(record.index.checked_sub(1)?)?;
                    *slot = Rgb::from_record(&record).ok()?;
                }
            }
            "setleds" => {
                for record in parse_records(arg).ok()? {
                    let slot = self.leds.get_mut(record.index.checked_sub(1)?)?;
                    *slot = LedArea::from_record(&record).ok()?;
                }
            }
            _ => return None,
        }
        Some(())
    }

    /// Forget per-connection state when a client goes away
    pub fn disconnected(&mut self, conn: ConnectionId) {
        self.authorized.remove(&conn);
        if self.lock_holder == Some(conn) {
            self.lock_holder = None;
        }
    }
}
