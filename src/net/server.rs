//! TCP relay server.
//!
//! One reader task per connection parses lines and feeds the coordinator;
//! one writer task per connection drains an unbounded channel onto the
//! socket. The coordinator lock is never held across an await point.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, info, instrument, warn};

use crate::error::OmokResult;

use super::coordinator::MatchCoordinator;
use super::protocol::{
    decode_line, encode_line, AccountResponse, ClientEvent, ConnId, Credentials, Outbound,
    ServerEvent,
};

/// Pause before accepting again after `err`.
///
/// Errors tied to a single incoming connection are retried at once. Anything
/// else (descriptor exhaustion and the like) waits a little so the loop does
/// not spin.
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted => None,
        _ => Some(Duration::from_millis(100)),
    }
}

/// Account register/login backend.
pub trait AccountService: Send + Sync {
    fn register(&self, email: &str, password: &str) -> AccountResponse;
    fn login(&self, email: &str, password: &str) -> AccountResponse;
}

/// Accounts kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    users: Mutex<HashMap<String, String>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountService for InMemoryAccounts {
    fn register(&self, email: &str, password: &str) -> AccountResponse {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return AccountResponse::fail(AccountResponse::INVALID, "malformed email or password");
        }
        let mut users = self.users.lock();
        if users.contains_key(email) {
            return AccountResponse::fail(AccountResponse::CONFLICT_OR_UNKNOWN, "account already exists");
        }
        users.insert(email.to_string(), password.to_string());
        info!(%email, "account registered");
        AccountResponse::ok("registered")
    }

    fn login(&self, email: &str, password: &str) -> AccountResponse {
        let users = self.users.lock();
        match users.get(email.trim()) {
            None => AccountResponse::fail(AccountResponse::CONFLICT_OR_UNKNOWN, "no such account"),
            Some(stored) if stored == password => AccountResponse::ok("logged in"),
            Some(_) => AccountResponse::fail(AccountResponse::INVALID, "wrong password"),
        }
    }
}

/// Shared state of a running relay.
pub struct RelayServer {
    coordinator: Arc<MatchCoordinator>,
    accounts: Arc<dyn AccountService>,
    peers: Mutex<HashMap<ConnId, UnboundedSender<ServerEvent>>>,
    next_conn: AtomicU64,
}

impl RelayServer {
    pub fn new(coordinator: Arc<MatchCoordinator>, accounts: Arc<dyn AccountService>) -> Self {
        Self {
            coordinator,
            accounts,
            peers: Mutex::new(HashMap::new()),
            next_conn: AtomicU64::new(1),
        }
    }

    pub fn coordinator(&self) -> &MatchCoordinator {
        &self.coordinator
    }

    /// Bind `addr` and serve forever.
    pub async fn bind_and_serve(self: Arc<Self>, addr: &str) -> OmokResult<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Accept connections forever on an already bound listener.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> OmokResult<()> {
        info!(addr = %listener.local_addr()?, "relay listening");
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    let backoff = accept_backoff(&e);
                    warn!(error = %e, ?backoff, "accept failed");
                    if let Some(delay) = backoff {
                        tokio::time::sleep(delay).await;
                    }
                    continue;
                }
            };
            let conn = ConnId(self.next_conn.fetch_add(1, Ordering::Relaxed));
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                server.handle_connection(stream, peer, conn).await;
            });
        }
    }

    #[instrument(skip(self, stream, conn), fields(%conn))]
    async fn handle_connection(self: Arc<Self>, stream: TcpStream, peer: SocketAddr, conn: ConnId) {
        info!("client connected");
        let (read_half, mut write_half) = stream.into_split();
        let (tx, mut rx) = unbounded_channel::<ServerEvent>();
        self.peers.lock().insert(conn, tx);

        let writer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let line = match encode_line(&event) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                if let Err(e) = write_half.write_all(line.as_bytes()).await {
                    debug!(error = %e, "write failed, closing writer");
                    break;
                }
            }
        });

        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match decode_line::<ClientEvent>(&line) {
                        Ok(event) => {
                            let outbound = self.handle_event(conn, event);
                            self.dispatch(outbound);
                        }
                        Err(e) => warn!(error = %e, line = %line, "malformed message dropped"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(error = %e, "read failed");
                    break;
                }
            }
        }

        self.peers.lock().remove(&conn);
        let outbound = self.coordinator.disconnect(conn);
        self.dispatch(outbound);
        writer.abort();
        info!("client disconnected");
    }

    /// Apply one client event and collect the replies.
    pub fn handle_event(&self, conn: ConnId, event: ClientEvent) -> Vec<Outbound> {
        match event {
            ClientEvent::RequestMatchmaking(request) => self.coordinator.enqueue(conn, &request.email),
            ClientEvent::PlaceStone(stone) => self.coordinator.relay_move(conn, stone.row, stone.col),
            ClientEvent::Register(Credentials { email, password }) => {
                let response = self.accounts.register(&email, &password);
                vec![Outbound::new(conn, ServerEvent::RegisterResponse(response))]
            }
            ClientEvent::Login(Credentials { email, password }) => {
                let response = self.accounts.login(&email, &password);
                vec![Outbound::new(conn, ServerEvent::LoginResponse(response))]
            }
        }
    }

    fn dispatch(&self, outbound: Vec<Outbound>) {
        let peers = self.peers.lock();
        for Outbound { to, event } in outbound {
            match peers.get(&to) {
                Some(tx) => {
                    if tx.send(event).is_err() {
                        debug!(%to, "peer writer gone");
                    }
                }
                None => debug!(%to, "no such peer"),
            }
        }
    }
}
