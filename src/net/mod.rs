//! Online play: wire protocol, matchmaking, relay server and client
//!
//! The server only enforces turn order. Move legality is checked by each
//! client's own session when the echoed move arrives.

pub mod client;
pub mod coordinator;
pub mod protocol;
pub mod server;

pub use client::{run_bot, Connection, MatchUpdate, OnlineMatch};
pub use coordinator::{MatchCoordinator, Room};
pub use protocol::{
    AccountResponse, ClientEvent, ConnId, Credentials, MatchFound, MatchRequest, Outbound,
    ServerEvent, StonePlaced, StoneRequest,
};
pub use server::{AccountService, InMemoryAccounts, RelayServer};
