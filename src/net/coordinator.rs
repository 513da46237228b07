//! Server-side matchmaking and turn authority.
//!
//! The coordinator knows nothing about sockets. Each call returns the
//! messages to deliver; the server routes them. All state sits behind a
//! single lock so the turn check and the turn flip cannot interleave with
//! another move from the same room.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use super::protocol::{ConnId, MatchFound, Outbound, ServerEvent, StonePlaced};

#[derive(Debug, Clone)]
struct Waiting {
    conn: ConnId,
    email: String,
}

/// One paired game. `turn` is always `black` or `white`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub black: ConnId,
    pub white: ConnId,
    pub turn: ConnId,
}

impl Room {
    fn peer_of(&self, conn: ConnId) -> ConnId {
        if conn == self.black {
            self.white
        } else {
            self.black
        }
    }
}

#[derive(Debug)]
struct State {
    queue: VecDeque<Waiting>,
    rooms: HashMap<String, Room>,
    seats: HashMap<ConnId, String>,
    next_room: u64,
    rng: StdRng,
}

/// Pairs waiting connections and relays moves in turn order.
#[derive(Debug)]
pub struct MatchCoordinator {
    state: Mutex<State>,
}

impl MatchCoordinator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Coordinator with reproducible colour assignment.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                rooms: HashMap::new(),
                seats: HashMap::new(),
                next_room: 1,
                rng,
            }),
        }
    }

    /// Queue `conn` for a game. Pairs the two oldest waiting connections as
    /// soon as there are two. Already queued or seated connections are
    /// ignored.
    #[instrument(skip(self))]
    pub fn enqueue(&self, conn: ConnId, email: &str) -> Vec<Outbound> {
        let mut state = self.state.lock();

        if state.seats.contains_key(&conn) || state.queue.iter().any(|w| w.conn == conn) {
            debug!("already queued or playing");
            return Vec::new();
        }

        info!("joined matchmaking queue");
        state.queue.push_back(Waiting {
            conn,
            email: email.to_string(),
        });

        if state.queue.len() < 2 {
            return Vec::new();
        }
        let (Some(p1), Some(p2)) = (state.queue.pop_front(), state.queue.pop_front()) else {
            return Vec::new();
        };

        let room_id = format!("room_{}", state.next_room);
        state.next_room += 1;

        let p1_starts = state.rng.gen_bool(0.5);
        let (black, white) = if p1_starts {
            (p1.conn, p2.conn)
        } else {
            (p2.conn, p1.conn)
        };
        let starting_player = if p1_starts { 1 } else { 2 };

        state.rooms.insert(
            room_id.clone(),
            Room {
                id: room_id.clone(),
                black,
                white,
                turn: black,
            },
        );
        state.seats.insert(p1.conn, room_id.clone());
        state.seats.insert(p2.conn, room_id.clone());

        info!(room = %room_id, p1 = %p1.email, p2 = %p2.email, starting_player, "match made");

        vec![
            Outbound::new(
                p1.conn,
                ServerEvent::MatchFound(MatchFound {
                    room_id: room_id.clone(),
                    my_player_number: 1,
                    is_my_turn: p1_starts,
                    starting_player,
                    opponent_email: p2.email.clone(),
                }),
            ),
            Outbound::new(
                p2.conn,
                ServerEvent::MatchFound(MatchFound {
                    room_id,
                    my_player_number: 2,
                    is_my_turn: !p1_starts,
                    starting_player,
                    opponent_email: p1.email,
                }),
            ),
        ]
    }

    /// Relay a move from `conn`. Only the connection holding the turn is
    /// heard; anything else yields no messages.
    #[instrument(skip(self))]
    pub fn relay_move(&self, conn: ConnId, row: i32, col: i32) -> Vec<Outbound> {
        let mut state = self.state.lock();

        let Some(room_id) = state.seats.get(&conn).cloned() else {
            debug!("move from connection without a room");
            return Vec::new();
        };
        let Some(room) = state.rooms.get_mut(&room_id) else {
            return Vec::new();
        };
        if room.turn != conn {
            debug!(room = %room_id, "move out of turn dropped");
            return Vec::new();
        }

        let player = if conn == room.black { 1 } else { 2 };
        room.turn = room.peer_of(conn);

        let event = ServerEvent::StonePlaced(StonePlaced { row, col, player });
        vec![
            Outbound::new(room.black, event.clone()),
            Outbound::new(room.white, event),
        ]
    }

    /// Forget `conn`. A seated connection dissolves its room and the peer is
    /// told.
    #[instrument(skip(self))]
    pub fn disconnect(&self, conn: ConnId) -> Vec<Outbound> {
        let mut state = self.state.lock();
        state.queue.retain(|w| w.conn != conn);

        let Some(room_id) = state.seats.remove(&conn) else {
            return Vec::new();
        };
        let Some(room) = state.rooms.remove(&room_id) else {
            return Vec::new();
        };
        let peer = room.peer_of(conn);
        state.seats.remove(&peer);

        info!(room = %room_id, %peer, "room closed");
        vec![Outbound::new(peer, ServerEvent::OpponentLeft {})]
    }

    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn room_count(&self) -> usize {
        self.state.lock().rooms.len()
    }

    /// Snapshot of the room `conn` is seated in.
    pub fn room_of(&self, conn: ConnId) -> Option<Room> {
        let state = self.state.lock();
        let room_id = state.seats.get(&conn)?;
        state.rooms.get(room_id).cloned()
    }
}

impl Default for MatchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
