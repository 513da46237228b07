//! Client side of the relay: the TCP transport and the local view of an
//! online match.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

use crate::board::{Pos, Stone};
use crate::config::OmokConfig;
use crate::error::{OmokError, OmokResult};
use crate::game::{GameMode, GameSession, GameStatus, MoveOutcome, Participant};
use crate::search::Searcher;

use super::protocol::{
    decode_line, encode_line, ClientEvent, MatchFound, MatchRequest, ServerEvent, StonePlaced,
    StoneRequest,
};

/// Line-oriented JSON connection to a relay server.
pub struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Connection {
    #[instrument]
    pub async fn connect(addr: &str) -> OmokResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!("connected to relay");
        let (read_half, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        })
    }

    pub async fn send(&mut self, event: &ClientEvent) -> OmokResult<()> {
        let line = encode_line(event)?;
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Next server event. Blank and undecodable lines are skipped; end of
    /// stream is [`OmokError::Closed`].
    pub async fn recv(&mut self) -> OmokResult<ServerEvent> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Err(OmokError::Closed);
            };
            if line.trim().is_empty() {
                continue;
            }
            match decode_line(&line) {
                Ok(event) => return Ok(event),
                Err(e) => warn!(error = %e, line = %line, "malformed message dropped"),
            }
        }
    }
}

/// What a server event did to the local match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchUpdate {
    /// Paired; the local player holds `stone`
    Started { room_id: String, stone: Stone },
    /// A relayed move was applied, or refused locally. A refused echo means
    /// the two sides no longer agree on the board, so the side that sent it
    /// forfeits.
    Move(MoveOutcome),
    /// The opponent disconnected; the match is forfeited to us
    OpponentLeft,
    /// Event that does not concern the match, or a move that could not be
    /// mapped onto the board
    Ignored,
}

/// Local mirror of a relayed match.
///
/// Local input is never applied directly: [`OnlineMatch::place_request`]
/// produces the message to send, and the stone lands when the server echoes
/// it back, in server order.
#[derive(Debug)]
pub struct OnlineMatch {
    session: GameSession,
    room_id: Option<String>,
    opponent_email: Option<String>,
}

impl OnlineMatch {
    pub fn new(config: &OmokConfig) -> Self {
        Self {
            session: GameSession::new(GameMode::Online { local: Stone::Black }, config),
            room_id: None,
            opponent_email: None,
        }
    }

    /// Apply one server event.
    pub fn handle(&mut self, event: &ServerEvent) -> MatchUpdate {
        match event {
            ServerEvent::MatchFound(found) => self.on_match_found(found),
            ServerEvent::StonePlaced(placed) => self.on_stone_placed(placed),
            ServerEvent::OpponentLeft {} => {
                let opponent = self.local_stone().opponent();
                if self.session.resign(opponent) {
                    info!("opponent left, match forfeited");
                }
                MatchUpdate::OpponentLeft
            }
            ServerEvent::RegisterResponse(_) | ServerEvent::LoginResponse(_) => MatchUpdate::Ignored,
        }
    }

    fn on_match_found(&mut self, found: &MatchFound) -> MatchUpdate {
        let stone = found.my_stone();
        let black = if stone == Stone::Black {
            Participant::Player1
        } else {
            Participant::Player2
        };
        self.session.start_with(black);
        self.room_id = Some(found.room_id.clone());
        self.opponent_email = Some(found.opponent_email.clone());
        info!(room = %found.room_id, ?stone, opponent = %found.opponent_email, "match found");
        MatchUpdate::Started {
            room_id: found.room_id.clone(),
            stone,
        }
    }

    fn on_stone_placed(&mut self, placed: &StonePlaced) -> MatchUpdate {
        let (Some(pos), stone) = (placed.pos(), placed.stone()) else {
            warn!(row = placed.row, col = placed.col, "relayed move off the board");
            return MatchUpdate::Ignored;
        };
        if stone.is_empty() {
            warn!(player = placed.player, "relayed move with unknown player");
            return MatchUpdate::Ignored;
        }
        let outcome = self.session.apply_move_as(stone, pos);
        if let MoveOutcome::Rejected(reason) = &outcome {
            warn!(%pos, ?stone, %reason, "relayed move refused locally, ending match");
            self.session.resign(stone);
        }
        MatchUpdate::Move(outcome)
    }

    /// Message to send for a local click on `pos`, or `None` when it is not
    /// our turn or the move would be refused.
    pub fn place_request(&mut self, pos: Pos) -> Option<ClientEvent> {
        let local = self.local_stone();
        match self.session.validate(local, pos) {
            Ok(()) => Some(ClientEvent::PlaceStone(StoneRequest::from(pos))),
            Err(reason) => {
                debug!(%pos, %reason, "local move not sent");
                None
            }
        }
    }

    pub fn local_stone(&self) -> Stone {
        match self.session.mode() {
            GameMode::Online { local } => local,
            _ => Stone::Black,
        }
    }

    pub fn is_my_turn(&self) -> bool {
        self.session.status().is_in_progress() && self.session.current_turn() == self.local_stone()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn opponent_email(&self) -> Option<&str> {
        self.opponent_email.as_deref()
    }
}

/// Matchmake as `email` and play one game with the search AI.
///
/// Returns the final status. If the AI finds nothing it may legally play,
/// the bot stops and returns the running status; dropping the connection
/// forfeits the game for the opponent.
#[instrument(skip(conn, config))]
pub async fn run_bot(mut conn: Connection, email: &str, config: &OmokConfig) -> OmokResult<GameStatus> {
    let searcher = Searcher::with_config(*config.search().depth(), *config.search().radius(), config.ruleset());
    let mut online = OnlineMatch::new(config);

    conn.send(&ClientEvent::RequestMatchmaking(MatchRequest {
        email: email.to_string(),
    }))
    .await?;

    loop {
        let event = conn.recv().await?;
        online.handle(&event);

        let status = online.session().status();
        if status.is_over() {
            info!(?status, "match finished");
            return Ok(status.clone());
        }
        if !online.is_my_turn() {
            continue;
        }

        let mut board = online.session().board().clone();
        let stone = online.local_stone();
        let search = searcher.clone();
        let result = tokio::task::spawn_blocking(move || search.find_best_move(&mut board, stone)).await?;

        match online.place_request(result.best_move) {
            Some(request) => conn.send(&request).await?,
            None => {
                warn!(best = %result.best_move, "no playable move, leaving the match");
                return Ok(online.session().status().clone());
            }
        }
    }
}
