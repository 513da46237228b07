//! Wire messages between relay server and clients.
//!
//! Every message is one JSON object per line:
//!
//! ```text
//! {"event":"placeStone","data":{"row":7,"col":7}}
//! ```
//!
//! Event names and field names are camelCase.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Pos, Stone};

/// Server-assigned connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    RequestMatchmaking(MatchRequest),
    PlaceStone(StoneRequest),
    Register(Credentials),
    Login(Credentials),
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    MatchFound(MatchFound),
    StonePlaced(StonePlaced),
    OpponentLeft {},
    RegisterResponse(AccountResponse),
    LoginResponse(AccountResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub email: String,
}

/// Coordinates are relayed as sent; the receiving session validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneRequest {
    pub row: i32,
    pub col: i32,
}

impl From<Pos> for StoneRequest {
    fn from(pos: Pos) -> Self {
        Self {
            row: pos.row as i32,
            col: pos.col as i32,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Pairing notice sent to both members of a new room.
///
/// Player numbers are seats in pairing order (1 = first dequeued).
/// `starting_player` is the seat holding Black.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFound {
    pub room_id: String,
    pub my_player_number: u8,
    pub is_my_turn: bool,
    pub starting_player: u8,
    pub opponent_email: String,
}

impl MatchFound {
    /// Colour this recipient plays.
    pub fn my_stone(&self) -> Stone {
        if self.my_player_number == self.starting_player {
            Stone::Black
        } else {
            Stone::White
        }
    }
}

/// Relayed move. `player` is 1 when Black moved, 2 when White moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StonePlaced {
    pub row: i32,
    pub col: i32,
    pub player: u8,
}

impl StonePlaced {
    pub fn stone(&self) -> Stone {
        match self.player {
            1 => Stone::Black,
            2 => Stone::White,
            _ => Stone::Empty,
        }
    }

    pub fn pos(&self) -> Option<Pos> {
        Pos::checked(self.row, self.col)
    }
}

/// Outcome of register or login. `code` 0 is success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    pub code: u8,
}

impl AccountResponse {
    pub const OK: u8 = 0;
    /// register: account exists; login: no such account
    pub const CONFLICT_OR_UNKNOWN: u8 = 1;
    /// register: malformed input; login: wrong password
    pub const INVALID: u8 = 2;
    pub const INTERNAL: u8 = 99;

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            code: Self::OK,
        }
    }

    pub fn fail(code: u8, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code,
        }
    }
}

/// Message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

/// Serialize one event as a newline-terminated line.
pub fn encode_line<T: Serialize>(event: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}

/// Parse one line; surrounding whitespace is ignored.
pub fn decode_line<'a, T: Deserialize<'a>>(line: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_shape() {
        let event = ClientEvent::PlaceStone(StoneRequest { row: 7, col: 8 });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "placeStone", "data": {"row": 7, "col": 8}})
        );

        let parsed: ClientEvent =
            decode_line(r#"{"event":"requestMatchmaking","data":{"email":"a@b.c"}}"#).unwrap();
        assert_eq!(
            parsed,
            ClientEvent::RequestMatchmaking(MatchRequest {
                email: "a@b.c".into()
            })
        );
    }

    #[test]
    fn test_match_found_is_camel_case() {
        let event = ServerEvent::MatchFound(MatchFound {
            room_id: "room_1".into(),
            my_player_number: 2,
            is_my_turn: true,
            starting_player: 2,
            opponent_email: "x@y.z".into(),
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "matchFound",
                "data": {
                    "roomId": "room_1",
                    "myPlayerNumber": 2,
                    "isMyTurn": true,
                    "startingPlayer": 2,
                    "opponentEmail": "x@y.z"
                }
            })
        );
    }

    #[test]
    fn test_opponent_left_has_empty_data() {
        let line = encode_line(&ServerEvent::OpponentLeft {}).unwrap();
        assert_eq!(line, "{\"event\":\"opponentLeft\",\"data\":{}}\n");
        assert_eq!(decode_line::<ServerEvent>(&line).unwrap(), ServerEvent::OpponentLeft {});
    }

    #[test]
    fn test_account_response_shape() {
        let event = ServerEvent::LoginResponse(AccountResponse::fail(AccountResponse::INVALID, "wrong password"));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "loginResponse",
                "data": {"success": false, "message": "wrong password", "code": 2}
            })
        );
    }

    #[test]
    fn test_colour_mapping() {
        let found = MatchFound {
            room_id: "room_1".into(),
            my_player_number: 1,
            is_my_turn: false,
            starting_player: 2,
            opponent_email: String::new(),
        };
        assert_eq!(found.my_stone(), Stone::White);

        let placed = StonePlaced { row: 3, col: 4, player: 1 };
        assert_eq!(placed.stone(), Stone::Black);
        assert_eq!(placed.pos(), Some(Pos::new(3, 4)));
        assert_eq!(StonePlaced { row: 15, col: 0, player: 2 }.pos(), None);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(decode_line::<ClientEvent>("not json").is_err());
        assert!(decode_line::<ClientEvent>(r#"{"event":"fly","data":{}}"#).is_err());
        assert!(decode_line::<ClientEvent>(r#"{"event":"placeStone","data":{"row":1}}"#).is_err());
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials {
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
