use super::*;
use tpg_core::*;

/// Errors at the wire boundary. Offending frames are dropped and logged;
/// clients never see a protocol error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    Malformed(String),
    ContributionOutOfRange(i64),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed frame: {}", s),
            Self::ContributionOutOfRange(n) => {
                write!(f, "contribution {} outside [0, {}]", n, ENDOWMENT)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Translation layer between text frames and typed messages.
pub struct Protocol;

impl Protocol {
    /// Parses a client frame. Unknown types and shape mismatches fail.
    pub fn decode(s: &str) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_str(s).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
    /// Encodes a server message for the wire.
    pub fn encode(message: &ServerMessage) -> String {
        message.to_json()
    }
    /// Validates a contribution into the legal [0, ENDOWMENT] range.
    /// Enforced server-side; the claimed endowment is not negotiable.
    pub fn contribution(amount: i64) -> Result<Coins, ProtocolError> {
        (0..=ENDOWMENT as i64)
            .contains(&amount)
            .then_some(amount as Coins)
            .ok_or(ProtocolError::ContributionOutOfRange(amount))
    }
    /// Round count for a session start; missing or zero falls back to the
    /// default.
    pub fn rounds(requested: Option<Round>) -> Round {
        match requested {
            Some(r) if r > 0 => r,
            _ => DEFAULT_ROUNDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn decode_admin_verbs() {
        assert_eq!(
            Protocol::decode(r#"{"type":"admin_login"}"#),
            Ok(ClientMessage::AdminLogin)
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"start_game","rounds":3}"#),
            Ok(ClientMessage::StartGame { rounds: Some(3) })
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"restart_game","rounds":null}"#),
            Ok(ClientMessage::RestartGame { rounds: None })
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"admin_next_round"}"#),
            Ok(ClientMessage::AdminNextRound)
        );
    }
    #[test]
    fn decode_player_verbs() {
        assert_eq!(
            Protocol::decode(r#"{"type":"join_game","user_id":"u1","name":"Anna"}"#),
            Ok(ClientMessage::JoinGame {
                user_id: "u1".to_string(),
                name: "Anna".to_string()
            })
        );
        assert_eq!(
            Protocol::decode(r#"{"type":"submit_contribution","user_id":"u1","amount":4}"#),
            Ok(ClientMessage::SubmitContribution {
                user_id: "u1".to_string(),
                amount: 4
            })
        );
    }
    #[test]
    fn decode_rejects_junk() {
        assert!(Protocol::decode("not json").is_err());
        assert!(Protocol::decode(r#"{"type":"deal_cards"}"#).is_err());
        assert!(Protocol::decode(r#"{"type":"join_game"}"#).is_err());
        // fractional contributions are not integers
        assert!(Protocol::decode(r#"{"type":"submit_contribution","user_id":"u1","amount":2.5}"#).is_err());
    }
    #[test]
    fn contribution_range_is_strict() {
        assert_eq!(Protocol::contribution(0), Ok(0));
        assert_eq!(Protocol::contribution(5), Ok(5));
        assert!(Protocol::contribution(-1).is_err());
        assert!(Protocol::contribution(6).is_err());
        assert!(Protocol::contribution(i64::MAX).is_err());
    }
    #[test]
    fn rounds_fall_back_to_default() {
        assert_eq!(Protocol::rounds(Some(8)), 8);
        assert_eq!(Protocol::rounds(Some(0)), DEFAULT_ROUNDS);
        assert_eq!(Protocol::rounds(None), DEFAULT_ROUNDS);
    }
}
