use super::*;
use serde::Deserialize;
use serde::Serialize;
use tpg_core::*;

/// Messages sent from clients to the server over WebSocket.
/// Administrator and player verbs share one channel; the coordinator
/// decides what each connection is allowed to trigger.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Claim the administrator console for this connection.
    AdminLogin,
    /// Start a fresh session; omitted rounds fall back to the default.
    StartGame { rounds: Option<Round> },
    /// Restart: identical semantics to a start, kept as a separate verb
    /// so consoles can label the button differently.
    RestartGame { rounds: Option<Round> },
    /// Advance out of a settled round.
    AdminNextRound,
    /// Resolve the punishment sub-phase now.
    AdminExecutePunishments,
    /// Wipe everything back to idle.
    FullReset,
    /// Enter (or re-enter) the game under a stable client-chosen id.
    JoinGame { user_id: PlayerId, name: String },
    /// Contribute to the current round's pot.
    SubmitContribution { user_id: PlayerId, amount: i64 },
    /// Opt into punishing this round's defectors.
    RequestPunish { user_id: PlayerId },
}

/// Roster line visible to the administrator.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub has_played: bool,
    pub savings: Coins,
}

/// Leaderboard line for the administrator's victory screen.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub savings: Coins,
}

/// Messages sent from server to clients over WebSocket.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Joining player's snapshot of where the game stands.
    Welcome {
        name: String,
        state: String,
        round: Round,
        max_rounds: Round,
        savings: Coins,
        history: Vec<Coins>,
    },
    /// Roster snapshot for the administrator.
    UpdatePlayerList { players: Vec<RosterEntry> },
    /// Session snapshot for the administrator.
    UpdateGameState {
        active: bool,
        round: Round,
        max_rounds: Round,
        history: Vec<RoundRecord>,
    },
    /// A session just started.
    GameStarted { round: Round, max_rounds: Round },
    /// A new round opened for contributions.
    NewRound { round: Round, max_rounds: Round },
    /// The pot missed the threshold; the chance draw resolves shortly.
    TriggerCoinAnimation { pot: Coins, threshold: f64 },
    /// The round's outcome. Players get their kept coins and savings;
    /// the administrator variant omits both.
    RoundResult {
        #[serde(skip_serializing_if = "Option::is_none")]
        kept: Option<Coins>,
        #[serde(skip_serializing_if = "Option::is_none")]
        savings: Option<Coins>,
        round: Round,
        max_rounds: Round,
        success: bool,
        was_saved_by_coin: bool,
    },
    /// A punishment phase resolved; per-player outcome.
    PunishmentReport {
        new_savings: Coins,
        punished_amount: Coins,
    },
    /// How many participants have opted to punish so far.
    UpdatePunishCount { count: usize },
    /// The session ended in victory; per-player final standing.
    PlayerGameWon {
        final_savings: Coins,
        history: Vec<Coins>,
    },
    /// Victory leaderboard for the administrator, best savings first.
    AdminGameWon { leaderboard: Vec<LeaderboardEntry> },
    /// Collapse: the player's updated savings history.
    UpdateHistory { history: Vec<Coins> },
    /// The session collapsed.
    GameLost,
    AdminGameLost,
    /// The administrator console disconnected.
    AdminLeft,
    /// Full reset: clients should reload into a clean state.
    ForceReload,
}

impl ServerMessage {
    pub fn welcome(
        name: &str,
        active: bool,
        round: Round,
        max_rounds: Round,
        savings: Coins,
        history: Vec<Coins>,
    ) -> Self {
        Self::Welcome {
            name: name.to_string(),
            state: if active { "playing" } else { "waiting" }.to_string(),
            round,
            max_rounds,
            savings,
            history,
        }
    }
    pub fn update_player_list(players: Vec<RosterEntry>) -> Self {
        Self::UpdatePlayerList { players }
    }
    pub fn update_game_state(session: &Session) -> Self {
        Self::UpdateGameState {
            active: session.active(),
            round: session.round(),
            max_rounds: session.max_rounds(),
            history: session.history().to_vec(),
        }
    }
    pub fn game_started(round: Round, max_rounds: Round) -> Self {
        Self::GameStarted { round, max_rounds }
    }
    pub fn new_round(round: Round, max_rounds: Round) -> Self {
        Self::NewRound { round, max_rounds }
    }
    pub fn trigger_coin_animation(pot: Coins, threshold: f64) -> Self {
        Self::TriggerCoinAnimation { pot, threshold }
    }
    pub fn round_result(
        payout: &Payout,
        round: Round,
        max_rounds: Round,
        was_saved_by_coin: bool,
    ) -> Self {
        Self::RoundResult {
            kept: Some(payout.kept),
            savings: Some(payout.savings),
            round,
            max_rounds,
            success: true,
            was_saved_by_coin,
        }
    }
    pub fn round_result_admin(round: Round, max_rounds: Round, was_saved_by_coin: bool) -> Self {
        Self::RoundResult {
            kept: None,
            savings: None,
            round,
            max_rounds,
            success: true,
            was_saved_by_coin,
        }
    }
    pub fn punishment_report(penalty: &Penalty) -> Self {
        Self::PunishmentReport {
            new_savings: penalty.savings,
            punished_amount: penalty.fined_amount(),
        }
    }
    pub fn update_punish_count(count: usize) -> Self {
        Self::UpdatePunishCount { count }
    }
    pub fn player_game_won(final_savings: Coins, history: Vec<Coins>) -> Self {
        Self::PlayerGameWon {
            final_savings,
            history,
        }
    }
    pub fn admin_game_won(leaderboard: Vec<LeaderboardEntry>) -> Self {
        Self::AdminGameWon { leaderboard }
    }
    pub fn update_history(history: Vec<Coins>) -> Self {
        Self::UpdateHistory { history }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn admin_round_result_omits_player_fields() {
        let json = ServerMessage::round_result_admin(2, 5, true).to_json();
        assert!(!json.contains("kept"));
        assert!(!json.contains("savings"));
        assert!(json.contains("\"was_saved_by_coin\":true"));
    }
    #[test]
    fn player_round_result_carries_payout() {
        let payout = Payout {
            id: "u1".to_string(),
            kept: 2,
            savings: 7,
        };
        let json = ServerMessage::round_result(&payout, 1, 5, false).to_json();
        assert!(json.contains("\"kept\":2"));
        assert!(json.contains("\"savings\":7"));
        assert!(json.contains("\"success\":true"));
    }
    #[test]
    fn welcome_state_tracks_activity() {
        let ServerMessage::Welcome { state, .. } =
            ServerMessage::welcome("Anna", true, 1, 5, 0, vec![])
        else {
            panic!("wrong variant")
        };
        assert_eq!(state, "playing");
        let ServerMessage::Welcome { state, .. } =
            ServerMessage::welcome("Anna", false, 0, 5, 0, vec![])
        else {
            panic!("wrong variant")
        };
        assert_eq!(state, "waiting");
    }
    #[test]
    fn messages_tag_with_snake_case_type() {
        let json = ServerMessage::game_started(1, 5).to_json();
        assert!(json.contains("\"type\":\"game_started\""));
    }
}
