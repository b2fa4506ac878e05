use super::*;
use tpg_core::*;

/// A single participant's economic record.
/// Created on first join and never removed within a session; a dropped
/// connection only flips the connected flag so savings survive reconnects.
#[derive(Debug, Clone)]
pub struct Participant {
    id: PlayerId,
    name: String,
    conn: Option<ID<Connection>>,
    connected: bool,
    contribution: Option<Coins>,
    savings: Coins,
    history: Vec<Coins>,
}

impl Participant {
    fn new(id: PlayerId, name: String, conn: ID<Connection>) -> Self {
        Self {
            id,
            name,
            conn: Some(conn),
            connected: true,
            contribution: None,
            savings: 0,
            history: Vec::new(),
        }
    }
    pub fn id(&self) -> &PlayerId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Connection currently attached to this participant, if any.
    /// Kept after disconnect for diagnostics; routing checks `connected`.
    pub fn conn(&self) -> Option<ID<Connection>> {
        self.conn
    }
    pub fn connected(&self) -> bool {
        self.connected
    }
    pub fn contribution(&self) -> Option<Coins> {
        self.contribution
    }
    pub fn has_played(&self) -> bool {
        self.contribution.is_some()
    }
    pub fn savings(&self) -> Coins {
        self.savings
    }
    pub fn history(&self) -> &[Coins] {
        &self.history
    }
    /// Appends an end-of-session savings snapshot.
    pub fn push_history(&mut self, value: Coins) {
        self.history.push(value);
    }
    /// True when this participant's current contribution marks them a defector.
    pub fn is_defector(&self) -> bool {
        self.contribution
            .map(|c| c < COOPERATION_MINIMUM)
            .unwrap_or(false)
    }
}

/// Owns every participant's economic state for the session.
/// Participants are kept in join order, which fixes roster and report order.
#[derive(Debug, Default)]
pub struct Ledger {
    participants: Vec<Participant>,
}

impl Ledger {
    /// Upserts a participant. A rejoin refreshes name, connection, and the
    /// connected flag while preserving all economic state.
    pub fn join(&mut self, id: &str, name: &str, conn: ID<Connection>) -> &Participant {
        match self.participants.iter().position(|p| p.id == id) {
            Some(i) => {
                let p = &mut self.participants[i];
                p.name = name.to_string();
                p.conn = Some(conn);
                p.connected = true;
                &self.participants[i]
            }
            None => {
                self.participants
                    .push(Participant::new(id.to_string(), name.to_string(), conn));
                self.participants.last().expect("just pushed")
            }
        }
    }
    /// Marks the participant attached to the closed connection as
    /// disconnected. Returns the participant if one matched.
    pub fn disconnect(&mut self, conn: ID<Connection>) -> Option<&Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.conn == Some(conn))
            .map(|p| {
                p.connected = false;
                &*p
            })
    }
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }
    pub fn contains(&self, id: &str) -> bool {
        self.participant(id).is_some()
    }
    /// Records a contribution for an existing participant.
    /// Returns whether the value was recorded, which is what decides
    /// whether the caller runs its end-of-round check.
    pub fn apply_contribution(&mut self, id: &str, amount: Coins) -> bool {
        match self.participants.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.contribution = Some(amount);
                true
            }
            None => false,
        }
    }
    /// Adjusts savings by a signed delta. Savings may go negative.
    pub fn apply_savings_delta(&mut self, id: &str, delta: Coins) {
        if let Some(p) = self.participants.iter_mut().find(|p| p.id == id) {
            p.savings += delta;
        }
    }
    /// Roster view for the administrator console.
    pub fn snapshot_for_roster(&self) -> Vec<RosterEntry> {
        self.participants
            .iter()
            .map(|p| RosterEntry {
                id: p.id.clone(),
                name: p.name.clone(),
                connected: p.connected,
                has_played: p.has_played(),
                savings: p.savings,
            })
            .collect()
    }
    /// Fresh session, same people: zero savings, clear contributions and
    /// history; identity, name, and connectivity are preserved.
    pub fn reset_for_new_session(&mut self) {
        for p in &mut self.participants {
            p.savings = 0;
            p.contribution = None;
            p.history.clear();
        }
    }
    /// Clears every contribution; used on round advance.
    pub fn clear_contributions(&mut self) {
        for p in &mut self.participants {
            p.contribution = None;
        }
    }
    /// Settlement precondition: every known participant has played.
    pub fn all_contributed(&self) -> bool {
        self.participants.iter().all(|p| p.has_played())
    }
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
    pub fn len(&self) -> usize {
        self.participants.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.participants.iter_mut()
    }
}
