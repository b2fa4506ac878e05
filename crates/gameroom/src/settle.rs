use super::*;
use rand::Rng;
use serde::Serialize;
use tpg_core::*;

/// Settlement precondition violations.
/// Never expected when the room gates `check_end_of_round` correctly;
/// surfacing one from the delayed chance path collapses the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    NoParticipants,
    MissingContribution(PlayerId),
}

impl std::fmt::Display for SettleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoParticipants => write!(f, "no participants to settle"),
            Self::MissingContribution(id) => write!(f, "participant {} has not played", id),
        }
    }
}

impl std::error::Error for SettleError {}

/// One settled round in session history. Append-only, success rounds only;
/// a collapsing round ends the session instead of being recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub round: Round,
    pub total: Coins,
    pub max: Coins,
    pub threshold: f64,
    pub success: bool,
}

/// What one participant walked away with from a successful round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub id: PlayerId,
    pub kept: Coins,
    pub savings: Coins,
}

/// A round frozen at the moment every contribution came in.
/// Pot and threshold are fixed here so the delayed chance draw resolves
/// against the numbers the participants actually produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pot: Coins,
    threshold: f64,
    players: usize,
}

impl Settlement {
    /// Computes pot and threshold from the full roster.
    /// Errors when the roster is empty or any contribution is unset.
    pub fn assess(ledger: &Ledger) -> Result<Self, SettleError> {
        if ledger.is_empty() {
            return Err(SettleError::NoParticipants);
        }
        let mut pot = 0;
        for p in ledger.iter() {
            pot += p
                .contribution()
                .ok_or_else(|| SettleError::MissingContribution(p.id().clone()))?;
        }
        Ok(Self {
            pot,
            threshold: ledger.len() as f64 * THRESHOLD_FACTOR,
            players: ledger.len(),
        })
    }
    pub fn pot(&self) -> Coins {
        self.pot
    }
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
    /// Deterministic success: the pot reached the threshold.
    pub fn is_safe(&self) -> bool {
        self.pot as f64 >= self.threshold
    }
    /// The rescue draw for a round that missed the threshold.
    pub fn flip<R: Rng>(rng: &mut R) -> bool {
        rng.random_bool(RESCUE_PROBABILITY)
    }
    /// Credits every participant with their kept coins.
    /// Contributions are left in place for the punishment phase to read.
    /// Errors if any contribution went missing since assessment, e.g. a
    /// join during the chance window.
    pub fn payout(&self, ledger: &mut Ledger) -> Result<Vec<Payout>, SettleError> {
        let mut payouts = Vec::with_capacity(ledger.len());
        for p in ledger.iter() {
            match p.contribution() {
                Some(c) => payouts.push((p.id().clone(), ENDOWMENT - c)),
                None => return Err(SettleError::MissingContribution(p.id().clone())),
            }
        }
        let mut results = Vec::with_capacity(payouts.len());
        for (id, kept) in payouts {
            ledger.apply_savings_delta(&id, kept);
            let savings = ledger.participant(&id).expect("known participant").savings();
            results.push(Payout { id, kept, savings });
        }
        Ok(results)
    }
    /// The history record for this round.
    pub fn record(&self, round: Round) -> RoundRecord {
        RoundRecord {
            round,
            total: self.pot,
            max: self.players as Coins * ENDOWMENT,
            threshold: self.threshold,
            success: true,
        }
    }
}
