use super::*;
use tpg_core::*;

/// Lifecycle phase of the single game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No active session; waiting for the administrator to start one.
    #[default]
    Idle,
    /// Accepting contributions for the current round.
    RoundOpen,
    /// Threshold missed; the delayed chance draw is pending.
    RoundSettling,
    /// Results are out; punishment window open until the admin advances.
    RoundSettled,
    /// All rounds survived. Terminal until a restart.
    Victory,
    /// The chance draw failed. Terminal until a restart.
    Collapse,
}

/// A refused phase transition. The coordinator logs these and moves on;
/// out-of-phase commands are no-ops, never client-visible errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseError {
    action: &'static str,
    from: Phase,
}

impl std::fmt::Display for PhaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot {} from {:?}", self.action, self.from)
    }
}

impl std::error::Error for PhaseError {}

/// Where an administrator advance landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextRound(Round),
    Victory,
}

/// The single session record: phase, round progress, settled-round history,
/// and the epoch that guards delayed work against restarts.
///
/// The epoch bumps on every start, restart, and reset. The chance draw is
/// scheduled with the epoch current at schedule time; a firing whose epoch
/// is stale must be discarded, never applied to the newer session.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    round: Round,
    max_rounds: Round,
    history: Vec<RoundRecord>,
    epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            round: 0,
            max_rounds: DEFAULT_ROUNDS,
            history: Vec::new(),
            epoch: 0,
        }
    }
}

impl Session {
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn round(&self) -> Round {
        self.round
    }
    pub fn max_rounds(&self) -> Round {
        self.max_rounds
    }
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
    /// Whether the tagged epoch still belongs to this session run.
    pub fn current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
    /// Active from start until victory, collapse, or reset.
    pub fn active(&self) -> bool {
        matches!(
            self.phase,
            Phase::RoundOpen | Phase::RoundSettling | Phase::RoundSettled
        )
    }
    /// Contributions land only while a round is open.
    pub fn accepting(&self) -> bool {
        self.phase == Phase::RoundOpen
    }
    /// Punishment requests and execution land only after settlement.
    pub fn punishment_open(&self) -> bool {
        self.phase == Phase::RoundSettled
    }

    /// Starts (or restarts) a session at round 1. Allowed from any phase;
    /// bumps the epoch so pending delayed work dies stale.
    pub fn start(&mut self, rounds: Round) {
        self.phase = Phase::RoundOpen;
        self.round = 1;
        self.max_rounds = rounds;
        self.history.clear();
        self.epoch += 1;
    }
    /// Marks the chance draw pending for a round that missed its threshold.
    pub fn begin_chance(&mut self) -> Result<(), PhaseError> {
        match self.phase {
            Phase::RoundOpen => {
                self.phase = Phase::RoundSettling;
                Ok(())
            }
            from => Err(PhaseError {
                action: "begin chance draw",
                from,
            }),
        }
    }
    /// Closes the round as a success, recording it in session history.
    /// Reachable directly from an open round or via a rescued chance draw.
    pub fn settle(&mut self, record: RoundRecord) -> Result<(), PhaseError> {
        match self.phase {
            Phase::RoundOpen | Phase::RoundSettling => {
                self.phase = Phase::RoundSettled;
                self.history.push(record);
                Ok(())
            }
            from => Err(PhaseError {
                action: "settle round",
                from,
            }),
        }
    }
    /// Administrator advance out of a settled round: the next round opens,
    /// or the session ends in victory when the last round just settled.
    pub fn advance(&mut self) -> Result<Advance, PhaseError> {
        match self.phase {
            Phase::RoundSettled if self.round >= self.max_rounds => {
                self.phase = Phase::Victory;
                Ok(Advance::Victory)
            }
            Phase::RoundSettled => {
                self.round += 1;
                self.phase = Phase::RoundOpen;
                Ok(Advance::NextRound(self.round))
            }
            from => Err(PhaseError {
                action: "advance round",
                from,
            }),
        }
    }
    /// The session ends in failure. Infallible: the chance draw's fail-safe
    /// path must always be able to land here, whatever state we were in.
    pub fn collapse(&mut self) {
        self.phase = Phase::Collapse;
    }
    /// Full reset back to idle. Bumps the epoch.
    pub fn reset(&mut self) {
        *self = Self {
            epoch: self.epoch + 1,
            ..Self::default()
        };
    }
}
