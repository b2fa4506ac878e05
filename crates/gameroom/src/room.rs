use super::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tpg_core::*;

/// Live session coordinator.
/// Single task owning the ledger, session record, punisher set, and
/// connection table; every mutation happens here, in reaction to one
/// inbound event stream. The chance-draw delay is the only suspension
/// point and it re-enters through the same stream, epoch-tagged.
pub struct Room {
    ledger: Ledger,
    session: Session,
    punishers: HashSet<PlayerId>,
    pending: Option<Settlement>,
    table: Table,
    timer: Timer,
    rng: SmallRng,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
}

impl Default for Room {
    fn default() -> Self {
        Self::with_config(TimerConfig::default())
    }
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: TimerConfig) -> Self {
        Self::build(config, SmallRng::from_os_rng())
    }
    /// Deterministic shuffle and coin draws for reproducible runs.
    pub fn seeded(config: TimerConfig, seed: u64) -> Self {
        Self::build(config, SmallRng::seed_from_u64(seed))
    }
    fn build(config: TimerConfig, rng: SmallRng) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            ledger: Ledger::default(),
            session: Session::default(),
            punishers: HashSet::new(),
            pending: None,
            table: Table::default(),
            timer: Timer::new(config),
            rng,
            tx,
            rx,
        }
    }
    /// Spawns the event loop and returns the handle bridges talk to.
    pub fn spawn(self) -> RoomHandle {
        let handle = RoomHandle::new(self.tx.clone());
        tokio::spawn(self.run());
        handle
    }
    async fn run(mut self) {
        log::debug!("[room] event loop started");
        while let Some(event) = self.rx.recv().await {
            log::trace!("[room] {}", event);
            self.handle(event);
        }
        log::debug!("[room] all handles dropped, shutting down");
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Opened { conn, sender } => self.table.open(conn, sender),
            Event::Closed { conn } => self.on_closed(conn),
            Event::ChanceDue { epoch } => self.on_chance_due(epoch),
            Event::Client { conn, message } => self.on_client(conn, message),
        }
    }
    fn on_client(&mut self, conn: ID<Connection>, message: ClientMessage) {
        match message {
            ClientMessage::AdminLogin => self.on_admin_login(conn),
            ClientMessage::StartGame { rounds } | ClientMessage::RestartGame { rounds } => {
                self.on_start(Protocol::rounds(rounds))
            }
            ClientMessage::AdminNextRound => self.on_next_round(),
            ClientMessage::AdminExecutePunishments => self.on_execute_punishments(),
            ClientMessage::FullReset => self.on_full_reset(),
            ClientMessage::JoinGame { user_id, name } => self.on_join(conn, user_id, name),
            ClientMessage::SubmitContribution { user_id, amount } => {
                self.on_contribution(user_id, amount)
            }
            ClientMessage::RequestPunish { user_id } => self.on_request_punish(user_id),
        }
    }

    // --- administrator ---

    fn on_admin_login(&mut self, conn: ID<Connection>) {
        log::info!("[room] admin console claimed by {}", conn);
        self.table.claim_admin(conn);
        self.refresh_admin();
    }
    fn on_start(&mut self, rounds: Round) {
        log::info!("[room] session started for {} rounds", rounds);
        self.session.start(rounds);
        self.pending = None;
        self.punishers.clear();
        self.ledger.reset_for_new_session();
        self.table.broadcast(ServerMessage::game_started(1, rounds));
        self.table.broadcast(ServerMessage::new_round(1, rounds));
        self.refresh_admin();
    }
    fn on_next_round(&mut self) {
        match self.session.advance() {
            Ok(Advance::NextRound(round)) => {
                log::info!("[room] advancing to round {}", round);
                self.punishers.clear();
                self.ledger.clear_contributions();
                self.table
                    .broadcast(ServerMessage::new_round(round, self.session.max_rounds()));
                self.refresh_admin();
            }
            Ok(Advance::Victory) => self.trigger_victory(),
            Err(e) => log::debug!("[room] advance refused: {}", e),
        }
    }
    fn on_execute_punishments(&mut self) {
        if !self.session.punishment_open() {
            log::debug!("[room] punishment refused outside settled round");
            return;
        }
        let report = Punishment::execute(&mut self.ledger, &self.punishers, &mut self.rng);
        log::info!(
            "[room] punishment resolved: {} punishers, {} fines",
            self.punishers.len(),
            report.iter().map(|p| p.fines).sum::<usize>()
        );
        for penalty in &report {
            if let Some(conn) = self.conn_of(&penalty.id) {
                self.table
                    .unicast(conn, ServerMessage::punishment_report(penalty));
            }
        }
        self.refresh_roster();
    }
    fn on_full_reset(&mut self) {
        log::info!("[room] full reset");
        self.session.reset();
        self.pending = None;
        self.punishers.clear();
        self.ledger = Ledger::default();
        self.table.broadcast(ServerMessage::ForceReload);
    }

    // --- players ---

    fn on_join(&mut self, conn: ID<Connection>, user_id: PlayerId, name: String) {
        let participant = self.ledger.join(&user_id, &name, conn);
        log::info!("[room] {} joined as {}", user_id, participant.name());
        let welcome = ServerMessage::welcome(
            participant.name(),
            self.session.active(),
            self.session.round(),
            self.session.max_rounds(),
            participant.savings(),
            participant.history().to_vec(),
        );
        self.table.unicast(conn, welcome);
        self.refresh_roster();
    }
    fn on_contribution(&mut self, user_id: PlayerId, amount: i64) {
        if !self.session.accepting() {
            log::debug!("[room] dropping contribution from {}: no open round", user_id);
            return;
        }
        let amount = match Protocol::contribution(amount) {
            Ok(amount) => amount,
            Err(e) => {
                log::warn!("[room] dropping contribution from {}: {}", user_id, e);
                return;
            }
        };
        if self.ledger.apply_contribution(&user_id, amount) {
            log::debug!("[room] {} contributed {}", user_id, amount);
            self.refresh_roster();
            self.check_end_of_round();
        } else {
            log::debug!("[room] dropping contribution from unknown {}", user_id);
        }
    }
    fn on_request_punish(&mut self, user_id: PlayerId) {
        if !self.session.punishment_open() {
            log::debug!("[room] dropping punish request from {}: window closed", user_id);
            return;
        }
        if !self.ledger.contains(&user_id) {
            log::debug!("[room] dropping punish request from unknown {}", user_id);
            return;
        }
        self.punishers.insert(user_id);
        self.table
            .to_admin(ServerMessage::update_punish_count(self.punishers.len()));
    }
    fn on_closed(&mut self, conn: ID<Connection>) {
        if self.table.close(conn) {
            log::info!("[room] admin console left");
            self.table.broadcast(ServerMessage::AdminLeft);
        } else if let Some(participant) = self.ledger.disconnect(conn) {
            log::info!("[room] {} disconnected", participant.id());
            self.refresh_roster();
        }
    }

    // --- settlement ---

    /// Runs once per accepted contribution: the round settles the instant
    /// every known participant has played.
    fn check_end_of_round(&mut self) {
        if !self.ledger.is_empty() && self.ledger.all_contributed() {
            self.settle_round();
        }
    }
    fn settle_round(&mut self) {
        let settlement = match Settlement::assess(&self.ledger) {
            Ok(settlement) => settlement,
            Err(e) => {
                log::error!("[room] settlement assessment failed: {}", e);
                return;
            }
        };
        log::info!(
            "[room] round {} closed: pot {} against threshold {}",
            self.session.round(),
            settlement.pot(),
            settlement.threshold()
        );
        if settlement.is_safe() {
            if let Err(e) = self.finalize_round(settlement, false) {
                log::error!("[room] failed to finalize round: {}", e);
                self.trigger_collapse();
            }
        } else {
            match self.session.begin_chance() {
                Ok(()) => {
                    self.pending = Some(settlement);
                    self.table.broadcast(ServerMessage::trigger_coin_animation(
                        settlement.pot(),
                        settlement.threshold(),
                    ));
                    self.timer
                        .schedule_chance(self.session.epoch(), self.tx.clone());
                }
                Err(e) => log::warn!("[room] chance draw refused: {}", e),
            }
        }
    }
    /// The delayed draw came back. Anything that stops the rescued round
    /// from settling cleanly collapses the session: an uncertain outcome
    /// must end the game, never stall it.
    fn on_chance_due(&mut self, epoch: u64) {
        if !self.session.current(epoch) {
            log::debug!("[room] discarding stale chance draw (epoch {})", epoch);
            return;
        }
        let Some(settlement) = self.pending.take() else {
            log::error!("[room] chance draw fired with no pending settlement");
            self.trigger_collapse();
            return;
        };
        if Settlement::flip(&mut self.rng) {
            log::info!("[room] coin saved the round");
            if let Err(e) = self.finalize_round(settlement, true) {
                log::error!("[room] failed to finalize rescued round: {}", e);
                self.trigger_collapse();
            }
        } else {
            log::info!("[room] coin came up tails");
            self.trigger_collapse();
        }
    }
    fn finalize_round(&mut self, settlement: Settlement, rescued: bool) -> Result<(), SettleError> {
        let payouts = settlement.payout(&mut self.ledger)?;
        let round = self.session.round();
        let max_rounds = self.session.max_rounds();
        if let Err(e) = self.session.settle(settlement.record(round)) {
            log::warn!("[room] settle transition refused: {}", e);
        }
        for payout in &payouts {
            if let Some(conn) = self.conn_of(&payout.id) {
                self.table.unicast(
                    conn,
                    ServerMessage::round_result(payout, round, max_rounds, rescued),
                );
            }
        }
        self.table
            .to_admin(ServerMessage::round_result_admin(round, max_rounds, rescued));
        self.refresh_admin();
        Ok(())
    }

    // --- endings ---

    fn trigger_victory(&mut self) {
        log::info!("[room] session won after {} rounds", self.session.round());
        for p in self.ledger.iter_mut() {
            let savings = p.savings();
            p.push_history(savings);
        }
        for p in self.ledger.iter() {
            if let Some(conn) = p.conn() {
                self.table.unicast(
                    conn,
                    ServerMessage::player_game_won(p.savings(), p.history().to_vec()),
                );
            }
        }
        let mut leaderboard = self
            .ledger
            .iter()
            .map(|p| LeaderboardEntry {
                name: p.name().to_string(),
                savings: p.savings(),
            })
            .collect::<Vec<_>>();
        leaderboard.sort_by(|a, b| b.savings.cmp(&a.savings));
        self.table.to_admin(ServerMessage::admin_game_won(leaderboard));
    }
    fn trigger_collapse(&mut self) {
        log::info!("[room] session collapsed in round {}", self.session.round());
        self.pending = None;
        self.session.collapse();
        for p in self.ledger.iter_mut() {
            p.push_history(0);
        }
        for p in self.ledger.iter() {
            if let Some(conn) = p.conn() {
                self.table
                    .unicast(conn, ServerMessage::update_history(p.history().to_vec()));
            }
        }
        self.table.broadcast(ServerMessage::GameLost);
        self.table.to_admin(ServerMessage::AdminGameLost);
    }

    // --- plumbing ---

    fn conn_of(&self, id: &str) -> Option<ID<Connection>> {
        self.ledger.participant(id).and_then(|p| p.conn())
    }
    fn refresh_roster(&self) {
        self.table.to_admin(ServerMessage::update_player_list(
            self.ledger.snapshot_for_roster(),
        ));
    }
    fn refresh_admin(&self) {
        self.refresh_roster();
        self.table
            .to_admin(ServerMessage::update_game_state(&self.session));
    }
}
