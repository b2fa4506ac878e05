//! Core type aliases, identity wrapper, and game constants for the
//! threshold public-goods game server.
//!
//! Every tunable of the game lives here as a compile-time constant; the
//! session is deliberately not runtime-configurable beyond the round count
//! the administrator picks at start.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Coin amounts: endowments, contributions, savings, fines.
/// Signed — punishment fines can push savings below zero.
pub type Coins = i32;
/// 1-based round counter within a session.
pub type Round = usize;
/// Stable participant identifier chosen by the client on first join.
/// Outlives any single connection; reconnects present the same id.
pub type PlayerId = String;

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
/// Used for connection identity, where ids are minted server-side.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// GAME PARAMETERS
// ============================================================================
/// Coins handed to every participant at the start of each round.
pub const ENDOWMENT: Coins = 5;
/// Multiplied by participant count to produce the collapse threshold.
/// The threshold is fractional: 5 participants need a pot of 12.5, i.e. 13.
pub const THRESHOLD_FACTOR: f64 = 2.5;
/// Contributions strictly below this mark a participant as a defector.
pub const COOPERATION_MINIMUM: Coins = 3;
/// Coins a punisher pays to take part in a punishment phase.
/// Only charged while their savings are positive.
pub const PUNISH_COST: Coins = 1;
/// Coins deducted from a defector per fine received.
pub const PUNISH_FINE: Coins = 3;
/// Probability that a round missing the threshold is rescued by the draw.
pub const RESCUE_PROBABILITY: f64 = 0.5;
/// Delay between announcing the chance event and resolving it (ms).
/// Long enough for clients to play the coin animation.
pub const CHANCE_DELAY_MS: u64 = 4000;
/// Rounds per session when the administrator does not choose a count.
pub const DEFAULT_ROUNDS: Round = 5;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
/// The session is in-memory only, so there is nothing to flush on exit.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn ids_are_unique() {
        struct Marker;
        let a = ID::<Marker>::default();
        let b = ID::<Marker>::default();
        assert_ne!(a, b);
    }
    #[test]
    fn id_roundtrips_through_uuid() {
        struct Marker;
        let id = ID::<Marker>::default();
        assert_eq!(id, ID::<Marker>::from(id.inner()));
    }
    #[test]
    fn threshold_is_fractional_for_odd_counts() {
        assert_eq!(5.0 * THRESHOLD_FACTOR, 12.5);
    }
}
