//! Live session runtime for the threshold public-goods game.
//!
//! One administrator console and many players share a single room. Each
//! round every participant contributes part of a fixed endowment to a
//! common pot; a pot below the collapse threshold goes to a delayed coin
//! flip that either rescues the round or ends the session. Between rounds,
//! participants may pay to fine under-contributors.
//!
//! ## Architecture
//!
//! - [`Room`] — Session coordinator owning all mutable state, driven by
//!   one inbound [`Event`] stream
//! - [`Ledger`] — Per-participant savings, contributions, and history
//! - [`Settlement`] — Pot, threshold, and payout math for one round
//! - [`Punishment`] — Cost and fine resolution for the punishment phase
//! - [`Session`] — Phase machine and the epoch fencing delayed draws
//!
//! ## Wire layer
//!
//! - [`ClientMessage`] / [`ServerMessage`] — Tagged JSON frames
//! - [`Protocol`] — Decode and validation boundary
//! - [`Table`] — Connection registry and the administrator claim
mod event;
mod handle;
mod ledger;
mod message;
mod protocol;
mod punish;
mod room;
mod session;
mod settle;
mod table;
mod timer;

pub use event::*;
pub use handle::*;
pub use ledger::*;
pub use message::*;
pub use protocol::*;
pub use punish::*;
pub use room::*;
pub use session::*;
pub use settle::*;
pub use table::*;
pub use timer::*;
