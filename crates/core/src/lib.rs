//! Engine-agnostic simulation contracts.
//!
//! A game implements [`Game`] and is driven from the outside: the host
//! advances ticks, feeds it action envelopes, and collects the events it
//! emits. The game itself never does I/O.

pub mod envelope;
pub mod game;

pub use envelope::{ActionEnvelope, ActionId, PlayerId, Tick};
pub use game::{Game, TerminalOutcome};
