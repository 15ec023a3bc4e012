use crate::envelope::{ActionEnvelope, PlayerId, Tick};

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Win,
    Lose,
}

/// A deterministic, tick-stepped simulation.
///
/// `step` must be a pure function of current state, the tick number, and
/// the supplied actions; all observable side effects go through
/// `out_events`.
pub trait Game: Sized {
    type Config: Clone + Send + Sync + 'static;
    type Action: Clone + Send + Sync + 'static;
    type Observation: Clone + Send + Sync + 'static;
    type Event: Clone + Send + Sync + 'static;

    fn new(config: Self::Config, seed: u64) -> Self;

    fn step(
        &mut self,
        tick: Tick,
        actions: &[ActionEnvelope<Self::Action>],
        out_events: &mut Vec<Self::Event>,
    );

    fn observe(&self, tick: Tick, player: PlayerId) -> Self::Observation;

    fn is_terminal(&self) -> Option<TerminalOutcome>;
}
