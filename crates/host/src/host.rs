use sim_core::{ActionEnvelope, Game, PlayerId, TerminalOutcome, Tick};
use std::collections::BTreeMap;

/// Outcome of a bounded run.
pub struct RunResult<G: Game> {
    pub outcome: Option<TerminalOutcome>,
    pub final_tick: Tick,
    pub events: Vec<G::Event>,
}

/// Owns a game instance and drives it tick by tick.
///
/// Actions are scheduled by tick; envelopes whose intended tick has
/// already passed are moved to the next tick. Same-tick envelopes are
/// sorted by `(player_id, action_id)` so a given submission history always
/// replays identically.
pub struct MatchHost<G: Game> {
    game: G,
    current_tick: Tick,
    tick_hz: u32,
    next_player_id: PlayerId,
    pending_actions: BTreeMap<Tick, Vec<ActionEnvelope<G::Action>>>,
}

impl<G: Game> MatchHost<G> {
    pub fn new(config: G::Config, seed: u64, tick_hz: u32) -> Self {
        Self {
            game: G::new(config, seed),
            current_tick: 0,
            tick_hz,
            next_player_id: 0,
            pending_actions: BTreeMap::new(),
        }
    }

    pub fn join_player(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    /// Schedules an action, bumping stale intended ticks to the next tick.
    /// Returns the tick the action will actually run on.
    pub fn submit(&mut self, mut action: ActionEnvelope<G::Action>) -> Tick {
        let scheduled_tick = if action.intended_tick <= self.current_tick {
            self.current_tick + 1
        } else {
            action.intended_tick
        };

        action.intended_tick = scheduled_tick;
        self.pending_actions
            .entry(scheduled_tick)
            .or_default()
            .push(action);

        scheduled_tick
    }

    /// Advances one tick. Returns `None` when the game is already terminal,
    /// otherwise the events emitted this tick.
    pub fn step_one_tick(&mut self) -> Option<Vec<G::Event>> {
        if self.game.is_terminal().is_some() {
            return None;
        }

        self.current_tick += 1;

        let mut actions = self
            .pending_actions
            .remove(&self.current_tick)
            .unwrap_or_default();
        actions.sort_by_key(|a| (a.player_id, a.action_id));

        let mut tick_events = Vec::new();
        self.game
            .step(self.current_tick, &actions, &mut tick_events);

        Some(tick_events)
    }

    /// Runs until the game reports a terminal outcome or `max_ticks`
    /// elapse, whichever comes first.
    pub fn run_for_ticks(&mut self, max_ticks: Tick) -> RunResult<G> {
        let mut all_events = Vec::new();

        for _ in 0..max_ticks {
            match self.step_one_tick() {
                Some(events) => all_events.extend(events),
                None => break,
            }
        }

        RunResult {
            outcome: self.game.is_terminal(),
            final_tick: self.current_tick,
            events: all_events,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.game.is_terminal()
    }
}
