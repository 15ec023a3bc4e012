/// Discrete simulation tick counter.
pub type Tick = u64;

/// Player identifier within a match.
pub type PlayerId = u8;

/// Per-player monotonically increasing action counter.
pub type ActionId = u64;

/// An action submitted by a player, stamped with the tick it should
/// execute on. Same-tick envelopes are ordered by `(player_id, action_id)`
/// before the game sees them.
#[derive(Clone, Debug)]
pub struct ActionEnvelope<A> {
    pub player_id: PlayerId,
    pub action_id: ActionId,
    pub intended_tick: Tick,
    pub payload: A,
}
