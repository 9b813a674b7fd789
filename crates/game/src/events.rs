//! Gameplay feedback events.
//!
//! The simulation reports noteworthy moments (tether fired, checkpoint
//! reached, ...) to a [`FeedbackSink`]. Sinks are fire-and-forget: they
//! cannot influence the simulation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Something the player should hear or see.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The tether left the player, heading for `anchor`.
    TetherFired { anchor: Vec3 },
    /// The tether tip latched on.
    TetherConnected { anchor: Vec3 },
    /// A checkpoint not reached before became the safe point.
    CheckpointReached(u32),
    /// The player fell out of the world and respawned.
    PlayerDied,
}

/// Receives feedback events, once per occurrence.
pub trait FeedbackSink {
    fn notify(&mut self, event: GameEvent);
}

/// Writes every event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn notify(&mut self, event: GameEvent) {
        match event {
            GameEvent::TetherFired { anchor } => log::info!("Tether fired at {anchor:?}"),
            GameEvent::TetherConnected { anchor } => log::info!("Tether connected at {anchor:?}"),
            GameEvent::CheckpointReached(index) => log::info!("Checkpoint {index} reached"),
            GameEvent::PlayerDied => log::info!("Player died"),
        }
    }
}

/// Records events in order, for tests and replays.
impl FeedbackSink for Vec<GameEvent> {
    fn notify(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Discards every event.
impl FeedbackSink for () {
    fn notify(&mut self, _event: GameEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(sink: &mut dyn FeedbackSink) {
        sink.notify(GameEvent::CheckpointReached(2));
        sink.notify(GameEvent::PlayerDied);
    }

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut events = Vec::new();
        emit(&mut events);
        assert_eq!(events, vec![GameEvent::CheckpointReached(2), GameEvent::PlayerDied]);
    }

    #[test]
    fn test_log_sink_accepts_every_event() {
        let mut sink = LogSink;
        emit(&mut sink);
        sink.notify(GameEvent::TetherFired { anchor: Vec3::ONE });
        sink.notify(GameEvent::TetherConnected { anchor: Vec3::ONE });
    }
}
