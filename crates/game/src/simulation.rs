//! Game simulation - the main game loop.
//!
//! Each frame, the fixed-timestep clock decides how many ticks to run. A tick
//! is strictly sequential:
//!
//! 1. world matrices
//! 2. collision resolution over every body
//! 3. player controller (movement, tether, ray casts)
//! 4. component updates (velocity integration)
//! 5. checkpoints and the kill height

use glam::Vec3;
use tether_physics::{
    Aabb, BodyHandle, CollisionEngine, MovementEvent, MovementMode, PlayerCommand, PlayerController, PlayerState,
};

use crate::clock::FixedTimestep;
use crate::config::GameConfig;
use crate::events::{FeedbackSink, GameEvent};
use crate::input::{PlayerInput, ViewControls};
use crate::level::{Level, LevelError};

/// The main game simulation.
///
/// All state advances deterministically from the inputs and frame times it
/// is given; two simulations fed the same sequence end in the same state.
#[derive(Debug)]
pub struct Simulation {
    /// Ticks run so far.
    pub frame: u64,

    /// Simulation configuration.
    pub config: GameConfig,

    /// Current level.
    pub level: Level,

    /// Player movement state.
    pub player: PlayerState,

    clock: FixedTimestep,
    controller: PlayerController,
    collision: CollisionEngine,
    view_controls: ViewControls,

    // Scratch buffers reused every tick
    bodies: Vec<BodyHandle>,
    movement_events: Vec<MovementEvent>,

    /// Checkpoint tags with their world bounds. Checkpoints never move.
    checkpoints: Vec<(u32, Aabb)>,

    /// Respawn position.
    safe_point: Vec3,
    last_checkpoint: Option<u32>,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: GameConfig, level: Level) -> Self {
        let player = PlayerState::new(level.player_body, config.grapple.resource_max);
        let mut checkpoints = Vec::new();
        level.checkpoints(&mut checkpoints);

        log::info!(
            "Starting `{}` at {} ticks/s, {} checkpoints",
            level.name,
            config.timestep.tick_rate,
            checkpoints.len()
        );

        Self {
            frame: 0,
            clock: FixedTimestep::new(&config.timestep),
            controller: PlayerController::new(config.movement.clone(), config.grapple.clone()),
            collision: CollisionEngine::new(config.collision),
            view_controls: ViewControls::new(config.mouse_sensitivity),
            bodies: Vec::new(),
            movement_events: Vec::new(),
            checkpoints,
            safe_point: level.spawn,
            last_checkpoint: None,
            player,
            config,
            level,
        }
    }

    /// Create a simulation with the given configuration on the test course.
    pub fn test_course(config: GameConfig) -> Result<Self, LevelError> {
        Ok(Self::new(config, Level::test_course()?))
    }

    /// Feed one rendered frame.
    ///
    /// Mouse motion turns the view once per frame; the remaining input is
    /// held for every tick the clock schedules. Returns the tick count.
    pub fn frame(&mut self, elapsed: f32, input: &PlayerInput, sink: &mut dyn FeedbackSink) -> u32 {
        if self.clock.is_paused() {
            return 0;
        }

        let view = self.view_controls.apply(self.player.view, input.mouse_delta);
        self.player.set_view(view);

        let ticks = self.clock.advance(elapsed);
        let command = input.to_command();
        for _ in 0..ticks {
            self.tick(command, sink);
        }
        ticks
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, command: PlayerCommand, sink: &mut dyn FeedbackSink) {
        let dt = self.clock.step();
        self.player.command = command;

        let scene = &mut self.level.scene;
        scene.update_world_matrices();
        scene.collect_bodies(scene.root(), &mut self.bodies);

        let stats = self.collision.resolve(scene, &self.bodies);
        if stats.pairs_resolved > 0 {
            log::trace!("Tick {}: {:?}", self.frame, stats);
        }

        self.movement_events.clear();
        self.controller
            .update(&mut self.player, scene, &self.bodies, dt, &mut self.movement_events);

        scene.update(dt);

        for event in &self.movement_events {
            match *event {
                MovementEvent::TetherFired { anchor } => sink.notify(GameEvent::TetherFired { anchor }),
                MovementEvent::TetherConnected { anchor } => sink.notify(GameEvent::TetherConnected { anchor }),
                MovementEvent::TetherReleased { exhausted } => {
                    log::debug!("Tether released (exhausted: {exhausted})");
                }
            }
        }

        self.check_checkpoints(sink);
        self.check_kill_height(sink);

        self.frame += 1;
    }

    /// Record the first checkpoint the player's box touches, if it is new.
    fn check_checkpoints(&mut self, sink: &mut dyn FeedbackSink) {
        let Some(player_box) = self.level.scene.world_box(self.player.body) else {
            return;
        };

        let reached = self
            .checkpoints
            .iter()
            .find(|(_, bounds)| player_box.intersects_box(bounds))
            .map(|&(tag, _)| tag);

        if let Some(tag) = reached {
            if self.last_checkpoint != Some(tag) {
                if let Some(position) = self.level.scene.position(self.level.player) {
                    self.safe_point = position;
                }
                self.last_checkpoint = Some(tag);
                sink.notify(GameEvent::CheckpointReached(tag));
            }
        }
    }

    fn check_kill_height(&mut self, sink: &mut dyn FeedbackSink) {
        let Some(position) = self.level.scene.world_position(self.level.player) else {
            return;
        };
        if position.y >= self.config.kill_height {
            return;
        }

        sink.notify(GameEvent::PlayerDied);
        self.respawn();
    }

    /// Put the player back on the safe point, at rest, with the tether dropped.
    pub fn respawn(&mut self) {
        log::debug!("Respawning at {:?}", self.safe_point);

        self.level.scene.set_position(self.level.player, self.safe_point);
        if let Some(body) = self.level.scene.body_mut(self.player.body) {
            body.velocity = Vec3::ZERO;
        }
        self.player.release_grapple();
        self.player.on_ground = false;
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Fraction of a tick not yet simulated, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.clock.alpha()
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.clock.step()
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.level.scene.world_position(self.level.player)
    }

    pub fn player_velocity(&self) -> Option<Vec3> {
        self.level.scene.body(self.player.body).map(|b| b.velocity)
    }

    pub fn mode(&self) -> MovementMode {
        self.player.mode()
    }

    /// Where the tether leaves the player, for drawing.
    pub fn tether_start(&self) -> Option<Vec3> {
        self.controller.tether_start(&self.player, &self.level.scene)
    }

    /// Tether tip while the tether is out.
    pub fn tether_tip(&self) -> Option<Vec3> {
        self.player.tether_tip()
    }

    pub fn safe_point(&self) -> Vec3 {
        self.safe_point
    }
}

// ============================================================================
// Tests
// ============================================================================
