//! Tether - Main Entry Point
//!
//! Runs a scripted, headless session on the test course: walk, jump, fire
//! the tether at the tower ahead and ride it in. Frame times are jittered
//! and include a stall so the fixed-timestep loop has something to absorb.
//!
//! Usage: `tether [config.json | --arcade]`. Set `RUST_LOG=debug` for tether and
//! respawn details.

use tether_game::{GameConfig, LogSink, PlayerInput, Simulation};

/// One scripted stretch of input.
struct Segment {
    frames: usize,
    input: PlayerInput,
}

fn script() -> Vec<Segment> {
    let mut walk = PlayerInput::default();
    walk.movement.forward = true;

    let mut strafe_jump = walk.clone();
    strafe_jump.movement.right = true;
    strafe_jump.actions.jump = true;

    // Turn toward the staircase, then look up at the tower behind it.
    let mut turn = PlayerInput::default();
    turn.mouse_delta = (40.0, -20.0);

    let mut hook = walk.clone();
    hook.actions.hook = true;

    vec![
        Segment { frames: 30, input: PlayerInput::default() },
        Segment { frames: 60, input: walk.clone() },
        Segment { frames: 45, input: strafe_jump },
        Segment { frames: 10, input: turn },
        Segment { frames: 90, input: hook },
        Segment { frames: 60, input: walk },
    ]
}

/// Deterministic jitter around 60 Hz, with an occasional long frame.
fn frame_time(index: usize) -> f32 {
    const PATTERN: [f32; 6] = [0.016, 0.017, 0.015, 0.018, 0.016, 0.033];
    if index % 97 == 96 {
        0.25
    } else {
        PATTERN[index % PATTERN.len()]
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(flag) if flag == "--arcade" => GameConfig::arcade(),
        Some(path) => GameConfig::load(&path).unwrap_or_else(|e| {
            log::error!("Failed to load config {path}: {e}; using defaults");
            GameConfig::default()
        }),
        None => GameConfig::default(),
    };

    let mut simulation = match Simulation::test_course(config) {
        Ok(simulation) => simulation,
        Err(e) => {
            log::error!("Failed to build level: {e}");
            std::process::exit(1);
        }
    };

    let mut sink = LogSink;
    let mut frame_index = 0;

    for segment in script() {
        for _ in 0..segment.frames {
            simulation.frame(frame_time(frame_index), &segment.input, &mut sink);
            frame_index += 1;
        }

        log::info!(
            "Tick {}: {:?} at {:?}, resource {:.1}",
            simulation.frame,
            simulation.mode(),
            simulation.player_position(),
            simulation.player.grapple_resource
        );
    }

    // Paused frames leave the state alone.
    simulation.pause();
    let before = simulation.frame;
    simulation.frame(1.0, &PlayerInput::default(), &mut sink);
    simulation.resume();

    log::info!(
        "Session done: {} frames, {} ticks ({} while paused), safe point {:?}",
        frame_index,
        simulation.frame,
        simulation.frame - before,
        simulation.safe_point()
    );
}
