//! Nyan Doctor entry point
//!
//! Headless driver: runs the engine under the autopilot and prints the bottle.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use nyan_doctor::sim::{Command, GameEvent, GameState, GameStatus, TickInput, tick};
    use nyan_doctor::{Autopilot, Settings};

    /// Capsule-and-virus puzzle engine, played by the built-in autopilot.
    #[derive(Debug, Parser)]
    #[command(name = "nyan-doctor", version, about)]
    pub struct Args {
        /// Starting level (0-20)
        #[arg(short, long, default_value_t = 0)]
        pub level: u32,

        /// RNG seed; a fixed seed replays the same game
        #[arg(short, long, default_value_t = 12345)]
        pub seed: u64,

        /// JSON file overriding timings and scoring
        #[arg(long, value_name = "FILE")]
        pub settings: Option<PathBuf>,

        /// Number of ticks to simulate
        #[arg(short, long, default_value_t = 6000)]
        pub frames: u32,

        /// Simulated milliseconds per tick
        #[arg(long, default_value_t = 16)]
        pub frame_ms: u32,

        /// Print the final snapshot as JSON instead of a text picture
        #[arg(long)]
        pub json: bool,
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let settings = match &args.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        log::info!("Nyan Doctor starting: level {}, seed {}", args.level, args.seed);
        let mut state = GameState::with_settings(args.seed, args.level, settings);
        let mut pilot = Autopilot::new();

        for frame in 0..args.frames {
            let input = match state.status() {
                GameStatus::Running => pilot.next_input(&state),
                GameStatus::LevelClear => TickInput {
                    command: Some(Command::NextLevel),
                    ..Default::default()
                },
                GameStatus::GameOver => TickInput {
                    command: Some(Command::Restart),
                    ..Default::default()
                },
            };
            tick(&mut state, &input, args.frame_ms);

            for event in state.drain_events() {
                match event {
                    GameEvent::Cleared { cells, viruses_remaining } => {
                        log::debug!("frame {}: cleared {} cells, {} viruses left", frame, cells, viruses_remaining)
                    }
                    GameEvent::LevelCleared { level } => log::info!("frame {}: level {} cleared", frame, level),
                    GameEvent::GameOver => log::info!("frame {}: game over", frame),
                    other => log::trace!("frame {}: {:?}", frame, other),
                }
            }
        }

        let snapshot = state.snapshot();
        if args.json {
            println!("{}", snapshot.to_json().context("failed to encode snapshot")?);
        } else {
            print!("{}", snapshot.render_ascii());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no binary entry point there
}
