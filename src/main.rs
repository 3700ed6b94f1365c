//! Cat Stack entry point
//!
//! On the web the game is driven from JavaScript through `cat_stack::web`.
//! Natively this runs a headless demo round of each mode and prints the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cat_stack::GameConfig;
    use cat_stack::sim::GameMode;

    env_logger::init();
    log::info!("Cat Stack (native) starting...");
    log::info!("Native mode is headless - build for wasm32 to play in a browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    let config = GameConfig::default();
    if let Err(e) = config.validate() {
        log::error!("Invalid config: {}", e);
        return;
    }

    for mode in [GameMode::Classic, GameMode::ReachTheTop] {
        demo::run(&config, mode, seed);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use cat_stack::GameConfig;
    use cat_stack::consts::REFERENCE_FRAME_MS;
    use cat_stack::persistence::MemoryStorage;
    use cat_stack::platform::FrameClock;
    use cat_stack::sim::{GameMode, GameSession, RapierWorld, Screen, TickInput};

    /// Frames between automatic drops (~0.75s at 60 Hz)
    const DROP_EVERY: u64 = 45;
    /// Give up after this many frames (~2 minutes)
    const MAX_FRAMES: u64 = 60 * 120;

    /// Play one round with a drop on a fixed cadence
    pub fn run(config: &GameConfig, mode: GameMode, seed: u64) {
        let mut session =
            GameSession::new(config.clone(), RapierWorld::new(), MemoryStorage::new(), seed);
        session.select_game_mode(mode);

        let mut clock = FrameClock::new();
        let mut now_ms = 0.0_f64;
        let mut frame = 0_u64;

        while session.screen() == Screen::Playing && frame < MAX_FRAMES {
            let dt = clock.frame(now_ms);
            let input = TickInput {
                drop: frame % DROP_EVERY == DROP_EVERY - 1,
            };
            session.tick(&input, dt);
            now_ms += REFERENCE_FRAME_MS as f64;
            frame += 1;
        }

        let snapshot = session.snapshot();
        let stats = session.get_cat_stats();
        println!("\n{} (seed {})", mode.as_str(), seed);
        println!("  result:  {:?} {:?}", snapshot.screen, snapshot.game_over_reason);
        println!("  frames:  {} ({:.1}s game time)", frame, session.clock_ms() / 1000.0);
        println!(
            "  cats:    {} dropped, {} lost, {} stacked",
            stats.dropped, stats.lost, stats.stacked
        );
        match mode {
            GameMode::Classic => println!("  score:   {} (high {})", snapshot.score, snapshot.high_score),
            GameMode::ReachTheTop => println!("  best:    {:?}", snapshot.reach_top_best),
        }

        let (world, _storage) = session.destroy();
        log::debug!("World left with {} bodies", cat_stack::sim::PhysicsWorld::body_count(&world));
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is cat_stack::web::start, this is just to satisfy the compiler
}
