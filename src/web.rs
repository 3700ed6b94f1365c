//! JavaScript bindings
//!
//! The host page owns the canvas and the animation frame loop. It calls
//! `tick` once per frame, forwards taps/clicks/space as `action`, the mode
//! buttons as `selectMode`, and draws whatever `snapshotJson` returns.

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::persistence::LocalStorage;
use crate::platform::FrameClock;
use crate::sim::{GameMode, GameSession, RapierWorld, Screen, TickInput};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }
    log::info!("Cat Stack starting...");
}

/// Current `performance.now()` in ms (0 if unavailable)
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// One game instance, owned by the page
#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession<RapierWorld, LocalStorage>,
    clock: FrameClock,
    /// Action queued since the last tick
    pending_action: bool,
}

#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        let seed = js_sys::Date::now() as u64;
        let config = GameConfig::load();
        log::info!("Game initialized with seed: {}", seed);
        WasmGame {
            session: GameSession::new(config, RapierWorld::new(), LocalStorage, seed),
            clock: FrameClock::new(),
            pending_action: false,
        }
    }

    /// Advance one frame. `timestamp` is the requestAnimationFrame time, if any.
    pub fn tick(&mut self, timestamp: Option<f64>) {
        let dt = self.clock.frame(timestamp.unwrap_or_else(now_ms));
        let input = TickInput {
            drop: std::mem::take(&mut self.pending_action),
        };
        self.session.tick(&input, dt);
    }

    /// Tap/click/space: continue, drop or restart depending on the screen
    pub fn action(&mut self) {
        self.pending_action = true;
    }

    /// Start a round in the named mode. Returns false for an unknown name.
    #[wasm_bindgen(js_name = selectMode)]
    pub fn select_mode(&mut self, mode: &str) -> bool {
        match GameMode::parse(mode) {
            Some(mode) => {
                self.session.select_game_mode(mode);
                self.pending_action = false;
                true
            }
            None => {
                log::warn!("Unknown game mode: {}", mode);
                false
            }
        }
    }

    /// "Play again" button on the end screens
    pub fn restart(&mut self) {
        if matches!(self.session.screen(), Screen::GameOver | Screen::Win) {
            self.session.restart_game();
            self.pending_action = false;
        }
    }

    /// "Menu" button on the end screens
    pub fn menu(&mut self) {
        self.session.go_to_mode_select();
        self.pending_action = false;
    }

    /// The tab was hidden; don't count the gap as game time
    #[wasm_bindgen(js_name = resetClock)]
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> String {
        self.session.snapshot_json()
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
