//! Space Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, TouchEvent};

    use space_runner::Game;
    use space_runner::persistence::{KeyValueStore, LocalStorage, MemoryStore, StorageError};
    use space_runner::sim::{RunPhase, autopilot_action};
    use space_runner::submit::FetchSubmitter;

    // The 3D scene lives on the page; it receives one snapshot per frame
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            if (window.spaceRunnerRender) {
                window.spaceRunnerRender(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
    }

    /// Browser store, or an in-memory one when LocalStorage is blocked
    enum PageStore {
        Local(LocalStorage),
        Memory(MemoryStore),
    }

    impl KeyValueStore for PageStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match self {
                PageStore::Local(s) => s.get(key),
                PageStore::Memory(s) => s.get(key),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            match self {
                PageStore::Local(s) => s.set(key, value),
                PageStore::Memory(s) => s.set(key, value),
            }
        }
    }

    struct App {
        game: Game<PageStore, FetchSubmitter>,
        demo: bool,
        last_phase: RunPhase,
    }

    impl App {
        fn update(&mut self, time: f64) {
            if self.demo {
                if let Some(action) = autopilot_action(&self.game.session) {
                    self.game.apply(action);
                }
            }
            self.game.frame(time);

            let phase = self.game.session.phase;
            if phase != self.last_phase {
                self.last_phase = phase;
                self.show_screens();
            }
        }

        fn render(&self) {
            match serde_json::to_string(&self.game.snapshot()) {
                Ok(json) => present_frame(&json),
                Err(e) => log::warn!("Snapshot encode failed: {e}"),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let session = &self.game.session;
            let profile = self.game.profile();

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&session.final_score().to_string()));
            }
            if let Some(el) = document.get_element_by_id("coins") {
                el.set_text_content(Some(&session.coins.to_string()));
            }
            if let Some(el) = document.get_element_by_id("menu-coins") {
                el.set_text_content(Some(&profile.total_coins.to_string()));
            }
            if let Some(el) = document.get_element_by_id("high-score") {
                el.set_text_content(Some(&profile.high_score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hs-count") {
                el.set_text_content(Some(&profile.inventory.headstart.to_string()));
            }
            if let Some(btn) = document.get_element_by_id("headstart-btn") {
                let show = profile.inventory.headstart > 0 && session.headstart_offer_open();
                let _ = btn.class_list().toggle_with_force("hidden", !show);
            }
        }

        fn show_screens(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let running = self.game.session.is_running();
            if let Some(el) = document.get_element_by_id("hud") {
                let _ = el.class_list().toggle_with_force("hidden", !running);
            }
            if let Some(el) = document.get_element_by_id("game-over") {
                let ended = !running && self.game.last_run().is_some();
                let _ = el.class_list().toggle_with_force("hidden", !ended);
            }
            if let Some(el) = document.get_element_by_id("final-score") {
                if let Some(run) = self.game.last_run() {
                    el.set_text_content(Some(&run.score.to_string()));
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Space Runner starting...");

        let store = match LocalStorage::open() {
            Ok(s) => PageStore::Local(s),
            Err(e) => {
                log::warn!("{e}, progress will not be kept");
                PageStore::Memory(MemoryStore::new())
            }
        };

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            game: Game::new(store, FetchSubmitter::new(), seed),
            demo: false,
            last_phase: RunPhase::Idle,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(app.clone());
        setup_buttons(app.clone());
        app.borrow().show_screens();

        request_animation_frame(app);

        log::info!("Space Runner running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "i" | "I" => {
                        a.demo = !a.demo;
                        log::info!("Demo mode: {}", a.demo);
                    }
                    key => {
                        if a.game.session.is_running() && a.game.key_down(key) {
                            event.prevent_default();
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.changed_touches().get(0) {
                    app.borrow_mut().game.touch_start(
                        touch.screen_x() as f32,
                        touch.screen_y() as f32,
                        js_sys::Date::now(),
                    );
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut a = app.borrow_mut();
                if !a.game.session.is_running() {
                    return;
                }
                if let Some(touch) = event.changed_touches().get(0) {
                    a.game
                        .touch_end(touch.screen_x() as f32, touch.screen_y() as f32);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, app: Rc<RefCell<App>>, action: impl Fn(&mut App) + 'static) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            action(&mut a);
            a.update_hud();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        for id in ["start-btn", "restart-btn"] {
            on_click(id, app.clone(), |a| {
                a.game.start_run();
                a.show_screens();
            });
        }

        on_click("headstart-btn", app.clone(), |a| {
            a.game.use_headstart();
        });

        for item in ["magnet", "jetpack", "sneakers", "headstart"] {
            let id = format!("buy-{item}");
            on_click(&id, app.clone(), move |a| {
                if let Err(e) = a.game.buy(item) {
                    let _ = web_sys::window().map(|w| w.alert_with_message(&e.to_string()));
                }
            });
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.update(time);
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless demo: the autopilot plays a few runs and the results are logged
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use space_runner::Game;
    use space_runner::persistence::MemoryStore;
    use space_runner::sim::autopilot_action;
    use space_runner::submit::LogSubmitter;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Space Runner (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5EED_u64);
    let mut game = Game::new(MemoryStore::new(), LogSubmitter::new(), seed);

    const DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 120;

    for run in 1..=3 {
        game.start_run();
        let mut frames = 0;
        while game.session.is_running() && frames < MAX_FRAMES {
            if let Some(action) = autopilot_action(&game.session) {
                game.apply(action);
            }
            game.step(DT);
            frames += 1;
        }

        let seconds = frames as f32 * DT;
        match game.last_run() {
            Some(summary) if !game.session.is_running() => println!(
                "run {run}: crashed after {seconds:.1}s, score {}, {} credits{}",
                summary.score,
                summary.coins,
                if summary.new_high_score { " (best)" } else { "" }
            ),
            _ => println!(
                "run {run}: survived {seconds:.1}s, score {}",
                game.session.final_score()
            ),
        }
    }

    let profile = game.profile();
    println!(
        "best {}, banked {} credits",
        profile.high_score, profile.total_coins
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
