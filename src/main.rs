//! Skyhop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use skyhop::Settings;
    use skyhop::audio::{AudioManager, cue_for, music_for};
    use skyhop::platform::storage::{LocalStorageStore, load_best_or_zero, save_best_logged};
    use skyhop::platform::{FpsCounter, FrameClock, command_for_key, command_for_pointer, is_game_key};
    use skyhop::renderer::SdfRenderState;
    use skyhop::sim::{Command, GameEvent, GamePhase, GameState, autopilot, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SdfRenderState>,
        clock: FrameClock,
        fps: FpsCounter,
        audio: AudioManager,
        store: LocalStorageStore,
        settings: Settings,
        /// Autopilot (demo) mode
        idle_mode: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let store = LocalStorageStore::default();
            let best = load_best_or_zero(&store);
            Self {
                state: GameState::new(seed, best),
                render_state: None,
                clock: FrameClock::new(),
                fps: FpsCounter::default(),
                audio: AudioManager::new(&settings),
                store,
                settings,
                idle_mode: false,
            }
        }

        fn command(&mut self, command: Command) {
            self.audio.resume();
            let was_paused = self.state.phase == GamePhase::Paused;
            if self.state.handle(command) && was_paused {
                // Don't feed the paused interval into the next tick
                self.clock.reset();
            }
        }

        /// Run one simulation tick and dispatch its events
        fn update(&mut self, time: f64) {
            let dt = self.clock.frame_dt(time);
            self.fps.record(time);

            if self.idle_mode {
                if let Some(command) = autopilot(&self.state) {
                    self.state.handle(command);
                }
            }
            tick(&mut self.state, dt);
            self.dispatch_events();
        }

        fn dispatch_events(&mut self) {
            for event in self.state.drain_events() {
                if let Some(cue) = cue_for(&event, &self.settings) {
                    self.audio.play(cue);
                }
                if let Some(command) = music_for(&event) {
                    self.audio.music(command);
                }
                if let GameEvent::NewBest { best } = event {
                    save_best_logged(&mut self.store, best);
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let snapshot = self.state.snapshot();
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&snapshot, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let phase = self.state.phase;
            let tier = self.state.difficulty().tier;

            if let Some(el) = document.get_element_by_id("hud-text") {
                el.set_text_content(Some(&format!(
                    "Score: {} | Level: {} | High: {}",
                    self.state.score,
                    tier.as_str(),
                    self.state.best_score
                )));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                set_hidden(&el, !self.settings.show_fps);
                el.set_text_content(Some(&format!("{} FPS", self.fps.fps())));
            }

            if let Some(el) = document.get_element_by_id("start-screen") {
                set_hidden(&el, phase != GamePhase::Idle);
            }
            if let Some(el) = document.get_element_by_id("pause-screen") {
                set_hidden(&el, phase != GamePhase::Paused);
            }
            if let Some(el) = document.get_element_by_id("pause-btn") {
                el.set_text_content(Some(if phase == GamePhase::Paused {
                    "Resume"
                } else {
                    "Pause"
                }));
            }

            if let Some(el) = document.get_element_by_id("game-over-screen") {
                set_hidden(&el, phase != GamePhase::GameOver);
                if phase == GamePhase::GameOver {
                    if let Some(text) = document.get_element_by_id("final-score") {
                        text.set_text_content(Some(&format!(
                            "Your Score: {} | High Score: {}",
                            self.state.score, self.state.best_score
                        )));
                    }
                }
            }
        }

        fn resize(&mut self, width: u32, height: u32, css_width: f32, css_height: f32) {
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
            self.state.resize(css_width, css_height);
        }
    }

    fn set_hidden(el: &web_sys::Element, hidden: bool) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }

    #[derive(Debug)]
    struct StartupError(String);

    impl From<&str> for StartupError {
        fn from(msg: &str) -> Self {
            StartupError(msg.to_string())
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Skyhop starting...");
        if let Err(e) = start().await {
            log::error!("Startup failed: {}", e.0);
        }
    }

    async fn start() -> Result<(), StartupError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            set_hidden(&loading, true);
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| StartupError::from("not a canvas"))?;

        // Drawing buffer at device resolution; the playfield stays in CSS pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut()
            .state
            .resize(client_w as f32, client_h as f32);
        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| StartupError(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| StartupError(format!("failed to get adapter: {e}")))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state = SdfRenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| StartupError(e.to_string()))?;
        render_state.set_start_time(js_sys::Date::now());
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_volume_slider(&document, game.clone());
        setup_auto_pause(game.clone());
        setup_resize(canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            set_hidden(&hud, false);
        }

        request_animation_frame(game);

        log::info!("Skyhop running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Click - flap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().command(command_for_pointer());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tap - flap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().command(command_for_pointer());
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if is_game_key(&key) {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }

                let mut g = game.borrow_mut();
                if key == "i" || key == "I" {
                    g.idle_mode = !g.idle_mode;
                    log::info!("Idle mode: {}", g.idle_mode);
                    return;
                }
                let phase = g.state.phase;
                if let Some(command) = command_for_key(&key, phase) {
                    g.command(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                // Keep the click from reaching the canvas as a flap
                event.stop_propagation();
                handler();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "restart-btn"] {
            let game = game.clone();
            on_click(document, id, move || {
                game.borrow_mut().command(Command::Start);
            });
        }

        on_click(document, "pause-btn", move || {
            game.borrow_mut().command(Command::PauseToggle);
        });
    }

    fn setup_volume_slider(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(slider) = document
            .get_element_by_id("volume-slider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };

        slider.set_value(&((game.borrow().settings.master_volume * 100.0).round()).to_string());

        let slider_clone = slider.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Ok(percent) = slider_clone.value().parse::<f32>() else {
                return;
            };
            let mut g = game.borrow_mut();
            g.settings.set_volume_percent(percent);
            let settings = g.settings.clone();
            g.audio.apply_settings(&settings);
            settings.save();
        });
        let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn auto_pause(game: &Rc<RefCell<Game>>, reason: &str) {
        let mut g = game.borrow_mut();
        if g.settings.pause_on_blur && g.state.phase == GamePhase::Running {
            g.command(Command::PauseToggle);
            log::info!("Auto-paused ({})", reason);
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut()
                .resize(width, height, client_w as f32, client_h as f32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Ticks the headless run gives up after (ten minutes at 60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const MAX_HEADLESS_TICKS: u64 = 36_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use skyhop::Tuning;
    use skyhop::consts::REFERENCE_DT;
    use skyhop::platform::storage::{DEFAULT_BEST_SCORE_PATH, FileStore, load_best_or_zero, save_best_logged};
    use skyhop::sim::{GameEvent, GamePhase, GameState, Playfield, autopilot, tick};

    env_logger::init();
    log::info!("Skyhop (native) starting...");
    log::info!("Native mode runs a headless autopilot game - run with `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Could not load tuning from {}, using defaults: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut store = FileStore::new(DEFAULT_BEST_SCORE_PATH);
    let best = load_best_or_zero(&store);

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut state = GameState::with_tuning(seed, best, tuning, Playfield::default());
    log::info!("Game initialized with seed: {}", seed);

    for _ in 0..MAX_HEADLESS_TICKS {
        if let Some(command) = autopilot(&state) {
            if state.phase == GamePhase::GameOver {
                break;
            }
            state.handle(command);
        }
        tick(&mut state, REFERENCE_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Scored { score } => log::debug!("Scored: {}", score),
                GameEvent::Collided { cause, score } => {
                    log::info!("Run over ({:?}) with score {}", cause, score)
                }
                GameEvent::NewBest { best } => save_best_logged(&mut store, best),
                GameEvent::Flapped => log::trace!("Flap"),
                other => log::debug!("{:?}", other),
            }
        }
    }

    println!(
        "Score: {} | Level: {} | High: {}",
        state.score,
        state.difficulty().tier.as_str(),
        state.best_score
    );
}
