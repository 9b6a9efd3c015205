//! Space Defender entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, MouseEvent};

    use space_defender::audio::AudioManager;
    use space_defender::consts::*;
    use space_defender::hud::HudSnapshot;
    use space_defender::input::InputState;
    use space_defender::minimap;
    use space_defender::sim::{GameEvent, GameState, NotificationKind, SessionPhase, session, tick};
    use space_defender::view::FrameView;
    use space_defender::{DifficultyPreset, Settings};

    // Pointer lock and the external renderer hook
    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const canvas = document.getElementById('canvas');
            if (canvas && document.pointerLockElement !== canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.catch) {
                    result.catch(e => console.warn('Pointer lock failed:', e));
                }
            }
        }

        export function exit_pointer_lock() {
            if (document.pointerLockElement) {
                document.exitPointerLock();
            }
        }

        export function render_frame(json) {
            const render = window.spaceDefenderRender;
            if (typeof render === 'function') {
                render(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
        fn exit_pointer_lock();
        fn render_frame(json: &str);
    }

    /// How long the damage overlay stays up (ms)
    const DAMAGE_FLASH_MS: f64 = 300.0;
    /// Minimap pixels per world unit
    const MINIMAP_SCALE: f32 = 0.5;

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        input: InputState,
        audio: AudioManager,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        damage_flash_until: f64,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut state = GameState::new(seed, settings.difficulty);
            state.max_particles = settings.max_particles();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state,
                input: InputState::new(&settings),
                settings,
                audio,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                damage_flash_until: 0.0,
            }
        }

        /// Run one simulation tick and hand its events to the frontend
        fn update(&mut self, dt: f32, time: f64) {
            let input = self.input.take_tick_input();
            tick(&mut self.state, &input, dt);
            self.handle_events(time);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn handle_events(&mut self, time: f64) {
            let Some(document) = document() else { return };
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Sound(key) => self.audio.play(key),
                    GameEvent::CapturePointer => request_pointer_lock(),
                    GameEvent::ReleasePointer => {
                        self.input.release_all();
                        exit_pointer_lock();
                    }
                    GameEvent::PlayerDamaged { .. } => {
                        self.damage_flash_until = time + DAMAGE_FLASH_MS;
                    }
                    GameEvent::NotificationShown {
                        kind: NotificationKind::Powerup,
                        title,
                        description,
                    } => {
                        set_text(&document, "powerup-title", &title);
                        set_text(&document, "powerup-description", &description);
                        set_visible(&document, "powerup-notification", true);
                    }
                    GameEvent::NotificationShown {
                        kind: NotificationKind::LevelUp,
                        title,
                        ..
                    } => {
                        set_text(&document, "level-number", &title);
                        set_visible(&document, "level-up-notification", true);
                    }
                    GameEvent::NotificationHidden { kind } => {
                        let id = match kind {
                            NotificationKind::Powerup => "powerup-notification",
                            NotificationKind::LevelUp => "level-up-notification",
                        };
                        set_visible(&document, id, false);
                    }
                    GameEvent::PhaseChanged { from, to } => {
                        log::debug!("Phase {:?} -> {:?}", from, to);
                    }
                    GameEvent::WeaponSwitched { .. }
                    | GameEvent::ReloadStarted
                    | GameEvent::ReloadCompleted
                    | GameEvent::LevelUp { .. } => {}
                }
            }
        }

        /// Hand the frame to the external renderer
        fn render(&self) {
            match FrameView::capture(&self.state).to_json() {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Render snapshot failed: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, time: f64) {
            let Some(document) = document() else { return };
            let hud = HudSnapshot::from_state(&self.state);

            set_text(&document, "score", &hud.score.to_string());
            set_text(&document, "ammo-count", &hud.ammo_label);
            set_text(&document, "weapon-name", hud.weapon_name);
            set_text(&document, "level", &format!("Level {}", hud.level));
            if self.settings.show_fps {
                set_text(&document, "fps-counter", &format!("FPS: {}", self.fps));
            }

            if let Some(fill) = document
                .get_element_by_id("health-fill")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let style = fill.style();
                let _ = style.set_property("width", &format!("{}%", hud.health_percent));
                let _ = style.set_property("background-color", hud.health_band.css_color());
            }

            for i in 0..4 {
                if let Some(el) = document.get_element_by_id(&format!("weapon-{}", i)) {
                    let class = if i == hud.weapon_index {
                        "weapon-option active"
                    } else {
                        "weapon-option"
                    };
                    let _ = el.set_attribute("class", class);
                }
            }

            let effects = hud
                .effects
                .iter()
                .map(|e| format!("{} {:.0}s", e.name, e.remaining_secs.ceil()))
                .collect::<Vec<_>>()
                .join(" | ");
            set_text(&document, "active-effects", &effects);

            set_visible(&document, "damage-overlay", time < self.damage_flash_until);
            set_visible(&document, "start-screen", hud.phase == SessionPhase::Idle);
            set_visible(&document, "hud", hud.phase != SessionPhase::Idle);
            set_visible(&document, "pause-menu", hud.phase == SessionPhase::Paused);
            set_visible(&document, "game-over", hud.phase == SessionPhase::Over);
            if hud.phase == SessionPhase::Over {
                set_text(&document, "final-score", &format!("Score: {}", hud.score));
                set_text(&document, "final-level", &format!("Level {}", hud.level));
            }
        }

        fn draw_minimap(&self) {
            if !self.settings.show_minimap {
                return;
            }
            let Some(document) = document() else { return };
            let Some(canvas) = document
                .get_element_by_id("minimap")
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            else {
                return;
            };
            let Some(ctx) = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            else {
                return;
            };

            let (w, h) = (canvas.width() as f64, canvas.height() as f64);
            ctx.clear_rect(0.0, 0.0, w, h);
            let center = glam::Vec2::new(w as f32 / 2.0, h as f32 / 2.0);

            ctx.set_fill_style_str("#0ff");
            ctx.begin_path();
            let _ = ctx.arc(center.x as f64, center.y as f64, 4.0, 0.0, std::f64::consts::TAU);
            ctx.fill();

            for blip in minimap::blips(&self.state) {
                let p = blip.to_map(center, MINIMAP_SCALE);
                ctx.set_fill_style_str(blip.kind.css_color());
                ctx.begin_path();
                let _ = ctx.arc(
                    p.x as f64,
                    p.y as f64,
                    blip.kind.radius(),
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Space Defender starting...");

        let document = document().expect("no document");

        // Hide loading indicator
        set_visible(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        log::info!(
            "Settings: difficulty {}, quality {}",
            settings.difficulty.as_str(),
            settings.quality.as_str()
        );
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_menu_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Space Defender running!");
    }

    fn add_listener<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        event: &str,
        handler: impl FnMut(E) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Pointer lock gained/lost drives pause/resume
        {
            let game = game.clone();
            let doc = document.clone();
            add_listener(&document, "pointerlockchange", move |_: web_sys::Event| {
                let locked = doc.pointer_lock_element().is_some();
                let mut g = game.borrow_mut();
                if !locked {
                    g.input.release_all();
                }
                session::set_input_captured(&mut g.state, locked);
                log::info!("Pointer lock {}", if locked { "acquired" } else { "released" });
            });
        }

        add_listener(&document, "pointerlockerror", move |_: web_sys::Event| {
            log::error!("Pointer lock error!");
        });

        // Mouse look while captured
        {
            let game = game.clone();
            add_listener(&document, "mousemove", move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.input_captured {
                    g.input
                        .mouse_move(event.movement_x() as f32, event.movement_y() as f32);
                }
            });
        }

        // Hold to fire; clicking the canvas while uncaptured asks for the pointer back
        {
            let game = game.clone();
            add_listener(canvas, "mousedown", move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                if !g.state.input_captured {
                    if g.state.phase == SessionPhase::Paused {
                        drop(g);
                        request_pointer_lock();
                    }
                    return;
                }
                if event.button() == 0 {
                    g.input.set_fire(true);
                }
            });
        }
        {
            let game = game.clone();
            add_listener(&window, "mouseup", move |event: MouseEvent| {
                if event.button() == 0 {
                    game.borrow_mut().input.set_fire(false);
                }
            });
        }

        // Keyboard
        {
            let game = game.clone();
            add_listener(&window, "keydown", move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                if matches!(g.state.phase, SessionPhase::Idle | SessionPhase::Over) {
                    return;
                }
                let code = event.code();
                // Escape while captured releases the pointer, which pauses on its own
                if code == "Escape" && g.state.input_captured {
                    return;
                }
                if g.input.key_down(&code) {
                    event.prevent_default();
                }
            });
        }
        add_listener(&window, "keyup", move |event: web_sys::KeyboardEvent| {
            game.borrow_mut().input.key_up(&event.code());
        });
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                REFERENCE_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud(time);
            g.draw_minimap();
        }

        request_animation_frame(game);
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            add_listener(&btn, "click", handler);
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else { return };

        for (id, preset) in [
            ("difficulty-easy", DifficultyPreset::Easy),
            ("difficulty-medium", DifficultyPreset::Medium),
            ("difficulty-hard", DifficultyPreset::Hard),
        ] {
            let game = game.clone();
            on_click(&document, id, move |_| {
                let mut g = game.borrow_mut();
                g.settings.difficulty = preset;
                g.state.preset = preset;
                log::info!("Difficulty: {}", preset.as_str());
            });
        }

        {
            let game = game.clone();
            on_click(&document, "start-btn", move |_| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.reset_look();
                if session::start(&mut g.state) {
                    request_pointer_lock();
                }
            });
        }
        {
            let game = game.clone();
            on_click(&document, "restart-btn", move |_| {
                let mut g = game.borrow_mut();
                g.input.reset_look();
                if session::restart(&mut g.state) {
                    request_pointer_lock();
                }
            });
        }
        {
            let game = game.clone();
            on_click(&document, "resume-btn", move |_| {
                // Resumes once the pointer is captured again
                let phase = game.borrow().state.phase;
                if phase == SessionPhase::Paused {
                    request_pointer_lock();
                }
            });
        }
        on_click(&document, "quit-btn", move |_| {
            let mut g = game.borrow_mut();
            g.input.release_all();
            session::quit(&mut g.state);
            exit_pointer_lock();
        });
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let doc = document.clone();
            add_listener(&document, "visibilitychange", move |_: web_sys::Event| {
                let mut g = game.borrow_mut();
                let visible = doc.visibility_state() != web_sys::VisibilityState::Hidden;
                let muted = g.settings.muted_for_focus(visible);
                g.audio.set_muted(muted);
                if !visible {
                    g.input.release_all();
                    if session::pause(&mut g.state) {
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            add_listener(&window, "blur", move |_: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.input.release_all();
                let muted = g.settings.muted_for_focus(false);
                g.audio.set_muted(muted);
                if session::pause(&mut g.state) {
                    log::info!("Auto-paused (window blur)");
                }
            });
        }

        add_listener(&window, "focus", move |_: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            let muted = g.settings.muted_for_focus(true);
            g.audio.set_muted(muted);
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use space_defender::Settings;
    use space_defender::consts::REFERENCE_DT;
    use space_defender::hud::HudSnapshot;
    use space_defender::sim::{GameState, SessionPhase, session, tick};

    env_logger::init();
    log::info!("Space Defender (native) starting...");
    log::info!("The browser build is the playable version; running a headless autopilot session");

    let settings = Settings::load();
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let frames = 60 * 120;

    let mut state = GameState::new(seed, settings.difficulty);
    state.max_particles = settings.max_particles();
    session::start(&mut state);

    let mut frame = 0;
    while frame < frames && state.phase == SessionPhase::Active {
        let input = autopilot::steer(&state, frame);
        tick(&mut state, &input, REFERENCE_DT);
        state.drain_events();
        frame += 1;
    }

    let hud = HudSnapshot::from_state(&state);
    println!(
        "seed {} | {:.1}s survived | score {} | level {} | health {:.0}% | {:?}",
        state.seed,
        state.clock_ms / 1000.0,
        hud.score,
        hud.level,
        hud.health_percent,
        hud.phase
    );
}

/// Scripted pilot for the native smoke run: aim at the nearest threat, fire, weave
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use space_defender::sim::{GameState, TickInput};

    pub fn steer(state: &GameState, frame: u32) -> TickInput {
        let origin = state.player.pos;
        let nearest = state
            .hazards
            .iter()
            .map(|h| h.pos)
            .chain(state.hostiles.iter().map(|h| h.pos))
            .min_by(|a, b| origin.distance(*a).total_cmp(&origin.distance(*b)));

        let (yaw, pitch) = match nearest {
            Some(target) => {
                let dir = space_defender::direction_or_default(target - origin);
                ((-dir.x).atan2(-dir.z), dir.y.clamp(-1.0, 1.0).asin())
            }
            None => (state.player.yaw, state.player.pitch),
        };

        TickInput {
            left: (frame / 90) % 2 == 0,
            right: (frame / 90) % 2 == 1,
            fire: nearest.is_some(),
            yaw,
            pitch,
            ..Default::default()
        }
    }
}
