//! Snackfall entry point
//!
//! Platform wiring only: canvas setup, input listeners, the
//! requestAnimationFrame loop and HUD updates. Gameplay decisions all live
//! in the library crate.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use snackfall::engine::GameEngine;
    use snackfall::renderer::canvas::{CanvasSurface, DomAtlas};
    use snackfall::renderer::{RenderEngine, RenderOptions, Surface};
    use snackfall::settings::Settings;
    use snackfall::sim::{Difficulty, FrameInput, GameEvent, GameResult, WorldBounds};
    use snackfall::stats::Scoreboard;

    /// Everything the browser loop needs behind one RefCell
    struct Game {
        engine: GameEngine<Scoreboard>,
        surface: CanvasSurface,
        atlas: DomAtlas,
        settings: Settings,
        input: FrameInput,
        /// Pending animation frame, invalidated on stop
        raf_id: Option<i32>,
    }

    type LoopHandle = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    fn world_bounds(surface: &CanvasSurface) -> WorldBounds {
        WorldBounds {
            width: surface.width(),
            height: surface.height(),
        }
    }

    pub fn run() -> Result<(), JsValue> {
        let _ = console_log::init_with_level(log::Level::Info);
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("missing #canvas element"))?
            .dyn_into()?;

        let mut surface = CanvasSurface::new(canvas.clone())?;
        let atlas = DomAtlas::load(&mut surface);
        let settings = Settings::load();
        let scoreboard = Scoreboard::load();

        let bounds = world_bounds(&surface);
        let seed = js_sys::Date::now() as u64;
        let engine = GameEngine::new(bounds, settings.difficulty, seed, scoreboard);

        let game = Rc::new(RefCell::new(Game {
            engine,
            surface,
            atlas,
            settings,
            input: FrameInput::default(),
            raf_id: None,
        }));

        let game_loop = make_loop(game.clone());

        setup_pointer_input(game.clone(), &canvas);
        setup_keyboard_input(game.clone());
        setup_resize(game.clone());
        setup_buttons(game.clone(), game_loop);

        log::info!("Snackfall ready");
        Ok(())
    }

    /// Build the frame closure once; it reschedules itself while the engine
    /// runs and simply stops being scheduled once a session ends.
    fn make_loop(game: Rc<RefCell<Game>>) -> LoopHandle {
        let handle: LoopHandle = Rc::new(RefCell::new(None));
        let handle_inner = handle.clone();

        *handle.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let mut game = game.borrow_mut();
            game.raf_id = None;

            let input = game.input;
            game.engine.set_input(input);
            let outcome = match game.engine.frame(timestamp) {
                Ok(outcome) => outcome,
                Err(err) => {
                    log::warn!("frame skipped: {err}");
                    return;
                }
            };

            draw(&mut game);
            update_hud(&game);
            for event in &outcome.events {
                handle_event(&game, event);
            }

            if game.engine.running() {
                schedule(&mut game, &handle_inner);
            }
        }) as Box<dyn FnMut(f64)>));

        handle
    }

    fn schedule(game: &mut Game, handle: &LoopHandle) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(closure) = handle.borrow().as_ref() {
            match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(id) => game.raf_id = Some(id),
                Err(err) => log::error!("requestAnimationFrame failed: {err:?}"),
            }
        }
    }

    fn draw(game: &mut Game) {
        let Game {
            engine,
            surface,
            atlas,
            settings,
            ..
        } = game;
        let options = RenderOptions {
            fps: settings.show_fps.then(|| engine.fps()),
            particle_effects: settings.particle_effects,
        };
        RenderEngine::render(surface, atlas, engine.session(), engine.cup(), options);
    }

    fn set_hud_value(selector: &str, value: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(value));
        }
    }

    fn update_hud(game: &Game) {
        let session = game.engine.session();
        set_hud_value("#hud-items .hud-value", &session.item_count().to_string());
        set_hud_value(
            "#hud-target .hud-value",
            &session.target_item_count().to_string(),
        );
        set_hud_value("#hud-lives .hud-value", &session.lives().to_string());
        set_hud_value(
            "#hud-miss .hud-value",
            &format!("{}%", session.miss_percentage()),
        );
        set_hud_value(
            "#hud-best .hud-value",
            &game.engine.sink().high_score.to_string(),
        );
    }

    fn handle_event(game: &Game, event: &GameEvent) {
        match event {
            GameEvent::MaxLivesReached => {
                // Pop animation on the lives HUD element
                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };
                if let Some(el) = document.get_element_by_id("hud-lives") {
                    let _ = el.set_attribute("class", "hud-item pop");
                }
            }
            GameEvent::Ended(result) => show_result(game, *result),
            // Blasts render from simulation state; counters poll via the HUD
            GameEvent::Blast { .. } | GameEvent::ItemCount(_) | GameEvent::Lives(_) => {}
        }
    }

    fn show_result(game: &Game, result: GameResult) {
        let session = game.engine.session();
        log::info!(
            "game over: {:?} ({} of {} items)",
            result,
            session.item_count(),
            session.target_item_count()
        );
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("result-text") {
            el.set_text_content(Some(match result {
                GameResult::Win => "You win!",
                GameResult::Lose => "You lost!",
            }));
        }
        if let Some(el) = document.get_element_by_id("result-screen") {
            let _ = el.set_attribute("class", "screen visible");
        }
    }

    fn hide_result() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("result-screen") {
            let _ = el.set_attribute("class", "screen hidden");
        }
    }

    /// Cancel any pending frame, apply difficulty, reset and go
    fn start_game(game: &Rc<RefCell<Game>>, handle: &LoopHandle, difficulty: Option<Difficulty>) {
        let mut g = game.borrow_mut();
        if let Some(id) = g.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        if let Some(difficulty) = difficulty {
            g.settings.difficulty = difficulty;
            g.settings.save();
            g.engine.select_difficulty(difficulty);
        }
        g.input = FrameInput::default();
        g.engine.start();
        hide_result();
        update_hud(&g);
        schedule(&mut g, handle);
    }

    fn setup_pointer_input(game: Rc<RefCell<Game>>, canvas: &HtmlCanvasElement) {
        // Mouse tracking takes precedence over the arrow keys
        {
            let game = game.clone();
            let canvas_for_rect = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_for_rect.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                game.borrow_mut().input.pointer_x = Some(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer_x = None;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let canvas_for_rect = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_for_rect.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    game.borrow_mut().input.pointer_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard_input(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" => {
                        g.input.left = true;
                        g.input.pointer_x = None;
                    }
                    "ArrowRight" | "d" => {
                        g.input.right = true;
                        g.input.pointer_x = None;
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" => g.input.left = false,
                    "ArrowRight" | "d" => g.input.right = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if let Err(err) = g.surface.fit_to_element() {
                log::warn!("resize failed: {err:?}");
                return;
            }
            let bounds = world_bounds(&g.surface);
            g.engine.resize(bounds);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>, handle: LoopHandle) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let starters = [
            ("start-easy", Difficulty::Easy),
            ("start-medium", Difficulty::Medium),
            ("start-hard", Difficulty::Hard),
        ];
        for (id, difficulty) in starters {
            if let Some(button) = document.get_element_by_id(id) {
                let game = game.clone();
                let handle = handle.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    start_game(&game, &handle, Some(difficulty));
                });
                let _ = button
                    .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(button) = document.get_element_by_id("restart-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                start_game(&game, &handle, None);
            });
            let _ =
                button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(err) = wasm_game::run() {
        web_sys::console::error_1(&err);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Snackfall (native) starting...");
    log::info!("Native mode is a headless smoke run - serve the web build for the real game");

    use snackfall::engine::{GameEngine, NullSink};
    use snackfall::sim::{Difficulty, FrameInput, WorldBounds};

    let bounds = WorldBounds {
        width: 800.0,
        height: 600.0,
    };
    let mut engine = GameEngine::new(bounds, Difficulty::Easy, 42, NullSink);
    engine.start();

    // Sweep the cup back and forth for ten simulated seconds
    let mut now = 0.0;
    for i in 0..600 {
        now += 16.67;
        let x = 400.0 + (i as f32 * 0.05).sin() * 300.0;
        engine.set_input(FrameInput {
            pointer_x: Some(x),
            ..Default::default()
        });
        if engine.frame(now).is_err() {
            break;
        }
    }

    let session = engine.session();
    println!(
        "headless run: {} caught, {} snacks spawned, {} missed ({}%), phase {:?}",
        session.item_count(),
        session.total_items_spawned(),
        session.items_missed(),
        session.miss_percentage(),
        session.phase()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
