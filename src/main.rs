//! Bounce Pop entry point
//!
//! In the browser this wires the canvas, the page controls and the animation
//! loop. Natively it runs both variants headless and prints the arcade summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent};

    use bounce_pop::renderer::CanvasReporter;
    use bounce_pop::sim::{ArcadeGame, BounceWorld, Bounds, Simulation, SimulationClock};
    use bounce_pop::{ArcadeConfig, BounceConfig};

    /// A running session plus the surface it draws on
    struct App<S> {
        clock: SimulationClock<S>,
        reporter: CanvasReporter,
    }

    type Shared<S> = Rc<RefCell<App<S>>>;

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
        }

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let bounds = fit_canvas(&canvas);
        let mut reporter = CanvasReporter::new(&canvas)?;
        reporter.resize(bounds.width, bounds.height);
        let seed = js_sys::Date::now() as u64;

        match canvas.get_attribute("data-mode").as_deref() {
            Some("arcade") => {
                log::info!("Starting arcade with seed {}", seed);
                let config = ArcadeConfig {
                    seed,
                    ..Default::default()
                };
                let app = Rc::new(RefCell::new(App {
                    clock: SimulationClock::new(ArcadeGame::new(config, bounds)),
                    reporter,
                }));
                setup_resize(&canvas, app.clone(), |game: &mut ArcadeGame, b| {
                    game.set_bounds(b)
                });
                setup_arcade_controls(&document, &canvas, app.clone());
                request_animation_frame(app);
            }
            _ => {
                let config = BounceConfig::from_inputs(
                    &input_value(&document, "count"),
                    &input_value(&document, "speed"),
                    seed,
                );
                log::info!("Starting bounce with {} balls, seed {}", config.count, seed);
                let app = Rc::new(RefCell::new(App {
                    clock: SimulationClock::new(BounceWorld::new(config, bounds)),
                    reporter,
                }));
                setup_resize(&canvas, app.clone(), |world: &mut BounceWorld, b| {
                    world.set_bounds(b)
                });
                setup_bounce_controls(&document, app.clone());
                request_animation_frame(app);
            }
        }
        Ok(())
    }

    /// Size the backing store to the element's layout box
    fn fit_canvas(canvas: &HtmlCanvasElement) -> Bounds {
        let width = canvas.client_width().max(0) as u32;
        let height = canvas.client_height().max(0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        Bounds::new(width as f64, height as f64)
    }

    fn input_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn request_animation_frame<S: Simulation + 'static>(app: Shared<S>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame<S: Simulation + 'static>(app: Shared<S>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let App { clock, reporter } = &mut *a;
            clock.frame(time, reporter);
        }
        request_animation_frame(app);
    }

    fn setup_resize<S: 'static>(
        canvas: &HtmlCanvasElement,
        app: Shared<S>,
        apply: impl Fn(&mut S, Bounds) + 'static,
    ) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let bounds = fit_canvas(&canvas);
            let mut a = app.borrow_mut();
            a.reporter.resize(bounds.width, bounds.height);
            apply(a.clock.state_mut(), bounds);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_bounce_controls(document: &Document, app: Shared<BounceWorld>) {
        let regenerate = {
            let app = app.clone();
            let document = document.clone();
            move || {
                let count = input_value(&document, "count");
                let speed = input_value(&document, "speed");
                let config = BounceConfig::from_inputs(&count, &speed, 0);
                app.borrow_mut()
                    .clock
                    .state_mut()
                    .reconfigure(config.count, config.base_speed);
            }
        };

        on_click(document, "regen", regenerate.clone());

        // Enter in either field regenerates too
        for id in ["count", "speed"] {
            if let Some(el) = document.get_element_by_id(id) {
                let regenerate = regenerate.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                    if event.key() == "Enter" {
                        regenerate();
                    }
                });
                let _ = el.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Speed edits move the collision floor without respawning
        if let Some(el) = document.get_element_by_id("speed") {
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let speed = input_value(&document, "speed");
                let config = BounceConfig::from_inputs("", &speed, 0);
                app.borrow_mut().clock.state_mut().set_base_speed(config.base_speed);
            });
            let _ = el.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_arcade_controls(document: &Document, canvas: &HtmlCanvasElement, app: Shared<ArcadeGame>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let x = event.offset_x() as f64;
                let y = event.offset_y() as f64;
                app.borrow_mut().clock.state_mut().click(x, y);
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let buttons: [(&str, fn(&mut ArcadeGame) -> bool); 5] = [
            ("start-btn", ArcadeGame::start),
            ("pause-btn", ArcadeGame::toggle_pause),
            ("next-btn", ArcadeGame::next_level),
            ("end-btn", ArcadeGame::end_run),
            ("reset-btn", ArcadeGame::reset),
        ];
        for (id, action) in buttons {
            let app = app.clone();
            on_click(document, id, move || {
                if !action(app.borrow_mut().clock.state_mut()) {
                    log::debug!("{} ignored in current phase", id);
                }
            });
        }

        // Escape toggles pause
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Escape" {
                    app.borrow_mut().clock.state_mut().toggle_pause();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use bounce_pop::sim::{
        ArcadeGame, BounceWorld, Bounds, EntitySnapshot, GameEvent, Phase, Reporter,
        SimulationClock,
    };
    use bounce_pop::{Config, RunSummary};

    /// Frame period of a 60 Hz display (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up on a run that never finishes (ten simulated minutes)
    const MAX_FRAMES: u64 = 60 * 600;
    /// The bot clicks once per this many frames
    const CLICK_EVERY: u64 = 24;

    /// Logs lifecycle events as they arrive
    #[derive(Default)]
    struct LogReporter {
        frames: u64,
        drawn: usize,
    }

    impl Reporter for LogReporter {
        fn frame(&mut self, _now_ms: f64, entities: &[EntitySnapshot]) {
            self.frames += 1;
            self.drawn = entities.len();
        }

        fn event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::LevelStarted { level, target } => {
                    log::info!("Level {} started with {} targets", level, target)
                }
                GameEvent::LevelEnded(record) => log::info!(
                    "Level {} ended: {} popped, {} escaped ({}%)",
                    record.level,
                    record.killed,
                    record.escaped,
                    record.efficiency_pct
                ),
                GameEvent::RunFinished(summary) => {
                    log::info!("Run finished after {} levels", summary.levels.len())
                }
                other => log::info!("{:?}", other),
            }
        }
    }

    pub fn run_bounce(config: &Config, bounds: Bounds, seconds: f64) {
        let mut clock = SimulationClock::new(BounceWorld::new(config.bounce.clone(), bounds));
        let mut reporter = LogReporter::default();
        let mut contacts = 0;

        let frames = (seconds * 1000.0 / FRAME_MS) as u64;
        for i in 0..frames {
            clock.frame(i as f64 * FRAME_MS, &mut reporter);
            contacts += clock.state().last_stats().contacts;
        }

        let world = clock.state();
        log::info!(
            "Bounce: {} balls, {} frames, {} contacts, overlap-free start: {}",
            reporter.drawn,
            reporter.frames,
            contacts,
            world.overlap_free()
        );
    }

    /// Play a full arcade run with a bot that pops the highest visible target
    /// every few frames and confirms each level report
    pub fn run_arcade(config: &Config, bounds: Bounds) -> Option<RunSummary> {
        let mut clock = SimulationClock::new(ArcadeGame::new(config.arcade.clone(), bounds));
        let mut reporter = LogReporter::default();
        clock.state_mut().start();

        for i in 0..MAX_FRAMES {
            let game = clock.state_mut();
            match game.phase() {
                Phase::LevelEndPending => {
                    game.next_level();
                }
                Phase::Finished => break,
                _ => {}
            }

            if i % CLICK_EVERY == 0 {
                let target = game
                    .entities()
                    .iter()
                    .filter(|e| e.is_interactive() && e.pos.y + e.radius() < bounds.height)
                    .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|e| e.pos);
                if let Some(pos) = target {
                    game.click(pos.x, pos.y);
                }
            }

            clock.frame(i as f64 * FRAME_MS, &mut reporter);
        }

        let summary = clock.state().summary().cloned();
        if summary.is_none() {
            log::warn!("Arcade run did not finish within {} frames", MAX_FRAMES);
        }
        summary
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> Result<bounce_pop::Config, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(bounce_pop::Config::from_json(&json)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Bounce Pop (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Failed to load config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => bounce_pop::Config::default(),
    };

    let bounds = bounce_pop::sim::Bounds::new(1280.0, 720.0);
    headless::run_bounce(&config, bounds, 10.0);

    match headless::run_arcade(&config, bounds) {
        Some(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(err) => log::error!("Failed to serialize summary: {}", err),
        },
        None => std::process::exit(2),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}
