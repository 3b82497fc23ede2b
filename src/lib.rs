pub mod art;
pub mod assets;
pub mod config;
pub mod diagnostics;
pub mod game;
pub mod input;
pub mod render;
pub mod splash;

use assets::{AssetSlot, Assets};
use config::GameConfig;
use diagnostics::{DiagnosticsPanel, HostInfo};
use game::{Game, RandomSource};
use render::Renderer;
use splash::Flock;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, Window};

const CANVAS_ID: &str = "game-canvas";
const RESIZE_SETTLE_MS: i32 = 140;
const MAX_DPR: f64 = 2.5;

/// `Math.random()` as the game's randomness.
pub struct MathRandom;

impl RandomSource for MathRandom {
    fn next_unit(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

struct AppState {
    document: Document,
    game: Game,
    flock: Flock,
    rng: MathRandom,
    renderer: Renderer,
    panel: Option<DiagnosticsPanel>,
    status: &'static str,
    user_agent: String,
    last_event: String,
    last_ts: Option<f64>,
}

fn window() -> Window {
    web_sys::window().expect("missing window")
}

fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn viewport_size(window: &Window) -> Result<(f64, f64), JsValue> {
    Ok((
        window.inner_width()?.as_f64().unwrap_or(1.0).max(1.0),
        window.inner_height()?.as_f64().unwrap_or(1.0).max(1.0),
    ))
}

fn note_event(state: &mut AppState, event: String) {
    if let Some(el) = state.document.document_element() {
        let _ = el.set_attribute("data-last-event", &event);
    }
    state.last_event = event;
}

fn update_geometry(state: &mut AppState) -> Result<(), JsValue> {
    let window = window();
    let (css_width, css_height) = viewport_size(&window)?;
    let dpr = window.device_pixel_ratio();

    let style = state.renderer.canvas().style();
    style.set_property("width", &format!("{}px", css_width))?;
    style.set_property("height", &format!("{}px", css_height))?;

    let playfield = state.game.playfield();
    state.renderer.resize(css_width, css_height, dpr, playfield);
    Ok(())
}

fn update_diagnostics(state: &AppState) -> Result<(), JsValue> {
    let Some(panel) = &state.panel else {
        return Ok(());
    };
    if !panel.is_open() {
        return Ok(());
    }

    let window = window();
    let canvas = state.renderer.canvas();
    let assets = state.renderer.assets.summary();
    let host = HostInfo {
        status: state.status,
        last_event: &state.last_event,
        assets: &assets,
        canvas: (canvas.width(), canvas.height()),
        viewport: viewport_size(&window)?,
        dpr: window.device_pixel_ratio().min(MAX_DPR),
        draw_info: state.renderer.draw_info(),
        user_agent: &state.user_agent,
    };
    panel.update(&diagnostics::summary_lines(&state.game, &host));
    Ok(())
}

/// One animation frame: advance the simulation by the clamped elapsed time, log what
/// happened, then draw.
fn frame(state: &mut AppState, ts: f64) {
    let dt_ms = match state.last_ts {
        Some(last) => state.game.config().frame_dt(ts - last),
        None => 0.0,
    };
    state.last_ts = Some(ts);

    state.game.tick(dt_ms);
    if state.game.in_menu() {
        state.flock.update(dt_ms, &mut state.rng);
    }

    for event in state.game.take_events() {
        if event == game::GameEvent::ReturnedToTitle {
            state.flock.reset(&mut state.rng);
        }
        let label = event.label();
        if event.is_milestone() {
            web_sys::console::log_1(&JsValue::from_str(&format!("skyflap: {}", label)));
        }
        note_event(state, label);
    }

    let status = diagnostics::phase_name(state.game.phase());
    if status != state.status {
        state.status = status;
        diagnostics::set_status(&state.document, None, status, status);
    }

    if let Err(err) = state.renderer.draw(&state.game, &state.flock) {
        note_event(state, format!("draw_error: {}", js_value_to_string(&err)));
    }

    let _ = update_diagnostics(state);
}

fn load_assets(state: Rc<RefCell<AppState>>) {
    for slot in AssetSlot::ALL {
        let state = Rc::clone(&state);
        spawn_local(async move {
            let result = assets::load_image(slot.url()).await;

            let mut st = state.borrow_mut();
            let st = &mut *st;
            match result {
                Ok(image) => {
                    st.renderer.assets.install(slot, image);
                    note_event(st, format!("asset_loaded_{}", slot.name()));
                }
                Err(err) => {
                    st.renderer.assets.mark_fallback(slot);
                    web_sys::console::warn_1(&JsValue::from_str(&format!(
                        "skyflap: {} unavailable ({}), using placeholder art",
                        slot.url(),
                        js_value_to_string(&err)
                    )));
                    note_event(st, format!("asset_fallback_{}", slot.name()));
                }
            }
        });
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(err) = start_impl() {
        let message = format!("fatal: {}", js_value_to_string(&err));

        if let Some(win) = web_sys::window() {
            if let Some(doc) = win.document() {
                if let Some(el) = doc.document_element() {
                    let _ = el.set_attribute("data-render-status", "error");
                }
                if let Some(diag) = doc.get_element_by_id("diagnostics-text") {
                    diag.set_text_content(Some(&message));
                } else if let Some(diag) = doc.get_element_by_id("diagnostics") {
                    diag.set_text_content(Some(&message));
                }
                if let Some(fallback) = doc.get_element_by_id("fallback") {
                    let _ = fallback.remove_attribute("hidden");
                }
            }
        }

        web_sys::console::error_1(&err);
    }
}

fn start_impl() -> Result<(), JsValue> {
    let win = window();
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("Missing canvas"))?
        .dyn_into::<HtmlCanvasElement>()?;

    let search = win.location().search().unwrap_or_default();
    let (css_width, css_height) = viewport_size(&win)?;
    let playfield = (css_width * 2.0 / 3.0, css_height);

    let mut config = GameConfig::for_playfield(playfield.0, playfield.1);
    for message in config.apply_query(&search) {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "skyflap: ignored setting {}",
            message
        )));
    }

    let user_agent = win.navigator().user_agent().unwrap_or_default();
    let is_headless = user_agent.to_ascii_lowercase().contains("headless");
    let diag_requested = search
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair == "diag=1" || pair == "diag");

    let assets = Assets::placeholders(&document, config.bird_frames)?;
    let renderer = Renderer::new(canvas.clone(), assets)?;

    let mut rng = MathRandom;
    let flock = Flock::new(
        playfield.0,
        playfield.1,
        config.bird_size,
        config.bird_frames,
        config.frame_duration_ms,
        &mut rng,
    );
    let game = Game::new(config, playfield.0, playfield.1, Box::new(MathRandom));

    let mut panel = DiagnosticsPanel::find(&document);
    if let Some(panel) = panel.as_mut() {
        panel.set_open(is_headless || diag_requested);
    }

    let state = Rc::new(RefCell::new(AppState {
        document: document.clone(),
        game,
        flock,
        rng,
        renderer,
        panel,
        status: "loading",
        user_agent,
        last_event: "init".to_string(),
        last_ts: None,
    }));

    {
        let mut state = state.borrow_mut();
        diagnostics::set_status(
            &document,
            state.panel.as_ref().map(DiagnosticsPanel::text),
            "loading",
            "Loading",
        );
        update_geometry(&mut state)?;
    }

    let toggle_target = state
        .borrow()
        .panel
        .as_ref()
        .and_then(|panel| panel.tools_button().cloned());
    if let Some(button) = toggle_target {
        let state_toggle = Rc::clone(&state);
        let toggle = Closure::wrap(Box::new(move |_event: Event| {
            let mut st = state_toggle.borrow_mut();
            let st = &mut *st;
            if let Some(panel) = st.panel.as_mut() {
                let open = !panel.is_open();
                panel.set_open(open);
            }
            note_event(st, "toggle_diagnostics".to_string());
            let _ = update_diagnostics(st);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", toggle.as_ref().unchecked_ref())?;
        toggle.forget();
    }

    let state_key = Rc::clone(&state);
    let on_keydown = Closure::wrap(Box::new(move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let mut st = state_key.borrow_mut();
        let Some(command) = input::command_for_key(&key.code(), st.game.in_menu()) else {
            return;
        };
        event.prevent_default();
        st.game.handle(command);
        note_event(&mut st, format!("key_{}", key.code()));
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();

    let state_pointer = Rc::clone(&state);
    let on_pointerdown = Closure::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        let mut st = state_pointer.borrow_mut();
        let command = input::command_for_pointer(st.game.in_menu());
        st.game.handle(command);
        note_event(&mut st, "pointerdown".to_string());
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("pointerdown", on_pointerdown.as_ref().unchecked_ref())?;
    on_pointerdown.forget();

    let resize_timer_handle: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));

    let state_settle = Rc::clone(&state);
    let resize_settle_cb: Rc<Closure<dyn FnMut()>> = Rc::new(Closure::wrap(Box::new(move || {
        let mut st = state_settle.borrow_mut();
        if let Err(err) = update_geometry(&mut st) {
            note_event(&mut st, format!("resize_error: {}", js_value_to_string(&err)));
            return;
        }
        note_event(&mut st, "resize_settled".to_string());
    })
        as Box<dyn FnMut()>));

    let state_resize = Rc::clone(&state);
    let resize_timer_handle_ev = Rc::clone(&resize_timer_handle);
    let resize_settle_cb_ev = Rc::clone(&resize_settle_cb);
    let resize = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(id) = resize_timer_handle_ev.borrow_mut().take() {
            window().clear_timeout_with_handle(id);
        }

        match window().set_timeout_with_callback_and_timeout_and_arguments_0(
            resize_settle_cb_ev.as_ref().as_ref().unchecked_ref(),
            RESIZE_SETTLE_MS,
        ) {
            Ok(id) => {
                *resize_timer_handle_ev.borrow_mut() = Some(id);
            }
            Err(_) => {
                let _ = update_geometry(&mut state_resize.borrow_mut());
            }
        }
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();

    load_assets(Rc::clone(&state));

    // The frame callback re-arms itself through this slot for the life of the page.
    let raf_holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let raf_holder_cb = Rc::clone(&raf_holder);
    let state_frame = Rc::clone(&state);
    *raf_holder.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        frame(&mut state_frame.borrow_mut(), ts);

        if let Some(cb) = raf_holder_cb.borrow().as_ref() {
            if window()
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .is_err()
            {
                web_sys::console::error_1(&JsValue::from_str(
                    "skyflap: requestAnimationFrame failed, stopping",
                ));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(cb) = raf_holder.borrow().as_ref() {
        win.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }

    web_sys::console::log_1(&JsValue::from_str(&format!(
        "skyflap: started, playfield {}x{}",
        playfield.0.round(),
        playfield.1.round()
    )));

    Ok(())
}
