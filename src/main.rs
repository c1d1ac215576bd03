//! Lucky Reels entry point
//!
//! In the browser this builds the DOM, loads the images and drives the machine from
//! `requestAnimationFrame`. Natively it plays a headless autoplay session on virtual time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlImageElement, HtmlSelectElement};

    use lucky_reels::consts::*;
    use lucky_reels::loader::{AssetManifest, LoadProgress, MAIN_BG, SECONDARY_BG};
    use lucky_reels::sim::{GameState, Presenter, Reel, SlotMachine, SpinError, Symbol};
    use lucky_reels::{GameConfig, Settings};

    /// Height of one reel slot on screen
    const CELL_PX: f32 = 110.0;
    /// How long a rejected manual spin message stays up
    const REJECT_MESSAGE_MS: f64 = 1500.0;

    /// Presenter writing straight into the DOM
    struct DomPresenter {
        document: Document,
        manifest: AssetManifest,
        /// Play the bonus character animation
        bonus_animation: bool,
        /// Host clock of the current frame (ms)
        clock_ms: f64,
        message_hide_at: Option<f64>,
        /// Symbol currently shown in each cell
        shown: Vec<Vec<Option<Symbol>>>,
    }

    impl DomPresenter {
        fn new(
            document: Document,
            manifest: AssetManifest,
            config: &GameConfig,
            settings: &Settings,
        ) -> Self {
            Self {
                document,
                manifest,
                bonus_animation: settings.bonus_animation(),
                clock_ms: 0.0,
                message_hide_at: None,
                shown: vec![vec![None; config.strip_len]; config.reel_count],
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_background(&self, alias: &str) {
            let Some(src) = self.manifest.src(alias) else {
                return;
            };
            if let Some(body) = self.document.body() {
                let _ = body
                    .style()
                    .set_property("background-image", &format!("url({})", src));
            }
        }

        /// Hide the message banner once its time is up
        fn expire_message(&mut self) {
            if self.message_hide_at.is_some_and(|at| self.clock_ms >= at) {
                self.message_hide_at = None;
                if let Some(el) = self.document.get_element_by_id("message") {
                    let _ = el.class_list().add_1("hidden");
                }
            }
        }
    }

    impl Presenter for DomPresenter {
        fn draw_reel(&mut self, index: usize, reel: &Reel) {
            for (slot, symbol) in reel.slots().iter().enumerate() {
                let id = format!("reel-{}-{}", index, slot);
                let Some(cell) = self.document.get_element_by_id(&id) else {
                    continue;
                };

                let shown = self.shown.get_mut(index).and_then(|row| row.get_mut(slot));
                if let Some(shown) = shown {
                    if *shown != Some(*symbol) {
                        *shown = Some(*symbol);
                        if let Some(img) = cell.dyn_ref::<HtmlImageElement>() {
                            img.set_src(self.manifest.symbol_src(*symbol).unwrap_or_default());
                            img.set_alt(symbol.glyph());
                        }
                    }
                }

                // Slot 0 is overscan above the window
                let y = (reel.slot_offset(slot) - 1.0) * CELL_PX;
                if let Some(cell) = cell.dyn_ref::<HtmlElement>() {
                    let _ = cell
                        .style()
                        .set_property("transform", &format!("translateY({:.1}px)", y));
                }
            }
        }

        fn balance_changed(&mut self, balance: u64) {
            self.set_text("balance", &format!("Balance: ${}", balance));
        }

        fn free_spins_changed(&mut self, free_spins: u32) {
            self.set_text("free-spins", &format!("Free Spins: {}", free_spins));
        }

        fn show_message(&mut self, text: &str, duration_ms: f64) {
            if let Some(el) = self.document.get_element_by_id("message") {
                el.set_text_content(Some(text));
                let _ = el.class_list().remove_1("hidden");
            }
            self.message_hide_at = Some(self.clock_ms + duration_ms);
        }

        fn bonus_started(&mut self) {
            if let Some(app) = self.document.get_element_by_id("app") {
                let _ = app.class_list().add_1("bonus");
                if self.bonus_animation {
                    let _ = app.class_list().add_1("bonus-animated");
                }
            }
            self.set_background(SECONDARY_BG);
        }

        fn bonus_ended(&mut self) {
            if let Some(app) = self.document.get_element_by_id("app") {
                let _ = app.class_list().remove_2("bonus", "bonus-animated");
            }
            self.set_background(MAIN_BG);
        }

        fn spin_rejected(&mut self, error: &SpinError) {
            self.show_message(&error.to_string(), REJECT_MESSAGE_MS);
        }
    }

    struct Game {
        machine: SlotMachine<DomPresenter>,
        settings: Settings,
        last_time: f64,
    }

    impl Game {
        fn update(&mut self, time: f64) {
            let delta = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                FRAME_MS as f64
            };
            self.last_time = time;

            self.machine.presenter_mut().clock_ms = time;
            self.machine.update(delta);
            self.machine.presenter_mut().expire_message();
            self.update_controls();
        }

        fn spin(&mut self) {
            if let Err(err) = self.machine.request_spin() {
                self.machine.presenter_mut().spin_rejected(&err);
            }
        }

        fn toggle_autoplay(&mut self) {
            if let Err(err) = self.machine.toggle_autoplay() {
                self.machine.presenter_mut().spin_rejected(&err);
            }
        }

        fn set_stake(&mut self, amount: u64) -> bool {
            match self.machine.set_stake(amount) {
                Ok(()) => {
                    self.settings.stake = amount;
                    self.settings.save();
                    true
                }
                Err(err) => {
                    log::warn!("Stake change refused: {}", err);
                    false
                }
            }
        }

        /// Sync button state with the machine
        fn update_controls(&self) {
            let document = &self.machine.presenter().document;

            if let Some(btn) = document.get_element_by_id("spin-btn") {
                set_disabled(&btn, !self.machine.spin_enabled());
            }
            if let Some(btn) = document.get_element_by_id("auto-btn") {
                let label = if self.machine.autoplay_active() {
                    format!("STOP ({})", self.machine.ledger().autoplay_rounds())
                } else {
                    "AUTO".to_string()
                };
                btn.set_text_content(Some(&label));
                set_disabled(&btn, self.machine.state() == GameState::Loading);
            }
            if let Some(select) = document.get_element_by_id("bet-select") {
                set_disabled(&select, self.machine.state() != GameState::Idle);
            }
        }
    }

    fn set_disabled(el: &Element, disabled: bool) {
        let _ = if disabled {
            el.set_attribute("disabled", "")
        } else {
            el.remove_attribute("disabled")
        };
    }

    /// Create `<tag id=id>` under `parent`
    fn append(document: &Document, parent: &Element, tag: &str, id: &str) -> Option<Element> {
        let el = document.create_element(tag).ok()?;
        if !id.is_empty() {
            el.set_id(id);
        }
        parent.append_child(&el).ok()?;
        Some(el)
    }

    fn build_dom(document: &Document, config: &GameConfig) -> Option<()> {
        let body = document.body()?;
        let app = append(document, &body, "div", "app")?;

        let hud = append(document, &app, "div", "hud")?;
        append(document, &hud, "span", "balance")?;
        append(document, &hud, "span", "free-spins")?;

        let reels = append(document, &app, "div", "reels")?;
        let window_px = format!("height: {}px", CELL_PX * VISIBLE_ROWS as f32);
        for i in 0..config.reel_count {
            let column = append(document, &reels, "div", &format!("reel-{}", i))?;
            column.set_class_name("reel");
            let _ = column.set_attribute("style", &window_px);
            for slot in 0..config.strip_len {
                let cell = append(document, &column, "img", &format!("reel-{}-{}", i, slot))?;
                cell.set_class_name("cell");
            }
        }

        let message = append(document, &app, "div", "message")?;
        message.set_class_name("hidden");

        let controls = append(document, &app, "div", "controls")?;
        let select = append(document, &controls, "select", "bet-select")?;
        for bet in &config.bet_options {
            let option = append(document, &select, "option", "")?;
            let _ = option.set_attribute("value", &bet.to_string());
            option.set_text_content(Some(&format!("${}", bet)));
            if *bet == config.stake {
                let _ = option.set_attribute("selected", "");
            }
        }
        append(document, &controls, "button", "spin-btn")?.set_text_content(Some("SPIN"));
        append(document, &controls, "button", "auto-btn")?.set_text_content(Some("AUTO"));

        let loading = append(document, &app, "div", "loading")?;
        let bar = append(document, &loading, "div", "progress-bar")?;
        append(document, &bar, "div", "progress-fill")?;
        Some(())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Lucky Reels starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };

        let settings = Settings::load();
        let mut config = GameConfig::with_seed(js_sys::Date::now() as u64);
        settings.apply(&mut config);

        if build_dom(&document, &config).is_none() {
            log::error!("Failed to build the page");
            return;
        }

        let manifest = AssetManifest::standard();
        let presenter = DomPresenter::new(document.clone(), manifest.clone(), &config, &settings);
        let machine = match SlotMachine::new(config, presenter) {
            Ok(machine) => machine,
            Err(err) => {
                log::error!("Invalid game config: {}", err);
                return;
            }
        };
        log::info!("Machine initialized with seed: {}", machine.config().seed);

        let game = Rc::new(RefCell::new(Game {
            machine,
            settings,
            last_time: 0.0,
        }));

        setup_buttons(&document, game.clone());
        setup_bet_select(&document, game.clone());
        setup_keyboard(game.clone());
        load_assets(&document, &manifest, game.clone());

        request_animation_frame(game);

        log::info!("Lucky Reels running!");
    }

    /// Load every manifest image, then leave `Loading`
    fn load_assets(document: &Document, manifest: &AssetManifest, game: Rc<RefCell<Game>>) {
        let progress = Rc::new(RefCell::new(LoadProgress::new(manifest.len())));
        if manifest.is_empty() {
            report_progress(document, &progress, &game);
            return;
        }

        for entry in &manifest.entries {
            let Ok(img) = HtmlImageElement::new() else {
                progress.borrow_mut().mark_failed();
                report_progress(document, &progress, &game);
                continue;
            };

            let onload = {
                let (document, progress, game) = (document.clone(), progress.clone(), game.clone());
                Closure::<dyn FnMut()>::new(move || {
                    progress.borrow_mut().mark_loaded();
                    report_progress(&document, &progress, &game);
                })
            };
            let onerror = {
                let (document, progress, game) = (document.clone(), progress.clone(), game.clone());
                let alias = entry.alias.clone();
                Closure::<dyn FnMut()>::new(move || {
                    log::error!("Error loading asset: {}", alias);
                    progress.borrow_mut().mark_failed();
                    report_progress(&document, &progress, &game);
                })
            };
            img.set_onload(Some(onload.as_ref().unchecked_ref()));
            img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onload.forget();
            onerror.forget();

            img.set_src(&entry.src);
        }
    }

    fn report_progress(
        document: &Document,
        progress: &Rc<RefCell<LoadProgress>>,
        game: &Rc<RefCell<Game>>,
    ) {
        let p = *progress.borrow();
        log::debug!("Loaded {}/{} assets", p.loaded, p.total);

        if let Some(fill) = document
            .get_element_by_id("progress-fill")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = fill
                .style()
                .set_property("width", &format!("{:.0}%", p.fraction() * 100.0));
        }

        if p.is_complete() {
            log::info!("All assets loaded");
            if let Some(loading) = document.get_element_by_id("loading") {
                let _ = loading.set_attribute("class", "hidden");
            }
            let mut g = game.borrow_mut();
            g.machine.presenter().set_background(MAIN_BG);
            g.machine.finish_loading();
        } else if p.has_failed() && p.loaded + p.failed >= p.total {
            if let Some(loading) = document.get_element_by_id("loading") {
                loading.set_text_content(Some("Failed to load assets"));
            }
            game.borrow_mut()
                .machine
                .loading_failed(&format!("{} of {} assets failed", p.failed, p.total));
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("spin-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().spin();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("auto-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().toggle_autoplay();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_bet_select(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(select) = document
            .get_element_by_id("bet-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };

        let target = select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            let accepted = target
                .value()
                .parse::<u64>()
                .is_ok_and(|amount| g.set_stake(amount));
            if !accepted {
                target.set_value(&g.machine.config().stake.to_string());
            }
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                " " | "Enter" => {
                    event.prevent_default();
                    if g.machine.spin_enabled() {
                        g.spin();
                    }
                }
                "a" | "A" => g.toggle_autoplay(),
                _ => {}
            }
        });
        let _ = window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
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

/// Longest headless session before giving up (virtual ms)
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_LIMIT_MS: f64 = 10.0 * 60.0 * 1000.0;

#[cfg(not(target_arch = "wasm32"))]
struct LogPresenter;

#[cfg(not(target_arch = "wasm32"))]
impl lucky_reels::sim::Presenter for LogPresenter {
    fn show_message(&mut self, text: &str, _duration_ms: f64) {
        log::info!("{}", text.replace('\n', " "));
    }

    fn bonus_started(&mut self) {
        log::info!("Bonus round!");
    }

    fn spin_rejected(&mut self, error: &lucky_reels::sim::SpinError) {
        log::warn!("{}", error);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lucky Reels (native) starting...");
    log::info!("Native mode plays a headless session - use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    if let Err(err) = run_headless(seed) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

/// Play one autoplay session on virtual time
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    use lucky_reels::consts::FRAME_MS;
    use lucky_reels::sim::{GameState, SlotMachine};
    use lucky_reels::{GameConfig, Settings};

    let mut config = GameConfig::with_seed(seed);
    Settings::load().apply(&mut config);

    let mut machine = SlotMachine::new(config, LogPresenter)?;
    machine.finish_loading();
    machine.toggle_autoplay()?;

    let frame = FRAME_MS as f64;
    while machine.autoplay_active() || machine.state() != GameState::Idle {
        if machine.now_ms() > HEADLESS_LIMIT_MS {
            log::warn!("Session did not finish within {} ms", HEADLESS_LIMIT_MS);
            break;
        }
        // Nothing moves between timers while the reels rest, so skip ahead
        let step = if machine.reels().iter().any(|r| r.is_spinning()) {
            frame
        } else {
            machine.next_timer_in().map_or(frame, |due| due.max(frame))
        };
        machine.update(step);
    }

    let ledger = machine.ledger();
    log::info!(
        "Session over after {:.1}s: balance {} (started at {}), free spins {}",
        machine.now_ms() / 1000.0,
        ledger.balance(),
        machine.config().starting_balance,
        ledger.free_spins()
    );
    Ok(())
}
