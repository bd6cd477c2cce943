#![forbid(unsafe_code)]

//! Application model.
//!
//! [`AppModel`] ties the Section State Machine, the Reveal-on-Scroll Observer,
//! the Input Router and the Particle Field together under the runtime's
//! model/update/view contract. Every delay is a subscription whose id encodes
//! the mount it belongs to, so a panel change or teardown cancels it simply
//! by no longer declaring it.
//!
//! ```text
//!   Loading ──(1500ms)──► Running ──(quit)──► Stopped
//!                            │
//!        events ─► HitMap ─► InputRouter ─► Intent ─► SectionMachine
//!                                                          │ panel changed
//!                                                          ▼
//!                                          RevealObserver::arm ─(100ms)─► settle scan
//! ```

use std::sync::Arc;
use std::time::Duration;

use folio_core::animation::{Animation, Pulse, ease_out};
use folio_core::event::{Event, KeyCode};
use folio_core::geometry::Rect;
use folio_render::cell::Cell;
use folio_render::frame::Frame;
use folio_runtime::{After, Cmd, Every, Model, PreferenceStore, SubId, Subscription};
use tracing::{debug, info};

use crate::chrome::{self, TOAST_DURATION, Toast};
use crate::contact::{ContactForm, Field, FormFocus, FormInput, SENT_MESSAGE, SubmitOutcome};
use crate::content::Content;
use crate::input::{InputRouter, Intent, RouteContext, ScrollDelta};
use crate::layout::{HitMap, LayoutMode, Target, split_chrome};
use crate::nav::SectionMachine;
use crate::panel::PanelId;
use crate::particles::ParticleField;
use crate::reveal::{RevealObserver, SETTLE_DELAY};
use crate::screens::{self, Document, ViewContext, loading};
use crate::theme::Theme;

/// Animation frame cadence (~30 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Delay between "Enter Portfolio" and the map mounting.
pub const EXPLORE_DELAY: Duration = Duration::from_millis(800);

/// Fade-in of a freshly mounted panel.
pub const PANEL_FADE: Duration = Duration::from_millis(300);

/// Hub halo cycles per second.
const PULSE_HZ: f32 = 0.5;

pub const FRAME_SUB: SubId = 0x4652_414D;
pub const LOADING_SUB: SubId = 0x4C4F_4144;
pub const EXIT_SUB: SubId = 0x4558_4954;
/// Explore timer id is this plus the intro's mount generation.
pub const EXPLORE_SUB_BASE: SubId = 1 << 40;
/// Settle timer id is this plus the mount generation it scans.
pub const SETTLE_SUB_BASE: SubId = 2 << 40;
/// Toast expiry id is this plus the toast serial.
pub const TOAST_SUB_BASE: SubId = 3 << 40;

/// Startup options the model needs.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub layout: LayoutMode,
    pub seed: u64,
    /// Quit on its own after this long.
    pub exit_after: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppMsg {
    /// A terminal event other than resize.
    ///
    /// `at` is the arrival time the runtime stamped it with; events built
    /// with `From<Event>` have none and are timed by the frame clock.
    Event { event: Event, at: Option<Duration> },
    Resize { width: u16, height: u16 },
    LoadingDone,
    /// One animation frame elapsed.
    Frame,
    ExploreElapsed,
    /// Settle scan for the given mount generation.
    RevealSettle(u64),
    ToastExpired(u64),
    /// Apply an intent directly, bypassing the router.
    Intent(Intent),
    Quit,
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        if let Event::Resize { width, height } = event {
            return Self::Resize { width, height };
        }
        Self::Event { event, at: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Loading screen up; nothing else is mounted.
    Loading,
    Running,
    /// Torn down. No subscription is declared and no input is routed.
    Stopped,
}

pub struct AppModel {
    pub config: AppConfig,
    pub content: Content,
    preferences: Option<Arc<PreferenceStore>>,
    pub nav: SectionMachine,
    pub router: InputRouter,
    pub reveal: RevealObserver,
    pub particles: Option<ParticleField>,
    pub form: ContactForm,
    pub phase: Phase,
    pub viewport: (u16, u16),
    /// Scroll offset of the active content panel.
    pub scroll: u16,
    /// Keyboard-focused project card.
    pub card_focus: usize,
    /// Last accepted normalised pointer position.
    pub pointer: (f32, f32),
    /// Virtual time, advanced one frame at a time.
    pub clock: Duration,
    loading_for: Duration,
    mounted_for: Duration,
    exploring_for: Duration,
    pulse: Pulse,
    pub toast: Option<Toast>,
    toast_serial: u64,
}

impl AppModel {
    pub fn new(config: AppConfig, content: Content) -> Self {
        let nav = SectionMachine::new(content.projects.len());
        Self {
            config,
            content,
            preferences: None,
            nav,
            router: InputRouter::new(),
            reveal: RevealObserver::new(),
            particles: None,
            form: ContactForm::new(),
            phase: Phase::Loading,
            viewport: (0, 0),
            scroll: 0,
            card_focus: 0,
            pointer: (0.5, 0.5),
            clock: Duration::ZERO,
            loading_for: Duration::ZERO,
            mounted_for: Duration::ZERO,
            exploring_for: Duration::ZERO,
            pulse: Pulse::new(PULSE_HZ),
            toast: None,
            toast_serial: 0,
        }
    }

    /// Read the theme from `store` on init and stage every toggle in it.
    #[must_use]
    pub fn with_preferences(mut self, store: Arc<PreferenceStore>) -> Self {
        self.preferences = Some(store);
        self
    }

    pub fn theme(&self) -> Theme {
        self.nav.theme()
    }

    pub fn mounted_for(&self) -> Duration {
        self.mounted_for
    }

    /// Everything the panel renderer reads, borrowed from `self`.
    pub fn view_context(&self) -> ViewContext<'_> {
        ViewContext {
            nav: &self.nav,
            content: &self.content,
            form: &self.form,
            reveal: &self.reveal,
            palette: self.nav.theme().palette(),
            card_focus: self.card_focus,
            scroll: self.scroll,
            mounted_for: self.mounted_for,
            pulse: self.pulse.value(),
            pointer: self.pointer,
        }
    }

    fn screen(&self) -> Rect {
        Rect::from_size(self.viewport.0, self.viewport.1)
    }

    /// Panel area and optional tab bar inside `area`.
    fn chrome(&self, area: Rect) -> (Rect, Option<Rect>) {
        split_chrome(area, self.config.layout.is_compact(area.width))
    }

    pub fn panel_area(&self) -> Rect {
        self.chrome(self.screen()).0
    }

    /// Layout of the active content panel at the current size.
    pub fn document(&self) -> Option<Document> {
        screens::document(&self.view_context(), self.panel_area().width)
    }

    /// Click targets currently on screen, topmost last.
    pub fn hit_map(&self) -> HitMap {
        let (panel, bar) = self.chrome(self.screen());
        let ctx = self.view_context();
        let mut hits = screens::hit_map(&ctx, panel);
        if let Some(bar) = bar {
            if ctx.overlay_open() {
                hits.push(bar, Target::Backdrop);
            } else {
                chrome::register_tab_hits(bar, &mut hits);
            }
        }
        hits
    }

    /// Overall opacity of the active panel: the mount fade, times the intro exit.
    pub fn panel_opacity(&self) -> f32 {
        let t = (self.mounted_for.as_secs_f32() / PANEL_FADE.as_secs_f32()).min(1.0);
        let mut opacity = ease_out(t);
        if self.nav.is_exploring() {
            let exit = (self.exploring_for.as_secs_f32() / EXPLORE_DELAY.as_secs_f32()).min(1.0);
            opacity *= 1.0 - exit;
        }
        opacity
    }

    fn handle_msg(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        if self.phase == Phase::Stopped {
            return Cmd::none();
        }
        match msg {
            AppMsg::Resize { width, height } => {
                self.on_resize(width, height);
                Cmd::none()
            }
            AppMsg::LoadingDone => {
                self.mount_main_view();
                Cmd::none()
            }
            AppMsg::Frame => {
                self.on_frame();
                Cmd::none()
            }
            AppMsg::ExploreElapsed => {
                if self.nav.complete_exploring() {
                    self.on_panel_changed();
                }
                Cmd::none()
            }
            AppMsg::RevealSettle(generation) => {
                let tops = self.reveal_tops();
                let height = self.panel_area().height;
                self.reveal.settle(generation, &tops, height);
                Cmd::none()
            }
            AppMsg::ToastExpired(serial) => {
                if self.toast.as_ref().is_some_and(|t| t.serial == serial) {
                    self.toast = None;
                }
                Cmd::none()
            }
            AppMsg::Event { event, at } => self.on_event(&event, at.unwrap_or(self.clock)),
            AppMsg::Intent(intent) => self.apply(intent),
            AppMsg::Quit => self.teardown(),
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        match &mut self.particles {
            Some(field) => field.resize(width, height),
            None if self.phase == Phase::Running => {
                self.particles = ParticleField::mount(width, height, self.config.seed);
            }
            None => {}
        }
        self.clamp_scroll();
        if !self.reveal.awaiting_settle() {
            self.rescan();
        }
    }

    fn mount_main_view(&mut self) {
        if self.phase != Phase::Loading {
            return;
        }
        self.phase = Phase::Running;
        self.router.attach();
        let (width, height) = self.viewport;
        self.particles = ParticleField::mount(width, height, self.config.seed);
        self.on_panel_changed();
        info!(
            target: "folio.app",
            width,
            height,
            particles = self.particles.as_ref().map_or(0, ParticleField::len),
            "main view mounted"
        );
    }

    fn on_frame(&mut self) {
        self.clock += FRAME_INTERVAL;
        if self.phase == Phase::Loading {
            self.loading_for += FRAME_INTERVAL;
            return;
        }
        if let Some(field) = &mut self.particles {
            field.tick();
        }
        self.reveal.advance(FRAME_INTERVAL);
        self.pulse.tick(FRAME_INTERVAL);
        self.mounted_for += FRAME_INTERVAL;
        if self.nav.is_exploring() {
            self.exploring_for += FRAME_INTERVAL;
        }
        if let Some(toast) = &mut self.toast {
            toast.shown_for += FRAME_INTERVAL;
        }
    }

    fn on_event(&mut self, event: &Event, at: Duration) -> Cmd<AppMsg> {
        if self.phase == Phase::Loading {
            // Only an interrupt gets through before the router attaches.
            if let Event::Key(key) = event
                && key.ctrl()
                && key.code == KeyCode::Char('c')
            {
                return self.teardown();
            }
            return Cmd::none();
        }
        let hit = match event {
            Event::Mouse(mouse) => {
                let (x, y) = mouse.position();
                self.hit_map().target_at(x, y)
            }
            _ => None,
        };
        let ctx = RouteContext {
            panel: self.nav.active(),
            overlay_open: self.view_context().overlay_open(),
            viewport: self.viewport,
            now: at,
            hit,
        };
        let intents = self.router.route(event, &ctx);
        let mut cmds = Vec::new();
        for intent in intents {
            cmds.push(self.apply(intent));
            if self.phase == Phase::Stopped {
                break;
            }
        }
        Cmd::batch(cmds)
    }

    /// Apply one routed intent.
    pub fn apply(&mut self, intent: Intent) -> Cmd<AppMsg> {
        if self.phase != Phase::Running {
            return Cmd::none();
        }
        match intent {
            Intent::Quit => return self.teardown(),
            Intent::EnterPortfolio => {
                if self.nav.enter_exploring() {
                    self.exploring_for = Duration::ZERO;
                }
            }
            Intent::Arrow(direction) => {
                if self.nav.arrow(direction) {
                    self.on_panel_changed();
                }
            }
            Intent::Escape => {
                let before = self.nav.generation();
                self.nav.escape();
                if self.nav.generation() != before {
                    self.on_panel_changed();
                }
            }
            Intent::GoTo(panel) => {
                if self.nav.go_to(panel, None) {
                    self.on_panel_changed();
                }
            }
            Intent::ToggleTheme => return self.toggle_theme(),
            Intent::Scroll(delta) => self.scroll_by(delta),
            Intent::CycleCard(forward) => {
                let count = self.content.projects.len();
                if count > 0 && self.nav.active() == PanelId::Projects {
                    self.card_focus = if forward {
                        (self.card_focus + 1) % count
                    } else {
                        (self.card_focus + count - 1) % count
                    };
                    self.ensure_visible(Target::ProjectCard(self.card_focus));
                }
            }
            Intent::OpenFocusedCard => {
                self.nav.select_item(self.card_focus);
            }
            Intent::OpenProject(index) => {
                if self.nav.select_item(index) {
                    self.card_focus = index;
                }
            }
            Intent::CloseOverlay => {
                self.nav.clear_selection();
            }
            Intent::Hover(label) => self.nav.set_label(label),
            Intent::Pointer { x, y } => self.pointer = (x, y),
            Intent::Form(input) => return self.apply_form(input),
        }
        Cmd::none()
    }

    fn apply_form(&mut self, input: FormInput) -> Cmd<AppMsg> {
        if self.nav.active() != PanelId::Contact {
            return Cmd::none();
        }
        let outcome = self.form.apply(input);
        let focus = self.form.focus();
        self.ensure_visible(Target::FormInput(focus));
        match outcome {
            Some(SubmitOutcome::Sent(submission)) => {
                self.toast_serial += 1;
                self.toast = Some(Toast::new(self.toast_serial, SENT_MESSAGE));
                debug!(target: "folio.contact", toast = self.toast_serial, "message accepted");
                Cmd::log(format!(
                    "contact message accepted ({} chars)",
                    submission.message.chars().count()
                ))
            }
            Some(SubmitOutcome::Rejected(_)) => {
                if let Some(field) = Field::ALL.into_iter().find(|f| self.form.error(*f).is_some()) {
                    self.ensure_visible(Target::FormInput(FormFocus::from(field)));
                }
                Cmd::none()
            }
            None => Cmd::none(),
        }
    }

    fn toggle_theme(&mut self) -> Cmd<AppMsg> {
        let theme = self.nav.toggle_theme();
        match &self.preferences {
            Some(store) => {
                theme.store(store);
                Cmd::save_state()
            }
            None => Cmd::none(),
        }
    }

    /// Reset per-mount state and re-arm the observer for the new panel.
    fn on_panel_changed(&mut self) {
        self.scroll = 0;
        self.mounted_for = Duration::ZERO;
        self.card_focus = 0;
        let generation = self.nav.generation();
        match self.document() {
            Some(doc) if doc.reveal_count > 0 => self.reveal.arm(generation, doc.reveal_count),
            _ => self.reveal.disarm(),
        }
        debug!(
            target: "folio.app",
            panel = self.nav.active().key(),
            generation,
            reveal_nodes = self.reveal.node_count(),
            "panel mounted"
        );
    }

    fn teardown(&mut self) -> Cmd<AppMsg> {
        self.router.detach();
        self.reveal.disarm();
        self.particles = None;
        self.toast = None;
        self.phase = Phase::Stopped;
        info!(target: "folio.app", trail = self.nav.trail().count(), "view torn down");
        Cmd::quit()
    }

    fn reveal_tops(&self) -> Vec<i32> {
        self.document()
            .map(|doc| doc.reveal_tops(self.scroll))
            .unwrap_or_default()
    }

    fn rescan(&mut self) {
        let tops = self.reveal_tops();
        let height = self.panel_area().height;
        self.reveal.scan(&tops, height);
    }

    fn clamp_scroll(&mut self) {
        let max = self
            .document()
            .map_or(0, |doc| doc.max_scroll(self.panel_area().height));
        self.scroll = self.scroll.min(max);
    }

    fn scroll_by(&mut self, delta: ScrollDelta) {
        let Some(doc) = self.document() else {
            return;
        };
        let view = self.panel_area().height;
        let max = i32::from(doc.max_scroll(view));
        let current = i32::from(self.scroll);
        let page = i32::from(view.saturating_sub(1).max(1));
        let next = match delta {
            ScrollDelta::Lines(n) => current + n,
            ScrollDelta::Pages(n) => current + n * page,
            ScrollDelta::Top => 0,
            ScrollDelta::Bottom => max,
        };
        self.scroll = next.clamp(0, max) as u16;
        self.rescan();
    }

    /// Scroll just enough to bring `target`'s block into view.
    fn ensure_visible(&mut self, target: Target) {
        let Some(doc) = self.document() else {
            return;
        };
        let Some(block) = doc.block_for(target) else {
            return;
        };
        let view = self.panel_area().height;
        let rect = block.rect;
        if rect.y < self.scroll {
            self.scroll = rect.y;
        } else if rect.bottom() > self.scroll.saturating_add(view) {
            self.scroll = rect.bottom().saturating_sub(view).min(rect.y);
        }
        self.scroll = self.scroll.min(doc.max_scroll(view));
        self.rescan();
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn event_message(event: Event, at: Duration) -> AppMsg {
        match AppMsg::from(event) {
            AppMsg::Event { event, .. } => AppMsg::Event { event, at: Some(at) },
            other => other,
        }
    }

    fn init(&mut self) -> Cmd<Self::Message> {
        if let Some(store) = &self.preferences {
            let theme = Theme::load(store);
            self.nav = SectionMachine::new(self.content.projects.len()).with_theme(theme);
        }
        info!(
            target: "folio.app",
            theme = self.nav.theme().as_str(),
            layout = self.config.layout.as_str(),
            projects = self.content.projects.len(),
            "starting"
        );
        Cmd::none()
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        self.handle_msg(msg)
    }

    fn view(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.nav.theme().palette();
        frame.buffer.fill(area, Cell::from_char(' ').with_bg(palette.bg));
        match self.phase {
            Phase::Loading => {
                loading::render(self.loading_for, &mut frame.buffer, area);
                return;
            }
            Phase::Stopped => return,
            Phase::Running => {}
        }

        if let Some(field) = &self.particles {
            field.render(&mut frame.buffer, area);
        }

        let (panel, bar) = self.chrome(area);
        let ctx = self.view_context();
        frame.buffer.push_opacity(self.panel_opacity());
        screens::render(&ctx, frame, panel);
        frame.buffer.pop_opacity();

        if let Some(bar) = bar {
            chrome::render_tab_bar(self.nav.active(), palette, &mut frame.buffer, bar);
        }
        if let Some(toast) = &self.toast {
            chrome::render_toast(toast, palette, &mut frame.buffer, panel);
        }
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        let mut subs: Vec<Box<dyn Subscription<AppMsg>>> = Vec::new();
        if self.phase == Phase::Stopped {
            return subs;
        }
        subs.push(Box::new(Every::with_id(FRAME_SUB, FRAME_INTERVAL, || AppMsg::Frame)));
        if self.phase == Phase::Loading {
            subs.push(Box::new(After::with_id(LOADING_SUB, loading::LOADING_DURATION, || {
                AppMsg::LoadingDone
            })));
        }
        if self.nav.is_exploring() {
            subs.push(Box::new(After::with_id(
                EXPLORE_SUB_BASE + self.nav.generation(),
                EXPLORE_DELAY,
                || AppMsg::ExploreElapsed,
            )));
        }
        if self.reveal.awaiting_settle()
            && let Some(generation) = self.reveal.generation()
        {
            subs.push(Box::new(After::with_id(
                SETTLE_SUB_BASE + generation,
                SETTLE_DELAY,
                move || AppMsg::RevealSettle(generation),
            )));
        }
        if let Some(toast) = &self.toast {
            let serial = toast.serial;
            subs.push(Box::new(After::with_id(TOAST_SUB_BASE + serial, TOAST_DURATION, move || {
                AppMsg::ToastExpired(serial)
            })));
        }
        if let Some(delay) = self.config.exit_after {
            subs.push(Box::new(After::with_id(EXIT_SUB, delay, || AppMsg::Quit)));
        }
        subs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Direction;

    fn running(width: u16, height: u16) -> AppModel {
        let mut app = AppModel::new(AppConfig::default(), Content::builtin());
        app.update(AppMsg::Resize { width, height });
        app.update(AppMsg::LoadingDone);
        app
    }

    fn ids(app: &AppModel) -> Vec<SubId> {
        app.subscriptions().iter().map(|s| s.id()).collect()
    }

    #[test]
    fn starts_loading_with_router_detached() {
        let app = AppModel::new(AppConfig::default(), Content::builtin());
        assert_eq!(app.phase, Phase::Loading);
        assert!(!app.router.is_attached());
        assert!(app.particles.is_none());
        assert_eq!(ids(&app), vec![FRAME_SUB, LOADING_SUB]);
    }

    #[test]
    fn loading_done_mounts_everything() {
        let app = running(100, 40);
        assert_eq!(app.phase, Phase::Running);
        assert!(app.router.is_attached());
        assert_eq!(app.particles.as_ref().map(ParticleField::len), Some(50));
        assert_eq!(app.nav.active(), PanelId::Intro);
        assert!(!ids(&app).contains(&LOADING_SUB));
    }

    #[test]
    fn particles_wait_for_a_surface() {
        let mut app = AppModel::new(AppConfig::default(), Content::builtin());
        app.update(AppMsg::LoadingDone);
        assert!(app.particles.is_none());
        app.update(AppMsg::Resize { width: 80, height: 24 });
        assert!(app.particles.is_some());
    }

    #[test]
    fn explore_timer_is_keyed_by_mount() {
        let mut app = running(100, 40);
        app.apply(Intent::EnterPortfolio);
        let explore = EXPLORE_SUB_BASE + app.nav.generation();
        assert!(ids(&app).contains(&explore));
        app.apply(Intent::GoTo(PanelId::About));
        assert!(!ids(&app).contains(&explore));
        app.update(AppMsg::ExploreElapsed);
        assert_eq!(app.nav.active(), PanelId::About);
    }

    #[test]
    fn panel_change_rearms_reveal() {
        let mut app = running(100, 40);
        app.apply(Intent::GoTo(PanelId::Testimonials));
        let generation = app.nav.generation();
        assert_eq!(app.reveal.generation(), Some(generation));
        assert!(ids(&app).contains(&(SETTLE_SUB_BASE + generation)));
        app.update(AppMsg::RevealSettle(generation));
        assert!(app.reveal.revealed_count() > 0);
        assert!(!ids(&app).contains(&(SETTLE_SUB_BASE + generation)));

        app.apply(Intent::GoTo(PanelId::Map));
        assert!(!app.reveal.is_armed());
    }

    #[test]
    fn stale_settle_does_nothing() {
        let mut app = running(100, 40);
        app.apply(Intent::GoTo(PanelId::Testimonials));
        let old = app.nav.generation();
        app.apply(Intent::GoTo(PanelId::Projects));
        app.update(AppMsg::RevealSettle(old));
        assert_eq!(app.reveal.revealed_count(), 0);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut app = running(100, 12);
        app.apply(Intent::GoTo(PanelId::About));
        app.apply(Intent::Scroll(ScrollDelta::Lines(-5)));
        assert_eq!(app.scroll, 0);
        app.apply(Intent::Scroll(ScrollDelta::Bottom));
        let max = app.document().map_or(0, |d| d.max_scroll(app.panel_area().height));
        assert!(max > 0);
        assert_eq!(app.scroll, max);
        app.apply(Intent::Scroll(ScrollDelta::Lines(100)));
        assert_eq!(app.scroll, max);
    }

    #[test]
    fn arrows_only_move_from_map() {
        let mut app = running(100, 40);
        app.apply(Intent::Arrow(Direction::Up));
        assert_eq!(app.nav.active(), PanelId::Intro);
        app.apply(Intent::GoTo(PanelId::Map));
        app.apply(Intent::Arrow(Direction::Left));
        assert_eq!(app.nav.active(), PanelId::Contact);
    }

    #[test]
    fn card_focus_wraps() {
        let mut app = running(100, 40);
        app.apply(Intent::GoTo(PanelId::Projects));
        let count = app.content.projects.len();
        app.apply(Intent::CycleCard(false));
        assert_eq!(app.card_focus, count - 1);
        app.apply(Intent::CycleCard(true));
        assert_eq!(app.card_focus, 0);
        app.apply(Intent::OpenFocusedCard);
        assert_eq!(app.nav.selected(), Some(0));
    }

    #[test]
    fn quit_tears_down() {
        let mut app = running(100, 40);
        app.apply(Intent::GoTo(PanelId::About));
        let cmd = app.apply(Intent::Quit);
        assert!(matches!(cmd, Cmd::Quit));
        assert_eq!(app.phase, Phase::Stopped);
        assert!(!app.router.is_attached());
        assert!(app.particles.is_none());
        assert!(!app.reveal.is_armed());
        assert!(app.subscriptions().is_empty());
    }

    #[test]
    fn ctrl_c_quits_while_loading() {
        use folio_core::event::{KeyEvent, Modifiers};
        let mut app = AppModel::new(AppConfig::default(), Content::builtin());
        app.update(AppMsg::from(Event::key(KeyCode::Char('q'))));
        assert_eq!(app.phase, Phase::Loading);
        let key = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        app.update(AppMsg::from(Event::Key(key)));
        assert_eq!(app.phase, Phase::Stopped);
    }

    #[test]
    fn frame_advances_animations() {
        let mut app = running(100, 40);
        assert_eq!(app.panel_opacity(), 0.0);
        for _ in 0..10 {
            app.update(AppMsg::Frame);
        }
        assert_eq!(app.panel_opacity(), 1.0);
        assert_eq!(app.particles.as_ref().map(ParticleField::ticks), Some(10));
        assert_eq!(app.clock, FRAME_INTERVAL * 10);
    }

    #[test]
    fn intro_fades_while_exploring() {
        let mut app = running(100, 40);
        for _ in 0..10 {
            app.update(AppMsg::Frame);
        }
        app.apply(Intent::EnterPortfolio);
        for _ in 0..12 {
            app.update(AppMsg::Frame);
        }
        let opacity = app.panel_opacity();
        assert!(opacity > 0.0 && opacity < 1.0, "{opacity}");
    }

    #[test]
    fn compact_layout_reserves_tab_bar() {
        let mut app = AppModel::new(
            AppConfig {
                layout: LayoutMode::Compact,
                ..AppConfig::default()
            },
            Content::builtin(),
        );
        app.update(AppMsg::Resize { width: 60, height: 20 });
        app.update(AppMsg::LoadingDone);
        assert_eq!(app.panel_area().height, 19);
        assert_eq!(app.hit_map().target_at(0, 19), Some(Target::Tab(PanelId::Map)));
    }

    #[test]
    fn toast_expiry_matches_serial() {
        let mut app = running(100, 40);
        app.toast = Some(Toast::new(2, SENT_MESSAGE));
        app.update(AppMsg::ToastExpired(1));
        assert!(app.toast.is_some());
        app.update(AppMsg::ToastExpired(2));
        assert!(app.toast.is_none());
    }
}
