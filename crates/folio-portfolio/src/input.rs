#![forbid(unsafe_code)]

//! Input Router.
//!
//! Translates terminal events into [`Intent`]s for the application. The
//! router is attached once the main view mounts and detached on teardown;
//! while detached every event is dropped.
//!
//! Keys map per panel (arrows are always forwarded as [`Intent::Arrow`] and
//! the state machine ignores them off the hub). Clicks resolve through the
//! [`Target`] under the pointer, which the caller hit-tests beforehand.
//! Pointer motion feeds a parallax signal through a [`PointerThrottle`]:
//! one sample per window, leading edge, later samples in the window dropped.

use std::time::Duration;

use folio_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::contact::{FormFocus, FormInput};
use crate::layout::Target;
use crate::nav::Direction;
use crate::panel::PanelId;

/// Minimum spacing between accepted pointer samples.
pub const POINTER_THROTTLE: Duration = Duration::from_millis(50);

/// Rows scrolled per wheel notch.
pub const WHEEL_LINES: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDelta {
    Lines(i32),
    Pages(i32),
    Top,
    Bottom,
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Quit,
    /// The intro's "Enter Portfolio" action.
    EnterPortfolio,
    Arrow(Direction),
    Escape,
    GoTo(PanelId),
    ToggleTheme,
    Scroll(ScrollDelta),
    /// Move project card focus forward (`true`) or back.
    CycleCard(bool),
    OpenFocusedCard,
    OpenProject(usize),
    CloseOverlay,
    /// Auxiliary label for whatever is under the pointer; empty when nothing.
    Hover(&'static str),
    /// Normalised pointer position, each axis in `[0, 1]`.
    Pointer { x: f32, y: f32 },
    Form(FormInput),
}

/// Routing inputs the router cannot know on its own.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext {
    pub panel: PanelId,
    pub overlay_open: bool,
    pub viewport: (u16, u16),
    /// Arrival time of the event being routed.
    pub now: Duration,
    /// Target under the mouse, for mouse events.
    pub hit: Option<Target>,
}

/// Leading-edge rate limiter: last accepted sample wins, excess is dropped.
#[derive(Debug, Clone)]
pub struct PointerThrottle {
    interval: Duration,
    last: Option<Duration>,
}

impl PointerThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a sample at `now` passes. Accepting it starts a new window.
    pub fn sample(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for PointerThrottle {
    fn default() -> Self {
        Self::new(POINTER_THROTTLE)
    }
}

/// Cell position as a fraction of the viewport.
pub fn normalise(x: u16, y: u16, viewport: (u16, u16)) -> (f32, f32) {
    let fx = if viewport.0 > 1 {
        f32::from(x) / f32::from(viewport.0 - 1)
    } else {
        0.5
    };
    let fy = if viewport.1 > 1 {
        f32::from(y) / f32::from(viewport.1 - 1)
    } else {
        0.5
    };
    (fx.clamp(0.0, 1.0), fy.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    attached: bool,
    throttle: PointerThrottle,
    dropped_samples: u64,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        if !self.attached {
            self.attached = true;
            tracing::debug!(target: "folio.input", "router attached");
        }
    }

    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.throttle.reset();
            tracing::debug!(
                target: "folio.input",
                dropped_samples = self.dropped_samples,
                "router detached"
            );
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Pointer samples dropped by the throttle so far.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples
    }

    pub fn route(&mut self, event: &Event, ctx: &RouteContext) -> Vec<Intent> {
        if !self.attached {
            return Vec::new();
        }
        match event {
            Event::Key(key) if !key.is_release() => route_key(key, ctx),
            Event::Mouse(mouse) => self.route_mouse(mouse, ctx),
            Event::Paste(text) if ctx.panel == PanelId::Contact && !ctx.overlay_open => text
                .chars()
                .filter(|c| *c != '\r')
                .map(|c| Intent::Form(FormInput::Insert(c)))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn route_mouse(&mut self, mouse: &MouseEvent, ctx: &RouteContext) -> Vec<Intent> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => click(ctx.hit),
            MouseEventKind::ScrollUp => vec![Intent::Scroll(ScrollDelta::Lines(-WHEEL_LINES))],
            MouseEventKind::ScrollDown => vec![Intent::Scroll(ScrollDelta::Lines(WHEEL_LINES))],
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let label = ctx.hit.and_then(Target::hover_label).unwrap_or("");
                let mut intents = vec![Intent::Hover(label)];
                if self.throttle.sample(ctx.now) {
                    let (x, y) = normalise(mouse.x, mouse.y, ctx.viewport);
                    intents.push(Intent::Pointer { x, y });
                } else {
                    self.dropped_samples += 1;
                }
                intents
            }
            _ => Vec::new(),
        }
    }
}

fn click(hit: Option<Target>) -> Vec<Intent> {
    let Some(target) = hit else {
        return Vec::new();
    };
    match target {
        Target::EnterButton => vec![Intent::EnterPortfolio],
        Target::HubNode(panel) | Target::Tab(panel) => vec![Intent::GoTo(panel)],
        Target::ThemeToggle => vec![Intent::ToggleTheme],
        Target::BackToMap => vec![Intent::GoTo(PanelId::Map)],
        Target::ProjectCard(index) => vec![Intent::OpenProject(index)],
        Target::ModalClose | Target::Backdrop => vec![Intent::CloseOverlay],
        Target::ModalBody => Vec::new(),
        Target::FormInput(FormFocus::Send) => vec![
            Intent::Form(FormInput::Focus(FormFocus::Send)),
            Intent::Form(FormInput::Submit),
        ],
        Target::FormInput(focus) => vec![Intent::Form(FormInput::Focus(focus))],
    }
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        _ => None,
    }
}

fn scroll(code: KeyCode) -> Option<ScrollDelta> {
    match code {
        KeyCode::PageDown => Some(ScrollDelta::Pages(1)),
        KeyCode::PageUp => Some(ScrollDelta::Pages(-1)),
        KeyCode::Home => Some(ScrollDelta::Top),
        KeyCode::End => Some(ScrollDelta::Bottom),
        _ => None,
    }
}

fn route_key(key: &KeyEvent, ctx: &RouteContext) -> Vec<Intent> {
    if key.ctrl() && key.is_char('c') {
        return vec![Intent::Quit];
    }
    if key.code == KeyCode::Escape {
        return vec![Intent::Escape];
    }
    if let Some(direction) = arrow(key.code) {
        return vec![Intent::Arrow(direction)];
    }
    if ctx.overlay_open {
        return match key.code {
            KeyCode::Char('q') => vec![Intent::Quit],
            _ => Vec::new(),
        };
    }
    if let Some(delta) = scroll(key.code) {
        return vec![Intent::Scroll(delta)];
    }
    if ctx.panel == PanelId::Contact {
        return route_form_key(key);
    }

    let intent = match key.code {
        KeyCode::Char('q') => Intent::Quit,
        KeyCode::Char('t') => Intent::ToggleTheme,
        KeyCode::Enter | KeyCode::Char(' ') if ctx.panel == PanelId::Intro => Intent::EnterPortfolio,
        KeyCode::Char('b') if ctx.panel.is_content() => Intent::GoTo(PanelId::Map),
        KeyCode::Char('j') if ctx.panel.is_content() => Intent::Scroll(ScrollDelta::Lines(1)),
        KeyCode::Char('k') if ctx.panel.is_content() => Intent::Scroll(ScrollDelta::Lines(-1)),
        KeyCode::Tab if ctx.panel == PanelId::Projects => Intent::CycleCard(true),
        KeyCode::BackTab if ctx.panel == PanelId::Projects => Intent::CycleCard(false),
        KeyCode::Enter if ctx.panel == PanelId::Projects => Intent::OpenFocusedCard,
        KeyCode::Char(c @ '1'..='9') if ctx.panel == PanelId::Projects => {
            Intent::OpenProject(c as usize - '1' as usize)
        }
        _ => return Vec::new(),
    };
    vec![intent]
}

fn route_form_key(key: &KeyEvent) -> Vec<Intent> {
    let input = match key.code {
        KeyCode::Char(c) if !key.ctrl() && !key.alt() => FormInput::Insert(c),
        KeyCode::Backspace => FormInput::Backspace,
        KeyCode::Tab => FormInput::NextField,
        KeyCode::BackTab => FormInput::PrevField,
        KeyCode::Enter => FormInput::Confirm,
        _ => return Vec::new(),
    };
    vec![Intent::Form(input)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::event::{KeyEventKind, Modifiers};
    use proptest::prelude::*;

    fn ctx(panel: PanelId) -> RouteContext {
        RouteContext {
            panel,
            overlay_open: false,
            viewport: (101, 41),
            now: Duration::ZERO,
            hit: None,
        }
    }

    fn attached() -> InputRouter {
        let mut router = InputRouter::new();
        router.attach();
        router
    }

    fn key(code: KeyCode) -> Event {
        Event::key(code)
    }

    fn moved(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent::new(MouseEventKind::Moved, x, y))
    }

    #[test]
    fn detached_router_drops_everything() {
        let mut router = InputRouter::new();
        assert!(router.route(&key(KeyCode::Char('q')), &ctx(PanelId::Map)).is_empty());
        router.attach();
        router.detach();
        assert!(router.route(&key(KeyCode::Escape), &ctx(PanelId::Map)).is_empty());
    }

    #[test]
    fn arrows_are_forwarded_everywhere() {
        let mut router = attached();
        for panel in PanelId::ALL {
            assert_eq!(
                router.route(&key(KeyCode::Left), &ctx(panel)),
                vec![Intent::Arrow(Direction::Left)]
            );
        }
    }

    #[test]
    fn release_events_are_ignored() {
        let mut router = attached();
        let release = Event::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
        assert!(router.route(&release, &ctx(PanelId::About)).is_empty());
    }

    #[test]
    fn intro_enter_explores() {
        let mut router = attached();
        assert_eq!(router.route(&key(KeyCode::Enter), &ctx(PanelId::Intro)), vec![Intent::EnterPortfolio]);
        assert_eq!(router.route(&key(KeyCode::Char(' ')), &ctx(PanelId::Intro)), vec![Intent::EnterPortfolio]);
        assert!(router.route(&key(KeyCode::Enter), &ctx(PanelId::Map)).is_empty());
    }

    #[test]
    fn ctrl_c_quits_even_in_the_form() {
        let mut router = attached();
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL));
        assert_eq!(router.route(&ctrl_c, &ctx(PanelId::Contact)), vec![Intent::Quit]);
    }

    #[test]
    fn form_captures_letters() {
        let mut router = attached();
        for c in ['q', 't', 'b'] {
            assert_eq!(
                router.route(&key(KeyCode::Char(c)), &ctx(PanelId::Contact)),
                vec![Intent::Form(FormInput::Insert(c))]
            );
        }
        assert_eq!(router.route(&key(KeyCode::Char('q')), &ctx(PanelId::About)), vec![Intent::Quit]);
        assert_eq!(
            router.route(&key(KeyCode::Char('b')), &ctx(PanelId::About)),
            vec![Intent::GoTo(PanelId::Map)]
        );
    }

    #[test]
    fn paste_types_into_form() {
        let mut router = attached();
        let intents = router.route(&Event::Paste("hi\r\n".into()), &ctx(PanelId::Contact));
        assert_eq!(intents.len(), 3);
        assert!(router.route(&Event::Paste("x".into()), &ctx(PanelId::About)).is_empty());
    }

    #[test]
    fn project_shortcuts() {
        let mut router = attached();
        assert_eq!(
            router.route(&key(KeyCode::Char('2')), &ctx(PanelId::Projects)),
            vec![Intent::OpenProject(1)]
        );
        assert_eq!(router.route(&key(KeyCode::Tab), &ctx(PanelId::Projects)), vec![Intent::CycleCard(true)]);
        assert!(router.route(&key(KeyCode::Char('2')), &ctx(PanelId::Skills)).is_empty());
    }

    #[test]
    fn overlay_only_listens_for_escape_and_quit() {
        let mut router = attached();
        let mut c = ctx(PanelId::Projects);
        c.overlay_open = true;
        assert!(router.route(&key(KeyCode::Char('2')), &c).is_empty());
        assert_eq!(router.route(&key(KeyCode::Escape), &c), vec![Intent::Escape]);
    }

    #[test]
    fn clicks_resolve_targets() {
        let mut router = attached();
        let down = Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 3, 3));
        let mut c = ctx(PanelId::Map);
        c.hit = Some(Target::HubNode(PanelId::Skills));
        assert_eq!(router.route(&down, &c), vec![Intent::GoTo(PanelId::Skills)]);
        c.hit = Some(Target::Backdrop);
        assert_eq!(router.route(&down, &c), vec![Intent::CloseOverlay]);
        c.hit = Some(Target::ModalBody);
        assert!(router.route(&down, &c).is_empty());
        c.hit = None;
        assert!(router.route(&down, &c).is_empty());
    }

    #[test]
    fn motion_is_throttled() {
        let mut router = attached();
        let mut c = ctx(PanelId::Map);
        let first = router.route(&moved(50, 20), &c);
        assert_eq!(first, vec![Intent::Hover(""), Intent::Pointer { x: 0.5, y: 0.5 }]);

        c.now = Duration::from_millis(30);
        c.hit = Some(Target::EnterButton);
        assert_eq!(router.route(&moved(0, 0), &c), vec![Intent::Hover("Explore")]);
        assert_eq!(router.dropped_samples(), 1);

        c.now = Duration::from_millis(50);
        let third = router.route(&moved(0, 0), &c);
        assert_eq!(third.last(), Some(&Intent::Pointer { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn throttle_leading_edge() {
        let mut throttle = PointerThrottle::default();
        assert!(throttle.sample(Duration::from_millis(10)));
        assert!(!throttle.sample(Duration::from_millis(59)));
        assert!(throttle.sample(Duration::from_millis(60)));
        throttle.reset();
        assert!(throttle.sample(Duration::from_millis(61)));
    }

    proptest! {
        #[test]
        fn accepted_samples_are_spaced(mut times in proptest::collection::vec(0u64..5_000, 1..200)) {
            times.sort_unstable();
            let mut throttle = PointerThrottle::default();
            let accepted: Vec<u64> = times
                .iter()
                .copied()
                .filter(|t| throttle.sample(Duration::from_millis(*t)))
                .collect();
            prop_assert_eq!(accepted.first(), times.first());
            for pair in accepted.windows(2) {
                prop_assert!(pair[1] - pair[0] >= 50);
            }
        }

        #[test]
        fn normalised_pointer_in_unit_square(x in any::<u16>(), y in any::<u16>(), w in 0u16..500, h in 0u16..500) {
            let (fx, fy) = normalise(x, y, (w, h));
            prop_assert!((0.0..=1.0).contains(&fx));
            prop_assert!((0.0..=1.0).contains(&fy));
        }
    }
}
