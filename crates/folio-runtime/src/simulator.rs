#![forbid(unsafe_code)]

//! Deterministic program simulator.
//!
//! `ProgramSimulator` runs a [`Model`] with no terminal and no threads.
//! Subscriptions are scheduled against a virtual clock that only moves when
//! [`advance`](ProgramSimulator::advance) is called, so timing-dependent
//! behaviour (delays, cancellation, frame ticks) is reproducible.
//!
//! Within one `advance`, due timers fire in deadline order; timers due at the
//! same instant fire in the order the model declared them. Subscriptions are
//! reconciled after every delivered message, exactly as in the live loop, so
//! a timer undeclared by an earlier message never fires.
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(model);
//! sim.init();
//! sim.inject_event(Event::key(KeyCode::Enter));
//! sim.advance(Duration::from_millis(800));
//! let frame = sim.capture_frame(100, 30);
//! ```

use std::sync::Arc;
use std::time::Duration;

use folio_core::event::Event;
use folio_render::buffer::Buffer;
use folio_render::frame::Frame;

use crate::program::{Cmd, Model};
use crate::state_persistence::PreferenceStore;
use crate::subscription::{Schedule, SubId, Subscription};

/// A command the simulator executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    Quit,
    Msg,
    Batch(usize),
    Sequence(usize),
    Log(String),
    /// Background task, run synchronously.
    Task,
    SaveState,
    MouseCapture(bool),
}

struct Timer<M: Send + 'static> {
    id: SubId,
    schedule: Schedule,
    due: Duration,
    order: usize,
    spent: bool,
    sub: Box<dyn Subscription<M>>,
}

pub struct ProgramSimulator<M: Model> {
    model: M,
    now: Duration,
    timers: Vec<Timer<M::Message>>,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    logs: Vec<String>,
    running: bool,
    preferences: Option<Arc<PreferenceStore>>,
}

impl<M: Model> ProgramSimulator<M> {
    /// The model is not initialised until [`init`](Self::init).
    pub fn new(model: M) -> Self {
        Self {
            model,
            now: Duration::ZERO,
            timers: Vec::new(),
            frames: Vec::new(),
            command_log: Vec::new(),
            logs: Vec::new(),
            running: true,
            preferences: None,
        }
    }

    /// `Cmd::SaveState` flushes through `store`, and `init` loads from it.
    pub fn with_preferences(model: M, store: Arc<PreferenceStore>) -> Self {
        let mut sim = Self::new(model);
        sim.preferences = Some(store);
        sim
    }

    pub fn init(&mut self) {
        if let Some(store) = &self.preferences
            && let Err(e) = store.load()
        {
            tracing::warn!(target: "folio.runtime", error = %e, "failed to load preferences");
        }
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.reconcile();
    }

    /// Convert each event into a message stamped with the current virtual
    /// time and deliver it.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            self.deliver(M::event_message(event.clone(), self.now));
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(std::slice::from_ref(&event));
    }

    /// Deliver a message directly. Ignored once the program stopped.
    pub fn send(&mut self, msg: M::Message) {
        if self.running {
            self.deliver(msg);
        }
    }

    /// Move virtual time forward by `dt`, firing every timer that comes due.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.now.saturating_add(dt);
        while self.running {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.spent && t.due <= target)
                .min_by_key(|(_, t)| (t.due, t.order))
                .map(|(i, _)| i);
            let Some(index) = next else {
                break;
            };

            let timer = &mut self.timers[index];
            self.now = self.now.max(timer.due);
            let msg = timer.sub.fire();
            match timer.schedule {
                Schedule::Once(_) => timer.spent = true,
                Schedule::Every(interval) => {
                    timer.due = timer.due.saturating_add(interval.max(Duration::from_nanos(1)));
                }
            }
            tracing::trace!(target: "folio.runtime", sub_id = timer.id, at = ?self.now, "timer fired");
            self.deliver(msg);
        }
        self.now = self.now.max(target);
    }

    /// Virtual time since the simulator was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Ids of declared timers that can still fire, in declaration order.
    pub fn active_subscriptions(&self) -> Vec<SubId> {
        let mut live: Vec<&Timer<M::Message>> = self.timers.iter().filter(|t| !t.spent).collect();
        live.sort_by_key(|t| t.order);
        live.into_iter().map(|t| t.id).collect()
    }

    /// Virtual instant at which `id` will next fire, if it is pending.
    pub fn next_due(&self, id: SubId) -> Option<Duration> {
        self.timers
            .iter()
            .find(|t| t.id == id && !t.spent)
            .map(|t| t.due)
    }

    /// Stop the program: no timer fires and no message is delivered afterwards.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.timers.clear();
        self.save_state();
        tracing::debug!(target: "folio.runtime", at = ?self.now, "simulator shut down");
    }

    /// Render the model into a fresh `width` x `height` frame and keep a copy.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame.buffer);
        let last = self.frames.len() - 1;
        &self.frames[last]
    }

    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Lines emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn deliver(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
        self.reconcile();
    }

    fn reconcile(&mut self) {
        if !self.running {
            self.timers.clear();
            return;
        }
        let declared = self.model.subscriptions();
        let mut previous = std::mem::take(&mut self.timers);
        for (order, sub) in declared.into_iter().enumerate() {
            let id = sub.id();
            if self.timers.iter().any(|t| t.id == id) {
                continue;
            }
            if let Some(pos) = previous.iter().position(|t| t.id == id) {
                let mut kept = previous.swap_remove(pos);
                kept.order = order;
                self.timers.push(kept);
            } else {
                let schedule = sub.schedule();
                self.timers.push(Timer {
                    id,
                    schedule,
                    due: self.now.saturating_add(schedule.interval()),
                    order,
                    spent: false,
                    sub,
                });
            }
        }
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(line) => {
                self.command_log.push(CmdRecord::Log(line.clone()));
                self.logs.push(line);
            }
            Cmd::Task(f) => {
                self.command_log.push(CmdRecord::Task);
                let msg = f();
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
            Cmd::SaveState => {
                self.command_log.push(CmdRecord::SaveState);
                self.save_state();
            }
            Cmd::SetMouseCapture(enabled) => {
                self.command_log.push(CmdRecord::MouseCapture(enabled));
            }
        }
    }

    fn save_state(&self) {
        if let Some(store) = &self.preferences
            && let Err(e) = store.flush()
        {
            tracing::warn!(target: "folio.runtime", error = %e, "failed to save preferences");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{After, Every};
    use folio_core::event::KeyCode;
    use folio_render::drawing::Draw;
    use folio_render::cell::Cell;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Key(char),
        Arm(u64),
        Disarm,
        Fired(&'static str),
        Tick,
        Stop,
        Work,
        Worked(u32),
        Other,
    }

    impl From<Event> for Msg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) => match k.code {
                    KeyCode::Char(c) => Msg::Key(c),
                    _ => Msg::Other,
                },
                _ => Msg::Other,
            }
        }
    }

    #[derive(Default)]
    struct Timers {
        armed: Option<u64>,
        ticking: bool,
        fired: Vec<&'static str>,
        ticks: u32,
        keys: String,
        worked: Option<u32>,
    }

    impl Model for Timers {
        type Message = Msg;

        fn update(&mut self, msg: Msg) -> Cmd<Msg> {
            match msg {
                Msg::Key(c) => self.keys.push(c),
                Msg::Arm(generation) => self.armed = Some(generation),
                Msg::Disarm => self.armed = None,
                Msg::Fired(name) => {
                    self.fired.push(name);
                    if name == "long" {
                        self.armed = None;
                    }
                }
                Msg::Tick => self.ticks += 1,
                Msg::Stop => return Cmd::quit(),
                Msg::Work => return Cmd::task(|| Msg::Worked(42)),
                Msg::Worked(n) => {
                    self.worked = Some(n);
                    return Cmd::log("worked");
                }
                Msg::Other => {}
            }
            Cmd::none()
        }

        fn view(&self, frame: &mut Frame) {
            frame.buffer.print_text(0, 0, &self.keys, Cell::default());
        }

        fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
            let mut subs: Vec<Box<dyn Subscription<Msg>>> = Vec::new();
            if let Some(generation) = self.armed {
                subs.push(Box::new(After::with_id(100 + generation, Duration::from_millis(100), || {
                    Msg::Fired("short")
                })));
                subs.push(Box::new(After::with_id(200 + generation, Duration::from_millis(100), || {
                    Msg::Fired("tie")
                })));
                subs.push(Box::new(After::with_id(300, Duration::from_millis(500), || Msg::Fired("long"))));
            }
            if self.ticking {
                subs.push(Box::new(Every::new(Duration::from_millis(33), || Msg::Tick)));
            }
            subs
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Records the arrival stamp of every message; `None` for direct sends.
    #[derive(Debug)]
    struct Arrival(Option<Duration>);

    impl From<Event> for Arrival {
        fn from(_: Event) -> Self {
            Arrival(None)
        }
    }

    #[derive(Default)]
    struct Arrivals {
        seen: Vec<Option<Duration>>,
    }

    impl Model for Arrivals {
        type Message = Arrival;

        fn event_message(_: Event, at: Duration) -> Arrival {
            Arrival(Some(at))
        }

        fn update(&mut self, msg: Arrival) -> Cmd<Arrival> {
            self.seen.push(msg.0);
            Cmd::none()
        }

        fn view(&self, _frame: &mut Frame) {}
    }

    #[test]
    fn injected_events_are_stamped_with_virtual_time() {
        let mut sim = ProgramSimulator::new(Arrivals::default());
        sim.init();
        sim.inject_event(Event::key(KeyCode::Char('a')));
        sim.advance(ms(35));
        sim.inject_event(Event::key(KeyCode::Char('b')));
        sim.send(Arrival(None));
        assert_eq!(sim.model().seen, vec![Some(ms(0)), Some(ms(35)), None]);
    }

    #[test]
    fn one_shots_fire_once_in_declaration_order() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.send(Msg::Arm(1));
        sim.advance(ms(99));
        assert!(sim.model().fired.is_empty());
        sim.advance(ms(1));
        assert_eq!(sim.model().fired, vec!["short", "tie"]);
        sim.advance(ms(300));
        assert_eq!(sim.model().fired, vec!["short", "tie"]);
        assert_eq!(sim.now(), ms(400));
    }

    #[test]
    fn undeclared_timer_never_fires() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.send(Msg::Arm(1));
        sim.advance(ms(50));
        sim.send(Msg::Disarm);
        assert!(sim.active_subscriptions().is_empty());
        sim.advance(ms(1000));
        assert!(sim.model().fired.is_empty());
    }

    #[test]
    fn redeclared_generation_restarts_delay() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.send(Msg::Arm(1));
        sim.advance(ms(60));
        sim.send(Msg::Arm(2));
        assert_eq!(sim.next_due(102), Some(ms(160)));
        assert_eq!(sim.next_due(300), Some(ms(500)));
        sim.advance(ms(40));
        assert!(sim.model().fired.is_empty());
        sim.advance(ms(60));
        assert_eq!(sim.model().fired, vec!["short", "tie"]);
    }

    #[test]
    fn message_from_timer_can_cancel_later_timers() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.send(Msg::Arm(1));
        sim.advance(ms(2000));
        assert_eq!(sim.model().fired, vec!["short", "tie", "long"]);
        assert!(sim.active_subscriptions().is_empty());
    }

    #[test]
    fn repeating_timer_fires_per_interval() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.model_mut().ticking = true;
        sim.init();
        sim.advance(ms(100));
        assert_eq!(sim.model().ticks, 3);
        sim.advance(ms(32));
        assert_eq!(sim.model().ticks, 4);
    }

    #[test]
    fn shutdown_stops_everything() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.model_mut().ticking = true;
        sim.init();
        sim.send(Msg::Arm(1));
        sim.shutdown();
        sim.advance(ms(1000));
        sim.send(Msg::Key('x'));
        assert_eq!(sim.model().ticks, 0);
        assert!(sim.model().fired.is_empty());
        assert!(sim.model().keys.is_empty());
        assert!(!sim.is_running());
    }

    #[test]
    fn quit_command_stops_delivery() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.send(Msg::Stop);
        sim.inject_event(Event::key(KeyCode::Char('a')));
        assert!(sim.model().keys.is_empty());
        assert_eq!(sim.command_log(), &[CmdRecord::Quit]);
    }

    #[test]
    fn tasks_run_synchronously() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.send(Msg::Work);
        assert_eq!(sim.model().worked, Some(42));
        assert_eq!(sim.logs(), &["worked".to_string()]);
        assert_eq!(
            sim.command_log(),
            &[CmdRecord::Task, CmdRecord::Log("worked".into())]
        );
    }

    #[test]
    fn events_convert_and_frames_capture() {
        let mut sim = ProgramSimulator::new(Timers::default());
        sim.init();
        sim.inject_events(&[Event::key(KeyCode::Char('h')), Event::key(KeyCode::Char('i'))]);
        let frame = sim.capture_frame(10, 1);
        assert_eq!(frame.row_text(0), "hi");
        assert_eq!(sim.frames().len(), 1);
        assert!(sim.last_frame().is_some());
    }

    #[test]
    fn save_state_flushes_preferences() {
        let store = PreferenceStore::in_memory().shared();
        let mut sim = ProgramSimulator::with_preferences(Timers::default(), Arc::clone(&store));
        sim.init();
        store.set("k", 1, serde_json::json!(1));
        sim.shutdown();
        assert!(!store.is_dirty());
    }

    proptest! {
        #[test]
        fn advance_in_pieces_matches_one_advance(steps in proptest::collection::vec(0u64..120, 1..40)) {
            let total: u64 = steps.iter().sum();

            let mut whole = ProgramSimulator::new(Timers::default());
            whole.model_mut().ticking = true;
            whole.init();
            whole.advance(ms(total));

            let mut pieces = ProgramSimulator::new(Timers::default());
            pieces.model_mut().ticking = true;
            pieces.init();
            for step in &steps {
                pieces.advance(ms(*step));
            }

            prop_assert_eq!(pieces.now(), whole.now());
            prop_assert_eq!(pieces.model().ticks, whole.model().ticks);
            prop_assert_eq!(u64::from(whole.model().ticks), total / 33);
        }
    }
}
