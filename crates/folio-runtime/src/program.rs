#![forbid(unsafe_code)]

//! The model/command contract and the live terminal program loop.
//!
//! ```text
//!   input ──► Message ──► Model::update ──► Cmd ──► side effects
//!                              │
//!                              ├──► Model::subscriptions ──► reconcile timers
//!                              └──► Model::view ──► Frame ──► Presenter
//! ```
//!
//! Every message, whether it comes from the terminal, a timer, or a finished
//! task, goes through the same path: update, execute the returned command,
//! reconcile subscriptions, and redraw if anything changed.

use std::io::{self, Stdout};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use folio_core::event::Event;
use folio_core::terminal_session::{SessionOptions, TerminalSession};
use folio_render::frame::Frame;
use folio_render::presenter::Presenter;
use tracing::{debug, debug_span, info, info_span, warn};

use crate::state_persistence::PreferenceStore;
use crate::subscription::{Subscription, SubscriptionManager};

/// Application state plus its transition function.
pub trait Model: Sized {
    /// Messages the model reacts to. Terminal events convert into it.
    type Message: From<Event> + Send + 'static;

    /// Startup side effects.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Message for a terminal event that arrived `at` after the program started.
    ///
    /// The live loop stamps with wall time, the simulator with its virtual
    /// clock. The default drops the stamp.
    fn event_message(event: Event, at: Duration) -> Self::Message {
        let _ = at;
        Self::Message::from(event)
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    fn view(&self, frame: &mut Frame);

    /// Timers the model wants running right now.
    ///
    /// Re-evaluated after every update; see [`crate::subscription`].
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        vec![]
    }
}

/// Side effects requested by `init` or `update`.
#[derive(Default)]
pub enum Cmd<M> {
    #[default]
    None,
    Quit,
    /// Run each command in order, stopping early on quit.
    Batch(Vec<Cmd<M>>),
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Record a line in the application log.
    Log(String),
    /// Run a blocking closure off the UI thread; its result is fed to `update`.
    Task(Box<dyn FnOnce() -> M + Send>),
    /// Flush the preference store.
    SaveState,
    SetMouseCapture(bool),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(_) => write!(f, "Task(..)"),
            Self::SaveState => write!(f, "SaveState"),
            Self::SetMouseCapture(b) => write!(f, "SetMouseCapture({b})"),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(line: impl Into<String>) -> Self {
        Self::Log(line.into())
    }

    /// Empty lists collapse to `None`, single-element lists to the element.
    pub fn batch(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Batch)
    }

    pub fn sequence(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Sequence)
    }

    fn collapse(mut cmds: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        cmds.retain(|c| !c.is_none());
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => wrap(cmds),
        }
    }

    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(Box::new(f))
    }

    #[inline]
    pub fn save_state() -> Self {
        Self::SaveState
    }

    #[inline]
    pub fn set_mouse_capture(enabled: bool) -> Self {
        Self::SetMouseCapture(enabled)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of leaf commands, not counting `None`.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) | Self::Sequence(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }

    /// Stable name for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Task(_) => "Task",
            Self::SaveState => "SaveState",
            Self::SetMouseCapture(_) => "SetMouseCapture",
        }
    }
}

/// How the live program sets up the terminal.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    pub alternate_screen: bool,
    pub mouse: bool,
    /// Upper bound on how long the loop blocks waiting for input.
    pub poll_timeout: Duration,
    /// Loaded on start, flushed on `Cmd::SaveState` and on exit.
    pub preferences: Option<Arc<PreferenceStore>>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            poll_timeout: Duration::from_millis(16),
            preferences: None,
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse = enabled;
        self
    }

    #[must_use]
    pub fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }

    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_preferences(mut self, store: Arc<PreferenceStore>) -> Self {
        self.preferences = Some(store);
        self
    }
}

/// Drives a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    config: ProgramConfig,
    subscriptions: SubscriptionManager<M::Message>,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    task_handles: Vec<JoinHandle<()>>,
    width: u16,
    height: u16,
    started: Instant,
    running: bool,
    dirty: bool,
    frames: u64,
}

impl<M: Model> Program<M> {
    /// Take over the terminal. The terminal is restored when the program drops.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let options = SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
            focus_events: true,
        };
        let session = TerminalSession::new(options)?;
        let (width, height) = session.size()?;
        let (task_sender, task_receiver) = mpsc::channel();
        Ok(Self {
            model,
            session,
            presenter: Presenter::new(io::stdout()),
            config,
            subscriptions: SubscriptionManager::new(),
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
            width,
            height,
            started: Instant::now(),
            running: true,
            dirty: true,
            frames: 0,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run until the model quits.
    pub fn run(&mut self) -> io::Result<()> {
        let _span = info_span!("folio.program.run", width = self.width, height = self.height).entered();
        self.load_state();
        self.started = Instant::now();

        let cmd = self.model.init();
        self.execute_cmd(cmd)?;
        // The model learns the initial size the same way it learns later ones.
        let resize = Event::Resize {
            width: self.width,
            height: self.height,
        };
        self.dispatch(M::event_message(resize, self.started.elapsed()), "event")?;
        self.reconcile_subscriptions();
        self.render_frame()?;

        while self.running {
            if self.session.poll_event(self.config.poll_timeout)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            let timer_messages = self.subscriptions.drain_messages();
            self.dispatch_all(timer_messages, "subscription")?;

            let task_messages: Vec<_> = self.task_receiver.try_iter().collect();
            self.dispatch_all(task_messages, "task")?;
            self.reap_finished_tasks();

            if self.dirty {
                self.render_frame()?;
            }
        }

        self.save_state();
        let stopped = self.subscriptions.active_count();
        self.subscriptions.stop_all();
        self.reap_finished_tasks();
        info!(target: "folio.runtime", frames = self.frames, stopped, "program finished");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            self.width = width;
            self.height = height;
            self.presenter.reset();
        }
        let at = self.started.elapsed();
        self.dispatch(M::event_message(event, at), "event")?;
        self.reconcile_subscriptions();
        Ok(())
    }

    fn dispatch_all(&mut self, messages: Vec<M::Message>, source: &'static str) -> io::Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        for msg in messages {
            self.dispatch(msg, source)?;
            if !self.running {
                break;
            }
        }
        self.reconcile_subscriptions();
        Ok(())
    }

    fn dispatch(&mut self, msg: M::Message, source: &'static str) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!(
                "folio.program.update",
                source,
                duration_us = tracing::field::Empty,
                cmd = tracing::field::Empty
            )
            .entered();
            let start = Instant::now();
            let cmd = self.model.update(msg);
            let span = tracing::Span::current();
            span.record("duration_us", start.elapsed().as_micros() as u64);
            span.record("cmd", cmd.type_name());
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd)
    }

    fn reconcile_subscriptions(&mut self) {
        let subs = self.model.subscriptions();
        self.subscriptions.reconcile(subs);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                debug!(target: "folio.runtime", "quit requested");
                self.running = false;
            }
            Cmd::Msg(m) => self.dispatch(m, "cmd")?,
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(line) => info!(target: "folio.app", "{line}"),
            Cmd::Task(f) => {
                let sender = self.task_sender.clone();
                self.task_handles.push(std::thread::spawn(move || {
                    let _ = sender.send(f());
                }));
            }
            Cmd::SaveState => self.save_state(),
            Cmd::SetMouseCapture(enabled) => self.session.set_mouse_capture(enabled)?,
        }
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) =
            self.task_handles.drain(..).partition(|h| h.is_finished());
        self.task_handles = pending;
        for handle in finished {
            if handle.join().is_err() {
                tracing::error!(target: "folio.runtime", "background task panicked");
            }
        }
    }

    fn load_state(&self) {
        let Some(store) = &self.config.preferences else {
            return;
        };
        match store.load() {
            Ok(count) => info!(target: "folio.runtime", count, backend = store.backend_name(), "preferences loaded"),
            Err(e) => warn!(target: "folio.runtime", error = %e, "failed to load preferences"),
        }
    }

    fn save_state(&self) {
        let Some(store) = &self.config.preferences else {
            return;
        };
        match store.flush() {
            Ok(true) => debug!(target: "folio.runtime", "preferences saved"),
            Ok(false) => {}
            Err(e) => warn!(target: "folio.runtime", error = %e, "failed to save preferences"),
        }
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        self.presenter.present(&frame)?;
        self.frames += 1;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_collapses() {
        assert!(Cmd::<()>::batch(vec![]).is_none());
        assert!(matches!(Cmd::<()>::batch(vec![Cmd::quit()]), Cmd::Quit));
        assert!(matches!(
            Cmd::<()>::sequence(vec![Cmd::none(), Cmd::save_state()]),
            Cmd::SaveState
        ));
        assert!(matches!(
            Cmd::<()>::batch(vec![Cmd::quit(), Cmd::save_state()]),
            Cmd::Batch(_)
        ));
    }

    #[test]
    fn count_ignores_none() {
        let cmd: Cmd<u8> = Cmd::Batch(vec![
            Cmd::None,
            Cmd::msg(1),
            Cmd::Sequence(vec![Cmd::log("x"), Cmd::quit()]),
        ]);
        assert_eq!(cmd.count(), 3);
        assert_eq!(cmd.type_name(), "Batch");
    }

    #[test]
    fn debug_hides_task_closure() {
        let cmd: Cmd<u8> = Cmd::task(|| 3);
        assert_eq!(format!("{cmd:?}"), "Task(..)");
    }

    #[test]
    fn config_builders() {
        let config = ProgramConfig::default()
            .with_mouse(false)
            .with_alternate_screen(false)
            .with_poll_timeout(Duration::from_millis(5))
            .with_preferences(Arc::new(PreferenceStore::in_memory()));
        assert!(!config.mouse);
        assert!(!config.alternate_screen);
        assert_eq!(config.poll_timeout, Duration::from_millis(5));
        assert!(config.preferences.is_some());
    }
}
