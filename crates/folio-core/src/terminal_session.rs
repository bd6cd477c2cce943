#![forbid(unsafe_code)]

//! RAII terminal session.
//!
//! A [`TerminalSession`] enters raw mode on construction and restores every
//! mode it enabled when dropped, in reverse order. A panic hook and (on unix)
//! a signal watcher perform the same restoration on abnormal exits, so the
//! user's shell is never left in raw mode or on the alternate screen.
//!
//! | Mode             | Enable             | Disable            |
//! |------------------|--------------------|--------------------|
//! | Alternate screen | `CSI ? 1049 h`     | `CSI ? 1049 l`     |
//! | Mouse (SGR)      | `CSI ? 1000;1006 h`| `CSI ? 1000;1006 l`|
//! | Focus events     | `CSI ? 1004 h`     | `CSI ? 1004 l`     |

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::event::Event;

/// Which terminal modes a session enables.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer.
    pub alternate_screen: bool,
    /// Capture mouse clicks, wheel and motion.
    pub mouse_capture: bool,
    /// Report focus gained/lost.
    pub focus_events: bool,
}

impl SessionOptions {
    /// Alternate screen and focus events; mouse capture when `mouse` is set.
    pub fn fullscreen(mouse: bool) -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: mouse,
            focus_events: true,
        }
    }
}

/// Owns raw mode and every optional mode for the lifetime of the value.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    focus_events_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or any requested mode cannot be enabled.
    /// Modes enabled before the failure are restored by `Drop`.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!(target: "folio.terminal", "raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            mouse_enabled: false,
            focus_events_enabled: false,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };

        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(
                stdout,
                crossterm::terminal::EnterAlternateScreen,
                crossterm::cursor::Hide
            )?;
            session.alternate_screen_enabled = true;
        }
        if options.mouse_capture {
            session.set_mouse_capture(true)?;
        }
        if options.focus_events {
            crossterm::execute!(stdout, crossterm::event::EnableFocusChange)?;
            session.focus_events_enabled = true;
        }
        tracing::debug!(
            target: "folio.terminal",
            alternate_screen = session.alternate_screen_enabled,
            mouse = session.mouse_enabled,
            focus = session.focus_events_enabled,
            "terminal session ready"
        );

        Ok(session)
    }

    /// Current terminal size as `(columns, rows)`.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(true)` means an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next event. `Ok(None)` for input with no canonical form.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(Event::from_crossterm(crossterm::event::read()?))
    }

    /// Enable or disable mouse capture at runtime.
    pub fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled == self.mouse_enabled {
            return Ok(());
        }
        let mut stdout = io::stdout();
        if enabled {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
        } else {
            crossterm::execute!(stdout, crossterm::event::DisableMouseCapture)?;
        }
        self.mouse_enabled = enabled;
        tracing::debug!(target: "folio.terminal", enabled, "mouse capture changed");
        Ok(())
    }

    pub fn mouse_capture(&self) -> bool {
        self.mouse_enabled
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        drop(self.signal_guard.take());

        let mut stdout = io::stdout();
        if self.focus_events_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
            self.focus_events_enabled = false;
        }
        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
        }
        let _ = crossterm::execute!(
            stdout,
            crossterm::style::ResetColor,
            crossterm::cursor::Show
        );
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = stdout.flush();
        tracing::info!(target: "folio.terminal", "terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(
        stdout,
        crossterm::event::DisableFocusChange,
        crossterm::event::DisableMouseCapture,
        crossterm::style::ResetColor,
        crossterm::cursor::Show,
        crossterm::terminal::LeaveAlternateScreen
    );
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Restores the terminal and exits on SIGINT/SIGTERM.
#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(target: "folio.terminal", signal, "termination signal received");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_minimal() {
        let opts = SessionOptions::default();
        assert!(!opts.alternate_screen);
        assert!(!opts.mouse_capture);
        assert!(!opts.focus_events);
    }

    #[test]
    fn fullscreen_options() {
        let opts = SessionOptions::fullscreen(false);
        assert!(opts.alternate_screen);
        assert!(!opts.mouse_capture);
        assert!(SessionOptions::fullscreen(true).mouse_capture);
    }
}
