#![forbid(unsafe_code)]

//! Section State Machine.
//!
//! Owns the active panel, the auxiliary hover label, the selected project
//! (detail overlay), the exploring flag of the intro, and the theme flag.
//! Every operation is total: a call outside its guard leaves the state
//! untouched and returns `false`.
//!
//! # Invariants
//!
//! - Exactly one panel is active; the machine starts on [`PanelId::Intro`].
//! - A selection exists only while [`PanelId::Projects`] is active. Any
//!   `go_to` clears it; clearing it never changes the panel.
//! - The mount generation increases by one on every change of the active
//!   panel and never otherwise. Timers and observers tied to one mount key on
//!   it.
//! - Leaving the intro clears the exploring flag, which cancels the pending
//!   explore transition.

use std::collections::VecDeque;

use tracing::debug;

use crate::panel::PanelId;
use crate::theme::Theme;

/// Number of panel changes remembered by [`SectionMachine::trail`].
pub const TRAIL_CAPACITY: usize = 64;

/// Arrow keys on the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Panel an arrow leads to from the hub.
    pub const fn hub_target(self) -> PanelId {
        match self {
            Direction::Up => PanelId::About,
            Direction::Right => PanelId::Projects,
            Direction::Down => PanelId::Skills,
            Direction::Left => PanelId::Contact,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionMachine {
    active: PanelId,
    label: String,
    selected: Option<usize>,
    exploring: bool,
    theme: Theme,
    generation: u64,
    trail: VecDeque<PanelId>,
    project_count: usize,
}

impl SectionMachine {
    /// A machine on the intro. `project_count` bounds [`select_item`](Self::select_item).
    pub fn new(project_count: usize) -> Self {
        let mut trail = VecDeque::with_capacity(TRAIL_CAPACITY);
        trail.push_back(PanelId::Intro);
        Self {
            active: PanelId::Intro,
            label: String::new(),
            selected: None,
            exploring: false,
            theme: Theme::default(),
            generation: 0,
            trail,
            project_count,
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn active(&self) -> PanelId {
        self.active
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Index of the project shown in the detail overlay.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_exploring(&self) -> bool {
        self.exploring
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Panels visited, oldest first, at most [`TRAIL_CAPACITY`] entries.
    pub fn trail(&self) -> impl Iterator<Item = PanelId> + '_ {
        self.trail.iter().copied()
    }

    /// Make `panel` active and set the label (empty when `None`).
    ///
    /// Always clears the selection. Returns `true` if the active panel changed.
    pub fn go_to(&mut self, panel: PanelId, label: Option<&str>) -> bool {
        self.label.clear();
        if let Some(label) = label {
            self.label.push_str(label);
        }
        self.selected = None;
        if panel == self.active {
            return false;
        }

        let from = self.active;
        if from == PanelId::Intro {
            self.exploring = false;
        }
        self.active = panel;
        self.generation += 1;
        if self.trail.len() == TRAIL_CAPACITY {
            self.trail.pop_front();
        }
        self.trail.push_back(panel);
        debug!(
            target: "folio.nav",
            from = from.key(),
            to = panel.key(),
            generation = self.generation,
            "panel changed"
        );
        true
    }

    /// Start the intro exit. Only valid on the intro and only once.
    pub fn enter_exploring(&mut self) -> bool {
        if self.active != PanelId::Intro || self.exploring {
            return false;
        }
        self.exploring = true;
        debug!(target: "folio.nav", "exploring");
        true
    }

    /// Finish the delayed intro exit by moving to the hub.
    ///
    /// A no-op unless still exploring on the intro, so a stale timer cannot
    /// move the view.
    pub fn complete_exploring(&mut self) -> bool {
        if !self.exploring || self.active != PanelId::Intro {
            return false;
        }
        self.go_to(PanelId::Map, None)
    }

    /// Open the detail overlay for project `index`. Projects panel only.
    pub fn select_item(&mut self, index: usize) -> bool {
        if self.active != PanelId::Projects || index >= self.project_count {
            return false;
        }
        self.selected = Some(index);
        debug!(target: "folio.nav", index, "project selected");
        true
    }

    /// Close the detail overlay. Never changes the panel.
    pub fn clear_selection(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Hub arrow navigation. Ignored off the map.
    pub fn arrow(&mut self, direction: Direction) -> bool {
        if self.active != PanelId::Map {
            return false;
        }
        self.go_to(direction.hub_target(), None)
    }

    /// Close the overlay if open, otherwise return to the hub.
    pub fn escape(&mut self) -> bool {
        if self.clear_selection() {
            return true;
        }
        self.go_to(PanelId::Map, None)
    }

    /// Flip the theme and return the new value. The panel is untouched.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        debug!(target: "folio.nav", theme = self.theme.as_str(), "theme toggled");
        self.theme
    }

    /// Replace the auxiliary label without touching panel identity.
    pub fn set_label(&mut self, label: &str) {
        if self.label != label {
            self.label.clear();
            self.label.push_str(label);
        }
    }
}
