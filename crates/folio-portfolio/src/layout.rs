#![forbid(unsafe_code)]

//! Screen partitioning and pointer hit-testing.
//!
//! Every clickable element is registered in a [`HitMap`] by the same layout
//! code that draws it, so clicks resolve against exactly what is on screen.
//! Later registrations sit on top of earlier ones.

use folio_core::geometry::Rect;

use crate::contact::FormFocus;
use crate::panel::PanelId;

/// Terminals narrower than this use the compact layout in [`LayoutMode::Auto`].
pub const COMPACT_BELOW: u16 = 80;

pub const TAB_BAR_HEIGHT: u16 = 1;

/// Hub nodes versus a bottom tab bar. Navigation semantics are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Auto,
    Hub,
    Compact,
}

impl LayoutMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(LayoutMode::Auto),
            "hub" => Some(LayoutMode::Hub),
            "compact" => Some(LayoutMode::Compact),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Auto => "auto",
            LayoutMode::Hub => "hub",
            LayoutMode::Compact => "compact",
        }
    }

    /// Whether a terminal `width` columns wide shows the tab bar.
    pub const fn is_compact(self, width: u16) -> bool {
        match self {
            LayoutMode::Auto => width < COMPACT_BELOW,
            LayoutMode::Hub => false,
            LayoutMode::Compact => true,
        }
    }
}

/// Something the pointer can click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    EnterButton,
    HubNode(PanelId),
    ThemeToggle,
    Tab(PanelId),
    BackToMap,
    ProjectCard(usize),
    /// The detail overlay itself; swallows clicks.
    ModalBody,
    ModalClose,
    /// Everything around the detail overlay.
    Backdrop,
    FormInput(FormFocus),
}

impl Target {
    /// Auxiliary label shown while hovering.
    pub const fn hover_label(self) -> Option<&'static str> {
        match self {
            Target::EnterButton => Some("Explore"),
            Target::HubNode(panel) => Some(panel.label()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Target)>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rect`. Empty rectangles are ignored.
    pub fn push(&mut self, rect: Rect, target: Target) {
        if !rect.is_empty() {
            self.regions.push((rect, target));
        }
    }

    /// Topmost target under `(x, y)`.
    pub fn target_at(&self, x: u16, y: u16) -> Option<Target> {
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(x, y))
            .map(|(_, target)| *target)
    }

    pub fn rect_of(&self, target: Target) -> Option<Rect> {
        self.regions
            .iter()
            .rev()
            .find(|(_, t)| *t == target)
            .map(|(rect, _)| *rect)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Rect, Target)> {
        self.regions.iter()
    }
}

/// Panel area and, in compact mode, the tab bar below it.
pub fn split_chrome(area: Rect, compact: bool) -> (Rect, Option<Rect>) {
    if !compact || area.height <= TAB_BAR_HEIGHT {
        return (area, None);
    }
    let (content, bar) = area.split_bottom(TAB_BAR_HEIGHT);
    (content, Some(bar))
}

/// Equal-width slots for [`PanelId::TAB_ORDER`]; the last slot takes the remainder.
pub fn tab_slots(bar: Rect) -> Vec<(PanelId, Rect)> {
    let count = PanelId::TAB_ORDER.len() as u16;
    let slot = bar.width / count;
    if slot == 0 {
        return Vec::new();
    }
    PanelId::TAB_ORDER
        .iter()
        .enumerate()
        .map(|(i, panel)| {
            let x = bar.x + slot * i as u16;
            let width = if i as u16 == count - 1 {
                bar.right() - x
            } else {
                slot
            };
            (*panel, Rect::new(x, bar.y, width, bar.height))
        })
        .collect()
}

/// Theme toggle in the top-right corner of the panel area.
pub fn theme_toggle_rect(area: Rect) -> Rect {
    let width = 5;
    if area.width < width + 2 || area.height < 2 {
        return Rect::default();
    }
    Rect::new(area.right() - width - 1, area.y + 1, width, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_switches_at_width() {
        assert!(LayoutMode::Auto.is_compact(79));
        assert!(!LayoutMode::Auto.is_compact(80));
        assert!(LayoutMode::Compact.is_compact(200));
        assert!(!LayoutMode::Hub.is_compact(20));
    }

    #[test]
    fn parse_modes() {
        assert_eq!(LayoutMode::parse(" Compact "), Some(LayoutMode::Compact));
        assert_eq!(LayoutMode::parse("hub"), Some(LayoutMode::Hub));
        assert_eq!(LayoutMode::parse("mobile"), None);
        for mode in [LayoutMode::Auto, LayoutMode::Hub, LayoutMode::Compact] {
            assert_eq!(LayoutMode::parse(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn topmost_target_wins() {
        let mut hits = HitMap::new();
        hits.push(Rect::new(0, 0, 10, 10), Target::Backdrop);
        hits.push(Rect::new(2, 2, 4, 4), Target::ModalBody);
        hits.push(Rect::new(5, 2, 1, 1), Target::ModalClose);
        hits.push(Rect::new(0, 0, 0, 5), Target::ThemeToggle);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits.target_at(0, 0), Some(Target::Backdrop));
        assert_eq!(hits.target_at(3, 3), Some(Target::ModalBody));
        assert_eq!(hits.target_at(5, 2), Some(Target::ModalClose));
        assert_eq!(hits.target_at(20, 20), None);
        assert_eq!(hits.rect_of(Target::ModalClose), Some(Rect::new(5, 2, 1, 1)));
    }

    #[test]
    fn chrome_reserves_tab_bar() {
        let area = Rect::from_size(60, 20);
        let (content, bar) = split_chrome(area, true);
        assert_eq!(content, Rect::new(0, 0, 60, 19));
        assert_eq!(bar, Some(Rect::new(0, 19, 60, 1)));
        assert_eq!(split_chrome(area, false), (area, None));
    }

    #[test]
    fn tab_slots_cover_bar() {
        let slots = tab_slots(Rect::new(0, 9, 64, 1));
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0], (PanelId::Map, Rect::new(0, 9, 10, 1)));
        assert_eq!(slots[5].1.right(), 64);
        assert!(tab_slots(Rect::new(0, 0, 5, 1)).is_empty());
    }

    #[test]
    fn hover_labels() {
        assert_eq!(Target::EnterButton.hover_label(), Some("Explore"));
        assert_eq!(Target::HubNode(PanelId::Skills).hover_label(), Some("Skills"));
        assert_eq!(Target::BackToMap.hover_label(), None);
    }
}
