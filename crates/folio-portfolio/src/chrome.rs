#![forbid(unsafe_code)]

//! Shared chrome: the compact tab bar and the confirmation toast.

use std::time::Duration;

use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, StyleFlags};
use folio_render::drawing::{BorderChars, Draw};
use folio_render::text::display_width;

use crate::layout::{HitMap, Target, tab_slots};
use crate::panel::PanelId;
use crate::theme::Palette;

/// How long a toast stays up.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Tail of [`TOAST_DURATION`] spent fading out.
const TOAST_FADE: Duration = Duration::from_millis(300);

pub fn render_tab_bar(active: PanelId, palette: Palette, buf: &mut Buffer, bar: Rect) {
    let base = Cell::from_char(' ').with_fg(palette.muted).with_bg(palette.surface);
    buf.fill(bar, base);
    for (panel, slot) in tab_slots(bar) {
        let label = panel.label();
        let cell = if panel == active {
            buf.fill(slot, base.with_bg(palette.accent.with_opacity(0.2).over(palette.surface)));
            Cell::default().with_fg(palette.accent).with_flags(StyleFlags::BOLD)
        } else {
            Cell::default().with_fg(palette.muted)
        };
        let x = slot.x + slot.width.saturating_sub(display_width(label) as u16) / 2;
        buf.print_text_clipped(x, slot.y, label, cell, slot.right());
    }
}

pub fn register_tab_hits(bar: Rect, hits: &mut HitMap) {
    for (panel, slot) in tab_slots(bar) {
        hits.push(slot, Target::Tab(panel));
    }
}

/// A transient confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Distinguishes toasts so an expiry only removes its own.
    pub serial: u64,
    pub text: String,
    pub shown_for: Duration,
}

impl Toast {
    pub fn new(serial: u64, text: impl Into<String>) -> Self {
        Self {
            serial,
            text: text.into(),
            shown_for: Duration::ZERO,
        }
    }

    pub fn opacity(&self) -> f32 {
        let left = TOAST_DURATION.saturating_sub(self.shown_for);
        if left >= TOAST_FADE {
            1.0
        } else {
            left.as_secs_f32() / TOAST_FADE.as_secs_f32()
        }
    }
}

/// Toast box centred at the bottom of `area`.
pub fn toast_rect(toast: &Toast, area: Rect) -> Rect {
    let width = (display_width(&toast.text) as u16 + 6).min(area.width);
    if area.height < 4 {
        return Rect::default();
    }
    Rect::new(area.x + (area.width - width) / 2, area.bottom() - 4, width, 3)
}

pub fn render_toast(toast: &Toast, palette: Palette, buf: &mut Buffer, area: Rect) {
    let rect = toast_rect(toast, area);
    if rect.is_empty() {
        return;
    }
    buf.push_opacity(toast.opacity());
    buf.draw_box(
        rect,
        BorderChars::ROUNDED,
        Cell::default().with_fg(palette.success),
        Cell::from_char(' ').with_bg(palette.surface),
    );
    let text = format!("✓ {}", toast.text);
    buf.print_text_clipped(
        rect.x + 2,
        rect.y + 1,
        &text,
        Cell::default().with_fg(palette.success).with_flags(StyleFlags::BOLD),
        rect.right().saturating_sub(1),
    );
    buf.pop_opacity();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::SENT_MESSAGE;
    use crate::theme::Theme;

    #[test]
    fn active_tab_is_highlighted() {
        let palette = Theme::Light.palette();
        let bar = Rect::new(0, 0, 72, 1);
        let mut buf = Buffer::new(72, 1);
        render_tab_bar(PanelId::Skills, palette, &mut buf, bar);
        let text = buf.row_text(0);
        assert!(text.contains("Map"));
        assert!(text.contains("Contact"));
        let Some((_, slot)) = tab_slots(bar).into_iter().find(|(p, _)| *p == PanelId::Skills) else {
            panic!("skills tab missing");
        };
        let highlighted = buf.get(slot.x, 0).map(|c| c.bg);
        assert_ne!(highlighted, buf.get(0, 0).map(|c| c.bg));
    }

    #[test]
    fn tab_hits_cover_every_tab() {
        let mut hits = HitMap::new();
        register_tab_hits(Rect::new(0, 10, 60, 1), &mut hits);
        assert_eq!(hits.len(), PanelId::TAB_ORDER.len());
        assert_eq!(hits.target_at(0, 10), Some(Target::Tab(PanelId::Map)));
        assert_eq!(hits.target_at(59, 10), Some(Target::Tab(PanelId::Contact)));
    }

    #[test]
    fn toast_fades_out_at_the_end() {
        let mut toast = Toast::new(1, SENT_MESSAGE);
        assert_eq!(toast.opacity(), 1.0);
        toast.shown_for = TOAST_DURATION - TOAST_FADE / 2;
        assert!((toast.opacity() - 0.5).abs() < 1e-3);
        toast.shown_for = TOAST_DURATION;
        assert_eq!(toast.opacity(), 0.0);
    }

    #[test]
    fn toast_draws_message() {
        let toast = Toast::new(1, SENT_MESSAGE);
        let mut buf = Buffer::new(60, 10);
        render_toast(&toast, Theme::Dark.palette(), &mut buf, Rect::from_size(60, 10));
        assert!(buf.to_text().contains("Message sent successfully!"));
    }
}
