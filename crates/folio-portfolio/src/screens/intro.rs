#![forbid(unsafe_code)]

//! Intro panel: the title, the tagline, and the "Enter Portfolio" button.
//!
//! Each element fades in on its own delay after mount. While exploring, the
//! whole panel fades out (applied by the caller).

use std::time::Duration;

use folio_core::animation::{Animation, Fade, delay, ease_out};
use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, PackedRgba, StyleFlags};
use folio_render::drawing::Draw;
use folio_render::text::display_width;

use super::ViewContext;
use crate::layout::{HitMap, Target};

const TITLE: [&str; 2] = ["Creative", "Developer"];
const TAGLINE: &str = "Building digital experiences that inspire";
pub const BUTTON_LABEL: &str = "Enter Portfolio";

const TITLE_DELAY: Duration = Duration::from_millis(200);
const TAGLINE_DELAY: Duration = Duration::from_millis(500);
const BUTTON_DELAY: Duration = Duration::from_millis(800);
const ENTRANCE: Duration = Duration::from_millis(400);

const GRADIENT: [PackedRgba; 3] = [
    PackedRgba::rgb(0x63, 0x66, 0xf1),
    PackedRgba::rgb(0xa8, 0x55, 0xf7),
    PackedRgba::rgb(0xec, 0x48, 0x99),
];

/// Rows used by the stacked content: two title rows, gap, tagline, gap, three button rows.
const STACK_HEIGHT: u16 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroLayout {
    pub title_y: u16,
    pub tagline_y: u16,
    pub button: Rect,
}

/// Stack centred in `area`. The button widens while hovered.
pub fn layout(area: Rect, hovered: bool) -> IntroLayout {
    let top = area.y + area.height.saturating_sub(STACK_HEIGHT) / 2;
    let padding = if hovered { 12 } else { 8 };
    let width = (display_width(BUTTON_LABEL) as u16 + padding).min(area.width);
    let rows = if area.height >= STACK_HEIGHT { 3 } else { 1 };
    let button_y = (top + 6).min(area.bottom().saturating_sub(rows));
    IntroLayout {
        title_y: top,
        tagline_y: top + 3,
        button: Rect::new(area.x + (area.width - width) / 2, button_y, width, rows),
    }
}

fn entrance(after: Duration, elapsed: Duration) -> f32 {
    let mut fade = delay(after, Fade::new(ENTRANCE).easing(ease_out));
    fade.tick(elapsed);
    fade.value()
}

fn gradient_at(t: f32) -> PackedRgba {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        GRADIENT[0].lerp(GRADIENT[1], t)
    } else {
        GRADIENT[1].lerp(GRADIENT[2], t - 1.0)
    }
}

fn centred_x(area: Rect, text: &str) -> u16 {
    area.x + area.width.saturating_sub(display_width(text) as u16) / 2
}

fn hovered(ctx: &ViewContext<'_>) -> bool {
    Target::EnterButton.hover_label() == Some(ctx.nav.label())
}

pub fn render(ctx: &ViewContext<'_>, buf: &mut Buffer, area: Rect) {
    let palette = ctx.palette;
    let layout = layout(area, hovered(ctx));

    let title = entrance(TITLE_DELAY, ctx.mounted_for);
    if title > 0.0 {
        // Slide up one row while fading in.
        let lift = u16::from(title < 0.5);
        buf.push_opacity(title);
        for (row, word) in TITLE.iter().enumerate() {
            let y = layout.title_y + row as u16 + lift;
            let x = centred_x(area, word);
            let span = word.chars().count().max(2) - 1;
            for (i, c) in word.chars().enumerate() {
                let cell = Cell::from_char(c)
                    .with_fg(gradient_at(i as f32 / span as f32))
                    .with_flags(StyleFlags::BOLD);
                buf.set(x + i as u16, y, cell);
            }
        }
        buf.pop_opacity();
    }

    let tagline = entrance(TAGLINE_DELAY, ctx.mounted_for);
    if tagline > 0.0 {
        buf.push_opacity(tagline);
        buf.print_text_clipped(
            centred_x(area, TAGLINE),
            layout.tagline_y,
            TAGLINE,
            Cell::default().with_fg(palette.muted),
            area.right(),
        );
        buf.pop_opacity();
    }

    let button = entrance(BUTTON_DELAY, ctx.mounted_for);
    if button > 0.0 {
        buf.push_opacity(button);
        let cell = Cell::from_char(' ').with_fg(palette.button_fg).with_bg(palette.button_bg);
        buf.fill(layout.button, cell);
        let label_y = layout.button.y + layout.button.height / 2;
        buf.print_text_clipped(
            centred_x(layout.button, BUTTON_LABEL),
            label_y,
            BUTTON_LABEL,
            cell.with_flags(StyleFlags::BOLD),
            layout.button.right(),
        );
        buf.pop_opacity();
    }
}

pub fn register_hits(ctx: &ViewContext<'_>, area: Rect, hits: &mut HitMap) {
    hits.push(layout(area, hovered(ctx)).button, Target::EnterButton);
}
