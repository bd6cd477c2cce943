#![forbid(unsafe_code)]

//! Projects panel: card grid plus the detail overlay for the selected project.
//!
//! Cards are reveal nodes. While a project is selected the overlay covers
//! the panel; clicks outside it land on the backdrop.

use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, PackedRgba, StyleFlags};
use folio_render::drawing::{BorderChars, Draw};
use folio_render::text::{display_width, truncate_to_width, wrap};

use super::document::{Align, CardSpec, DocBuilder, Document, Tone};
use super::{BACK_LABEL, CONTENT_WIDTH, ViewContext};
use crate::content::{Project, record_color};
use crate::layout::{HitMap, Target};
use crate::panel::PanelId;

const OVERLAY_MAX_WIDTH: u16 = 72;
const CLOSE_LABEL: &str = " ✕ ";
const HINT: &str = "Tab moves between projects · Enter opens one · Esc returns to the map";

pub fn document(ctx: &ViewContext<'_>, width: u16) -> Document {
    let accent = PanelId::Projects.accent();
    let mut doc = DocBuilder::new(width, CONTENT_WIDTH);
    doc.text(PanelId::Projects.title(), Tone::Accent(accent), Align::Center);
    doc.gap(1);
    let cards = ctx
        .content
        .projects
        .iter()
        .enumerate()
        .map(|(i, project)| {
            let card = CardSpec::new(&project.title, &project.description, record_color(&project.color, accent))
                .badge(format!("{}", i + 1))
                .tags(&project.tags)
                .max_body_rows(2)
                .focused(i == ctx.card_focus);
            (card, Some(Target::ProjectCard(i)))
        })
        .collect();
    let columns = if doc.width() >= 60 { 2 } else { 1 };
    doc.card_grid(cards, columns, true);
    doc.text(HINT, Tone::Muted, Align::Center);
    doc.gap(1);
    doc.button(BACK_LABEL, None, false, Target::BackToMap);
    doc.finish()
}

/// Overlay geometry for `project` inside `area`: `(modal, close button)`.
pub fn overlay_layout(project: &Project, area: Rect) -> (Rect, Rect) {
    let width = area.width.saturating_sub(4).min(OVERLAY_MAX_WIDTH);
    let inner = width.saturating_sub(4);
    let description = wrap(&project.description, usize::from(inner)).len() as u16;
    // title, gap, description, gap, heading, tags, gap, two links, borders
    let height = (description + 10).min(area.height.saturating_sub(2));
    let modal = area.centered(width, height);
    let close_width = display_width(CLOSE_LABEL) as u16;
    let close = if modal.width > close_width + 2 {
        Rect::new(modal.right() - close_width - 1, modal.y, close_width, 1)
    } else {
        Rect::default()
    };
    (modal, close)
}

fn selected<'a>(ctx: &ViewContext<'a>) -> Option<&'a Project> {
    ctx.nav.selected().and_then(|i| ctx.content.projects.get(i))
}

pub fn render_overlay(ctx: &ViewContext<'_>, buf: &mut Buffer, area: Rect) {
    let Some(project) = selected(ctx) else {
        return;
    };
    let palette = ctx.palette;
    let color = record_color(&project.color, PanelId::Projects.accent());
    buf.paint_area(area, None, Some(palette.scrim));

    let (modal, close) = overlay_layout(project, area);
    if modal.width < 8 || modal.height < 3 {
        return;
    }
    buf.draw_box(
        modal,
        BorderChars::ROUNDED,
        Cell::default().with_fg(color),
        Cell::from_char(' ').with_bg(palette.surface),
    );
    buf.print_text(close.x, close.y, CLOSE_LABEL, Cell::default().with_fg(palette.fg).with_flags(StyleFlags::BOLD));

    let x = modal.x + 2;
    let right = modal.right().saturating_sub(2);
    let bottom = modal.bottom().saturating_sub(1);
    let plain = Cell::default().with_fg(palette.fg);
    let bold = plain.with_flags(StyleFlags::BOLD);

    let mut rows = vec![(truncate_to_width(&project.title, usize::from(right - x)), bold.with_fg(color))];
    rows.push((String::new(), plain));
    rows.extend(wrap(&project.description, usize::from(right - x)).into_iter().map(|r| (r, plain)));
    rows.push((String::new(), plain));
    rows.push(("Technologies".to_owned(), bold));
    let tag_row = rows.len();
    rows.push((String::new(), plain));
    rows.push((String::new(), plain));
    rows.push((format!("View Live  {}", project.live_url), plain));
    rows.push((format!("View Code  {}", project.code_url), plain.with_fg(palette.muted)));

    for (i, (text, style)) in rows.iter().enumerate() {
        let y = modal.y + 1 + i as u16;
        if y >= bottom {
            break;
        }
        if i == tag_row {
            draw_tags(buf, x, y, right, &project.tags, color, palette.surface);
        } else {
            buf.print_text_clipped(x, y, text, *style, right);
        }
    }
}

fn draw_tags(buf: &mut Buffer, x: u16, y: u16, right: u16, tags: &[String], color: PackedRgba, surface: PackedRgba) {
    let chip = Cell::default().with_fg(color).with_bg(color.with_opacity(0.19).over(surface));
    let mut cx = x;
    for tag in tags {
        let label = format!(" {tag} ");
        if cx + display_width(&label) as u16 > right {
            break;
        }
        cx = buf.print_text_clipped(cx, y, &label, chip, right) + 1;
    }
}

pub fn register_overlay_hits(ctx: &ViewContext<'_>, area: Rect, hits: &mut HitMap) {
    let Some(project) = selected(ctx) else {
        return;
    };
    let (modal, close) = overlay_layout(project, area);
    hits.push(area, Target::Backdrop);
    hits.push(modal, Target::ModalBody);
    hits.push(close, Target::ModalClose);
}
