#![forbid(unsafe_code)]

//! Hub map: a node per content panel at fixed fractional positions, the
//! theme toggle, and a dot grid that shifts with the pointer.

use std::time::Duration;

use folio_core::animation::{Animation, Fade, delay};
use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, PackedRgba, StyleFlags};
use folio_render::drawing::Draw;
use folio_render::text::display_width;

use super::ViewContext;
use crate::layout::{HitMap, Target, theme_toggle_rect};
use crate::panel::PanelId;

pub const HINT: &str = "Click on a node to navigate or use arrow keys";

const LEGEND: &str = "↑ About  → Projects  ↓ Skills  ← Contact";

const HINT_DELAY: Duration = Duration::from_secs(1);
const HINT_FADE: Duration = Duration::from_millis(300);

const GRID_STEP_X: i32 = 4;
const GRID_STEP_Y: i32 = 2;
/// Largest grid shift, in cells, at the viewport edge.
const PARALLAX: f32 = 2.0;
const GRID_OPACITY: f32 = 0.3;

const LABEL_BG: PackedRgba = PackedRgba::rgb(0x1f, 0x29, 0x37);
const IDLE_OPACITY: f32 = 0.7;

/// Where a hub node and its label sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    pub panel: PanelId,
    pub center: (u16, u16),
    /// The `( ● )` row.
    pub halo: Rect,
    pub label: Rect,
    /// Clickable union of halo and label.
    pub hit: Rect,
}

fn union(a: Rect, b: Rect) -> Rect {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    Rect::new(x, y, a.right().max(b.right()) - x, a.bottom().max(b.bottom()) - y)
}

fn label_text(panel: PanelId) -> String {
    format!(" {} ", panel.label())
}

pub fn node_layout(panel: PanelId, area: Rect) -> Option<NodeLayout> {
    let (fx, fy) = panel.hub_position()?;
    if area.width < 5 || area.height < 2 {
        return None;
    }
    let (cx, cy) = area.point_at(fx, fy);
    let halo = Rect::new(cx.saturating_sub(2).max(area.x), cy, 5, 1).intersection(&area);

    let width = (display_width(&label_text(panel)) as u16).min(area.width);
    let lx = cx
        .saturating_sub(width / 2)
        .clamp(area.x, area.right() - width);
    let label = if cy + 1 < area.bottom() {
        Rect::new(lx, cy + 1, width, 1)
    } else {
        Rect::default()
    };
    Some(NodeLayout {
        panel,
        center: (cx, cy),
        halo,
        label,
        hit: union(halo, label),
    })
}

/// Grid offset for a normalised pointer position.
pub fn parallax_offset(pointer: (f32, f32)) -> (i32, i32) {
    let shift = |v: f32| ((v.clamp(0.0, 1.0) - 0.5) * 2.0 * PARALLAX).round() as i32;
    (shift(pointer.0), shift(pointer.1))
}

fn render_grid(ctx: &ViewContext<'_>, buf: &mut Buffer, area: Rect) {
    let (dx, dy) = parallax_offset(ctx.pointer);
    let dot = Cell::from_char('·').with_fg(ctx.palette.muted);
    buf.push_opacity(GRID_OPACITY);
    for row in 0..area.height {
        if (i32::from(row) + dy).rem_euclid(GRID_STEP_Y) != 0 {
            continue;
        }
        for col in 0..area.width {
            if (i32::from(col) + dx).rem_euclid(GRID_STEP_X) == 0 {
                buf.set(area.x + col, area.y + row, dot);
            }
        }
    }
    buf.pop_opacity();
}

fn render_node(ctx: &ViewContext<'_>, buf: &mut Buffer, node: &NodeLayout) {
    let color = node.panel.accent();
    let hovered = ctx.nav.label() == node.panel.label();
    buf.push_opacity(if hovered { 1.0 } else { IDLE_OPACITY });

    let (cx, cy) = node.center;
    let halo = Cell::default().with_fg(color.with_opacity(0.3 + 0.5 * ctx.pulse));
    buf.push_scissor(node.halo);
    buf.fill(node.halo, Cell::from_char(' '));
    buf.set(cx.saturating_sub(2), cy, halo.with_char('('));
    buf.set(cx + 2, cy, halo.with_char(')'));
    let core = if hovered { '◉' } else { '●' };
    buf.set(cx, cy, Cell::from_char(core).with_fg(color).with_flags(StyleFlags::BOLD));
    buf.pop_scissor();

    if !node.label.is_empty() {
        let mut cell = Cell::from_char(' ').with_fg(PackedRgba::WHITE).with_bg(LABEL_BG);
        if hovered {
            cell = cell.with_flags(StyleFlags::BOLD);
        }
        buf.fill(node.label, cell);
        buf.print_text_clipped(node.label.x, node.label.y, &label_text(node.panel), cell, node.label.right());
    }
    buf.pop_opacity();
}

pub fn render(ctx: &ViewContext<'_>, buf: &mut Buffer, area: Rect) {
    let palette = ctx.palette;
    render_grid(ctx, buf, area);

    buf.print_text_clipped(
        area.x + 2,
        area.y + 1,
        PanelId::Map.title(),
        Cell::default().with_fg(palette.fg).with_flags(StyleFlags::BOLD),
        area.right(),
    );

    let toggle = theme_toggle_rect(area);
    if !toggle.is_empty() {
        let icon = if ctx.nav.theme().is_dark() { "[ ☀ ]" } else { "[ ☾ ]" };
        let cell = Cell::from_char(' ').with_fg(palette.fg).with_bg(palette.border);
        buf.fill(toggle, cell);
        buf.print_text_clipped(toggle.x, toggle.y, icon, cell, toggle.right());
    }

    for panel in PanelId::CONTENT {
        if let Some(node) = node_layout(panel, area) {
            render_node(ctx, buf, &node);
        }
    }

    let mut hint = delay(HINT_DELAY, Fade::new(HINT_FADE));
    hint.tick(ctx.mounted_for);
    if hint.value() > 0.0 && area.height >= 3 {
        let y = area.bottom() - 2;
        buf.push_opacity(hint.value());
        let muted = Cell::default().with_fg(palette.muted);
        let end = buf.print_text_clipped(area.x + 2, y, HINT, muted, area.right());
        let legend_width = display_width(LEGEND) as u16;
        if area.right() > end + legend_width + 4 {
            buf.print_text(area.right() - legend_width - 2, y, LEGEND, muted);
        }
        buf.pop_opacity();
    }
}

pub fn register_hits(area: Rect, hits: &mut HitMap) {
    for panel in PanelId::CONTENT {
        if let Some(node) = node_layout(panel, area) {
            hits.push(node.hit, Target::HubNode(panel));
        }
    }
    hits.push(theme_toggle_rect(area), Target::ThemeToggle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::test_support::Fixture;

    #[test]
    fn nodes_follow_fractional_positions() {
        let area = Rect::from_size(101, 41);
        let Some(about) = node_layout(PanelId::About, area) else {
            panic!("about has no node");
        };
        assert_eq!(about.center, (25, 12));
        let Some(contact) = node_layout(PanelId::Contact, area) else {
            panic!("contact has no node");
        };
        assert_eq!(contact.center, (80, 30));
        assert!(node_layout(PanelId::Map, area).is_none());
    }

    #[test]
    fn node_hits_stay_inside_area() {
        for (w, h) in [(20, 6), (80, 24), (200, 60), (7, 3)] {
            let area = Rect::from_size(w, h);
            for panel in PanelId::CONTENT {
                if let Some(node) = node_layout(panel, area) {
                    assert_eq!(area.intersection(&node.hit), node.hit, "{panel} at {w}x{h}");
                    assert!(node.hit.contains(node.center.0, node.center.1));
                }
            }
        }
    }

    #[test]
    fn clicking_a_node_center_hits_it() {
        let area = Rect::from_size(120, 40);
        let mut hits = HitMap::new();
        register_hits(area, &mut hits);
        for panel in PanelId::CONTENT {
            let Some(node) = node_layout(panel, area) else {
                panic!("{panel} has no node");
            };
            assert_eq!(hits.target_at(node.center.0, node.center.1), Some(Target::HubNode(panel)));
        }
        let toggle = theme_toggle_rect(area);
        assert_eq!(hits.target_at(toggle.x, toggle.y), Some(Target::ThemeToggle));
    }

    #[test]
    fn parallax_is_centred() {
        assert_eq!(parallax_offset((0.5, 0.5)), (0, 0));
        assert_eq!(parallax_offset((0.0, 1.0)), (-2, 2));
    }

    #[test]
    fn hint_appears_after_a_second() {
        let mut fixture = Fixture::on(PanelId::Map);
        fixture.mounted_for = Duration::from_millis(500);
        assert!(!fixture.draw(100, 30).buffer.to_text().contains(HINT));
        fixture.mounted_for = Duration::from_millis(1500);
        let text = fixture.draw(100, 30).buffer.to_text();
        assert!(text.contains(HINT));
        assert!(text.contains("Portfolio Map"));
        assert!(text.contains("Testimonials"));
    }

    #[test]
    fn halo_hides_the_grid() {
        let fixture = Fixture::on(PanelId::Map);
        let frame = fixture.draw(100, 30);
        let Some(node) = node_layout(PanelId::Projects, frame.area()) else {
            panic!("projects has no node");
        };
        let (cx, cy) = node.center;
        let row: String = (cx - 2..=cx + 2)
            .filter_map(|x| frame.buffer.get(x, cy).and_then(|c| c.content.as_char()))
            .collect();
        assert_eq!(row, "( ● )");
    }
}
