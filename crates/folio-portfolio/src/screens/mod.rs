#![forbid(unsafe_code)]

//! Panel Renderer.
//!
//! One module per panel. Intro and map are positioned freely in the panel
//! area; the content panels build a [`Document`] and scroll it. Rendering
//! and hit registration go through the same layout functions.

pub mod about;
pub mod contact;
pub mod document;
pub mod intro;
pub mod loading;
pub mod map;
pub mod projects;
pub mod skills;
pub mod testimonials;

use std::time::Duration;

use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::Cell;
use folio_render::frame::Frame;

use crate::contact::ContactForm;
use crate::content::Content;
use crate::layout::HitMap;
use crate::nav::SectionMachine;
use crate::panel::PanelId;
use crate::reveal::RevealObserver;
use crate::theme::Palette;

pub use document::{Document, DocStyle};

/// Widest column content panels use.
pub const CONTENT_WIDTH: u16 = 72;

pub const BACK_LABEL: &str = "Back to Map";

/// Everything a panel reads while drawing. Borrowed from the app model per frame.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub nav: &'a SectionMachine,
    pub content: &'a Content,
    pub form: &'a ContactForm,
    pub reveal: &'a RevealObserver,
    pub palette: Palette,
    /// Keyboard-focused project card.
    pub card_focus: usize,
    pub scroll: u16,
    /// Time since the active panel mounted.
    pub mounted_for: Duration,
    /// Hub halo pulse, 0.0 to 1.0.
    pub pulse: f32,
    /// Normalised pointer position.
    pub pointer: (f32, f32),
}

impl<'a> ViewContext<'a> {
    pub fn doc_style(&self) -> DocStyle<'a> {
        DocStyle {
            palette: self.palette,
            reveal: self.reveal,
            form: self.form,
        }
    }

    pub fn overlay_open(&self) -> bool {
        self.nav.active() == PanelId::Projects && self.nav.selected().is_some()
    }
}

/// Document of the active content panel at `width` columns. `None` for intro and map.
pub fn document(ctx: &ViewContext<'_>, width: u16) -> Option<Document> {
    match ctx.nav.active() {
        PanelId::About => Some(about::document(ctx, width)),
        PanelId::Projects => Some(projects::document(ctx, width)),
        PanelId::Skills => Some(skills::document(ctx, width)),
        PanelId::Testimonials => Some(testimonials::document(ctx, width)),
        PanelId::Contact => Some(contact::document(ctx, width)),
        PanelId::Intro | PanelId::Map => None,
    }
}

/// Draw the active panel into `area`.
pub fn render(ctx: &ViewContext<'_>, frame: &mut Frame, area: Rect) {
    if area.is_empty() {
        return;
    }
    match ctx.nav.active() {
        PanelId::Intro => intro::render(ctx, &mut frame.buffer, area),
        PanelId::Map => map::render(ctx, &mut frame.buffer, area),
        panel => {
            let Some(doc) = document(ctx, area.width) else {
                return;
            };
            doc.render(&ctx.doc_style(), &mut frame.buffer, area, ctx.scroll);
            draw_scrollbar(&mut frame.buffer, area, ctx.scroll, doc.height, ctx.palette);
            if panel == PanelId::Contact {
                frame.set_cursor(doc.cursor_for(ctx.form, area, ctx.scroll));
            }
            if ctx.overlay_open() {
                projects::render_overlay(ctx, &mut frame.buffer, area);
            }
        }
    }
}

/// Click targets of the active panel, in paint order.
pub fn hit_map(ctx: &ViewContext<'_>, area: Rect) -> HitMap {
    let mut hits = HitMap::new();
    if area.is_empty() {
        return hits;
    }
    match ctx.nav.active() {
        PanelId::Intro => intro::register_hits(ctx, area, &mut hits),
        PanelId::Map => map::register_hits(area, &mut hits),
        _ => {
            if let Some(doc) = document(ctx, area.width) {
                doc.register_hits(area, ctx.scroll, &mut hits);
            }
            if ctx.overlay_open() {
                projects::register_overlay_hits(ctx, area, &mut hits);
            }
        }
    }
    hits
}

/// Thumb on the right edge when the document is taller than the view.
fn draw_scrollbar(buf: &mut Buffer, area: Rect, scroll: u16, content_height: u16, palette: Palette) {
    if content_height <= area.height || area.width == 0 {
        return;
    }
    let x = area.right() - 1;
    let track = u32::from(area.height);
    let total = u32::from(content_height);
    let thumb = (track * track / total).max(1) as u16;
    let max_scroll = content_height - area.height;
    let travel = area.height - thumb;
    let offset = (u32::from(scroll.min(max_scroll)) * u32::from(travel) / u32::from(max_scroll.max(1))) as u16;
    for y in 0..area.height {
        let lit = y >= offset && y < offset + thumb;
        let cell = if lit {
            Cell::from_char('┃').with_fg(palette.muted)
        } else {
            Cell::from_char('│').with_fg(palette.grid)
        };
        buf.set(x, area.y + y, cell);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::theme::Theme;

    /// Owned state a [`ViewContext`] can borrow from in tests.
    pub struct Fixture {
        pub nav: SectionMachine,
        pub content: Content,
        pub form: ContactForm,
        pub reveal: RevealObserver,
        pub scroll: u16,
        pub card_focus: usize,
        pub mounted_for: Duration,
    }

    impl Fixture {
        pub fn on(panel: PanelId) -> Self {
            let content = Content::builtin();
            let mut nav = SectionMachine::new(content.projects.len());
            nav.go_to(panel, None);
            Self {
                nav,
                content,
                form: ContactForm::new(),
                reveal: RevealObserver::new(),
                scroll: 0,
                card_focus: 0,
                mounted_for: Duration::from_secs(5),
            }
        }

        pub fn ctx(&self) -> ViewContext<'_> {
            ViewContext {
                nav: &self.nav,
                content: &self.content,
                form: &self.form,
                reveal: &self.reveal,
                palette: Theme::Light.palette(),
                card_focus: self.card_focus,
                scroll: self.scroll,
                mounted_for: self.mounted_for,
                pulse: 0.5,
                pointer: (0.5, 0.5),
            }
        }

        pub fn draw(&self, width: u16, height: u16) -> Frame {
            let mut frame = Frame::new(width, height);
            let area = frame.area();
            render(&self.ctx(), &mut frame, area);
            frame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use crate::layout::Target;

    #[test]
    fn every_content_panel_has_a_back_button() {
        for panel in PanelId::CONTENT {
            let fixture = Fixture::on(panel);
            let doc = document(&fixture.ctx(), 80);
            let Some(doc) = doc else {
                panic!("{panel} has no document");
            };
            assert!(doc.block_for(Target::BackToMap).is_some(), "{panel}");
        }
        assert!(document(&Fixture::on(PanelId::Map).ctx(), 80).is_none());
    }

    #[test]
    fn overlay_backdrop_covers_panel() {
        let mut fixture = Fixture::on(PanelId::Projects);
        fixture.nav.select_item(1);
        let area = Rect::from_size(80, 30);
        let hits = hit_map(&fixture.ctx(), area);
        assert_eq!(hits.target_at(0, 0), Some(Target::Backdrop));
        let Some(close) = hits.rect_of(Target::ModalClose) else {
            panic!("close button not registered");
        };
        assert_eq!(hits.target_at(close.x, close.y), Some(Target::ModalClose));
    }

    #[test]
    fn contact_places_cursor_in_focused_field() {
        let fixture = Fixture::on(PanelId::Contact);
        let frame = fixture.draw(80, 40);
        assert!(frame.cursor_position.is_some());
        assert!(Fixture::on(PanelId::About).draw(80, 40).cursor_position.is_none());
    }

    #[test]
    fn long_documents_show_a_scrollbar() {
        let fixture = Fixture::on(PanelId::About);
        let frame = fixture.draw(80, 12);
        let right: String = (0..12)
            .filter_map(|y| frame.buffer.get(79, y).and_then(|c| c.content.as_char()))
            .collect();
        assert!(right.contains('┃'));
    }
}
