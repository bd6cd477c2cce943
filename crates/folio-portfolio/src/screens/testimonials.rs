#![forbid(unsafe_code)]

//! Testimonials panel: quote cards, each a reveal node.

use super::document::{Align, CardSpec, DocBuilder, Document, Tone};
use super::{BACK_LABEL, CONTENT_WIDTH, ViewContext};
use crate::layout::Target;
use crate::panel::PanelId;

pub fn document(ctx: &ViewContext<'_>, width: u16) -> Document {
    let accent = PanelId::Testimonials.accent();
    let mut doc = DocBuilder::new(width, CONTENT_WIDTH);
    doc.text(PanelId::Testimonials.title(), Tone::Accent(accent), Align::Center);
    doc.gap(1);
    let cards = ctx
        .content
        .testimonials
        .iter()
        .map(|t| {
            let card = CardSpec::new(&t.name, format!("“{}”", t.quote), accent)
                .meta(format!("{}, {}", t.role, t.company));
            (card, None)
        })
        .collect();
    let columns = if doc.width() >= 60 { 2 } else { 1 };
    doc.card_grid(cards, columns, true);
    doc.gap(1);
    doc.button(BACK_LABEL, None, false, Target::BackToMap);
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::test_support::Fixture;

    #[test]
    fn every_testimonial_is_a_reveal_node() {
        let fixture = Fixture::on(PanelId::Testimonials);
        let doc = document(&fixture.ctx(), 100);
        assert_eq!(doc.reveal_count, 4);
        let tops = doc.reveal_tops(0);
        // Two per row when wide.
        assert_eq!(tops[0], tops[1]);
        assert!(tops[2] > tops[0]);
    }

    #[test]
    fn revealed_card_shows_role_and_company() {
        let mut fixture = Fixture::on(PanelId::Testimonials);
        let doc = document(&fixture.ctx(), 100);
        fixture.reveal.arm(1, doc.reveal_count);
        fixture.reveal.scan(&doc.reveal_tops(0), 100);
        let text = fixture.draw(100, 40).buffer.to_text();
        assert!(text.contains("Marketing Director, Brand Co"));
    }
}
