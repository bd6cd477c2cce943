#![forbid(unsafe_code)]

//! About panel: bio, two highlight cards, and the experience timeline.
//!
//! Timeline entries are reveal nodes.

use folio_render::cell::PackedRgba;

use super::document::{Align, CardSpec, DocBuilder, Document, Tone};
use super::{BACK_LABEL, CONTENT_WIDTH, ViewContext};
use crate::layout::Target;
use crate::panel::PanelId;

const LEAD: &str = "I'm a creative developer with a passion for building interactive digital experiences that surprise and delight users.";

const EXPERTISE: &str = "With expertise spanning frontend development, UX design, and creative coding, I blur the lines between technology and art to create memorable web experiences.";

const BACKGROUND: &str = "7+ years of experience in web development and interactive media, with a background in computer science and design.";

const APPROACH: &str = "I combine technical expertise with creative exploration to build projects that push boundaries while solving real problems.";

const BACKGROUND_ACCENT: PackedRgba = PackedRgba::rgb(0x63, 0x66, 0xf1);
const APPROACH_ACCENT: PackedRgba = PackedRgba::rgb(0xec, 0x48, 0x99);
const TIMELINE_ACCENT: PackedRgba = PackedRgba::rgb(0xa8, 0x55, 0xf7);

pub fn document(ctx: &ViewContext<'_>, width: u16) -> Document {
    let mut doc = DocBuilder::new(width, CONTENT_WIDTH);
    doc.text(PanelId::About.title(), Tone::Accent(PanelId::About.accent()), Align::Center);
    doc.gap(1);
    doc.text(LEAD, Tone::Body, Align::Center);
    doc.gap(1);
    doc.text(EXPERTISE, Tone::Muted, Align::Center);
    doc.gap(1);

    let columns = if doc.width() >= 56 { 2 } else { 1 };
    doc.card_grid(
        vec![
            (CardSpec::new("Background", BACKGROUND, BACKGROUND_ACCENT), None),
            (CardSpec::new("Approach", APPROACH, APPROACH_ACCENT), None),
        ],
        columns,
        false,
    );

    doc.gap(1);
    doc.text("Experience Timeline", Tone::Heading, Align::Center);
    doc.gap(1);
    for item in &ctx.content.experience {
        let card = CardSpec::new(&item.title, &item.description, TIMELINE_ACCENT)
            .badge(&item.year)
            .meta(&item.company);
        doc.card(card, true, None);
    }
    doc.gap(1);
    doc.button(BACK_LABEL, None, false, Target::BackToMap);
    doc.finish()
}
