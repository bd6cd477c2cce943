#![forbid(unsafe_code)]

//! Contact panel: the form, its send button, and the social labels.

use folio_render::cell::PackedRgba;

use super::document::{Align, DocBuilder, Document, Tone};
use super::{BACK_LABEL, ViewContext};
use crate::contact::{Field, FormFocus};
use crate::layout::Target;
use crate::panel::PanelId;

const INVITE: &str = "Interested in working together? Feel free to reach out using the form below.";

pub const SEND_LABEL: &str = "Send Message";

pub const SOCIALS: [&str; 4] = ["GitHub", "Instagram", "Twitter", "LinkedIn"];

const FORM_WIDTH: u16 = 52;
const SEND_ACCENT: PackedRgba = PackedRgba::rgb(0x7c, 0x3a, 0xed);

pub fn document(ctx: &ViewContext<'_>, width: u16) -> Document {
    let mut doc = DocBuilder::new(width, FORM_WIDTH);
    doc.text(PanelId::Contact.title(), Tone::Accent(PanelId::Contact.accent()), Align::Center);
    doc.gap(1);
    doc.text(INVITE, Tone::Muted, Align::Center);
    doc.gap(1);
    for field in Field::ALL {
        doc.input(field);
    }
    let send_focused = ctx.form.focus() == FormFocus::Send;
    doc.button(SEND_LABEL, Some(SEND_ACCENT), send_focused, Target::FormInput(FormFocus::Send));
    doc.text(&SOCIALS.join("   "), Tone::Muted, Align::Center);
    doc.gap(1);
    doc.button(BACK_LABEL, None, false, Target::BackToMap);
    doc.finish()
}
