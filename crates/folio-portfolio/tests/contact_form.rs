#![forbid(unsafe_code)]

//! Contact form driven by key events.

use std::time::Duration;

use folio_core::event::{Event, KeyCode};
use folio_portfolio::app::{AppConfig, AppModel, AppMsg};
use folio_portfolio::chrome::TOAST_DURATION;
use folio_portfolio::contact::{Field, FieldError, FormFocus};
use folio_portfolio::content::Content;
use folio_portfolio::input::Intent;
use folio_portfolio::panel::PanelId;
use folio_portfolio::screens::loading::LOADING_DURATION;
use folio_runtime::ProgramSimulator;

fn on_contact() -> ProgramSimulator<AppModel> {
    let mut sim = ProgramSimulator::new(AppModel::new(AppConfig::default(), Content::builtin()));
    sim.init();
    sim.inject_event(Event::Resize {
        width: 100,
        height: 40,
    });
    sim.advance(LOADING_DURATION);
    sim.send(AppMsg::Intent(Intent::GoTo(PanelId::Contact)));
    sim
}

fn type_text(sim: &mut ProgramSimulator<AppModel>, text: &str) {
    for c in text.chars() {
        sim.inject_event(Event::key(KeyCode::Char(c)));
    }
}

fn press(sim: &mut ProgramSimulator<AppModel>, code: KeyCode) {
    sim.inject_event(Event::key(code));
}

#[test]
fn empty_submit_reports_every_field() {
    let mut sim = on_contact();
    press(&mut sim, KeyCode::BackTab);
    assert_eq!(sim.model().form.focus(), FormFocus::Send);
    press(&mut sim, KeyCode::Enter);
    let form = &sim.model().form;
    assert_eq!(form.error(Field::Name), Some(FieldError::Required(Field::Name)));
    assert_eq!(form.error(Field::Email), Some(FieldError::Required(Field::Email)));
    assert_eq!(form.error(Field::Message), Some(FieldError::Required(Field::Message)));
    assert!(sim.model().toast.is_none());
    assert!(sim.logs().is_empty());
}

#[test]
fn typing_clears_the_fields_error() {
    let mut sim = on_contact();
    press(&mut sim, KeyCode::BackTab);
    press(&mut sim, KeyCode::Enter);
    press(&mut sim, KeyCode::Tab);
    assert_eq!(sim.model().form.focus(), FormFocus::Name);
    type_text(&mut sim, "Ada");
    assert_eq!(sim.model().form.error(Field::Name), None);
    assert!(sim.model().form.error(Field::Email).is_some());
}

#[test]
fn letters_type_instead_of_acting() {
    let mut sim = on_contact();
    type_text(&mut sim, "qtb");
    assert!(sim.is_running());
    assert_eq!(sim.model().nav.active(), PanelId::Contact);
    assert_eq!(sim.model().form.value(Field::Name), "qtb");
}

#[test]
fn valid_submission_clears_and_toasts() {
    let mut sim = on_contact();
    type_text(&mut sim, "Ada");
    press(&mut sim, KeyCode::Tab);
    type_text(&mut sim, "ada@example.com");
    press(&mut sim, KeyCode::Tab);
    type_text(&mut sim, "Hello there");
    press(&mut sim, KeyCode::Tab);
    press(&mut sim, KeyCode::Enter);

    let form = &sim.model().form;
    assert!(Field::ALL.iter().all(|f| form.value(*f).is_empty()));
    assert!(!form.has_errors());
    assert!(sim.model().toast.is_some());
    assert_eq!(sim.logs().len(), 1);

    let frame = sim.capture_frame(100, 40).to_text();
    assert!(frame.contains("Message sent successfully!"));

    sim.advance(TOAST_DURATION - Duration::from_millis(1));
    assert!(sim.model().toast.is_some());
    sim.advance(Duration::from_millis(1));
    assert!(sim.model().toast.is_none());
}

#[test]
fn bad_email_is_rejected() {
    let mut sim = on_contact();
    type_text(&mut sim, "Ada");
    press(&mut sim, KeyCode::Tab);
    type_text(&mut sim, "ada@example");
    press(&mut sim, KeyCode::Tab);
    type_text(&mut sim, "Hi");
    press(&mut sim, KeyCode::Tab);
    press(&mut sim, KeyCode::Enter);
    assert_eq!(sim.model().form.error(Field::Email), Some(FieldError::InvalidEmail));
    assert_eq!(sim.model().form.value(Field::Name), "Ada");
    assert!(sim.model().toast.is_none());
}
