#![forbid(unsafe_code)]

//! Reveal-on-scroll through the app: settle timing, cancellation on panel
//! change, and monotonic flags under scrolling.

use std::time::Duration;

use folio_core::event::{Event, KeyCode, MouseEvent, MouseEventKind};
use folio_portfolio::app::{AppConfig, AppModel, AppMsg, SETTLE_SUB_BASE};
use folio_portfolio::content::Content;
use folio_portfolio::input::Intent;
use folio_portfolio::panel::PanelId;
use folio_portfolio::reveal::{REVEAL_FADE, SETTLE_DELAY};
use folio_portfolio::screens::loading::LOADING_DURATION;
use folio_runtime::ProgramSimulator;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn booted(width: u16, height: u16) -> ProgramSimulator<AppModel> {
    let mut sim = ProgramSimulator::new(AppModel::new(AppConfig::default(), Content::builtin()));
    sim.init();
    sim.inject_event(Event::Resize { width, height });
    sim.advance(LOADING_DURATION);
    sim
}

fn go(sim: &mut ProgramSimulator<AppModel>, panel: PanelId) {
    sim.send(AppMsg::Intent(Intent::GoTo(panel)));
}

fn revealed(sim: &ProgramSimulator<AppModel>) -> Vec<bool> {
    let reveal = &sim.model().reveal;
    (0..reveal.node_count()).map(|i| reveal.is_revealed(i)).collect()
}

#[test]
fn first_scan_waits_for_settle_delay() {
    let mut sim = booted(100, 40);
    go(&mut sim, PanelId::Testimonials);
    assert_eq!(sim.model().reveal.revealed_count(), 0);
    sim.advance(SETTLE_DELAY - ms(1));
    assert_eq!(sim.model().reveal.revealed_count(), 0);
    sim.advance(ms(1));
    assert!(sim.model().reveal.revealed_count() > 0);
    assert!(!sim.model().reveal.awaiting_settle());
}

#[test]
fn panel_change_cancels_pending_settle() {
    let mut sim = booted(100, 40);
    go(&mut sim, PanelId::Testimonials);
    let first = SETTLE_SUB_BASE + sim.model().nav.generation();
    assert!(sim.active_subscriptions().contains(&first));
    sim.advance(ms(50));
    go(&mut sim, PanelId::Map);
    assert!(!sim.active_subscriptions().contains(&first));
    go(&mut sim, PanelId::Testimonials);
    sim.advance(ms(60));
    assert_eq!(sim.model().reveal.revealed_count(), 0, "old settle must not fire");
    sim.advance(ms(40));
    assert!(sim.model().reveal.revealed_count() > 0);
}

#[test]
fn reveals_fade_in() {
    let mut sim = booted(100, 40);
    go(&mut sim, PanelId::Projects);
    sim.advance(SETTLE_DELAY);
    assert!(sim.model().reveal.is_revealed(0));
    assert!(sim.model().reveal.opacity(0) < 1.0);
    sim.advance(REVEAL_FADE + ms(33));
    assert_eq!(sim.model().reveal.opacity(0), 1.0);
}

#[test]
fn flags_survive_scrolling_back_out_of_view() {
    let mut sim = booted(100, 16);
    go(&mut sim, PanelId::About);
    sim.advance(SETTLE_DELAY);
    let settled = revealed(&sim);

    sim.inject_event(Event::key(KeyCode::End));
    let after_end = revealed(&sim);
    assert!(
        after_end.iter().filter(|r| **r).count() > settled.iter().filter(|r| **r).count(),
        "scrolling to the end reveals the timeline"
    );

    for _ in 0..10 {
        sim.inject_event(Event::key(KeyCode::Home));
        let now = revealed(&sim);
        for (i, was) in after_end.iter().enumerate() {
            if *was {
                assert!(now[i], "node {i} was hidden again");
            }
        }
    }
}

#[test]
fn wheel_scroll_scans() {
    let mut sim = booted(100, 16);
    go(&mut sim, PanelId::Testimonials);
    sim.advance(SETTLE_DELAY);
    let before = sim.model().reveal.revealed_count();
    for _ in 0..20 {
        sim.inject_event(Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 50, 8)));
    }
    assert!(sim.model().scroll > 0);
    assert!(sim.model().reveal.revealed_count() >= before);
    assert_eq!(
        sim.model().reveal.revealed_count(),
        sim.model().reveal.node_count(),
        "every card passes the threshold on the way down"
    );
}
