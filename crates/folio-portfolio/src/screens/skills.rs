#![forbid(unsafe_code)]

//! Skills panel: one level bar per skill, growing in with a 200 ms stagger.

use std::time::Duration;

use folio_core::animation::{Animation, Fade, delay, ease_out};

use super::document::{Align, DocBuilder, Document, Tone};
use super::{BACK_LABEL, CONTENT_WIDTH, ViewContext};
use crate::content::record_color;
use crate::layout::Target;
use crate::panel::PanelId;

/// Delay between consecutive bars starting to grow.
pub const BAR_STAGGER: Duration = Duration::from_millis(200);

/// Time one bar takes to reach its level.
pub const BAR_GROWTH: Duration = Duration::from_secs(1);

/// Filled fraction of bar `index` at `level` percent, `elapsed` after mount.
pub fn bar_fill(index: usize, level: u8, elapsed: Duration) -> f32 {
    let mut bar = delay(BAR_STAGGER * index as u32, Fade::new(BAR_GROWTH).easing(ease_out));
    bar.tick(elapsed);
    f32::from(level.min(100)) / 100.0 * bar.value()
}

pub fn document(ctx: &ViewContext<'_>, width: u16) -> Document {
    let mut doc = DocBuilder::new(width, CONTENT_WIDTH);
    doc.text(PanelId::Skills.title(), Tone::Accent(PanelId::Skills.accent()), Align::Center);
    doc.gap(1);
    for (index, skill) in ctx.content.skills.iter().enumerate() {
        let color = record_color(&skill.color, PanelId::Skills.accent());
        doc.meter(&skill.name, skill.level, bar_fill(index, skill.level, ctx.mounted_for), color);
    }
    doc.gap(1);
    doc.button(BACK_LABEL, None, false, Target::BackToMap);
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::document::BlockKind;
    use crate::screens::test_support::Fixture;

    #[test]
    fn bars_are_staggered() {
        let t = Duration::from_millis(300);
        assert!(bar_fill(0, 90, t) > 0.0);
        assert!(bar_fill(1, 90, t) > 0.0);
        assert_eq!(bar_fill(2, 90, t), 0.0);
        assert!(bar_fill(0, 90, t) > bar_fill(1, 90, t));
    }

    #[test]
    fn bars_settle_at_level() {
        let done = BAR_STAGGER * 10 + BAR_GROWTH;
        assert!((bar_fill(4, 70, done) - 0.7).abs() < 1e-6);
        assert_eq!(bar_fill(0, 0, done), 0.0);
    }

    #[test]
    fn one_meter_per_skill() {
        let fixture = Fixture::on(PanelId::Skills);
        let doc = document(&fixture.ctx(), 80);
        let meters = doc
            .blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Meter { .. }))
            .count();
        assert_eq!(meters, fixture.content.skills.len());
        assert_eq!(doc.reveal_count, 0);
    }

    #[test]
    fn percentages_are_drawn() {
        let fixture = Fixture::on(PanelId::Skills);
        let text = fixture.draw(80, 30).buffer.to_text();
        assert!(text.contains("Frontend Development"));
        assert!(text.contains("90%"));
    }
}
