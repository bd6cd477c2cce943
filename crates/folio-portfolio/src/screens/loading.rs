#![forbid(unsafe_code)]

//! Startup spinner, shown until the loading delay elapses.

use std::time::Duration;

use folio_core::animation::{Animation, Fade, delay};
use folio_core::geometry::Rect;
use folio_render::buffer::Buffer;
use folio_render::cell::{Cell, PackedRgba, StyleFlags};

/// How long the loading screen stays up.
pub const LOADING_DURATION: Duration = Duration::from_millis(1500);

/// The screen fades out over the tail of [`LOADING_DURATION`].
const FADE_DELAY: Duration = Duration::from_millis(1000);
const FADE: Duration = Duration::from_millis(500);

const ARCS: [char; 4] = ['◜', '◝', '◞', '◟'];
const ARC_STEP: Duration = Duration::from_millis(125);
const SPINNER: PackedRgba = PackedRgba::rgb(0xa8, 0x55, 0xf7);

/// Spinner glyph `elapsed` into the loading screen.
pub fn spinner_frame(elapsed: Duration) -> char {
    let step = (elapsed.as_millis() / ARC_STEP.as_millis()) as usize;
    ARCS[step % ARCS.len()]
}

/// Screen opacity `elapsed` into the loading screen.
pub fn opacity(elapsed: Duration) -> f32 {
    let mut fade = delay(FADE_DELAY, Fade::out(FADE));
    fade.tick(elapsed);
    if fade.has_started() { fade.value() } else { 1.0 }
}

pub fn render(elapsed: Duration, buf: &mut Buffer, area: Rect) {
    if area.is_empty() {
        return;
    }
    buf.push_opacity(opacity(elapsed));
    let spot = area.centered(3, 1);
    let ring = Cell::default().with_fg(SPINNER).with_flags(StyleFlags::BOLD);
    buf.set(spot.x, spot.y, ring.with_char('('));
    buf.set(spot.x + 1, spot.y, ring.with_char(spinner_frame(elapsed)));
    buf.set(spot.x + 2, spot.y, ring.with_char(')'));
    buf.pop_opacity();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_cycles() {
        assert_eq!(spinner_frame(Duration::ZERO), '◜');
        assert_eq!(spinner_frame(ARC_STEP), '◝');
        assert_eq!(spinner_frame(ARC_STEP * 4), '◜');
    }

    #[test]
    fn fades_out_at_the_end() {
        assert_eq!(opacity(Duration::from_millis(500)), 1.0);
        let mid = opacity(Duration::from_millis(1250));
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(opacity(LOADING_DURATION), 0.0);
    }
}
