#![forbid(unsafe_code)]

//! Reveal-on-Scroll Observer.
//!
//! Tracks the marked nodes of the mounted panel. A scan reveals every node
//! whose top edge (in viewport rows) is above [`REVEAL_THRESHOLD`] of the
//! viewport height. A revealed node stays revealed until the observer is
//! re-armed for another mount; scans never hide anything.
//!
//! The observer is armed per mount generation. A settle scan requested for
//! an older generation is ignored, and a disarmed observer ignores scans.

use std::time::Duration;

use folio_core::animation::{Animation, Fade, ease_out};

/// Fraction of the viewport height a node's top must be above to reveal.
pub const REVEAL_THRESHOLD: f32 = 0.8;

/// Delay between a mount and its first scan.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Fade-in played by a node once revealed.
pub const REVEAL_FADE: Duration = Duration::from_millis(400);

/// Whether a node whose top is `top` rows into a `viewport_height` tall view is visible enough.
pub fn passes_threshold(top: i32, viewport_height: u16) -> bool {
    (top as f32) < REVEAL_THRESHOLD * f32::from(viewport_height)
}

#[derive(Debug, Clone, Default)]
pub struct RevealObserver {
    generation: Option<u64>,
    settled: bool,
    nodes: Vec<Option<Fade>>,
}

impl RevealObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing a fresh mount with `node_count` hidden nodes.
    pub fn arm(&mut self, generation: u64, node_count: usize) {
        self.generation = Some(generation);
        self.settled = false;
        self.nodes.clear();
        self.nodes.resize(node_count, None);
        tracing::trace!(target: "folio.reveal", generation, node_count, "observer armed");
    }

    /// Stop observing. Later scans are ignored until the next `arm`.
    pub fn disarm(&mut self) {
        if let Some(generation) = self.generation.take() {
            tracing::trace!(target: "folio.reveal", generation, "observer disarmed");
        }
        self.settled = false;
        self.nodes.clear();
    }

    pub fn is_armed(&self) -> bool {
        self.generation.is_some()
    }

    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// Armed and still waiting for the settle scan.
    pub fn awaiting_settle(&self) -> bool {
        self.generation.is_some() && !self.settled
    }

    /// The delayed first scan for mount `generation`.
    ///
    /// Ignored if the observer has since been re-armed or disarmed.
    pub fn settle(&mut self, generation: u64, tops: &[i32], viewport_height: u16) -> usize {
        if self.generation != Some(generation) {
            tracing::debug!(target: "folio.reveal", generation, "stale settle ignored");
            return 0;
        }
        self.settled = true;
        self.scan(tops, viewport_height)
    }

    /// Reveal every hidden node that passes the threshold. Returns how many were newly revealed.
    ///
    /// `tops[i]` is node `i`'s top edge relative to the viewport.
    pub fn scan(&mut self, tops: &[i32], viewport_height: u16) -> usize {
        if self.generation.is_none() {
            return 0;
        }
        if tops.len() > self.nodes.len() {
            self.nodes.resize(tops.len(), None);
        }
        let mut newly = 0;
        for (node, &top) in self.nodes.iter_mut().zip(tops) {
            if node.is_none() && passes_threshold(top, viewport_height) {
                *node = Some(Fade::new(REVEAL_FADE).easing(ease_out));
                newly += 1;
            }
        }
        if newly > 0 {
            tracing::debug!(target: "folio.reveal", newly, total = self.revealed_count(), "nodes revealed");
        }
        newly
    }

    /// Advance the fade-ins of revealed nodes.
    pub fn advance(&mut self, dt: Duration) {
        for fade in self.nodes.iter_mut().flatten() {
            if !fade.is_complete() {
                fade.tick(dt);
            }
        }
    }

    /// Any revealed node still fading in.
    pub fn is_animating(&self) -> bool {
        self.nodes.iter().flatten().any(|f| !f.is_complete())
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        matches!(self.nodes.get(index), Some(Some(_)))
    }

    /// Fade progress of node `index`; 0.0 while hidden.
    pub fn opacity(&self, index: usize) -> f32 {
        match self.nodes.get(index) {
            Some(Some(fade)) => fade.value(),
            _ => 0.0,
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn threshold_is_exclusive() {
        assert!(passes_threshold(15, 20));
        assert!(!passes_threshold(16, 20));
        assert!(passes_threshold(-40, 20));
    }

    #[test]
    fn disarmed_observer_ignores_scans() {
        let mut obs = RevealObserver::new();
        assert_eq!(obs.scan(&[0, 1], 20), 0);
        obs.arm(1, 2);
        obs.disarm();
        assert_eq!(obs.scan(&[0, 1], 20), 0);
        assert!(!obs.is_revealed(0));
    }

    #[test]
    fn settle_for_old_generation_is_ignored() {
        let mut obs = RevealObserver::new();
        obs.arm(1, 2);
        obs.arm(2, 2);
        assert_eq!(obs.settle(1, &[0, 0], 20), 0);
        assert!(obs.awaiting_settle());
        assert_eq!(obs.settle(2, &[0, 30], 20), 1);
        assert!(!obs.awaiting_settle());
        assert!(obs.is_revealed(0));
        assert!(!obs.is_revealed(1));
    }

    #[test]
    fn revealed_nodes_fade_in() {
        let mut obs = RevealObserver::new();
        obs.arm(3, 1);
        obs.scan(&[2], 10);
        assert_eq!(obs.opacity(0), 0.0);
        assert!(obs.is_animating());
        obs.advance(REVEAL_FADE);
        assert!((obs.opacity(0) - 1.0).abs() < 1e-6);
        assert!(!obs.is_animating());
    }

    #[test]
    fn rearm_hides_everything() {
        let mut obs = RevealObserver::new();
        obs.arm(1, 3);
        obs.scan(&[0, 0, 0], 10);
        assert_eq!(obs.revealed_count(), 3);
        obs.arm(2, 3);
        assert_eq!(obs.revealed_count(), 0);
    }

    #[test]
    fn ten_scans_out_of_view_keep_flag() {
        let mut obs = RevealObserver::new();
        obs.arm(1, 1);
        obs.scan(&[3], 20);
        for i in 0..10 {
            obs.scan(&[100 + i], 20);
        }
        assert!(obs.is_revealed(0));
    }

    proptest! {
        #[test]
        fn flags_are_monotonic(
            scans in proptest::collection::vec(proptest::collection::vec(-50i32..100, 6), 1..30),
            height in 1u16..60,
        ) {
            let mut obs = RevealObserver::new();
            obs.arm(9, 6);
            let mut seen = [false; 6];
            for tops in &scans {
                obs.scan(tops, height);
                for (i, was) in seen.iter_mut().enumerate() {
                    let now = obs.is_revealed(i);
                    prop_assert!(now || !*was, "node {} was hidden again", i);
                    if passes_threshold(tops[i], height) {
                        prop_assert!(now);
                    }
                    *was = now;
                }
            }
        }
    }
}
