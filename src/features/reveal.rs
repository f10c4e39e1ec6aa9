//! Scroll-triggered reveals that play once a marker is crossed and play
//! backwards when the visitor scrolls back above it.
//!
//! Unlike a scrubbed region, the animation runs on its own clock; scroll
//! position only decides which way it plays.

use crate::motion::anim::{clamp01, ease_out_quad, ease_out_quart, lerp};
use crate::motion::scroll::{Geometry, ScrollMarker};
use anyhow::{ensure, Result};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealStyle {
    /// Words slide up from below their line, staggered.
    Words { stagger: f32 },
    /// One block rises `rise` px while fading in.
    Block { rise: f32 },
}

#[derive(Debug, Clone)]
pub struct ToggleReveal {
    marker: ScrollMarker,
    style: RevealStyle,
    items: usize,
    /// Seconds each item takes.
    duration: f32,
    playhead: f32,
    direction: f32,
    entered: bool,
}

impl ToggleReveal {
    pub fn new(
        marker: ScrollMarker,
        style: RevealStyle,
        items: usize,
        duration: f32,
    ) -> Result<Self> {
        ensure!(items > 0, "a reveal needs at least one item");
        ensure!(
            duration.is_finite() && duration > 0.0,
            "reveal duration must be positive, got {duration}"
        );
        if let RevealStyle::Words { stagger } = style {
            ensure!(stagger.is_finite() && stagger >= 0.0, "bad word stagger {stagger}");
        }
        Ok(Self {
            marker,
            style,
            items,
            duration,
            playhead: 0.0,
            direction: 0.0,
            entered: false,
        })
    }

    /// Headline words: `top 85%`, one second per word, 30 ms apart.
    pub fn text(words: usize) -> Result<Self> {
        let style = RevealStyle::Words { stagger: 0.03 };
        Self::new("top 85%".parse()?, style, words.max(1), 1.0)
    }

    /// Story block: `top 70%`, rising 100 px over one second.
    pub fn story() -> Result<Self> {
        Self::new("top 70%".parse()?, RevealStyle::Block { rise: 100.0 }, 1, 1.0)
    }

    fn total(&self) -> f32 {
        match self.style {
            RevealStyle::Words { stagger } => self.duration + stagger * (self.items - 1) as f32,
            RevealStyle::Block { .. } => self.duration,
        }
    }

    /// Plays forward on crossing the marker downwards, backwards on
    /// crossing it upwards. Leaving past the bottom changes nothing.
    pub fn observe(&mut self, geometry: Geometry) {
        let passed = self.marker.is_passed(geometry);
        if passed != self.entered {
            self.entered = passed;
            self.direction = if passed { 1.0 } else { -1.0 };
            debug!("reveal {}", if passed { "playing" } else { "reversing" });
        }
    }

    pub fn step(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.playhead = (self.playhead + self.direction * dt).clamp(0.0, self.total());
        }
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// Whole-animation progress in [0, 1].
    pub fn progress(&self) -> f32 {
        clamp01(self.playhead / self.total())
    }

    /// Eased progress of item `index`.
    pub fn item_progress(&self, index: usize) -> f32 {
        let (offset, ease): (f32, fn(f32) -> f32) = match self.style {
            RevealStyle::Words { stagger } => (stagger * index as f32, ease_out_quart),
            RevealStyle::Block { .. } => (0.0, ease_out_quad),
        };
        ease(clamp01((self.playhead - offset) / self.duration))
    }

    /// Vertical offset of item `index`: percent of its line for words,
    /// pixels for a block.
    pub fn item_y(&self, index: usize) -> f32 {
        let from = match self.style {
            RevealStyle::Words { .. } => 100.0,
            RevealStyle::Block { rise } => rise,
        };
        lerp(from, 0.0, self.item_progress(index))
    }

    pub fn opacity(&self) -> f32 {
        match self.style {
            RevealStyle::Words { .. } => 1.0,
            RevealStyle::Block { .. } => self.item_progress(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VH: f32 = 1000.0;

    fn at(top: f32) -> Geometry {
        Geometry { top, height: 300.0, viewport: VH }
    }

    #[test]
    fn words_wait_for_the_marker_then_stagger_in() {
        let mut reveal = ToggleReveal::text(3).unwrap();
        reveal.observe(at(0.9 * VH));
        reveal.step(0.5);
        assert_eq!(reveal.progress(), 0.0);
        assert_eq!(reveal.item_y(0), 100.0);

        reveal.observe(at(0.8 * VH));
        assert!(reveal.is_entered());
        reveal.step(0.03);
        assert!(reveal.item_y(0) < 100.0);
        // Second word starts 30 ms later.
        assert_eq!(reveal.item_y(1), 100.0);
        reveal.step(0.5);
        assert!(reveal.item_y(0) < reveal.item_y(1));
        assert!(reveal.item_y(1) < reveal.item_y(2));

        reveal.step(1.0);
        assert_eq!(reveal.progress(), 1.0);
        for i in 0..3 {
            assert_eq!(reveal.item_y(i), 0.0);
        }
    }

    #[test]
    fn scrolling_back_above_the_marker_reverses() {
        let mut reveal = ToggleReveal::text(2).unwrap();
        reveal.observe(at(0.5 * VH));
        reveal.step(2.0);
        assert_eq!(reveal.progress(), 1.0);

        // Further down and past the bottom: stays revealed.
        reveal.observe(at(-2.0 * VH));
        reveal.step(1.0);
        assert_eq!(reveal.progress(), 1.0);

        reveal.observe(at(0.95 * VH));
        reveal.step(0.5);
        let halfway = reveal.progress();
        assert!(halfway > 0.0 && halfway < 1.0);
        reveal.step(1.0);
        assert_eq!(reveal.progress(), 0.0);
        assert_eq!(reveal.item_y(1), 100.0);
    }

    #[test]
    fn story_block_rises_and_fades_in_at_seventy_percent() {
        let mut reveal = ToggleReveal::story().unwrap();
        reveal.observe(at(0.75 * VH));
        reveal.step(1.0);
        assert_eq!(reveal.opacity(), 0.0);
        assert_eq!(reveal.item_y(0), 100.0);

        reveal.observe(at(0.7 * VH));
        reveal.step(0.5);
        assert!(reveal.opacity() > 0.5 && reveal.opacity() < 1.0);
        reveal.step(0.5);
        assert_eq!(reveal.opacity(), 1.0);
        assert_eq!(reveal.item_y(0), 0.0);
    }

    #[test]
    fn rejects_empty_or_timeless_reveals() {
        let marker: ScrollMarker = "top 85%".parse().unwrap();
        let words = RevealStyle::Words { stagger: 0.03 };
        assert!(ToggleReveal::new(marker, words, 0, 1.0).is_err());
        assert!(ToggleReveal::new(marker, words, 2, 0.0).is_err());
        let bad = RevealStyle::Words { stagger: -1.0 };
        assert!(ToggleReveal::new(marker, bad, 2, 1.0).is_err());
    }
}
