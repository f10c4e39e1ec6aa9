//! View state for the scripted device mockups.
//!
//! The sequencers only hand out phase names; these types turn a name into
//! the flags a mockup renders from.

use super::sequencer::PhaseSpec;
use crate::motion::anim::{lerp, Timeline};

pub fn default_walk_phases() -> Vec<PhaseSpec> {
    vec![
        PhaseSpec::new("scanning", 3000),
        PhaseSpec::new("walking", 3000),
        PhaseSpec::new("puzzle", 2000),
        PhaseSpec::new("success", 1000),
        PhaseSpec::new("complete", 4000),
        PhaseSpec::new("reset", 500),
    ]
}

pub fn default_story_wall_phases() -> Vec<PhaseSpec> {
    vec![
        PhaseSpec::new("scanning", 3000), // LiDAR sweep
        PhaseSpec::new("reveal", 2000),
        PhaseSpec::new("playing", 4000),
        PhaseSpec::new("outcome", 3000),
        PhaseSpec::new("reset", 500),
    ]
}

pub fn default_breathe_phases() -> Vec<PhaseSpec> {
    vec![PhaseSpec::new("inhale", 4000), PhaseSpec::new("exhale", 4000)]
}

/// Walk-with-me route mockup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkView {
    pub scanning: bool,
    pub game_active: bool,
    pub puzzle_active: bool,
    pub complete: bool,
    pub show_walker: bool,
    /// Fraction of the route path drawn.
    pub path_length: f32,
}

impl WalkView {
    pub fn from_phase(phase: &str) -> Self {
        let game_active = matches!(phase, "walking" | "puzzle" | "success" | "complete");
        Self {
            scanning: phase == "scanning",
            game_active,
            puzzle_active: matches!(phase, "puzzle" | "success"),
            complete: phase == "complete",
            show_walker: phase == "walking",
            path_length: match phase {
                "complete" => 1.0,
                _ if game_active => 0.6,
                _ => 0.0,
            },
        }
    }
}

/// Story-wall AR mockup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryWallView {
    pub scanning: bool,
    pub reveal: bool,
    pub playing: bool,
    pub outcome: bool,
    /// Full-colour artwork instead of the scan wireframe.
    pub vibrant: bool,
    pub scan_overlay: bool,
}

impl StoryWallView {
    pub fn from_phase(phase: &str) -> Self {
        let scanning = phase == "scanning";
        let reset = phase == "reset";
        Self {
            scanning,
            reveal: phase == "reveal",
            playing: phase == "playing",
            outcome: phase == "outcome",
            vibrant: !scanning && !reset,
            scan_overlay: scanning || reset,
        }
    }
}

const INHALE_SCALE: f32 = 1.15;
const EXHALE_SCALE: f32 = 1.0;
const INHALE_GLOW: f32 = 0.6;
const EXHALE_GLOW: f32 = 0.3;

/// Breathing circle. Each phase change eases scale and glow toward the
/// new phase's targets over the phase length.
#[derive(Debug, Clone)]
pub struct Breath {
    inhale: bool,
    tween: Timeline,
    from: [f32; 2],
    to: [f32; 2],
}

impl Breath {
    /// Resting on the exhale targets until the first phase arrives.
    pub fn new() -> Self {
        Self {
            inhale: false,
            tween: Timeline::new(0.0),
            from: [EXHALE_SCALE, EXHALE_GLOW],
            to: [EXHALE_SCALE, EXHALE_GLOW],
        }
    }

    /// Starts easing toward `phase`'s targets over `seconds`.
    pub fn on_phase(&mut self, phase: &str, seconds: f32, now: f32) {
        self.tween.update(now);
        self.from = self.current();
        self.inhale = phase == "inhale";
        self.to = if self.inhale {
            [INHALE_SCALE, INHALE_GLOW]
        } else {
            [EXHALE_SCALE, EXHALE_GLOW]
        };
        self.tween.duration = seconds.max(0.0);
        self.tween.start(now);
    }

    pub fn update(&mut self, now: f32) {
        self.tween.update(now);
    }

    fn current(&self) -> [f32; 2] {
        let t = self.tween.eased_progress();
        [lerp(self.from[0], self.to[0], t), lerp(self.from[1], self.to[1], t)]
    }

    pub fn is_inhaling(&self) -> bool {
        self.inhale
    }

    pub fn prompt(&self) -> &'static str {
        if self.inhale {
            "Inhale..."
        } else {
            "Exhale..."
        }
    }

    pub fn scale(&self) -> f32 {
        self.current()[0]
    }

    pub fn glow_opacity(&self) -> f32 {
        self.current()[1]
    }
}

impl Default for Breath {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sequencer::PhaseSequence;

    #[test]
    fn default_sequences_are_valid() {
        let walk = PhaseSequence::new(default_walk_phases()).unwrap();
        assert_eq!(walk.period().as_millis(), 13_500);
        let wall = PhaseSequence::new(default_story_wall_phases()).unwrap();
        assert_eq!(wall.period().as_millis(), 12_500);
        let breathe = PhaseSequence::new(default_breathe_phases()).unwrap();
        assert_eq!(breathe.len(), 2);
    }

    #[test]
    fn walk_flags_follow_phase() {
        let scan = WalkView::from_phase("scanning");
        assert!(scan.scanning && !scan.game_active);
        assert_eq!(scan.path_length, 0.0);

        let puzzle = WalkView::from_phase("puzzle");
        assert!(puzzle.game_active && puzzle.puzzle_active && !puzzle.complete);

        let done = WalkView::from_phase("complete");
        assert!(done.complete && done.game_active && !done.puzzle_active);
        assert_eq!(done.path_length, 1.0);

        let reset = WalkView::from_phase("reset");
        assert!(!reset.game_active && !reset.scanning);
    }

    #[test]
    fn story_wall_is_vibrant_between_scans() {
        assert!(!StoryWallView::from_phase("scanning").vibrant);
        assert!(StoryWallView::from_phase("reveal").vibrant);
        assert!(StoryWallView::from_phase("outcome").outcome);
        let reset = StoryWallView::from_phase("reset");
        assert!(!reset.vibrant && reset.scan_overlay);
    }

    #[test]
    fn breath_eases_between_targets() {
        let mut breath = Breath::new();
        assert_eq!(breath.scale(), EXHALE_SCALE);

        breath.on_phase("inhale", 4.0, 0.0);
        assert!(breath.is_inhaling());
        breath.update(2.0);
        let mid = breath.scale();
        assert!(mid > EXHALE_SCALE && mid < INHALE_SCALE);
        breath.update(4.0);
        assert!((breath.scale() - INHALE_SCALE).abs() < 1e-6);
        assert!((breath.glow_opacity() - INHALE_GLOW).abs() < 1e-6);

        // Interrupted mid-tween: starts from where it is, not from the end.
        breath.on_phase("exhale", 4.0, 5.0);
        breath.update(6.0);
        assert!(breath.scale() < INHALE_SCALE);
        assert_eq!(breath.prompt(), "Exhale...");
    }

    #[test]
    fn breath_tween_follows_each_phase_length() {
        let mut breath = Breath::new();
        breath.on_phase("inhale", 4.0, 0.0);
        breath.update(4.0);
        assert!((breath.scale() - INHALE_SCALE).abs() < 1e-6);

        // A 6 s exhale is still moving at 4 s and lands at 6 s.
        breath.on_phase("exhale", 6.0, 4.0);
        breath.update(8.0);
        let at_four = breath.scale();
        assert!(at_four > EXHALE_SCALE + 1e-3);
        breath.update(9.0);
        assert!(breath.scale() < at_four);
        breath.update(10.0);
        assert!((breath.scale() - EXHALE_SCALE).abs() < 1e-6);
        assert!((breath.glow_opacity() - EXHALE_GLOW).abs() < 1e-6);
    }
}
