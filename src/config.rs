use crate::features::sequencer::{PhaseSequence, PhaseSpec};
use crate::features::simulators::{
    default_breathe_phases, default_story_wall_phases, default_walk_phases,
};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use crate::motion::spring::SpringConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    /// Viewport height in pixels; section heights are in viewport units.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,

    /// How long the demo runs before tearing everything down.
    #[serde(default = "default_run_seconds")]
    pub run_seconds: f32,

    #[serde(default = "default_smooth_scroll")]
    pub smooth_scroll: SmoothScroll,

    #[serde(default = "SpringConfig::splash")]
    pub splash_spring: SpringConfig,

    #[serde(default = "SpringConfig::magnetic")]
    pub magnet_spring: SpringConfig,

    #[serde(default = "default_marquee_speed")]
    pub marquee_speed: f32,

    #[serde(default = "default_status_refresh_secs")]
    pub status_refresh_secs: u64,

    #[serde(default = "default_sections")]
    pub sections: Vec<SectionLayout>,

    #[serde(default = "default_walk_phases")]
    pub walk: Vec<PhaseSpec>,

    #[serde(default = "default_story_wall_phases")]
    pub story_wall: Vec<PhaseSpec>,

    #[serde(default = "default_breathe_phases")]
    pub breathe: Vec<PhaseSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothScroll {
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub lerp: f32,
    /// Pixels per wheel notch.
    pub wheel_step: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Splash,
    Portal,
    HeroMask,
    /// Scrubbed headline fade between two viewport lines.
    Reveal,
    /// Word-by-word toggle reveal.
    TextReveal,
    /// Whole-block toggle reveal.
    StoryReveal,
    /// Pinned while its track slides sideways.
    HorizontalPin,
    HeroShader,
    Sticky,
    Static,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: String,
    pub height_vh: f32,
    #[serde(default = "default_effect")]
    pub effect: Effect,
    #[serde(default)]
    pub nav_label: Option<String>,
    /// Words in the headline of a `text_reveal` section.
    #[serde(default = "default_words")]
    pub words: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps_cap: default_fps_cap(),
            viewport_height: default_viewport_height(),
            viewport_width: default_viewport_width(),
            run_seconds: default_run_seconds(),
            smooth_scroll: default_smooth_scroll(),
            splash_spring: SpringConfig::splash(),
            magnet_spring: SpringConfig::magnetic(),
            marquee_speed: default_marquee_speed(),
            status_refresh_secs: default_status_refresh_secs(),
            sections: default_sections(),
            walk: default_walk_phases(),
            story_wall: default_story_wall_phases(),
            breathe: default_breathe_phases(),
        }
    }
}

fn default_fps_cap() -> u32 {
    60
}

fn default_viewport_height() -> f32 {
    900.0
}

fn default_viewport_width() -> f32 {
    1440.0
}

fn default_run_seconds() -> f32 {
    30.0
}

fn default_smooth_scroll() -> SmoothScroll {
    SmoothScroll {
        lerp: 0.07,
        wheel_step: 120.0,
    }
}

fn default_marquee_speed() -> f32 {
    0.1
}

fn default_status_refresh_secs() -> u64 {
    60
}

fn default_effect() -> Effect {
    Effect::Static
}

fn default_words() -> usize {
    1
}

fn default_sections() -> Vec<SectionLayout> {
    let section = |id: &str, height_vh: f32, effect: Effect, nav: Option<&str>| SectionLayout {
        id: id.to_string(),
        height_vh,
        effect,
        nav_label: nav.map(str::to_string),
        words: default_words(),
    };
    vec![
        section("hero", 300.0, Effect::Splash, Some("StoryWall")),
        section("breathe", 150.0, Effect::Sticky, Some("Breathe")),
        section("walk", 100.0, Effect::Static, Some("Walk")),
        section("marquee", 20.0, Effect::Static, None),
        // "Our Mission"
        SectionLayout { words: 2, ..section("mission", 100.0, Effect::TextReveal, None) },
        section("values", 100.0, Effect::Static, None),
        section("take_action", 100.0, Effect::HorizontalPin, None),
        section("footer", 60.0, Effect::Static, None),
    ]
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("storywall").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::path()?;
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything that would otherwise fail later at start-up.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.fps_cap > 0, "fps_cap must be positive");
        anyhow::ensure!(
            self.viewport_height.is_finite() && self.viewport_height > 0.0,
            "viewport_height must be positive, got {}",
            self.viewport_height
        );
        anyhow::ensure!(
            self.viewport_width.is_finite() && self.viewport_width > 0.0,
            "viewport_width must be positive, got {}",
            self.viewport_width
        );
        anyhow::ensure!(
            self.run_seconds.is_finite() && self.run_seconds >= 0.0,
            "run_seconds must be finite and non-negative, got {}",
            self.run_seconds
        );
        anyhow::ensure!(self.status_refresh_secs > 0, "status_refresh_secs must be positive");
        anyhow::ensure!(
            self.marquee_speed.is_finite(),
            "marquee_speed must be finite, got {}",
            self.marquee_speed
        );
        anyhow::ensure!(
            self.smooth_scroll.lerp > 0.0 && self.smooth_scroll.lerp <= 1.0,
            "smooth_scroll.lerp must be in (0, 1], got {}",
            self.smooth_scroll.lerp
        );
        anyhow::ensure!(
            self.smooth_scroll.wheel_step.is_finite(),
            "smooth_scroll.wheel_step must be finite"
        );
        self.splash_spring.validate().context("splash_spring")?;
        self.magnet_spring.validate().context("magnet_spring")?;
        self.walk_sequence()?;
        self.story_wall_sequence()?;
        self.breathe_sequence()?;
        Ok(())
    }

    pub fn walk_sequence(&self) -> Result<PhaseSequence> {
        PhaseSequence::new(self.walk.clone()).context("walk phases")
    }

    pub fn story_wall_sequence(&self) -> Result<PhaseSequence> {
        PhaseSequence::new(self.story_wall.clone()).context("story_wall phases")
    }

    pub fn breathe_sequence(&self) -> Result<PhaseSequence> {
        PhaseSequence::new(self.breathe.clone()).context("breathe phases")
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps_cap.max(1)))
    }

    pub fn run_length(&self) -> Result<Duration> {
        Duration::try_from_secs_f32(self.run_seconds)
            .with_context(|| format!("run_seconds = {}", self.run_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.fps_cap, 60);
        assert_eq!(config.walk.len(), 6);
        assert_eq!(config.sections[0].effect, Effect::Splash);
        let mission = config.sections.iter().find(|s| s.id == "mission").unwrap();
        assert_eq!(mission.effect, Effect::TextReveal);
        assert_eq!(mission.words, 2);
        assert_eq!(config.splash_spring, SpringConfig::splash());
    }

    #[test]
    fn overrides_phase_lists_and_sections() {
        let config = Config::from_toml(
            r#"
            fps_cap = 30

            [[breathe]]
            name = "hold"
            duration_ms = 1000

            [[sections]]
            id = "portal"
            height_vh = 250
            effect = "portal"

            [[sections]]
            id = "tail"
            height_vh = 50

            [[sections]]
            id = "headline"
            height_vh = 100
            effect = "text_reveal"
            words = 4

            [[sections]]
            id = "gallery"
            height_vh = 100
            effect = "horizontal_pin"
            "#,
        )
        .unwrap();
        assert_eq!(config.fps_cap, 30);
        assert_eq!(config.breathe, vec![PhaseSpec::new("hold", 1000)]);
        assert_eq!(config.sections.len(), 4);
        assert_eq!(config.sections[1].effect, Effect::Static);
        assert_eq!(config.sections[1].words, 1);
        assert_eq!(config.sections[2].words, 4);
        assert_eq!(config.sections[3].effect, Effect::HorizontalPin);
        assert_eq!(config.breathe_sequence().unwrap().period().as_millis(), 1000);
    }

    #[test]
    fn misconfigured_sequence_fails_fast() {
        let err = Config::from_toml(
            r#"
            walk = []
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("walk phases"));

        let zero = r#"
            [[story_wall]]
            name = "scan"
            duration_ms = 0
        "#;
        assert!(Config::from_toml(zero).is_err());
    }

    #[test]
    fn rejects_bad_springs() {
        let bad = r#"
            [magnet_spring]
            damping = 15
            stiffness = 0
            mass = 0.1
        "#;
        assert!(Config::from_toml(bad).is_err());
    }

    #[test]
    fn rejects_unusable_run_length_and_timers() {
        let err = Config::from_toml("run_seconds = inf").unwrap_err();
        assert!(format!("{err:#}").contains("run_seconds"));
        assert!(Config::from_toml("run_seconds = nan").is_err());
        assert!(Config::from_toml("run_seconds = -1.0").is_err());
        assert!(Config::from_toml("status_refresh_secs = 0").is_err());
        assert!(Config::from_toml("marquee_speed = inf").is_err());

        let config = Config::from_toml("run_seconds = 2.5").unwrap();
        assert_eq!(config.run_length().unwrap(), Duration::from_millis(2500));
        let unchecked = Config { run_seconds: f32::INFINITY, ..Config::default() };
        assert!(unchecked.run_length().is_err());
    }

    #[test]
    fn light_splash_spring_loads_and_stays_finite() {
        let config = Config::from_toml(
            r#"
            [splash_spring]
            damping = 30
            stiffness = 100
            mass = 0.01
            "#,
        )
        .unwrap();
        let mut spring = crate::motion::Spring::new(config.splash_spring).unwrap();
        spring.set_target(1.0);
        for _ in 0..60 {
            spring.step(1.0 / 60.0);
        }
        assert!(spring.value().is_finite());
        assert!(spring.value() > 0.0 && spring.value() <= 1.0);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.sections, config.sections);
        assert_eq!(back.story_wall, config.story_wall);
    }
}
