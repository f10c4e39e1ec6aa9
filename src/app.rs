use crate::config::Config;
use crate::features::marquee::Marquee;
use crate::features::nav::{NavSection, SectionNav};
use crate::features::pointer::{CursorTrail, Magnet, Parallax, Rect};
use crate::features::sections::Page;
use crate::features::sequencer::PhaseChange;
use crate::features::simulators::{Breath, StoryWallView, WalkView};
use crate::features::status::StatusClock;
use crate::features::Feature;
use crate::motion::spring::LowPass;
use anyhow::Result;
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Wheel notches; positive scrolls down.
    Wheel { delta: f32 },
    Resize { viewport: f32 },
    PointerMove { pos: [f32; 2] },
    PointerLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simulator {
    Walk,
    StoryWall,
    Breathe,
}

pub struct App {
    pub config: Config,
    pub page: Page,
    pub nav: SectionNav,
    pub time: f32,

    // Smooth scrolling
    scroll: LowPass,
    pub scroll_y: f32,

    // Continuous elements
    pub marquee: Marquee,
    pub cursor: CursorTrail,
    pub magnet: Magnet,
    pub parallax: Parallax,

    // Device mockups
    pub walk: WalkView,
    pub story_wall: StoryWallView,
    pub breath: Breath,
    pub status: StatusClock,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let viewport = config.viewport_height;
        let page = Page::new(&config.sections, viewport, config.splash_spring)?;
        let nav = build_nav(&page);
        let first_walk = config.walk.first().map_or("", |p| p.name.as_str());
        let first_wall = config.story_wall.first().map_or("", |p| p.name.as_str());
        let mut breath = Breath::new();
        if let Some(first) = config.breathe.first() {
            breath.on_phase(&first.name, first.duration().as_secs_f32(), 0.0);
        }

        Ok(Self {
            nav,
            time: 0.0,
            scroll: LowPass::new(config.smooth_scroll.lerp)?,
            scroll_y: 0.0,
            marquee: Marquee::new(config.marquee_speed),
            cursor: CursorTrail::new(),
            magnet: Magnet::new(cta_bounds(viewport), config.magnet_spring)?,
            parallax: Parallax::new([config.viewport_width, viewport])?,
            walk: WalkView::from_phase(first_walk),
            story_wall: StoryWallView::from_phase(first_wall),
            breath,
            status: StatusClock::new(),
            page,
            config,
        })
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Wheel { delta } => {
                let step = delta * self.config.smooth_scroll.wheel_step;
                let target = (self.scroll.target() + step).clamp(0.0, self.page.max_scroll());
                self.scroll.set_target(target);
            }
            UiEvent::Resize { viewport } => {
                if let Err(e) = self.resize(viewport) {
                    warn!("Ignoring resize to {viewport}: {e:#}");
                }
                return;
            }
            _ => {}
        }
        for feature in self.features() {
            if feature.handle_event(&event) {
                debug!("{} handled {:?}", feature.name(), event);
            }
        }
    }

    fn features(&mut self) -> [&mut dyn Feature; 4] {
        [&mut self.marquee, &mut self.cursor, &mut self.magnet, &mut self.parallax]
    }

    fn resize(&mut self, viewport: f32) -> Result<()> {
        anyhow::ensure!(viewport.is_finite() && viewport > 0.0, "viewport must be positive");
        let page = Page::new(&self.config.sections, viewport, self.config.splash_spring)?;
        let target = self.scroll.target().min(page.max_scroll());
        self.page = page;
        self.nav = build_nav(&self.page);
        self.magnet = Magnet::new(cta_bounds(viewport), self.config.magnet_spring)?;
        self.parallax.resize([self.config.viewport_width, viewport]);
        self.scroll.set_target(target);
        info!("Viewport resized to {viewport}px, page is {}px", self.page.height());
        Ok(())
    }

    /// Applies a phase change from one of the mockup sequencers.
    pub fn on_phase(&mut self, simulator: Simulator, change: &PhaseChange<'_>) {
        let phase = change.name;
        match simulator {
            Simulator::Walk => self.walk = WalkView::from_phase(phase),
            Simulator::StoryWall => self.story_wall = StoryWallView::from_phase(phase),
            Simulator::Breathe => {
                let seconds = change.duration.as_secs_f32();
                self.breath.on_phase(phase, seconds, self.time);
            }
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;

        self.scroll_y = self.scroll.step(dt);
        self.page.scroll_to(self.scroll_y);
        self.page.step(dt);
        self.marquee.set_scroll_direction(self.page.direction());
        self.marquee.set_shift(self.page.marquee_shift());

        if let Some(id) = self.nav.update(self.scroll_y, self.page.viewport()) {
            info!("Now viewing {id}");
        }

        let time = self.time;
        for feature in self.features() {
            feature.update(dt, time);
        }
        self.breath.update(time);
    }

    pub fn target_scroll(&self) -> f32 {
        self.scroll.target()
    }

    /// One-line summary of everything animated this frame.
    pub fn describe(&self) -> String {
        let mut out = format!(
            "t={:.2}s y={:.0} nav={} marquee={:.1}%{:+.0}px breath={:.3} \
             walk[scan={} game={} done={}] wall[vibrant={}]",
            self.time,
            self.scroll_y,
            self.nav.active().map_or("-", |s| s.id.as_str()),
            self.marquee.offset(),
            self.marquee.shift(),
            self.breath.scale(),
            self.walk.scanning,
            self.walk.game_active,
            self.walk.complete,
            self.story_wall.vibrant,
        );
        for section in self.page.sections() {
            for (name, value) in section.values() {
                out.push_str(&format!(" {}.{}={:.2}", section.id, name, value));
            }
            if let Some(reveal) = section.reveal() {
                out.push_str(&format!(" {}.reveal={:.2}", section.id, reveal.progress()));
            }
        }
        out
    }
}

fn build_nav(page: &Page) -> SectionNav {
    SectionNav::new(
        page.sections()
            .iter()
            .filter_map(|s| {
                s.label.as_ref().map(|label| NavSection {
                    id: s.id.clone(),
                    label: label.clone(),
                    top: s.top,
                    height: s.height,
                })
            })
            .collect(),
    )
}

/// Call-to-action button in the lower part of the viewport.
fn cta_bounds(viewport: f32) -> Rect {
    Rect {
        x: 40.0,
        y: viewport * 0.7,
        width: 240.0,
        height: 56.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sequencer::{PhaseSequencer, PhaseSpec};
    use std::time::Duration;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn change(name: &str, millis: u64) -> PhaseChange<'_> {
        PhaseChange {
            index: 0,
            name,
            cycle: 0,
            at: Duration::ZERO,
            duration: Duration::from_millis(millis),
        }
    }

    #[test]
    fn wheel_scroll_is_smoothed_and_clamped() {
        let mut app = app();
        app.handle_event(UiEvent::Wheel { delta: 10.0 });
        assert_eq!(app.target_scroll(), 1200.0);
        app.update(1.0 / 60.0);
        assert!(app.scroll_y > 0.0 && app.scroll_y < 1200.0);
        for _ in 0..600 {
            app.update(1.0 / 60.0);
        }
        assert_eq!(app.scroll_y, 1200.0);

        app.handle_event(UiEvent::Wheel { delta: -1000.0 });
        assert_eq!(app.target_scroll(), 0.0);
        app.handle_event(UiEvent::Wheel { delta: 1.0e6 });
        assert_eq!(app.target_scroll(), app.page.max_scroll());
    }

    #[test]
    fn nav_follows_scroll_through_labelled_sections() {
        let mut app = app();
        assert_eq!(app.nav.active().unwrap().id, "hero");
        let breathe_top = app.nav.scroll_target("breathe").unwrap();
        app.handle_event(UiEvent::Wheel { delta: breathe_top / 120.0 });
        for _ in 0..900 {
            app.update(1.0 / 60.0);
        }
        assert_eq!(app.nav.active().unwrap().id, "breathe");
    }

    #[test]
    fn phase_changes_update_mockups() {
        let mut app = app();
        assert!(app.walk.scanning);
        app.on_phase(Simulator::Walk, &change("puzzle", 2000));
        assert!(app.walk.puzzle_active);
        app.on_phase(Simulator::StoryWall, &change("reveal", 2000));
        assert!(app.story_wall.reveal);
        assert!(app.breath.is_inhaling());
        app.on_phase(Simulator::Breathe, &change("exhale", 4000));
        assert!(!app.breath.is_inhaling());
    }

    #[test]
    fn breath_uses_the_configured_length_of_each_phase() {
        let config = Config {
            breathe: vec![PhaseSpec::new("inhale", 4000), PhaseSpec::new("exhale", 6000)],
            ..Config::default()
        };
        let mut sequencer = PhaseSequencer::new("breathe", config.breathe_sequence().unwrap());
        let mut app = App::new(config).unwrap();
        sequencer.start(Duration::ZERO);

        // Run the app and the sequencer on the same virtual clock.
        let frame = Duration::from_millis(10);
        let mut now = Duration::ZERO;
        let mut exhale_started = None;
        while now < Duration::from_millis(10_000) {
            now += frame;
            if let Some(change) = sequencer.fire(now) {
                if change.name == "exhale" {
                    exhale_started = Some(now);
                }
                app.on_phase(Simulator::Breathe, &change);
            }
            app.update(frame.as_secs_f32());
            if let Some(start) = exhale_started {
                let into = now - start;
                if into == Duration::from_millis(4000) {
                    assert!(app.breath.scale() > 1.0 + 1e-3, "exhale finished early");
                }
            }
        }
        assert_eq!(exhale_started, Some(Duration::from_millis(4000)));
        assert!((app.breath.scale() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn resize_rebuilds_layout_and_keeps_target_in_range() {
        let mut app = app();
        app.handle_event(UiEvent::Wheel { delta: 1.0e6 });
        app.handle_event(UiEvent::Resize { viewport: 450.0 });
        assert_eq!(app.page.viewport(), 450.0);
        assert!(app.target_scroll() <= app.page.max_scroll());

        app.handle_event(UiEvent::Resize { viewport: 0.0 });
        assert_eq!(app.page.viewport(), 450.0);
    }

    #[test]
    fn pointer_events_reach_cursor_and_magnet() {
        let mut app = app();
        app.handle_event(UiEvent::PointerMove { pos: [160.0, 900.0 * 0.7 + 28.0] });
        assert!(app.magnet.is_hovered());
        app.handle_event(UiEvent::PointerLeave);
        assert!(!app.magnet.is_hovered());
        app.update(0.5);
        assert!(app.cursor.dot.position()[0] > 0.0);
    }

    #[test]
    fn describe_lists_section_channels() {
        let mut app = app();
        app.update(1.0 / 60.0);
        let line = app.describe();
        assert!(line.contains("hero.clip_radius="));
        assert!(line.contains("mission.reveal=0.00"));
        assert!(line.contains("take_action.track_x="));
        assert!(line.contains("nav=hero"));
    }

    #[test]
    fn marquee_follows_page_scroll_direction() {
        let mut app = app();
        assert_eq!(app.marquee.direction(), -1.0);
        app.handle_event(UiEvent::Wheel { delta: 5.0 });
        for _ in 0..120 {
            app.update(1.0 / 60.0);
        }
        assert_eq!(app.marquee.direction(), -1.0);
        assert!(app.marquee.shift() < 0.0);

        app.handle_event(UiEvent::Wheel { delta: -2.0 });
        app.update(1.0 / 60.0);
        assert_eq!(app.marquee.direction(), 1.0);

        // Settled: no movement keeps the last direction.
        for _ in 0..600 {
            app.update(1.0 / 60.0);
        }
        assert_eq!(app.marquee.direction(), 1.0);
    }

    #[test]
    fn pointer_moves_the_hero_parallax() {
        let mut app = app();
        app.handle_event(UiEvent::PointerMove { pos: [0.0, 450.0] });
        for _ in 0..90 {
            app.update(1.0 / 60.0);
        }
        let [x, y] = app.parallax.text_offset();
        assert!((x - 20.0).abs() < 1e-3, "x = {x}");
        assert!(y.abs() < 1e-3);
    }
}
