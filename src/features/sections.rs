//! Scroll-driven page sections.
//!
//! Sections stack vertically; each tracks its own region and owns the
//! channel table that turns progress into style values. Toggle reveals
//! only use scroll position to pick a play direction.

use super::reveal::ToggleReveal;
use crate::config::{Effect, SectionLayout, SpringConfig};
use crate::motion::anim::lerp;
use crate::motion::range::{ChannelMap, Source};
use crate::motion::scroll::{Geometry, ProgressSnapshot, ScrollRegion, ScrollTracker};
use anyhow::{Context, Result};
use log::debug;

/// Scroll distance a pinned section holds the viewport for, in pixels.
pub const PIN_DISTANCE: f32 = 3000.0;
/// How far the marquee strip shifts over the first viewport of scrolling.
const MARQUEE_SHIFT: f32 = -500.0;

/// Channel tables and regions for each effect.
pub fn effect_tracks(
    effect: Effect,
    splash_spring: SpringConfig,
) -> Result<(ScrollTracker, ChannelMap)> {
    let region = ScrollRegion::from_offsets;
    let tracks = match effect {
        // Liquid splash from the hero into the story wall.
        Effect::Splash => (
            ScrollTracker::new(region("start start", "end start")?).with_spring(splash_spring)?,
            ChannelMap::new()
                .with("clip_radius", Source::Smoothed, [0.0, 0.6], [0.0, 150.0])?
                .with("content_scale", Source::Smoothed, [0.0, 0.6], [1.5, 1.0])?
                .with("hero_opacity", Source::Raw, [0.4, 0.6], [1.0, 0.0])?
                .with("story_wall_opacity", Source::Raw, [0.9, 0.99], [1.0, 0.0])?,
        ),
        Effect::Portal => (
            ScrollTracker::new(region("start start", "end end")?),
            ChannelMap::new()
                .with("portal_size", Source::Raw, [0.0, 0.6], [0.0, 200.0])?
                .with("hero_scale", Source::Raw, [0.0, 0.6], [1.0, 1.1])?
                .with("hero_opacity", Source::Raw, [0.4, 0.7], [1.0, 0.0])?
                .with("content_opacity", Source::Raw, [0.3, 0.6], [0.0, 1.0])?
                .with("content_scale", Source::Raw, [0.3, 0.6], [0.8, 1.0])?,
        ),
        Effect::HeroMask => (
            ScrollTracker::new(region("start start", "end end")?),
            ChannelMap::new().with("mask_size", Source::Raw, [0.0, 0.45], [0.0, 150.0])?,
        ),
        Effect::Reveal => (
            ScrollTracker::new(region("start 90%", "start 40%")?),
            ChannelMap::new()
                .with("headline_opacity", Source::Raw, [0.0, 1.0], [0.2, 1.0])?
                .with("headline_y", Source::Raw, [0.0, 1.0], [40.0, 0.0])?,
        ),
        // The track's x offset as a fraction of how far it overflows.
        Effect::HorizontalPin => (
            ScrollTracker::new(region("top top", &format!("+={PIN_DISTANCE}"))?)
                .with_scrub(1.0)?,
            ChannelMap::new().with("track_x", Source::Smoothed, [0.0, 1.0], [0.0, -1.0])?,
        ),
        Effect::HeroShader => (
            ScrollTracker::new(region("top top", "bottom top")?),
            ChannelMap::new()
                .with("distortion", Source::Raw, [0.0, 1.0], [0.02, 0.12])?
                .with("color_mix", Source::Raw, [0.0, 1.0], [0.0, 0.8])?,
        ),
        Effect::Sticky => {
            (ScrollTracker::new(region("start start", "end end")?), ChannelMap::new())
        }
        Effect::TextReveal | Effect::StoryReveal | Effect::Static => {
            (ScrollTracker::new(region("start end", "end start")?), ChannelMap::new())
        }
    };
    Ok(tracks)
}

fn effect_reveal(entry: &SectionLayout) -> Result<Option<ToggleReveal>> {
    Ok(match entry.effect {
        Effect::TextReveal => Some(ToggleReveal::text(entry.words)?),
        Effect::StoryReveal => Some(ToggleReveal::story()?),
        _ => None,
    })
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub label: Option<String>,
    pub effect: Effect,
    /// Document offset of the section top, in pixels.
    pub top: f32,
    /// Layout height, including any pin spacing.
    pub height: f32,
    pin: f32,
    tracker: ScrollTracker,
    channels: ChannelMap,
    values: Vec<f32>,
    reveal: Option<ToggleReveal>,
}

impl Section {
    pub fn progress(&self) -> ProgressSnapshot {
        self.tracker.snapshot()
    }

    pub fn values(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.channels.names().zip(self.values.iter().copied())
    }

    pub fn value(&self, name: &str) -> Option<f32> {
        self.channels.index_of(name).map(|i| self.values[i])
    }

    pub fn reveal(&self) -> Option<&ToggleReveal> {
        self.reveal.as_ref()
    }

    /// Whether the section is held in place at `scroll_y`.
    pub fn is_pinned(&self, scroll_y: f32) -> bool {
        self.pin > 0.0 && scroll_y >= self.top && scroll_y < self.top + self.pin
    }

    fn observe(&mut self, scroll_y: f32, viewport: f32) {
        let geometry = Geometry {
            top: self.top - scroll_y,
            height: self.height - self.pin,
            viewport,
        };
        self.tracker.observe(geometry);
        if let Some(reveal) = &mut self.reveal {
            reveal.observe(geometry);
        }
    }

    fn step(&mut self, dt: f32) {
        self.tracker.step(dt);
        self.channels.evaluate(self.tracker.snapshot(), &mut self.values);
        if let Some(reveal) = &mut self.reveal {
            reveal.step(dt);
        }
    }
}

/// The whole scrolling document.
#[derive(Debug, Clone)]
pub struct Page {
    sections: Vec<Section>,
    viewport: f32,
    /// Whole document over its first viewport of scrolling.
    document: ScrollTracker,
}

impl Page {
    pub fn new(
        layout: &[SectionLayout],
        viewport: f32,
        splash_spring: SpringConfig,
    ) -> Result<Self> {
        let mut sections = Vec::with_capacity(layout.len());
        let mut top = 0.0;
        for entry in layout {
            let context = || format!("building section {:?}", entry.id);
            let (tracker, channels) =
                effect_tracks(entry.effect, splash_spring).with_context(context)?;
            let reveal = effect_reveal(entry).with_context(context)?;
            let pin = if entry.effect == Effect::HorizontalPin { PIN_DISTANCE } else { 0.0 };
            let height = (entry.height_vh / 100.0 * viewport).max(0.0) + pin;
            let values = vec![0.0; channels.len()];
            sections.push(Section {
                id: entry.id.clone(),
                label: entry.nav_label.clone(),
                effect: entry.effect,
                top,
                height,
                pin,
                tracker,
                channels,
                values,
                reveal,
            });
            top += height;
        }
        debug!("page laid out: {} sections, {top}px tall", sections.len());
        let document =
            ScrollTracker::new(ScrollRegion::from_offsets("start start", "+=100vh")?)
                .with_scrub(0.25)?;
        let mut page = Self { sections, viewport, document };
        page.scroll_to(0.0);
        page.step(0.0);
        Ok(page)
    }

    pub fn viewport(&self) -> f32 {
        self.viewport
    }

    pub fn height(&self) -> f32 {
        self.sections.last().map_or(0.0, |s| s.top + s.height)
    }

    /// Furthest the document can scroll.
    pub fn max_scroll(&self) -> f32 {
        (self.height() - self.viewport).max(0.0)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// +1 while scrolling down, -1 while scrolling up.
    pub fn direction(&self) -> i8 {
        self.document.direction()
    }

    /// Scrubbed sideways nudge of the marquee strip, in pixels.
    pub fn marquee_shift(&self) -> f32 {
        lerp(0.0, MARQUEE_SHIFT, self.document.snapshot().smoothed)
    }

    /// Feeds one scroll position to every section tracker.
    pub fn scroll_to(&mut self, scroll_y: f32) {
        self.document.observe(Geometry {
            top: -scroll_y,
            height: self.height(),
            viewport: self.viewport,
        });
        for section in &mut self.sections {
            section.observe(scroll_y, self.viewport);
        }
    }

    /// Advances smoothing and re-evaluates every channel.
    pub fn step(&mut self, dt: f32) {
        self.document.step(dt);
        for section in &mut self.sections {
            section.step(dt);
        }
    }
}
