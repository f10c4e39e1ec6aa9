//! Scroll-region progress.
//!
//! A region is bounded by two markers, each pairing an edge of the tracked
//! element with a line of the viewport. `"start 90%"` reads as "the top of
//! the element reaches 90% of the way down the viewport". Progress is 0 at
//! the start marker and 1 at the end marker. An end written `"+=3000"` is
//! met 3000 px of scrolling after the start, `"+=100vh"` one viewport
//! height after it.

use super::anim::clamp01;
use super::spring::{Scrub, Spring, SpringConfig};
use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use std::str::FromStr;

/// Spans shorter than this are treated as degenerate.
const MIN_SPAN: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    Start,
    Center,
    End,
    Fraction(f32),
}

impl Edge {
    pub fn fraction(self) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => 0.5,
            Edge::End => 1.0,
            Edge::Fraction(f) => f,
        }
    }
}

impl FromStr for Edge {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" | "top" => Ok(Edge::Start),
            "center" => Ok(Edge::Center),
            "end" | "bottom" => Ok(Edge::End),
            _ => {
                let pct = s
                    .strip_suffix('%')
                    .ok_or_else(|| anyhow!("unknown scroll edge {s:?}"))?;
                let value: f32 = pct
                    .trim()
                    .parse()
                    .with_context(|| format!("bad percentage in scroll edge {s:?}"))?;
                if !value.is_finite() {
                    bail!("scroll edge {s:?} is not finite");
                }
                Ok(Edge::Fraction(value / 100.0))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMarker {
    pub element: Edge,
    pub viewport: Edge,
}

impl ScrollMarker {
    /// Element top position, relative to the viewport top, at which this
    /// marker is met.
    pub fn trigger_line(&self, geometry: Geometry) -> f32 {
        geometry.viewport * self.viewport.fraction() - geometry.height * self.element.fraction()
    }

    /// Whether the element has scrolled up to or past this marker.
    pub fn is_passed(&self, geometry: Geometry) -> bool {
        geometry.top <= self.trigger_line(geometry)
    }
}

impl FromStr for ScrollMarker {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("scroll marker {s:?} must be \"<element-edge> <viewport-edge>\"");
        };
        Ok(Self {
            element: element.parse()?,
            viewport: viewport.parse()?,
        })
    }
}

/// One bounding-rect read: element top relative to the viewport top,
/// element height, viewport height. All in the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub top: f32,
    pub height: f32,
    pub viewport: f32,
}

/// Where a region ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    Marker(ScrollMarker),
    /// Pixels of scrolling past the start marker.
    After(f32),
    /// Viewport heights of scrolling past the start marker.
    AfterViewports(f32),
}

impl FromStr for Boundary {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(distance) = s.trim().strip_prefix("+=") else {
            return Ok(Boundary::Marker(s.parse()?));
        };
        let (number, viewports) = match distance.trim().strip_suffix("vh") {
            Some(number) => (number, true),
            None => (distance.trim(), false),
        };
        let value: f32 = number
            .trim()
            .parse()
            .with_context(|| format!("bad scroll distance {s:?}"))?;
        if !value.is_finite() {
            bail!("scroll distance {s:?} is not finite");
        }
        Ok(if viewports {
            Boundary::AfterViewports(value / 100.0)
        } else {
            Boundary::After(value)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRegion {
    pub start: ScrollMarker,
    pub end: Boundary,
}

impl ScrollRegion {
    pub fn new(start: ScrollMarker, end: ScrollMarker) -> Self {
        Self {
            start,
            end: Boundary::Marker(end),
        }
    }

    pub fn from_offsets(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Raw progress in [0, 1]. A zero, negative or non-finite span yields 0.
    pub fn progress(&self, geometry: Geometry) -> f32 {
        let start_line = self.start.trigger_line(geometry);
        let end_line = match self.end {
            Boundary::Marker(marker) => marker.trigger_line(geometry),
            Boundary::After(distance) => start_line - distance,
            Boundary::AfterViewports(count) => start_line - count * geometry.viewport,
        };
        let span = start_line - end_line;
        if !span.is_finite() || span < MIN_SPAN {
            return 0.0;
        }
        clamp01((start_line - geometry.top) / span)
    }
}

/// A single consistent reading of one tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub raw: f32,
    pub smoothed: f32,
}

#[derive(Debug, Clone)]
enum Smoothing {
    None,
    Spring(Spring),
    Scrub(Scrub),
}

impl Smoothing {
    fn jump(&mut self, value: f32) {
        match self {
            Smoothing::None => {}
            Smoothing::Spring(spring) => spring.jump(value),
            Smoothing::Scrub(scrub) => scrub.jump(value),
        }
    }

    fn set_target(&mut self, value: f32) {
        match self {
            Smoothing::None => {}
            Smoothing::Spring(spring) => spring.set_target(value),
            Smoothing::Scrub(scrub) => scrub.set_target(value),
        }
    }

    fn step(&mut self, dt: f32) {
        match self {
            Smoothing::None => {}
            Smoothing::Spring(spring) => {
                spring.step(dt);
            }
            Smoothing::Scrub(scrub) => {
                scrub.step(dt);
            }
        }
    }

    fn value(&self) -> Option<f32> {
        match self {
            Smoothing::None => None,
            Smoothing::Spring(spring) => Some(spring.value()),
            Smoothing::Scrub(scrub) => Some(scrub.value()),
        }
    }
}

/// Follows one region as geometry updates arrive.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    region: ScrollRegion,
    raw: f32,
    last_top: Option<f32>,
    direction: i8,
    smoothing: Smoothing,
}

impl ScrollTracker {
    pub fn new(region: ScrollRegion) -> Self {
        Self {
            region,
            raw: 0.0,
            last_top: None,
            direction: 1,
            smoothing: Smoothing::None,
        }
    }

    /// Smooths progress with a damped spring.
    pub fn with_spring(mut self, config: SpringConfig) -> Result<Self> {
        let mut spring = Spring::new(config)?;
        spring.jump(self.raw);
        self.smoothing = Smoothing::Spring(spring);
        Ok(self)
    }

    /// Smooths progress by catching up over `lag` seconds.
    pub fn with_scrub(mut self, lag: f32) -> Result<Self> {
        let mut scrub = Scrub::new(lag)?;
        scrub.jump(self.raw);
        self.smoothing = Smoothing::Scrub(scrub);
        Ok(self)
    }

    pub fn region(&self) -> &ScrollRegion {
        &self.region
    }

    /// Recomputes raw progress from a fresh geometry reading.
    pub fn observe(&mut self, geometry: Geometry) -> f32 {
        let raw = self.region.progress(geometry);
        match self.last_top {
            None => {
                // First reading: the smoothed value starts where raw is.
                self.smoothing.jump(raw);
            }
            Some(last) if geometry.top < last => self.direction = 1,
            Some(last) if geometry.top > last => self.direction = -1,
            Some(_) => {}
        }
        if geometry.height <= 0.0 {
            debug!("scroll region has no height, holding progress at {raw}");
        }
        self.last_top = Some(geometry.top);
        self.raw = raw;
        self.smoothing.set_target(raw);
        raw
    }

    /// Advances the smoothing, if any, by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.smoothing.step(dt);
    }

    pub fn raw(&self) -> f32 {
        self.raw
    }

    /// +1 while the content moves up (scrolling down), -1 the other way.
    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let smoothed = self.smoothing.value().unwrap_or(self.raw);
        ProgressSnapshot {
            raw: self.raw,
            smoothed,
        }
    }
}
