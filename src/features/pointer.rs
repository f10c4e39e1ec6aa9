//! Pointer-driven motion: magnetic buttons, the trailing cursor and the
//! hero parallax.

use super::Feature;
use crate::app::UiEvent;
use crate::motion::anim::ease_out_quad;
use crate::motion::spring::{LowPass, Scrub, Spring, SpringConfig};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    pub fn contains(&self, p: [f32; 2]) -> bool {
        p[0] >= self.x
            && p[0] < self.x + self.width
            && p[1] >= self.y
            && p[1] < self.y + self.height
    }
}

/// Button that leans toward the pointer while hovered.
#[derive(Debug, Clone)]
pub struct Magnet {
    bounds: Rect,
    strength: f32,
    x: Spring,
    y: Spring,
    hovered: bool,
}

impl Magnet {
    pub fn new(bounds: Rect, config: SpringConfig) -> Result<Self> {
        Ok(Self {
            bounds,
            strength: 0.2,
            x: Spring::new(config)?,
            y: Spring::new(config)?,
            hovered: false,
        })
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn pointer_move(&mut self, pos: [f32; 2]) {
        if !self.bounds.contains(pos) {
            self.release();
            return;
        }
        self.hovered = true;
        let [cx, cy] = self.bounds.center();
        self.x.set_target((pos[0] - cx) * self.strength);
        self.y.set_target((pos[1] - cy) * self.strength);
    }

    pub fn release(&mut self) {
        self.hovered = false;
        self.x.set_target(0.0);
        self.y.set_target(0.0);
    }

    pub fn step(&mut self, dt: f32) {
        self.x.step(dt);
        self.y.step(dt);
    }

    pub fn offset(&self) -> [f32; 2] {
        [self.x.value(), self.y.value()]
    }
}

impl Feature for Magnet {
    fn name(&self) -> &'static str {
        "magnet"
    }

    fn update(&mut self, dt: f32, _now: f32) {
        self.step(dt);
    }

    fn handle_event(&mut self, event: &UiEvent) -> bool {
        match *event {
            UiEvent::PointerMove { pos } => self.pointer_move(pos),
            UiEvent::PointerLeave => self.release(),
            _ => return false,
        }
        true
    }
}

/// Exponential chase with a time constant in seconds.
#[derive(Debug, Clone)]
pub struct Follower {
    time_constant: f32,
    pos: [f32; 2],
    target: [f32; 2],
}

impl Follower {
    pub fn new(time_constant: f32) -> Self {
        Self {
            time_constant: time_constant.max(1e-3),
            pos: [0.0; 2],
            target: [0.0; 2],
        }
    }

    pub fn set_target(&mut self, target: [f32; 2]) {
        self.target = target;
    }

    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let alpha = 1.0 - (-dt / self.time_constant).exp();
        for (p, t) in self.pos.iter_mut().zip(self.target) {
            *p += (t - *p) * alpha;
        }
    }

    pub fn position(&self) -> [f32; 2] {
        self.pos
    }
}

/// Custom cursor: a dot that follows closely and a ring that lags.
#[derive(Debug, Clone)]
pub struct CursorTrail {
    pub dot: Follower,
    pub ring: Follower,
}

impl CursorTrail {
    pub fn new() -> Self {
        Self {
            dot: Follower::new(0.1),
            ring: Follower::new(0.5),
        }
    }
}

impl Default for CursorTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for CursorTrail {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn update(&mut self, dt: f32, _now: f32) {
        self.dot.step(dt);
        self.ring.step(dt);
    }

    fn handle_event(&mut self, event: &UiEvent) -> bool {
        if let UiEvent::PointerMove { pos } = *event {
            self.dot.set_target(pos);
            self.ring.set_target(pos);
            return true;
        }
        false
    }
}

/// Pixels the hero text can travel either side of centre.
const PARALLAX_RANGE: f32 = 20.0;

/// Hero pointer effects: the headline drifts away from the pointer and the
/// shader's ripple centre trails it.
#[derive(Debug, Clone)]
pub struct Parallax {
    size: [f32; 2],
    text: [Scrub; 2],
    ripple: [LowPass; 2],
}

impl Parallax {
    pub fn new(size: [f32; 2]) -> Result<Self> {
        let text = Scrub::new(1.0)?.with_ease(ease_out_quad);
        let mut ripple = LowPass::new(0.1)?;
        ripple.epsilon = 1e-5;
        ripple.jump(0.5);
        Ok(Self {
            size,
            text: [text.clone(), text],
            ripple: [ripple.clone(), ripple],
        })
    }

    pub fn resize(&mut self, size: [f32; 2]) {
        self.size = size;
    }

    pub fn pointer_move(&mut self, pos: [f32; 2]) {
        let [width, height] = self.size;
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let u = pos[0] / width;
        let v = pos[1] / height;
        self.text[0].set_target(-(u - 0.5) * 2.0 * PARALLAX_RANGE);
        self.text[1].set_target(-(v - 0.5) * 2.0 * PARALLAX_RANGE);
        // Shader space has y pointing up.
        self.ripple[0].set_target(u);
        self.ripple[1].set_target(1.0 - v);
    }

    pub fn step(&mut self, dt: f32) {
        for axis in &mut self.text {
            axis.step(dt);
        }
        for axis in &mut self.ripple {
            axis.step(dt);
        }
    }

    /// Headline offset in pixels.
    pub fn text_offset(&self) -> [f32; 2] {
        [self.text[0].value(), self.text[1].value()]
    }

    /// Ripple centre in normalised shader coordinates.
    pub fn ripple_center(&self) -> [f32; 2] {
        [self.ripple[0].value(), self.ripple[1].value()]
    }
}

impl Feature for Parallax {
    fn name(&self) -> &'static str {
        "parallax"
    }

    fn update(&mut self, dt: f32, _now: f32) {
        self.step(dt);
    }

    fn handle_event(&mut self, event: &UiEvent) -> bool {
        if let UiEvent::PointerMove { pos } = *event {
            self.pointer_move(pos);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> Rect {
        Rect { x: 100.0, y: 100.0, width: 200.0, height: 60.0 }
    }

    #[test]
    fn magnet_pulls_toward_pointer_and_releases() {
        let mut magnet = Magnet::new(button(), SpringConfig::magnetic()).unwrap();
        magnet.handle_event(&UiEvent::PointerMove { pos: [250.0, 130.0] });
        assert!(magnet.is_hovered());
        for _ in 0..120 {
            magnet.update(1.0 / 60.0, 0.0);
        }
        let [x, y] = magnet.offset();
        assert!((x - 10.0).abs() < 1e-2, "x = {x}");
        assert!(y.abs() < 1e-2);

        magnet.handle_event(&UiEvent::PointerLeave);
        for _ in 0..120 {
            magnet.update(1.0 / 60.0, 0.0);
        }
        assert!(magnet.offset()[0].abs() < 1e-2);
    }

    #[test]
    fn moving_outside_the_button_releases_it() {
        let mut magnet = Magnet::new(button(), SpringConfig::magnetic()).unwrap();
        magnet.pointer_move([150.0, 110.0]);
        magnet.pointer_move([10.0, 10.0]);
        assert!(!magnet.is_hovered());
    }

    #[test]
    fn ring_lags_behind_dot() {
        let mut cursor = CursorTrail::new();
        cursor.handle_event(&UiEvent::PointerMove { pos: [100.0, 50.0] });
        for _ in 0..6 {
            cursor.update(1.0 / 60.0, 0.0);
        }
        let dot = cursor.dot.position();
        let ring = cursor.ring.position();
        assert!(dot[0] > ring[0]);
        assert!(dot[0] < 100.0);
        for _ in 0..600 {
            cursor.update(1.0 / 60.0, 0.0);
        }
        assert!((cursor.ring.position()[0] - 100.0).abs() < 1e-2);
    }

    #[test]
    fn follower_ignores_bad_frame_deltas() {
        let mut follower = Follower::new(0.1);
        follower.set_target([10.0, 10.0]);
        follower.step(f32::NAN);
        follower.step(f32::INFINITY);
        follower.step(-1.0);
        assert_eq!(follower.position(), [0.0, 0.0]);
    }

    #[test]
    fn parallax_text_moves_against_the_pointer() {
        let mut parallax = Parallax::new([1000.0, 800.0]).unwrap();
        parallax.handle_event(&UiEvent::PointerMove { pos: [1000.0, 0.0] });
        parallax.update(0.5, 0.0);
        let [x, y] = parallax.text_offset();
        assert!(x < 0.0 && x > -PARALLAX_RANGE);
        assert!(y > 0.0 && y < PARALLAX_RANGE);
        parallax.update(0.5, 0.0);
        assert_eq!(parallax.text_offset(), [-PARALLAX_RANGE, PARALLAX_RANGE]);

        parallax.pointer_move([500.0, 400.0]);
        for _ in 0..60 {
            parallax.update(1.0 / 60.0, 0.0);
        }
        assert_eq!(parallax.text_offset(), [0.0, 0.0]);
    }

    #[test]
    fn ripple_centre_eases_a_tenth_per_frame() {
        let mut parallax = Parallax::new([1000.0, 800.0]).unwrap();
        assert_eq!(parallax.ripple_center(), [0.5, 0.5]);
        // Bottom-left corner of the screen is the shader origin.
        parallax.pointer_move([0.0, 800.0]);
        parallax.update(1.0 / 60.0, 0.0);
        let [u, v] = parallax.ripple_center();
        assert!((u - 0.45).abs() < 1e-4, "u = {u}");
        assert!((v - 0.45).abs() < 1e-4, "v = {v}");
        for _ in 0..300 {
            parallax.update(1.0 / 60.0, 0.0);
        }
        assert_eq!(parallax.ripple_center(), [0.0, 0.0]);
    }
}
