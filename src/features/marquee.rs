use super::Feature;
use crate::app::UiEvent;

/// Endlessly scrolling ticker. Two copies of the strip sit side by side
/// and both are offset by `x_percent`, which wraps in (-100, 0]. The whole
/// strip is also nudged sideways by `shift` pixels as the page scrolls.
#[derive(Debug, Clone)]
pub struct Marquee {
    x_percent: f32,
    direction: f32,
    /// Percent of strip width per 60 Hz frame.
    speed: f32,
    shift: f32,
}

impl Marquee {
    pub fn new(speed: f32) -> Self {
        Self {
            x_percent: 0.0,
            direction: -1.0,
            speed,
            shift: 0.0,
        }
    }

    pub fn offset(&self) -> f32 {
        self.x_percent
    }

    pub fn shift(&self) -> f32 {
        self.shift
    }

    pub fn set_shift(&mut self, px: f32) {
        if px.is_finite() {
            self.shift = px;
        }
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// Scrolling down drives the strip left.
    pub fn set_scroll_direction(&mut self, scroll_direction: i8) {
        if scroll_direction != 0 {
            self.direction = -f32::from(scroll_direction.signum());
        }
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.x_percent += self.speed * self.direction * dt * 60.0;
        if self.x_percent <= -100.0 {
            self.x_percent += 100.0;
        }
        if self.x_percent > 0.0 {
            self.x_percent -= 100.0;
        }
        self.x_percent
    }

    pub fn reset(&mut self) {
        self.x_percent = 0.0;
        self.direction = -1.0;
        self.shift = 0.0;
    }
}

impl Feature for Marquee {
    fn name(&self) -> &'static str {
        "marquee"
    }

    fn update(&mut self, dt: f32, _now: f32) {
        self.advance(dt);
    }

    /// Driven from the page's scroll tracker, not from raw input.
    fn handle_event(&mut self, _event: &UiEvent) -> bool {
        false
    }
}
