pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Decelerating curves: `1 - (1 - t)^n` for n = 2, 3, 4.
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(2)
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_out_quart(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(4)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamps to [0, 1], mapping NaN to 0.
pub fn clamp01(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Fixed-length tween measured in seconds of host time.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_time: f32,
    pub duration: f32,
    pub current_time: f32,
}

impl Timeline {
    pub fn new(duration: f32) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
        }
    }

    pub fn start(&mut self, now: f32) {
        self.start_time = now;
        self.current_time = now;
    }

    pub fn update(&mut self, now: f32) {
        self.current_time = now;
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.current_time - self.start_time;
        clamp01(elapsed / self.duration)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f32 {
        ease_in_out(self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ease_out_curves_front_load_motion() {
        for ease in [ease_out_quad, ease_out_cubic, ease_out_quart] {
            assert_eq!(ease(0.0), 0.0);
            assert_eq!(ease(1.0), 1.0);
            assert!(ease(0.5) > 0.5);
        }
        assert!(ease_out_quart(0.2) > ease_out_cubic(0.2));
        assert!(ease_out_cubic(0.2) > ease_out_quad(0.2));
    }

    #[test]
    fn timeline_progress_is_clamped() {
        let mut tl = Timeline::new(2.0);
        tl.start(10.0);
        tl.update(9.0);
        assert_eq!(tl.progress(), 0.0);
        tl.update(11.0);
        assert!((tl.progress() - 0.5).abs() < 1e-6);
        tl.update(20.0);
        assert_eq!(tl.progress(), 1.0);
        assert!(tl.is_complete());
    }

    #[test]
    fn zero_length_timeline_is_already_complete() {
        let tl = Timeline::new(0.0);
        assert!(tl.is_complete());
    }

    #[test]
    fn clamp01_swallows_nan() {
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(3.0), 1.0);
    }
}
