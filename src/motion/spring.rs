use super::anim::{ease_out_cubic, lerp};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Integration substep, in seconds.
const SUBSTEP: f32 = 0.001;
/// Longest frame delta a single `step` will integrate.
const MAX_FRAME: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub damping: f32,
    pub stiffness: f32,
    pub mass: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            stiffness: 100.0,
            mass: 1.0,
        }
    }
}

impl SpringConfig {
    /// Heavy, overdamped follow used for the hero splash.
    pub fn splash() -> Self {
        Self {
            damping: 30.0,
            stiffness: 100.0,
            mass: 1.5,
        }
    }

    /// Light and snappy, for magnetic buttons.
    pub fn magnetic() -> Self {
        Self {
            damping: 15.0,
            stiffness: 150.0,
            mass: 0.1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.stiffness.is_finite() && self.stiffness > 0.0,
            "spring stiffness must be positive, got {}",
            self.stiffness
        );
        ensure!(
            self.mass.is_finite() && self.mass > 0.0,
            "spring mass must be positive, got {}",
            self.mass
        );
        ensure!(
            self.damping.is_finite() && self.damping > 0.0,
            "spring damping must be positive, got {}",
            self.damping
        );
        Ok(())
    }
}

/// Damped spring chasing a target value.
#[derive(Debug, Clone)]
pub struct Spring {
    config: SpringConfig,
    position: f32,
    velocity: f32,
    target: f32,
    pub rest_delta: f32,
    pub rest_speed: f32,
}

impl Spring {
    pub fn new(config: SpringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            rest_delta: 1e-4,
            rest_speed: 1e-3,
        })
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Teleports to `value` and stops.
    pub fn jump(&mut self, value: f32) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn set_target(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target;
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn value(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_at_rest(&self) -> bool {
        (self.position - self.target).abs() < self.rest_delta
            && self.velocity.abs() < self.rest_speed
    }

    /// Integrates `dt` seconds. Returns true once settled on the target.
    ///
    /// Each substep is backward Euler, solved for the new velocity in closed
    /// form. That stays bounded for any positive config, however light the
    /// mass or stiff the spring.
    pub fn step(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return self.is_at_rest();
        }
        let SpringConfig { damping, stiffness, mass } = self.config;
        let (c, k) = (damping / mass, stiffness / mass);
        let mut remaining = dt.min(MAX_FRAME);
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP);
            let offset = self.position - self.target;
            self.velocity = (self.velocity - h * k * offset) / (1.0 + h * c + h * h * k);
            self.position += self.velocity * h;
            remaining -= h;
        }
        if self.is_at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
            return true;
        }
        false
    }
}

/// Frame-rate independent lerp smoothing.
///
/// `factor` is the fraction of the remaining distance covered per 60 Hz
/// frame.
#[derive(Debug, Clone)]
pub struct LowPass {
    factor: f32,
    value: f32,
    target: f32,
    pub epsilon: f32,
}

impl LowPass {
    pub fn new(factor: f32) -> Result<Self> {
        ensure!(
            factor > 0.0 && factor <= 1.0,
            "low-pass factor must be in (0, 1], got {factor}"
        );
        Ok(Self {
            factor,
            value: 0.0,
            target: 0.0,
            epsilon: 1e-3,
        })
    }

    pub fn jump(&mut self, value: f32) {
        self.value = value;
        self.target = value;
    }

    pub fn set_target(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target;
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn step(&mut self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            let alpha = 1.0 - (1.0 - self.factor).powf(dt * 60.0);
            self.value += (self.target - self.value) * alpha;
            if (self.target - self.value).abs() < self.epsilon {
                self.value = self.target;
            }
        }
        self.value
    }
}

/// Time-lag smoothing: each new target restarts a tween from the current
/// value that lands on the target `lag` seconds later.
///
/// A zero lag follows the target immediately.
#[derive(Debug, Clone)]
pub struct Scrub {
    lag: f32,
    ease: fn(f32) -> f32,
    from: f32,
    target: f32,
    value: f32,
    elapsed: f32,
}

impl Scrub {
    pub fn new(lag: f32) -> Result<Self> {
        ensure!(
            lag.is_finite() && lag >= 0.0,
            "scrub lag must be a non-negative number of seconds, got {lag}"
        );
        Ok(Self {
            lag,
            ease: ease_out_cubic,
            from: 0.0,
            target: 0.0,
            value: 0.0,
            elapsed: 0.0,
        })
    }

    pub fn with_ease(mut self, ease: fn(f32) -> f32) -> Self {
        self.ease = ease;
        self
    }

    pub fn lag(&self) -> f32 {
        self.lag
    }

    pub fn jump(&mut self, value: f32) {
        self.from = value;
        self.target = value;
        self.value = value;
        self.elapsed = self.lag;
    }

    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() || target == self.target {
            return;
        }
        self.from = self.value;
        self.target = target;
        self.elapsed = 0.0;
        if self.lag == 0.0 {
            self.value = target;
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_at_rest(&self) -> bool {
        self.value == self.target
    }

    /// Advances the tween. Returns true once it has landed on the target.
    pub fn step(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 && !self.is_at_rest() {
            self.elapsed += dt;
            if self.elapsed >= self.lag {
                self.value = self.target;
            } else {
                let t = (self.ease)(self.elapsed / self.lag);
                self.value = lerp(self.from, self.target, t);
            }
        }
        self.is_at_rest()
    }
}
