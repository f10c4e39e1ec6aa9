use super::anim::{clamp01, lerp};
use super::scroll::ProgressSnapshot;
use anyhow::{ensure, Result};

/// Values that can be linearly blended.
pub trait Mix: Copy {
    fn mix(self, other: Self, t: f32) -> Self;
}

impl Mix for f32 {
    fn mix(self, other: Self, t: f32) -> Self {
        lerp(self, other, t)
    }
}

// Colour channels, 2-D offsets and the like.
impl<const N: usize> Mix for [f32; N] {
    fn mix(self, other: Self, t: f32) -> Self {
        let mut out = self;
        for (o, b) in out.iter_mut().zip(other) {
            *o = lerp(*o, b, t);
        }
        out
    }
}

/// A single `[a, b] -> [c, d]` interpolation.
///
/// Input is clamped to `[0, 1]` and then to `[a, b]`, so the output never
/// leaves the declared output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMap<T> {
    input: [f32; 2],
    output: [T; 2],
}

impl<T: Mix> RangeMap<T> {
    pub fn new(input: [f32; 2], output: [T; 2]) -> Result<Self> {
        let [a, b] = input;
        ensure!(
            a.is_finite() && b.is_finite() && a < b,
            "input range must be finite and increasing, got [{a}, {b}]"
        );
        Ok(Self { input, output })
    }

    pub fn input(&self) -> [f32; 2] {
        self.input
    }

    pub fn output(&self) -> [T; 2] {
        self.output
    }

    pub fn map(&self, progress: f32) -> T {
        let v = clamp01(progress);
        let [a, b] = self.input;
        if v <= a {
            self.output[0]
        } else if v >= b {
            self.output[1]
        } else {
            self.output[0].mix(self.output[1], (v - a) / (b - a))
        }
    }
}

/// Multi-stop piecewise-linear map, e.g. `[0, 0.5, 1] -> [0, 1, 0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes<T> {
    input: Vec<f32>,
    output: Vec<T>,
}

impl<T: Mix> Keyframes<T> {
    pub fn new(input: Vec<f32>, output: Vec<T>) -> Result<Self> {
        ensure!(input.len() >= 2, "keyframes need at least two stops, got {}", input.len());
        ensure!(
            input.len() == output.len(),
            "keyframe input has {} stops but output has {}",
            input.len(),
            output.len()
        );
        ensure!(
            input.iter().all(|v| v.is_finite()),
            "keyframe stops must be finite"
        );
        ensure!(
            input.windows(2).all(|w| w[0] < w[1]),
            "keyframe stops must be strictly increasing: {:?}",
            input
        );
        Ok(Self { input, output })
    }

    pub fn map(&self, progress: f32) -> T {
        let v = clamp01(progress);
        let last = self.input.len() - 1;
        if v <= self.input[0] {
            return self.output[0];
        }
        if v >= self.input[last] {
            return self.output[last];
        }
        // First stop strictly greater than v; always in 1..=last here.
        let hi = self.input.partition_point(|&stop| stop <= v);
        let lo = hi - 1;
        let t = (v - self.input[lo]) / (self.input[hi] - self.input[lo]);
        self.output[lo].mix(self.output[hi], t)
    }
}

/// Which progress value a channel reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Raw,
    Smoothed,
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub name: &'static str,
    pub source: Source,
    pub map: RangeMap<f32>,
}

/// Named visual channels driven from one progress snapshot.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    channels: Vec<Channel>,
}

impl ChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        name: &'static str,
        source: Source,
        input: [f32; 2],
        output: [f32; 2],
    ) -> Result<Self> {
        self.channels.push(Channel {
            name,
            source,
            map: RangeMap::new(input, output)?,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.channels.iter().map(|c| c.name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }

    /// Writes one value per channel into `out`, in declaration order.
    /// Extra slots in `out` are left untouched.
    pub fn evaluate(&self, snapshot: ProgressSnapshot, out: &mut [f32]) {
        for (slot, channel) in out.iter_mut().zip(&self.channels) {
            let progress = match channel.source {
                Source::Raw => snapshot.raw,
                Source::Smoothed => snapshot.smoothed,
            };
            *slot = channel.map.map(progress);
        }
    }

    pub fn value(&self, name: &str, snapshot: ProgressSnapshot) -> Option<f32> {
        self.channels.iter().find(|c| c.name == name).map(|c| {
            let progress = match c.source {
                Source::Raw => snapshot.raw,
                Source::Smoothed => snapshot.smoothed,
            };
            c.map.map(progress)
        })
    }
}
