//! Scroll progress, range mapping and smoothing.

pub mod anim;
pub mod range;
pub mod scroll;
pub mod spring;

pub use range::{ChannelMap, Keyframes, Mix, RangeMap, Source};
pub use scroll::{Boundary, Geometry, ProgressSnapshot, ScrollRegion, ScrollTracker};
pub use spring::{LowPass, Scrub, Spring, SpringConfig};
