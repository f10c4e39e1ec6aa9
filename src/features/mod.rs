pub mod marquee;
pub mod nav;
pub mod pointer;
pub mod reveal;
pub mod sections;
pub mod sequencer;
pub mod simulators;
pub mod status;

use crate::app::UiEvent;

/// Per-frame animated element fed by input events.
pub trait Feature {
    fn name(&self) -> &'static str;
    fn update(&mut self, dt: f32, now: f32);
    fn handle_event(&mut self, event: &UiEvent) -> bool;
}
