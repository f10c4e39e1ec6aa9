//! Scroll-driven and timer-driven motion for the story-wall landing page.

pub mod app;
pub mod config;
pub mod features;
pub mod motion;
