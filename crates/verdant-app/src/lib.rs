//! Headless host for the Verdant terrain streamer.
//!
//! Resolves platform directories, drives a fixed-timestep loop and feeds a
//! scripted viewer to the streaming controller, with bindings that record
//! instead of render.

pub mod game_loop;
pub mod headless;
pub mod platform;
pub mod run;

pub use run::{AppError, FlyThrough, RunSummary, run_headless};
