//! Sounder Core - WAV loading, note synthesis, and effected playback
//!
//! The engine keeps one device-resident buffer per sound identifier,
//! synthesizes missing note WAVs on demand, and attaches one of a fixed
//! set of DSP effects to a buffer before playback.

pub mod backend;
pub mod config;
pub mod engine;
pub mod fx;
pub mod synth;
pub mod types;
pub mod wav;

pub use types::*;
