//! Tubeplay Core Library
//!
//! Search, streaming playback supervision, configuration and telemetry for the
//! tubeplay terminal player.

pub mod config;
pub mod playback;
pub mod search;
pub mod session;
pub mod telemetry;

mod dirs_compat;
