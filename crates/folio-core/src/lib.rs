#![forbid(unsafe_code)]

//! Core: terminal lifecycle, canonical input events, geometry, and animation primitives.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod terminal_session;
