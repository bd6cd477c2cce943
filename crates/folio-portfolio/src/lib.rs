#![forbid(unsafe_code)]

//! folio: a map-navigated portfolio for the terminal.
//!
//! A loading screen gives way to an intro, a hub map, and five content
//! panels. Navigation is owned by [`nav::SectionMachine`]; input flows
//! through [`input::InputRouter`]; content panels reveal their cards with
//! [`reveal::RevealObserver`] as they scroll into view, while
//! [`particles::ParticleField`] drifts in the background. [`app::AppModel`]
//! wires it all to the runtime.

pub mod app;
pub mod chrome;
pub mod cli;
pub mod contact;
pub mod content;
pub mod input;
pub mod layout;
pub mod nav;
pub mod panel;
pub mod particles;
pub mod reveal;
pub mod screens;
pub mod theme;
