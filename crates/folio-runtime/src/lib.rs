#![forbid(unsafe_code)]

//! Elm-style runtime: models, commands, timer subscriptions, a terminal
//! program loop, a deterministic simulator, and preference persistence.

pub mod program;
pub mod simulator;
pub mod state_persistence;
pub mod subscription;

pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::ProgramSimulator;
pub use state_persistence::{PreferenceStore, StorageBackend, StorageError, StorageResult};
pub use subscription::{After, Every, Schedule, SubId, Subscription};
