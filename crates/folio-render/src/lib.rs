#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, frames, text layout, and the terminal presenter.

pub mod buffer;
pub mod cell;
pub mod drawing;
pub mod frame;
pub mod presenter;
pub mod text;
