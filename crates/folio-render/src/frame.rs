#![forbid(unsafe_code)]

//! Render target handed to `Model::view`.

use folio_core::geometry::Rect;

use crate::buffer::Buffer;

/// One render pass: the cell grid plus an optional visible cursor.
#[derive(Debug, Clone)]
pub struct Frame {
    pub buffer: Buffer,
    /// Buffer-relative cursor position; `None` keeps the cursor hidden.
    pub cursor_position: Option<(u16, u16)>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            cursor_position: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[inline]
    pub fn area(&self) -> Rect {
        self.buffer.area()
    }

    /// Show the cursor at `(x, y)` after presenting; out-of-bounds positions hide it.
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor_position = position.filter(|&(x, y)| self.area().contains(x, y));
    }
}
