#![forbid(unsafe_code)]

//! Cell grid with clipping and opacity stacks.
//!
//! Screens draw into a [`Buffer`]; the presenter diffs consecutive buffers.
//!
//! - Writes outside the current scissor rectangle are discarded.
//! - Every write is scaled by the product of the opacity stack.
//! - Backgrounds composite source-over the existing background, so a
//!   translucent overlay tints whatever is beneath it.
//! - Wide characters occupy a head cell plus continuation cells and are
//!   written atomically: if any part falls outside the clip, nothing is written.

use folio_core::geometry::Rect;

use crate::cell::{Cell, CellContent};

#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    scissor_stack: Vec<Rect>,
    opacity_stack: Vec<f32>,
}

impl Buffer {
    /// A buffer of default (empty, transparent) cells.
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
            scissor_stack: vec![Rect::from_size(width, height)],
            opacity_stack: vec![1.0],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn current_scissor(&self) -> Rect {
        self.scissor_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.area())
    }

    /// Effective opacity: the product of every pushed value.
    pub fn current_opacity(&self) -> f32 {
        self.opacity_stack.last().copied().unwrap_or(1.0)
    }

    /// Restrict writes to `rect` intersected with the current clip.
    pub fn push_scissor(&mut self, rect: Rect) {
        let clipped = self.current_scissor().intersection(&rect);
        self.scissor_stack.push(clipped);
    }

    /// The base clip (the whole buffer) is never popped.
    pub fn pop_scissor(&mut self) {
        if self.scissor_stack.len() > 1 {
            self.scissor_stack.pop();
        }
    }

    pub fn push_opacity(&mut self, opacity: f32) {
        let combined = self.current_opacity() * opacity.clamp(0.0, 1.0);
        self.opacity_stack.push(combined);
    }

    pub fn pop_opacity(&mut self) {
        if self.opacity_stack.len() > 1 {
            self.opacity_stack.pop();
        }
    }

    /// Write a cell, honouring the clip, opacity, and wide-character layout.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let width = cell.content.width().max(1);
        let scissor = self.current_scissor();
        for i in 0..width {
            let Some(cx) = x.checked_add(i as u16) else {
                return;
            };
            if self.index(cx, y).is_none() || !scissor.contains(cx, y) {
                return;
            }
        }

        self.release_overlap(x, y);
        for i in 1..width {
            self.release_overlap(x + i as u16, y);
        }

        let opacity = self.current_opacity();
        let mut incoming = cell;
        if opacity < 1.0 {
            incoming.fg = incoming.fg.with_opacity(opacity);
            incoming.bg = incoming.bg.with_opacity(opacity);
        }

        if let Some(idx) = self.index(x, y) {
            let below = self.cells[idx];
            incoming.bg = incoming.bg.over(below.bg);
            self.cells[idx] = incoming;
        }
        for i in 1..width {
            if let Some(idx) = self.index(x + i as u16, y) {
                let bg = self.cells[idx].bg;
                self.cells[idx] = Cell {
                    bg: incoming.bg.over(bg),
                    ..Cell::CONTINUATION
                };
            }
        }
    }

    /// Clear any wide character that overlaps `(x, y)` so no orphaned halves remain.
    fn release_overlap(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else { return };
        let current = self.cells[idx];
        if current.content.width() > 1 {
            for i in 1..current.content.width() {
                if let Some(tail) = self.index(x + i as u16, y)
                    && self.cells[tail].is_continuation()
                {
                    self.cells[tail].content = CellContent::Empty;
                }
            }
        } else if current.is_continuation() {
            let mut head_x = x;
            while head_x > 0 {
                head_x -= 1;
                let Some(head_idx) = self.index(head_x, y) else { break };
                let head = self.cells[head_idx];
                if head.is_continuation() {
                    continue;
                }
                let width = head.content.width();
                if head_x as usize + width > x as usize {
                    self.cells[head_idx].content = CellContent::Empty;
                    for i in 1..width {
                        if let Some(tail) = self.index(head_x + i as u16, y)
                            && self.cells[tail].is_continuation()
                        {
                            self.cells[tail].content = CellContent::Empty;
                        }
                    }
                }
                break;
            }
        }
    }

    /// Fill `rect` (clipped) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = self.current_scissor().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Reset every cell, ignoring clip and opacity.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Text of row `y` with continuation cells skipped and trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = y as usize * self.width as usize;
        let mut line: String = self.cells[start..start + self.width as usize]
            .iter()
            .filter_map(|c| match c.content {
                CellContent::Empty => Some(' '),
                CellContent::Char(ch) => Some(ch),
                CellContent::Continuation => None,
            })
            .collect();
        line.truncate(line.trim_end().len());
        line
    }

    /// Every row, joined with newlines.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether two buffers have identical dimensions and cells.
    pub fn content_eq(&self, other: &Buffer) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}
