#![forbid(unsafe_code)]

//! Presenter: diffed, style-tracked terminal output.
//!
//! The presenter keeps the last presented buffer and only emits cells that
//! changed. Style escapes are emitted when the style differs from the one
//! already active, and the cursor is only repositioned when the next dirty
//! cell is not where the previous print left it. Output is buffered and
//! flushed once per frame.
//!
//! Translucent colours are flattened against the palette before emission:
//! backgrounds over the base background, foregrounds over the flattened cell
//! background.

use std::io::{self, BufWriter, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba, StyleFlags};
use crate::frame::Frame;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    flags: StyleFlags,
}

/// Counters for one `present` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentStats {
    pub cells_written: usize,
    pub full_redraw: bool,
}

#[derive(Debug)]
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    previous: Option<Buffer>,
    style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
    base_fg: PackedRgba,
    base_bg: PackedRgba,
}

impl<W: Write> Presenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
            style: None,
            cursor: None,
            base_fg: PackedRgba::rgb(229, 231, 235),
            base_bg: PackedRgba::rgb(17, 24, 39),
        }
    }

    /// Colours used for transparent cells. Changing them forces a full redraw.
    pub fn set_palette(&mut self, fg: PackedRgba, bg: PackedRgba) {
        if (fg, bg) != (self.base_fg, self.base_bg) {
            self.base_fg = fg;
            self.base_bg = bg;
            self.reset();
        }
    }

    /// Forget the previous frame so the next present redraws everything.
    pub fn reset(&mut self) {
        self.previous = None;
        self.style = None;
        self.cursor = None;
    }

    /// Emit the difference between `frame` and the previously presented frame.
    pub fn present(&mut self, frame: &Frame) -> io::Result<PresentStats> {
        let next = &frame.buffer;
        let full_redraw = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != next.width() || prev.height() != next.height());

        let mut stats = PresentStats {
            cells_written: 0,
            full_redraw,
        };

        queue!(self.writer, Hide)?;
        if full_redraw {
            queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor, Clear(ClearType::All))?;
            self.style = None;
            self.cursor = None;
        }

        for y in 0..next.height() {
            let mut x = 0;
            while x < next.width() {
                let Some(cell) = next.get(x, y).copied() else {
                    break;
                };
                let width = cell.content.width().max(1) as u16;
                if cell.is_continuation() {
                    x += 1;
                    continue;
                }
                if full_redraw || self.is_dirty(next, x, y, width) {
                    self.emit_cell(x, y, cell)?;
                    stats.cells_written += 1;
                }
                x = x.saturating_add(width);
            }
        }

        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        self.style = None;
        if let Some((cx, cy)) = frame.cursor_position {
            queue!(self.writer, MoveTo(cx, cy), Show)?;
            self.cursor = Some((cx, cy));
        }
        self.writer.flush()?;

        tracing::trace!(
            target: "folio.render",
            cells = stats.cells_written,
            full = stats.full_redraw,
            "frame presented"
        );
        match &mut self.previous {
            Some(prev) if !full_redraw => prev.clone_from(next),
            _ => self.previous = Some(next.clone()),
        }
        Ok(stats)
    }

    fn is_dirty(&self, next: &Buffer, x: u16, y: u16, width: u16) -> bool {
        let Some(prev) = &self.previous else {
            return true;
        };
        (0..width).any(|i| prev.get(x + i, y) != next.get(x + i, y))
    }

    fn emit_cell(&mut self, x: u16, y: u16, cell: Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.writer, MoveTo(x, y))?;
        }

        let bg = cell.bg.over(self.base_bg);
        let fg = if cell.fg.a() == 0 { self.base_fg } else { cell.fg };
        let fg = fg.over(bg);
        let style = CellStyle {
            fg,
            bg,
            flags: cell.flags,
        };
        if self.style != Some(style) {
            self.emit_style(style)?;
        }

        let glyph = match cell.content {
            CellContent::Char(c) if !c.is_control() => c,
            _ => ' ',
        };
        queue!(self.writer, Print(glyph))?;
        let advance = cell.content.width().max(1) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    fn emit_style(&mut self, style: CellStyle) -> io::Result<()> {
        let flags_changed = self.style.is_none_or(|s| s.flags != style.flags);
        if flags_changed {
            queue!(self.writer, SetAttribute(Attribute::Reset))?;
            for (flag, attr) in [
                (StyleFlags::BOLD, Attribute::Bold),
                (StyleFlags::DIM, Attribute::Dim),
                (StyleFlags::ITALIC, Attribute::Italic),
                (StyleFlags::UNDERLINE, Attribute::Underlined),
                (StyleFlags::REVERSE, Attribute::Reverse),
            ] {
                if style.flags.contains(flag) {
                    queue!(self.writer, SetAttribute(attr))?;
                }
            }
        }
        if flags_changed || self.style.is_none_or(|s| s.fg != style.fg) {
            queue!(self.writer, SetForegroundColor(to_color(style.fg)))?;
        }
        if flags_changed || self.style.is_none_or(|s| s.bg != style.bg) {
            queue!(self.writer, SetBackgroundColor(to_color(style.bg)))?;
        }
        self.style = Some(style);
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

fn to_color(c: PackedRgba) -> Color {
    Color::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::Draw;

    fn frame_with(text: &str) -> Frame {
        let mut frame = Frame::new(12, 2);
        frame.buffer.print_text(0, 0, text, Cell::default());
        frame
    }

    fn present_twice(first: &Frame, second: &Frame) -> (PresentStats, PresentStats, String) {
        let mut presenter = Presenter::new(Vec::new());
        let a = presenter.present(first).unwrap();
        let b = presenter.present(second).unwrap();
        let out = presenter.into_inner().unwrap();
        (a, b, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn first_present_is_full_redraw() {
        let mut presenter = Presenter::new(Vec::new());
        let stats = presenter.present(&frame_with("Hi")).unwrap();
        assert!(stats.full_redraw);
        assert_eq!(stats.cells_written, 24);
        let out = String::from_utf8(presenter.into_inner().unwrap()).unwrap();
        assert!(out.contains("Hi"));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let frame = frame_with("Hello");
        let (_, second, _) = present_twice(&frame, &frame);
        assert!(!second.full_redraw);
        assert_eq!(second.cells_written, 0);
    }

    #[test]
    fn only_changed_cells_are_written() {
        let (_, second, out) = present_twice(&frame_with("Hello"), &frame_with("Jello"));
        assert_eq!(second.cells_written, 1);
        assert!(out.contains('J'));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&Frame::new(4, 1)).unwrap();
        let stats = presenter.present(&Frame::new(5, 1)).unwrap();
        assert!(stats.full_redraw);
    }

    #[test]
    fn palette_change_forces_full_redraw() {
        let mut presenter = Presenter::new(Vec::new());
        let frame = frame_with("x");
        presenter.present(&frame).unwrap();
        presenter.set_palette(PackedRgba::BLACK, PackedRgba::WHITE);
        assert!(presenter.present(&frame).unwrap().full_redraw);
    }

    #[test]
    fn wide_char_counts_once() {
        let mut frame = Frame::new(4, 1);
        frame.buffer.print_text(0, 0, "界", Cell::default());
        let mut presenter = Presenter::new(Vec::new());
        let stats = presenter.present(&frame).unwrap();
        assert_eq!(stats.cells_written, 3);
    }
}
