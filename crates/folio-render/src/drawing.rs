#![forbid(unsafe_code)]

//! Drawing primitives on top of [`Buffer`].
//!
//! All operations go through [`Buffer::set`], so clipping and opacity apply.

use folio_core::geometry::Rect;

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba};
use crate::text;

/// Box-drawing glyph set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    pub const SQUARE: Self = Self::new('┌', '┐', '└', '┘', '─', '│');
    pub const ROUNDED: Self = Self::new('╭', '╮', '╰', '╯', '─', '│');
    pub const DOUBLE: Self = Self::new('╔', '╗', '╚', '╝', '═', '║');
    pub const HEAVY: Self = Self::new('┏', '┓', '┗', '┛', '━', '┃');
    pub const ASCII: Self = Self::new('+', '+', '+', '+', '-', '|');

    const fn new(
        top_left: char,
        top_right: char,
        bottom_left: char,
        bottom_right: char,
        horizontal: char,
        vertical: char,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            horizontal,
            vertical,
        }
    }
}

/// Drawing operations shared by every screen.
pub trait Draw {
    fn draw_horizontal_line(&mut self, x: u16, y: u16, width: u16, cell: Cell);

    /// Print `text` from `(x, y)`, stopping at `max_x` (exclusive).
    ///
    /// Colours and flags come from `style`. Wide characters that would straddle
    /// `max_x` are not started. Returns the column after the last glyph.
    fn print_text_clipped(&mut self, x: u16, y: u16, text: &str, style: Cell, max_x: u16) -> u16;

    /// [`Draw::print_text_clipped`] bounded by the buffer edge.
    fn print_text(&mut self, x: u16, y: u16, text: &str, style: Cell) -> u16;

    /// Word-wrap `text` into `area`, one line per row. Returns rows used.
    fn print_wrapped(&mut self, area: Rect, text: &str, style: Cell) -> u16;

    /// Outline `rect` with `chars`. Rectangles under 2x2 are ignored.
    fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Cell);

    /// Border plus interior fill.
    fn draw_box(&mut self, rect: Rect, chars: BorderChars, border: Cell, fill: Cell);

    /// Recolour cells in `rect` without touching their content.
    fn paint_area(&mut self, rect: Rect, fg: Option<PackedRgba>, bg: Option<PackedRgba>);

    /// Horizontal gauge: `fraction` of `width` filled with `filled`, the rest with `track`.
    fn draw_meter(&mut self, x: u16, y: u16, width: u16, fraction: f32, filled: Cell, track: Cell);
}

impl Draw for Buffer {
    fn draw_horizontal_line(&mut self, x: u16, y: u16, width: u16, cell: Cell) {
        for i in 0..width {
            self.set(x.saturating_add(i), y, cell);
        }
    }

    fn print_text_clipped(&mut self, x: u16, y: u16, text: &str, style: Cell, max_x: u16) -> u16 {
        use unicode_width::UnicodeWidthChar;

        let mut cx = x;
        for c in text.chars() {
            let width = c.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if cx.saturating_add(width) > max_x {
                break;
            }
            self.set(cx, y, style.with_char(c));
            cx = cx.saturating_add(width);
        }
        cx
    }

    fn print_text(&mut self, x: u16, y: u16, text: &str, style: Cell) -> u16 {
        let max_x = self.width();
        self.print_text_clipped(x, y, text, style, max_x)
    }

    fn print_wrapped(&mut self, area: Rect, text: &str, style: Cell) -> u16 {
        let mut rows = 0;
        for line in text::wrap(text, area.width as usize) {
            if rows >= area.height {
                break;
            }
            self.print_text_clipped(area.x, area.y + rows, &line, style, area.right());
            rows += 1;
        }
        rows
    }

    fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Cell) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);

        let h = style.with_char(chars.horizontal);
        let v = style.with_char(chars.vertical);
        for x in left + 1..right {
            self.set(x, top, h);
            self.set(x, bottom, h);
        }
        for y in top + 1..bottom {
            self.set(left, y, v);
            self.set(right, y, v);
        }
        self.set(left, top, style.with_char(chars.top_left));
        self.set(right, top, style.with_char(chars.top_right));
        self.set(left, bottom, style.with_char(chars.bottom_left));
        self.set(right, bottom, style.with_char(chars.bottom_right));
    }

    fn draw_box(&mut self, rect: Rect, chars: BorderChars, border: Cell, fill: Cell) {
        let interior = rect.inner(folio_core::geometry::Sides::all(1));
        if !interior.is_empty() {
            self.fill(interior, fill);
        }
        self.draw_border(rect, chars, border);
    }

    fn paint_area(&mut self, rect: Rect, fg: Option<PackedRgba>, bg: Option<PackedRgba>) {
        let clipped = rect.intersection(&self.area());
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    if let Some(fg) = fg {
                        cell.fg = fg;
                    }
                    if let Some(bg) = bg {
                        cell.bg = bg.over(cell.bg);
                    }
                }
            }
        }
    }

    fn draw_meter(&mut self, x: u16, y: u16, width: u16, fraction: f32, filled: Cell, track: Cell) {
        let fraction = fraction.clamp(0.0, 1.0);
        let lit = (width as f32 * fraction).round() as u16;
        for i in 0..width {
            let cell = if i < lit { filled } else { track };
            let cell = if matches!(cell.content, CellContent::Empty) {
                cell.with_char(' ')
            } else {
                cell
            };
            self.set(x.saturating_add(i), y, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_stops_at_max_x() {
        let mut buf = Buffer::new(20, 1);
        let end = buf.print_text_clipped(0, 0, "Hello World", Cell::default(), 5);
        assert_eq!(end, 5);
        assert_eq!(buf.row_text(0), "Hello");
    }

    #[test]
    fn wide_glyph_not_started_past_edge() {
        let mut buf = Buffer::new(3, 1);
        let end = buf.print_text(0, 0, "a界b", Cell::default());
        assert_eq!(end, 3);
        let end = buf.print_text(1, 0, "界界", Cell::default());
        assert_eq!(end, 3);
    }

    #[test]
    fn border_corners() {
        let mut buf = Buffer::new(4, 3);
        buf.draw_border(buf.area(), BorderChars::ROUNDED, Cell::default());
        assert_eq!(buf.row_text(0), "╭──╮");
        assert_eq!(buf.row_text(1), "│  │");
        assert_eq!(buf.row_text(2), "╰──╯");
    }

    #[test]
    fn box_fills_interior() {
        let mut buf = Buffer::new(5, 3);
        buf.draw_box(buf.area(), BorderChars::ASCII, Cell::default(), Cell::from_char('.'));
        assert_eq!(buf.row_text(1), "|...|");
    }

    #[test]
    fn wrapped_text_respects_height() {
        let mut buf = Buffer::new(8, 2);
        let rows = buf.print_wrapped(buf.area(), "one two three four five", Cell::default());
        assert_eq!(rows, 2);
        assert_eq!(buf.row_text(0), "one two");
        assert_eq!(buf.row_text(1), "three");
    }

    #[test]
    fn meter_fills_fraction() {
        let mut buf = Buffer::new(10, 1);
        buf.draw_meter(0, 0, 10, 0.9, Cell::from_char('█'), Cell::from_char('░'));
        assert_eq!(buf.row_text(0), "█████████░");
    }

    #[test]
    fn paint_keeps_content() {
        let mut buf = Buffer::new(2, 1);
        buf.print_text(0, 0, "ab", Cell::default());
        buf.paint_area(buf.area(), Some(PackedRgba::WHITE), None);
        assert_eq!(buf.row_text(0), "ab");
        assert_eq!(buf.get(1, 0).map(|c| c.fg), Some(PackedRgba::WHITE));
    }
}
