#![forbid(unsafe_code)]

//! Cell-space geometry: rectangles for layout, clipping, and hit testing.

/// A rectangle in terminal cells (0-indexed, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles; empty (at the origin) when disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if x < right && y < bottom {
            Rect::new(x, y, right - x, bottom - y)
        } else {
            Rect::default()
        }
    }

    /// Shrink by per-side margins, saturating at zero size.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x.saturating_add(margin.left),
            y: self.y.saturating_add(margin.top),
            width: self.width.saturating_sub(margin.horizontal_sum()),
            height: self.height.saturating_sub(margin.vertical_sum()),
        }
    }

    /// A `width` x `height` rectangle centred inside `self`, clamped to fit.
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }

    /// Split off the top `rows` rows. Returns `(top, rest)`.
    pub fn split_top(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, rows),
            Rect::new(self.x, self.y + rows, self.width, self.height - rows),
        )
    }

    /// Split off the bottom `rows` rows. Returns `(rest, bottom)`.
    pub fn split_bottom(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        let rest = self.height - rows;
        (
            Rect::new(self.x, self.y, self.width, rest),
            Rect::new(self.x, self.y + rest, self.width, rows),
        )
    }

    /// Cell at a fractional position inside the rectangle.
    ///
    /// `fx`/`fy` are clamped to `[0, 1]`; the result always lies inside a
    /// non-empty rectangle.
    pub fn point_at(&self, fx: f32, fy: f32) -> (u16, u16) {
        let fx = fx.clamp(0.0, 1.0);
        let fy = fy.clamp(0.0, 1.0);
        let dx = ((self.width.saturating_sub(1)) as f32 * fx).round() as u16;
        let dy = ((self.height.saturating_sub(1)) as f32 * fy).round() as u16;
        (self.x + dx, self.y + dy)
    }
}

/// Per-side margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    pub const fn all(val: u16) -> Self {
        Self::new(val, val, val, val)
    }

    /// Left and right only.
    pub const fn horizontal(val: u16) -> Self {
        Self::new(0, val, 0, val)
    }

    pub const fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn horizontal_sum(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    pub const fn vertical_sum(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }
}
