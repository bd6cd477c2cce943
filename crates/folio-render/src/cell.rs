#![forbid(unsafe_code)]

//! Cells and colours.
//!
//! A [`Cell`] is one terminal grid position: a character plus colours and
//! style flags. Colours are straight-alpha RGBA so that translucent layers
//! (particles, fades, overlays) can be composited with [`PackedRgba::over`]
//! before being flattened for the terminal.

use unicode_width::UnicodeWidthChar;

/// A compact RGBA colour, laid out `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    const fn div_round_u8(numer: u64, denom: u64) -> u8 {
        let v = (numer + (denom / 2)) / denom;
        if v > 255 { 255 } else { v as u8 }
    }

    /// Porter-Duff source-over: `self` drawn on top of `dst`.
    pub fn over(self, dst: Self) -> Self {
        let s_a = self.a() as u64;
        if s_a == 255 {
            return self;
        }
        if s_a == 0 {
            return dst;
        }
        let d_a = dst.a() as u64;
        let inv_s_a = 255 - s_a;
        let numer_a = 255 * s_a + d_a * inv_s_a;
        if numer_a == 0 {
            return Self::TRANSPARENT;
        }
        let mix = |s: u8, d: u8| {
            Self::div_round_u8((s as u64) * s_a * 255 + (d as u64) * d_a * inv_s_a, numer_a)
        };
        Self::rgba(
            mix(self.r(), dst.r()),
            mix(self.g(), dst.g()),
            mix(self.b(), dst.b()),
            Self::div_round_u8(numer_a, 255),
        )
    }

    /// Scale alpha by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        let a = ((self.a() as f32) * opacity).round().clamp(0.0, 255.0) as u8;
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// Linear interpolation of all four channels; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::rgba(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
            mix(self.a(), other.a()),
        )
    }
}

bitflags::bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD          = 0b0000_0001;
        const DIM           = 0b0000_0010;
        const ITALIC        = 0b0000_0100;
        const UNDERLINE     = 0b0000_1000;
        const REVERSE       = 0b0010_0000;
    }
}

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CellContent {
    /// Nothing drawn; presented as a space.
    #[default]
    Empty,
    Char(char),
    /// Trailing half of a wide character to the left.
    Continuation,
}

impl CellContent {
    /// Display width in columns (0 for continuation cells).
    pub fn width(self) -> usize {
        match self {
            CellContent::Empty => 1,
            CellContent::Char(c) => c.width().unwrap_or(1).max(1),
            CellContent::Continuation => 0,
        }
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            CellContent::Char(c) => Some(c),
            _ => None,
        }
    }
}

/// One grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Cell {
    pub content: CellContent,
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub flags: StyleFlags,
}

impl Cell {
    pub const CONTINUATION: Self = Self {
        content: CellContent::Continuation,
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
        flags: StyleFlags::empty(),
    };

    #[must_use]
    pub const fn from_char(c: char) -> Self {
        Self {
            content: CellContent::Char(c),
            fg: PackedRgba::TRANSPARENT,
            bg: PackedRgba::TRANSPARENT,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn with_char(mut self, c: char) -> Self {
        self.content = CellContent::Char(c);
        self
    }

    #[must_use]
    pub const fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    #[must_use]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn is_continuation(&self) -> bool {
        matches!(self.content, CellContent::Continuation)
    }
}
