#![forbid(unsafe_code)]

//! Light/dark theme, its palettes, and its persisted form.
//!
//! The preference is a single key ([`THEME_KEY`]) holding `"dark"` or
//! `"light"`. A missing or unrecognised value means [`Theme::Light`].

use folio_render::cell::PackedRgba;
use folio_runtime::PreferenceStore;

/// Preference key holding the theme.
pub const THEME_KEY: &str = "portfolio-theme";

/// Schema version of the stored value.
pub const THEME_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Only `"dark"` selects the dark theme.
    pub fn parse(value: &str) -> Self {
        if value == "dark" { Theme::Dark } else { Theme::Light }
    }

    /// Read the stored preference, defaulting to light.
    pub fn load(store: &PreferenceStore) -> Self {
        store
            .get_as::<String>(THEME_KEY, THEME_VERSION)
            .map(|v| Theme::parse(&v))
            .unwrap_or_default()
    }

    /// Stage the preference in `store`. The caller decides when to flush.
    pub fn store(self, store: &PreferenceStore) {
        if let Err(e) = store.set_as(THEME_KEY, THEME_VERSION, &self.as_str()) {
            tracing::warn!(target: "folio.theme", error = %e, "failed to stage theme preference");
        }
    }

    pub const fn palette(self) -> Palette {
        match self {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }
}

/// Colours shared by every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: PackedRgba,
    pub surface: PackedRgba,
    pub fg: PackedRgba,
    pub muted: PackedRgba,
    pub border: PackedRgba,
    pub grid: PackedRgba,
    pub accent: PackedRgba,
    pub error: PackedRgba,
    pub success: PackedRgba,
    /// Filled button (black on light, white on dark).
    pub button_bg: PackedRgba,
    pub button_fg: PackedRgba,
    /// Backdrop behind modal overlays.
    pub scrim: PackedRgba,
}

const LIGHT: Palette = Palette {
    bg: PackedRgba::rgb(0xf9, 0xfa, 0xfb),
    surface: PackedRgba::rgb(0xff, 0xff, 0xff),
    fg: PackedRgba::rgb(0x11, 0x18, 0x27),
    muted: PackedRgba::rgb(0x6b, 0x72, 0x80),
    border: PackedRgba::rgb(0xd1, 0xd5, 0xdb),
    grid: PackedRgba::rgb(0xe5, 0xe7, 0xeb),
    accent: PackedRgba::rgb(0x8b, 0x5c, 0xf6),
    error: PackedRgba::rgb(0xef, 0x44, 0x44),
    success: PackedRgba::rgb(0x22, 0xc5, 0x5e),
    button_bg: PackedRgba::rgb(0x00, 0x00, 0x00),
    button_fg: PackedRgba::rgb(0xff, 0xff, 0xff),
    scrim: PackedRgba::rgba(0x00, 0x00, 0x00, 0x80),
};

const DARK: Palette = Palette {
    bg: PackedRgba::rgb(0x11, 0x18, 0x27),
    surface: PackedRgba::rgb(0x1f, 0x29, 0x37),
    fg: PackedRgba::rgb(0xf3, 0xf4, 0xf6),
    muted: PackedRgba::rgb(0x9c, 0xa3, 0xaf),
    border: PackedRgba::rgb(0x37, 0x41, 0x51),
    grid: PackedRgba::rgb(0x37, 0x41, 0x51),
    accent: PackedRgba::rgb(0xa7, 0x8b, 0xfa),
    error: PackedRgba::rgb(0xf8, 0x71, 0x71),
    success: PackedRgba::rgb(0x4a, 0xde, 0x80),
    button_bg: PackedRgba::rgb(0xff, 0xff, 0xff),
    button_fg: PackedRgba::rgb(0x00, 0x00, 0x00),
    scrim: PackedRgba::rgba(0x00, 0x00, 0x00, 0x80),
};
