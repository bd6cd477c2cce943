#![forbid(unsafe_code)]

//! The closed set of panels and their static metadata.

use std::fmt;

use folio_render::cell::PackedRgba;

/// One full-screen view. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PanelId {
    #[default]
    Intro,
    Map,
    About,
    Projects,
    Skills,
    Testimonials,
    Contact,
}

impl PanelId {
    pub const ALL: [PanelId; 7] = [
        PanelId::Intro,
        PanelId::Map,
        PanelId::About,
        PanelId::Projects,
        PanelId::Skills,
        PanelId::Testimonials,
        PanelId::Contact,
    ];

    /// Panels reachable as hub nodes, in the order they are drawn.
    pub const CONTENT: [PanelId; 5] = [
        PanelId::About,
        PanelId::Projects,
        PanelId::Skills,
        PanelId::Testimonials,
        PanelId::Contact,
    ];

    /// Entries of the compact tab bar.
    pub const TAB_ORDER: [PanelId; 6] = [
        PanelId::Map,
        PanelId::About,
        PanelId::Projects,
        PanelId::Skills,
        PanelId::Testimonials,
        PanelId::Contact,
    ];

    /// Stable lowercase identifier.
    pub const fn key(self) -> &'static str {
        match self {
            PanelId::Intro => "intro",
            PanelId::Map => "map",
            PanelId::About => "about",
            PanelId::Projects => "projects",
            PanelId::Skills => "skills",
            PanelId::Testimonials => "testimonials",
            PanelId::Contact => "contact",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Heading shown at the top of the panel.
    pub const fn title(self) -> &'static str {
        match self {
            PanelId::Intro => "Creative Developer",
            PanelId::Map => "Portfolio Map",
            PanelId::About => "About Me",
            PanelId::Projects => "Featured Projects",
            PanelId::Skills => "Skills & Expertise",
            PanelId::Testimonials => "Client Testimonials",
            PanelId::Contact => "Get In Touch",
        }
    }

    /// Short label used by hub nodes and tabs.
    pub const fn label(self) -> &'static str {
        match self {
            PanelId::Intro => "Intro",
            PanelId::Map => "Map",
            PanelId::About => "About",
            PanelId::Projects => "Projects",
            PanelId::Skills => "Skills",
            PanelId::Testimonials => "Testimonials",
            PanelId::Contact => "Contact",
        }
    }

    /// Content panels scroll, carry a "Back to Map" button, and host reveal nodes.
    pub const fn is_content(self) -> bool {
        !matches!(self, PanelId::Intro | PanelId::Map)
    }

    /// Node position on the hub as fractions of the map area.
    pub const fn hub_position(self) -> Option<(f32, f32)> {
        match self {
            PanelId::About => Some((0.25, 0.30)),
            PanelId::Projects => Some((0.65, 0.40)),
            PanelId::Skills => Some((0.40, 0.65)),
            PanelId::Testimonials => Some((0.15, 0.70)),
            PanelId::Contact => Some((0.80, 0.75)),
            PanelId::Intro | PanelId::Map => None,
        }
    }

    pub const fn accent(self) -> PackedRgba {
        match self {
            PanelId::About => PackedRgba::rgb(0x06, 0xb6, 0xd4),
            PanelId::Projects => PackedRgba::rgb(0x8b, 0x5c, 0xf6),
            PanelId::Skills => PackedRgba::rgb(0x22, 0xc5, 0x5e),
            PanelId::Testimonials => PackedRgba::rgb(0xf5, 0x9e, 0x0b),
            PanelId::Contact => PackedRgba::rgb(0xf4, 0x3f, 0x5e),
            PanelId::Intro | PanelId::Map => PackedRgba::rgb(0x4f, 0x46, 0xe5),
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
