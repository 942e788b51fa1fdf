//! Static category palettes. Every lookup is total: unknown names get
//! [`FALLBACK`].

use serde::{Deserialize, Serialize};

use crate::record::Sector;

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color for categories with no palette entry.
pub const FALLBACK: Rgb = Rgb::new(158, 158, 158);

/// Continent → fill color.
pub fn continent_color(name: &str) -> Rgb {
    match name {
        "Africa"        => Rgb::new(228, 170,  60), // ochre
        "Asia"          => Rgb::new(220,  80,  70), // brick red
        "Europe"        => Rgb::new( 78, 121, 167), // steel blue
        "North America" => Rgb::new( 89, 161,  79), // green
        "South America" => Rgb::new(237, 201,  72), // yellow
        "Oceania"       => Rgb::new(118, 183, 178), // teal
        "Antarctica"    => Rgb::new(186, 176, 172), // stone
        _               => FALLBACK,
    }
}

/// Sector → fill color for sector slices.
pub fn sector_color(sector: Sector) -> Rgb {
    match sector {
        Sector::Agriculture => Rgb::new(140, 190,  80),
        Sector::Industry    => Rgb::new(120, 120, 130),
        Sector::Service     => Rgb::new( 90, 150, 210),
        Sector::Export      => Rgb::new(240, 150,  60),
        Sector::Import      => Rgb::new(175, 122, 161),
    }
}

/// Any category name: continents first, then sector names, else fallback.
pub fn category_color(name: &str) -> Rgb {
    let continent = continent_color(name);
    if continent != FALLBACK {
        return continent;
    }
    Sector::ALL
        .iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
        .map(|&s| sector_color(s))
        .unwrap_or(FALLBACK)
}
