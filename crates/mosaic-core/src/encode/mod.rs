//! Visual encoding: pure, total mappings from data attributes to color,
//! opacity and label content.

pub mod inflation;
pub mod label;
pub mod opacity;
pub mod palette;

pub use inflation::inflation_color;
pub use label::{format_magnitude, LabelPolicy, LabelRole, TextLabel};
pub use opacity::OpacityScale;
pub use palette::{category_color, continent_color, sector_color, Rgb};
