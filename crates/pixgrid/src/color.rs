use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Colors offered in the palette bar, in display order.
pub const PALETTE: [&str; 16] = [
    "#FF0000", // red
    "#00FF00", // lime
    "#0000FF", // blue
    "#FFFF00", // yellow
    "#FF00FF", // magenta
    "#00FFFF", // cyan
    "#FFFFFF", // white
    "#000000", // black
    "#FFA500", // orange
    "#800080", // purple
    "#008000", // green
    "#FFC0CB", // pink
    "#A52A2A", // brown
    "#808080", // gray
    "#FFD700", // gold
    "#00FA9A", // spring green
];

pub const DEFAULT_COLOR: &str = "#ff0000";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must look like #rrggbb, got {0:?}")]
    Malformed(String),
    #[error("the palette has {len} colors, there is no color {0}", len = PALETTE.len())]
    NotInPalette(usize),
}

/// An RGB color in `#rrggbb` notation.
///
/// The text is kept as written so that stored pixels come back byte for byte;
/// comparison ignores case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> [u8; 3] {
        let hex = &self.0[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        [channel(0), channel(2), channel(4)]
    }

    pub fn palette() -> impl Iterator<Item = Color> {
        PALETTE.iter().map(|hex| Color(hex.to_string()))
    }

    pub fn from_palette(index: usize) -> Result<Color, ColorError> {
        PALETTE
            .get(index)
            .map(|hex| Color(hex.to_string()))
            .ok_or(ColorError::NotInPalette(index))
    }

    /// A palette position such as `14`, or a `#rrggbb` color.
    pub fn pick(choice: &str) -> Result<Color, ColorError> {
        match choice.parse::<usize>() {
            Ok(index) => Color::from_palette(index),
            Err(_) => choice.parse(),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color(DEFAULT_COLOR.to_string())
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Color {}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 7
            && s.starts_with('#')
            && s[1..].bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(ColorError::Malformed(s.to_string()));
        }
        Ok(Color(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
