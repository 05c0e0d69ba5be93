use crate::color::Color;
use crate::geo::{CellBounds, CellCoord, LatLng};
use serde::{Deserialize, Deserializer, Serialize};

/// One painted cell. Never changes after it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub lat: f64,
    pub lng: f64,
    pub color: Color,
    #[serde(rename = "username", deserialize_with = "non_empty")]
    pub author: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Pixel {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// `None` only for a hand-built pixel off the paintable map; placed and
    /// decoded pixels always have a cell.
    pub fn cell(&self) -> Option<CellCoord> {
        CellCoord::containing(self.lat, self.lng)
    }

    pub fn bounds(&self) -> Option<CellBounds> {
        self.cell().map(|cell| cell.bounds())
    }
}

/// Accepts `null` so that it can be reported as a missing username rather
/// than a type mismatch.
fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(serde::de::Error::custom("username is missing or empty")),
    }
}
