use crate::codec::{self, CodecError};
use crate::color::Color;
use crate::geo::CellCoord;
use crate::types::Pixel;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejected {
    #[error("cell {cell} is already painted")]
    Duplicate { cell: CellCoord },
    #[error("({lat}, {lng}) is outside the paintable map")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("pixels need an author; set a username first")]
    Anonymous,
}

/// Insertion-ordered pixel collection plus an index of occupied cells.
///
/// The index only guards `place`. `merge` appends whatever it is given, so
/// the same cell can show up in `pixels` more than once after an import.
#[derive(Debug, Clone, Default)]
pub struct PixelGrid {
    pixels: Vec<Pixel>,
    cells: HashSet<CellCoord>,
}

impl PixelGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pixels(pixels: Vec<Pixel>) -> Self {
        let cells = pixels.iter().filter_map(Pixel::cell).collect();
        Self { pixels, cells }
    }

    pub fn place(
        &mut self,
        lat: f64,
        lng: f64,
        color: &Color,
        author: &str,
        now: u64,
    ) -> Result<Pixel, Rejected> {
        let Some(cell) = CellCoord::containing(lat, lng) else {
            return Err(Rejected::InvalidCoordinate { lat, lng });
        };
        if author.trim().is_empty() {
            return Err(Rejected::Anonymous);
        }
        if self.cells.contains(&cell) {
            trace!("Cell {} already painted, ignoring placement", cell);
            return Err(Rejected::Duplicate { cell });
        }

        let origin = cell.origin();
        let pixel = Pixel {
            lat: origin.lat,
            lng: origin.lng,
            color: color.clone(),
            author: author.to_string(),
            timestamp: now,
        };
        self.cells.insert(cell);
        self.pixels.push(pixel.clone());
        debug!("Placed {} pixel at {} by {}", pixel.color, cell, pixel.author);
        Ok(pixel)
    }

    pub fn wipe(&mut self) {
        debug!("Wiping {} pixels", self.pixels.len());
        self.pixels.clear();
        self.cells.clear();
    }

    /// Appends without deduplication, against existing pixels or within `imported`.
    pub fn merge(&mut self, imported: impl IntoIterator<Item = Pixel>) {
        let before = self.pixels.len();
        for pixel in imported {
            if let Some(cell) = pixel.cell() {
                self.cells.insert(cell);
            }
            self.pixels.push(pixel);
        }
        debug!("Merged {} pixels", self.pixels.len() - before);
    }

    pub fn serialize(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&self.pixels)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(Self::from_pixels(codec::decode(bytes)?))
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pixel> {
        self.pixels.iter()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

impl<'a> IntoIterator for &'a PixelGrid {
    type Item = &'a Pixel;
    type IntoIter = std::slice::Iter<'a, Pixel>;

    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}
