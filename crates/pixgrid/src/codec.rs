//! Wire format shared by the `pixels` store key and `pixels.json` exports:
//! a JSON array of `{lat, lng, color, username, timestamp}` records.

use crate::types::Pixel;
use thiserror::Error;
use tracing::trace;

pub const EXPORT_FILE_NAME: &str = "pixels.json";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed pixel data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pixel [{index}]: {source}")]
    Record {
        index: usize,
        source: serde_json::Error,
    },
    #[error("pixel [{index}] at ({lat}, {lng}) is outside the paintable map")]
    OffMap { index: usize, lat: f64, lng: f64 },
}

pub fn encode(pixels: &[Pixel]) -> Result<Vec<u8>, CodecError> {
    let bytes = serde_json::to_vec(pixels)?;
    trace!("Encoded {} pixels into {} bytes", pixels.len(), bytes.len());
    Ok(bytes)
}

/// All or nothing: one bad record fails the whole payload, and the error
/// names the record by its position in the array.
pub fn decode(bytes: &[u8]) -> Result<Vec<Pixel>, CodecError> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
    let mut pixels = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let pixel: Pixel = serde_json::from_value(record)
            .map_err(|source| CodecError::Record { index, source })?;
        if pixel.cell().is_none() {
            return Err(CodecError::OffMap {
                index,
                lat: pixel.lat,
                lng: pixel.lng,
            });
        }
        pixels.push(pixel);
    }
    trace!("Decoded {} pixels from {} bytes", pixels.len(), bytes.len());
    Ok(pixels)
}
