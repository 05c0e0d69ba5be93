//! Pixel map painting: a latitude-compensated square grid laid over the
//! world map, the pixels painted on it, and the plumbing to save, export
//! and import them.

pub mod codec;
pub mod color;
pub mod dispatch;
pub mod geo;
pub mod grid;
pub mod session;
pub mod store;
pub mod types;

pub use codec::{CodecError, EXPORT_FILE_NAME};
pub use color::Color;
pub use dispatch::{Dispatcher, Effect, Intent, Key};
pub use geo::{CellBounds, CellCoord, LatLng, PIXEL_SIZE, delta_lng, quantize_lat, quantize_lng};
pub use grid::{PixelGrid, Rejected};
pub use session::{Export, Imported, Placement, Session};
pub use store::{DirStore, KeyValueStore, MemoryStore, StorageError};
pub use types::Pixel;
