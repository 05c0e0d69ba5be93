//! Everything one painter works with: the grid, where it is saved, who is
//! painting and with which color.

use crate::codec::{self, CodecError, EXPORT_FILE_NAME};
use crate::color::Color;
use crate::geo::{CellBounds, CellCoord};
use crate::grid::{PixelGrid, Rejected};
use crate::store::{KeyValueStore, PIXELS_KEY, StorageError, USERNAME_KEY};
use crate::types::Pixel;
use tracing::{debug, info, warn};

/// A placed pixel and, if saving it failed, why.
#[derive(Debug)]
pub struct Placement {
    pub pixel: Pixel,
    pub warning: Option<StorageError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct Imported {
    pub pixels: Vec<Pixel>,
    pub warning: Option<StorageError>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username must not be empty")]
    Empty,
}

/// Why the saved pixels could not be used when the session was opened.
#[derive(Debug)]
pub enum LoadWarning {
    Unreadable(StorageError),
    Corrupt(CodecError),
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::Unreadable(e) => write!(f, "saved pixels could not be read: {e}"),
            LoadWarning::Corrupt(e) => write!(f, "saved pixels are corrupt: {e}"),
        }
    }
}

pub struct Session<S: KeyValueStore> {
    grid: PixelGrid,
    store: S,
    username: Option<String>,
    color: Color,
    paint_mode: bool,
    load_warning: Option<LoadWarning>,
}

impl<S: KeyValueStore> Session<S> {
    /// Never fails: unusable saved data opens as an empty map and is reported
    /// through [`Session::load_warning`].
    pub fn open(store: S) -> Self {
        let username = match store.load(USERNAME_KEY) {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(name) if !name.trim().is_empty() => Some(name.trim().to_string()),
                Ok(_) => None,
                Err(e) => {
                    warn!("Ignoring stored username: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read stored username: {}", e);
                None
            }
        };

        let (grid, load_warning) = match store.load(PIXELS_KEY) {
            Ok(Some(bytes)) => match PixelGrid::deserialize(&bytes) {
                Ok(grid) => (grid, None),
                Err(e) => (PixelGrid::new(), Some(LoadWarning::Corrupt(e))),
            },
            Ok(None) => (PixelGrid::new(), None),
            Err(e) => (PixelGrid::new(), Some(LoadWarning::Unreadable(e))),
        };
        if let Some(warning) = &load_warning {
            warn!("Starting with an empty map, {}", warning);
        }
        info!(
            "Session opened with {} pixels, user {:?}",
            grid.len(),
            username.as_deref().unwrap_or("<unset>")
        );

        Self {
            grid,
            store,
            username,
            color: Color::default(),
            paint_mode: false,
            load_warning,
        }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.load_warning.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Trims `name` and keeps it for the session. Saving it is best effort;
    /// the returned error only reports the storage failure.
    pub fn set_username(&mut self, name: &str) -> Result<Option<StorageError>, UsernameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UsernameError::Empty);
        }
        self.username = Some(name.to_string());
        let warning = self.store.save(USERNAME_KEY, name.as_bytes()).err();
        if let Some(e) = &warning {
            warn!("Could not save username: {}", e);
        }
        Ok(warning)
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn select_color(&mut self, color: Color) {
        debug!("Selected color {}", color);
        self.color = color;
    }

    pub fn paint_mode(&self) -> bool {
        self.paint_mode
    }

    pub fn enter_paint_mode(&mut self) {
        self.paint_mode = true;
    }

    pub fn confirm_paint(&mut self) {
        self.paint_mode = false;
    }

    /// Places a pixel in the selected color and saves the whole map before
    /// returning.
    pub fn place(&mut self, lat: f64, lng: f64, now: u64) -> Result<Placement, Rejected> {
        let author = self.username.as_deref().unwrap_or("");
        let pixel = self.grid.place(lat, lng, &self.color, author, now)?;
        let warning = self.persist_pixels().err();
        Ok(Placement { pixel, warning })
    }

    /// Hover outline for the cell under the pointer, if it is on the map.
    pub fn preview(&self, lat: f64, lng: f64) -> Option<CellBounds> {
        CellCoord::containing(lat, lng).map(|cell| cell.bounds())
    }

    /// Irreversible; confirming with the user is the caller's job.
    pub fn wipe(&mut self) -> Option<StorageError> {
        self.grid.wipe();
        self.persist_pixels().err()
    }

    pub fn export(&self) -> Result<Export, CodecError> {
        Ok(Export {
            file_name: EXPORT_FILE_NAME,
            bytes: self.grid.serialize()?,
        })
    }

    /// Appends the file's pixels as they are. A file that does not decode is
    /// rejected as a whole and the map is left untouched.
    pub fn import(&mut self, bytes: &[u8]) -> Result<Imported, CodecError> {
        let pixels = codec::decode(bytes)?;
        self.grid.merge(pixels.iter().cloned());
        info!("Imported {} pixels", pixels.len());
        let warning = self.persist_pixels().err();
        Ok(Imported { pixels, warning })
    }

    fn persist_pixels(&mut self) -> Result<(), StorageError> {
        let result = self
            .grid
            .serialize()
            .map_err(StorageError::from)
            .and_then(|bytes| self.store.save(PIXELS_KEY, &bytes));
        if let Err(e) = &result {
            warn!("Could not save {} pixels: {}", self.grid.len(), e);
        }
        result
    }
}
