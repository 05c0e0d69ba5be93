//! Turns user intents into session changes and a list of things for the
//! renderer to do. Nothing here knows about a particular UI toolkit.

use crate::color::Color;
use crate::geo::{CellBounds, LatLng};
use crate::grid::Rejected;
use crate::session::{Export, Session};
use crate::store::KeyValueStore;
use crate::types::Pixel;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    EnterPaintMode,
    ConfirmPaint,
    SelectColor(Color),
    KeyDown(Key),
    KeyUp(Key),
    PointerDown(LatLng),
    PointerMove(LatLng),
    PointerUp,
    Click(LatLng),
    /// `confirmed: false` means the user backed out of the dialog.
    Wipe { confirmed: bool },
    Export,
    Import(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DrawPixel { bounds: CellBounds, color: Color },
    /// Replaces any outline shown before.
    ShowHover(CellBounds),
    ClearHover,
    ClearPixels,
    /// Whether the map itself may be dragged around.
    DraggingEnabled(bool),
    Download(Export),
    Warning(String),
}

/// Pointer and keyboard state that only matters between events.
#[derive(Debug, Default)]
pub struct Dispatcher {
    space_held: bool,
    dragging: bool,
    hovering: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Draw calls for everything already on the map.
    pub fn initial_effects<S: KeyValueStore>(&self, session: &Session<S>) -> Vec<Effect> {
        let mut effects: Vec<Effect> = session.grid().iter().filter_map(draw).collect();
        if let Some(warning) = session.load_warning() {
            effects.push(Effect::Warning(warning.to_string()));
        }
        effects
    }

    pub fn handle<S, F>(&mut self, session: &mut Session<S>, intent: Intent, now: F) -> Vec<Effect>
    where
        S: KeyValueStore,
        F: Fn() -> u64,
    {
        debug!("Handling {:?}", intent);
        let mut effects = Vec::new();
        match intent {
            Intent::EnterPaintMode => {
                session.enter_paint_mode();
                effects.push(Effect::DraggingEnabled(false));
            }
            Intent::ConfirmPaint => {
                session.confirm_paint();
                self.dragging = false;
                effects.push(Effect::DraggingEnabled(true));
                if self.hovering {
                    self.hovering = false;
                    effects.push(Effect::ClearHover);
                }
            }
            Intent::SelectColor(color) => session.select_color(color),
            Intent::KeyDown(Key::Space) => self.space_held = true,
            Intent::KeyUp(Key::Space) => {
                self.space_held = false;
                self.dragging = false;
            }
            Intent::KeyDown(Key::Other) => {}
            // Any key release ends a drag, not just space.
            Intent::KeyUp(Key::Other) => self.dragging = false,
            Intent::PointerDown(at) => {
                if session.paint_mode() && self.space_held {
                    self.dragging = true;
                    place(session, at, now(), &mut effects);
                }
            }
            Intent::PointerMove(at) => {
                if session.paint_mode() {
                    match session.preview(at.lat, at.lng) {
                        Some(bounds) => {
                            self.hovering = true;
                            effects.push(Effect::ShowHover(bounds));
                        }
                        None if self.hovering => {
                            self.hovering = false;
                            effects.push(Effect::ClearHover);
                        }
                        None => {}
                    }
                    if self.space_held && self.dragging {
                        place(session, at, now(), &mut effects);
                    }
                }
            }
            Intent::PointerUp => {
                if session.paint_mode() && self.space_held {
                    self.dragging = false;
                }
            }
            Intent::Click(at) => {
                if session.paint_mode() && !self.space_held {
                    place(session, at, now(), &mut effects);
                }
            }
            Intent::Wipe { confirmed: false } => {}
            Intent::Wipe { confirmed: true } => {
                let warning = session.wipe();
                effects.push(Effect::ClearPixels);
                if let Some(e) = warning {
                    effects.push(Effect::Warning(format!("Could not save the wiped map: {e}")));
                }
            }
            Intent::Export => match session.export() {
                Ok(export) => effects.push(Effect::Download(export)),
                Err(e) => effects.push(Effect::Warning(format!("Export failed: {e}"))),
            },
            Intent::Import(bytes) => match session.import(&bytes) {
                Ok(imported) => {
                    effects.extend(imported.pixels.iter().filter_map(draw));
                    if let Some(e) = imported.warning {
                        effects.push(Effect::Warning(format!("Could not save pixels: {e}")));
                    }
                }
                Err(e) => effects.push(Effect::Warning(format!("Import failed: {e}"))),
            },
        }
        effects
    }
}

fn draw(pixel: &Pixel) -> Option<Effect> {
    pixel.bounds().map(|bounds| Effect::DrawPixel {
        bounds,
        color: pixel.color.clone(),
    })
}

fn place<S: KeyValueStore>(session: &mut Session<S>, at: LatLng, now: u64, effects: &mut Vec<Effect>) {
    match session.place(at.lat, at.lng, now) {
        Ok(placement) => {
            effects.extend(draw(&placement.pixel));
            if let Some(e) = placement.warning {
                effects.push(Effect::Warning(format!("Could not save pixels: {e}")));
            }
        }
        Err(Rejected::Duplicate { .. }) => {}
        Err(e) => effects.push(Effect::Warning(e.to_string())),
    }
}
