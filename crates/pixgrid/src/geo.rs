//! Snapping geographic coordinates onto the pixel grid.
//!
//! Latitude is cut into rows of a fixed height. Each row is cut into columns
//! whose width grows with `1 / cos(lat)`, so a cell covers roughly the same
//! ground distance in both directions and looks square on a Mercator map.

/// Edge length of a cell, in degrees of latitude.
pub const PIXEL_SIZE: f64 = 0.00005;

/// Web Mercator cuts the world off here; beyond it `delta_lng` stops making sense.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.lat, self.lng)
    }
}

/// Cells further out than this (2^40, tens of millions of degrees) are too
/// narrow next to their coordinates for `f64` to place their edges reliably.
const MAX_INDEX: f64 = 1_099_511_627_776.0;

/// Largest `n` such that `n * step <= value`, or `None` when `value` is not
/// finite or `n` is beyond the range the grid covers.
///
/// `value / step` can land one ulp on the wrong side of an integer, so the
/// quotient is checked against the same product the caller will compute.
/// This is what makes re-quantizing an origin a no-op.
pub fn snap_index(value: f64, step: f64) -> Option<i64> {
    let mut n = (value / step).floor();
    if !n.is_finite() || n.abs() >= MAX_INDEX {
        return None;
    }
    if n * step > value {
        n -= 1.0;
    } else if (n + 1.0) * step <= value {
        n += 1.0;
    }
    Some(n as i64)
}

/// Values too far out to snap come back unchanged.
pub fn quantize_lat(lat: f64) -> f64 {
    snap_index(lat, PIXEL_SIZE).map_or(lat, |n| n as f64 * PIXEL_SIZE)
}

/// Width of a cell in degrees of longitude for the row at `lat`.
///
/// Blows up towards the poles; callers must stay inside [`MAX_LATITUDE`].
pub fn delta_lng(lat: f64) -> f64 {
    PIXEL_SIZE / (lat * std::f64::consts::PI / 180.0).cos()
}

/// `lat` must already be quantized, otherwise two points of the same row
/// could be cut with slightly different column widths.
pub fn quantize_lng(lng: f64, lat: f64) -> f64 {
    let step = delta_lng(lat);
    snap_index(lng, step).map_or(lng, |n| n as f64 * step)
}

/// Integer identity of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: i64,
    pub col: i64,
}

impl CellCoord {
    /// The cell a raw point falls into, or `None` when the point is off the
    /// paintable map: not finite, past [`MAX_LATITUDE`], or so far east or
    /// west that the grid no longer covers it.
    pub fn containing(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return None;
        }
        let row = snap_index(lat, PIXEL_SIZE)?;
        let col = snap_index(lng, delta_lng(row as f64 * PIXEL_SIZE))?;
        Some(Self { row, col })
    }

    /// South-west corner of the cell.
    pub fn origin(&self) -> LatLng {
        let lat = self.row as f64 * PIXEL_SIZE;
        LatLng {
            lat,
            lng: self.col as f64 * delta_lng(lat),
        }
    }

    pub fn bounds(&self) -> CellBounds {
        let south = self.row as f64 * PIXEL_SIZE;
        let step = delta_lng(south);
        CellBounds {
            south,
            west: self.col as f64 * step,
            // `+ 1.0` never overflows and is exact for any cell `containing` returns.
            north: (self.row as f64 + 1.0) * PIXEL_SIZE,
            east: (self.col as f64 + 1.0) * step,
        }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangle covered by one cell. Neighbouring cells share their edges exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl CellBounds {
    pub fn top_left(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    pub fn bottom_right(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    /// Half-open: the north and east edges belong to the next cell.
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat < self.north
            && point.lng >= self.west
            && point.lng < self.east
    }
}

impl std::fmt::Display for CellBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.top_left(), self.bottom_right())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_latitudes() -> impl Iterator<Item = f64> {
        (-8_000..8_000).map(|i| i as f64 * 0.010_137_3 + 0.000_003)
    }

    fn cell(lat: f64, lng: f64) -> CellCoord {
        CellCoord::containing(lat, lng).unwrap()
    }

    #[test]
    fn quantize_lat_is_idempotent() {
        for lat in sample_latitudes() {
            let once = quantize_lat(lat);
            assert_eq!(quantize_lat(once), once, "lat {lat}");
        }
    }

    #[test]
    fn grid_multiples_are_fixed_points() {
        for n in [-1_700_000i64, -3, -1, 0, 1, 7, 1_030_100, 1_700_000] {
            let lat = n as f64 * PIXEL_SIZE;
            assert_eq!(snap_index(lat, PIXEL_SIZE), Some(n));
            assert_eq!(quantize_lat(lat), lat);
        }
    }

    #[test]
    fn quantized_cell_contains_the_point() {
        for lat in sample_latitudes() {
            let lng = lat * 2.0 - 13.37;
            let bounds = cell(lat, lng).bounds();
            assert!(bounds.south <= lat && lat < bounds.north, "lat {lat} in {bounds}");
            assert!(bounds.west <= lng && lng < bounds.east, "lng {lng} in {bounds}");
            assert_eq!(bounds.south, quantize_lat(lat));
            assert_eq!(bounds.west, quantize_lng(lng, bounds.south));
        }
    }

    #[test]
    fn quantize_lng_is_idempotent_for_a_fixed_row() {
        let lat = quantize_lat(51.505);
        for i in -5_000..5_000 {
            let lng = i as f64 * 0.000_731 + 0.000_000_9;
            let once = quantize_lng(lng, lat);
            assert_eq!(quantize_lng(once, lat), once, "lng {lng}");
        }
    }

    #[test]
    fn delta_lng_matches_pixel_size_at_equator() {
        assert_eq!(delta_lng(0.0), PIXEL_SIZE);
        assert!(delta_lng(60.0) > 1.99 * PIXEL_SIZE && delta_lng(60.0) < 2.01 * PIXEL_SIZE);
        assert_eq!(delta_lng(45.0), delta_lng(-45.0));
    }

    #[test]
    fn negative_coordinates_snap_down() {
        assert_eq!(cell(-0.00001, -0.00001), CellCoord { row: -1, col: -1 });
        assert_eq!(quantize_lat(-0.00001), -PIXEL_SIZE);
    }

    #[test]
    fn neighbouring_cells_share_edges() {
        let a = CellCoord { row: 1_030_100, col: -1_121 }.bounds();
        let b = CellCoord { row: 1_030_100, col: -1_120 }.bounds();
        let c = CellCoord { row: 1_030_101, col: -1_121 }.bounds();
        assert_eq!(a.east, b.west);
        assert_eq!(a.north, c.south);
    }

    #[test]
    fn origin_round_trips_to_the_same_cell() {
        let start = cell(51.50501, -0.09001);
        let origin = start.origin();
        assert_eq!(cell(origin.lat, origin.lng), start);
        assert!(start.bounds().contains(origin));
    }

    #[test]
    fn points_off_the_map_have_no_cell() {
        for (lat, lng) in [
            (0.0, 1e300),
            (0.0, -1e8),
            (0.0, f64::INFINITY),
            (0.0, f64::NAN),
            (1e300, 0.0),
            (f64::NEG_INFINITY, 0.0),
            (85.1, 0.0),
            (-90.0, 0.0),
        ] {
            assert_eq!(CellCoord::containing(lat, lng), None, "({lat}, {lng})");
        }
        assert_eq!(snap_index(f64::INFINITY, PIXEL_SIZE), None);
        assert_eq!(snap_index(1e300, PIXEL_SIZE), None);
    }

    #[test]
    fn far_longitudes_still_contain_the_point() {
        let lng = 5.0e7;
        let bounds = cell(0.0, lng).bounds();
        assert!(bounds.west <= lng && lng < bounds.east, "{bounds}");
    }

    #[test]
    fn extreme_cells_have_finite_bounds() {
        let bounds = CellCoord { row: i64::MAX, col: i64::MIN }.bounds();
        assert!(bounds.north.is_finite() && bounds.east.is_finite());
    }

    #[test]
    fn quantize_passes_unsnappable_values_through() {
        assert_eq!(quantize_lat(1e300), 1e300);
        assert!(quantize_lat(f64::NAN).is_nan());
        assert_eq!(quantize_lng(f64::INFINITY, 0.0), f64::INFINITY);
    }
}
