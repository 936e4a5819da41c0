use std::collections::HashMap;

use super::distance::distance_miles;

/// Offsets tried around a postal code, closest first.
const SEARCH_OFFSETS: [i64; 5] = [0, -1, 1, -2, 2];

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Postal code → coordinate lookup table.
///
/// Codes are keyed by their numeric value, so `"01001"` and `"1001"` name the
/// same entry.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    coordinates: HashMap<u32, Coordinate>,
}

impl Gazetteer {
    /// Build from `(code, coordinate)` pairs. The first entry for a code wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, Coordinate)>) -> Self {
        let mut coordinates = HashMap::new();
        for (code, coord) in entries {
            coordinates.entry(code).or_insert(coord);
        }
        Self { coordinates }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Resolve a postal code, falling back to neighbouring codes within ±2.
    ///
    /// Returns `None` when the input is not numeric or no code in the window
    /// is present.
    pub fn resolve(&self, postal_code: &str) -> Option<Coordinate> {
        let code: i64 = match postal_code.trim().parse() {
            Ok(code) => code,
            Err(_) => {
                log::debug!("postal code {postal_code:?} is not numeric");
                return None;
            }
        };

        SEARCH_OFFSETS.iter().find_map(|offset| {
            let candidate = code
                .checked_add(*offset)
                .and_then(|c| u32::try_from(c).ok())?;
            self.coordinates.get(&candidate).copied()
        })
    }

    /// Distance in miles between two postal codes, if both resolve.
    pub fn distance(&self, zip_a: &str, zip_b: &str) -> Option<f64> {
        let a = self.resolve(zip_a)?;
        let b = self.resolve(zip_b)?;
        Some(distance_miles(a, b))
    }

    /// Whether `zip` lies within `radius` miles of `base_zip` (inclusive).
    /// Unresolvable codes are never within the radius.
    pub fn within_radius(&self, base_zip: &str, zip: &str, radius: f64) -> bool {
        self.distance(base_zip, zip)
            .is_some_and(|miles| miles <= radius)
    }
}
