//! Postal-code geography: resolving ZIP codes to coordinates and measuring the
//! distance between them.

pub mod distance;
pub mod gazetteer;

pub use distance::distance_miles;
pub use gazetteer::{Coordinate, Gazetteer};
