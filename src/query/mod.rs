//! Friendly-name queries: decoding filter specifications, compiling them into
//! raw-column predicates and evaluating them with an optional radius pass.

pub mod engine;
pub mod result;
pub mod spec;

pub use engine::{QueryEngine, DEFAULT_ZIP_FIELD};
pub use result::{QueryOutcome, ResultRow, DISTANCE_DISPLAY, DISTANCE_INT};
pub use spec::{Clause, FilterSpec, ZipRadius, ZIP_RADIUS_KEY};
