//! Core data types for the card-capture backend.
//!
//! - [`detection::BoundingBox`]: a detected region in fractional coordinates
//! - [`detection::Game`]: the game a detection run is tuned for
//! - [`detection::table_read_boxes`] / [`detection::partial_read_boxes`]: the
//!   fixed mock detection sets served until a real detector exists

pub mod detection;
