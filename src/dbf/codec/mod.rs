//! Numeric and calendar primitives used by the field decoders.
//!
//! # Submodules
//!
//! - [`float`][]: Generic IEEE-754-style bit decoding (single and double precision)
//! - [`julian`][]: Julian day number ↔ Gregorian date conversion

pub mod float;
pub mod julian;
