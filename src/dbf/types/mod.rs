//! Foundational data structures, error types, and the memo provider seam.

pub mod error;
pub mod memo;
pub mod models;
