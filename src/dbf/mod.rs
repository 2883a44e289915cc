//! Core DBF reader module

pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
mod utils;

pub use reader::DbfReader;
pub use types::error::{DbfError, Result};
