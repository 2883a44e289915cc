//! The seam between record decoding and the companion memo file.
//!
//! Memo (`M`) fields only store a block number; the text lives in a separate
//! file (`.fpt` / `.dbt`). This crate does not read those files itself. A
//! [`MemoProvider`] maps a block number to its text instead.

use std::collections::HashMap;

/// Resolves memo block references to their text.
pub trait MemoProvider {
    /// Returns the text stored at `block` for the table identified by `source`,
    /// or `None` if the block cannot be resolved.
    fn resolve(&self, source: &str, block: u32) -> Option<String>;
}

impl<P: MemoProvider + ?Sized> MemoProvider for &P {
    fn resolve(&self, source: &str, block: u32) -> Option<String> {
        (**self).resolve(source, block)
    }
}

/// Provider used when no memo file is available. Every memo field decodes to null.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemo;

impl MemoProvider for NoMemo {
    fn resolve(&self, _source: &str, _block: u32) -> Option<String> {
        None
    }
}

/// An in-memory memo store, keyed by block number.
///
/// Ignores the source identity, so one table maps to one `MemoTable`.
#[derive(Debug, Default, Clone)]
pub struct MemoTable {
    blocks: HashMap<u32, String>,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block: u32, text: impl Into<String>) {
        self.blocks.insert(block, text.into());
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl FromIterator<(u32, String)> for MemoTable {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

impl MemoProvider for MemoTable {
    fn resolve(&self, _source: &str, block: u32) -> Option<String> {
        self.blocks.get(&block).cloned()
    }
}
