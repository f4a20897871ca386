//! Identifier table with integer values.
//!
//! Values are non-zero `i32`s and `0` is what every lookup returns for an
//! identifier that is not in the table, so hosts can keep a plain integer
//! protocol. Storing `0` is refused with [`ErrorKind::ZeroValue`].

use std::num::NonZeroI32;
use std::str;

use bytes::BufMut;
use tracing::debug;

use crate::errors::{ErrorKind, Result};
use crate::radix_tree::RadixTree;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    tree: RadixTree<NonZeroI32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            tree: RadixTree::new(),
        }
    }

    /// Creates an empty table. The tree grows node by node, so the hint is
    /// not used to preallocate anything.
    pub fn with_capacity(_capacity: usize) -> Self {
        SymbolTable::new()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Binds `ident` to `value` and returns the previous binding, or `0` if
    /// there was none.
    pub fn put(&mut self, ident: &str, value: i32) -> Result<i32> {
        let value = match NonZeroI32::new(value) {
            Some(value) => value,
            None => {
                debug!(ident = %ident, "rejected binding to 0");
                bail!(ErrorKind::ZeroValue);
            }
        };

        let old_value = self.tree.insert(ident, value)?;

        Ok(old_value.map_or(0, NonZeroI32::get))
    }

    /// The value bound to `ident`, or `0`.
    pub fn get(&self, ident: &str) -> i32 {
        self.tree.get(ident).map_or(0, |value| value.get())
    }

    /// Unbinds `ident`, returning its value or `0` if it was not bound.
    pub fn remove(&mut self, ident: &str) -> i32 {
        self.tree.remove(ident).map_or(0, NonZeroI32::get)
    }

    /// Extends the identifier in `buf` as long as only one continuation is
    /// possible, without letting it grow past `capacity` bytes.
    ///
    /// The extension stops at the first byte where two identifiers part, and
    /// may end in the middle of a multi-byte character, so the buffer holds
    /// bytes rather than a `String`.
    pub fn complete<B>(&self, buf: &mut B, capacity: usize) -> Result<bool>
    where
        B: AsRef<[u8]> + BufMut,
    {
        self.tree.complete_within(buf, capacity)
    }

    /// Calls `callback` with up to `max_results` identifiers starting with
    /// `prefix` and returns how many it was given.
    pub fn prefix_iter<F>(&self, prefix: &str, max_results: usize, mut callback: F) -> Result<usize>
    where
        F: FnMut(&str),
    {
        let mut produced = 0;

        for (ident, _) in self.tree.iter_prefix(prefix).take(max_results) {
            callback(str::from_utf8(&ident)?);
            produced += 1;
        }

        Ok(produced)
    }
}
