//! A symbol table built on a compressed trie.
//!
//! [`RadixTree`] maps byte-string keys to arbitrary values and supports
//! lookup, insertion, deletion with compaction, unambiguous prefix
//! completion and prefix enumeration. [`SymbolTable`] layers the classic
//! identifier table contract on top of it, where values are non-zero
//! integers and `0` reads as "absent".

#[macro_use]
extern crate error_chain;

pub mod errors;
pub mod radix_tree;
pub mod symtab;

pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::radix_tree::{MalformedTree, PrefixIter, RadixTree, TreeKey};
pub use crate::symtab::SymbolTable;
