mod tree;
pub use self::tree::RadixTree;

mod key;
pub use self::key::TreeKey;

mod iter;
pub use self::iter::PrefixIter;

mod node;
pub use self::node::well_formed::MalformedTree;

#[cfg(test)]
mod proptests;
