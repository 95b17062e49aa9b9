//! Fx-hashed collections used throughout the crate.
//!
//! Keys are small integer handles, so the default SipHash buys nothing here.

pub use std::collections::hash_map;

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
