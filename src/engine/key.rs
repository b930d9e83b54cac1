//! # Hashed Keys
//!
//! Interned identifiers used to name state-machine states without comparing
//! strings every tick.
//!
//! ## Design
//! - A key is the 64-bit FNV-1a hash of its source text, computed once at
//!   construction. Equality and hashing only touch that integer.
//! - The hash is a pure function of the text, so equal strings produce equal
//!   keys across the whole process lifetime, including keys built in `const`
//!   context with [`HashedKey::const_new`].
//! - [`HashedKey::new`] also records the text in a process-wide name table so
//!   keys print readably in logs. Two different texts landing on the same hash
//!   are reported once at `warn` level.
//!
//! ## Invariants
//! - `HashedKey::new(a) == HashedKey::new(b)` iff `a == b` (barring a reported
//!   hash collision).
//! - Comparing or hashing a key is O(1).

use std::fmt;
use std::sync::{OnceLock, RwLock};

use rustc_hash::FxHashMap;
use tracing::warn;


const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the bytes of `text`.
pub const fn fnv1a(text: &str) -> u64 {
    let bytes = text.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

static KEY_NAMES: OnceLock<RwLock<FxHashMap<u64, Box<str>>>> = OnceLock::new();

fn key_names() -> &'static RwLock<FxHashMap<u64, Box<str>>> {
    KEY_NAMES.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Records `name` under `hash`, reporting a collision with a different text.
fn intern(hash: u64, name: &str) {
    let table = key_names();
    {
        let names = table.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(existing) = names.get(&hash) {
            if existing.as_ref() != name {
                warn!(hash, existing = %existing, name, "hashed key collision");
            }
            return;
        }
    }

    let mut names = table.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    names.entry(hash).or_insert_with(|| name.into());
}

/// Interned state identifier.
///
/// Construct with [`HashedKey::new`] (records the name for diagnostics) or
/// [`HashedKey::const_new`] in `const` items.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashedKey {
    hash: u64,
}

impl HashedKey {
    /// Hashes `name` and records it in the name table.
    pub fn new(name: &str) -> Self {
        let hash = fnv1a(name);
        intern(hash, name);
        Self { hash }
    }

    /// Hashes `name` without touching the name table.
    ///
    /// The resulting key is equal to `HashedKey::new(name)`; it only prints as
    /// a raw hash until some `new` call registers the same text.
    pub const fn const_new(name: &str) -> Self {
        Self { hash: fnv1a(name) }
    }

    /// Raw 64-bit hash.
    #[inline]
    pub const fn hash(self) -> u64 {
        self.hash
    }

    /// Name the key was created from, if it was registered through [`HashedKey::new`].
    pub fn name(self) -> Option<String> {
        let names = key_names().read().unwrap_or_else(|poisoned| poisoned.into_inner());
        names.get(&self.hash).map(|name| name.to_string())
    }
}

impl From<&str> for HashedKey {
    fn from(name: &str) -> Self {
        HashedKey::new(name)
    }
}

impl fmt::Display for HashedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "#{:016x}", self.hash),
        }
    }
}

impl fmt::Debug for HashedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashedKey({self})")
    }
}
