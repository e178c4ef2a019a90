//! String interning for activity identifiers.
//!
//! Maps activity ID strings to dense integer indices so that the scheduling
//! passes can work on plain vectors instead of string-keyed maps.

use rustc_hash::FxHashMap;

/// Interned activity index (u32 for compact storage and fast hashing).
pub type ActivityIdx = u32;

/// Bidirectional mapping between activity ID strings and dense indices.
#[derive(Debug, Clone)]
pub struct ActivityIdInterner {
    to_idx: FxHashMap<String, ActivityIdx>,
    from_idx: Vec<String>,
}

impl ActivityIdInterner {
    /// Create a new interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_idx: Vec::with_capacity(capacity),
        }
    }

    /// Build an interner whose indices follow ascending identifier order.
    ///
    /// Iterating indices `0..len` then visits activities sorted by ID, which
    /// the graph relies on for deterministic tie-breaking.
    pub fn from_sorted<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut sorted: Vec<String> = ids.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut interner = Self::with_capacity(sorted.len());
        for id in sorted {
            interner.intern(&id);
        }
        interner
    }

    /// Intern a string, returning its index.
    /// If already interned, returns the existing index.
    pub fn intern(&mut self, s: &str) -> ActivityIdx {
        if let Some(&idx) = self.to_idx.get(s) {
            return idx;
        }
        let idx = self.from_idx.len() as ActivityIdx;
        self.from_idx.push(s.to_string());
        self.to_idx.insert(s.to_string(), idx);
        idx
    }

    /// Get the index for a string, if it exists.
    #[inline]
    pub fn get(&self, s: &str) -> Option<ActivityIdx> {
        self.to_idx.get(s).copied()
    }

    /// Get the string for an index.
    #[inline]
    pub fn resolve(&self, idx: ActivityIdx) -> Option<&str> {
        self.from_idx.get(idx as usize).map(|s| s.as_str())
    }

    /// All interned strings, in index order.
    pub fn names(&self) -> &[String] {
        &self.from_idx
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.from_idx.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.from_idx.is_empty()
    }
}

impl Default for ActivityIdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
