//! String interner for identifier storage.
//!
//! Interned strings are leaked to obtain `'static` lifetimes, so `lookup`
//! hands out plain `&'static str` with no guard object. The interner lives
//! as long as the engine; the leak is bounded by the set of distinct
//! identifiers ever seen.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::Name;

/// Interns identifier strings and resolves [`Name`]s back to text.
///
/// Single-threaded: the engine is specified to never be shared across
/// threads, so a `RefCell` replaces lock-based sharding.
pub struct StringInterner {
    map: RefCell<FxHashMap<&'static str, Name>>,
    strings: RefCell<Vec<&'static str>>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let interner = StringInterner {
            map: RefCell::new(FxHashMap::default()),
            strings: RefCell::new(Vec::with_capacity(256)),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// Interning the same content twice returns the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.map.borrow().get(s) {
            return name;
        }
        let mut strings = self.strings.borrow_mut();
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_index(strings.len() as u32);
        strings.push(leaked);
        self.map.borrow_mut().insert(leaked, name);
        name
    }

    /// Resolve a [`Name`] back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `name` did not come from this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.strings.borrow()[name.index()]
    }

    /// Number of distinct strings interned.
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    /// Check if only the pre-interned empty string is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_string_is_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn same_content_same_name() {
        let interner = StringInterner::new();
        let a = interner.intern("print");
        let b = interner.intern("print");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "print");
    }

    #[test]
    fn distinct_content_distinct_names() {
        let interner = StringInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("y");
        assert_ne!(a, b);
        assert_eq!(interner.lookup(a), "x");
        assert_eq!(interner.lookup(b), "y");
    }

    #[test]
    fn len_counts_distinct_strings() {
        let interner = StringInterner::new();
        interner.intern("a");
        interner.intern("b");
        interner.intern("a");
        // Two identifiers plus the pre-interned empty string.
        assert_eq!(interner.len(), 3);
    }
}
