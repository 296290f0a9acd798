//! Immutable byte strings.
//!
//! Guest strings are byte sequences, not UTF-8 text: escapes can produce
//! arbitrary bytes and the runtime compares, hashes, and orders them by
//! content. Cloning is cheap (shared `Rc`).

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// An immutable, content-compared byte string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LuaStr(Rc<[u8]>);

impl LuaStr {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bytes as text, with invalid UTF-8 replaced.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<&str> for LuaStr {
    fn from(s: &str) -> Self {
        LuaStr(Rc::from(s.as_bytes()))
    }
}

impl From<String> for LuaStr {
    fn from(s: String) -> Self {
        LuaStr(Rc::from(s.into_bytes().as_slice()))
    }
}

impl From<&[u8]> for LuaStr {
    fn from(bytes: &[u8]) -> Self {
        LuaStr(Rc::from(bytes))
    }
}

impl From<Vec<u8>> for LuaStr {
    fn from(bytes: Vec<u8>) -> Self {
        LuaStr(Rc::from(bytes.as_slice()))
    }
}

impl PartialEq<str> for LuaStr {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for LuaStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for LuaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for LuaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_text())
    }
}
