//! Lexical environments: a stack of shared scope frames.
//!
//! Frames are shared (`Heap`-wrapped maps) rather than owned, because
//! closures capture the live chain at creation time: a closure mutating a
//! captured local must be visible to its siblings and, while it is still
//! running, to the defining scope. The globals table is *not* part of the
//! chain; the engine consults it when every frame misses.

use rustc_hash::FxHashMap;

use lua_ir::Name;

use crate::value::{Heap, Value};

/// One scope frame: name to value.
pub(crate) type Frame = FxHashMap<Name, Value>;

/// A shared handle to a frame, cheap to capture.
pub(crate) type SharedFrame = Heap<Frame>;

/// The active scope chain, innermost frame last.
pub(crate) struct Environment {
    frames: Vec<SharedFrame>,
}

impl Environment {
    pub(crate) fn new() -> Self {
        Environment { frames: Vec::new() }
    }

    /// Push a fresh innermost frame.
    pub(crate) fn enter(&mut self) {
        self.frames.push(Heap::new(Frame::default()));
    }

    /// Pop the innermost frame.
    ///
    /// Leaving more frames than were entered is a programming error.
    pub(crate) fn leave(&mut self) {
        debug_assert!(!self.frames.is_empty(), "leave on empty scope chain");
        self.frames.pop();
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Look a name up, innermost frame first. `None` means "fall through
    /// to globals".
    pub(crate) fn lookup(&self, name: Name) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.borrow().get(&name) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Bind a name in the innermost frame.
    pub(crate) fn assign_local(&mut self, name: Name, value: Value) {
        debug_assert!(!self.frames.is_empty(), "assign_local with no frame");
        if let Some(frame) = self.frames.last() {
            frame.borrow_mut().insert(name, value);
        }
    }

    /// Write to the innermost frame that already binds `name`. Returns
    /// `false` when no frame does — the caller writes to globals instead.
    pub(crate) fn assign_existing(&mut self, name: Name, value: Value) -> bool {
        for frame in self.frames.iter().rev() {
            let mut frame = frame.borrow_mut();
            if let std::collections::hash_map::Entry::Occupied(mut entry) =
                frame.entry(name)
            {
                entry.insert(value);
                return true;
            }
        }
        false
    }

    /// Capture the live chain for a closure. Frames are shared, so later
    /// writes through either side stay visible to both.
    pub(crate) fn capture_chain(&self) -> Vec<SharedFrame> {
        self.frames.clone()
    }

    /// Swap in another chain — used around calls — returning the one that
    /// was active.
    pub(crate) fn swap_chain(&mut self, chain: Vec<SharedFrame>) -> Vec<SharedFrame> {
        std::mem::replace(&mut self.frames, chain)
    }
}
