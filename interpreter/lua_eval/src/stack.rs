//! Host-stack safety for deep guest recursion.
//!
//! The evaluator recurses once per guest call, so a guest recursing to a
//! configured limit of several thousand frames would otherwise exhaust
//! the host thread's stack. `stacker` grows the stack on demand; the
//! guest-visible limit stays the call stack's, not the host's.

/// Ensure sufficient host stack space before executing `f`.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (128 KiB red zone).
    const RED_ZONE: usize = 128 * 1024;

    /// Stack space to allocate when growing (2 MiB).
    const STACK_PER_GROWTH: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_GROWTH, f)
}
