/*!
 * Branch Hints
 * Stable-Rust branch weighting for the reader fast path
 */

/// Marks the enclosing branch as cold
///
/// Calling a `#[cold]` function from a branch makes LLVM lay that branch out
/// of line, which is the closest stable equivalent of `llvm.expect`.
#[cold]
#[inline(never)]
fn cold_path() {}

/// Hint that `b` is usually `true`
///
/// # Example
/// ```ignore
/// if likely(!writer_present) {
///     // fast path
/// }
/// ```
#[inline(always)]
#[must_use]
pub fn likely(b: bool) -> bool {
    if !b {
        cold_path();
    }
    b
}

/// Hint that `b` is usually `false`
#[inline(always)]
#[must_use]
pub fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
    }
    b
}
