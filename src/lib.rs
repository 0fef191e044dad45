//! # fosdelta
//!
//! A Fossil-style binary delta codec: given a *source* and a *target*
//! byte buffer, [`create`] produces a compact delta such that [`apply`]
//! on the source reconstructs the target byte-for-byte.
//!
//! The delta is a self-describing command stream of copy and insert
//! records framed by the declared output size and a trailing checksum.
//! Matching uses an Adler-style rolling hash over a sliding window, a
//! block index over the source, byte-exact candidate verification and
//! SIMD forward extension. The stream may optionally be wrapped in a
//! Zstandard frame; [`apply`] detects the wrapping from the frame magic,
//! so callers never need to track which form they stored.
//!
//! ## Quick start
//!
//! ```
//! let source = b"Hello world!";
//! let target = b"Hello Bare world!";
//!
//! let delta = fosdelta::create(source, target).unwrap();
//! let restored = fosdelta::apply(source, &delta).unwrap();
//! assert_eq!(restored, target);
//! ```
//!
//! ## Concurrency
//!
//! Every operation is a pure function over its input buffers: no shared
//! state, no interior mutability, no I/O. Calls may run concurrently on
//! separate threads as long as each owns its output.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod checksum;
mod compress;
mod engine;
mod error;
mod hash;
mod varint;

pub use engine::{
    analyze, apply_with_options, create_with_options, output_size, ApplyOptions, CreateOptions,
    DeltaStats, DEFAULT_SEARCH_DEPTH,
};
pub use error::{DeltaError, Result};
pub use hash::rolling::DEFAULT_WINDOW;

/// Compute a delta that transforms `source` into `target`, with default
/// options (16-byte hash window, search depth 64, no compression).
///
/// Creation cannot fail on any input pair; the worst case is a delta
/// that carries the whole target as one literal insert.
///
/// # Examples
///
/// ```
/// let base = b"The quick brown fox jumps over the lazy dog";
/// let edit = b"The quick brown cat jumps over the lazy dog";
///
/// let delta = fosdelta::create(base, edit).unwrap();
/// assert!(delta.len() < edit.len());
/// ```
pub fn create(source: &[u8], target: &[u8]) -> Result<Vec<u8>> {
    engine::create_with_options(source, target, &CreateOptions::default())
}

/// Apply `delta` to `source`, reconstructing the target.
///
/// Compressed deltas are detected by their magic prefix and unwrapped
/// transparently.
///
/// # Errors
///
/// [`DeltaError::Malformed`] for structurally invalid streams,
/// [`DeltaError::SourceMismatch`] when the delta references bytes the
/// source does not have (or would overrun its own declared size), and
/// [`DeltaError::Decompression`] when a wrapped delta's frame body is
/// corrupt.
///
/// # Examples
///
/// ```
/// let source = b"abcdef";
/// let delta = fosdelta::create(source, b"abcxyz").unwrap();
/// assert_eq!(fosdelta::apply(source, &delta).unwrap(), b"abcxyz");
///
/// assert!(fosdelta::apply(source, b"not a delta").is_err());
/// ```
pub fn apply(source: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    engine::apply_with_options(source, delta, &ApplyOptions::default())
}

/// Apply a sequence of deltas in order, each against the previous step's
/// output, with default options.
///
/// Halts at the first failing step; the error reports the step index.
///
/// # Examples
///
/// ```
/// let v0 = b"version zero".to_vec();
/// let v1 = b"version one".to_vec();
/// let v2 = b"version two, final".to_vec();
///
/// let d1 = fosdelta::create(&v0, &v1).unwrap();
/// let d2 = fosdelta::create(&v1, &v2).unwrap();
///
/// let out = fosdelta::apply_batch(&v0, &[d1, d2]).unwrap();
/// assert_eq!(out, v2);
/// ```
pub fn apply_batch<D: AsRef<[u8]>>(source: &[u8], deltas: &[D]) -> Result<Vec<u8>> {
    apply_batch_with_options(source, deltas, &ApplyOptions::default())
}

/// [`apply_batch`] with explicit options applied to every step.
pub fn apply_batch_with_options<D: AsRef<[u8]>>(
    source: &[u8],
    deltas: &[D],
    opts: &ApplyOptions,
) -> Result<Vec<u8>> {
    let mut current = source.to_vec();
    for (index, delta) in deltas.iter().enumerate() {
        current = engine::apply_with_options(&current, delta.as_ref(), opts).map_err(|error| {
            DeltaError::Batch {
                index,
                error: Box::new(error),
            }
        })?;
    }
    Ok(current)
}
