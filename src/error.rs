// Error types for delta creation and application.
//
// Allocation failure is not represented: Rust's global allocator aborts on
// exhaustion, so there is no recoverable path to report. Argument-type
// validation is a host-binding concern; the core takes byte slices.

use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DeltaError>;

/// Errors surfaced by [`apply`](crate::apply), [`create`](crate::create)
/// and their variants.
#[derive(Debug)]
pub enum DeltaError {
    /// The delta stream is structurally invalid: a varint failed to
    /// decode, an operator byte is unknown, a separator is missing, the
    /// stream ended without a trailer, or the produced size disagrees
    /// with the declared size at the trailer.
    Malformed(&'static str),
    /// The delta is well-formed but incompatible with the given source:
    /// a copy record references bytes outside the source, or a record
    /// would write past the declared output length.
    SourceMismatch(&'static str),
    /// Checksum verification was requested and the trailer checksum does
    /// not match the produced output.
    ChecksumMismatch {
        /// Checksum recorded in the delta trailer.
        expected: u32,
        /// Checksum recomputed over the produced output.
        actual: u32,
    },
    /// Compressing the command stream failed.
    Compression(io::Error),
    /// The delta carries the Zstandard magic but the frame body was
    /// rejected by the decompressor.
    Decompression(io::Error),
    /// A step of a batch apply failed; the fold halts at the first error.
    Batch {
        /// Zero-based position of the failing delta in the batch.
        index: usize,
        /// The underlying failure.
        error: Box<DeltaError>,
    },
}

impl std::fmt::Display for DeltaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed delta: {msg}"),
            Self::SourceMismatch(msg) => write!(f, "source mismatch: {msg}"),
            Self::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected:#010x}, got {actual:#010x}"
                )
            }
            Self::Compression(e) => write!(f, "compression failed: {e}"),
            Self::Decompression(e) => write!(f, "decompression failed: {e}"),
            Self::Batch { index, error } => write!(f, "batch apply failed at delta {index}: {error}"),
        }
    }
}

impl std::error::Error for DeltaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compression(e) | Self::Decompression(e) => Some(e),
            Self::Batch { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_informative() {
        let e = DeltaError::Malformed("unterminated delta");
        assert!(e.to_string().contains("unterminated"));

        let e = DeltaError::ChecksumMismatch {
            expected: 0xDEADBEEF,
            actual: 0,
        };
        assert!(e.to_string().contains("0xdeadbeef"));
    }

    #[test]
    fn batch_error_chains_source() {
        use std::error::Error;
        let e = DeltaError::Batch {
            index: 3,
            error: Box::new(DeltaError::Malformed("unknown delta operator")),
        };
        assert!(e.to_string().contains("delta 3"));
        assert!(e.source().is_some());
    }
}
