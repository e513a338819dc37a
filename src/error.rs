//! Error types for the coding engine.
//!
//! Every failure the engine reports is a deterministic, locally detectable
//! precondition violation. Operations validate their inputs before touching
//! any state, so an `Err` always means "nothing changed".
//!
//! # Error Categories
//!
//! - **Argument**: zero or otherwise invalid configuration values
//! - **Range**: symbol indices outside the valid bounds
//! - **Buffer**: caller buffers with the wrong size
//! - **Sequencing**: an operation called in the wrong coder state
//! - **Stream**: sliding-window specific range violations
//!
//! A linearly dependent coded symbol is *not* an error: decoding it succeeds
//! and simply leaves the rank unchanged.

/// The kind of error, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Argument ===
    /// A configuration or call argument is invalid.
    InvalidArgument,

    // === Range ===
    /// A symbol index lies outside the valid bounds.
    OutOfRange,

    // === Buffer ===
    /// A caller-provided buffer is shorter than required.
    BufferTooSmall,
    /// A caller-provided buffer is longer than allowed.
    BufferTooLarge,

    // === Sequencing ===
    /// Storage for a symbol has already been bound.
    AlreadySet,
    /// The coder is not in a state that permits the operation.
    InvalidState,
    /// An encode referenced a symbol that has no data yet.
    NotReady,

    // === Stream ===
    /// Pop from a stream with no resident symbols.
    EmptyStream,
    /// A coding window is not contained in the stream.
    WindowOutOfBounds,
}

/// Coarse grouping of [`ErrorKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid arguments.
    Argument,
    /// Index range violations.
    Range,
    /// Buffer size violations.
    Buffer,
    /// Call ordering violations.
    Sequencing,
    /// Stream and window violations.
    Stream,
}

impl ErrorKind {
    /// Returns the category for this error kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument => ErrorCategory::Argument,
            Self::OutOfRange => ErrorCategory::Range,
            Self::BufferTooSmall | Self::BufferTooLarge => ErrorCategory::Buffer,
            Self::AlreadySet | Self::InvalidState | Self::NotReady => ErrorCategory::Sequencing,
            Self::EmptyStream | Self::WindowOutOfBounds => ErrorCategory::Stream,
        }
    }

    /// Returns true if the error was caused by the shape of the caller's
    /// input rather than by the coder's current state.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Argument | ErrorCategory::Range | ErrorCategory::Buffer
        )
    }
}

/// Errors returned by coders, generators and configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A configuration or call argument is invalid.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// A symbol index lies outside `[lower, upper)`.
    #[error("index {index} out of range [{lower}, {upper})")]
    OutOfRange {
        /// The offending index.
        index: u64,
        /// Inclusive lower bound.
        lower: u64,
        /// Exclusive upper bound.
        upper: u64,
    },

    /// A buffer holds fewer bytes than the operation needs.
    #[error("buffer too small: {actual} bytes, need at least {needed}")]
    BufferTooSmall {
        /// Required length in bytes.
        needed: usize,
        /// Provided length in bytes.
        actual: usize,
    },

    /// A buffer holds more bytes than the coder accepts.
    #[error("buffer too large: {actual} bytes exceeds limit {limit}")]
    BufferTooLarge {
        /// Maximum accepted length in bytes.
        limit: usize,
        /// Provided length in bytes.
        actual: usize,
    },

    /// Storage for the symbol at `index` is already bound.
    #[error("storage for symbol {index} already set")]
    AlreadySet {
        /// Symbol index.
        index: u64,
    },

    /// The coder's state does not allow this operation.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Which sequencing rule was violated.
        reason: String,
    },

    /// An encode referenced symbol `index` before its data was set.
    #[error("symbol {index} has no data yet")]
    NotReady {
        /// Symbol index.
        index: u64,
    },

    /// Pop from an empty stream.
    #[error("stream is empty")]
    EmptyStream,

    /// The window `[lower, upper)` is not inside the stream
    /// `[stream_lower, stream_upper)`.
    #[error(
        "window [{lower}, {upper}) outside stream [{stream_lower}, {stream_upper})"
    )]
    WindowOutOfBounds {
        /// Window lower bound.
        lower: u64,
        /// Window upper bound.
        upper: u64,
        /// Stream lower bound.
        stream_lower: u64,
        /// Stream upper bound.
        stream_upper: u64,
    },
}

impl Error {
    /// Returns the payload-free kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Self::BufferTooLarge { .. } => ErrorKind::BufferTooLarge,
            Self::AlreadySet { .. } => ErrorKind::AlreadySet,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::NotReady { .. } => ErrorKind::NotReady,
            Self::EmptyStream => ErrorKind::EmptyStream,
            Self::WindowOutOfBounds { .. } => ErrorKind::WindowOutOfBounds,
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::InvalidState`].
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Builds an [`Error::OutOfRange`] for a `usize` index in `[0, upper)`.
    #[must_use]
    pub const fn out_of_range(index: usize, upper: usize) -> Self {
        Self::OutOfRange {
            index: index as u64,
            lower: 0,
            upper: upper as u64,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Fails with [`Error::BufferTooSmall`] unless `actual >= needed`.
pub(crate) const fn ensure_len(actual: usize, needed: usize) -> Result<()> {
    if actual < needed {
        return Err(Error::BufferTooSmall { needed, actual });
    }
    Ok(())
}

/// Fails with [`Error::OutOfRange`] unless `index < upper`.
pub(crate) const fn ensure_index(index: usize, upper: usize) -> Result<()> {
    if index >= upper {
        return Err(Error::out_of_range(index, upper));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            Error::invalid_argument("x").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(Error::EmptyStream.kind(), ErrorKind::EmptyStream);
        assert_eq!(Error::out_of_range(4, 4).kind(), ErrorKind::OutOfRange);
        assert_eq!(
            Error::AlreadySet { index: 1 }.kind(),
            ErrorKind::AlreadySet
        );
    }

    #[test]
    fn categories() {
        assert_eq!(ErrorKind::OutOfRange.category(), ErrorCategory::Range);
        assert_eq!(ErrorKind::NotReady.category(), ErrorCategory::Sequencing);
        assert_eq!(
            ErrorKind::WindowOutOfBounds.category(),
            ErrorCategory::Stream
        );
        assert!(ErrorKind::BufferTooSmall.is_input_error());
        assert!(!ErrorKind::AlreadySet.is_input_error());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::out_of_range(7, 4).to_string(),
            "index 7 out of range [0, 4)"
        );
        assert_eq!(
            Error::BufferTooSmall {
                needed: 8,
                actual: 3
            }
            .to_string(),
            "buffer too small: 3 bytes, need at least 8"
        );
        let window = Error::WindowOutOfBounds {
            lower: 2,
            upper: 9,
            stream_lower: 0,
            stream_upper: 5,
        };
        assert_eq!(window.to_string(), "window [2, 9) outside stream [0, 5)");
    }

    #[test]
    fn ensure_helpers() {
        assert!(ensure_len(8, 8).is_ok());
        assert_eq!(
            ensure_len(7, 8),
            Err(Error::BufferTooSmall {
                needed: 8,
                actual: 7
            })
        );
        assert!(ensure_index(3, 4).is_ok());
        assert_eq!(ensure_index(4, 4).unwrap_err().kind(), ErrorKind::OutOfRange);
    }
}
