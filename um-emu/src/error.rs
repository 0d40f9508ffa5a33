//! Error types for the codec and the machine.
//!
//! [`BitpackError`] is the only recoverable error: it is returned when a value does not fit the
//! field it is being packed into. Everything that can go wrong while a program is running is a
//! [`Fault`], and a fault always ends the run.

use thiserror::Error;

use crate::{segments::Handle, Word};

/// Result type for fallible machine operations.
pub type Result<T> = std::result::Result<T, Fault>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BitpackError {
    /// The value is not representable in the requested field width
    #[error("value {value} does not fit in a {width}-bit field")]
    Overflow { value: i128, width: u32 },
}

/// A fatal condition raised while loading or running a program.
#[derive(Debug, Error)]
pub enum Fault {
    /// A handle that is not currently mapped was used.
    #[error("segment {0} is not mapped")]
    UnmappedSegment(Handle),

    /// A load or store went past the end of a segment.
    #[error("offset {offset} is out of bounds for segment {handle} of length {length}")]
    OffsetOutOfBounds {
        handle: Handle,
        offset: Word,
        length: usize,
    },

    /// Segment 0 holds the running program and can never be unmapped.
    #[error("segment 0 cannot be unmapped")]
    UnmapSegmentZero,

    /// Every representable handle is in use.
    #[error("no segment handles left to map")]
    SegmentsExhausted,

    /// The host could not provide memory for a segment of the requested length.
    #[error("could not allocate a segment of {length} words")]
    AllocationFailed { length: usize },

    /// The program image holds more words than a segment can address.
    #[error("program of {0} words does not fit in segment 0")]
    ProgramTooLarge(usize),

    /// The program counter points past the end of segment 0.
    #[error("program counter {pc} is past the end of segment 0 (length {length})")]
    PcOutOfBounds { pc: Word, length: usize },

    #[error("division by zero")]
    DivideByZero,

    /// Opcodes 14 and 15 are unassigned.
    #[error("invalid opcode {opcode} in instruction 0x{word:08x}")]
    InvalidOpcode { opcode: u8, word: Word },

    /// An output instruction was given a value that is not a byte.
    #[error("output value {0} does not fit in a byte")]
    OutputOutOfRange(Word),

    /// The configured instruction budget ran out.
    #[error("step limit of {0} instructions exceeded")]
    StepLimitExceeded(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bitpack(#[from] BitpackError),
}
