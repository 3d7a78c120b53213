use thiserror::Error;

#[doc = r#"
Any error that can occur while interpreting bytes as MIDI data.

These are wrapped in a [`ReaderError`](crate::reader::ReaderError) to carry
the offset at which they occurred.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The `MThd` chunk could not be understood
    #[error("Header: {0}")]
    Header(#[from] HeaderError),
    /// A track's event stream could not be decoded
    #[error("Track: {0}")]
    Track(#[from] TrackError),
    /// The SMPTE division was invalid
    #[error("Smpte: {0}")]
    Smpte(#[from] SmpteError),
    /// Chunk framing was broken
    #[error("Chunk: {0}")]
    Chunk(#[from] ChunkError),
    /// A variable length quantity was malformed
    #[error("Variable length quantity: {0}")]
    Vlq(#[from] VlqError),
    /// The native event list or document was malformed
    #[error("Native data: {0}")]
    Native(#[from] NativeError),
}

/// Problems with the `MThd` chunk
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The file does not start with `MThd`
    #[error("Expected an MThd chunk, found {0:?}")]
    NotMidi([u8; 4]),
    /// The header chunk is shorter than the six bytes it must hold
    #[error("Header chunk length {0} is shorter than 6 bytes")]
    Length(u32),
    /// The format field was not 0, 1 or 2
    #[error("Unknown format {0}")]
    Format(u16),
    /// Ticks per quarter note of 0 can't be converted to engine time
    #[error("Division of zero ticks per quarter note")]
    ZeroTicksPerQuarterNote,
}

/// Problems with an SMPTE division
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmpteError {
    /// Only -24, -25, -29 and -30 are valid frame rates
    #[error("Invalid frame rate in header: {0}")]
    HeaderFrameTime(i8),
    /// Ticks per frame of 0 can't be converted to engine time
    #[error("Division of zero ticks per frame")]
    ZeroTicksPerFrame,
}

/// Conditions that abort decoding of a single track.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// A status byte the decoder does not understand, or a data byte
    /// with no running status to fall back on.
    #[error("Unrecognized status byte {0:#04X}")]
    UnrecognizedStatus(u8),
    /// The absolute event time doesn't fit the engine's tick range
    #[error("Track too long: event at file tick {0} exceeds the engine's time range")]
    TooLong(u64),
    /// A meta event whose payload is shorter than its type requires
    #[error("Meta event {meta_type:#04X} has length {len}, expected {expected}")]
    MetaLength {
        /// The meta type byte
        meta_type: u8,
        /// The declared payload length
        len: u32,
        /// The minimum length for this meta type
        expected: u32,
    },
}

/// Chunk framing problems, both reading and writing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// A chunk declared more bytes than remain in the file
    #[error("Chunk {tag:?} declares {declared} bytes but only {available} remain")]
    LengthOutOfBounds {
        /// The chunk tag
        tag: [u8; 4],
        /// Declared length
        declared: u32,
        /// Bytes left in the input
        available: usize,
    },
    /// More bytes were written into a fixed-length chunk than it declared
    #[error("Chunk {tag:?} declared {declared} bytes but {written} were written")]
    FixedLengthExceeded {
        /// The chunk tag
        tag: [u8; 4],
        /// Declared length
        declared: u32,
        /// Bytes actually written
        written: usize,
    },
    /// `pop` was called with no open chunk
    #[error("Popped a chunk when none was open")]
    Unbalanced,
    /// The writer was finished with chunks still open
    #[error("{0} chunk(s) still open")]
    StillOpen(usize),
    /// A chunk body grew beyond a 32-bit length
    #[error("Chunk body of {0} bytes doesn't fit a 32-bit length")]
    TooLarge(usize),
    /// An expected chunk was not found
    #[error("Expected chunk {expected:?}, found {found:?}")]
    Unexpected {
        /// The tag the caller wanted
        expected: [u8; 4],
        /// The tag that was read
        found: [u8; 4],
    },
}

/// Malformed variable length quantities
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VlqError {
    /// More than four bytes carried the continuation bit
    #[error("Variable length quantity longer than 4 bytes")]
    Overflow,
    /// A fixed-width field contained a byte with bit 7 set
    #[error("Fixed-width field byte {0:#04X} has its high bit set")]
    FixedField(u8),
}

/// Problems in the native event list and document format
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// The stored clock type was not recognized
    #[error("Unknown clock type {0}")]
    ClockType(u8),
    /// The document was written by a newer, incompatible version
    #[error("Unsupported document version {0}")]
    Version(u16),
    /// A name was not valid UTF-8
    #[error("Name is not valid UTF-8")]
    Utf8,
    /// A destination record was invalid
    #[error("Invalid destination record: {0}")]
    Destination(#[from] DestinationError),
}

/// Errors from the destination table
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DestinationError {
    /// All 64 slots are in use
    #[error("No free destination slot (maximum {0})")]
    Full(usize),
    /// MIDI channels are numbered 1 through 16
    #[error("MIDI channel {0} is outside 1..=16")]
    Channel(u8),
}

/// Errors produced while encoding SMF or native data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// Variable length quantities hold at most 28 bits
    #[error("Value {0:#X} is too large for a variable length quantity")]
    VlqOverflow(u32),
    /// Events must be written in non-decreasing time order
    #[error("Event at tick {time} written after tick {last}")]
    OutOfOrder {
        /// The time of the offending event, in file ticks
        time: i64,
        /// The time of the last written event
        last: i64,
    },
    /// The destination did not map to a MIDI channel in 1..=16
    #[error("Destination {0} has no MIDI channel")]
    NoChannel(u8),
    /// A track was finished while note-offs were still queued
    #[error("{0} note-off(s) still pending when the track was closed")]
    PendingNoteOffs(usize),
    /// Names in native documents are stored with a 16-bit length
    #[error("Name of {0} bytes is too long to store")]
    NameTooLong(usize),
    /// Chunk framing error
    #[error("Chunk: {0}")]
    Chunk(#[from] ChunkError),
}
