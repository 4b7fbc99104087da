//! Unified error type for wrd-alerts.
//!
//! No `alloc`: every variant carries fixed-size data, so errors can be
//! copied into stats and log lines freely. `defmt::Format` is derived when
//! the `defmt` feature is on.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Wire format
    /// An inbound message did not match the expected CBOR schema.
    Decode(DecodeError),

    /// An outbound payload could not be encoded.
    Encode(EncodeError),

    // Outbound buffers
    /// No buffer could be handed out for the requested capacity.
    AllocationFailed {
        /// Bytes the caller asked for.
        requested: usize,
    },

    /// The buffer handle was already released (or never acquired).
    StaleHandle,

    // Routing
    /// The dispatcher refused the send.
    Dispatch(DispatchError),
}

/// Why an inbound CBOR message was rejected.
///
/// Field indices refer to positions in the top-level array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The message is not a definite-length CBOR array.
    NotAnArray,
    /// The array has no item at this index.
    MissingField(usize),
    /// The item at this index has the wrong CBOR type.
    TypeMismatch(usize),
    /// The text string at this index does not fit the destination.
    TooLong(usize),
    /// Link frame addressed to a port we do not know.
    UnknownPort(u8),
    /// Truncated input or an out-of-range value.
    Malformed,
}

/// Why an outbound payload could not be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Destination buffer is smaller than the encoded payload.
    BufferTooSmall,
    /// Payload cannot be represented on the wire.
    Unsupported,
}

/// Why the dispatcher refused an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The destination queue is full.
    QueueFull,
    /// Remote host requested but no radio transport is configured.
    NoTransport,
}

// Convenience conversions

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Error::Encode(e)
    }
}

impl From<DispatchError> for Error {
    fn from(e: DispatchError) -> Self {
        Error::Dispatch(e)
    }
}
