//! Link framing between this MCU and the BLE co-processor.
//!
//! Layout:
//! ```text
//! Byte 0:     Port id (1 = control, 2 = equip, 3 = alert)
//! Byte 1:     Payload length N
//! Byte 2..N+2: CBOR payload
//! ```

use crate::config::{LINK_HEADER_LEN, LINK_MAX_PAYLOAD};
use crate::error::{DecodeError, EncodeError};
use crate::protocol::Port;

/// Parse a frame header into the port and payload length.
pub fn parse_header(header: [u8; LINK_HEADER_LEN]) -> Result<(Port, usize), DecodeError> {
    let port = Port::from_raw(header[0]).ok_or(DecodeError::UnknownPort(header[0]))?;
    Ok((port, header[1] as usize))
}

/// Write a complete frame into `out`. Returns the number of bytes written.
pub fn encode_frame(port: Port, payload: &[u8], out: &mut [u8]) -> Result<usize, EncodeError> {
    if payload.len() > LINK_MAX_PAYLOAD {
        return Err(EncodeError::Unsupported);
    }
    let total = LINK_HEADER_LEN + payload.len();
    if out.len() < total {
        return Err(EncodeError::BufferTooSmall);
    }

    out[0] = port.as_raw();
    out[1] = payload.len() as u8;
    out[LINK_HEADER_LEN..total].copy_from_slice(payload);
    Ok(total)
}

/// Split a complete frame into port and payload.
pub fn decode_frame(frame: &[u8]) -> Result<(Port, &[u8]), DecodeError> {
    if frame.len() < LINK_HEADER_LEN {
        return Err(DecodeError::Malformed);
    }
    let (port, len) = parse_header([frame[0], frame[1]])?;
    let payload = frame
        .get(LINK_HEADER_LEN..LINK_HEADER_LEN + len)
        .ok_or(DecodeError::Malformed)?;
    Ok((port, payload))
}
