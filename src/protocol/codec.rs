//! CBOR wire codec for control, equip and alert messages.
//!
//! Only the subset this firmware speaks is covered: positional reads of
//! unsigned integers and text strings from a top-level definite array,
//! and the fixed `[uint, text, text]` alert payload.

use crate::error::{DecodeError, EncodeError};
use crate::protocol::Alert;
use heapless::String;
use minicbor::decode::Error as CborDecodeError;
use minicbor::encode::write::{Cursor, EndOfSlice, Write};
use minicbor::encode::Error as CborEncodeError;
use minicbor::{Decoder, Encoder};

/// Number of items in an alert payload.
const ALERT_FIELDS: u64 = 3;

/// Read item `index` of the top-level array as an unsigned integer.
pub fn decode_unsigned(buf: &[u8], index: usize) -> Result<u32, DecodeError> {
    let mut decoder = seek(buf, index)?;
    decoder.u32().map_err(|e| item_error(e, index))
}

/// Borrow item `index` of the top-level array as a text string.
pub fn decode_str(buf: &[u8], index: usize) -> Result<&str, DecodeError> {
    let mut decoder = seek(buf, index)?;
    decoder.str().map_err(|e| item_error(e, index))
}

/// Copy item `index` of the top-level array into an owned string.
///
/// Strings longer than `N` bytes are rejected rather than truncated.
pub fn decode_string<const N: usize>(
    buf: &[u8],
    index: usize,
) -> Result<String<N>, DecodeError> {
    let text = decode_str(buf, index)?;
    let mut owned = String::new();
    owned
        .push_str(text)
        .map_err(|_| DecodeError::TooLong(index))?;
    Ok(owned)
}

/// Exact encoded size of an alert payload.
///
/// Callers size their buffer with this; `encode_alert` writes exactly
/// this many bytes.
pub fn alert_len(duration_ms: u32, title: &str, body: &str) -> usize {
    header_len(ALERT_FIELDS)
        + header_len(u64::from(duration_ms))
        + text_len(title)
        + text_len(body)
}

/// Encode `[duration_ms, title, body]` into `out`.
///
/// Returns the number of bytes written. Strings are written with their
/// exact byte length.
pub fn encode_alert(
    duration_ms: u32,
    title: &str,
    body: &str,
    out: &mut [u8],
) -> Result<usize, EncodeError> {
    let mut cursor = Cursor::new(out);
    {
        let mut encoder = Encoder::new(&mut cursor);
        write_alert(&mut encoder, duration_ms, title, body).map_err(map_encode_err)?;
    }
    Ok(cursor.position())
}

/// Decode a complete alert payload. Trailing bytes are rejected.
pub fn decode_alert(buf: &[u8]) -> Result<Alert<'_>, DecodeError> {
    let mut decoder = Decoder::new(buf);
    let len = array_len(&mut decoder)?;
    if len < ALERT_FIELDS {
        return Err(DecodeError::MissingField(len as usize));
    }
    if len > ALERT_FIELDS {
        return Err(DecodeError::Malformed);
    }

    let duration_ms = decoder.u32().map_err(|e| item_error(e, 0))?;
    let title = decoder.str().map_err(|e| item_error(e, 1))?;
    let body = decoder.str().map_err(|e| item_error(e, 2))?;
    if decoder.position() != buf.len() {
        return Err(DecodeError::Malformed);
    }

    Ok(Alert {
        duration_ms,
        title,
        body,
    })
}

fn write_alert<W: Write>(
    encoder: &mut Encoder<W>,
    duration_ms: u32,
    title: &str,
    body: &str,
) -> Result<(), CborEncodeError<W::Error>> {
    encoder
        .array(ALERT_FIELDS)?
        .u32(duration_ms)?
        .str(title)?
        .str(body)?;
    Ok(())
}

/// Position a decoder on item `index` of the top-level array.
fn seek(buf: &[u8], index: usize) -> Result<Decoder<'_>, DecodeError> {
    let mut decoder = Decoder::new(buf);
    let len = array_len(&mut decoder)?;
    if index as u64 >= len {
        return Err(DecodeError::MissingField(index));
    }
    for skipped in 0..index {
        decoder.skip().map_err(|e| item_error(e, skipped))?;
    }
    Ok(decoder)
}

fn array_len(decoder: &mut Decoder<'_>) -> Result<u64, DecodeError> {
    match decoder.array() {
        Ok(Some(len)) => Ok(len),
        // Indefinite-length arrays are not part of this protocol.
        Ok(None) => Err(DecodeError::NotAnArray),
        Err(e) if e.is_type_mismatch() => Err(DecodeError::NotAnArray),
        Err(_) => Err(DecodeError::Malformed),
    }
}

fn item_error(err: CborDecodeError, index: usize) -> DecodeError {
    if err.is_type_mismatch() {
        DecodeError::TypeMismatch(index)
    } else {
        DecodeError::Malformed
    }
}

fn map_encode_err(err: CborEncodeError<EndOfSlice>) -> EncodeError {
    if err.is_write() {
        EncodeError::BufferTooSmall
    } else {
        EncodeError::Unsupported
    }
}

/// Size of a CBOR major-type header carrying `value`.
const fn header_len(value: u64) -> usize {
    if value < 24 {
        1
    } else if value <= 0xFF {
        2
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

fn text_len(text: &str) -> usize {
    header_len(text.len() as u64) + text.len()
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_unsigned_reads_positional_fields() {
        // [1, 4]
        let data = [0x82, 0x01, 0x04];
        assert_eq!(decode_unsigned(&data, 0), Ok(1));
        assert_eq!(decode_unsigned(&data, 1), Ok(4));
    }

    #[test]
    fn decode_unsigned_multi_byte_values() {
        // [5000, 70000]
        let data = [0x82, 0x19, 0x13, 0x88, 0x1A, 0x00, 0x01, 0x11, 0x70];
        assert_eq!(decode_unsigned(&data, 0), Ok(5000));
        assert_eq!(decode_unsigned(&data, 1), Ok(70000));
    }

    #[test]
    fn decode_unsigned_missing_field() {
        let data = [0x81, 0x01];
        assert_eq!(decode_unsigned(&data, 1), Err(DecodeError::MissingField(1)));
        assert_eq!(decode_unsigned(&[0x80], 0), Err(DecodeError::MissingField(0)));
    }

    #[test]
    fn decode_unsigned_rejects_text_and_negative() {
        // ["a", -1]
        let data = [0x82, 0x61, b'a', 0x20];
        assert_eq!(decode_unsigned(&data, 0), Err(DecodeError::TypeMismatch(0)));
        assert_eq!(decode_unsigned(&data, 1), Err(DecodeError::TypeMismatch(1)));
    }

    #[test]
    fn decode_unsigned_value_beyond_u32_is_malformed() {
        // [2^32]
        let data = [0x81, 0x1B, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(decode_unsigned(&data, 0), Err(DecodeError::Malformed));
    }

    #[test]
    fn non_array_top_level_is_rejected() {
        // Bare unsigned integer 1.
        assert_eq!(decode_unsigned(&[0x01], 0), Err(DecodeError::NotAnArray));
        // Map {1: 1}.
        assert_eq!(
            decode_unsigned(&[0xA1, 0x01, 0x01], 0),
            Err(DecodeError::NotAnArray)
        );
        // Indefinite-length array [_ 1, 1].
        assert_eq!(
            decode_unsigned(&[0x9F, 0x01, 0x01, 0xFF], 0),
            Err(DecodeError::NotAnArray)
        );
    }

    #[test]
    fn empty_and_truncated_input_is_malformed() {
        assert_eq!(decode_unsigned(&[], 0), Err(DecodeError::Malformed));
        // Array claims two items, second is cut short.
        assert_eq!(decode_unsigned(&[0x82, 0x01, 0x19, 0x13], 1), Err(DecodeError::Malformed));
    }

    #[test]
    fn decode_str_skips_preceding_items() {
        // [[1, 2], "hi"] - nested array skipped as one item.
        let data = [0x82, 0x82, 0x01, 0x02, 0x62, b'h', b'i'];
        assert_eq!(decode_str(&data, 1), Ok("hi"));
    }

    #[test]
    fn decode_string_respects_capacity() {
        let data = [0x82, 0x01, 0x65, b'h', b'e', b'l', b'l', b'o'];
        let fits: String<5> = decode_string(&data, 1).unwrap();
        assert_eq!(fits.as_str(), "hello");

        let too_small: Result<String<4>, _> = decode_string(&data, 1);
        assert_eq!(too_small, Err(DecodeError::TooLong(1)));
    }

    #[test]
    fn decode_string_rejects_byte_strings() {
        // [1, h'6869']
        let data = [0x82, 0x01, 0x42, b'h', b'i'];
        let result: Result<String<8>, _> = decode_string(&data, 1);
        assert_eq!(result, Err(DecodeError::TypeMismatch(1)));
    }

    #[test]
    fn encode_alert_exact_bytes() {
        let mut buf = [0u8; 32];
        let written = encode_alert(5000, "Button", "Pressed!", &mut buf).unwrap();

        let expected: &[u8] = &[
            0x83, // array(3)
            0x19, 0x13, 0x88, // 5000
            0x66, b'B', b'u', b't', b't', b'o', b'n', // "Button"
            0x68, b'P', b'r', b'e', b's', b's', b'e', b'd', b'!', // "Pressed!"
        ];
        assert_eq!(&buf[..written], expected);
        assert_eq!(written, alert_len(5000, "Button", "Pressed!"));
    }

    #[test]
    fn alert_len_matches_encoder_across_header_sizes() {
        let long = "x".repeat(300);
        let cases: [(u32, &str, &str); 5] = [
            (0, "", ""),
            (23, "a", "b"),
            (24, "Device Name", &long[..23]),
            (5000, "Device Name", &long[..24]),
            (u32::MAX, &long[..255], &long[..256]),
        ];
        let mut buf = [0u8; 700];
        for (duration, title, body) in cases {
            let written = encode_alert(duration, title, body, &mut buf).unwrap();
            assert_eq!(written, alert_len(duration, title, body));
        }
    }

    #[test]
    fn encode_alert_reports_short_buffer() {
        let needed = alert_len(5000, "Bluetooth", "Disconnected");
        let mut buf = [0u8; 64];
        assert_eq!(
            encode_alert(5000, "Bluetooth", "Disconnected", &mut buf[..needed - 1]),
            Err(EncodeError::BufferTooSmall)
        );
        assert_eq!(
            encode_alert(5000, "Bluetooth", "Disconnected", &mut buf[..needed]),
            Ok(needed)
        );
    }

    #[test]
    fn encode_alert_keeps_embedded_nul_bytes() {
        let body = "ab\0cd";
        let mut buf = [0u8; 32];
        let written = encode_alert(1, "t", body, &mut buf).unwrap();
        let alert = decode_alert(&buf[..written]).unwrap();
        assert_eq!(alert.body, body);
        assert_eq!(alert.body.len(), 5);
    }

    #[test]
    fn alert_roundtrip_with_multibyte_text() {
        let mut buf = [0u8; 128];
        let written = encode_alert(5000, "Gerätename", "Uhr ⌚ 東京", &mut buf).unwrap();
        let alert = decode_alert(&buf[..written]).unwrap();
        assert_eq!(alert.duration_ms, 5000);
        assert_eq!(alert.title, "Gerätename");
        assert_eq!(alert.body, "Uhr ⌚ 東京");
    }

    #[test]
    fn decode_alert_rejects_wrong_arity() {
        // [5000, "a"]
        let short = [0x82, 0x19, 0x13, 0x88, 0x61, b'a'];
        assert_eq!(decode_alert(&short), Err(DecodeError::MissingField(2)));

        // [1, "a", "b", "c"]
        let long = [0x84, 0x01, 0x61, b'a', 0x61, b'b', 0x61, b'c'];
        assert_eq!(decode_alert(&long), Err(DecodeError::Malformed));
    }

    #[test]
    fn decode_alert_rejects_trailing_bytes() {
        let mut buf = [0u8; 32];
        let written = encode_alert(5000, "Button", "Pressed!", &mut buf).unwrap();
        assert!(decode_alert(&buf[..written]).is_ok());
        assert_eq!(
            decode_alert(&buf[..written + 1]),
            Err(DecodeError::Malformed)
        );
    }

    #[test]
    fn decode_alert_rejects_swapped_fields() {
        // ["a", 1, "b"]
        let data = [0x83, 0x61, b'a', 0x01, 0x61, b'b'];
        assert_eq!(decode_alert(&data), Err(DecodeError::TypeMismatch(0)));
    }
}
