//! SRTP frame construction and parsing.
//!
//! This module is the wire-format codec for the GE-SRTP protocol. It builds
//! request byte sequences and parses response byte sequences; it has no I/O
//! dependency of its own.
//!
//! # Frame Structure (56-byte header)
//!
//! Every SRTP message starts with a fixed 56-byte header. Multi-byte fields
//! are little-endian. The payload, if any, follows the header directly.
//!
//! | Byte(s) | Field |
//! |---------|-------|
//! | 0 | Packet type (0x02 request, 0x03 response) |
//! | 2 | Sequence number |
//! | 4 | Payload length indicator (responses) |
//! | 9, 17 | Reserved, always 0x01 |
//! | 26-28 | Wall-clock seconds/minutes/hours (informational only) |
//! | 30 | Sequence number (duplicate) |
//! | 31 | Message type (0xC0 request, 0xD4 ACK, 0x94 ACK+data, 0xD1 error) |
//! | 32-35 | Mailbox source (all zero) |
//! | 36-39 | Mailbox destination (CPU-slot derived) |
//! | 40, 41 | Packet number / total packets, both 0x01 |
//! | 42 | Service request code |
//! | 43 | Segment selector |
//! | 44-45 | Data offset (LE16) |
//! | 46-47 | Data length (LE16) |
//!
//! All remaining bytes are reserved and zero.
//!
//! # Example
//!
//! ```
//! use ge_srtp::frame::{self, Frame};
//!
//! let request = frame::build_request(7, 0x04, 0x08, 100, 4, 1, &[]);
//! assert_eq!(request.len(), frame::HEADER_SIZE);
//! assert_eq!(request[2], 7);
//!
//! // Synthesize the matching response: header + 8 payload bytes.
//! let mut bytes = vec![0u8; frame::HEADER_SIZE];
//! bytes[0] = 0x03;
//! bytes[2] = 7;
//! bytes[31] = 0x94;
//! bytes.extend_from_slice(&[0x01, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]);
//!
//! let frame = Frame::parse_response(&bytes).unwrap();
//! assert!(frame.check_sequence(7).is_ok());
//! assert_eq!(frame.to_words().unwrap(), vec![1, -1, 0, 0]);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, SrtpError};

/// SRTP header size in bytes.
pub const HEADER_SIZE: usize = 56;

/// Packet type byte for requests.
pub const PACKET_TYPE_REQUEST: u8 = 0x02;
/// Packet type byte for responses.
pub const PACKET_TYPE_RESPONSE: u8 = 0x03;

/// Message type byte for requests.
pub const MESSAGE_TYPE_REQUEST: u8 = 0xC0;
/// Message type byte for an ACK without payload.
pub const MESSAGE_TYPE_ACK: u8 = 0xD4;
/// Message type byte for an ACK carrying a data payload.
pub const MESSAGE_TYPE_ACK_WITH_DATA: u8 = 0x94;
/// Message type byte for an error (NACK) response.
pub const MESSAGE_TYPE_ERROR: u8 = 0xD1;

/// PLC short status query.
pub(crate) const SVC_PLC_SHORT_STATUS: u8 = 0x00;
/// Return control program names.
pub(crate) const SVC_PROGRAM_NAMES: u8 = 0x03;
/// Read system memory (all region reads).
pub(crate) const SVC_READ_SYSTEM_MEMORY: u8 = 0x04;
/// Return PLC date and time.
pub(crate) const SVC_PLC_DATETIME: u8 = 0x25;
/// Return the PLC fault table.
pub(crate) const SVC_FAULT_TABLE: u8 = 0x38;
/// Return controller type and ID.
pub(crate) const SVC_CONTROLLER_TYPE_AND_ID: u8 = 0x43;

/// Mailbox destination for a CPU slot: `[rack/slot field, 0x0E, port, reserved]`.
///
/// Slot 1 encodes as `10 0E 00 00`, slot 2 as `20 0E 00 00`, and so on.
fn mailbox_destination(slot: u8) -> [u8; 4] {
    [slot.wrapping_mul(0x10), 0x0E, 0x00, 0x00]
}

/// Wall-clock (hours, minutes, seconds) for the informational header bytes.
///
/// The PLC never interprets these, so UTC derived from the system clock is
/// sufficient.
fn wall_clock() -> (u8, u8, u8) {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    (
        ((secs / 3600) % 24) as u8,
        ((secs / 60) % 60) as u8,
        (secs % 60) as u8,
    )
}

/// Builds a 56-byte SRTP request, with `payload` appended if non-empty.
///
/// The sequence number is written at both header offsets 2 and 30. Data
/// offset and data length are little-endian. The `u8`/`u16` parameter types
/// bound every field to its legal wire range.
///
/// `payload` exists for wire-format completeness; this read-only crate never
/// sends one.
///
/// # Example
///
/// ```
/// use ge_srtp::frame;
///
/// let bytes = frame::build_request(0x2A, 0x04, 0x08, 0x0100, 4, 1, &[]);
/// assert_eq!(bytes[0], 0x02);       // request packet type
/// assert_eq!(bytes[2], 0x2A);       // sequence number
/// assert_eq!(bytes[30], 0x2A);      // duplicate sequence number
/// assert_eq!(&bytes[44..46], &[0x00, 0x01]); // offset, little-endian
/// ```
pub fn build_request(
    sequence: u8,
    service_code: u8,
    segment_selector: u8,
    data_offset: u16,
    data_length: u16,
    slot: u8,
    payload: &[u8],
) -> Vec<u8> {
    let (hours, minutes, seconds) = wall_clock();

    let mut packet = vec![0u8; HEADER_SIZE];
    packet[0] = PACKET_TYPE_REQUEST;
    packet[2] = sequence;
    packet[9] = 0x01;
    packet[17] = 0x01;
    packet[26] = seconds;
    packet[27] = minutes;
    packet[28] = hours;
    packet[30] = sequence;
    packet[31] = MESSAGE_TYPE_REQUEST;
    // Bytes 32-35: mailbox source, fixed zero.
    packet[36..40].copy_from_slice(&mailbox_destination(slot));
    packet[40] = 0x01; // packet number
    packet[41] = 0x01; // total packets
    packet[42] = service_code;
    packet[43] = segment_selector;
    packet[44..46].copy_from_slice(&data_offset.to_le_bytes());
    packet[46..48].copy_from_slice(&data_length.to_le_bytes());

    packet.extend_from_slice(payload);

    log::debug!(
        "built request: seq={sequence}, service=0x{service_code:02X}, \
         selector=0x{segment_selector:02X}, offset={data_offset}, length={data_length}"
    );

    packet
}

/// Parsed SRTP response frame.
///
/// A `Frame` is constructed fresh per response and discarded after its
/// payload has been decoded.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Packet type byte (0x03 for responses).
    pub packet_type: u8,
    /// Sequence number echoed from the request.
    pub sequence: u8,
    /// Message type byte (ACK, ACK-with-data, or error).
    pub message_type: u8,
    /// Service request code echoed from the request.
    pub service_code: u8,
    /// Segment selector echoed from the request.
    pub segment_selector: u8,
    /// Data offset field (little-endian on the wire).
    pub data_offset: u16,
    /// Data length field (little-endian on the wire).
    pub data_length: u16,
    /// Payload bytes following the 56-byte header.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Parses an SRTP response frame.
    ///
    /// # Errors
    ///
    /// - `SrtpError::MalformedPacket` if the input is shorter than 56 bytes
    ///   or the packet type byte is not the response tag.
    /// - `SrtpError::Plc` if the message type is the error tag; the fault is
    ///   decoded from the error byte following the header (0 if absent).
    ///
    /// ACK (0xD4) and ACK-with-data (0x94) are both accepted. ACK responses
    /// typically carry no payload, but callers must not assume presence or
    /// absence of payload from the message type alone.
    pub fn parse_response(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SrtpError::malformed_packet(format!(
                "packet too short: expected at least {HEADER_SIZE} bytes, got {}",
                data.len()
            )));
        }

        if data[0] != PACKET_TYPE_RESPONSE {
            return Err(SrtpError::malformed_packet(format!(
                "expected response packet (0x{PACKET_TYPE_RESPONSE:02X}), got 0x{:02X}",
                data[0]
            )));
        }

        let message_type = data[31];
        if message_type == MESSAGE_TYPE_ERROR {
            let code = data.get(HEADER_SIZE).copied().unwrap_or(0);
            return Err(SrtpError::plc_fault(code));
        }

        if message_type != MESSAGE_TYPE_ACK && message_type != MESSAGE_TYPE_ACK_WITH_DATA {
            log::warn!("unexpected message type 0x{message_type:02X}, treating as success");
        }

        let frame = Self {
            packet_type: data[0],
            sequence: data[2],
            message_type,
            service_code: data[42],
            segment_selector: data[43],
            data_offset: u16::from_le_bytes([data[44], data[45]]),
            data_length: u16::from_le_bytes([data[46], data[47]]),
            payload: data[HEADER_SIZE..].to_vec(),
        };

        log::debug!(
            "parsed response: seq={}, msg_type=0x{:02X}, payload_len={}",
            frame.sequence,
            frame.message_type,
            frame.payload.len()
        );

        Ok(frame)
    }

    /// Validates that the frame's sequence number matches the request.
    ///
    /// # Errors
    ///
    /// Returns `SrtpError::SequenceMismatch` if the numbers disagree.
    pub fn check_sequence(&self, expected: u8) -> Result<()> {
        if self.sequence == expected {
            Ok(())
        } else {
            Err(SrtpError::sequence_mismatch(expected, self.sequence))
        }
    }

    /// Decodes the payload as consecutive little-endian signed 16-bit words.
    ///
    /// # Errors
    ///
    /// Returns `SrtpError::InvalidResponse` if the payload length is odd.
    ///
    /// # Example
    ///
    /// ```
    /// # use ge_srtp::frame::{self, Frame};
    /// # let mut bytes = vec![0u8; frame::HEADER_SIZE];
    /// # bytes[0] = 0x03;
    /// # bytes[31] = 0x94;
    /// bytes.extend_from_slice(&[0x34, 0x12, 0xFF, 0xFF]);
    /// let frame = Frame::parse_response(&bytes).unwrap();
    /// assert_eq!(frame.to_words().unwrap(), vec![0x1234, -1]);
    /// ```
    pub fn to_words(&self) -> Result<Vec<i16>> {
        if self.payload.len() % 2 != 0 {
            return Err(SrtpError::invalid_response(format!(
                "payload length {} is not a multiple of 2 bytes",
                self.payload.len()
            )));
        }

        Ok(self
            .payload
            .chunks_exact(2)
            .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
            .collect())
    }

    /// Returns the payload as unsigned byte values.
    pub fn to_byte_values(&self) -> Vec<u8> {
        self.payload.clone()
    }

    /// Decodes up to `bit_count` bits from the payload, least-significant
    /// bit first within each byte.
    ///
    /// Exhausting the payload before `bit_count` bits are produced yields a
    /// shorter result; that is not an error at this layer.
    ///
    /// # Example
    ///
    /// ```
    /// # use ge_srtp::frame::{self, Frame};
    /// # let mut bytes = vec![0u8; frame::HEADER_SIZE];
    /// # bytes[0] = 0x03;
    /// # bytes[31] = 0x94;
    /// bytes.push(0b0000_0101);
    /// let frame = Frame::parse_response(&bytes).unwrap();
    /// assert_eq!(frame.to_bits(3), vec![true, false, true]);
    /// ```
    pub fn to_bits(&self, bit_count: usize) -> Vec<bool> {
        let mut bits = Vec::with_capacity(bit_count);
        for byte in &self.payload {
            for bit_idx in 0..8 {
                if bits.len() >= bit_count {
                    return bits;
                }
                bits.push(byte & (1 << bit_idx) != 0);
            }
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlcFaultKind;

    fn make_response(sequence: u8, message_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0] = PACKET_TYPE_RESPONSE;
        bytes[2] = sequence;
        bytes[30] = sequence;
        bytes[31] = message_type;
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_build_request_layout() {
        let bytes = build_request(0x2A, 0x04, 0x08, 0x1234, 0x0056, 1, &[]);

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(bytes[0], PACKET_TYPE_REQUEST);
        assert_eq!(bytes[1], 0x00);
        assert_eq!(bytes[2], 0x2A);
        assert_eq!(bytes[4], 0x00);
        assert_eq!(bytes[9], 0x01);
        assert_eq!(bytes[17], 0x01);
        assert_eq!(bytes[30], 0x2A);
        assert_eq!(bytes[31], MESSAGE_TYPE_REQUEST);
        assert_eq!(&bytes[32..36], &[0x00; 4]);
        assert_eq!(&bytes[36..40], &[0x10, 0x0E, 0x00, 0x00]);
        assert_eq!(bytes[40], 0x01);
        assert_eq!(bytes[41], 0x01);
        assert_eq!(bytes[42], 0x04);
        assert_eq!(bytes[43], 0x08);
        assert_eq!(&bytes[44..46], &[0x34, 0x12]);
        assert_eq!(&bytes[46..48], &[0x56, 0x00]);
        assert_eq!(&bytes[48..56], &[0x00; 8]);
    }

    #[test]
    fn test_build_request_reserved_bytes_hex() {
        // Everything outside the variable fields (sequence, time, mailbox,
        // service, selector, offset, length) must be the fixed pattern.
        let bytes = build_request(0, 0, 0, 0, 0, 0, &[]);
        assert_eq!(hex::encode(&bytes[5..9]), "00000000");
        assert_eq!(hex::encode(&bytes[10..17]), "00000000000000");
        assert_eq!(hex::encode(&bytes[18..26]), "0000000000000000");
    }

    #[test]
    fn test_build_request_mailbox_slots() {
        let slot1 = build_request(0, 0x04, 0x08, 0, 4, 1, &[]);
        let slot2 = build_request(0, 0x04, 0x08, 0, 4, 2, &[]);
        assert_eq!(&slot1[36..40], &[0x10, 0x0E, 0x00, 0x00]);
        assert_eq!(&slot2[36..40], &[0x20, 0x0E, 0x00, 0x00]);
    }

    #[test]
    fn test_build_request_appends_payload() {
        let bytes = build_request(1, 0x04, 0x08, 0, 4, 1, &[0xAA, 0xBB]);
        assert_eq!(bytes.len(), HEADER_SIZE + 2);
        assert_eq!(&bytes[HEADER_SIZE..], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_sequence_roundtrip_all_values() {
        for seq in 0..=255u8 {
            let request = build_request(seq, 0x04, 0x08, 0, 4, 1, &[]);
            assert_eq!(request[2], seq);
            assert_eq!(request[30], seq);

            let response = make_response(seq, MESSAGE_TYPE_ACK, &[]);
            let frame = Frame::parse_response(&response).unwrap();
            assert_eq!(frame.sequence, seq);
            assert!(frame.check_sequence(seq).is_ok());
        }
    }

    #[test]
    fn test_parse_response_too_short() {
        let result = Frame::parse_response(&[0u8; 40]);
        assert!(matches!(result, Err(SrtpError::MalformedPacket { .. })));
    }

    #[test]
    fn test_parse_response_wrong_packet_type() {
        let mut bytes = make_response(0, MESSAGE_TYPE_ACK, &[]);
        bytes[0] = PACKET_TYPE_REQUEST;
        let result = Frame::parse_response(&bytes);
        assert!(matches!(result, Err(SrtpError::MalformedPacket { .. })));
    }

    #[test]
    fn test_parse_response_error_with_code() {
        let bytes = make_response(0, MESSAGE_TYPE_ERROR, &[0x03]);
        match Frame::parse_response(&bytes) {
            Err(SrtpError::Plc { kind, code }) => {
                assert_eq!(kind, PlcFaultKind::InvalidAddress);
                assert_eq!(code, 0x03);
            }
            other => panic!("expected Plc fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_error_without_code() {
        let bytes = make_response(0, MESSAGE_TYPE_ERROR, &[]);
        match Frame::parse_response(&bytes) {
            Err(SrtpError::Plc { code, .. }) => assert_eq!(code, 0),
            other => panic!("expected Plc fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_ack_and_ack_with_data() {
        let ack = Frame::parse_response(&make_response(3, MESSAGE_TYPE_ACK, &[])).unwrap();
        assert!(ack.payload.is_empty());

        let ack_data =
            Frame::parse_response(&make_response(3, MESSAGE_TYPE_ACK_WITH_DATA, &[0x01, 0x02]))
                .unwrap();
        assert_eq!(ack_data.payload, vec![0x01, 0x02]);
    }

    #[test]
    fn test_parse_response_header_fields() {
        let mut bytes = make_response(9, MESSAGE_TYPE_ACK_WITH_DATA, &[0x00, 0x00]);
        bytes[42] = 0x04;
        bytes[43] = 0x0A;
        bytes[44..46].copy_from_slice(&200u16.to_le_bytes());
        bytes[46..48].copy_from_slice(&4u16.to_le_bytes());

        let frame = Frame::parse_response(&bytes).unwrap();
        assert_eq!(frame.service_code, 0x04);
        assert_eq!(frame.segment_selector, 0x0A);
        assert_eq!(frame.data_offset, 200);
        assert_eq!(frame.data_length, 4);
    }

    #[test]
    fn test_check_sequence_mismatch() {
        let frame = Frame::parse_response(&make_response(6, MESSAGE_TYPE_ACK, &[])).unwrap();
        match frame.check_sequence(5) {
            Err(SrtpError::SequenceMismatch { expected, received }) => {
                assert_eq!(expected, 5);
                assert_eq!(received, 6);
            }
            other => panic!("expected SequenceMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_to_words_signed_little_endian() {
        let payload = [0x01, 0x00, 0xFF, 0xFF, 0x02, 0x00, 0x00, 0x80, 0x7F, 0x00];
        let frame =
            Frame::parse_response(&make_response(0, MESSAGE_TYPE_ACK_WITH_DATA, &payload)).unwrap();
        assert_eq!(frame.to_words().unwrap(), vec![1, -1, 2, -32768, 127]);
    }

    #[test]
    fn test_to_words_odd_length() {
        let frame =
            Frame::parse_response(&make_response(0, MESSAGE_TYPE_ACK_WITH_DATA, &[0x01, 0x02, 0x03]))
                .unwrap();
        assert!(matches!(
            frame.to_words(),
            Err(SrtpError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_to_words_empty() {
        let frame = Frame::parse_response(&make_response(0, MESSAGE_TYPE_ACK, &[])).unwrap();
        assert!(frame.to_words().unwrap().is_empty());
    }

    #[test]
    fn test_to_byte_values() {
        let frame =
            Frame::parse_response(&make_response(0, MESSAGE_TYPE_ACK_WITH_DATA, &[0xDE, 0xAD]))
                .unwrap();
        assert_eq!(frame.to_byte_values(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_to_bits_lsb_first() {
        let frame =
            Frame::parse_response(&make_response(0, MESSAGE_TYPE_ACK_WITH_DATA, &[0b0000_0101]))
                .unwrap();
        assert_eq!(frame.to_bits(3), vec![true, false, true]);
    }

    #[test]
    fn test_to_bits_spans_bytes() {
        let frame = Frame::parse_response(&make_response(
            0,
            MESSAGE_TYPE_ACK_WITH_DATA,
            &[0xFF, 0x01],
        ))
        .unwrap();
        let bits = frame.to_bits(10);
        assert_eq!(bits.len(), 10);
        assert!(bits[..9].iter().all(|&b| b));
        assert!(!bits[9]);
    }

    #[test]
    fn test_to_bits_short_payload() {
        let frame =
            Frame::parse_response(&make_response(0, MESSAGE_TYPE_ACK_WITH_DATA, &[0x00])).unwrap();
        assert_eq!(frame.to_bits(16).len(), 8);
    }
}
