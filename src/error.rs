//! Error types for the SRTP protocol.

use std::io;
use thiserror::Error;

/// Result type alias for SRTP operations.
pub type Result<T> = std::result::Result<T, SrtpError>;

/// Fault categories a PLC can report in an error (NACK) response.
///
/// The PLC encodes the reason as a single byte immediately following the
/// 56-byte response header. Codes outside the known table are preserved as
/// [`PlcFaultKind::Unknown`] together with the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlcFaultKind {
    /// The PLC rejected the service request code.
    ServiceCode,
    /// The PLC rejected the segment selector.
    SegmentSelector,
    /// The requested memory address does not exist.
    InvalidAddress,
    /// The requested memory range or length is invalid.
    MemoryRange,
    /// The operation requires a higher privilege level.
    InsufficientPrivilege,
    /// The operation requires the PLC to be stopped.
    RunMode,
    /// The target memory is write-protected.
    MemoryProtect,
    /// The PLC reported an internal timeout.
    PlcTimeout,
    /// Error code not covered by the known table.
    Unknown,
}

impl PlcFaultKind {
    /// Maps a raw PLC error byte to its fault category.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => PlcFaultKind::ServiceCode,
            0x02 => PlcFaultKind::SegmentSelector,
            0x03 => PlcFaultKind::InvalidAddress,
            0x04 => PlcFaultKind::MemoryRange,
            0x05 => PlcFaultKind::InsufficientPrivilege,
            0x06 => PlcFaultKind::RunMode,
            0x07 => PlcFaultKind::MemoryProtect,
            0x08 => PlcFaultKind::PlcTimeout,
            _ => PlcFaultKind::Unknown,
        }
    }
}

impl std::fmt::Display for PlcFaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PlcFaultKind::ServiceCode => "service code rejected",
            PlcFaultKind::SegmentSelector => "segment selector rejected",
            PlcFaultKind::InvalidAddress => "invalid address",
            PlcFaultKind::MemoryRange => "invalid memory range",
            PlcFaultKind::InsufficientPrivilege => "insufficient privilege",
            PlcFaultKind::RunMode => "PLC in run mode",
            PlcFaultKind::MemoryProtect => "memory protected",
            PlcFaultKind::PlcTimeout => "PLC-side timeout",
            PlcFaultKind::Unknown => "unknown error",
        };
        f.write_str(text)
    }
}

/// Errors that can occur during SRTP communication.
#[derive(Debug, Error)]
pub enum SrtpError {
    /// Error (NACK) response reported by the PLC.
    #[error("PLC fault: {kind} (code 0x{code:02X})")]
    Plc {
        /// Fault category decoded from the error byte.
        kind: PlcFaultKind,
        /// Raw error byte from the response.
        code: u8,
    },

    /// Connection failed, was lost, or is in the wrong state.
    #[error("Connection error: {reason}")]
    Connection {
        /// Description of the connection error.
        reason: String,
    },

    /// The initialization handshake failed.
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Description of the handshake failure.
        reason: String,
    },

    /// A blocking operation exceeded its deadline.
    #[error("Communication timeout")]
    Timeout,

    /// Response shorter than a header or carrying the wrong packet type.
    #[error("Malformed packet: {reason}")]
    MalformedPacket {
        /// Description of the packet defect.
        reason: String,
    },

    /// Response sequence number does not match the request.
    #[error("Sequence mismatch: expected {expected}, received {received}")]
    SequenceMismatch {
        /// Sequence number sent with the request.
        expected: u8,
        /// Sequence number found in the response.
        received: u8,
    },

    /// Response payload inconsistent with the requested decode.
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// Description of the response error.
        reason: String,
    },

    /// Invalid parameter provided by the caller.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SrtpError {
    /// Creates a `Plc` fault from a raw error byte.
    ///
    /// # Example
    ///
    /// ```
    /// use ge_srtp::{PlcFaultKind, SrtpError};
    ///
    /// let err = SrtpError::plc_fault(0x03);
    /// assert!(matches!(err, SrtpError::Plc { kind: PlcFaultKind::InvalidAddress, code: 0x03 }));
    /// ```
    pub fn plc_fault(code: u8) -> Self {
        Self::Plc {
            kind: PlcFaultKind::from_code(code),
            code,
        }
    }

    /// Creates a new `Connection` error.
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Creates a new `Initialization` error.
    pub fn initialization(reason: impl Into<String>) -> Self {
        Self::Initialization {
            reason: reason.into(),
        }
    }

    /// Creates a new `MalformedPacket` error.
    pub fn malformed_packet(reason: impl Into<String>) -> Self {
        Self::MalformedPacket {
            reason: reason.into(),
        }
    }

    /// Creates a new `SequenceMismatch` error.
    pub fn sequence_mismatch(expected: u8, received: u8) -> Self {
        Self::SequenceMismatch { expected, received }
    }

    /// Creates a new `InvalidResponse` error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ge_srtp::SrtpError;
    ///
    /// let err = SrtpError::invalid_parameter("count", "must be greater than 0");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
