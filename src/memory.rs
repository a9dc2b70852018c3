//! Memory type definitions for the SRTP protocol.
//!
//! This module defines the [`MemoryType`] enum which represents the memory
//! types available in GE Fanuc PLCs, and the [`AccessMode`] enum which selects
//! the granularity a read operates at. Each memory type / access mode
//! combination maps to a fixed one-byte segment selector on the wire.
//!
//! # Memory Types Overview
//!
//! | Type | Description | Word | Byte | Bit |
//! |------|-------------|:----:|:----:|:---:|
//! | %R | Register memory - 16-bit signed integers | ✓ | ✗ | ✗ |
//! | %AI | Analog inputs | ✓ | ✗ | ✗ |
//! | %AQ | Analog outputs | ✓ | ✗ | ✗ |
//! | %I | Discrete inputs | ✗ | ✓ | ✓ |
//! | %Q | Discrete outputs | ✗ | ✓ | ✓ |
//! | %T | Discrete temporaries (volatile) | ✗ | ✓ | ✓ |
//! | %M | Discrete internals (coils/flags) | ✗ | ✓ | ✓ |
//! | %SA, %SB, %SC, %S | System discrete memory | ✗ | ✓ | ✓ |
//! | %G | Genius global data | ✗ | ✓ | ✓ |
//!
//! # Minimum wire lengths
//!
//! The PLC rejects (or answers inconsistently to) requests below a
//! firmware-dependent floor, so the data length sent on the wire is
//! `max(count, minimum)` for the access mode: 4 units for word access,
//! 8 for byte access, 64 for bit access. Callers must trim decoded values
//! back to the requested count; the padding is never exposed.
//!
//! # Example
//!
//! ```
//! use ge_srtp::{AccessMode, MemoryType};
//!
//! assert_eq!(MemoryType::Register.selector(AccessMode::Word).unwrap(), 0x08);
//! assert!(MemoryType::Register.selector(AccessMode::Bit).is_err());
//! assert_eq!(AccessMode::Bit.wire_length(10), 64);
//! assert_eq!(MemoryType::DiscreteInput.to_string(), "%I");
//! ```

use crate::error::{Result, SrtpError};

/// Memory types available in GE Fanuc PLCs.
///
/// Register and analog memory is read word-by-word; discrete, system, and
/// global memory is read either as packed bytes or as individual bits.
/// Requesting an unsupported combination returns an error before anything
/// is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryType {
    /// %R - Register memory (16-bit signed integers).
    Register,
    /// %AI - Analog input memory.
    AnalogInput,
    /// %AQ - Analog output memory.
    AnalogOutput,
    /// %I - Discrete inputs.
    DiscreteInput,
    /// %Q - Discrete outputs.
    DiscreteOutput,
    /// %T - Discrete temporaries, volatile across power cycles.
    DiscreteTemp,
    /// %M - Discrete internals (coils/flags).
    DiscreteInternal,
    /// %SA - System A discrete memory.
    SystemA,
    /// %SB - System B discrete memory.
    SystemB,
    /// %SC - System C discrete memory.
    SystemC,
    /// %S - System S discrete memory.
    SystemS,
    /// %G - Genius global data.
    GeniusGlobal,
}

/// Access granularity of a memory read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// 16-bit word access.
    Word,
    /// 8-bit byte access.
    Byte,
    /// Single-bit access.
    Bit,
}

impl AccessMode {
    /// Minimum data length the PLC accepts for this access mode.
    pub fn min_length(self) -> u16 {
        match self {
            AccessMode::Word => 4,
            AccessMode::Byte => 8,
            AccessMode::Bit => 64,
        }
    }

    /// Effective data length to put on the wire for a requested count.
    ///
    /// # Example
    ///
    /// ```
    /// use ge_srtp::AccessMode;
    ///
    /// assert_eq!(AccessMode::Word.wire_length(1), 4);
    /// assert_eq!(AccessMode::Word.wire_length(100), 100);
    /// assert_eq!(AccessMode::Byte.wire_length(5), 8);
    /// assert_eq!(AccessMode::Bit.wire_length(10), 64);
    /// ```
    pub fn wire_length(self, count: u16) -> u16 {
        count.max(self.min_length())
    }
}

impl MemoryType {
    /// Returns the segment selector for this memory type and access mode.
    ///
    /// # Errors
    ///
    /// Returns `SrtpError::InvalidParameter` if the memory type does not
    /// support the access mode (word access on discrete memory, or bit/byte
    /// access on register and analog memory).
    pub fn selector(self, mode: AccessMode) -> Result<u8> {
        let selector = match mode {
            AccessMode::Word => match self {
                MemoryType::Register => 0x08,
                MemoryType::AnalogInput => 0x0A,
                MemoryType::AnalogOutput => 0x0C,
                _ => return Err(self.unsupported(mode)),
            },
            AccessMode::Byte => match self {
                MemoryType::DiscreteInput => 0x10,
                MemoryType::DiscreteOutput => 0x12,
                MemoryType::DiscreteTemp => 0x14,
                MemoryType::DiscreteInternal => 0x16,
                MemoryType::SystemA => 0x18,
                MemoryType::SystemB => 0x1A,
                MemoryType::SystemC => 0x1C,
                MemoryType::SystemS => 0x1E,
                MemoryType::GeniusGlobal => 0x38,
                _ => return Err(self.unsupported(mode)),
            },
            AccessMode::Bit => match self {
                MemoryType::DiscreteInput => 0x46,
                MemoryType::DiscreteOutput => 0x48,
                MemoryType::DiscreteTemp => 0x4A,
                MemoryType::DiscreteInternal => 0x4C,
                MemoryType::SystemA => 0x4E,
                MemoryType::SystemB => 0x50,
                MemoryType::SystemC => 0x52,
                MemoryType::SystemS => 0x54,
                MemoryType::GeniusGlobal => 0x56,
                _ => return Err(self.unsupported(mode)),
            },
        };
        Ok(selector)
    }

    /// Returns whether this memory type supports word access.
    ///
    /// # Example
    ///
    /// ```
    /// use ge_srtp::MemoryType;
    ///
    /// assert!(MemoryType::Register.supports_word_access());
    /// assert!(!MemoryType::DiscreteInput.supports_word_access());
    /// ```
    pub fn supports_word_access(self) -> bool {
        matches!(
            self,
            MemoryType::Register | MemoryType::AnalogInput | MemoryType::AnalogOutput
        )
    }

    /// Returns whether this memory type supports byte and bit access.
    pub fn supports_discrete_access(self) -> bool {
        !self.supports_word_access()
    }

    fn unsupported(self, mode: AccessMode) -> SrtpError {
        let mode_name = match mode {
            AccessMode::Word => "word",
            AccessMode::Byte => "byte",
            AccessMode::Bit => "bit",
        };
        SrtpError::invalid_parameter(
            "memory",
            format!("{self} does not support {mode_name} access"),
        )
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MemoryType::Register => "%R",
            MemoryType::AnalogInput => "%AI",
            MemoryType::AnalogOutput => "%AQ",
            MemoryType::DiscreteInput => "%I",
            MemoryType::DiscreteOutput => "%Q",
            MemoryType::DiscreteTemp => "%T",
            MemoryType::DiscreteInternal => "%M",
            MemoryType::SystemA => "%SA",
            MemoryType::SystemB => "%SB",
            MemoryType::SystemC => "%SC",
            MemoryType::SystemS => "%S",
            MemoryType::GeniusGlobal => "%G",
        };
        f.write_str(name)
    }
}
