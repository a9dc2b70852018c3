//! # GE-SRTP Protocol Library
//!
//! A Rust library for reading memory from GE Fanuc PLCs using the SRTP
//! (Service Request Transport Protocol) over TCP port 18245.
//!
//! SRTP is a proprietary, undocumented protocol; this implementation follows
//! the reverse-engineered wire format: fixed 56-byte headers, little-endian
//! multi-byte fields, an all-zero initialization handshake, and a two-stage
//! response read whose payload length is declared inside the header.
//!
//! This is a **read-only** driver aimed at monitoring and forensic memory
//! acquisition. The protocol's write services exist but are intentionally
//! not implemented.
//!
//! ## Features
//!
//! - **Protocol-only** — no polling, schedulers, or application-level logic
//! - **Deterministic** — each read produces exactly 1 request and 1 response;
//!   no automatic retries, caching, or reconnection
//! - **Type-safe** — memory types and access modes as enums; unsupported
//!   combinations are rejected before touching the wire
//! - **No panics** — all errors returned as `Result<T, SrtpError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use ge_srtp::{Client, ClientConfig, MemoryType};
//!
//! fn main() -> ge_srtp::Result<()> {
//!     let mut plc = Client::new(ClientConfig::new("172.16.12.127"));
//!     plc.connect()?;
//!
//!     // Read %R100 (1 register)
//!     let values = plc.read_registers(100, 1)?;
//!     println!("%R100 = {}", values[0]);
//!
//!     // Read 10 analog inputs starting at %AI0
//!     let inputs = plc.read_analog_inputs(0, 10)?;
//!     println!("%AI0-9: {inputs:?}");
//!
//!     // Read 16 internal coils as bits
//!     let coils = plc.read_bits(MemoryType::DiscreteInternal, 0, 16)?;
//!     println!("%M0-15: {coils:?}");
//!
//!     plc.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! ## Memory Types
//!
//! | Type | Description | Access |
//! |------|-------------|--------|
//! | [`MemoryType::Register`] | %R - registers, 16-bit signed | word |
//! | [`MemoryType::AnalogInput`] | %AI - analog inputs | word |
//! | [`MemoryType::AnalogOutput`] | %AQ - analog outputs | word |
//! | [`MemoryType::DiscreteInput`] | %I - discrete inputs | byte, bit |
//! | [`MemoryType::DiscreteOutput`] | %Q - discrete outputs | byte, bit |
//! | [`MemoryType::DiscreteTemp`] | %T - temporaries (volatile) | byte, bit |
//! | [`MemoryType::DiscreteInternal`] | %M - internal coils/flags | byte, bit |
//! | [`MemoryType::SystemA`]..[`MemoryType::SystemS`] | %SA, %SB, %SC, %S - system memory | byte, bit |
//! | [`MemoryType::GeniusGlobal`] | %G - Genius global data | byte, bit |
//!
//! ## Diagnostic queries
//!
//! The PLC also answers a handful of status services whose payload layout is
//! device-dependent; they are returned as raw bytes:
//!
//! ```no_run
//! # use ge_srtp::{Client, ClientConfig};
//! # let mut plc = Client::new(ClientConfig::new("172.16.12.127"));
//! # plc.connect()?;
//! let status = plc.plc_status()?;
//! let controller = plc.controller_info()?;
//! let faults = plc.fault_table()?;
//! # Ok::<(), ge_srtp::SrtpError>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, SrtpError>`]. PLC-rejected requests
//! carry a typed fault category plus the raw error byte:
//!
//! ```no_run
//! use ge_srtp::{Client, ClientConfig, PlcFaultKind, SrtpError};
//!
//! let mut plc = Client::new(ClientConfig::new("172.16.12.127"));
//! plc.connect()?;
//!
//! match plc.read_registers(100, 10) {
//!     Ok(values) => println!("values: {values:?}"),
//!     Err(SrtpError::Timeout) => println!("communication timeout"),
//!     Err(SrtpError::Plc { kind: PlcFaultKind::RunMode, .. }) => {
//!         println!("operation requires the PLC to be stopped");
//!     }
//!     Err(SrtpError::Plc { kind, code }) => {
//!         println!("PLC fault: {kind} (0x{code:02X})");
//!     }
//!     Err(e) => println!("error: {e}"),
//! }
//! # Ok::<(), SrtpError>(())
//! ```
//!
//! ## Configuration
//!
//! ```
//! use ge_srtp::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("172.16.12.127")
//!     .with_port(18245)                       // default SRTP port
//!     .with_timeout(Duration::from_secs(2))   // default is 5s
//!     .with_slot(2);                          // CPU in rack slot 2
//! ```
//!
//! ## Concurrency
//!
//! SRTP is strictly half-duplex and non-pipelined: one request must be fully
//! answered (or time out) before the next is sent. Every I/O method takes
//! `&mut self`; callers needing concurrent access to one device must
//! serialize externally or open one connection per caller.
//!
//! ## Logging
//!
//! The crate emits records through the [`log`] facade (connects and
//! handshakes at `info`, frame traffic at `debug`) and never installs a
//! logger; that is the application's choice.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod client;
mod error;
pub mod frame;
mod memory;
mod transport;

// Public re-exports
pub use client::{Client, ClientConfig, MAX_WORDS_PER_READ};
pub use error::{PlcFaultKind, Result, SrtpError};
pub use frame::{Frame, HEADER_SIZE};
pub use memory::{AccessMode, MemoryType};
pub use transport::{
    ConnectionState, TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT, INIT_FRAME, INIT_OK,
};
