//! High-level SRTP client for reading GE Fanuc PLC memory.
//!
//! This module provides the [`Client`] struct, the primary interface of the
//! crate. The client owns one TCP session and drives complete
//! request/response exchanges:
//!
//! - wrapping sequence number assignment (0-255)
//! - request construction via the frame codec and the segment selector table
//! - transmit / two-stage receive via the transport
//! - sequence correlation and PLC fault mapping
//! - decoding and trimming of the returned values
//!
//! # Example
//!
//! ```no_run
//! use ge_srtp::{Client, ClientConfig, MemoryType};
//!
//! fn main() -> ge_srtp::Result<()> {
//!     let mut plc = Client::new(ClientConfig::new("172.16.12.127"));
//!     plc.connect()?;
//!
//!     // Read %R100
//!     let values = plc.read_registers(100, 1)?;
//!     println!("%R100 = {}", values[0]);
//!
//!     // Read 10 discrete inputs as bits
//!     let inputs = plc.read_discrete_inputs(0, 10)?;
//!     println!("%I0-9: {inputs:?}");
//!
//!     plc.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Request serialization
//!
//! The protocol is strictly half-duplex: one request must be fully answered
//! (or time out) before the next is sent. Every I/O method therefore takes
//! `&mut self`; callers needing concurrent access to one device must
//! serialize externally or open one client per caller.
//!
//! # No automatic retry
//!
//! Every fault is surfaced synchronously. After a timeout or I/O error the
//! session is `Failed` and must be explicitly reconnected with
//! [`Client::connect`].

use std::time::Duration;

use crate::error::{Result, SrtpError};
use crate::frame::{
    self, Frame, SVC_CONTROLLER_TYPE_AND_ID, SVC_FAULT_TABLE, SVC_PLC_DATETIME,
    SVC_PLC_SHORT_STATUS, SVC_PROGRAM_NAMES, SVC_READ_SYSTEM_MEMORY,
};
use crate::memory::{AccessMode, MemoryType};
use crate::transport::{ConnectionState, TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT};

/// Maximum number of words readable in a single request.
pub const MAX_WORDS_PER_READ: u16 = 125;

/// Configuration for creating an SRTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// PLC IP address or hostname.
    pub host: String,
    /// TCP port (default 18245).
    pub port: u16,
    /// Timeout applied to every blocking operation.
    pub timeout: Duration,
    /// CPU slot number the mailbox destination addresses (default 1).
    pub slot: u8,
    /// Optional secondary initialization frame for firmware that expects a
    /// second handshake packet.
    pub secondary_init: Option<Vec<u8>>,
}

impl ClientConfig {
    /// Creates a configuration with default port, timeout, and CPU slot.
    ///
    /// # Example
    ///
    /// ```
    /// use ge_srtp::ClientConfig;
    ///
    /// let config = ClientConfig::new("172.16.12.127");
    /// assert_eq!(config.port, 18245);
    /// ```
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            slot: 1,
            secondary_init: None,
        }
    }

    /// Sets a custom TCP port (default is 18245).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a custom timeout (default is 5 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use ge_srtp::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("172.16.12.127")
    ///     .with_timeout(Duration::from_secs(2));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the CPU slot number (default is 1, use 2 if the CPU sits in
    /// slot 2 of the rack).
    pub fn with_slot(mut self, slot: u8) -> Self {
        self.slot = slot;
        self
    }

    /// Configures a secondary initialization frame sent after the first
    /// handshake step. Needed by some firmware revisions; the byte pattern
    /// is model-specific.
    pub fn with_secondary_init(mut self, frame: Vec<u8>) -> Self {
        self.secondary_init = Some(frame);
        self
    }
}

/// SRTP client for reading memory from GE Fanuc PLCs.
///
/// All operations are read-only; the protocol's write services are
/// intentionally not implemented. Each read produces exactly one request and
/// one response, with no retries, caching, or reconnection.
///
/// The connection is released when the client goes out of scope.
pub struct Client {
    transport: TcpTransport,
    slot: u8,
    sequence: u8,
}

impl Client {
    /// Creates a client from a configuration. No I/O happens until
    /// [`connect`](Self::connect).
    pub fn new(config: ClientConfig) -> Self {
        let mut transport = TcpTransport::new(config.host, config.port, config.timeout);
        if let Some(frame) = config.secondary_init {
            transport = transport.with_secondary_init(frame);
        }

        Self {
            transport,
            slot: config.slot,
            sequence: 0,
        }
    }

    /// Connects to the PLC and performs the initialization handshake.
    ///
    /// Resets the sequence counter; a reconnect always starts a fresh
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `SrtpError::Connection`, `SrtpError::Timeout`, or
    /// `SrtpError::Initialization` if the session cannot be established.
    pub fn connect(&mut self) -> Result<()> {
        self.transport.connect()?;
        self.sequence = 0;
        Ok(())
    }

    /// Disconnects from the PLC. Idempotent.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    /// Returns whether the session is connected and initialized.
    pub fn is_connected(&self) -> bool {
        self.transport.is_alive()
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Returns the next sequence number, wrapping at 255.
    fn next_sequence(&mut self) -> u8 {
        let seq = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        seq
    }

    /// Drives one complete request/response exchange.
    fn transact(
        &mut self,
        service_code: u8,
        segment_selector: u8,
        data_offset: u16,
        data_length: u16,
    ) -> Result<Frame> {
        let seq = self.next_sequence();
        let request = frame::build_request(
            seq,
            service_code,
            segment_selector,
            data_offset,
            data_length,
            self.slot,
            &[],
        );

        self.transport.send_frame(&request)?;
        let response = self.transport.receive_frame()?;

        let parsed = Frame::parse_response(&response)?;
        parsed.check_sequence(seq)?;
        Ok(parsed)
    }

    /// Memory read shared by every region: selector lookup, minimum-length
    /// padding, one exchange.
    fn read_region(
        &mut self,
        memory: MemoryType,
        mode: AccessMode,
        address: u16,
        count: u16,
    ) -> Result<Frame> {
        if count == 0 {
            return Err(SrtpError::invalid_parameter(
                "count",
                "must be greater than 0",
            ));
        }

        let selector = memory.selector(mode)?;
        let data_length = mode.wire_length(count);

        log::debug!("reading {memory}{address}, count={count}, wire length={data_length}");

        self.transact(SVC_READ_SYSTEM_MEMORY, selector, address, data_length)
    }

    /// Reads words (16-bit signed integers) from a word-capable memory type.
    ///
    /// The device pads short reads up to its minimum length; the result is
    /// always trimmed back to exactly `count` values.
    ///
    /// # Arguments
    ///
    /// * `memory` - `Register`, `AnalogInput`, or `AnalogOutput`
    /// * `address` - 0-based starting address
    /// * `count` - Number of words to read (1-125)
    ///
    /// # Errors
    ///
    /// Returns an error if count is out of range, the memory type does not
    /// support word access, communication fails, or the PLC rejects the
    /// request.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ge_srtp::{Client, ClientConfig, MemoryType};
    ///
    /// let mut plc = Client::new(ClientConfig::new("172.16.12.127"));
    /// plc.connect()?;
    /// let values = plc.read_words(MemoryType::Register, 100, 10)?;
    /// # Ok::<(), ge_srtp::SrtpError>(())
    /// ```
    pub fn read_words(
        &mut self,
        memory: MemoryType,
        address: u16,
        count: u16,
    ) -> Result<Vec<i16>> {
        if count > MAX_WORDS_PER_READ {
            return Err(SrtpError::invalid_parameter(
                "count",
                format!("must not exceed {MAX_WORDS_PER_READ}"),
            ));
        }

        let response = self.read_region(memory, AccessMode::Word, address, count)?;
        let mut values = response.to_words()?;
        values.truncate(count as usize);
        Ok(values)
    }

    /// Reads packed bytes from a discrete memory type.
    ///
    /// # Arguments
    ///
    /// * `memory` - Any discrete, system, or global memory type
    /// * `address` - 0-based starting address
    /// * `count` - Number of bytes to read
    pub fn read_bytes(&mut self, memory: MemoryType, address: u16, count: u16) -> Result<Vec<u8>> {
        let response = self.read_region(memory, AccessMode::Byte, address, count)?;
        let mut values = response.to_byte_values();
        values.truncate(count as usize);
        Ok(values)
    }

    /// Reads individual bits from a discrete memory type.
    ///
    /// # Arguments
    ///
    /// * `memory` - Any discrete, system, or global memory type
    /// * `address` - 0-based starting bit address
    /// * `count` - Number of bits to read
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ge_srtp::{Client, ClientConfig, MemoryType};
    ///
    /// let mut plc = Client::new(ClientConfig::new("172.16.12.127"));
    /// plc.connect()?;
    /// let coils = plc.read_bits(MemoryType::DiscreteInternal, 0, 16)?;
    /// # Ok::<(), ge_srtp::SrtpError>(())
    /// ```
    pub fn read_bits(&mut self, memory: MemoryType, address: u16, count: u16) -> Result<Vec<bool>> {
        let response = self.read_region(memory, AccessMode::Bit, address, count)?;
        Ok(response.to_bits(count as usize))
    }

    /// Reads register values (%R memory).
    ///
    /// Registers are 16-bit signed integers used for calculations, set
    /// points, and general data storage.
    pub fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<i16>> {
        self.read_words(MemoryType::Register, address, count)
    }

    /// Reads analog input values (%AI memory).
    pub fn read_analog_inputs(&mut self, address: u16, count: u16) -> Result<Vec<i16>> {
        self.read_words(MemoryType::AnalogInput, address, count)
    }

    /// Reads analog output values (%AQ memory).
    pub fn read_analog_outputs(&mut self, address: u16, count: u16) -> Result<Vec<i16>> {
        self.read_words(MemoryType::AnalogOutput, address, count)
    }

    /// Reads discrete input bits (%I memory).
    pub fn read_discrete_inputs(&mut self, address: u16, count: u16) -> Result<Vec<bool>> {
        self.read_bits(MemoryType::DiscreteInput, address, count)
    }

    /// Reads discrete output bits (%Q memory).
    pub fn read_discrete_outputs(&mut self, address: u16, count: u16) -> Result<Vec<bool>> {
        self.read_bits(MemoryType::DiscreteOutput, address, count)
    }

    /// Diagnostic query shared plumbing: empty addressing fields, raw
    /// payload back.
    fn diagnostic(&mut self, service_code: u8) -> Result<Vec<u8>> {
        let response = self.transact(service_code, 0, 0, 0)?;
        Ok(response.payload)
    }

    /// Queries the PLC short status.
    ///
    /// The payload format is device-dependent and returned un-interpreted.
    /// Some models carry the status in the header instead, in which case the
    /// returned payload is empty.
    pub fn plc_status(&mut self) -> Result<Vec<u8>> {
        self.diagnostic(SVC_PLC_SHORT_STATUS)
    }

    /// Queries the controller type and ID. Raw device-dependent payload.
    pub fn controller_info(&mut self) -> Result<Vec<u8>> {
        self.diagnostic(SVC_CONTROLLER_TYPE_AND_ID)
    }

    /// Queries the control program names. Raw device-dependent payload.
    pub fn program_names(&mut self) -> Result<Vec<u8>> {
        self.diagnostic(SVC_PROGRAM_NAMES)
    }

    /// Queries the PLC date and time. Raw device-dependent payload.
    pub fn plc_datetime(&mut self) -> Result<Vec<u8>> {
        self.diagnostic(SVC_PLC_DATETIME)
    }

    /// Queries the PLC fault table. Raw device-dependent payload.
    pub fn fault_table(&mut self) -> Result<Vec<u8>> {
        self.diagnostic(SVC_FAULT_TABLE)
    }
}

impl Drop for Client {
    /// Releases the connection on every exit path.
    fn drop(&mut self) {
        self.transport.disconnect();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("slot", &self.slot)
            .field("sequence", &self.sequence)
            .finish()
    }
}
