//! TCP transport layer for SRTP communication.
//!
//! This module provides the [`TcpTransport`] struct which owns one TCP
//! session to a PLC: connect, the mandatory initialization handshake, frame
//! send, two-stage frame receive, and disconnect. It knows about sockets and
//! frame boundaries, not about what the frames mean.
//!
//! # Session states
//!
//! A transport moves through [`ConnectionState`]s: `Disconnected` until
//! [`TcpTransport::connect`] opens the socket (`TcpConnected`), then
//! `Initialized` once the handshake response carries the expected sentinel
//! byte. Any I/O error, timeout, or invalid handshake response moves the
//! session to `Failed`, which is terminal until an explicit reconnect.
//!
//! # Framing
//!
//! SRTP never prefixes a message with its total length. The receive path
//! reads exactly 56 header bytes, then inspects byte 4 of the header for a
//! payload-length indicator and, if non-zero, performs a second exact read
//! of that many bytes. A single `read` call must never be assumed to return
//! the full message.
//!
//! # Constants
//!
//! - [`DEFAULT_PORT`] - Default SRTP TCP port (18245)
//! - [`DEFAULT_TIMEOUT`] - Default timeout (5 seconds)
//! - [`INIT_FRAME`] - The all-zero 56-byte initialization frame
//! - [`INIT_OK`] - Expected first byte of the handshake response (0x01)

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, SrtpError};
use crate::frame::HEADER_SIZE;

/// Default SRTP TCP port.
pub const DEFAULT_PORT: u16 = 18245;

/// Default timeout for blocking operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialization frame sent immediately after the TCP connect.
pub const INIT_FRAME: [u8; HEADER_SIZE] = [0u8; HEADER_SIZE];

/// Expected first byte of the handshake response.
pub const INIT_OK: u8 = 0x01;

/// Lifecycle state of an SRTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket open.
    Disconnected,
    /// Socket open, handshake not yet completed.
    TcpConnected,
    /// Handshake completed; service requests are accepted.
    Initialized,
    /// An I/O error, timeout, or failed handshake occurred. Terminal until
    /// an explicit reconnect.
    Failed,
}

/// TCP transport for SRTP communication.
///
/// Synchronous blocking I/O with a single configurable timeout applied to
/// every blocking operation. Not safe for concurrent use; callers needing
/// concurrency must serialize requests externally.
pub struct TcpTransport {
    host: String,
    port: u16,
    timeout: Duration,
    secondary_init: Option<Vec<u8>>,
    stream: Option<TcpStream>,
    state: ConnectionState,
}

impl TcpTransport {
    /// Creates a transport for the given PLC address. No I/O happens until
    /// [`connect`](Self::connect) is called.
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            secondary_init: None,
            stream: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Configures a secondary initialization frame.
    ///
    /// Some firmware revisions expect a second initialization packet after
    /// the validated first step; its byte pattern varies by model. When set,
    /// the transport transmits it during the handshake and consumes one
    /// response frame without interpreting it.
    pub fn with_secondary_init(mut self, frame: Vec<u8>) -> Self {
        self.secondary_init = Some(frame);
        self
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns whether the session is connected and initialized.
    pub fn is_alive(&self) -> bool {
        self.state == ConnectionState::Initialized
    }

    /// Opens the TCP connection and performs the initialization handshake.
    ///
    /// The handshake sends 56 zero bytes and requires the first byte of the
    /// response to equal [`INIT_OK`]. Connecting an already-initialized
    /// session is a no-op.
    ///
    /// # Errors
    ///
    /// - `SrtpError::Connection` if the socket cannot be opened.
    /// - `SrtpError::Timeout` if the connect or any handshake read exceeds
    ///   the timeout.
    /// - `SrtpError::Initialization` if the handshake response is invalid;
    ///   the session is torn down.
    pub fn connect(&mut self) -> Result<()> {
        if self.state == ConnectionState::Initialized {
            log::warn!("already connected to {}:{}", self.host, self.port);
            return Ok(());
        }

        let addr = self.resolve()?;
        log::info!("connecting to PLC at {addr}...");

        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| {
            self.state = ConnectionState::Failed;
            match e.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SrtpError::Timeout,
                _ => SrtpError::connection(format!("failed to connect to {addr}: {e}")),
            }
        })?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        self.stream = Some(stream);
        self.state = ConnectionState::TcpConnected;
        log::info!("TCP connection established");

        if let Err(e) = self.perform_initialization() {
            self.teardown();
            self.state = ConnectionState::Failed;
            return Err(e);
        }

        self.state = ConnectionState::Initialized;
        log::info!("initialization handshake complete");
        Ok(())
    }

    /// Sends the initialization frame(s) and validates the PLC's answer.
    fn perform_initialization(&mut self) -> Result<()> {
        log::debug!("sending initialization frame");
        self.write_raw(&INIT_FRAME)?;

        let response = self.receive_raw()?;
        if response.is_empty() {
            return Err(SrtpError::initialization(
                "no response to initialization frame",
            ));
        }
        if response[0] != INIT_OK {
            return Err(SrtpError::initialization(format!(
                "invalid handshake response: expected 0x{INIT_OK:02X}, got 0x{:02X}",
                response[0]
            )));
        }

        // Extension point for firmware that wants a second initialization
        // packet. The response is consumed but not validated.
        if let Some(frame) = self.secondary_init.clone() {
            log::debug!("sending secondary initialization frame");
            self.write_raw(&frame)?;
            let _ = self.receive_raw()?;
        }

        Ok(())
    }

    /// Sends a complete frame to the PLC.
    ///
    /// Short writes are resubmitted until the frame is fully transmitted.
    ///
    /// # Errors
    ///
    /// Returns `SrtpError::Connection` if the session is not initialized,
    /// `SrtpError::Timeout` on deadline expiry.
    pub fn send_frame(&mut self, data: &[u8]) -> Result<()> {
        if self.state != ConnectionState::Initialized {
            return Err(SrtpError::connection("connection not initialized"));
        }

        log::debug!("sending {} bytes to PLC", data.len());
        self.write_raw(data)
    }

    /// Receives one complete frame from the PLC.
    ///
    /// Reads exactly 56 header bytes, then, if byte 4 of the header is
    /// non-zero, exactly that many payload bytes. Returns header and payload
    /// concatenated.
    ///
    /// # Errors
    ///
    /// Returns `SrtpError::Connection` if the session holds no socket or the
    /// stream closes mid-frame, `SrtpError::Timeout` on deadline expiry.
    pub fn receive_frame(&mut self) -> Result<Vec<u8>> {
        if self.stream.is_none() {
            return Err(SrtpError::connection("not connected to PLC"));
        }
        self.receive_raw()
    }

    fn receive_raw(&mut self) -> Result<Vec<u8>> {
        let mut header = [0u8; HEADER_SIZE];
        self.read_exact(&mut header)?;

        let payload_length = header[4] as usize;
        let mut data = header.to_vec();

        if payload_length > 0 {
            log::debug!("expecting {payload_length} bytes of payload");
            let mut payload = vec![0u8; payload_length];
            self.read_exact(&mut payload)?;
            data.extend_from_slice(&payload);
        }

        log::debug!("received frame: {} bytes", data.len());
        Ok(data)
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SrtpError::connection("not connected to PLC"))?;

        match stream.write_all(data).and_then(|()| stream.flush()) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SrtpError::connection("not connected to PLC"))?;

        match stream.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Marks the session failed and maps the I/O error to the taxonomy.
    fn fail(&mut self, e: io::Error) -> SrtpError {
        self.state = ConnectionState::Failed;
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SrtpError::Timeout,
            io::ErrorKind::UnexpectedEof => SrtpError::connection("connection closed by PLC"),
            _ => SrtpError::Io(e),
        }
    }

    fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// Closes the connection. Idempotent; always leaves the session in
    /// `Disconnected`.
    pub fn disconnect(&mut self) {
        if self.stream.is_some() {
            self.teardown();
            log::info!("disconnected from {}:{}", self.host, self.port);
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Updates the timeout for subsequent blocking operations.
    ///
    /// Applies to the open socket immediately if one exists.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        if let Some(stream) = &self.stream {
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
        }
        Ok(())
    }

    fn resolve(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                SrtpError::connection(format!("could not resolve {}:{}", self.host, self.port))
            })
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Binds a loopback listener and runs `serve` on the first accepted
    /// connection.
    fn spawn_plc<F>(serve: F) -> (SocketAddr, JoinHandle<()>)
    where
        F: FnOnce(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                serve(stream);
            }
        });
        (addr, handle)
    }

    /// Consumes the client's init frame and answers with a valid handshake
    /// response.
    fn accept_handshake(stream: &mut TcpStream) {
        let mut init = [0u8; HEADER_SIZE];
        stream.read_exact(&mut init).unwrap();
        assert_eq!(init, INIT_FRAME);

        let mut response = [0u8; HEADER_SIZE];
        response[0] = INIT_OK;
        stream.write_all(&response).unwrap();
    }

    fn transport_for(addr: SocketAddr) -> TcpTransport {
        TcpTransport::new(addr.ip().to_string(), addr.port(), Duration::from_secs(1))
    }

    #[test]
    fn test_state_starts_disconnected() {
        let transport = TcpTransport::new("127.0.0.1", DEFAULT_PORT, DEFAULT_TIMEOUT);
        assert_eq!(transport.state(), ConnectionState::Disconnected);
        assert!(!transport.is_alive());
    }

    #[test]
    fn test_connect_and_handshake() {
        let (addr, handle) = spawn_plc(|mut stream| {
            accept_handshake(&mut stream);
        });

        let mut transport = transport_for(addr);
        transport.connect().unwrap();
        assert_eq!(transport.state(), ConnectionState::Initialized);
        assert!(transport.is_alive());

        transport.disconnect();
        assert_eq!(transport.state(), ConnectionState::Disconnected);
        handle.join().unwrap();
    }

    #[test]
    fn test_handshake_rejects_bad_sentinel() {
        let (addr, handle) = spawn_plc(|mut stream| {
            let mut init = [0u8; HEADER_SIZE];
            stream.read_exact(&mut init).unwrap();

            let mut response = [0u8; HEADER_SIZE];
            response[0] = 0x55;
            stream.write_all(&response).unwrap();
        });

        let mut transport = transport_for(addr);
        let result = transport.connect();
        assert!(matches!(result, Err(SrtpError::Initialization { .. })));
        assert_eq!(transport.state(), ConnectionState::Failed);
        handle.join().unwrap();
    }

    #[test]
    fn test_secondary_init_frame_is_sent() {
        let (addr, handle) = spawn_plc(|mut stream| {
            accept_handshake(&mut stream);

            // Expect the configured secondary frame, answer with anything.
            let mut second = [0u8; HEADER_SIZE];
            stream.read_exact(&mut second).unwrap();
            assert_eq!(second[0], 0xAB);

            let response = [0u8; HEADER_SIZE];
            stream.write_all(&response).unwrap();
        });

        let mut frame = vec![0u8; HEADER_SIZE];
        frame[0] = 0xAB;
        let mut transport = transport_for(addr).with_secondary_init(frame);
        transport.connect().unwrap();
        assert_eq!(transport.state(), ConnectionState::Initialized);
        handle.join().unwrap();
    }

    #[test]
    fn test_receive_frame_two_stage() {
        let (addr, handle) = spawn_plc(|mut stream| {
            accept_handshake(&mut stream);

            // Header announcing 4 payload bytes, payload in a second write.
            let mut header = [0u8; HEADER_SIZE];
            header[0] = 0x03;
            header[4] = 4;
            stream.write_all(&header).unwrap();
            stream.write_all(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        });

        let mut transport = transport_for(addr);
        transport.connect().unwrap();

        let data = transport.receive_frame().unwrap();
        assert_eq!(data.len(), HEADER_SIZE + 4);
        assert_eq!(&data[HEADER_SIZE..], &[0xDE, 0xAD, 0xBE, 0xEF]);
        handle.join().unwrap();
    }

    #[test]
    fn test_receive_frame_without_payload() {
        let (addr, handle) = spawn_plc(|mut stream| {
            accept_handshake(&mut stream);

            let mut header = [0u8; HEADER_SIZE];
            header[0] = 0x03;
            stream.write_all(&header).unwrap();
        });

        let mut transport = transport_for(addr);
        transport.connect().unwrap();

        let data = transport.receive_frame().unwrap();
        assert_eq!(data.len(), HEADER_SIZE);
        handle.join().unwrap();
    }

    #[test]
    fn test_receive_frame_connection_closed() {
        let (addr, handle) = spawn_plc(|mut stream| {
            accept_handshake(&mut stream);
            // Close without sending a frame.
        });

        let mut transport = transport_for(addr);
        transport.connect().unwrap();

        let result = transport.receive_frame();
        assert!(matches!(result, Err(SrtpError::Connection { .. })));
        assert_eq!(transport.state(), ConnectionState::Failed);
        handle.join().unwrap();
    }

    #[test]
    fn test_receive_frame_timeout_marks_failed() {
        let (addr, handle) = spawn_plc(|mut stream| {
            accept_handshake(&mut stream);
            // Keep the socket open without answering.
            thread::sleep(Duration::from_millis(500));
        });

        let mut transport =
            TcpTransport::new(addr.ip().to_string(), addr.port(), Duration::from_millis(50));
        transport.connect().unwrap();

        let result = transport.receive_frame();
        assert!(matches!(result, Err(SrtpError::Timeout)));
        assert_eq!(transport.state(), ConnectionState::Failed);
        handle.join().unwrap();
    }

    #[test]
    fn test_send_frame_requires_initialization() {
        let mut transport = TcpTransport::new("127.0.0.1", DEFAULT_PORT, DEFAULT_TIMEOUT);
        let result = transport.send_frame(&[0u8; HEADER_SIZE]);
        assert!(matches!(result, Err(SrtpError::Connection { .. })));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut transport = TcpTransport::new("127.0.0.1", DEFAULT_PORT, DEFAULT_TIMEOUT);
        transport.disconnect();
        transport.disconnect();
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_PORT, 18245);
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(5));
        assert_eq!(INIT_FRAME, [0u8; 56]);
        assert_eq!(INIT_OK, 0x01);
    }
}
