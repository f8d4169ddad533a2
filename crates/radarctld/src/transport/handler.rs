//! Connection handling abstractions for the control listener.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// A TCP connection accepted by the control listener.
#[derive(Debug)]
pub struct ConnectionStream {
    stream: TcpStream,
}

impl ConnectionStream {
    /// Wraps an accepted stream.
    #[must_use]
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Remote address, when the socket still knows it.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }

    /// Bounds each subsequent read; `None` blocks until data arrives.
    ///
    /// # Errors
    ///
    /// Returns the socket error when the timeout cannot be applied.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }

    /// Closes the write half so the peer observes end-of-stream.
    ///
    /// A peer that already hung up is not an error.
    ///
    /// # Errors
    ///
    /// Returns the underlying socket error for any other failure.
    pub fn shutdown_write(&self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Write) {
            Err(error) if error.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl From<TcpStream> for ConnectionStream {
    fn from(stream: TcpStream) -> Self {
        Self::new(stream)
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Handles accepted socket connections.
///
/// The listener calls `handle` on a dedicated thread per connection and drops
/// the stream afterwards.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}
