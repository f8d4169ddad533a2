//! Reads the single command token a client sends after connecting.
//!
//! The token ends at the first LF, CR, or NUL byte. Clients may also send the
//! bare token without any delimiter and then wait for the reply, so once part
//! of a token has arrived the remaining reads are bounded by
//! [`REQUEST_GRACE`]; when that passes quietly the bytes received so far are
//! the whole request.

use std::io::{self, Cursor, Read};
use std::time::Duration;

use crate::transport::ConnectionStream;

use super::errors::DispatchError;

/// Maximum size of a command token in bytes.
pub const MAX_COMMAND_BYTES: usize = 1024;

/// How long a session waits for the rest of an undelimited token.
pub const REQUEST_GRACE: Duration = Duration::from_millis(200);

/// Byte stream a session reads its command token from.
pub trait CommandSource: Read {
    /// Bounds further reads once part of an undelimited token has arrived.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the bound cannot be applied.
    fn bound_remaining_reads(&mut self, grace: Duration) -> io::Result<()>;
}

impl CommandSource for ConnectionStream {
    fn bound_remaining_reads(&mut self, grace: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(grace))
    }
}

/// In-memory requests end at end-of-buffer instead.
impl<T: AsRef<[u8]>> CommandSource for Cursor<T> {
    fn bound_remaining_reads(&mut self, _grace: Duration) -> io::Result<()> {
        Ok(())
    }
}

/// Reads and validates one command token.
///
/// Bytes are accumulated until a delimiter follows the token, the peer stops
/// sending, or the request outgrows [`MAX_COMMAND_BYTES`]. Returns `Ok(None)`
/// when the peer closes the connection without sending anything.
///
/// # Errors
///
/// Returns [`DispatchError::EmptyRequest`] when the peer sent only
/// whitespace or delimiters, [`DispatchError::RequestTooLarge`] when the token
/// exceeds [`MAX_COMMAND_BYTES`], [`DispatchError::MalformedRequest`] when the
/// token is not UTF-8, and [`DispatchError::Io`] when the read fails.
pub(crate) fn read_command<R: CommandSource + ?Sized>(
    stream: &mut R,
) -> Result<Option<String>, DispatchError> {
    let request = read_request(stream)?;
    if request.is_empty() {
        return Ok(None);
    }

    let token = extract_token(&request);
    enforce_limit(token.len())?;
    if token.is_empty() {
        return Err(DispatchError::EmptyRequest);
    }

    let token = std::str::from_utf8(token)
        .map_err(|error| DispatchError::malformed(format!("command is not UTF-8: {error}")))?;
    Ok(Some(token.to_owned()))
}

fn read_request<R: CommandSource + ?Sized>(stream: &mut R) -> io::Result<Vec<u8>> {
    // One spare byte so an oversized token without a delimiter is detectable.
    let capacity = MAX_COMMAND_BYTES + 1;
    let mut request = Vec::with_capacity(64);
    let mut chunk = [0_u8; MAX_COMMAND_BYTES + 1];
    let mut bounded = false;

    while request.len() < capacity {
        let room = capacity - request.len();
        match read_with_retry(stream, &mut chunk[..room]) {
            Ok(0) => break,
            Ok(read) => request.extend_from_slice(&chunk[..read]),
            Err(error) if !request.is_empty() && is_quiet_peer(&error) => break,
            Err(error) => return Err(error),
        }
        if token_is_terminated(&request) {
            break;
        }
        if !bounded {
            stream.bound_remaining_reads(REQUEST_GRACE)?;
            bounded = true;
        }
    }
    Ok(request)
}

/// Strips leading padding, cuts at the first delimiter, and trims trailing
/// whitespace.
fn extract_token(bytes: &[u8]) -> &[u8] {
    let rest = skip_padding(bytes);
    let end = rest
        .iter()
        .position(|byte| is_delimiter(*byte))
        .unwrap_or(rest.len());
    rest[..end].trim_ascii_end()
}

/// True once a delimiter follows at least one token byte.
fn token_is_terminated(bytes: &[u8]) -> bool {
    skip_padding(bytes).iter().any(|byte| is_delimiter(*byte))
}

fn skip_padding(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|byte| !is_padding(*byte))
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'\n' | b'\r' | b'\0')
}

fn is_padding(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'\0'
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_quiet_peer(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn enforce_limit(size: usize) -> Result<(), DispatchError> {
    if size > MAX_COMMAND_BYTES {
        return Err(DispatchError::request_too_large(size, MAX_COMMAND_BYTES));
    }
    Ok(())
}
