//! Connection and exchange helpers for the probe.
//!
//! The probe resolves the host into every candidate address, connects to the
//! first one that accepts, writes the command token once, and then copies the
//! reply until the service closes the connection.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::AppError;

/// Size of each read while copying the reply.
pub(crate) const RESPONSE_CHUNK_BYTES: usize = 512;

/// Formats `host:port`, bracketing IPv6 literals.
pub(crate) fn endpoint_label(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Resolves `host` and `port` into candidate addresses in resolver order.
pub(crate) fn resolve_candidates(host: &str, port: u16) -> Result<Vec<SocketAddr>, AppError> {
    let endpoint = endpoint_label(host, port);
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| AppError::Resolve {
            endpoint: endpoint.clone(),
            source,
        })?
        .collect();
    if candidates.is_empty() {
        return Err(AppError::NoCandidates { endpoint });
    }
    Ok(candidates)
}

/// Connects to the first candidate that accepts.
///
/// A zero `timeout` falls back to a blocking connect.
pub(crate) fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, AppError> {
    let candidates = resolve_candidates(host, port)?;
    connect_any(&endpoint_label(host, port), &candidates, timeout)
}

fn connect_any(
    endpoint: &str,
    candidates: &[SocketAddr],
    timeout: Duration,
) -> Result<TcpStream, AppError> {
    let mut last_error = None;
    for address in candidates {
        let attempt = if timeout.is_zero() {
            TcpStream::connect(address)
        } else {
            TcpStream::connect_timeout(address, timeout)
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(error) => last_error = Some(error),
        }
    }

    match last_error {
        Some(source) => Err(AppError::Connect {
            endpoint: endpoint.to_owned(),
            source,
        }),
        None => Err(AppError::NoCandidates {
            endpoint: endpoint.to_owned(),
        }),
    }
}

/// Sends `command` and copies every reply byte to `output` until end-of-stream.
///
/// Returns the number of reply bytes forwarded.
pub(crate) fn exchange<S, W>(stream: &mut S, command: &str, output: &mut W) -> Result<u64, AppError>
where
    S: Read + Write + ?Sized,
    W: Write + ?Sized,
{
    stream
        .write_all(command.as_bytes())
        .and_then(|()| stream.flush())
        .map_err(AppError::SendRequest)?;

    let mut buffer = [0_u8; RESPONSE_CHUNK_BYTES];
    let mut forwarded = 0_u64;
    loop {
        let read = match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(AppError::ReadResponse(error)),
        };
        output
            .write_all(&buffer[..read])
            .map_err(AppError::ForwardResponse)?;
        forwarded += read as u64;
    }

    output.flush().map_err(AppError::ForwardResponse)?;
    Ok(forwarded)
}
