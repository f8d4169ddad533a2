use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Host, Url};

/// TCP address the daemon binds for control connections.
///
/// Written as `tcp://host:port` or a bare `host:port`. Configuration files,
/// environment variables and flags all use that text form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct SocketEndpoint {
    host: String,
    port: u16,
}

impl SocketEndpoint {
    /// Builds an endpoint from a host name or address literal and a port.
    /// Port 0 asks the operating system for an ephemeral port.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address literal, without IPv6 brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.parse::<IpAddr>().is_ok_and(|addr| addr.is_ipv6()) {
            write!(formatter, "tcp://[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "tcp://{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let url = if trimmed.contains("://") {
            Url::parse(trimmed)?
        } else {
            Url::parse(&format!("tcp://{trimmed}"))?
        };
        if url.scheme() != "tcp" {
            return Err(SocketParseError::UnsupportedScheme(url.scheme().to_owned()));
        }
        if !matches!(url.path(), "" | "/") {
            return Err(SocketParseError::UnexpectedPath(input.to_owned()));
        }

        let host = match url.host() {
            Some(Host::Domain(name)) => name.to_owned(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(SocketParseError::MissingHost(input.to_owned())),
        };
        let port = url
            .port()
            .ok_or_else(|| SocketParseError::MissingPort(input.to_owned()))?;
        Ok(Self::tcp(host, port))
    }
}

impl TryFrom<String> for SocketEndpoint {
    type Error = SocketParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SocketEndpoint> for String {
    fn from(endpoint: SocketEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Errors encountered while parsing a [`SocketEndpoint`] from text.
#[derive(Debug, Error)]
pub enum SocketParseError {
    #[error("unsupported socket scheme '{0}', expected tcp")]
    UnsupportedScheme(String),
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Anything after `host:port`.
    #[error("unexpected path in '{0}'")]
    UnexpectedPath(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
