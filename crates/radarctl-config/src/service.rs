//! Resolves the well-known service name into a TCP port.
//!
//! Clients address the daemon by service name rather than by port number. The
//! name is looked up in a services database using the `/etc/services` layout:
//!
//! ```text
//! # name      port/protocol  aliases...
//! radarctl    54321/tcp      radar-control
//! ```

use std::fs;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::Config;

const TCP_PROTOCOL: &str = "tcp";

/// One `name port/protocol aliases...` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    name: String,
    port: u16,
    protocol: String,
    aliases: Vec<String>,
}

impl ServiceEntry {
    /// Canonical service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Port number.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Transport protocol, for example `tcp`.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns true when `name` is the canonical name or one of the aliases.
    /// Matching is case-sensitive.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    fn parse_line(line: &str) -> Option<Self> {
        let content = line.split('#').next().unwrap_or_default();
        let mut fields = content.split_whitespace();
        let name = fields.next()?;
        let (port, protocol) = fields.next()?.split_once('/')?;
        let port = port.parse().ok()?;
        Some(Self {
            name: name.to_owned(),
            port,
            protocol: protocol.to_ascii_lowercase(),
            aliases: fields.map(str::to_owned).collect(),
        })
    }
}

/// Parsed services database.
///
/// Lines that do not follow the `name port/protocol` layout are skipped, as
/// the system resolver does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceTable {
    entries: Vec<ServiceEntry>,
}

impl ServiceTable {
    /// Reads and parses a services database file.
    pub fn load(path: &Utf8Path) -> Result<Self, ServiceResolveError> {
        let contents = fs::read_to_string(path).map_err(|source| ServiceResolveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    /// Parses services database text.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        Self {
            entries: contents.lines().filter_map(ServiceEntry::parse_line).collect(),
        }
    }

    /// Returns the port of the first entry answering to `name` over `protocol`.
    #[must_use]
    pub fn lookup(&self, name: &str, protocol: &str) -> Option<u16> {
        self.entries
            .iter()
            .find(|entry| entry.protocol.eq_ignore_ascii_case(protocol) && entry.answers_to(name))
            .map(ServiceEntry::port)
    }

    /// Number of parsed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for ServiceTable {
    type Err = std::convert::Infallible;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(contents))
    }
}

/// Errors raised while resolving the service port.
#[derive(Debug, Error)]
pub enum ServiceResolveError {
    /// The services database could not be read and no fallback port is set.
    #[error("failed to read services database '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The service is not listed and no fallback port is set.
    #[error("service '{service}' is not listed in '{path}' for tcp")]
    Unknown { service: String, path: Utf8PathBuf },
}

/// Resolves the configured service name into a TCP port.
///
/// A numeric service name is used as the port directly. Otherwise the name is
/// looked up in the configured services database; when the database cannot be
/// read or does not list the service, the configured fallback port is used if
/// present.
pub fn resolve_service_port(config: &Config) -> Result<u16, ServiceResolveError> {
    let service = config.service_name().trim();
    if let Ok(port) = service.parse::<u16>() {
        return Ok(port);
    }

    let path = config.services_path();
    let found = match ServiceTable::load(path) {
        Ok(table) => table.lookup(service, TCP_PROTOCOL),
        Err(error) => match config.fallback_port() {
            Some(_) => None,
            None => return Err(error),
        },
    };

    found
        .or_else(|| config.fallback_port())
        .ok_or_else(|| ServiceResolveError::Unknown {
            service: service.to_owned(),
            path: path.to_path_buf(),
        })
}

/// Accepts the service name as text or as a bare port number.
///
/// Environment layers coerce `RADARCTL_SERVICE_NAME=54400` into an integer
/// before it reaches `Config`.
pub(crate) fn deserialize_service_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ServiceName {
        Name(String),
        Port(u64),
    }

    Ok(match ServiceName::deserialize(deserializer)? {
        ServiceName::Name(name) => name,
        ServiceName::Port(port) => port.to_string(),
    })
}
