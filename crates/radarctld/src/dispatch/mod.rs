//! Command registry and per-connection session dispatch.
//!
//! ## Protocol
//!
//! A client connects, sends one command token, and reads until the service
//! closes the connection:
//!
//! ```text
//! client: health\n
//! server: ok\n
//! server: <close>
//! ```
//!
//! The delimiter is optional; LF, CR, and NUL all end the token. Without one,
//! the token is complete once the client has been quiet for
//! [`REQUEST_GRACE`]. The reply is
//! an unframed byte stream. Requests that cannot be dispatched receive one
//! line of the form `error: <reason>` before the connection closes:
//!
//! ```text
//! client: STATUS\n
//! server: error: unknown command 'STATUS'\n
//! server: <close>
//! ```

mod errors;
mod handler;
mod registry;
mod request;
mod stats;

pub use self::errors::DispatchError;
pub use self::handler::{SessionHandler, SessionOutcome};
pub use self::registry::{CommandRegistry, RegistryError};
pub use self::stats::{SessionCounts, SessionStats};

pub use self::request::{CommandSource, MAX_COMMAND_BYTES, REQUEST_GRACE};

pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");
