use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats for the daemon's structured logs.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    #[default]
    Json,
    /// Single-line text for operators watching a terminal.
    Compact,
}

/// Error returned when `--log-format` does not name a known format.
pub type LogFormatParseError = strum::ParseError;
