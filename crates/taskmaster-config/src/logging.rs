use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats understood by the diagnostic log subscriber.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    Json,
    /// Single-line human-readable events on stderr.
    #[default]
    Compact,
}
