//! Non-fatal notices raised while generating or parsing

use serde::{Deserialize, Serialize};
use std::fmt;

/// A structural warning. Generation and parsing still complete when one is
/// raised; the caller decides whether to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// An array-returning accessor was matched against a single element
    ArrayPattern { index: usize, command: String },

    /// `assertAll*`, `verifyAll*` and `waitForAll*` support is experimental
    ExperimentalCommand { index: usize, command: String },

    /// Regenerating the parsed test case does not reproduce the source
    RoundTripMismatch { original_len: usize, regenerated_len: usize },

    /// The parsed text contains no command echo line
    NoCommandsFound,

    /// The parsed text does not declare the server URL parameter
    UnresolvedBaseUrl,

    /// The parsed test case could not be regenerated at all
    RegenerationFailed { reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ArrayPattern { index, command } => write!(
                f,
                "{} (command #{}) returns an array; the pattern is matched against a single element only",
                command,
                index + 1
            ),
            Warning::ExperimentalCommand { index, command } => write!(
                f,
                "Support for \"{}(pattern)\" (command #{}) is experimental! Please check the generated code.",
                command,
                index + 1
            ),
            Warning::RoundTripMismatch { original_len, regenerated_len } => write!(
                f,
                "The test case exported from this source will not be identical to the original file \
                 ({} vs {} characters). Another formatter version, different options or manual edits were used.",
                original_len, regenerated_len
            ),
            Warning::NoCommandsFound => write!(f, "No command found. Is this really an ats file?"),
            Warning::UnresolvedBaseUrl => write!(
                f,
                "Could not identify base URL. Make sure to set the right URL before exporting again."
            ),
            Warning::RegenerationFailed { reason } => {
                write!(f, "The parsed test case cannot be exported again: {}", reason)
            }
        }
    }
}
