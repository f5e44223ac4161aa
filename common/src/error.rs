//! Error taxonomy for target specifications.

use core::fmt::Display;

use thiserror::Error as ThisError;

/// A target specification that could not be turned into addresses.
///
/// Both variants carry the offending specification verbatim so it can be
/// echoed back to the user.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ExpandError {
    /// Not a parsable IPv4 literal or CIDR block.
    #[error("invalid address '{spec}': {reason}")]
    InvalidAddress { spec: String, reason: String },
    /// Malformed `start-endOctet` range.
    #[error("invalid range '{spec}': {reason}")]
    InvalidRange { spec: String, reason: String },
}

impl ExpandError {
    pub(crate) fn address(spec: &str, reason: impl Display) -> Self {
        Self::InvalidAddress {
            spec: spec.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn range(spec: &str, reason: impl Display) -> Self {
        Self::InvalidRange {
            spec: spec.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// The specification as the user typed it.
    #[must_use]
    pub fn spec(&self) -> &str {
        match *self {
            Self::InvalidAddress { ref spec, .. } | Self::InvalidRange { ref spec, .. } => spec,
        }
    }
}
