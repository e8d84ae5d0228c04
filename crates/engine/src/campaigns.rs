//! Pieces shared by the group-buy and group-sell campaign entities.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Why a campaign left the OPEN state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The quantity target was reached by a contribution.
    AutoCompleted,
    /// An admin or the cooperative leader closed it by hand.
    AdminForced,
    /// The deadline passed before the target was met.
    Expired,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoCompleted => "auto_completed",
            Self::AdminForced => "admin_forced",
            Self::Expired => "expired",
        }
    }
}

impl TryFrom<&str> for CloseReason {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "auto_completed" => Ok(Self::AutoCompleted),
            "admin_forced" => Ok(Self::AdminForced),
            "expired" => Ok(Self::Expired),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid close reason: {other}"
            ))),
        }
    }
}
