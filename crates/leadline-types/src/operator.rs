//! Operator (back-office staff) identity.
//!
//! Operators are ephemeral: scoped to one authenticated console session.
//! Presence status is local state and never persisted as history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::lead::display_name_from_email;

/// Operator presence shown in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorStatus {
    Online,
    Away,
    Busy,
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorStatus::Online => write!(f, "online"),
            OperatorStatus::Away => write!(f, "away"),
            OperatorStatus::Busy => write!(f, "busy"),
        }
    }
}

impl FromStr for OperatorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(OperatorStatus::Online),
            "away" => Ok(OperatorStatus::Away),
            "busy" => Ok(OperatorStatus::Busy),
            other => Err(format!("invalid operator status: '{other}'")),
        }
    }
}

impl Default for OperatorStatus {
    fn default() -> Self {
        OperatorStatus::Online
    }
}

/// An authenticated staff identity using the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub status: OperatorStatus,
}

impl Operator {
    /// Build an operator from an email; the username is the local part,
    /// or `Operator` when the email has none.
    pub fn from_email(email: &str) -> Self {
        let email = email.trim();
        Self {
            username: display_name_from_email(email).unwrap_or_else(|| "Operator".to_string()),
            email: email.to_string(),
            status: OperatorStatus::Online,
        }
    }

    /// Build an operator known only by name.
    pub fn named(username: &str) -> Self {
        Self {
            username: username.to_string(),
            email: String::new(),
            status: OperatorStatus::Online,
        }
    }

    pub fn set_status(&mut self, status: OperatorStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip_display_fromstr() {
        for status in [OperatorStatus::Online, OperatorStatus::Away, OperatorStatus::Busy] {
            let parsed: OperatorStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!("BUSY".parse::<OperatorStatus>().unwrap(), OperatorStatus::Busy);
        assert!("offline".parse::<OperatorStatus>().is_err());
    }

    #[test]
    fn operator_from_email_uses_local_part() {
        let op = Operator::from_email("sam@office.example");
        assert_eq!(op.username, "sam");
        assert_eq!(op.status, OperatorStatus::Online);
    }

    #[test]
    fn operator_from_email_without_local_part_falls_back() {
        let op = Operator::from_email("");
        assert_eq!(op.username, "Operator");
    }

    #[test]
    fn status_is_locally_mutable() {
        let mut op = Operator::named("kim");
        op.set_status(OperatorStatus::Away);
        assert_eq!(op.status, OperatorStatus::Away);
    }
}
