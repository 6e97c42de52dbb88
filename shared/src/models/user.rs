//! User and role models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Language;

/// A platform user as seen by the workflow.
///
/// Identity and credentials live with the authentication provider; the
/// workflow only needs the id, the acting role and the preferred language
/// for notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
    pub preferred_language: Language,
}

impl Actor {
    /// The platform itself, used for payment callbacks and scheduled jobs
    pub fn system() -> Self {
        Self {
            user_id: Uuid::nil(),
            role: UserRole::System,
            preferred_language: Language::default(),
        }
    }
}

/// Roles that act on certification applications
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Farm operator applying for certification
    Applicant,
    /// Document reviewer
    Reviewer,
    /// Field or remote auditor
    Auditor,
    Admin,
    /// Automated collaborators such as the payment service or expiry jobs
    System,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Applicant => "APPLICANT",
            UserRole::Reviewer => "REVIEWER",
            UserRole::Auditor => "AUDITOR",
            UserRole::Admin => "ADMIN",
            UserRole::System => "SYSTEM",
        }
    }

    /// Staff roles may read any application, applicants only their own
    pub fn is_staff(&self) -> bool {
        !matches!(self, UserRole::Applicant)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APPLICANT" => Ok(UserRole::Applicant),
            "REVIEWER" => Ok(UserRole::Reviewer),
            "AUDITOR" => Ok(UserRole::Auditor),
            "ADMIN" => Ok(UserRole::Admin),
            "SYSTEM" => Ok(UserRole::System),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
