//! Reviewer role resolution from a persisted session record
//!
//! Clients persist an opaque JSON session record on-device and forward it
//! with each request. The resolver derives a closed reviewer role from it;
//! anything missing or malformed resolves to `None` and is treated as
//! unauthenticated at the HTTP boundary.

use serde::Deserialize;

/// Reviewer role in the verification chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Vessel commanding officer; final-stage reviewer across all departments
    Master,
    /// Cadet Training Officer; first-stage reviewer scoped to one department
    TechnicalExpert { department: String },
}

impl Role {
    pub fn is_master(&self) -> bool {
        matches!(self, Role::Master)
    }

    /// Whether submissions of the given department are visible to this reviewer
    pub fn sees_department(&self, department: &str) -> bool {
        match self {
            Role::Master => true,
            Role::TechnicalExpert { department: own } => own == department,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Master => write!(f, "Master"),
            Role::TechnicalExpert { department } => write!(f, "CTO ({})", department),
        }
    }
}

/// The fields of the persisted session record this service cares about.
/// The record carries plenty more (theme, onboarding flags, biometrics);
/// those are ignored here.
#[derive(Debug, Deserialize)]
struct SessionRecord {
    role: Option<String>,
    department: Option<String>,
}

/// Resolve a reviewer role from the raw session record.
///
/// `"MASTER"` resolves to [`Role::Master`]; any other record with a non-empty
/// department resolves to the default technical-expert role. Malformed JSON
/// or a record without a department resolves to `None`.
pub fn resolve_role(raw: &str) -> Option<Role> {
    let record: SessionRecord = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Unreadable session record: {}", e);
            return None;
        }
    };

    if record.role.as_deref() == Some("MASTER") {
        return Some(Role::Master);
    }

    match record.department {
        Some(department) if !department.is_empty() => Some(Role::TechnicalExpert { department }),
        _ => None,
    }
}
