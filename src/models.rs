//! Data models for competency submissions and guidance topics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A competency sign-off request sitting on the verification queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    /// Display name of the submitting trainee (owned by the personnel registry)
    pub trainee: String,
    /// Human-readable description of the competency task
    pub task: String,
    /// Calendar date the trainee submitted evidence
    pub submitted_date: NaiveDate,
    /// Whether supporting evidence (photo/document) was attached
    pub has_evidence: bool,
    /// Department scoping visibility to a technical-expert reviewer
    pub department: String,
    pub state: SubmissionState,
    /// Marks tasks that also unlock a certificate (e.g. steering hours)
    pub is_milestone: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// True once the department's technical expert has verified the task
    pub fn cto_signed(&self) -> bool {
        self.state.cto_signed()
    }
}

/// Position of a submission in the verification chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Awaiting the department technical expert (CTO)
    PendingTechnical,
    /// Technically verified, awaiting Master final sign-off
    PendingMaster,
    /// Finally approved by the Master
    Approved,
    /// Rejected by either reviewer
    Rejected,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::PendingTechnical => "pending_technical",
            SubmissionState::PendingMaster => "pending_master",
            SubmissionState::Approved => "approved",
            SubmissionState::Rejected => "rejected",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Approved | SubmissionState::Rejected)
    }

    /// The `cto_signed` flag of the source data model
    pub fn cto_signed(&self) -> bool {
        matches!(self, SubmissionState::PendingMaster | SubmissionState::Approved)
    }

    /// Technical expert sign-off. Signing an already-signed submission is a
    /// no-op success; it stays queued for the Master either way.
    pub fn on_technical_sign(self) -> Result<SubmissionState, TransitionError> {
        match self {
            SubmissionState::PendingTechnical | SubmissionState::PendingMaster => {
                Ok(SubmissionState::PendingMaster)
            }
            s => Err(TransitionError::Terminal(s)),
        }
    }

    /// Master final sign-off, gated on prior technical verification
    pub fn on_master_approve(self) -> Result<SubmissionState, TransitionError> {
        match self {
            SubmissionState::PendingMaster => Ok(SubmissionState::Approved),
            SubmissionState::PendingTechnical => Err(TransitionError::Blocked),
            s => Err(TransitionError::Terminal(s)),
        }
    }

    /// Rejection, valid from either pending state
    pub fn on_reject(self) -> Result<SubmissionState, TransitionError> {
        match self {
            SubmissionState::PendingTechnical | SubmissionState::PendingMaster => {
                Ok(SubmissionState::Rejected)
            }
            s => Err(TransitionError::Terminal(s)),
        }
    }
}

impl std::str::FromStr for SubmissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_technical" => Ok(SubmissionState::PendingTechnical),
            "pending_master" => Ok(SubmissionState::PendingMaster),
            "approved" => Ok(SubmissionState::Approved),
            "rejected" => Ok(SubmissionState::Rejected),
            _ => Err(format!("Invalid submission state: {}", s)),
        }
    }
}

/// Why a state transition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Master sign-off attempted before technical verification
    Blocked,
    /// Transition attempted on a terminal submission
    Terminal(SubmissionState),
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::Blocked => {
                write!(f, "technical verification required before Master sign-off")
            }
            TransitionError::Terminal(s) => {
                write!(f, "submission is already {}", s.as_str())
            }
        }
    }
}

/// A read-only guidance topic keyed by task identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceTopic {
    pub task_key: String,
    pub title: String,
    pub body: String,
}

/// Request to place a new submission on the verification queue
#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub trainee: String,
    pub task: String,
    pub submitted_date: NaiveDate,
    #[serde(default)]
    pub has_evidence: bool,
    pub department: String,
    #[serde(default)]
    pub is_milestone: bool,
}
