//! Verification chain for competency submissions
//!
//! Coordinates the two-stage approval sequence: a department technical
//! expert (CTO) signs first, the Master gives final sign-off. Role and
//! department are passed explicitly into every operation; there is no
//! ambient session state. State changes go through the store's
//! compare-and-swap primitive so two reviewers acting concurrently on the
//! same submission cannot double-approve.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Submission, TransitionError};
use crate::session::Role;
use crate::store::Store;

/// Events emitted by the verification chain
#[derive(Debug, Clone)]
pub enum ChainEvent {
    /// A technical expert verified the task; submission now awaits the Master
    TechnicalSigned { id: Uuid, department: String },
    /// The Master gave final sign-off
    FinalApproved { id: Uuid, is_milestone: bool },
    /// A reviewer rejected the submission
    Rejected { id: Uuid, by: Role },
}

/// Outcome of a successful approve operation
#[derive(Debug, Clone)]
pub enum ApprovalOutcome {
    /// Technical sign-off done; forwarded for Master final sign-off
    ForwardedForFinal(Submission),
    /// Final Master approval; submission leaves the queue
    FinalApproved(Submission),
}

impl ApprovalOutcome {
    pub fn submission(&self) -> &Submission {
        match self {
            ApprovalOutcome::ForwardedForFinal(s) => s,
            ApprovalOutcome::FinalApproved(s) => s,
        }
    }

    /// User-facing notification for this outcome
    pub fn notice(&self) -> Notification {
        match self {
            ApprovalOutcome::ForwardedForFinal(_) => {
                Notification::success("Task verified - forwarded for final sign-off")
            }
            ApprovalOutcome::FinalApproved(s) if s.is_milestone => {
                Notification::success("Task approved - certificate unlocked")
            }
            ApprovalOutcome::FinalApproved(_) => Notification::success("Task approved"),
        }
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A transient notification rendered by the client after each transition
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// The role-gated approval queue over the submission store
#[derive(Clone)]
pub struct VerificationChain {
    store: Store,
    event_tx: broadcast::Sender<ChainEvent>,
}

impl VerificationChain {
    pub fn new(store: Store) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { store, event_tx }
    }

    /// Subscribe to chain events
    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.event_tx.subscribe()
    }

    /// Pending submissions visible to the reviewer, in insertion order
    pub async fn list_visible(&self, role: &Role) -> Result<Vec<Submission>> {
        self.store.list_visible(role).await
    }

    /// Approve a submission as the given reviewer.
    ///
    /// A technical expert moves it to `PendingMaster` (kept on the queue);
    /// the Master finalizes it, which requires prior technical sign-off.
    pub async fn approve(&self, id: Uuid, role: &Role) -> Result<ApprovalOutcome> {
        match role {
            Role::Master => self.master_approve(id).await,
            Role::TechnicalExpert { .. } => self.technical_sign(id).await,
        }
    }

    /// Reject a submission; allowed for either role, from either pending state
    pub async fn reject(&self, id: Uuid, role: &Role) -> Result<Submission> {
        let current = self.store.get_submission(id).await?;
        let next = current
            .state
            .on_reject()
            .map_err(|e| transition_error(id, e))?;

        if !self.store.transition(id, current.state, next).await? {
            // Lost the race; a reject is still valid from the other pending
            // state, so retry once against what is there now
            let reread = self.store.get_submission(id).await?;
            let renext = reread
                .state
                .on_reject()
                .map_err(|e| transition_error(id, e))?;
            if !self.store.transition(id, reread.state, renext).await? {
                return Err(AppError::InvalidState(format!(
                    "Submission {} changed while rejecting",
                    id
                )));
            }
        }

        let updated = self.store.get_submission(id).await?;

        tracing::info!("Submission {} rejected by {}", id, role);
        let _ = self.event_tx.send(ChainEvent::Rejected {
            id,
            by: role.clone(),
        });

        Ok(updated)
    }

    async fn technical_sign(&self, id: Uuid) -> Result<ApprovalOutcome> {
        let current = self.store.get_submission(id).await?;
        let next = current
            .state
            .on_technical_sign()
            .map_err(|e| transition_error(id, e))?;

        // Already signed: no write, stays queued for the Master
        if next == current.state {
            return Ok(ApprovalOutcome::ForwardedForFinal(current));
        }

        if !self.store.transition(id, current.state, next).await? {
            // Concurrent reviewer changed it; re-read and re-classify
            let reread = self.store.get_submission(id).await?;
            let renext = reread
                .state
                .on_technical_sign()
                .map_err(|e| transition_error(id, e))?;
            if renext == reread.state {
                return Ok(ApprovalOutcome::ForwardedForFinal(reread));
            }
            return Err(AppError::InvalidState(format!(
                "Submission {} changed while signing",
                id
            )));
        }

        let updated = self.store.get_submission(id).await?;

        tracing::info!("Submission {} technically signed ({})", id, updated.department);
        let _ = self.event_tx.send(ChainEvent::TechnicalSigned {
            id,
            department: updated.department.clone(),
        });

        Ok(ApprovalOutcome::ForwardedForFinal(updated))
    }

    async fn master_approve(&self, id: Uuid) -> Result<ApprovalOutcome> {
        let current = self.store.get_submission(id).await?;
        let next = current
            .state
            .on_master_approve()
            .map_err(|e| transition_error(id, e))?;

        if !self.store.transition(id, current.state, next).await? {
            // Precondition re-validated at commit time: the swap is
            // conditional on the observed state, so a lost race is
            // re-classified instead of double-approving.
            let reread = self.store.get_submission(id).await?;
            reread
                .state
                .on_master_approve()
                .map_err(|e| transition_error(id, e))?;
            return Err(AppError::InvalidState(format!(
                "Submission {} changed while approving",
                id
            )));
        }

        let updated = self.store.get_submission(id).await?;

        tracing::info!(
            "Submission {} approved by Master (milestone: {})",
            id,
            updated.is_milestone
        );
        let _ = self.event_tx.send(ChainEvent::FinalApproved {
            id,
            is_milestone: updated.is_milestone,
        });

        Ok(ApprovalOutcome::FinalApproved(updated))
    }
}

fn transition_error(id: Uuid, err: TransitionError) -> AppError {
    match err {
        TransitionError::Blocked => AppError::Blocked(format!(
            "Submission {}: technical verification required before Master sign-off",
            id
        )),
        TransitionError::Terminal(state) => AppError::InvalidState(format!(
            "Submission {} is already {}",
            id,
            state.as_str()
        )),
    }
}
