//! Database store for submissions and guidance topics

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreateSubmissionRequest, GuidanceTopic, Submission, SubmissionState};
use crate::session::Role;

/// Fixed seed set for the guidance read-model. Inserted once into an empty
/// table and never rewritten.
const GUIDANCE_SEED: &[(&str, &str, &str)] = &[
    (
        "steering-gear",
        "Steering gear familiarisation",
        "Trace the steering gear from bridge order to rudder stock. Identify \
         the emergency steering position and the changeover procedure posted \
         at the aft station.",
    ),
    (
        "manual-steering",
        "Manual steering watch",
        "Steer by hand compass course for the period ordered by the officer \
         of the watch. Log the helm orders received and the vessel's response \
         in following and quartering seas.",
    ),
    (
        "lifeboat-launch",
        "Lifeboat launching and recovery",
        "Assist in lowering the lifeboat to embarkation deck level. Know the \
         release gear interlocks and the painter arrangement before any \
         waterborne drill.",
    ),
    (
        "fire-rounds",
        "Fire patrol rounds",
        "Walk the fire patrol route including accommodation, galley and \
         machinery spaces. Confirm fire doors are free, extinguishers charged \
         and escape routes unobstructed.",
    ),
    (
        "bridge-watchkeeping",
        "Bridge watchkeeping under supervision",
        "Keep a lookout by sight and hearing, plot fixes at the interval set \
         by the Master's standing orders, and report all lights, shapes and \
         contacts to the officer of the watch.",
    ),
    (
        "engine-room-rounds",
        "Engine room watch rounds",
        "Take routine readings of main engine, generators and auxiliaries. \
         Report abnormal levels, leaks or alarms to the duty engineer before \
         leaving the space.",
    ),
];

/// Database store
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Submission operations

    /// Place a new submission on the queue in `PendingTechnical`
    pub async fn create_submission(&self, req: CreateSubmissionRequest) -> Result<Submission> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let state = SubmissionState::PendingTechnical;

        sqlx::query(
            r#"
            INSERT INTO submissions
                (id, trainee, task, submitted_date, has_evidence, department,
                 state, is_milestone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.trainee)
        .bind(&req.task)
        .bind(req.submitted_date)
        .bind(req.has_evidence)
        .bind(&req.department)
        .bind(state.as_str())
        .bind(req.is_milestone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Submission {
            id,
            trainee: req.trainee,
            task: req.task,
            submitted_date: req.submitted_date,
            has_evidence: req.has_evidence,
            department: req.department,
            state,
            is_milestone: req.is_milestone,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_submission(&self, id: Uuid) -> Result<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, trainee, task, submitted_date, has_evidence, department,
                   state, is_milestone, created_at, updated_at
            FROM submissions
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;

        row.try_into()
    }

    /// Pending submissions visible to the reviewer, in insertion order.
    /// Terminal submissions never appear; CTO listings are department-scoped.
    pub async fn list_visible(&self, role: &Role) -> Result<Vec<Submission>> {
        let rows = match role {
            Role::Master => {
                sqlx::query_as::<_, SubmissionRow>(
                    r#"
                    SELECT id, trainee, task, submitted_date, has_evidence, department,
                           state, is_milestone, created_at, updated_at
                    FROM submissions
                    WHERE state IN ('pending_technical', 'pending_master')
                    ORDER BY rowid ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            Role::TechnicalExpert { department } => {
                sqlx::query_as::<_, SubmissionRow>(
                    r#"
                    SELECT id, trainee, task, submitted_date, has_evidence, department,
                           state, is_milestone, created_at, updated_at
                    FROM submissions
                    WHERE state IN ('pending_technical', 'pending_master')
                      AND department = ?
                    ORDER BY rowid ASC
                    "#,
                )
                .bind(department)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Compare-and-swap the state column. Returns false when the submission
    /// is no longer in `from` (a concurrent reviewer got there first) or does
    /// not exist; the caller re-reads and re-classifies in that case.
    pub async fn transition(
        &self,
        id: Uuid,
        from: SubmissionState,
        to: SubmissionState,
    ) -> Result<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE submissions SET state = ?, updated_at = ?
            WHERE id = ? AND state = ?
            "#,
        )
        .bind(to.as_str())
        .bind(now)
        .bind(id.to_string())
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // Guidance operations

    /// Populate the guidance table from the fixed seed set if it is empty.
    /// Idempotent; an already-populated table is never rewritten.
    pub async fn ensure_seeded(&self) -> Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM guidance")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            return Ok(());
        }

        for (task_key, title, body) in GUIDANCE_SEED {
            sqlx::query(
                r#"
                INSERT INTO guidance (task_key, title, body)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(task_key)
            .bind(title)
            .bind(body)
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("Seeded {} guidance topics", GUIDANCE_SEED.len());
        Ok(())
    }

    pub async fn get_guidance(&self, task_key: &str) -> Result<Option<GuidanceTopic>> {
        let row = sqlx::query_as::<_, GuidanceRow>(
            r#"
            SELECT task_key, title, body
            FROM guidance
            WHERE task_key = ?
            "#,
        )
        .bind(task_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| GuidanceTopic {
            task_key: r.task_key,
            title: r.title,
            body: r.body,
        }))
    }
}

// Internal row types for sqlx

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: String,
    trainee: String,
    task: String,
    submitted_date: chrono::NaiveDate,
    has_evidence: bool,
    department: String,
    state: String,
    is_milestone: bool,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = AppError;

    fn try_from(row: SubmissionRow) -> Result<Self> {
        Ok(Submission {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| AppError::Internal(format!("Invalid UUID: {}", e)))?,
            trainee: row.trainee,
            task: row.task,
            submitted_date: row.submitted_date,
            has_evidence: row.has_evidence,
            department: row.department,
            state: row
                .state
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid state: {}", e)))?,
            is_milestone: row.is_milestone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GuidanceRow {
    task_key: String,
    title: String,
    body: String,
}
