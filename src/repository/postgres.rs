//! # PostgreSQL Stores
//!
//! `sqlx` implementations of the repository traits. Enumerations are stored as their
//! snake_case text form. The unique constraint on (sop_id, user_id) surfaces as
//! `WorkflowError::Conflict` through the `From<sqlx::Error>` conversion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use super::{CommentStore, SopRepository, StageRepository};
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{Comment, NewComment, Sop, WorkflowStage};
use crate::state_machine::SopStatus;

const SOP_COLUMNS: &str = "sop_id, title, category_id, visibility, department_id, initiator_id, \
                           status, created_at, updated_at";
const STAGE_COLUMNS: &str =
    "stage_id, sop_id, user_id, role, status, sequence, created_at, updated_at";
const COMMENT_COLUMNS: &str = "comment_id, stage_id, user_id, content, created_at, updated_at";

/// Decode a text column into one of the workflow enumerations
fn parse_column<T>(row: &PgRow, column: &str) -> WorkflowResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| WorkflowError::internal(format!("Invalid value in column {column}: {e}")))
}

fn sop_from_row(row: &PgRow) -> WorkflowResult<Sop> {
    Ok(Sop {
        sop_id: row.try_get("sop_id")?,
        title: row.try_get("title")?,
        category_id: row.try_get("category_id")?,
        visibility: parse_column(row, "visibility")?,
        department_id: row.try_get("department_id")?,
        initiator_id: row.try_get("initiator_id")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn stage_from_row(row: &PgRow) -> WorkflowResult<WorkflowStage> {
    Ok(WorkflowStage {
        stage_id: row.try_get("stage_id")?,
        sop_id: row.try_get("sop_id")?,
        user_id: row.try_get("user_id")?,
        role: parse_column(row, "role")?,
        status: parse_column(row, "status")?,
        sequence: row.try_get("sequence")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> WorkflowResult<Comment> {
    Ok(Comment {
        comment_id: row.try_get("comment_id")?,
        stage_id: row.try_get("stage_id")?,
        user_id: row.try_get("user_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get::<Option<DateTime<Utc>>, _>("updated_at")?,
    })
}

#[derive(Debug, Clone)]
pub struct PgSopRepository {
    pool: PgPool,
}

impl PgSopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SopRepository for PgSopRepository {
    async fn insert(&self, sop: &Sop) -> WorkflowResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sop_workflow_sops (
                sop_id, title, category_id, visibility, department_id, initiator_id,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(sop.sop_id)
        .bind(&sop.title)
        .bind(&sop.category_id)
        .bind(sop.visibility.to_string())
        .bind(&sop.department_id)
        .bind(&sop.initiator_id)
        .bind(sop.status.to_string())
        .bind(sop.created_at)
        .bind(sop.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, sop_id: Uuid) -> WorkflowResult<Option<Sop>> {
        let row = sqlx::query(&format!(
            "SELECT {SOP_COLUMNS} FROM sop_workflow_sops WHERE sop_id = $1"
        ))
        .bind(sop_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(sop_from_row).transpose()
    }

    async fn update_status(&self, sop_id: Uuid, status: SopStatus) -> WorkflowResult<Sop> {
        let row = sqlx::query(&format!(
            "UPDATE sop_workflow_sops SET status = $2, updated_at = NOW() \
             WHERE sop_id = $1 RETURNING {SOP_COLUMNS}"
        ))
        .bind(sop_id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| WorkflowError::not_found("SOP", sop_id))?;

        sop_from_row(&row)
    }

    async fn delete(&self, sop_id: Uuid) -> WorkflowResult<bool> {
        let result = sqlx::query("DELETE FROM sop_workflow_sops WHERE sop_id = $1")
            .bind(sop_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PgStageRepository {
    pool: PgPool,
}

impl PgStageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StageRepository for PgStageRepository {
    async fn insert_many(&self, stages: &[WorkflowStage]) -> WorkflowResult<()> {
        let mut tx = self.pool.begin().await?;

        for stage in stages {
            sqlx::query(
                r#"
                INSERT INTO sop_workflow_stages (
                    stage_id, sop_id, user_id, role, status, sequence, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(stage.stage_id)
            .bind(stage.sop_id)
            .bind(&stage.user_id)
            .bind(stage.role.to_string())
            .bind(stage.status.to_string())
            .bind(stage.sequence)
            .bind(stage.created_at)
            .bind(stage.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| match WorkflowError::from(e) {
                WorkflowError::Conflict(_) => WorkflowError::conflict(format!(
                    "Stage already exists for SOP {} and participant {}",
                    stage.sop_id, stage.user_id
                )),
                other => other,
            })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, sop_id: Uuid, user_id: &str) -> WorkflowResult<Option<WorkflowStage>> {
        let row = sqlx::query(&format!(
            "SELECT {STAGE_COLUMNS} FROM sop_workflow_stages WHERE sop_id = $1 AND user_id = $2"
        ))
        .bind(sop_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(stage_from_row).transpose()
    }

    async fn find_by_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<WorkflowStage>> {
        let rows = sqlx::query(&format!(
            "SELECT {STAGE_COLUMNS} FROM sop_workflow_stages WHERE sop_id = $1 ORDER BY sequence"
        ))
        .bind(sop_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stage_from_row).collect()
    }

    async fn find_by_user(&self, user_id: &str) -> WorkflowResult<Vec<WorkflowStage>> {
        let rows = sqlx::query(&format!(
            "SELECT {STAGE_COLUMNS} FROM sop_workflow_stages WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stage_from_row).collect()
    }

    async fn save_status(&self, stage: &WorkflowStage) -> WorkflowResult<()> {
        let result = sqlx::query(
            "UPDATE sop_workflow_stages SET status = $2, updated_at = $3 WHERE stage_id = $1",
        )
        .bind(stage.stage_id)
        .bind(stage.status.to_string())
        .bind(stage.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(WorkflowError::not_found("Workflow stage", stage.stage_id));
        }
        Ok(())
    }

    async fn delete_by_sop(&self, sop_id: Uuid) -> WorkflowResult<Vec<Uuid>> {
        let rows = sqlx::query("DELETE FROM sop_workflow_stages WHERE sop_id = $1 RETURNING stage_id")
            .bind(sop_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<Uuid, _>("stage_id").map_err(WorkflowError::from))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn append(&self, comment: NewComment) -> WorkflowResult<Comment> {
        let comment = comment.into_comment();
        sqlx::query(
            r#"
            INSERT INTO sop_workflow_comments (comment_id, stage_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.comment_id)
        .bind(comment.stage_id)
        .bind(&comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn find(&self, comment_id: Uuid) -> WorkflowResult<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM sop_workflow_comments WHERE comment_id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list_for_stage(&self, stage_id: Uuid) -> WorkflowResult<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM sop_workflow_comments \
             WHERE stage_id = $1 ORDER BY created_at"
        ))
        .bind(stage_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn update_content(&self, comment_id: Uuid, content: &str) -> WorkflowResult<Comment> {
        let row = sqlx::query(&format!(
            "UPDATE sop_workflow_comments SET content = $2, updated_at = NOW() \
             WHERE comment_id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| WorkflowError::not_found("Comment", comment_id))?;

        comment_from_row(&row)
    }

    async fn delete(&self, comment_id: Uuid) -> WorkflowResult<bool> {
        let result = sqlx::query("DELETE FROM sop_workflow_comments WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_stages(&self, stage_ids: &[Uuid]) -> WorkflowResult<u64> {
        let result = sqlx::query("DELETE FROM sop_workflow_comments WHERE stage_id = ANY($1)")
            .bind(stage_ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
