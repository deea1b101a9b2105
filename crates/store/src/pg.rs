// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Postgres-backed [`StateStore`]/[`CheckpointStore`]. Checkpoints live in
//! their own table, separate from workflow state, the same split used by
//! LangGraph-style Postgres checkpointers. Uses `sqlx::PgPool` with
//! `$1..$N` numbered placeholders throughout.

use crate::error::StoreError;
use crate::traits::{CheckpointStore, StateStore, WorkflowFilter};
use amelia_core::{
    Checkpoint, CheckpointId, Event, EventId, Profile, ProfileId, ServerSettings, TokenUsage, TokenUsageId, UsageTotals,
    Workflow, WorkflowId, WorkflowStatus,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Applies every migration under `migrations/` that hasn't run yet,
    /// recording each in `schema_migrations`. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_workflow(row: &sqlx::postgres::PgRow) -> Result<Workflow, StoreError> {
        Ok(Workflow {
            id: WorkflowId::from_string(row.try_get::<String, _>("id")?),
            issue_id: row.try_get("issue_id")?,
            worktree_path: row.try_get::<String, _>("worktree_path")?.into(),
            profile_id: ProfileId::from_string(row.try_get::<String, _>("profile_id")?),
            status: parse_workflow_status(&row.try_get::<String, _>("status")?),
            workflow_type: parse_workflow_type(&row.try_get::<String, _>("workflow_type")?),
            created_at_ms: row.try_get::<i64, _>("created_at_ms")? as u64,
            started_at_ms: row.try_get::<Option<i64>, _>("started_at_ms")?.map(|v| v as u64),
            completed_at_ms: row.try_get::<Option<i64>, _>("completed_at_ms")?.map(|v| v as u64),
            planned_at_ms: row.try_get::<Option<i64>, _>("planned_at_ms")?.map(|v| v as u64),
            failure_reason: row.try_get("failure_reason")?,
            plan_cache: row.try_get("plan_cache")?,
            issue_cache: row.try_get("issue_cache")?,
        })
    }
}

fn parse_workflow_status(s: &str) -> WorkflowStatus {
    match s {
        "pending" => WorkflowStatus::Pending,
        "in_progress" => WorkflowStatus::InProgress,
        "blocked" => WorkflowStatus::Blocked,
        "completed" => WorkflowStatus::Completed,
        "failed" => WorkflowStatus::Failed,
        _ => WorkflowStatus::Cancelled,
    }
}

fn parse_workflow_type(s: &str) -> amelia_core::WorkflowType {
    use amelia_core::WorkflowType::*;
    match s {
        "plan-only" => PlanOnly,
        "review-only" => ReviewOnly,
        _ => Full,
    }
}

#[async_trait]
impl StateStore for PgStore {
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
        let result = sqlx::query(
            "INSERT INTO workflows (id, issue_id, worktree_path, profile_id, status, workflow_type, created_at_ms, \
             started_at_ms, completed_at_ms, planned_at_ms, failure_reason, plan_cache, issue_cache) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(workflow.id.as_str())
        .bind(&workflow.issue_id)
        .bind(workflow.worktree_path.to_string_lossy().to_string())
        .bind(workflow.profile_id.as_str())
        .bind(workflow.status.to_string())
        .bind(workflow.workflow_type.to_string())
        .bind(workflow.created_at_ms as i64)
        .bind(workflow.started_at_ms.map(|v| v as i64))
        .bind(workflow.completed_at_ms.map(|v| v as i64))
        .bind(workflow.planned_at_ms.map(|v| v as i64))
        .bind(&workflow.failure_reason)
        .bind(&workflow.plan_cache)
        .bind(&workflow.issue_cache)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(workflow),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let row = sqlx::query(
                    "SELECT id FROM workflows WHERE worktree_path = $1 AND status IN ('pending', 'in_progress', 'blocked')",
                )
                .bind(workflow.worktree_path.to_string_lossy().to_string())
                .fetch_one(&self.pool)
                .await?;
                let existing: String = row.try_get("id")?;
                Err(StoreError::WorktreeConflict { existing: WorkflowId::from_string(existing) })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError> {
        let row = sqlx::query("SELECT * FROM workflows WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::WorkflowNotFound(id))?;
        Self::row_to_workflow(&row)
    }

    async fn update_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
        sqlx::query(
            "UPDATE workflows SET issue_id = $2, worktree_path = $3, status = $4, workflow_type = $5, \
             started_at_ms = $6, completed_at_ms = $7, planned_at_ms = $8, failure_reason = $9, \
             plan_cache = $10, issue_cache = $11 WHERE id = $1",
        )
        .bind(workflow.id.as_str())
        .bind(&workflow.issue_id)
        .bind(workflow.worktree_path.to_string_lossy().to_string())
        .bind(workflow.status.to_string())
        .bind(workflow.workflow_type.to_string())
        .bind(workflow.started_at_ms.map(|v| v as i64))
        .bind(workflow.completed_at_ms.map(|v| v as i64))
        .bind(workflow.planned_at_ms.map(|v| v as i64))
        .bind(&workflow.failure_reason)
        .bind(&workflow.plan_cache)
        .bind(&workflow.issue_cache)
        .execute(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn set_workflow_status(
        &self,
        workflow_id: WorkflowId,
        status: WorkflowStatus,
        failure_reason: Option<String>,
        now_ms: u64,
    ) -> Result<Workflow, StoreError> {
        let mut workflow = self.get_workflow(workflow_id).await?;
        workflow.set_status(status, now_ms)?;
        if failure_reason.is_some() {
            workflow.failure_reason = failure_reason;
        }
        self.update_workflow(workflow).await
    }

    async fn list_workflows(&self, filter: WorkflowFilter) -> Result<Vec<Workflow>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM workflows \
             WHERE ($1::text IS NULL OR status = $1) \
             AND ($2::text IS NULL OR worktree_path = $2)",
        )
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.worktree_path.map(|p| p.to_string_lossy().to_string()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_workflow).collect()
    }

    async fn list_active_workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        let rows = sqlx::query("SELECT * FROM workflows WHERE status IN ('pending', 'in_progress', 'blocked')")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_workflow).collect()
    }

    async fn save_event(&self, event: Event) -> Result<Event, StoreError> {
        let max = self.get_max_event_sequence(event.workflow_id).await?;
        if event.sequence != max + 1 {
            return Err(StoreError::SequenceConflict { expected: max + 1, got: event.sequence });
        }
        sqlx::query(
            "INSERT INTO workflow_log (id, workflow_id, sequence, timestamp_ms, level, event_type, agent, message, \
             data, is_error) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(event.id.as_str())
        .bind(event.workflow_id.as_str())
        .bind(event.sequence as i64)
        .bind(event.timestamp_ms as i64)
        .bind(event.level.to_string())
        .bind(event.event_type.to_string())
        .bind(&event.agent)
        .bind(&event.message)
        .bind(&event.data)
        .bind(event.is_error)
        .execute(&self.pool)
        .await?;
        Ok(event)
    }

    async fn get_max_event_sequence(&self, workflow_id: WorkflowId) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COALESCE(MAX(sequence), 0) AS max_seq FROM workflow_log WHERE workflow_id = $1")
            .bind(workflow_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("max_seq")? as u64)
    }

    async fn list_events(&self, workflow_id: WorkflowId, from_sequence: Option<u64>) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM workflow_log WHERE workflow_id = $1 AND sequence > $2 ORDER BY sequence ASC",
        )
        .bind(workflow_id.as_str())
        .bind(from_sequence.unwrap_or(0) as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(Event {
                    id: EventId::from_string(row.try_get::<String, _>("id")?),
                    workflow_id: WorkflowId::from_string(row.try_get::<String, _>("workflow_id")?),
                    sequence: row.try_get::<i64, _>("sequence")? as u64,
                    timestamp_ms: row.try_get::<i64, _>("timestamp_ms")? as u64,
                    level: parse_event_level(&row.try_get::<String, _>("level")?),
                    event_type: amelia_core::EventType::from_wire_str(&row.try_get::<String, _>("event_type")?),
                    agent: row.try_get("agent")?,
                    message: row.try_get("message")?,
                    data: row.try_get("data")?,
                    is_error: row.try_get("is_error")?,
                })
            })
            .collect()
    }

    async fn save_token_usage(&self, usage: TokenUsage) -> Result<TokenUsage, StoreError> {
        sqlx::query(
            "INSERT INTO token_usage (id, workflow_id, agent, model, input_tokens, output_tokens, \
             cache_read_tokens, cache_creation_tokens, cost_usd, duration_ms, num_turns, timestamp_ms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(usage.id.as_str())
        .bind(usage.workflow_id.as_str())
        .bind(&usage.agent)
        .bind(&usage.model)
        .bind(usage.input_tokens as i64)
        .bind(usage.output_tokens as i64)
        .bind(usage.cache_read_tokens as i64)
        .bind(usage.cache_creation_tokens as i64)
        .bind(usage.cost_usd)
        .bind(usage.duration_ms as i64)
        .bind(usage.num_turns as i32)
        .bind(usage.timestamp_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(usage)
    }

    async fn list_token_usage_by_workflow(&self, workflow_id: WorkflowId) -> Result<Vec<TokenUsage>, StoreError> {
        let rows = sqlx::query("SELECT * FROM token_usage WHERE workflow_id = $1")
            .bind(workflow_id.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(TokenUsage {
                    id: TokenUsageId::from_string(row.try_get::<String, _>("id")?),
                    workflow_id: WorkflowId::from_string(row.try_get::<String, _>("workflow_id")?),
                    agent: row.try_get("agent")?,
                    model: row.try_get("model")?,
                    input_tokens: row.try_get::<i64, _>("input_tokens")? as u64,
                    output_tokens: row.try_get::<i64, _>("output_tokens")? as u64,
                    cache_read_tokens: row.try_get::<i64, _>("cache_read_tokens")? as u64,
                    cache_creation_tokens: row.try_get::<i64, _>("cache_creation_tokens")? as u64,
                    cost_usd: row.try_get("cost_usd")?,
                    duration_ms: row.try_get::<i64, _>("duration_ms")? as u64,
                    num_turns: row.try_get::<i32, _>("num_turns")? as u32,
                    timestamp_ms: row.try_get::<i64, _>("timestamp_ms")? as u64,
                })
            })
            .collect()
    }

    async fn aggregate_token_usage(&self, workflow_id: WorkflowId) -> Result<UsageTotals, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(input_tokens), 0) AS input_tokens, COALESCE(SUM(output_tokens), 0) AS output_tokens, \
             COALESCE(SUM(cache_read_tokens), 0) AS cache_read_tokens, \
             COALESCE(SUM(cache_creation_tokens), 0) AS cache_creation_tokens, \
             COALESCE(SUM(cost_usd), 0) AS cost_usd, COALESCE(SUM(num_turns), 0) AS num_turns \
             FROM token_usage WHERE workflow_id = $1",
        )
        .bind(workflow_id.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(UsageTotals {
            input_tokens: row.try_get::<i64, _>("input_tokens")? as u64,
            output_tokens: row.try_get::<i64, _>("output_tokens")? as u64,
            cache_read_tokens: row.try_get::<i64, _>("cache_read_tokens")? as u64,
            cache_creation_tokens: row.try_get::<i64, _>("cache_creation_tokens")? as u64,
            cost_usd: row.try_get("cost_usd")?,
            num_turns: row.try_get::<i64, _>("num_turns")? as u32,
        })
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::ProfileNotFound(id.to_string()))?;
        row_to_profile(&row)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query("SELECT * FROM profiles ORDER BY name").fetch_all(&self.pool).await?;
        rows.iter().map(row_to_profile).collect()
    }

    async fn get_active_profile(&self) -> Result<Profile, StoreError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE is_active = TRUE")
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NoActiveProfile)?;
        row_to_profile(&row)
    }

    async fn set_active_profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE profiles SET is_active = FALSE").execute(&mut *tx).await?;
        let result = sqlx::query("UPDATE profiles SET is_active = TRUE WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::ProfileNotFound(id.to_string()));
        }
        tx.commit().await?;
        self.get_profile(id).await
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        sqlx::query(
            "INSERT INTO profiles (id, name, tracker, working_dir_root, plan_output_dir, max_review_iterations, \
             max_plan_revisions, agents, sandbox, is_active) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(profile.tracker.to_string())
        .bind(profile.working_dir_root.to_string_lossy().to_string())
        .bind(profile.plan_output_dir.to_string_lossy().to_string())
        .bind(profile.max_review_iterations as i32)
        .bind(profile.max_plan_revisions as i32)
        .bind(serde_json::to_value(&profile.agents)?)
        .bind(serde_json::to_value(&profile.sandbox)?)
        .bind(profile.is_active)
        .execute(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        sqlx::query(
            "UPDATE profiles SET name = $2, tracker = $3, working_dir_root = $4, plan_output_dir = $5, \
             max_review_iterations = $6, max_plan_revisions = $7, agents = $8, sandbox = $9 WHERE id = $1",
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(profile.tracker.to_string())
        .bind(profile.working_dir_root.to_string_lossy().to_string())
        .bind(profile.plan_output_dir.to_string_lossy().to_string())
        .bind(profile.max_review_iterations as i32)
        .bind(profile.max_plan_revisions as i32)
        .bind(serde_json::to_value(&profile.agents)?)
        .bind(serde_json::to_value(&profile.sandbox)?)
        .execute(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1").bind(id.as_str()).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get_settings(&self) -> Result<ServerSettings, StoreError> {
        let row = sqlx::query("SELECT data FROM server_settings WHERE id = 1").fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(serde_json::from_value(row.try_get("data")?)?),
            None => Ok(ServerSettings::default()),
        }
    }

    async fn update_settings(&self, settings: ServerSettings) -> Result<ServerSettings, StoreError> {
        sqlx::query(
            "INSERT INTO server_settings (id, data) VALUES (1, $1) \
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(serde_json::to_value(&settings)?)
        .execute(&self.pool)
        .await?;
        Ok(settings)
    }
}

fn row_to_profile(row: &sqlx::postgres::PgRow) -> Result<Profile, StoreError> {
    Ok(Profile {
        id: ProfileId::from_string(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        tracker: parse_tracker_kind(&row.try_get::<String, _>("tracker")?),
        working_dir_root: row.try_get::<String, _>("working_dir_root")?.into(),
        plan_output_dir: row.try_get::<String, _>("plan_output_dir")?.into(),
        max_review_iterations: row.try_get::<i32, _>("max_review_iterations")? as u32,
        max_plan_revisions: row.try_get::<i32, _>("max_plan_revisions")? as u32,
        agents: serde_json::from_value(row.try_get("agents")?)?,
        sandbox: serde_json::from_value(row.try_get("sandbox")?)?,
        is_active: row.try_get("is_active")?,
    })
}

fn parse_tracker_kind(s: &str) -> amelia_core::TrackerKind {
    use amelia_core::TrackerKind::*;
    match s {
        "github" => Github,
        "jira" => Jira,
        "linear" => Linear,
        _ => Noop,
    }
}

fn parse_event_level(s: &str) -> amelia_core::EventLevel {
    use amelia_core::EventLevel::*;
    match s {
        "trace" => Trace,
        "debug" => Debug,
        "warning" => Warning,
        "error" => Error,
        _ => Info,
    }
}

#[async_trait]
impl CheckpointStore for PgStore {
    async fn put_checkpoint(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO checkpoints (id, workflow_id, thread_id, next_node, state, created_at_ms) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(checkpoint.id.as_str())
        .bind(checkpoint.workflow_id.as_str())
        .bind(&checkpoint.thread_id)
        .bind(&checkpoint.next_node)
        .bind(&checkpoint.state)
        .bind(checkpoint.created_at_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_checkpoint(&self, workflow_id: WorkflowId, thread_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let row = sqlx::query(
            "SELECT * FROM checkpoints WHERE workflow_id = $1 AND thread_id = $2 ORDER BY created_at_ms DESC LIMIT 1",
        )
        .bind(workflow_id.as_str())
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| {
            Ok(Checkpoint {
                id: CheckpointId::from_string(row.try_get::<String, _>("id")?),
                workflow_id: WorkflowId::from_string(row.try_get::<String, _>("workflow_id")?),
                thread_id: row.try_get("thread_id")?,
                next_node: row.try_get("next_node")?,
                state: row.try_get("state")?,
                created_at_ms: row.try_get::<i64, _>("created_at_ms")? as u64,
            })
        })
        .transpose()
    }

    async fn delete_checkpoints_for_workflow(&self, workflow_id: WorkflowId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM checkpoints WHERE workflow_id = $1").bind(workflow_id.as_str()).execute(&self.pool).await?;
        Ok(())
    }
}
