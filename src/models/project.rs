use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgTransaction};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Project with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("No fields provided for update")]
    NoUpdateFields,
    #[error("Project has donations and cannot be deleted")]
    HasDonations,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: i64,
    pub raised_amount: i64,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<i64>,
    pub is_active: Option<bool>,
}

impl Project {
    pub async fn create(pool: &DbPool, project: CreateProject) -> Result<Self, ProjectError> {
        let now = Utc::now();

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, created_by, title, description, goal_amount, raised_amount, currency, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 0, $6, TRUE, $7, $8)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(project.created_by)
        .bind(project.title)
        .bind(project.description)
        .bind(project.goal_amount)
        .bind(project.currency)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, ProjectError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, ProjectError> {
        let projects =
            sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(projects)
    }

    pub async fn find_active(pool: &DbPool) -> Result<Vec<Self>, ProjectError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE is_active = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    pub async fn update(
        pool: &DbPool,
        id: Uuid,
        update_data: UpdateProject,
    ) -> Result<Self, ProjectError> {
        if update_data.title.is_none()
            && update_data.description.is_none()
            && update_data.goal_amount.is_none()
            && update_data.is_active.is_none()
        {
            return Err(ProjectError::NoUpdateFields);
        }

        let existing = match Self::find_by_id(pool, id).await? {
            Some(project) => project,
            None => return Err(ProjectError::NotFound { id }),
        };

        let now = Utc::now();

        let updated_project = sqlx::query_as::<_, Project>(
            "UPDATE projects
             SET title = $2, description = $3, goal_amount = $4, is_active = $5, updated_at = $6
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update_data.title.unwrap_or(existing.title))
        .bind(update_data.description.or(existing.description))
        .bind(update_data.goal_amount.unwrap_or(existing.goal_amount))
        .bind(update_data.is_active.unwrap_or(existing.is_active))
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(updated_project)
    }

    pub async fn delete(pool: &DbPool, id: Uuid) -> Result<(), ProjectError> {
        let donation_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE project_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if donation_count > 0 {
            return Err(ProjectError::HasDonations);
        }

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProjectError::NotFound { id });
        }

        Ok(())
    }

    /// Adds a confirmed donation to the project's running total.
    ///
    /// Runs inside the verification transaction so the increment commits
    /// together with the donation's status change, never on its own.
    pub async fn increment_raised(
        tx: &mut PgTransaction<'_>,
        id: Uuid,
        amount: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET raised_amount = raised_amount + $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(amount)
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
