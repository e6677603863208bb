use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

use super::attendance::remove_for_sites;
use crate::domain::ProjectStatus;
use crate::entities::{prelude::*, projects, sites};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: f64,
    pub description: Option<String>,
    pub supervisor_id: Option<i32>,
    pub status: ProjectStatus,
    pub progress: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<projects::Model> for Project {
    type Error = anyhow::Error;

    fn try_from(m: projects::Model) -> Result<Self> {
        Ok(Self {
            status: m.status.parse()?,
            id: m.id,
            name: m.name,
            location: m.location,
            start_date: m.start_date,
            end_date: m.end_date,
            budget: m.budget,
            description: m.description,
            supervisor_id: m.supervisor_id,
            progress: m.progress,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Validated project fields, used for both create and full update.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: f64,
    pub description: Option<String>,
    pub supervisor_id: Option<i32>,
    pub status: ProjectStatus,
    pub progress: i32,
}

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        Projects::find()
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list projects")?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }

    pub async fn get(&self, id: i32) -> Result<Option<Project>> {
        Projects::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query project")?
            .map(Project::try_from)
            .transpose()
    }

    pub async fn create(&self, project: NewProject) -> Result<Project> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active = Self::to_active(project);
        active.created_at = Set(now.clone());
        active.updated_at = Set(now);

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert project")?;

        Project::try_from(model)
    }

    pub async fn update(&self, id: i32, project: NewProject) -> Result<Option<Project>> {
        let Some(existing) = Projects::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query project for update")?
        else {
            return Ok(None);
        };

        let mut active = Self::to_active(project);
        active.id = Set(existing.id);
        active.created_at = Set(existing.created_at);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update project")?;

        Project::try_from(model).map(Some)
    }

    /// Deletes the project, its sites and their attendance rows in one
    /// transaction, releasing today's hours from the employee aggregate.
    pub async fn delete(&self, id: i32, today: NaiveDate) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin project transaction")?;

        if Projects::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query project for delete")?
            .is_none()
        {
            return Ok(false);
        }

        let site_ids: Vec<i32> = Sites::find()
            .select_only()
            .column(sites::Column::Id)
            .filter(sites::Column::ProjectId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .context("Failed to list project sites")?;

        let released = remove_for_sites(&txn, &site_ids, today).await?;

        Sites::delete_many()
            .filter(sites::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete project sites")?;

        Projects::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete project")?;

        txn.commit()
            .await
            .context("Failed to commit project transaction")?;

        debug!(
            project_id = id,
            sites = site_ids.len(),
            attendance_rows = released,
            "Removed project sites and attendance"
        );
        Ok(true)
    }

    fn to_active(project: NewProject) -> projects::ActiveModel {
        projects::ActiveModel {
            name: Set(project.name),
            location: Set(project.location),
            start_date: Set(project.start_date),
            end_date: Set(project.end_date),
            budget: Set(project.budget),
            description: Set(project.description),
            supervisor_id: Set(project.supervisor_id),
            status: Set(project.status.as_str().to_string()),
            progress: Set(project.progress),
            ..Default::default()
        }
    }
}
