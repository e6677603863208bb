use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

use super::attendance::remove_for_sites;

use crate::domain::SiteStatus;
use crate::entities::{prelude::*, sites};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub status: SiteStatus,
    pub project_id: i32,
    pub supervisor_id: Option<i32>,
    pub progress: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<sites::Model> for Site {
    type Error = anyhow::Error;

    fn try_from(m: sites::Model) -> Result<Self> {
        Ok(Self {
            status: m.status.parse()?,
            id: m.id,
            name: m.name,
            location: m.location,
            description: m.description,
            project_id: m.project_id,
            supervisor_id: m.supervisor_id,
            progress: m.progress,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewSite {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub status: SiteStatus,
    pub project_id: i32,
    pub supervisor_id: Option<i32>,
    pub progress: i32,
}

pub struct SiteRepository {
    conn: DatabaseConnection,
}

impl SiteRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, project_id: Option<i32>) -> Result<Vec<Site>> {
        let mut query = Sites::find();
        if let Some(project_id) = project_id {
            query = query.filter(sites::Column::ProjectId.eq(project_id));
        }

        query
            .order_by_desc(sites::Column::CreatedAt)
            .order_by_desc(sites::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list sites")?
            .into_iter()
            .map(Site::try_from)
            .collect()
    }

    pub async fn get(&self, id: i32) -> Result<Option<Site>> {
        Sites::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query site")?
            .map(Site::try_from)
            .transpose()
    }

    pub async fn create(&self, site: NewSite) -> Result<Site> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active = Self::to_active(site);
        active.created_at = Set(now.clone());
        active.updated_at = Set(now);

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert site")?;

        Site::try_from(model)
    }

    pub async fn update(&self, id: i32, site: NewSite) -> Result<Option<Site>> {
        let Some(existing) = Sites::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query site for update")?
        else {
            return Ok(None);
        };

        let mut active = Self::to_active(site);
        active.id = Set(existing.id);
        active.created_at = Set(existing.created_at);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update site")?;

        Site::try_from(model).map(Some)
    }

    /// Deletes the site with its attendance rows. Today's rows are taken
    /// out of the employee aggregate in the same transaction.
    pub async fn delete(&self, id: i32, today: NaiveDate) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin site transaction")?;

        if Sites::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query site for delete")?
            .is_none()
        {
            return Ok(false);
        }

        let released = remove_for_sites(&txn, &[id], today).await?;

        Sites::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete site")?;

        txn.commit()
            .await
            .context("Failed to commit site transaction")?;

        debug!(site_id = id, attendance_rows = released, "Removed site attendance");
        Ok(true)
    }

    fn to_active(site: NewSite) -> sites::ActiveModel {
        sites::ActiveModel {
            name: Set(site.name),
            location: Set(site.location),
            description: Set(site.description),
            status: Set(site.status.as_str().to_string()),
            project_id: Set(site.project_id),
            supervisor_id: Set(site.supervisor_id),
            progress: Set(site.progress),
            ..Default::default()
        }
    }
}
