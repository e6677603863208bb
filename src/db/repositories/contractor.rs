use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;

use crate::domain::{Availability, ContractorStatus, Specialization};
use crate::entities::{contractors, prelude::*};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub specialization: Specialization,
    pub tin: String,
    pub license: String,
    pub address: Option<String>,
    pub rate: f64,
    pub status: ContractorStatus,
    pub availability: Availability,
    pub active_project_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<contractors::Model> for Contractor {
    type Error = anyhow::Error;

    fn try_from(m: contractors::Model) -> Result<Self> {
        Ok(Self {
            specialization: m.specialization.parse()?,
            status: m.status.parse()?,
            availability: m.availability.parse()?,
            id: m.id,
            name: m.name,
            phone: m.phone,
            email: m.email,
            tin: m.tin,
            license: m.license,
            address: m.address,
            rate: m.rate,
            active_project_id: m.active_project_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewContractor {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub specialization: Specialization,
    pub tin: String,
    pub license: String,
    pub address: Option<String>,
    pub rate: f64,
    pub status: ContractorStatus,
    pub availability: Availability,
    pub active_project_id: Option<i32>,
}

/// Unique contractor field already held by another contractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractorConflict {
    Email,
    Tin,
    License,
}

impl ContractorConflict {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Email => "Contractor email already registered",
            Self::Tin => "Contractor TIN already registered",
            Self::License => "Contractor license already registered",
        }
    }
}

pub struct ContractorRepository {
    conn: DatabaseConnection,
}

impl ContractorRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Contractor>> {
        Contractors::find()
            .order_by_desc(contractors::Column::CreatedAt)
            .order_by_desc(contractors::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list contractors")?
            .into_iter()
            .map(Contractor::try_from)
            .collect()
    }

    pub async fn get(&self, id: i32) -> Result<Option<Contractor>> {
        Contractors::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query contractor")?
            .map(Contractor::try_from)
            .transpose()
    }

    /// Reports which unique field of `contractor` is already taken.
    pub async fn find_conflict(
        &self,
        contractor: &NewContractor,
    ) -> Result<Option<ContractorConflict>> {
        let Some(existing) = Contractors::find()
            .filter(
                Condition::any()
                    .add(contractors::Column::Email.eq(&contractor.email))
                    .add(contractors::Column::Tin.eq(&contractor.tin))
                    .add(contractors::Column::License.eq(&contractor.license)),
            )
            .one(&self.conn)
            .await
            .context("Failed to check contractor uniqueness")?
        else {
            return Ok(None);
        };

        let conflict = if existing.email == contractor.email {
            ContractorConflict::Email
        } else if existing.tin == contractor.tin {
            ContractorConflict::Tin
        } else {
            ContractorConflict::License
        };
        Ok(Some(conflict))
    }

    pub async fn create(&self, contractor: NewContractor) -> Result<Contractor> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = contractors::ActiveModel {
            name: Set(contractor.name),
            phone: Set(contractor.phone),
            email: Set(contractor.email),
            specialization: Set(contractor.specialization.as_str().to_string()),
            tin: Set(contractor.tin),
            license: Set(contractor.license),
            address: Set(contractor.address),
            rate: Set(contractor.rate),
            status: Set(contractor.status.as_str().to_string()),
            availability: Set(contractor.availability.as_str().to_string()),
            active_project_id: Set(contractor.active_project_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert contractor")?;

        Contractor::try_from(model)
    }
}
