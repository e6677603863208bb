use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Serialize;

use crate::domain::{SupplierCategory, SupplierStatus};
use crate::entities::{prelude::*, suppliers};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub category: SupplierCategory,
    pub products: String,
    pub tin: String,
    pub website: Option<String>,
    pub status: SupplierStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<suppliers::Model> for Supplier {
    type Error = anyhow::Error;

    fn try_from(m: suppliers::Model) -> Result<Self> {
        Ok(Self {
            category: m.category.parse()?,
            status: m.status.parse()?,
            id: m.id,
            name: m.name,
            phone: m.phone,
            email: m.email,
            address: m.address,
            products: m.products,
            tin: m.tin,
            website: m.website,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Validated supplier fields, used for both create and full update.
#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub category: SupplierCategory,
    pub products: String,
    pub tin: String,
    pub website: Option<String>,
    pub status: SupplierStatus,
}

pub struct SupplierRepository {
    conn: DatabaseConnection,
}

impl SupplierRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>> {
        Suppliers::find()
            .order_by_asc(suppliers::Column::Name)
            .order_by_asc(suppliers::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list suppliers")?
            .into_iter()
            .map(Supplier::try_from)
            .collect()
    }

    pub async fn get(&self, id: i32) -> Result<Option<Supplier>> {
        Suppliers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query supplier")?
            .map(Supplier::try_from)
            .transpose()
    }

    pub async fn create(&self, supplier: NewSupplier) -> Result<Supplier> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut active = Self::to_active(supplier);
        active.created_at = Set(now.clone());
        active.updated_at = Set(now);

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert supplier")?;

        Supplier::try_from(model)
    }

    pub async fn update(&self, id: i32, supplier: NewSupplier) -> Result<Option<Supplier>> {
        let Some(existing) = Suppliers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query supplier for update")?
        else {
            return Ok(None);
        };

        let mut active = Self::to_active(supplier);
        active.id = Set(existing.id);
        active.created_at = Set(existing.created_at);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update supplier")?;

        Supplier::try_from(model).map(Some)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Suppliers::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete supplier")?;

        Ok(result.rows_affected > 0)
    }

    fn to_active(supplier: NewSupplier) -> suppliers::ActiveModel {
        suppliers::ActiveModel {
            name: Set(supplier.name),
            phone: Set(supplier.phone),
            email: Set(supplier.email),
            address: Set(supplier.address),
            category: Set(supplier.category.as_str().to_string()),
            products: Set(supplier.products),
            tin: Set(supplier.tin),
            website: Set(supplier.website),
            status: Set(supplier.status.as_str().to_string()),
            ..Default::default()
        }
    }
}
