use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `expense` or `income`
    pub payment_type: String,
    pub amount: f64,
    /// Recipient name or id as entered; not a foreign key.
    pub recipient: String,
    pub recipient_type: String,
    pub category: String,
    pub description: Option<String>,
    pub date: String,
    pub payment_method: String,
    pub reference: Option<String>,
    pub status: String,
    pub project_reference: Option<String>,
    pub site_reference: Option<String>,
    /// Snapshot of the employee's position at write time.
    pub position: Option<String>,
    /// Snapshot of the employee's category at write time.
    pub employee_type: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
