use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Stored appointment row. `date` and `start_time` keep their wire shapes
/// (`YYYY-MM-DD`, `HH:MM`); money is stored as decimal text.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: String,
    pub start_time: String,
    pub duration_minutes: i32,
    pub services: Json,
    pub total_price: String,
    #[sea_orm(unique)]
    pub ticket_number: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
