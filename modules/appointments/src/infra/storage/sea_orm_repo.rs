//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over the connection so it can run on a `DatabaseConnection` or
//! inside a caller-owned transaction.

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::Appointment;
use crate::domain::repo::{AppointmentRecord, AppointmentUpdate, AppointmentsRepository};
use crate::infra::storage::entity::{ActiveModel as AppointmentAM, Column, Entity as AppointmentEntity};
use crate::infra::storage::mapper::{entity_to_contract, services_to_json};
use crate::infra::storage::ticket_sequence::{self, SEQUENCE_ROW};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmAppointmentsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAppointmentsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn to_contract_all(rows: Vec<crate::infra::storage::entity::Model>) -> anyhow::Result<Vec<Appointment>> {
    rows.into_iter().map(entity_to_contract).collect()
}

async fn max_ticket<C: ConnectionTrait>(conn: &C) -> anyhow::Result<i64> {
    let max: Option<Option<i64>> = AppointmentEntity::find()
        .select_only()
        .column_as(Column::TicketNumber.max(), "max_ticket")
        .into_tuple()
        .one(conn)
        .await
        .context("max_ticket_number failed")?;
    Ok(max.flatten().unwrap_or(0))
}

#[async_trait::async_trait]
impl<C> AppointmentsRepository for SeaOrmAppointmentsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Appointment>> {
        let rows = AppointmentEntity::find()
            .filter(Column::Date.eq(date.format("%Y-%m-%d").to_string()))
            .all(&self.conn)
            .await
            .context("find_by_date failed")?;
        to_contract_all(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Appointment>> {
        let found = AppointmentEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(entity_to_contract).transpose()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Appointment>> {
        let rows = AppointmentEntity::find()
            .all(&self.conn)
            .await
            .context("list_all failed")?;
        to_contract_all(rows)
    }

    async fn insert(&self, r: AppointmentRecord) -> anyhow::Result<Appointment> {
        let now = Utc::now();
        let m = AppointmentAM {
            id: Set(Uuid::new_v4()),
            date: Set(r.date.format("%Y-%m-%d").to_string()),
            start_time: Set(r.start_time.to_string()),
            duration_minutes: Set(i32::try_from(r.duration_minutes).context("duration overflow")?),
            services: Set(services_to_json(&r.services)?),
            total_price: Set(r.total_price.to_string()),
            ticket_number: Set(i64::try_from(r.ticket_number).context("ticket overflow")?),
            customer_name: Set(r.customer.name),
            customer_phone: Set(r.customer.phone),
            customer_email: Set(r.customer.email),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = m.insert(&self.conn).await.context("insert failed")?;
        entity_to_contract(inserted)
    }

    async fn update(
        &self,
        id: Uuid,
        update: AppointmentUpdate,
    ) -> anyhow::Result<Option<Appointment>> {
        if AppointmentEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update lookup failed")?
            .is_none()
        {
            return Ok(None);
        }

        let mut m = AppointmentAM {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = update.customer_name {
            m.customer_name = Set(name);
        }
        if let Some(date) = update.date {
            m.date = Set(date.format("%Y-%m-%d").to_string());
        }
        if let Some(start_time) = update.start_time {
            m.start_time = Set(start_time.to_string());
        }
        let updated = m.update(&self.conn).await.context("update failed")?;
        entity_to_contract(updated).map(Some)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Appointment>> {
        let Some(found) = AppointmentEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("delete lookup failed")?
        else {
            return Ok(None);
        };
        let res = AppointmentEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        entity_to_contract(found).map(Some)
    }

    async fn max_ticket_number(&self) -> anyhow::Result<u64> {
        let max = max_ticket(&self.conn).await?;
        u64::try_from(max).context("negative ticket number")
    }

    /// Write-first increment of the counter row so concurrent callers queue
    /// on the row lock instead of racing on a read.
    async fn next_ticket_number(&self) -> anyhow::Result<u64> {
        let txn = self.conn.begin().await.context("begin ticket txn")?;

        let bumped = ticket_sequence::Entity::update_many()
            .col_expr(
                ticket_sequence::Column::Value,
                Expr::col(ticket_sequence::Column::Value).add(1),
            )
            .filter(ticket_sequence::Column::Id.eq(SEQUENCE_ROW))
            .exec(&txn)
            .await
            .context("bump ticket sequence")?;

        let floor = max_ticket(&txn).await?;
        let next = if bumped.rows_affected == 0 {
            let next = floor + 1;
            ticket_sequence::ActiveModel {
                id: Set(SEQUENCE_ROW),
                value: Set(next),
            }
            .insert(&txn)
            .await
            .context("seed ticket sequence")?;
            next
        } else {
            let row = ticket_sequence::Entity::find_by_id(SEQUENCE_ROW)
                .one(&txn)
                .await
                .context("read ticket sequence")?
                .context("ticket sequence row vanished")?;
            if row.value <= floor {
                // rows imported behind the counter's back
                let next = floor + 1;
                ticket_sequence::ActiveModel {
                    id: Set(SEQUENCE_ROW),
                    value: Set(next),
                }
                .update(&txn)
                .await
                .context("advance ticket sequence")?;
                next
            } else {
                row.value
            }
        };

        txn.commit().await.context("commit ticket txn")?;
        u64::try_from(next).context("negative ticket number")
    }
}
