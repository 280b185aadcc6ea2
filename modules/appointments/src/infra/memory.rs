//! In-process repository backed by a `DashMap`; used by `--mock` runs and
//! by tests that do not need SQL.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::contract::model::Appointment;
use crate::domain::repo::{AppointmentRecord, AppointmentUpdate, AppointmentsRepository};

#[derive(Debug, Default)]
pub struct InMemoryAppointmentsRepository {
    rows: DashMap<Uuid, Appointment>,
    ticket_seq: AtomicU64,
}

impl InMemoryAppointmentsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl AppointmentsRepository for InMemoryAppointmentsRepository {
    async fn find_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Appointment>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Appointment>> {
        Ok(self.rows.get(&id).map(|r| r.value().clone()))
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Appointment>> {
        Ok(self.rows.iter().map(|r| r.value().clone()).collect())
    }

    async fn insert(&self, record: AppointmentRecord) -> anyhow::Result<Appointment> {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: record.date,
            start_time: record.start_time,
            duration_minutes: record.duration_minutes,
            services: record.services,
            total_price: record.total_price,
            ticket_number: record.ticket_number,
            customer: record.customer,
            created_at: now,
            updated_at: now,
        };
        // keep the sequence ahead of externally chosen ticket numbers
        self.ticket_seq
            .fetch_max(appointment.ticket_number, Ordering::SeqCst);
        self.rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(
        &self,
        id: Uuid,
        update: AppointmentUpdate,
    ) -> anyhow::Result<Option<Appointment>> {
        let Some(mut row) = self.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = update.customer_name {
            row.customer.name = name;
        }
        if let Some(date) = update.date {
            row.date = date;
        }
        if let Some(start_time) = update.start_time {
            row.start_time = start_time;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Appointment>> {
        Ok(self.rows.remove(&id).map(|(_, a)| a))
    }

    async fn max_ticket_number(&self) -> anyhow::Result<u64> {
        Ok(self
            .rows
            .iter()
            .map(|r| r.ticket_number)
            .max()
            .unwrap_or(0))
    }

    async fn next_ticket_number(&self) -> anyhow::Result<u64> {
        Ok(self.ticket_seq.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{Customer, SlotTime};
    use rust_decimal::Decimal;

    fn record(ticket_number: u64, start: &str) -> AppointmentRecord {
        AppointmentRecord {
            date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            start_time: start.parse::<SlotTime>().unwrap(),
            duration_minutes: 30,
            services: vec![],
            total_price: Decimal::ZERO,
            ticket_number,
            customer: Customer {
                name: "Meera".into(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn ticket_sequence_survives_deletes() {
        let repo = InMemoryAppointmentsRepository::new();
        assert_eq!(repo.next_ticket_number().await.unwrap(), 1);
        let a = repo.insert(record(1, "10:00")).await.unwrap();
        repo.delete(a.id).await.unwrap();
        assert_eq!(repo.max_ticket_number().await.unwrap(), 0);
        assert_eq!(repo.next_ticket_number().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn inserted_ticket_pushes_sequence_forward() {
        let repo = InMemoryAppointmentsRepository::new();
        repo.insert(record(41, "10:00")).await.unwrap();
        assert_eq!(repo.next_ticket_number().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids() {
        let repo = InMemoryAppointmentsRepository::new();
        let missing = Uuid::new_v4();
        assert!(repo
            .update(missing, AppointmentUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert!(repo.delete(missing).await.unwrap().is_none());

        let a = repo.insert(record(1, "10:00")).await.unwrap();
        let moved = repo
            .update(
                a.id,
                AppointmentUpdate {
                    start_time: Some("11:30".parse().unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.start_time.to_string(), "11:30");
        assert_eq!(moved.customer.name, "Meera");
        assert_eq!(repo.len(), 1);
    }
}
