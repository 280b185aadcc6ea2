use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contract::model::{Appointment, Customer, ServiceItem, SlotTime};
use crate::domain::slots::parse_date;
use crate::infra::storage::entity::Model as AppointmentEntity;

/// JSON shape of one service inside the `services` column.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredService {
    name: String,
    duration_minutes: u32,
    price: Decimal,
}

pub fn services_to_json(services: &[ServiceItem]) -> anyhow::Result<serde_json::Value> {
    let stored: Vec<StoredService> = services
        .iter()
        .map(|s| StoredService {
            name: s.name.clone(),
            duration_minutes: s.duration_minutes,
            price: s.price,
        })
        .collect();
    serde_json::to_value(stored).context("serialize services")
}

/// Convert a database entity to a contract model
pub fn entity_to_contract(entity: AppointmentEntity) -> anyhow::Result<Appointment> {
    let date = parse_date(&entity.date).map_err(|e| anyhow!("row {}: {e}", entity.id))?;
    let start_time: SlotTime = entity
        .start_time
        .parse()
        .map_err(|e| anyhow!("row {}: {e}", entity.id))?;
    let services: Vec<StoredService> =
        serde_json::from_value(entity.services).context("deserialize services")?;
    let total_price: Decimal = entity
        .total_price
        .parse()
        .with_context(|| format!("row {}: bad total_price", entity.id))?;

    Ok(Appointment {
        id: entity.id,
        date,
        start_time,
        duration_minutes: u32::try_from(entity.duration_minutes)
            .with_context(|| format!("row {}: negative duration", entity.id))?,
        services: services
            .into_iter()
            .map(|s| ServiceItem {
                name: s.name,
                duration_minutes: s.duration_minutes,
                price: s.price,
            })
            .collect(),
        total_price,
        ticket_number: u64::try_from(entity.ticket_number)
            .with_context(|| format!("row {}: negative ticket number", entity.id))?,
        customer: Customer {
            name: entity.customer_name,
            phone: entity.customer_phone,
            email: entity.customer_email,
        },
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    })
}
