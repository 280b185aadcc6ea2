use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::rest::legacy::parse_legacy_service;
use crate::contract::model::{Appointment, AppointmentPatch, Customer, NewAppointment, ServiceItem};
use crate::domain::catalog::{CatalogService, Quote};
use crate::domain::error::DomainError;
use crate::domain::events::SlotsDomainEvent;
use crate::domain::slots::{parse_date, SlotTime};

/// One salon service with its duration and price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItemDto {
    pub name: String,
    pub duration_minutes: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
}

/// A requested service: structured, or a legacy display string such as
/// `"Facial (45 mins) - ₹400"`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ServiceReq {
    Structured(ServiceItemDto),
    Legacy(String),
}

/// REST DTO for booking an appointment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentReq {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24h
    pub time: String,
    pub services: Vec<ServiceReq>,
    /// Explicit quote; defaults to the sum of the service prices.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub total_price: Option<Decimal>,
}

/// REST DTO for a staff edit (partial)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentReq {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// REST DTO for appointment representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: Uuid,
    pub date: String,
    pub time: String,
    pub duration_minutes: u32,
    pub services: Vec<ServiceItemDto>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub ticket_number: u64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListDto {
    pub appointments: Vec<AppointmentDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsDto {
    pub date: String,
    pub available_slots: Vec<String>,
}

/// Query for `GET /slots/available`
#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

/// Query for `GET /appointments`
#[derive(Debug, Clone, Deserialize)]
pub struct ListAppointmentsQuery {
    pub date: Option<String>,
}

/// A menu entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogServiceDto {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalogDto {
    pub services: Vec<CatalogServiceDto>,
}

/// Query for `GET /services/calculate-price`: comma-separated menu ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub selected_services: Option<String>,
}

/// Totals for a selection of menu ids
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteDto {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub total_duration: u32,
    pub services: Vec<CatalogServiceDto>,
    /// Ids not on the menu; they add nothing to the totals.
    pub unknown_services: Vec<String>,
}

/// Live slots update. A refresh hint: clients that see a gap in `seq`
/// should re-fetch the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(title = "SlotsEvent", description = "Server-sent slots update")]
pub struct SlotsEvent {
    pub seq: u64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<Vec<String>>,
    pub at: DateTime<Utc>,
}

impl SlotsEvent {
    pub fn from_domain(seq: u64, e: &SlotsDomainEvent) -> Self {
        Self {
            seq,
            date: e.date.format("%Y-%m-%d").to_string(),
            available_slots: e
                .available_slots
                .as_ref()
                .map(|slots| slots.iter().map(SlotTime::to_string).collect()),
            at: e.at,
        }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<CatalogService> for CatalogServiceDto {
    fn from(s: CatalogService) -> Self {
        Self {
            id: s.id,
            name: s.item.name,
            duration_minutes: s.item.duration_minutes,
            price: s.item.price,
        }
    }
}

impl From<Quote> for PriceQuoteDto {
    fn from(q: Quote) -> Self {
        Self {
            total_price: q.totals.price,
            total_duration: q.totals.duration_minutes,
            services: q.services.into_iter().map(Into::into).collect(),
            unknown_services: q.unknown,
        }
    }
}

impl From<ServiceItem> for ServiceItemDto {
    fn from(s: ServiceItem) -> Self {
        Self {
            name: s.name,
            duration_minutes: s.duration_minutes,
            price: s.price,
        }
    }
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            date: a.date.format("%Y-%m-%d").to_string(),
            time: a.start_time.to_string(),
            duration_minutes: a.duration_minutes,
            services: a.services.into_iter().map(ServiceItemDto::from).collect(),
            total_price: a.total_price,
            ticket_number: a.ticket_number,
            name: a.customer.name,
            phone: a.customer.phone,
            email: a.customer.email,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl TryFrom<BookAppointmentReq> for NewAppointment {
    type Error = DomainError;

    fn try_from(req: BookAppointmentReq) -> Result<Self, Self::Error> {
        let date = parse_date(req.date.trim())?;
        let start_time: SlotTime = req.time.trim().parse()?;
        let services = req
            .services
            .into_iter()
            .enumerate()
            .map(|(i, s)| match s {
                ServiceReq::Structured(dto) => Ok(ServiceItem {
                    name: dto.name,
                    duration_minutes: dto.duration_minutes,
                    price: dto.price,
                }),
                ServiceReq::Legacy(raw) => parse_legacy_service(&raw, &format!("services[{i}]")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            date,
            start_time,
            services,
            total_price: req.total_price,
            customer: Customer {
                name: req.name,
                phone: req.phone,
                email: req.email,
            },
        })
    }
}

impl TryFrom<UpdateAppointmentReq> for AppointmentPatch {
    type Error = DomainError;

    fn try_from(req: UpdateAppointmentReq) -> Result<Self, Self::Error> {
        Ok(Self {
            customer_name: req.name,
            date: req.date.as_deref().map(str::trim).map(parse_date).transpose()?,
            start_time: req
                .time
                .as_deref()
                .map(|t| t.trim().parse::<SlotTime>())
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::SlotChange;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn booking_accepts_mixed_service_shapes() {
        let req: BookAppointmentReq = serde_json::from_value(serde_json::json!({
            "name": "Asha",
            "phone": "555-0100",
            "email": "asha@example.com",
            "date": "2030-03-04",
            "time": "11:00",
            "services": [
                { "name": "Cut", "durationMinutes": 30, "price": 250 },
                "Facial (45 mins) - ₹400"
            ]
        }))
        .unwrap();
        let new = NewAppointment::try_from(req).unwrap();
        assert_eq!(new.start_time.to_string(), "11:00");
        assert_eq!(new.services.len(), 2);
        assert_eq!(new.services[1].duration_minutes, 45);
        assert_eq!(new.total_price, None);
        assert_eq!(new.customer.name, "Asha");
    }

    #[test]
    fn booking_rejects_bad_date_shape() {
        let req = BookAppointmentReq {
            name: "A".into(),
            phone: "1".into(),
            email: "a@b.c".into(),
            date: "04/03/2030".into(),
            time: "11:00".into(),
            services: vec![],
            total_price: None,
        };
        assert!(matches!(
            NewAppointment::try_from(req),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn patch_parses_only_present_fields() {
        let patch = AppointmentPatch::try_from(UpdateAppointmentReq {
            time: Some("12:30".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(patch.moves());
        assert_eq!(patch.date, None);
        assert_eq!(patch.start_time.unwrap().to_string(), "12:30");
    }

    #[test]
    fn appointment_dto_is_camel_case() {
        let a = Appointment {
            id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2030, 3, 4).unwrap(),
            start_time: "11:00".parse().unwrap(),
            duration_minutes: 45,
            services: vec![ServiceItem {
                name: "Facial".into(),
                duration_minutes: 45,
                price: Decimal::from(400),
            }],
            total_price: Decimal::from(400),
            ticket_number: 7,
            customer: Customer {
                name: "Asha".into(),
                phone: "555".into(),
                email: "a@b.c".into(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let v = serde_json::to_value(AppointmentDto::from(a)).unwrap();
        assert_eq!(v["ticketNumber"], 7);
        assert_eq!(v["time"], "11:00");
        assert_eq!(v["totalPrice"], 400.0);
        assert_eq!(v["services"][0]["durationMinutes"], 45);
    }

    #[test]
    fn maps_domain_event_to_transport() {
        let at = Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap();
        let e = SlotsDomainEvent {
            date: NaiveDate::from_ymd_opt(2030, 3, 4).unwrap(),
            available_slots: Some(vec!["10:00".parse().unwrap(), "10:30".parse().unwrap()]),
            cause: SlotChange::Booked,
            at,
        };
        let out = SlotsEvent::from_domain(3, &e);
        assert_eq!(out.seq, 3);
        assert_eq!(out.date, "2030-03-04");
        assert_eq!(out.available_slots, Some(vec!["10:00".into(), "10:30".into()]));
        assert_eq!(out.at, at);

        let bare = SlotsEvent::from_domain(4, &SlotsDomainEvent { available_slots: None, ..e });
        let v = serde_json::to_value(bare).unwrap();
        assert!(v.get("availableSlots").is_none());
    }
}
