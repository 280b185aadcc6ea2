#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use appointments::contract::model::{Customer, NewAppointment, ServiceItem};
use appointments::domain::events::SlotsDomainEvent;
use appointments::domain::ports::{Clock, EventPublisher};
use appointments::domain::service::{Service, ServiceConfig};
use appointments::infra::memory::InMemoryAppointmentsRepository;

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now_local(&self) -> NaiveDateTime {
        self.0
    }
}

/// Clock a test can move forward between calls.
#[derive(Debug)]
pub struct SteppingClock(Mutex<NaiveDateTime>);

impl SteppingClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for SteppingClock {
    fn now_local(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

/// Publisher that keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<SlotsDomainEvent>>,
}

impl RecordingPublisher {
    pub fn taken(&self) -> Vec<SlotsDomainEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl EventPublisher<SlotsDomainEvent> for RecordingPublisher {
    fn publish(&self, event: &SlotsDomainEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
}

/// 2030-01-01 08:00, before opening on the first test day.
pub fn morning_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(day(1).and_hms_opt(8, 0, 0).unwrap()))
}

pub fn service(name: &str, minutes: u32, price: i64) -> ServiceItem {
    ServiceItem {
        name: name.to_string(),
        duration_minutes: minutes,
        price: Decimal::from(price),
    }
}

pub fn booking(date: NaiveDate, time: &str, services: Vec<ServiceItem>) -> NewAppointment {
    NewAppointment {
        date,
        start_time: time.parse().unwrap(),
        services,
        total_price: None,
        customer: Customer {
            name: "Priya".to_string(),
            phone: "555-0100".to_string(),
            email: "priya@example.com".to_string(),
        },
    }
}

/// In-memory service with a recording publisher.
pub fn memory_service(config: ServiceConfig) -> (Service, Arc<RecordingPublisher>) {
    let events = Arc::new(RecordingPublisher::default());
    let svc = Service::new(
        Arc::new(InMemoryAppointmentsRepository::new()),
        events.clone(),
        morning_clock(),
        config,
    );
    (svc, events)
}
