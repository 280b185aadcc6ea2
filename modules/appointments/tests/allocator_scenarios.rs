//! Booking rules exercised against the in-memory store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use appointments::contract::model::{Appointment, AppointmentPatch};
use appointments::domain::error::DomainError;
use appointments::domain::events::SlotChange;
use appointments::domain::ports::NoopPublisher;
use appointments::domain::repo::{AppointmentRecord, AppointmentUpdate, AppointmentsRepository};
use appointments::domain::service::{Service, ServiceConfig};
use appointments::domain::slots::{OperatingHours, SlotTime};
use appointments::infra::memory::InMemoryAppointmentsRepository;

use common::{booking, day, memory_service, morning_clock, service, SteppingClock};

fn times(slots: &[SlotTime]) -> Vec<String> {
    slots.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn empty_day_offers_every_half_hour() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let slots = times(&svc.list_available_slots(day(2)).await?);
    assert_eq!(slots.len(), 22);
    assert_eq!(slots.first().map(String::as_str), Some("10:00"));
    assert_eq!(slots.last().map(String::as_str), Some("20:30"));
    Ok(())
}

#[tokio::test]
async fn facial_blocks_two_starts_and_cancel_restores_them() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());

    let facial = svc
        .try_book(booking(day(2), "11:00", vec![service("Facial", 45, 400)]))
        .await?;
    assert_eq!(facial.duration_minutes, 45);

    let slots = times(&svc.list_available_slots(day(2)).await?);
    assert!(!slots.contains(&"11:00".to_string()));
    assert!(!slots.contains(&"11:30".to_string()));
    assert!(slots.contains(&"12:00".to_string()));
    assert!(slots.contains(&"10:30".to_string()));

    let err = svc
        .try_book(booking(day(2), "11:15", vec![service("Manicure", 45, 300)]))
        .await
        .unwrap_err();
    match err {
        DomainError::Conflict { conflicting_id, .. } => assert_eq!(conflicting_id, facial.id),
        other => panic!("expected conflict, got {other:?}"),
    }

    svc.cancel(facial.id).await?;
    let slots = times(&svc.list_available_slots(day(2)).await?);
    assert_eq!(slots.len(), 22);
    Ok(())
}

#[tokio::test]
async fn touching_bookings_are_both_accepted() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    svc.try_book(booking(day(2), "10:00", vec![service("Cut", 30, 200)]))
        .await?;
    svc.try_book(booking(day(2), "10:30", vec![service("Cut", 30, 200)]))
        .await?;

    let earlier = svc
        .try_book(booking(day(2), "09:30", vec![service("Cut", 30, 200)]))
        .await;
    assert!(matches!(earlier, Err(DomainError::OutsideOperatingHours { .. })));
    Ok(())
}

#[tokio::test]
async fn reading_twice_gives_the_same_answer() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    svc.try_book(booking(day(2), "14:00", vec![service("Spa", 90, 1200)]))
        .await?;
    let a = svc.list_available_slots(day(2)).await?;
    let b = svc.list_available_slots(day(2)).await?;
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn concurrent_bookings_for_one_slot_admit_exactly_one() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let svc = Arc::new(svc);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.try_book(booking(day(3), "15:00", vec![service("Color", 60, 900)]))
                .await
        }));
    }

    let mut booked = 0;
    let mut conflicts = 0;
    for h in handles {
        match h.await? {
            Ok(_) => booked += 1,
            Err(DomainError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(booked, 1);
    assert_eq!(conflicts, 15);

    let stored = svc.list_appointments(Some(day(3))).await?;
    assert_eq!(stored.len(), 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_overlapping_starts_never_both_land() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let svc = Arc::new(svc);

    let starts = ["12:00", "12:15", "12:30", "12:45"];
    let mut handles = Vec::new();
    for start in starts {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.try_book(booking(day(4), start, vec![service("Massage", 60, 800)]))
                .await
        }));
    }
    for h in handles {
        let _ = h.await?;
    }

    let stored = svc.list_appointments(Some(day(4))).await?;
    for (i, a) in stored.iter().enumerate() {
        for b in stored.iter().skip(i + 1) {
            assert!(
                !a.interval().overlaps(&b.interval()),
                "{} and {} overlap",
                a.start_time,
                b.start_time
            );
        }
    }
    assert!(!stored.is_empty());
    Ok(())
}

#[tokio::test]
async fn reschedule_ignores_the_moving_appointment_itself() -> Result<()> {
    let (svc, events) = memory_service(ServiceConfig::default());
    let a = svc
        .try_book(booking(day(2), "11:00", vec![service("Spa", 60, 1000)]))
        .await?;
    events.taken();

    let moved = svc.reschedule(a.id, day(2), "11:30".parse()?).await?;
    assert_eq!(moved.start_time.to_string(), "11:30");
    assert_eq!(moved.ticket_number, a.ticket_number);

    let published = events.taken();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].cause, SlotChange::Rescheduled);
    Ok(())
}

#[tokio::test]
async fn reschedule_into_someone_else_is_a_conflict() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let a = svc
        .try_book(booking(day(2), "11:00", vec![service("Cut", 30, 200)]))
        .await?;
    svc.try_book(booking(day(2), "13:00", vec![service("Spa", 60, 1000)]))
        .await?;

    let err = svc
        .reschedule(a.id, day(2), "13:30".parse()?)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    let unchanged = svc.get_appointment(a.id).await?;
    assert_eq!(unchanged.start_time.to_string(), "11:00");
    Ok(())
}

#[tokio::test]
async fn moving_across_days_refreshes_both_days() -> Result<()> {
    let (svc, events) = memory_service(ServiceConfig::default());
    let a = svc
        .try_book(booking(day(2), "16:00", vec![service("Cut", 30, 200)]))
        .await?;
    events.taken();

    let patch = AppointmentPatch {
        customer_name: Some("Priya S".to_string()),
        date: Some(day(5)),
        start_time: None,
    };
    let moved = svc.update_appointment(a.id, patch).await?;
    assert_eq!(moved.date, day(5));
    assert_eq!(moved.start_time.to_string(), "16:00");
    assert_eq!(moved.customer.name, "Priya S");

    let dates: Vec<NaiveDate> = events.taken().iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![day(2), day(5)]);
    assert_eq!(svc.list_available_slots(day(2)).await?.len(), 22);
    Ok(())
}

#[tokio::test]
async fn rename_only_does_not_touch_the_calendar() -> Result<()> {
    let (svc, events) = memory_service(ServiceConfig::default());
    let a = svc
        .try_book(booking(day(2), "10:00", vec![service("Cut", 30, 200)]))
        .await?;
    events.taken();

    let patch = AppointmentPatch {
        customer_name: Some("Meera".to_string()),
        ..Default::default()
    };
    let renamed = svc.update_appointment(a.id, patch).await?;
    assert_eq!(renamed.customer.name, "Meera");
    assert_eq!(renamed.start_time, a.start_time);
    assert!(events.taken().is_empty());

    let blank = AppointmentPatch {
        customer_name: Some("  ".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        svc.update_appointment(a.id, blank).await,
        Err(DomainError::Validation { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn renaming_a_started_appointment_keeps_its_slot() -> Result<()> {
    let clock = Arc::new(SteppingClock::new(day(1).and_hms_opt(8, 0, 0).unwrap()));
    let svc = Service::new(
        Arc::new(InMemoryAppointmentsRepository::new()),
        Arc::new(NoopPublisher),
        clock.clone(),
        ServiceConfig::default(),
    );
    let a = svc
        .try_book(booking(day(2), "11:00", vec![service("Facial", 45, 400)]))
        .await?;

    // the edit form sends the unchanged date and time along with the name
    clock.set(day(2).and_hms_opt(12, 0, 0).unwrap());
    let patch = AppointmentPatch {
        customer_name: Some("Renamed".to_string()),
        date: Some(a.date),
        start_time: Some(a.start_time),
    };
    let renamed = svc.update_appointment(a.id, patch).await?;
    assert_eq!(renamed.customer.name, "Renamed");
    assert_eq!((renamed.date, renamed.start_time), (a.date, a.start_time));

    // an actual move into the past is still refused
    let moved = AppointmentPatch {
        start_time: Some("10:30".parse()?),
        ..Default::default()
    };
    assert!(matches!(
        svc.update_appointment(a.id, moved).await,
        Err(DomainError::PastBooking { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn tickets_increase_and_are_not_reused_after_cancel() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let t1 = svc
        .try_book(booking(day(2), "10:00", vec![service("Cut", 30, 200)]))
        .await?;
    let t2 = svc
        .try_book(booking(day(2), "11:00", vec![service("Cut", 30, 200)]))
        .await?;
    assert!(t2.ticket_number > t1.ticket_number);

    svc.cancel(t2.id).await?;
    let t3 = svc
        .try_book(booking(day(2), "12:00", vec![service("Cut", 30, 200)]))
        .await?;
    assert!(t3.ticket_number > t2.ticket_number);
    Ok(())
}

#[tokio::test]
async fn past_and_out_of_hours_starts_are_rejected() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());

    let yesterday = NaiveDate::from_ymd_opt(2029, 12, 31).unwrap();
    assert!(matches!(
        svc.try_book(booking(yesterday, "12:00", vec![service("Cut", 30, 200)]))
            .await,
        Err(DomainError::PastBooking { .. })
    ));
    assert!(matches!(
        svc.try_book(booking(day(2), "21:00", vec![service("Cut", 30, 200)]))
            .await,
        Err(DomainError::OutsideOperatingHours { .. })
    ));

    // may run past closing
    let late = svc
        .try_book(booking(day(2), "20:30", vec![service("Spa", 90, 1200)]))
        .await?;
    assert_eq!(late.interval().end, 20 * 60 + 30 + 90);
    Ok(())
}

#[tokio::test]
async fn off_grid_starts_follow_the_alignment_switch() -> Result<()> {
    let (relaxed, _) = memory_service(ServiceConfig::default());
    relaxed
        .try_book(booking(day(2), "10:15", vec![service("Cut", 20, 200)]))
        .await?;
    let slots = times(&relaxed.list_available_slots(day(2)).await?);
    assert!(slots.contains(&"10:00".to_string()));
    assert!(!slots.contains(&"10:30".to_string()));

    let (strict, _) = memory_service(ServiceConfig {
        require_aligned_start: true,
        ..Default::default()
    });
    assert!(matches!(
        strict
            .try_book(booking(day(2), "10:15", vec![service("Cut", 20, 200)]))
            .await,
        Err(DomainError::Validation { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn custom_hours_drive_the_candidates() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig {
        hours: OperatingHours::new(9 * 60, 12 * 60, 60)?,
        ..Default::default()
    });
    let slots = times(&svc.list_available_slots(day(2)).await?);
    assert_eq!(slots, vec!["09:00", "10:00", "11:00"]);
    Ok(())
}

#[tokio::test]
async fn totals_default_to_the_service_sum_unless_quoted() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let summed = svc
        .try_book(booking(
            day(2),
            "10:00",
            vec![service("Cut", 30, 250), service("Wash", 15, 100)],
        ))
        .await?;
    assert_eq!(summed.total_price, Decimal::from(350));
    assert_eq!(summed.duration_minutes, 45);

    let mut quoted = booking(day(2), "12:00", vec![service("Cut", 30, 250)]);
    quoted.total_price = Some(Decimal::from(199));
    let quoted = svc.try_book(quoted).await?;
    assert_eq!(quoted.total_price, Decimal::from(199));
    Ok(())
}

#[tokio::test]
async fn incomplete_requests_are_validation_errors() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());

    let no_services = booking(day(2), "10:00", vec![]);
    assert!(matches!(
        svc.try_book(no_services).await,
        Err(DomainError::Validation { .. })
    ));

    let mut no_phone = booking(day(2), "10:00", vec![service("Cut", 30, 200)]);
    no_phone.customer.phone = String::new();
    match svc.try_book(no_phone).await {
        Err(DomainError::Validation { field, .. }) => assert_eq!(field, "phone"),
        other => panic!("unexpected: {other:?}"),
    }

    let zero = booking(day(2), "10:00", vec![service("Cut", 0, 200)]);
    assert!(matches!(
        svc.try_book(zero).await,
        Err(DomainError::Validation { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    let id = Uuid::new_v4();
    assert!(matches!(svc.get_appointment(id).await, Err(DomainError::NotFound { .. })));
    assert!(matches!(svc.cancel(id).await, Err(DomainError::NotFound { .. })));
    assert!(matches!(
        svc.reschedule(id, day(2), "10:00".parse()?).await,
        Err(DomainError::NotFound { .. })
    ));
    // the id is checked before the requested slot
    assert!(matches!(
        svc.reschedule(id, day(2), "23:00".parse()?).await,
        Err(DomainError::NotFound { .. })
    ));
    let into_the_past = AppointmentPatch {
        date: Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
        ..Default::default()
    };
    assert!(matches!(
        svc.update_appointment(id, into_the_past).await,
        Err(DomainError::NotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn listing_is_ordered_by_date_then_time() -> Result<()> {
    let (svc, _) = memory_service(ServiceConfig::default());
    svc.try_book(booking(day(3), "10:00", vec![service("Cut", 30, 200)]))
        .await?;
    svc.try_book(booking(day(2), "15:00", vec![service("Cut", 30, 200)]))
        .await?;
    svc.try_book(booking(day(2), "11:00", vec![service("Cut", 30, 200)]))
        .await?;

    let order: Vec<(NaiveDate, String)> = svc
        .list_appointments(None)
        .await?
        .into_iter()
        .map(|a| (a.date, a.start_time.to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            (day(2), "11:00".to_string()),
            (day(2), "15:00".to_string()),
            (day(3), "10:00".to_string()),
        ]
    );
    Ok(())
}

/// Repository whose reads never finish in time.
struct StalledRepository(InMemoryAppointmentsRepository);

#[async_trait]
impl AppointmentsRepository for StalledRepository {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.0.find_by_date(date).await
    }
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        self.0.find_by_id(id).await
    }
    async fn list_all(&self) -> Result<Vec<Appointment>> {
        self.0.list_all().await
    }
    async fn insert(&self, record: AppointmentRecord) -> Result<Appointment> {
        self.0.insert(record).await
    }
    async fn update(&self, id: Uuid, update: AppointmentUpdate) -> Result<Option<Appointment>> {
        self.0.update(id, update).await
    }
    async fn delete(&self, id: Uuid) -> Result<Option<Appointment>> {
        self.0.delete(id).await
    }
    async fn max_ticket_number(&self) -> Result<u64> {
        self.0.max_ticket_number().await
    }
    async fn next_ticket_number(&self) -> Result<u64> {
        self.0.next_ticket_number().await
    }
}

#[tokio::test]
async fn slow_store_surfaces_as_unavailable() {
    let svc = Service::new(
        Arc::new(StalledRepository(InMemoryAppointmentsRepository::new())),
        Arc::new(NoopPublisher),
        morning_clock(),
        ServiceConfig {
            store_timeout: Duration::from_millis(20),
            ..Default::default()
        },
    );

    let err = svc.list_available_slots(day(2)).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));

    let err = svc
        .try_book(booking(day(2), "10:00", vec![service("Cut", 30, 200)]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));
}
