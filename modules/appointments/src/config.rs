use std::collections::BTreeMap;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contract::model::ServiceItem;
use crate::domain::catalog::ServiceCatalog;
use crate::domain::error::DomainError;
use crate::domain::service::ServiceConfig;
use crate::domain::slots::OperatingHours;

/// Configuration for the appointments module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppointmentsConfig {
    /// Minutes since midnight the first slot starts at.
    #[serde(default = "default_opening_minute")]
    pub opening_minute: u16,
    /// Minutes since midnight no booking may start at or after.
    #[serde(default = "default_closing_minute")]
    pub closing_minute: u16,
    #[serde(default = "default_slot_granularity_minutes")]
    pub slot_granularity_minutes: u16,
    /// Reject starts that are not on the slot grid.
    #[serde(default)]
    pub require_aligned_start: bool,
    #[serde(default = "default_store_timeout", with = "humantime_serde")]
    pub store_timeout: Duration,
    /// Buffer size of the live slots feed; slow subscribers lose the oldest events.
    #[serde(default = "default_events_capacity")]
    pub events_capacity: usize,
    /// Service menu keyed by id (`haircut`, `spa`, ...).
    #[serde(default = "default_catalog")]
    pub catalog: BTreeMap<String, CatalogEntryConfig>,
}

/// One menu entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntryConfig {
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    pub duration_minutes: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Default for AppointmentsConfig {
    fn default() -> Self {
        Self {
            opening_minute: default_opening_minute(),
            closing_minute: default_closing_minute(),
            slot_granularity_minutes: default_slot_granularity_minutes(),
            require_aligned_start: false,
            store_timeout: default_store_timeout(),
            events_capacity: default_events_capacity(),
            catalog: default_catalog(),
        }
    }
}

impl AppointmentsConfig {
    pub fn to_service_config(&self) -> Result<ServiceConfig, DomainError> {
        let hours = OperatingHours::new(
            self.opening_minute,
            self.closing_minute,
            self.slot_granularity_minutes,
        )?;
        if self.store_timeout.is_zero() {
            return Err(DomainError::validation("store_timeout", "must be positive"));
        }
        let catalog = ServiceCatalog::new(
            self.catalog
                .iter()
                .map(|(id, e)| {
                    let item = ServiceItem {
                        name: e.name.clone().unwrap_or_else(|| id.clone()),
                        duration_minutes: e.duration_minutes,
                        price: e.price,
                    };
                    (id.clone(), item)
                })
                .collect(),
        )?;
        Ok(ServiceConfig {
            hours,
            require_aligned_start: self.require_aligned_start,
            store_timeout: self.store_timeout,
            catalog,
        })
    }
}

fn default_opening_minute() -> u16 {
    10 * 60
}

fn default_closing_minute() -> u16 {
    21 * 60
}

fn default_slot_granularity_minutes() -> u16 {
    30
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_events_capacity() -> usize {
    64
}

fn default_catalog() -> BTreeMap<String, CatalogEntryConfig> {
    ServiceCatalog::default()
        .list()
        .into_iter()
        .map(|s| {
            let entry = CatalogEntryConfig {
                name: Some(s.item.name),
                duration_minutes: s.item.duration_minutes,
                price: s.item.price,
            };
            (s.id, entry)
        })
        .collect()
}
