//! Bookable services offered by the salon and the price/duration quote the
//! booking form shows before submitting.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::contract::model::ServiceItem;
use crate::domain::error::DomainError;

/// Sum of a selection; the same arithmetic `try_book` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub price: Decimal,
    pub duration_minutes: u32,
}

pub fn totals<'a, I>(services: I) -> Totals
where
    I: IntoIterator<Item = &'a ServiceItem>,
{
    services.into_iter().fold(Totals::default(), |acc, s| Totals {
        price: acc.price + s.price,
        duration_minutes: acc.duration_minutes.saturating_add(s.duration_minutes),
    })
}

/// A catalog entry keyed by its short id (`haircut`, `spa`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogService {
    pub id: String,
    pub item: ServiceItem,
}

/// Result of pricing a selection of catalog ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub services: Vec<CatalogService>,
    pub totals: Totals,
    /// Requested ids the catalog does not know; they add nothing.
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCatalog {
    entries: BTreeMap<String, ServiceItem>,
}

impl ServiceCatalog {
    /// Ids are stored trimmed and lowercased.
    pub fn new(entries: BTreeMap<String, ServiceItem>) -> Result<Self, DomainError> {
        let entries: BTreeMap<String, ServiceItem> = entries
            .into_iter()
            .map(|(id, item)| (id.trim().to_ascii_lowercase(), item))
            .collect();
        for (id, item) in &entries {
            if id.trim().is_empty() || id.contains(',') {
                return Err(DomainError::validation(
                    "catalog",
                    format!("'{id}' is not a usable service id"),
                ));
            }
            if item.duration_minutes == 0 {
                return Err(DomainError::validation(
                    format!("catalog.{id}.duration_minutes"),
                    "must be positive",
                ));
            }
            if item.price < Decimal::ZERO {
                return Err(DomainError::validation(
                    format!("catalog.{id}.price"),
                    "must not be negative",
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Entries ordered by id.
    pub fn list(&self) -> Vec<CatalogService> {
        self.entries
            .iter()
            .map(|(id, item)| CatalogService {
                id: id.clone(),
                item: item.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&ServiceItem> {
        self.entries.get(id)
    }

    /// Price a selection. Ids are matched case-insensitively after trimming;
    /// repeats count once per occurrence and unknown ids are reported, not
    /// charged.
    pub fn quote<S: AsRef<str>>(&self, ids: &[S]) -> Result<Quote, DomainError> {
        let ids: Vec<String> = ids
            .iter()
            .map(|s| s.as_ref().trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(DomainError::validation(
                "selectedServices",
                "No services selected!",
            ));
        }

        let mut services = Vec::with_capacity(ids.len());
        let mut unknown = Vec::new();
        for id in ids {
            match self.entries.get(&id) {
                Some(item) => services.push(CatalogService {
                    id,
                    item: item.clone(),
                }),
                None => unknown.push(id),
            }
        }
        let totals = totals(services.iter().map(|s| &s.item));
        Ok(Quote {
            services,
            totals,
            unknown,
        })
    }
}

impl Default for ServiceCatalog {
    /// The salon's standard menu.
    fn default() -> Self {
        let entry = |name: &str, duration_minutes: u32, price: i64| ServiceItem {
            name: name.to_string(),
            duration_minutes,
            price: Decimal::from(price),
        };
        Self {
            entries: BTreeMap::from([
                ("facial".to_string(), entry("Facial", 15, 300)),
                ("haircut".to_string(), entry("Haircut", 30, 500)),
                ("spa".to_string(), entry("Spa", 45, 1000)),
            ]),
        }
    }
}
