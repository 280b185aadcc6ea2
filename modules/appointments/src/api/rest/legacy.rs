//! Parser for the display strings older booking forms send as services,
//! e.g. `"Facial (45 mins) - ₹400"`.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::contract::model::ServiceItem;
use crate::domain::error::DomainError;

static LEGACY_SERVICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[^(]*?)\s*\(\s*(?P<mins>\d+)\s*mins?\s*\)(?P<rest>.*)$")
        .expect("legacy service pattern is valid")
});

static TRAILING_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-\s*\D*?(?P<amount>\d+(?:\.\d{1,2})?)\s*$").expect("price pattern is valid")
});

/// Parse one legacy service string. `field` names the offending element in
/// validation errors.
pub fn parse_legacy_service(raw: &str, field: &str) -> Result<ServiceItem, DomainError> {
    let caps = LEGACY_SERVICE.captures(raw).ok_or_else(|| {
        DomainError::validation(
            field,
            format!("'{raw}' has no duration; expected e.g. 'Facial (45 mins) - ₹400'"),
        )
    })?;

    let duration_minutes: u32 = caps["mins"]
        .parse()
        .map_err(|_| DomainError::validation(field, format!("'{raw}' has an invalid duration")))?;

    let rest = caps["rest"].replace(',', "");
    let price = match TRAILING_PRICE.captures(&rest) {
        Some(p) => Decimal::from_str(&p["amount"])
            .map_err(|_| DomainError::validation(field, format!("'{raw}' has an invalid price")))?,
        None => Decimal::ZERO,
    };

    Ok(ServiceItem {
        name: caps["name"].trim().to_string(),
        duration_minutes,
        price,
    })
}
