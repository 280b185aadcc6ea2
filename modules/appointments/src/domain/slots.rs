//! Pure slot arithmetic: time-of-day values, operating hours, occupied
//! intervals and the availability scan. Nothing here touches the store or
//! the clock.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::error::DomainError;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Time of day with minute precision, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn to_naive_time(self) -> chrono::NaiveTime {
        chrono::NaiveTime::from_hms_opt(u32::from(self.0 / 60), u32::from(self.0 % 60), 0)
            .unwrap_or_default()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for SlotTime {
    type Err = DomainError;

    /// Accepts `HH:MM` in 24h notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::validation("time", format!("'{s}' is not a valid HH:MM time"));
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

/// Parse a calendar date that must have the exact `YYYY-MM-DD` shape and
/// name a real day.
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    let shaped = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(DomainError::validation(
            "date",
            "Invalid date format! Use YYYY-MM-DD",
        ));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DomainError::validation("date", format!("'{s}' is not a calendar date")))
}

/// Half-open occupied interval `[start, end)` in minutes since midnight.
///
/// `end` may run past midnight for long bookings late in the day; it is kept
/// as a plain `u32` so the arithmetic never wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: SlotTime, duration_minutes: u32) -> Self {
        let start = u32::from(start.minutes());
        Self {
            start,
            end: start + duration_minutes,
        }
    }

    /// Touching intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn covers(&self, minute: u32) -> bool {
        self.start <= minute && minute < self.end
    }
}

/// Fixed salon parameters the allocator works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    opening_minute: u16,
    closing_minute: u16,
    granularity_minutes: u16,
}

impl OperatingHours {
    pub fn new(
        opening_minute: u16,
        closing_minute: u16,
        granularity_minutes: u16,
    ) -> Result<Self, DomainError> {
        if granularity_minutes == 0 {
            return Err(DomainError::validation(
                "slot_granularity_minutes",
                "must be positive",
            ));
        }
        if closing_minute > MINUTES_PER_DAY {
            return Err(DomainError::validation(
                "closing_minute",
                format!("must not exceed {MINUTES_PER_DAY}"),
            ));
        }
        if opening_minute >= closing_minute {
            return Err(DomainError::validation(
                "opening_minute",
                "must be earlier than closing_minute",
            ));
        }
        Ok(Self {
            opening_minute,
            closing_minute,
            granularity_minutes,
        })
    }

    pub fn opening_minute(&self) -> u16 {
        self.opening_minute
    }

    pub fn closing_minute(&self) -> u16 {
        self.closing_minute
    }

    pub fn granularity_minutes(&self) -> u16 {
        self.granularity_minutes
    }

    /// Every candidate start from opening (inclusive) to closing (exclusive).
    pub fn candidates(&self) -> impl Iterator<Item = SlotTime> + '_ {
        (self.opening_minute..self.closing_minute)
            .step_by(usize::from(self.granularity_minutes))
            .filter_map(SlotTime::from_minutes)
    }

    pub fn contains(&self, t: SlotTime) -> bool {
        (self.opening_minute..self.closing_minute).contains(&t.minutes())
    }

    pub fn is_aligned(&self, t: SlotTime) -> bool {
        self.contains(t) && (t.minutes() - self.opening_minute) % self.granularity_minutes == 0
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            opening_minute: 600,
            closing_minute: 1260,
            granularity_minutes: 30,
        }
    }
}

/// Candidate starts not covered by any occupied interval, ascending.
pub fn free_slots<I>(hours: &OperatingHours, occupied: I) -> Vec<SlotTime>
where
    I: IntoIterator<Item = Interval>,
{
    let occupied: Vec<Interval> = occupied.into_iter().collect();
    hours
        .candidates()
        .filter(|t| {
            let m = u32::from(t.minutes());
            !occupied.iter().any(|iv| iv.covers(m))
        })
        .collect()
}
