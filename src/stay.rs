//! Stay dates, occupancy and currency shared by search and quote requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BffError, BffResult};

pub const MAX_NIGHTS: i64 = 30;
pub const MAX_ROOMS: u8 = 5;
pub const MAX_ADULTS_PER_ROOM: u8 = 8;
pub const MAX_CHILDREN: u8 = 6;
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Validated check-in / check-out pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl Stay {
    pub fn parse(check_in: Option<&str>, check_out: Option<&str>) -> BffResult<Self> {
        let check_in = parse_date("check_in", check_in)?;
        let check_out = parse_date("check_out", check_out)?;
        Self::new(check_in, check_out)
    }

    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> BffResult<Self> {
        if check_out <= check_in {
            return Err(BffError::InputInvalid(
                "check_out must be after check_in".to_string(),
            ));
        }
        let stay = Self { check_in, check_out };
        if stay.nights() > MAX_NIGHTS {
            return Err(BffError::InputInvalid(format!(
                "stays longer than {} nights are not supported",
                MAX_NIGHTS
            )));
        }
        Ok(stay)
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

fn parse_date(field: &str, value: Option<&str>) -> BffResult<NaiveDate> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BffError::InputInvalid(format!("{} is required", field)))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| BffError::InputInvalid(format!("{} must be a YYYY-MM-DD date", field)))
}

/// Rooms and guests for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub rooms: u8,
    pub adults: u8,
    pub children: u8,
}

impl Occupancy {
    /// Validate raw values. Rooms default to 1 and children to 0.
    pub fn validate(rooms: Option<u8>, adults: Option<u8>, children: Option<u8>) -> BffResult<Self> {
        let rooms = rooms.unwrap_or(1);
        let adults = adults.ok_or_else(|| BffError::InputInvalid("adults is required".into()))?;
        let children = children.unwrap_or(0);

        if rooms == 0 || rooms > MAX_ROOMS {
            return Err(BffError::InputInvalid(format!("rooms must be between 1 and {}", MAX_ROOMS)));
        }
        if adults < rooms {
            return Err(BffError::InputInvalid("every room needs at least one adult".into()));
        }
        if u16::from(adults) > u16::from(rooms) * u16::from(MAX_ADULTS_PER_ROOM) {
            return Err(BffError::InputInvalid(format!(
                "at most {} adults per room",
                MAX_ADULTS_PER_ROOM
            )));
        }
        if children > MAX_CHILDREN {
            return Err(BffError::InputInvalid(format!("at most {} children", MAX_CHILDREN)));
        }

        Ok(Self { rooms, adults, children })
    }
}

/// Upper-case ISO 4217 code, defaulting to EUR.
pub fn normalize_currency(currency: Option<&str>) -> BffResult<String> {
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(DEFAULT_CURRENCY.to_string()),
        Some(c) if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            Ok(c.to_ascii_uppercase())
        }
        Some(c) => Err(BffError::InputInvalid(format!("'{}' is not a currency code", c))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stay_parse() {
        let stay = Stay::parse(Some("2026-06-01"), Some("2026-06-05")).unwrap();
        assert_eq!(stay.nights(), 4);
    }

    #[test]
    fn test_stay_rejects_bad_input() {
        assert!(Stay::parse(None, Some("2026-06-05")).is_err());
        assert!(Stay::parse(Some("06/01/2026"), Some("2026-06-05")).is_err());
        assert!(Stay::parse(Some("2026-06-05"), Some("2026-06-05")).is_err());
        assert!(Stay::parse(Some("2026-06-01"), Some("2026-08-01")).is_err());
    }

    #[test]
    fn test_occupancy_rules() {
        assert_eq!(
            Occupancy::validate(None, Some(2), None).unwrap(),
            Occupancy { rooms: 1, adults: 2, children: 0 }
        );
        assert!(Occupancy::validate(Some(2), Some(1), None).is_err());
        assert!(Occupancy::validate(Some(1), Some(9), None).is_err());
        assert!(Occupancy::validate(Some(0), Some(1), None).is_err());
        assert!(Occupancy::validate(Some(1), None, None).is_err());
        assert!(Occupancy::validate(Some(1), Some(2), Some(7)).is_err());
    }

    #[test]
    fn test_currency() {
        assert_eq!(normalize_currency(None).unwrap(), "EUR");
        assert_eq!(normalize_currency(Some(" usd ")).unwrap(), "USD");
        assert!(normalize_currency(Some("EURO")).is_err());
    }
}
