//! Availability search types.

use serde::{Deserialize, Serialize};

use crate::cache::Versioned;
use crate::error::{BffError, BffResult};
use crate::stay::{normalize_currency, Occupancy, Stay};
use crate::supplier::types::{SupplierAvailability, SupplierHotel};

/// Raw query string of `GET /v1/hotels/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub destination: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub rooms: Option<u8>,
    pub adults: Option<u8>,
    pub children: Option<u8>,
    pub currency: Option<String>,
    /// Client correlation reference. Not sent upstream and not part of the cache key.
    pub client_ref: Option<String>,
}

/// Validated search. Serialized as-is to form the cache parameters, so it
/// holds only what the supplier prices on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    pub destination: String,
    #[serde(flatten)]
    pub stay: Stay,
    pub occupancy: Occupancy,
    pub currency: String,
}

impl SearchQuery {
    pub fn validate(self) -> BffResult<SearchCriteria> {
        let destination = self
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| BffError::InputInvalid("destination is required".into()))?;
        if destination.len() != 3 || !destination.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BffError::InputInvalid(
                "destination must be a 3-letter destination code".into(),
            ));
        }

        Ok(SearchCriteria {
            destination: destination.to_ascii_uppercase(),
            stay: Stay::parse(self.check_in.as_deref(), self.check_out.as_deref())?,
            occupancy: Occupancy::validate(self.rooms, self.adults, self.children)?,
            currency: normalize_currency(self.currency.as_deref())?,
        })
    }
}

/// One hotel in the public search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    /// Decimal strings, as priced by the supplier.
    pub min_rate: String,
    pub max_rate: String,
    pub currency: String,
}

/// Public search payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hotels: Vec<HotelSummary>,
    pub total: usize,
}

impl Versioned for SearchResults {
    const SCHEMA_VERSION: u32 = 1;
}

impl SearchResults {
    pub fn from_supplier(availability: SupplierAvailability) -> Self {
        let hotels: Vec<HotelSummary> = availability
            .hotels
            .into_iter()
            .map(HotelSummary::from)
            .collect();
        Self {
            total: hotels.len(),
            hotels,
        }
    }
}

impl From<SupplierHotel> for HotelSummary {
    fn from(hotel: SupplierHotel) -> Self {
        Self {
            id: hotel.code,
            name: hotel.name,
            category: hotel.category_name,
            min_rate: hotel.min_rate,
            max_rate: hotel.max_rate,
            currency: hotel.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RequestParams;

    fn query() -> SearchQuery {
        SearchQuery {
            destination: Some("pmi".into()),
            check_in: Some("2026-06-01".into()),
            check_out: Some("2026-06-05".into()),
            adults: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_normalizes() {
        let criteria = query().validate().unwrap();
        assert_eq!(criteria.destination, "PMI");
        assert_eq!(criteria.currency, "EUR");
        assert_eq!(criteria.occupancy.rooms, 1);
    }

    #[test]
    fn test_destination_required() {
        let mut q = query();
        q.destination = None;
        assert_eq!(q.validate().unwrap_err().code(), "INPUT_INVALID");

        let mut q = query();
        q.destination = Some("Palma".into());
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_client_ref_does_not_change_cache_params() {
        let mut with_ref = query();
        with_ref.client_ref = Some("abc-123".into());
        let mut lower = query();
        lower.destination = Some("PMI".into());

        let a = RequestParams::from_serializable(&with_ref.validate().unwrap()).unwrap();
        let b = RequestParams::from_serializable(&lower.validate().unwrap()).unwrap();
        assert_eq!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_cache_params_shape() {
        let params = RequestParams::from_serializable(&query().validate().unwrap()).unwrap();
        assert_eq!(
            params.normalize(),
            r#"{"check_in":"2026-06-01","check_out":"2026-06-05","currency":"EUR","destination":"PMI","occupancy":{"adults":2,"children":0,"rooms":1}}"#
        );
    }

    #[test]
    fn test_shaping() {
        let results = SearchResults::from_supplier(SupplierAvailability {
            hotels: vec![SupplierHotel {
                code: "1533".into(),
                name: "Hotel Palma Bellver".into(),
                category_name: Some("4 STARS".into()),
                min_rate: "312.40".into(),
                max_rate: "540.00".into(),
                currency: "EUR".into(),
            }],
        });
        assert_eq!(results.total, 1);
        assert_eq!(results.hotels[0].id, "1533");
        assert_eq!(results.hotels[0].category.as_deref(), Some("4 STARS"));
    }
}
