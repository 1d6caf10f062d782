//! Rate quote types.

use serde::{Deserialize, Serialize};

use crate::cache::Versioned;
use crate::error::{BffError, BffResult};
use crate::stay::{normalize_currency, Occupancy, Stay};
use crate::supplier::types::{SupplierQuote, SupplierRate};

pub const MAX_HOTELS_PER_QUOTE: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StayBody {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancyBody {
    pub rooms: Option<u8>,
    pub adults: Option<u8>,
    pub children: Option<u8>,
}

/// JSON body of `POST /v1/hotels/quote`.
///
/// Every field is optional at this level so missing values are reported as
/// `INPUT_INVALID` with a field name instead of a deserializer message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequestBody {
    pub stay: Option<StayBody>,
    pub occupancy: Option<OccupancyBody>,
    #[serde(default)]
    pub hotel_ids: Vec<String>,
    pub currency: Option<String>,
    /// Client correlation reference; excluded from the cache key.
    pub client_ref: Option<String>,
}

/// Validated quote request, also the cache parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteCriteria {
    pub stay: Stay,
    pub occupancy: Occupancy,
    /// Sorted and de-duplicated.
    pub hotel_ids: Vec<String>,
    pub currency: String,
}

impl QuoteRequestBody {
    pub fn validate(self) -> BffResult<QuoteCriteria> {
        let stay = self
            .stay
            .ok_or_else(|| BffError::InputInvalid("stay is required".into()))?;
        let occupancy = self
            .occupancy
            .ok_or_else(|| BffError::InputInvalid("occupancy is required".into()))?;

        let mut hotel_ids: Vec<String> = self
            .hotel_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if hotel_ids.len() != self.hotel_ids.len() {
            return Err(BffError::InputInvalid("hotel_ids must not contain blank ids".into()));
        }
        hotel_ids.sort();
        hotel_ids.dedup();
        if hotel_ids.is_empty() {
            return Err(BffError::InputInvalid("hotel_ids must not be empty".into()));
        }
        if hotel_ids.len() > MAX_HOTELS_PER_QUOTE {
            return Err(BffError::InputInvalid(format!(
                "at most {} hotel_ids per quote",
                MAX_HOTELS_PER_QUOTE
            )));
        }

        Ok(QuoteCriteria {
            stay: Stay::parse(stay.check_in.as_deref(), stay.check_out.as_deref())?,
            occupancy: Occupancy::validate(occupancy.rooms, occupancy.adults, occupancy.children)?,
            hotel_ids,
            currency: normalize_currency(self.currency.as_deref())?,
        })
    }
}

/// One bookable rate in the public quote response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate_key: String,
    pub hotel_id: String,
    pub room: String,
    pub board: String,
    pub net: String,
    pub currency: String,
    pub refundable: bool,
}

impl From<SupplierRate> for RateQuote {
    fn from(rate: SupplierRate) -> Self {
        Self {
            refundable: rate.is_refundable(),
            rate_key: rate.rate_key,
            hotel_id: rate.hotel_code,
            room: rate.room_name,
            board: rate.board_name,
            net: rate.net,
            currency: rate.currency,
        }
    }
}

/// Public quote payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResults {
    pub rates: Vec<RateQuote>,
    pub total: usize,
}

impl Versioned for QuoteResults {
    const SCHEMA_VERSION: u32 = 1;
}

impl QuoteResults {
    pub fn from_supplier(quote: SupplierQuote) -> Self {
        let rates: Vec<RateQuote> = quote.rates.into_iter().map(RateQuote::from).collect();
        Self {
            total: rates.len(),
            rates,
        }
    }
}
