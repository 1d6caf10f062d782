//! Supplier wire types.
//!
//! Field names follow the supplier's camelCase JSON. Prices stay decimal
//! strings end to end; nothing in the BFF does arithmetic on them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stay::{Occupancy, Stay};

/// One entry of the `occupancies` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierOccupancy {
    pub rooms: u8,
    pub adults: u8,
    pub children: u8,
}

impl From<Occupancy> for SupplierOccupancy {
    fn from(occupancy: Occupancy) -> Self {
        Self {
            rooms: occupancy.rooms,
            adults: occupancy.adults,
            children: occupancy.children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierStay {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl From<Stay> for SupplierStay {
    fn from(stay: Stay) -> Self {
        Self {
            check_in: stay.check_in,
            check_out: stay.check_out,
        }
    }
}

/// `hotels` filter of the quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelFilter {
    pub hotel: Vec<String>,
}

/// Body of `POST {base}/hotels/quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequestWire {
    pub stay: SupplierStay,
    pub occupancies: Vec<SupplierOccupancy>,
    pub hotels: HotelFilter,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierHotel {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category_name: Option<String>,
    pub min_rate: String,
    pub max_rate: String,
    pub currency: String,
}

/// Response of the availability search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplierAvailability {
    #[serde(default)]
    pub hotels: Vec<SupplierHotel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRate {
    pub rate_key: String,
    pub hotel_code: String,
    pub room_name: String,
    pub board_name: String,
    pub net: String,
    pub currency: String,
    /// `NOR` for refundable rates, `NRF` otherwise.
    pub rate_class: String,
}

impl SupplierRate {
    pub fn is_refundable(&self) -> bool {
        !self.rate_class.eq_ignore_ascii_case("NRF")
    }
}

/// Response of the quote call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplierQuote {
    #[serde(default)]
    pub rates: Vec<SupplierRate>,
}
