//! Account types returned by the storefront API.

use bazaar_core::{AddressId, CityId, CountryId};
use serde::{Deserialize, Serialize};

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address ID.
    pub id: AddressId,
    /// Recipient name.
    pub full_name: String,
    /// Recipient phone number.
    pub phone_number: String,
    /// Street line.
    pub address_1: String,
    /// Optional second line.
    #[serde(default)]
    pub address_2: Option<String>,
    /// Postal code.
    pub postcode: String,
    /// City.
    pub city_id: CityId,
    /// Country.
    pub country_id: CountryId,
    /// Whether checkout preselects this address.
    #[serde(default)]
    pub is_default: bool,
}

/// Successful response body: `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Error response body: `{"message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
