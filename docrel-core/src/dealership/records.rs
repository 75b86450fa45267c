//! Storage shape of dealership documents

use serde::{Deserialize, Serialize};

use crate::id::ObjectId;
use crate::mapper::serialize_number;

/// Reference from a car or salesperson to its dealer.
pub const DEALER_FIELD: &str = "dealerID";

/// Salesperson's list of handled cars (authoritative side of salesperson <-> car).
pub const CAR_IDS_FIELD: &str = "carIDs";

/// `Dealers` document. Holds no reverse lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerDoc {
    pub address: String,
    pub location: String,
}

/// `Cars` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDoc {
    pub model: String,
    #[serde(serialize_with = "serialize_number")]
    pub price: f64,
    #[serde(rename = "licensePlate")]
    pub license_plate: String,
    #[serde(rename = "dealerID", default)]
    pub dealer_id: Option<ObjectId>,
}

/// `Salespeople` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonDoc {
    pub name: String,
    #[serde(rename = "dealerID", default)]
    pub dealer_id: Option<ObjectId>,
    #[serde(rename = "carIDs", default)]
    pub car_ids: Vec<ObjectId>,
}
