//! External dealership entities
//!
//! Relationship fields stay `None` (and are omitted when serialized) until the
//! caller asks for them. `dealer: Some(None)` means "requested, no dealer".

use serde::Serialize;

use super::records::{CarDoc, DealerDoc, SalespersonDoc};
use crate::mapper::{serialize_number, Stored};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealer {
    pub id: String,
    pub address: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cars: Option<Vec<Car>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salespeople: Option<Vec<Salesperson>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub model: String,
    #[serde(serialize_with = "serialize_number")]
    pub price: f64,
    pub license_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salespeople: Option<Vec<Salesperson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer: Option<Option<Dealer>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Salesperson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cars: Option<Vec<Car>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer: Option<Option<Dealer>>,
}

impl From<Stored<DealerDoc>> for Dealer {
    fn from(record: Stored<DealerDoc>) -> Self {
        Self {
            id: record.id.to_external(),
            address: record.body.address,
            location: record.body.location,
            cars: None,
            salespeople: None,
        }
    }
}

impl From<Stored<CarDoc>> for Car {
    fn from(record: Stored<CarDoc>) -> Self {
        Self {
            id: record.id.to_external(),
            model: record.body.model,
            price: record.body.price,
            license_plate: record.body.license_plate,
            salespeople: None,
            dealer: None,
        }
    }
}

impl From<Stored<SalespersonDoc>> for Salesperson {
    fn from(record: Stored<SalespersonDoc>) -> Self {
        Self {
            id: record.id.to_external(),
            name: record.body.name,
            cars: None,
            dealer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;
    use serde_json::json;

    #[test]
    fn storage_fields_do_not_leak() {
        let id = ObjectId::generate();
        let car = Car::from(Stored {
            id,
            body: CarDoc {
                model: "Civic".into(),
                price: 20000.0,
                license_plate: "ABC123".into(),
                dealer_id: Some(ObjectId::generate()),
            },
        });

        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(
            value,
            json!({
                "id": id.to_external(),
                "model": "Civic",
                "price": 20000,
                "licensePlate": "ABC123",
            })
        );
        assert_eq!(value["price"].to_string(), "20000");
    }

    #[test]
    fn fractional_price_stays_fractional() {
        let car = Car::from(Stored {
            id: ObjectId::generate(),
            body: CarDoc {
                model: "Civic".into(),
                price: 19999.5,
                license_plate: "ABC123".into(),
                dealer_id: None,
            },
        });
        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(value["price"].to_string(), "19999.5");
    }

    #[test]
    fn requested_missing_dealer_is_null() {
        let mut person = Salesperson::from(Stored {
            id: ObjectId::generate(),
            body: SalespersonDoc {
                name: "Ana".into(),
                dealer_id: None,
                car_ids: vec![],
            },
        });
        person.dealer = Some(None);

        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(value["dealer"], serde_json::Value::Null);
        assert!(value.get("cars").is_none());
    }
}
