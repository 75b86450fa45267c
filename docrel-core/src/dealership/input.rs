//! Validated dealership requests
//!
//! Mutations are strict (unknown keys rejected); queries are lenient.

use serde_json::Value;

use super::records::DEALER_FIELD;
use super::relations::{CarRelation, DealerRelation, SalespersonRelation};
use crate::id::CandidateId;
use crate::mapper::number_value;
use crate::pagination::{Pagination, DEFAULT_FIRST};
use crate::store::Filter;
use crate::validation::{ValidationErrors, Validator};

/// Minimum length for names, addresses, models and plates
const MIN_TEXT_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct NewDealer {
    pub address: String,
    pub location: String,
}

impl NewDealer {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let address = v.string("address", MIN_TEXT_LEN);
        let location = v.string("location", MIN_TEXT_LEN);
        v.finish(|| {
            Some(Self {
                address: address?,
                location: location?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub model: String,
    pub price: f64,
    pub license_plate: String,
    /// Salespeople that get this car appended to their list
    pub salespeople: Vec<CandidateId>,
    pub dealer: Option<CandidateId>,
}

impl NewCar {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let model = v.string("model", MIN_TEXT_LEN);
        let price = v.non_negative("price");
        let license_plate = v.string("licensePlate", MIN_TEXT_LEN);
        let salespeople = v.optional_id_list("salespeopleIDs");
        let dealer = v.optional_id(DEALER_FIELD);
        v.finish(|| {
            Some(Self {
                model: model?,
                price: price?,
                license_plate: license_plate?,
                salespeople: salespeople.unwrap_or_default(),
                dealer,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSalesperson {
    pub name: String,
    pub dealer: Option<CandidateId>,
}

impl NewSalesperson {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let name = v.string("name", MIN_TEXT_LEN);
        let dealer = v.optional_id(DEALER_FIELD);
        v.finish(|| Some(Self { name: name?, dealer }))
    }
}

/// Put a salesperson under a dealer (overwrites).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignDealer {
    pub dealer: CandidateId,
    pub salesperson: CandidateId,
}

impl AssignDealer {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let dealer = v.id(DEALER_FIELD);
        let salesperson = v.id("salespersonID");
        v.finish(|| {
            Some(Self {
                dealer: dealer?,
                salesperson: salesperson?,
            })
        })
    }
}

/// Add a car to a salesperson's list (appends).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignCar {
    pub salesperson: CandidateId,
    pub car: CandidateId,
}

impl AssignCar {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let salesperson = v.id("salespersonID");
        let car = v.id("carID");
        v.finish(|| {
            Some(Self {
                salesperson: salesperson?,
                car: car?,
            })
        })
    }
}

/// Car listing filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CarQuery {
    pub id: Option<CandidateId>,
    pub license_plate: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub include: Vec<CarRelation>,
}

impl CarQuery {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::lenient(payload).coerce_numbers();
        let id = v.optional_id("id");
        let license_plate = v.optional_string("licensePlate", MIN_TEXT_LEN);
        let model = v.optional_string("model", MIN_TEXT_LEN);
        let price = v.optional_non_negative("price");
        let max_price = v.optional_non_negative("maxPrice");
        let min_price = v.optional_non_negative("minPrice");
        let include = v.optional_variants("include");
        v.finish(|| {
            Some(Self {
                id,
                license_plate,
                model,
                price,
                min_price,
                max_price,
                include: include.unwrap_or_default(),
            })
        })
    }

    /// Exact price wins over the range.
    pub fn filter(&self) -> Filter {
        let mut clauses = Vec::new();
        if let Some(id) = self.id {
            clauses.push(Filter::Id(id.handle()));
        }
        if let Some(plate) = &self.license_plate {
            clauses.push(Filter::eq("licensePlate", plate.as_str()));
        }
        if let Some(model) = &self.model {
            clauses.push(Filter::eq("model", model.as_str()));
        }
        match self.price {
            Some(price) => clauses.push(Filter::eq("price", number_value(price))),
            None if self.min_price.is_some() || self.max_price.is_some() => {
                clauses.push(Filter::Range {
                    field: "price".to_owned(),
                    min: self.min_price,
                    max: self.max_price,
                })
            }
            None => {}
        }
        Filter::all_of(clauses)
    }
}

/// Salesperson listing filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalespersonQuery {
    pub id: Option<CandidateId>,
    pub name: Option<String>,
    pub include: Vec<SalespersonRelation>,
}

impl SalespersonQuery {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::lenient(payload);
        let id = v.optional_id("id");
        let name = v.optional_string("name", MIN_TEXT_LEN);
        let include = v.optional_variants("include");
        v.finish(|| {
            Some(Self {
                id,
                name,
                include: include.unwrap_or_default(),
            })
        })
    }

    pub fn filter(&self) -> Filter {
        let mut clauses = Vec::new();
        if let Some(id) = self.id {
            clauses.push(Filter::Id(id.handle()));
        }
        if let Some(name) = &self.name {
            clauses.push(Filter::eq("name", name.as_str()));
        }
        Filter::all_of(clauses)
    }
}

/// Dealer listing filter with a skip/limit window.
#[derive(Debug, Clone, PartialEq)]
pub struct DealerQuery {
    pub id: Option<CandidateId>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub page: Pagination,
    pub include: Vec<DealerRelation>,
}

impl DealerQuery {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::lenient(payload).coerce_numbers();
        let id = v.optional_id("id");
        let location = v.optional_string("location", MIN_TEXT_LEN);
        let address = v.optional_string("address", MIN_TEXT_LEN);
        let first = v.optional_count("first", true);
        let after = v.optional_count("after", false);
        let include = v.optional_variants("include");
        v.finish(|| {
            Some(Self {
                id,
                address,
                location,
                page: Pagination::window(after.unwrap_or(0), first.unwrap_or(DEFAULT_FIRST)),
                include: include.unwrap_or_default(),
            })
        })
    }

    pub fn filter(&self) -> Filter {
        let mut clauses = Vec::new();
        if let Some(id) = self.id {
            clauses.push(Filter::Id(id.handle()));
        }
        if let Some(address) = &self.address {
            clauses.push(Filter::eq("address", address.as_str()));
        }
        if let Some(location) = &self.location {
            clauses.push(Filter::eq("location", location.as_str()));
        }
        Filter::all_of(clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;
    use crate::validation::ValidationError;
    use serde_json::json;

    #[test]
    fn new_car_collects_all_errors() {
        let err = NewCar::parse(&json!({
            "model": "C",
            "price": -5,
            "licensePlate": "ABC123",
            "dealerID": "oops",
            "color": "red",
        }))
        .unwrap_err();

        assert_eq!(err.request_errors(), ["Unrecognized key(s) in object: 'color'"]);
        let fields: Vec<_> = err.field_names().collect();
        assert_eq!(fields, vec!["model", "price", "dealerID"]);
    }

    #[test]
    fn new_car_defaults_relations() {
        let car = NewCar::parse(&json!({
            "model": "Civic",
            "price": 20000,
            "licensePlate": "ABC123",
        }))
        .unwrap();
        assert!(car.salespeople.is_empty());
        assert!(car.dealer.is_none());
    }

    #[test]
    fn salesperson_name_length() {
        assert!(NewSalesperson::parse(&json!({ "name": "Jo" })).is_ok());

        let err = NewSalesperson::parse(&json!({ "name": "J" })).unwrap_err();
        assert!(err.to_string().starts_with("Field name: "));
        assert_eq!(
            err.for_field("name"),
            Some(&[ValidationError::TooShort { min: 2 }][..])
        );
    }

    #[test]
    fn assign_requires_both_ids() {
        let err = AssignCar::parse(&json!({})).unwrap_err();
        let fields: Vec<_> = err.field_names().collect();
        assert_eq!(fields, vec!["salespersonID", "carID"]);
    }

    #[test]
    fn car_query_exact_price_wins() {
        let query = CarQuery::parse(&json!({ "price": 10, "minPrice": 5 })).unwrap();
        assert_eq!(query.filter(), Filter::eq("price", 10));

        let query = CarQuery::parse(&json!({ "minPrice": "5", "maxPrice": 50 })).unwrap();
        assert_eq!(
            query.filter(),
            Filter::Range {
                field: "price".into(),
                min: Some(5.0),
                max: Some(50.0),
            }
        );
    }

    #[test]
    fn dealer_query_window() {
        let query = DealerQuery::parse(&json!({})).unwrap();
        assert_eq!(query.page, Pagination::window(0, DEFAULT_FIRST));
        assert_eq!(query.filter(), Filter::All);

        let query = DealerQuery::parse(&json!({ "first": 2, "after": 4 })).unwrap();
        assert_eq!(query.page, Pagination::window(4, 2));

        assert!(DealerQuery::parse(&json!({ "first": 0 })).is_err());
        assert!(DealerQuery::parse(&json!({ "after": -1 })).is_err());
    }

    #[test]
    fn query_include_parses() {
        let id = ObjectId::generate().to_external();
        let query = SalespersonQuery::parse(&json!({ "id": id, "include": "cars,dealer" })).unwrap();
        assert_eq!(
            query.include,
            vec![SalespersonRelation::Cars, SalespersonRelation::Dealer]
        );

        let err = SalespersonQuery::parse(&json!({ "include": ["boats"] })).unwrap_err();
        assert!(err.for_field("include").is_some());
    }
}
