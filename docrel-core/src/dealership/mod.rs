//! Car dealership domain: dealers, cars and salespeople
//!
//! Cars and salespeople reference their dealer through `dealerID`. Salespeople own
//! the salesperson <-> car relation through their `carIDs` list; a car's salespeople
//! are derived.

pub mod input;
pub mod model;
pub mod records;
pub mod relations;
pub mod service;

pub use model::{Car, Dealer, Salesperson};
pub use relations::{CarRelation, DealerRelation, DealershipRelations, SalespersonRelation};
pub use service::Dealership;
