//! Dealership operations
//!
//! Every mutation validates the whole payload, then confirms every referenced
//! entity, and only then writes. Writes are single-document and are not rolled back
//! if a later one fails.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::input::{
    AssignCar, AssignDealer, CarQuery, DealerQuery, NewCar, NewDealer, NewSalesperson,
    SalespersonQuery,
};
use super::model::{Car, Dealer, Salesperson};
use super::records::{CarDoc, DealerDoc, SalespersonDoc, CAR_IDS_FIELD, DEALER_FIELD};
use super::relations::DealershipRelations;
use crate::entity::EntityKind;
use crate::error::{CoreError, Result};
use crate::id::{CandidateId, ObjectId};
use crate::mapper::Records;
use crate::pagination::Pagination;
use crate::resolve::ReferenceResolver;
use crate::store::{DocumentStore, Update};

/// Dealers, cars and salespeople over one document store.
#[derive(Clone)]
pub struct Dealership {
    dealers: Records<DealerDoc>,
    cars: Records<CarDoc>,
    salespeople: Records<SalespersonDoc>,
    resolver: ReferenceResolver,
    relations: DealershipRelations,
}

impl Dealership {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let dealers = Records::new(store.collection(EntityKind::Dealer.collection()));
        let cars = Records::new(store.collection(EntityKind::Car.collection()));
        let salespeople = Records::new(store.collection(EntityKind::Salesperson.collection()));
        let relations = DealershipRelations::new(dealers.clone(), cars.clone(), salespeople.clone());

        Self {
            dealers,
            cars,
            salespeople,
            resolver: ReferenceResolver::new(store),
            relations,
        }
    }

    /// Relation accessors, for callers that resolve fields one at a time.
    pub fn relations(&self) -> &DealershipRelations {
        &self.relations
    }

    #[instrument(skip_all)]
    pub async fn create_dealer(&self, payload: &Value) -> Result<Dealer> {
        let input = NewDealer::parse(payload)?;

        let stored = self
            .dealers
            .insert(DealerDoc {
                address: input.address,
                location: input.location,
            })
            .await?;

        info!(dealer_id = %stored.id, "created dealer");
        Ok(Dealer::from(stored))
    }

    /// Insert a car, then append it to each listed salesperson's `carIDs`.
    #[instrument(skip_all)]
    pub async fn create_car(&self, payload: &Value) -> Result<Car> {
        let input = NewCar::parse(payload)?;

        self.resolver
            .resolve_all(EntityKind::Salesperson, &input.salespeople)
            .await?;
        let dealer = self
            .resolver
            .resolve_optional(EntityKind::Dealer, input.dealer)
            .await?;

        let stored = self
            .cars
            .insert(CarDoc {
                model: input.model,
                price: input.price,
                license_plate: input.license_plate,
                dealer_id: dealer,
            })
            .await?;
        debug!(car_id = %stored.id, "inserted car");

        for salesperson in input.salespeople.iter().map(CandidateId::handle) {
            self.salespeople
                .update(salesperson, Update::push(CAR_IDS_FIELD, stored.id))
                .await?;
            debug!(car_id = %stored.id, salesperson_id = %salesperson, "appended car to salesperson");
        }

        info!(car_id = %stored.id, "created car");
        Ok(Car::from(stored))
    }

    #[instrument(skip_all)]
    pub async fn create_salesperson(&self, payload: &Value) -> Result<Salesperson> {
        let input = NewSalesperson::parse(payload)?;

        let dealer = self
            .resolver
            .resolve_optional(EntityKind::Dealer, input.dealer)
            .await?;

        let stored = self
            .salespeople
            .insert(SalespersonDoc {
                name: input.name,
                dealer_id: dealer,
                car_ids: Vec::new(),
            })
            .await?;

        info!(salesperson_id = %stored.id, "created salesperson");
        Ok(Salesperson::from(stored))
    }

    /// Put a salesperson under a dealer, replacing any previous dealer.
    #[instrument(skip_all)]
    pub async fn assign_dealer(&self, payload: &Value) -> Result<Salesperson> {
        let input = AssignDealer::parse(payload)?;

        let salesperson = self
            .resolver
            .resolve(EntityKind::Salesperson, input.salesperson)
            .await?;
        let dealer = self.resolver.resolve(EntityKind::Dealer, input.dealer).await?;

        let outcome = self
            .salespeople
            .update(salesperson, Update::set(DEALER_FIELD, dealer))
            .await?;
        if outcome.matched == 0 {
            return Err(CoreError::not_found(EntityKind::Salesperson));
        }

        info!(salesperson_id = %salesperson, dealer_id = %dealer, "assigned dealer");
        self.current_salesperson(salesperson).await
    }

    /// Append a car to a salesperson's list. Repeating the call appends again.
    #[instrument(skip_all)]
    pub async fn assign_car(&self, payload: &Value) -> Result<Salesperson> {
        let input = AssignCar::parse(payload)?;

        let salesperson = self
            .resolver
            .resolve(EntityKind::Salesperson, input.salesperson)
            .await?;
        let car = self.resolver.resolve(EntityKind::Car, input.car).await?;

        let outcome = self
            .salespeople
            .update(salesperson, Update::push(CAR_IDS_FIELD, car))
            .await?;
        if outcome.matched == 0 {
            return Err(CoreError::not_found(EntityKind::Salesperson));
        }

        info!(salesperson_id = %salesperson, car_id = %car, "assigned car");
        self.current_salesperson(salesperson).await
    }

    async fn current_salesperson(&self, id: ObjectId) -> Result<Salesperson> {
        self.salespeople
            .get(id)
            .await?
            .map(Salesperson::from)
            .ok_or_else(|| CoreError::not_found(EntityKind::Salesperson))
    }

    #[instrument(skip_all)]
    pub async fn list_cars(&self, payload: &Value) -> Result<Vec<Car>> {
        let query = CarQuery::parse(payload)?;

        let cars: Vec<Car> = self
            .cars
            .find(&query.filter(), Pagination::unbounded())
            .await?
            .into_iter()
            .map(Car::from)
            .collect();
        debug!(count = cars.len(), "listed cars");

        self.relations.expand_cars(cars, &query.include).await
    }

    #[instrument(skip_all)]
    pub async fn list_salespeople(&self, payload: &Value) -> Result<Vec<Salesperson>> {
        let query = SalespersonQuery::parse(payload)?;

        let people: Vec<Salesperson> = self
            .salespeople
            .find(&query.filter(), Pagination::unbounded())
            .await?
            .into_iter()
            .map(Salesperson::from)
            .collect();
        debug!(count = people.len(), "listed salespeople");

        self.relations.expand_salespeople(people, &query.include).await
    }

    #[instrument(skip_all)]
    pub async fn list_dealers(&self, payload: &Value) -> Result<Vec<Dealer>> {
        let query = DealerQuery::parse(payload)?;

        let dealers: Vec<Dealer> = self
            .dealers
            .find(&query.filter(), query.page)
            .await?
            .into_iter()
            .map(Dealer::from)
            .collect();
        debug!(count = dealers.len(), "listed dealers");

        self.relations.expand_dealers(dealers, &query.include).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::Operation;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service() -> (MemoryStore, Dealership) {
        let store = MemoryStore::new();
        let service = Dealership::new(Arc::new(store.clone()));
        (store, service)
    }

    #[tokio::test]
    async fn create_car_checks_salespeople_before_dealer() {
        let (store, service) = service();

        let err = service
            .create_car(&json!({
                "model": "Civic",
                "price": 20000,
                "licensePlate": "ABC123",
                "salespeopleIDs": [ObjectId::generate().to_external()],
                "dealerID": ObjectId::generate().to_external(),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "salesperson not found");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn create_car_appends_once_per_listed_salesperson() {
        let (store, service) = service();
        let jo = service.create_salesperson(&json!({ "name": "Jo" })).await.unwrap();
        store.clear_journal();

        let car = service
            .create_car(&json!({
                "model": "Civic",
                "price": 20000,
                "licensePlate": "ABC123",
                "salespeopleIDs": [jo.id, jo.id],
            }))
            .await
            .unwrap();

        let writes: Vec<_> = store
            .journal()
            .into_iter()
            .filter(|(_, op)| op.is_write())
            .collect();
        assert_eq!(
            writes,
            vec![
                ("Cars".to_owned(), Operation::Insert),
                ("Salespeople".to_owned(), Operation::Update),
                ("Salespeople".to_owned(), Operation::Update),
            ]
        );

        let cars = service.relations().salesperson_cars(&jo).await.unwrap();
        assert_eq!(cars, vec![car.clone(), car]);
    }

    #[tokio::test]
    async fn assign_dealer_reports_missing_salesperson_first() {
        let (store, service) = service();
        store.clear_journal();

        let err = service
            .assign_dealer(&json!({
                "dealerID": ObjectId::generate(),
                "salespersonID": ObjectId::generate(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "salesperson not found");
        assert!(store.journal().iter().all(|(_, op)| !op.is_write()));
    }

    #[tokio::test]
    async fn assign_dealer_overwrites() {
        let (_, service) = service();
        let first = service
            .create_dealer(&json!({ "address": "1 Main St", "location": "Springfield" }))
            .await
            .unwrap();
        let second = service
            .create_dealer(&json!({ "address": "2 Side St", "location": "Shelbyville" }))
            .await
            .unwrap();
        let jo = service
            .create_salesperson(&json!({ "name": "Jo", "dealerID": first.id }))
            .await
            .unwrap();

        service
            .assign_dealer(&json!({ "dealerID": second.id, "salespersonID": jo.id }))
            .await
            .unwrap();

        let dealer = service.relations().salesperson_dealer(&jo).await.unwrap();
        assert_eq!(dealer.map(|d| d.id), Some(second.id.clone()));
        assert!(service
            .relations()
            .dealer_salespeople(&first)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn list_dealers_windows() {
        let (_, service) = service();
        for n in 0..3 {
            service
                .create_dealer(&json!({ "address": format!("{n} Main St"), "location": "Springfield" }))
                .await
                .unwrap();
        }

        let page = service.list_dealers(&json!({ "first": 2, "after": 1 })).await.unwrap();
        let addresses: Vec<_> = page.iter().map(|d| d.address.as_str()).collect();
        assert_eq!(addresses, vec!["1 Main St", "2 Main St"]);
    }

    #[tokio::test]
    async fn list_cars_by_price_range() {
        let (_, service) = service();
        for (plate, price) in [("AAA111", 5000), ("BBB222", 15000), ("CCC333", 25000)] {
            service
                .create_car(&json!({ "model": "Civic", "price": price, "licensePlate": plate }))
                .await
                .unwrap();
        }

        let cars = service
            .list_cars(&json!({ "minPrice": "10000", "maxPrice": 25000 }))
            .await
            .unwrap();
        let plates: Vec<_> = cars.iter().map(|c| c.license_plate.as_str()).collect();
        assert_eq!(plates, vec!["BBB222", "CCC333"]);
    }
}
