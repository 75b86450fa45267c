//! End-to-end dealership flows against the in-memory store

use std::sync::Arc;

use docrel_core::dealership::Dealership;
use docrel_core::store::memory::Operation;
use docrel_core::{CandidateId, CoreError, DocumentStore, EntityKind, Filter, MemoryStore, ObjectId};
use serde_json::{json, Value};

fn setup() -> (MemoryStore, Dealership) {
    let store = MemoryStore::new();
    let dealership = Dealership::new(Arc::new(store.clone()));
    (store, dealership)
}

#[tokio::test]
async fn springfield_scenario() {
    let (store, dealership) = setup();

    let dealer = dealership
        .create_dealer(&json!({ "address": "1 Main St", "location": "Springfield" }))
        .await
        .unwrap();

    let civic = dealership
        .create_car(&json!({
            "model": "Civic",
            "price": 20000,
            "licensePlate": "ABC123",
            "dealerID": dealer.id,
        }))
        .await
        .unwrap();

    let cars = dealership.relations().dealer_cars(&dealer).await.unwrap();
    assert_eq!(cars, vec![civic]);

    let jo = dealership.create_salesperson(&json!({ "name": "Jo" })).await.unwrap();
    assert_eq!(jo.name, "Jo");

    let err = dealership
        .create_salesperson(&json!({ "name": "J" }))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(err.to_string().starts_with("Field name: "));

    store.clear_journal();
    let err = dealership
        .assign_car(&json!({
            "salespersonID": jo.id,
            "carID": ObjectId::generate().to_external(),
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { kind: EntityKind::Car }));
    assert_eq!(err.to_string(), "car not found");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn linking_car_adds_exactly_one_entry() {
    let (_, dealership) = setup();
    let car = dealership
        .create_car(&json!({ "model": "Civic", "price": 20000, "licensePlate": "ABC123" }))
        .await
        .unwrap();
    let jo = dealership.create_salesperson(&json!({ "name": "Jo" })).await.unwrap();
    let link = json!({ "salespersonID": jo.id, "carID": car.id });

    for expected in 1..=3 {
        dealership.assign_car(&link).await.unwrap();

        let cars = dealership.relations().salesperson_cars(&jo).await.unwrap();
        assert_eq!(cars.len(), expected);
        assert!(cars.iter().all(|c| c.id == car.id));

        let people = dealership.relations().car_salespeople(&car).await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].id, jo.id);
    }
}

#[tokio::test]
async fn relinking_dealer_overwrites() {
    let (_, dealership) = setup();
    let springfield = dealership
        .create_dealer(&json!({ "address": "1 Main St", "location": "Springfield" }))
        .await
        .unwrap();
    let shelbyville = dealership
        .create_dealer(&json!({ "address": "9 Elm St", "location": "Shelbyville" }))
        .await
        .unwrap();
    let jo = dealership.create_salesperson(&json!({ "name": "Jo" })).await.unwrap();

    for dealer in [&springfield, &shelbyville] {
        dealership
            .assign_dealer(&json!({ "dealerID": dealer.id, "salespersonID": jo.id }))
            .await
            .unwrap();
        let current = dealership.relations().salesperson_dealer(&jo).await.unwrap();
        assert_eq!(current.as_ref().map(|d| &d.id), Some(&dealer.id));
    }

    let staff = dealership.relations().dealer_salespeople(&shelbyville).await.unwrap();
    assert_eq!(staff.len(), 1);
    assert!(dealership
        .relations()
        .dealer_salespeople(&springfield)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn missing_endpoints_write_nothing() {
    let (store, dealership) = setup();
    let jo = dealership.create_salesperson(&json!({ "name": "Jo" })).await.unwrap();
    store.clear_journal();

    let missing = ObjectId::generate().to_external();
    let attempts = [
        json!({ "dealerID": missing, "salespersonID": jo.id }),
        json!({ "dealerID": missing, "salespersonID": missing }),
    ];
    for payload in &attempts {
        assert!(dealership.assign_dealer(payload).await.is_err());
    }
    assert!(dealership
        .create_salesperson(&json!({ "name": "Ana", "dealerID": missing }))
        .await
        .is_err());
    assert!(dealership
        .create_car(&json!({
            "model": "Civic",
            "price": 1,
            "licensePlate": "ABC123",
            "salespeopleIDs": [jo.id, missing],
        }))
        .await
        .is_err());

    assert_eq!(store.write_count(), 0);
    assert!(store
        .journal()
        .iter()
        .all(|(_, op)| *op == Operation::Count));
}

#[tokio::test]
async fn constraint_violations_insert_nothing() {
    let (store, dealership) = setup();

    let err = dealership
        .create_car(&json!({ "model": "Civic", "price": -5, "licensePlate": "ABC123" }))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Field price: Number must be greater than or equal to 0"
    );

    let err = dealership.create_salesperson(&json!({ "name": "a" })).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Field name: String must contain at least 2 character(s)"
    );

    let err = dealership
        .create_dealer(&json!({ "address": "1 Main St" }))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Field location: Required");

    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn created_ids_round_trip() {
    let (_, dealership) = setup();
    let dealer = dealership
        .create_dealer(&json!({ "address": "1 Main St", "location": "Springfield" }))
        .await
        .unwrap();

    let found = dealership
        .list_dealers(&json!({ "id": dealer.id }))
        .await
        .unwrap();
    assert_eq!(found, vec![dealer]);
}

#[tokio::test]
async fn includes_resolve_per_entity() {
    let (_, dealership) = setup();
    let dealer = dealership
        .create_dealer(&json!({ "address": "1 Main St", "location": "Springfield" }))
        .await
        .unwrap();
    let jo = dealership
        .create_salesperson(&json!({ "name": "Jo", "dealerID": dealer.id }))
        .await
        .unwrap();
    dealership
        .create_car(&json!({
            "model": "Civic",
            "price": 20000,
            "licensePlate": "ABC123",
            "salespeopleIDs": [jo.id],
        }))
        .await
        .unwrap();

    let cars = dealership
        .list_cars(&json!({ "include": "dealer,salespeople" }))
        .await
        .unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].dealer, Some(None));
    assert_eq!(cars[0].salespeople.as_ref().map(Vec::len), Some(1));

    let people = dealership
        .list_salespeople(&json!({ "name": "Jo", "include": ["dealer"] }))
        .await
        .unwrap();
    let value: Value = serde_json::to_value(&people).unwrap();
    assert_eq!(value[0]["dealer"]["location"], "Springfield");
    assert!(value[0].get("cars").is_none());

    let cars = dealership.list_cars(&json!({ "model": "Corolla" })).await.unwrap();
    assert!(cars.is_empty());
}

#[tokio::test]
async fn vanished_parent_resolves_empty() {
    let (store, dealership) = setup();
    let jo = dealership.create_salesperson(&json!({ "name": "Jo" })).await.unwrap();

    let id = CandidateId::parse(&jo.id).unwrap().handle();
    store
        .collection("Salespeople")
        .delete_one(&Filter::Id(id))
        .await
        .unwrap();

    assert!(dealership.relations().salesperson_cars(&jo).await.unwrap().is_empty());
    assert!(dealership.relations().salesperson_dealer(&jo).await.unwrap().is_none());
}
